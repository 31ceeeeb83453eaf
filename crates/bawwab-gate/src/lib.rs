//! Bawwab authentication gate
//!
//! Inline Basic-auth verification for an edge proxy: extract the credential
//! from the request headers, consult the result cache, authenticate against
//! the directory, and resume the proxy exactly once with the decision.

pub mod basic;
pub mod cache;
pub mod filter;
pub mod verify;

pub use basic::{parse_basic_auth, Credentials};
pub use cache::ResultCache;
pub use filter::{AuthGate, FilterStatus, ProxyCallbacks};
pub use verify::{Verdict, Verifier, REJECT_DETAIL};
