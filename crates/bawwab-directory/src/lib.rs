//! Directory access for Bawwab
//!
//! Connector plus the two authentication strategies:
//! - Bind mode: construct `attribute=username,base_dn` and bind directly
//! - Search mode: service bind, resolve the entry by filter, re-bind as it

pub mod authenticator;
pub mod connector;

pub use authenticator::{
    Authenticate, Authenticator, BindAuthenticator, DirectoryEntry, SearchAuthenticator,
};
pub use connector::DirectoryConnector;
