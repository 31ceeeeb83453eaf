//! Error types for Bawwab

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Credential extraction
    #[error("no Authorization")]
    MissingAuthorization,

    #[error("invalid Authorization format")]
    MalformedAuthorization,

    // Directory errors
    #[error("directory connection failed: {0}")]
    Connection(String),

    #[error("service account bind failed: {0}")]
    ServiceBindFailed(String),

    #[error("bind rejected by directory")]
    BindRejected,

    #[error("identity not found")]
    IdentityNotFound,

    #[error("ambiguous identity: {0} entries matched")]
    AmbiguousIdentity(usize),

    // Configuration Errors
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // Internal Errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// User-visible reason for a rejection.
    ///
    /// Everything past header parsing collapses to one message: a caller
    /// must not be able to distinguish a bad password from an unreachable
    /// directory or an ambiguous search. The full detail stays in the logs.
    pub fn public_reason(&self) -> &'static str {
        match self {
            Error::MissingAuthorization => "no Authorization",
            Error::MalformedAuthorization => "invalid Authorization format",
            _ => "invalid username or password",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            // Configuration errors are construction-time failures; they
            // never reach a request.
            Error::InvalidConfig(_) => 500,

            _ => 401,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_errors_keep_specific_reasons() {
        assert_eq!(
            Error::MissingAuthorization.public_reason(),
            "no Authorization"
        );
        assert_eq!(
            Error::MalformedAuthorization.public_reason(),
            "invalid Authorization format"
        );
    }

    #[test]
    fn directory_errors_collapse_to_one_reason() {
        let errors = [
            Error::Connection("refused".to_string()),
            Error::ServiceBindFailed("code 49".to_string()),
            Error::BindRejected,
            Error::IdentityNotFound,
            Error::AmbiguousIdentity(3),
            Error::Internal("oops".to_string()),
        ];

        for err in errors {
            assert_eq!(err.public_reason(), "invalid username or password");
            assert_eq!(err.http_status(), 401);
        }
    }
}
