//! HTTP Basic credential extraction

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

/// Username/password pair extracted from an Authorization header value.
///
/// Both fields are non-empty: an empty password would otherwise reach the
/// directory as an unauthenticated bind, which many servers accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Parse an HTTP Basic Authorization value.
///
/// `Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==` yields `Aladdin` / `open sesame`.
/// The scheme prefix is matched case-insensitively; the payload splits on
/// the first colon, so passwords may contain colons.
pub fn parse_basic_auth(header: &str) -> Option<Credentials> {
    const PREFIX: &str = "Basic ";

    let payload = header.get(PREFIX.len()..)?;
    if !header[..PREFIX.len()].eq_ignore_ascii_case(PREFIX) {
        return None;
    }

    let decoded = BASE64.decode(payload).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;

    let (username, password) = decoded.split_once(':')?;
    if username.is_empty() || password.is_empty() {
        return None;
    }

    Some(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}
