//! Authentication strategies against the directory
//!
//! Both strategies answer one question: does this username/password pair
//! bind successfully? No detail beyond the error variant leaves this module;
//! the gate collapses all of it to a single user-visible reason.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bawwab_core::{Error, GateConfig, Result};
use ldap3::{dn_escape, ldap_escape, Ldap, Scope, SearchEntry};
use tracing::{debug, warn};

use crate::connector::DirectoryConnector;

/// A resolved directory entry: the DN a search landed on plus the requested
/// attributes.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub dn: String,
    pub attrs: HashMap<String, Vec<String>>,
}

/// Verifies a username/password pair against the directory.
#[async_trait]
pub trait Authenticate: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str) -> Result<()>;
}

/// Strategy selected once at startup from the immutable configuration:
/// search mode when a filter template is configured, bind mode otherwise.
pub enum Authenticator {
    Bind(BindAuthenticator),
    Search(SearchAuthenticator),
}

impl Authenticator {
    pub fn from_config(config: Arc<GateConfig>) -> Self {
        if config.search_mode() {
            Authenticator::Search(SearchAuthenticator::new(config))
        } else {
            Authenticator::Bind(BindAuthenticator::new(config))
        }
    }
}

#[async_trait]
impl Authenticate for Authenticator {
    async fn authenticate(&self, username: &str, password: &str) -> Result<()> {
        match self {
            Authenticator::Bind(auth) => auth.authenticate(username, password).await,
            Authenticator::Search(auth) => auth.authenticate(username, password).await,
        }
    }
}

/// Direct-bind strategy.
///
/// The candidate bind both authenticates and proves the identity exists, so
/// no service account is involved.
pub struct BindAuthenticator {
    config: Arc<GateConfig>,
    connector: DirectoryConnector,
}

impl BindAuthenticator {
    pub fn new(config: Arc<GateConfig>) -> Self {
        let connector = DirectoryConnector::new(config.clone());
        Self { config, connector }
    }

    /// Candidate DN for a claimed username: `attribute=username,base_dn`.
    fn candidate_dn(&self, username: &str) -> String {
        format!(
            "{}={},{}",
            self.config.attribute,
            dn_escape(username),
            self.config.base_dn
        )
    }
}

#[async_trait]
impl Authenticate for BindAuthenticator {
    async fn authenticate(&self, username: &str, password: &str) -> Result<()> {
        let dn = self.candidate_dn(username);
        debug!(dn = %dn, "bind-mode authentication");

        let mut ldap = self.connector.open().await?;
        let outcome = bind_as(&mut ldap, &dn, password).await;
        let _ = ldap.unbind().await;

        outcome
    }
}

/// Search-then-bind strategy.
///
/// One connection for the whole attempt: service bind, subtree search for
/// exactly one entry, then a re-bind of the same connection as that entry.
pub struct SearchAuthenticator {
    config: Arc<GateConfig>,
    connector: DirectoryConnector,
}

impl SearchAuthenticator {
    pub fn new(config: Arc<GateConfig>) -> Self {
        let connector = DirectoryConnector::new(config.clone());
        Self { config, connector }
    }

    /// Resolve the claimed username to exactly one entry. Zero matches is an
    /// absent identity; more than one is ambiguous. Both fail.
    async fn resolve(&self, ldap: &mut Ldap, username: &str) -> Result<DirectoryEntry> {
        let filter = self
            .config
            .build_filter(&ldap_escape(username))
            .ok_or_else(|| Error::Internal("search mode without a filter template".into()))?;

        debug!(filter = %filter, base_dn = %self.config.base_dn, "searching for identity");

        let (entries, _res) = ldap
            .search(
                &self.config.base_dn,
                Scope::Subtree,
                &filter,
                vec![self.config.attribute.as_str()],
            )
            .await
            .map_err(|e| Error::Connection(e.to_string()))?
            .success()
            .map_err(|e| Error::Connection(e.to_string()))?;

        let entry = SearchEntry::construct(single_match(entries)?);

        Ok(DirectoryEntry {
            dn: entry.dn,
            attrs: entry.attrs.into_iter().collect(),
        })
    }

    async fn authenticate_on(&self, ldap: &mut Ldap, username: &str, password: &str) -> Result<()> {
        let entry = self.resolve(ldap, username).await?;
        debug!(dn = %entry.dn, "resolved identity, re-binding");
        bind_as(ldap, &entry.dn, password).await
    }
}

#[async_trait]
impl Authenticate for SearchAuthenticator {
    async fn authenticate(&self, username: &str, password: &str) -> Result<()> {
        let mut ldap = self.connector.open_bound().await?;
        let outcome = self.authenticate_on(&mut ldap, username, password).await;
        // Released on every exit path, including search and re-bind failures.
        let _ = ldap.unbind().await;

        outcome
    }
}

/// A search must land on exactly one entry: zero matches is an absent
/// identity, more than one is ambiguous. Both fail regardless of whether
/// the password would have bound.
fn single_match<T>(matches: Vec<T>) -> Result<T> {
    if matches.len() > 1 {
        warn!(matches = matches.len(), "search matched multiple entries");
        return Err(Error::AmbiguousIdentity(matches.len()));
    }

    matches.into_iter().next().ok_or(Error::IdentityNotFound)
}

/// Bind `ldap` as `dn`; any nonzero result code is a rejection.
async fn bind_as(ldap: &mut Ldap, dn: &str, password: &str) -> Result<()> {
    let result = ldap
        .simple_bind(dn, password)
        .await
        .map_err(|e| Error::Connection(e.to_string()))?;

    if result.rc != 0 {
        debug!(rc = result.rc, "bind rejected");
        return Err(Error::BindRejected);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind_config() -> GateConfig {
        GateConfig {
            host: "ldap.example.com".to_string(),
            port: 389,
            base_dn: "dc=example,dc=com".to_string(),
            attribute: "uid".to_string(),
            ..Default::default()
        }
    }

    fn search_config() -> GateConfig {
        GateConfig {
            bind_dn: "cn=readonly,dc=example,dc=com".to_string(),
            bind_password: "secret".to_string(),
            filter: Some("(uid={username})".to_string()),
            ..bind_config()
        }
    }

    #[test]
    fn strategy_follows_filter_presence() {
        let auth = Authenticator::from_config(Arc::new(bind_config()));
        assert!(matches!(auth, Authenticator::Bind(_)));

        let auth = Authenticator::from_config(Arc::new(search_config()));
        assert!(matches!(auth, Authenticator::Search(_)));
    }

    #[test]
    fn candidate_dn_construction() {
        let auth = BindAuthenticator::new(Arc::new(bind_config()));
        assert_eq!(
            auth.candidate_dn("Aladdin"),
            "uid=Aladdin,dc=example,dc=com"
        );
    }

    #[test]
    fn candidate_dn_escapes_dn_metacharacters() {
        let auth = BindAuthenticator::new(Arc::new(bind_config()));
        let dn = auth.candidate_dn("a,b");
        // A raw comma would smuggle an extra RDN into the candidate DN.
        assert!(!dn.contains("=a,b,"));
        assert!(dn.ends_with(",dc=example,dc=com"));
    }

    #[test]
    fn search_requires_exactly_one_match() {
        assert!(matches!(
            single_match(Vec::<&str>::new()),
            Err(Error::IdentityNotFound)
        ));
        assert!(matches!(
            single_match(vec!["uid=a,dc=example,dc=com", "uid=b,dc=example,dc=com"]),
            Err(Error::AmbiguousIdentity(2))
        ));
        assert_eq!(
            single_match(vec!["uid=a,dc=example,dc=com"]).unwrap(),
            "uid=a,dc=example,dc=com"
        );
    }

    #[test]
    fn search_filter_escapes_filter_metacharacters() {
        let config = search_config();
        let filter = config.build_filter(&ldap_escape("ad*min")).unwrap();
        assert_eq!(filter, "(uid=ad\\2amin)");
    }
}
