//! Directory connection handling

use std::sync::Arc;

use bawwab_core::{Error, GateConfig, Result};
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings};
use tracing::{debug, warn};

/// Opens single-use connections to the directory service.
///
/// Connections are not pooled: each verification that reaches the directory
/// opens its own connection, and the caller unbinds it on every exit path.
pub struct DirectoryConnector {
    config: Arc<GateConfig>,
}

impl DirectoryConnector {
    pub fn new(config: Arc<GateConfig>) -> Self {
        Self { config }
    }

    /// Open a transport connection without binding.
    pub async fn open(&self) -> Result<Ldap> {
        let settings = LdapConnSettings::new().set_conn_timeout(self.config.connect_timeout());
        let url = self.config.server_url();

        debug!(url = %url, "connecting to directory");

        let (conn, ldap) = LdapConnAsync::with_settings(settings, &url)
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        // Drive the connection until the handle unbinds or drops.
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "directory connection error");
            }
        });

        Ok(ldap)
    }

    /// Open a connection and bind as the configured service account.
    pub async fn open_bound(&self) -> Result<Ldap> {
        let mut ldap = self.open().await?;

        let result = ldap
            .simple_bind(&self.config.bind_dn, &self.config.bind_password)
            .await
            .map_err(|e| Error::ServiceBindFailed(e.to_string()))?;

        if result.rc != 0 {
            let _ = ldap.unbind().await;
            return Err(Error::ServiceBindFailed(format!(
                "bind returned code {}",
                result.rc
            )));
        }

        Ok(ldap)
    }
}
