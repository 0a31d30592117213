//! The authenticator.

use log::{debug, info, warn};

use crate::config::AuthConfig;
use crate::conn::{LdapConnector, LdapDirectory};
use crate::directory::{first_entry, server_url, Connector, Directory, DirectoryEntry};
use crate::request::{FlashMessage, LoginRequest};
use crate::result::{AuthError, DirectoryError, Result};
use crate::util::{bind_dn, qualify_username, user_filter};

/// LDAP authentication strategy.
///
/// The authenticator owns one directory connection, opened at construction and
/// released when the authenticator is dropped. Each call to
/// [`authenticate()`](#method.authenticate) checks one set of credentials by binding as
/// the user and, if the bind succeeds, returns the user's directory entry.
///
/// Failures to authenticate aren't errors: `authenticate()` returns `None`, logs the
/// directory's complaint, and may leave user-facing messages in the request's session,
/// depending on the configured error mappings.
pub struct LdapAuthenticator<D: Directory = LdapDirectory> {
    conn: Option<D>,
    config: AuthConfig,
}

impl LdapAuthenticator<LdapDirectory> {
    /// Connect to the configured server using `ldap3`.
    pub fn new(config: AuthConfig) -> Result<Self> {
        LdapAuthenticator::with_connector(config, &LdapConnector)
    }
}

impl<D: Directory> LdapAuthenticator<D> {
    /// Connect to the configured server through `connector`.
    ///
    /// The host is resolved exactly once. An empty host is a configuration error, and
    /// nothing is connected in that case.
    pub fn with_connector<C>(config: AuthConfig, connector: &C) -> Result<Self>
    where
        C: Connector<Directory = D>,
    {
        let host = config.host.resolve();
        let url = server_url(&host, config.port)?;
        if config.base_dn.is_empty() || config.search.is_empty() {
            warn!("base DN or search attribute is empty, user entries won't be found");
        }
        let conn = connector.connect(&url, &config.options).map_err(AuthError::Connect)?;
        debug!("connected to {}", url);
        Ok(LdapAuthenticator {
            conn: Some(conn),
            config,
        })
    }

    /// Configuration the authenticator was built with.
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Authenticate the credentials carried by `request`.
    ///
    /// Returns the user's entry on success. A request missing either credential field
    /// fails without contacting the directory.
    ///
    /// An empty password also fails without contacting the directory, even though the
    /// field is present. A simple bind with an empty password is an unauthenticated bind
    /// (RFC 4513, section 5.1.2), which most servers accept without checking anything.
    pub fn authenticate<R: LoginRequest>(&mut self, request: &mut R) -> Option<DirectoryEntry> {
        let (username, password) = match (
            request.field(&self.config.fields.username),
            request.field(&self.config.fields.password),
        ) {
            (Some(username), Some(password)) => (username.to_owned(), password.to_owned()),
            _ => return None,
        };
        // An empty password makes a simple bind unauthenticated, which servers accept.
        if password.is_empty() {
            debug!("empty password, not binding");
            return None;
        }
        self.find_user(&username, &password, request)
    }

    fn find_user<R: LoginRequest>(
        &mut self,
        username: &str,
        password: &str,
        request: &mut R,
    ) -> Option<DirectoryEntry> {
        let username = qualify_username(username, self.config.domain.as_deref());
        let dn = bind_dn(&username, &self.config.base_dn);
        let filter = user_filter(&self.config.search, &username);

        let conn = self.conn.as_mut()?;
        let err = match lookup(conn, &dn, &filter, password) {
            Ok(Some(entry)) => return Some(entry),
            Ok(None) => {
                warn!("bind succeeded but search returned no entries");
                return None;
            }
            Err(e) => e,
        };
        info!("{}", err);

        let messages = match conn.diagnostic_message() {
            Some(diag) if !diag.is_empty() => messages_for(&self.config, diag),
            _ => Vec::new(),
        };
        if !messages.is_empty() {
            request.write_session(&format!("Flash.{}", self.config.flash.key), messages);
        }
        None
    }
}

/// Messages of all error mappings whose pattern occurs in `diag`, in mapping order.
fn messages_for(config: &AuthConfig, diag: &str) -> Vec<FlashMessage> {
    let flash = &config.flash;
    config
        .errors
        .iter()
        .filter(|(pattern, _)| diag.contains(pattern.as_str()))
        .map(|(_, message)| FlashMessage {
            message: message.clone(),
            key: flash.key.clone(),
            element: flash.element.clone(),
            params: flash.params.clone(),
        })
        .collect()
}

/// Bind as the user and fetch the entry.
fn lookup<D: Directory>(
    conn: &mut D,
    dn: &str,
    filter: &str,
    password: &str,
) -> std::result::Result<Option<DirectoryEntry>, DirectoryError> {
    conn.bind(dn, password)?;
    let entries = conn.search(dn, filter)?;
    Ok(first_entry(entries))
}

impl<D: Directory> Drop for LdapAuthenticator<D> {
    fn drop(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            if let Err(e) = conn.unbind() {
                debug!("unbind on teardown: {}", e);
            }
            conn.close();
        }
    }
}
