//! Directory capability used by the authenticator.
//!
//! The authenticator doesn't talk to the LDAP library directly. It opens a connection
//! through a [`Connector`](trait.Connector.html) and drives it through the
//! [`Directory`](trait.Directory.html) trait, which reduces the directory to the handful
//! of operations a login needs. [`LdapConnector`](../struct.LdapConnector.html) is the
//! real implementation; tests plug in their own.

use std::net::Ipv6Addr;

use url::Url;

use crate::config::ConnOption;
use crate::result::{AuthError, DirectoryError};

pub use ldap3::SearchEntry as DirectoryEntry;

/// An open directory connection.
///
/// Every operation reports failure as a [`DirectoryError`](../enum.DirectoryError.html).
/// A failed operation leaves the server's explanation, if any, available through
/// [`diagnostic_message()`](#tymethod.diagnostic_message).
pub trait Directory {
    /// Simple bind. `Ok` means the server returned success, and nothing else.
    fn bind(&mut self, dn: &str, password: &str) -> Result<(), DirectoryError>;

    /// Subtree search under `base`, returning all user attributes of each entry.
    fn search(&mut self, base: &str, filter: &str) -> Result<Vec<DirectoryEntry>, DirectoryError>;

    /// Diagnostic text of the last failed operation.
    fn diagnostic_message(&self) -> Option<&str>;

    fn unbind(&mut self) -> Result<(), DirectoryError>;

    /// Release the connection. Further operations fail.
    fn close(&mut self);
}

/// Opens directory connections.
pub trait Connector {
    type Directory: Directory;

    /// Connect to `url`, applying `options` in order.
    fn connect(&self, url: &Url, options: &[ConnOption]) -> Result<Self::Directory, DirectoryError>;
}

/// Return the first entry of a search result, if there is one.
pub fn first_entry(entries: Vec<DirectoryEntry>) -> Option<DirectoryEntry> {
    entries.into_iter().next()
}

/// Compose the server URL from the configured host and port.
///
/// A host which is already an LDAP URL is taken as is, with `port` replacing the URL's
/// own port. Anything else is treated as a host name or address for a plain `ldap://`
/// connection.
pub fn server_url(host: &str, port: Option<u16>) -> Result<Url, AuthError> {
    let host = host.trim();
    if host.is_empty() {
        return Err(AuthError::Config(String::from("LDAP server not specified")));
    }
    let mut url = if host.contains("://") {
        let url = Url::parse(host).map_err(|e| AuthError::Config(format!("invalid LDAP URL: {}", e)))?;
        match url.scheme() {
            "ldap" | "ldaps" | "ldapi" => url,
            s => return Err(AuthError::Config(format!("unimplemented LDAP URL scheme: {}", s))),
        }
    } else if host.parse::<Ipv6Addr>().is_ok() {
        Url::parse(&format!("ldap://[{}]", host))
            .map_err(|e| AuthError::Config(format!("invalid LDAP host: {}", e)))?
    } else {
        Url::parse(&format!("ldap://{}", host))
            .map_err(|e| AuthError::Config(format!("invalid LDAP host: {}", e)))?
    };
    if port.is_some() {
        url.set_port(port)
            .map_err(|_| AuthError::Config(format!("can't set port on {}", url)))?;
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host() {
        let url = server_url("ldap.example.org", None).unwrap();
        assert_eq!(url.as_str(), "ldap://ldap.example.org");
    }

    #[test]
    fn bare_host_with_port() {
        let url = server_url("ldap.example.org", Some(2389)).unwrap();
        assert_eq!(url.as_str(), "ldap://ldap.example.org:2389");
    }

    #[test]
    fn ipv6_host() {
        let url = server_url("::1", Some(389)).unwrap();
        assert_eq!(url.host_str(), Some("[::1]"));
    }

    #[test]
    fn url_port_is_overridden() {
        let url = server_url("ldaps://dc1.corp.example.com:3269", Some(636)).unwrap();
        assert_eq!(url.scheme(), "ldaps");
        assert_eq!(url.port_or_known_default(), Some(636));
    }

    #[test]
    fn url_without_port_override() {
        let url = server_url("ldaps://dc1.corp.example.com:3269", None).unwrap();
        assert_eq!(url.port(), Some(3269));
    }

    #[test]
    fn empty_host() {
        assert!(matches!(server_url("  ", None), Err(AuthError::Config(_))));
    }

    #[test]
    fn foreign_scheme() {
        assert!(matches!(
            server_url("http://ldap.example.org", None),
            Err(AuthError::Config(_))
        ));
    }
}
