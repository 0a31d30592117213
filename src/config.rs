//! Authenticator configuration.
//!
//! [`AuthConfig`](struct.AuthConfig.html) is built with consuming `set_*` methods, each
//! returning the modified value, so that a whole configuration can be written as one
//! expression:
//!
//! ```
//! use ldap_authn::{AuthConfig, ConnOption, FlashConfig};
//! use std::time::Duration;
//!
//! let config = AuthConfig::new("ldap.example.org")
//!     .set_port(389)
//!     .add_option(ConnOption::ConnTimeout(Duration::from_secs(5)))
//!     .set_base_dn("ou=People,dc=example,dc=org")
//!     .set_search("mail")
//!     .set_domain("example.org")
//!     .add_error("data 52e", "Invalid credentials")
//!     .set_flash(FlashConfig::new("auth"));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Default name of the request field carrying the username.
pub const DEFAULT_USERNAME_FIELD: &str = "username";
/// Default name of the request field carrying the password.
pub const DEFAULT_PASSWORD_FIELD: &str = "password";

/// Directory server host.
///
/// The host can be given directly, or as a function which is called once, when the
/// authenticator is constructed, to produce the actual value. The latter is useful when
/// the host comes from an environment lookup or service discovery that shouldn't run
/// when the configuration is merely declared.
pub enum Host {
    Literal(String),
    Resolver(Box<dyn Fn() -> String + Send + Sync>),
}

impl Host {
    /// Create a deferred host.
    pub fn resolver<F>(f: F) -> Host
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Host::Resolver(Box::new(f))
    }

    /// Produce the concrete host value, calling the resolver if there is one.
    pub fn resolve(&self) -> String {
        match self {
            Host::Literal(host) => host.clone(),
            Host::Resolver(f) => f(),
        }
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Host::Literal(host) => f.debug_tuple("Literal").field(host).finish(),
            Host::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

impl From<&str> for Host {
    fn from(host: &str) -> Host {
        Host::Literal(host.to_owned())
    }
}

impl From<String> for Host {
    fn from(host: String) -> Host {
        Host::Literal(host)
    }
}

/// Connection option, applied when the connection is opened.
#[derive(Clone, Debug, PartialEq)]
pub enum ConnOption {
    /// Timeout for establishing the connection.
    ConnTimeout(Duration),
    /// Timeout for each operation on the connection.
    OpTimeout(Duration),
    /// Upgrade a plain connection with StartTLS.
    StartTls(bool),
    /// Skip verification of the server certificate.
    NoTlsVerify(bool),
    /// LDAP protocol version; only 3 is supported.
    ProtocolVersion(u32),
}

/// Names of the request fields carrying the credentials.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldNames {
    pub username: String,
    pub password: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        FieldNames {
            username: DEFAULT_USERNAME_FIELD.to_owned(),
            password: DEFAULT_PASSWORD_FIELD.to_owned(),
        }
    }
}

/// Routing of failure messages to the host's flash notifications.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlashConfig {
    /// Session key under which messages are written, as `Flash.<key>`.
    pub key: String,
    /// Template element used to render the message.
    pub element: String,
    /// Extra parameters passed to the element.
    pub params: BTreeMap<String, String>,
}

impl FlashConfig {
    pub fn new<K: Into<String>>(key: K) -> Self {
        FlashConfig {
            key: key.into(),
            element: String::from("Flash/error"),
            params: BTreeMap::new(),
        }
    }

    pub fn set_element<E: Into<String>>(mut self, element: E) -> Self {
        self.element = element.into();
        self
    }

    pub fn add_param<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Complete authenticator configuration.
///
/// Only the host is mandatory at this level. An empty base DN or search attribute is
/// accepted but won't locate anything useful.
#[derive(Debug)]
pub struct AuthConfig {
    pub(crate) host: Host,
    pub(crate) port: Option<u16>,
    pub(crate) options: Vec<ConnOption>,
    pub(crate) fields: FieldNames,
    pub(crate) domain: Option<String>,
    pub(crate) base_dn: String,
    pub(crate) search: String,
    pub(crate) errors: Vec<(String, String)>,
    pub(crate) flash: FlashConfig,
}

impl AuthConfig {
    /// Create a configuration for the given host, with everything else defaulted.
    ///
    /// The host may be a name, an address, or a complete `ldap://`, `ldaps://` or
    /// `ldapi://` URL.
    pub fn new<H: Into<Host>>(host: H) -> Self {
        AuthConfig {
            host: host.into(),
            port: None,
            options: Vec::new(),
            fields: FieldNames::default(),
            domain: None,
            base_dn: String::new(),
            search: String::new(),
            errors: Vec::new(),
            flash: FlashConfig::default(),
        }
    }

    /// Set the server port. Without it, or with port 0, the protocol default is used.
    pub fn set_port(mut self, port: u16) -> Self {
        self.port = if port == 0 { None } else { Some(port) };
        self
    }

    /// Append a connection option. Options are applied in the order of addition.
    pub fn add_option(mut self, option: ConnOption) -> Self {
        self.options.push(option);
        self
    }

    /// Set the name of the username field. Surrounding whitespace is ignored.
    pub fn set_username_field<S: AsRef<str>>(mut self, name: S) -> Self {
        self.fields.username = name.as_ref().trim().to_owned();
        self
    }

    /// Set the name of the password field. Surrounding whitespace is ignored.
    pub fn set_password_field<S: AsRef<str>>(mut self, name: S) -> Self {
        self.fields.password = name.as_ref().trim().to_owned();
        self
    }

    /// Set the domain appended to usernames given without one.
    pub fn set_domain<S: Into<String>>(mut self, domain: S) -> Self {
        let domain = domain.into();
        self.domain = if domain.is_empty() { None } else { Some(domain) };
        self
    }

    pub fn set_base_dn<S: Into<String>>(mut self, base_dn: S) -> Self {
        self.base_dn = base_dn.into();
        self
    }

    /// Set the attribute matched against the username when fetching the entry.
    pub fn set_search<S: Into<String>>(mut self, attr: S) -> Self {
        self.search = attr.into();
        self
    }

    /// Map a substring of the server's diagnostic message to a user-facing message.
    ///
    /// Mappings are checked in the order of addition, and every matching one
    /// contributes its message.
    pub fn add_error<P: Into<String>, M: Into<String>>(mut self, pattern: P, message: M) -> Self {
        self.errors.push((pattern.into(), message.into()));
        self
    }

    pub fn set_flash(mut self, flash: FlashConfig) -> Self {
        self.flash = flash;
        self
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn options(&self) -> &[ConnOption] {
        &self.options
    }

    pub fn fields(&self) -> &FieldNames {
        &self.fields
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn base_dn(&self) -> &str {
        &self.base_dn
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn errors(&self) -> &[(String, String)] {
        &self.errors
    }

    pub fn flash(&self) -> &FlashConfig {
        &self.flash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn default_fields() {
        let config = AuthConfig::new("localhost");
        assert_eq!(config.fields().username, "username");
        assert_eq!(config.fields().password, "password");
    }

    #[test]
    fn field_overrides_are_trimmed() {
        let config = AuthConfig::new("localhost")
            .set_username_field("  login ")
            .set_password_field("\tsecret\n");
        assert_eq!(config.fields().username, "login");
        assert_eq!(config.fields().password, "secret");
    }

    #[test]
    fn zero_port_is_unset() {
        let config = AuthConfig::new("localhost").set_port(0);
        assert_eq!(config.port(), None);
        let config = AuthConfig::new("localhost").set_port(636).set_port(0);
        assert_eq!(config.port(), None);
    }

    #[test]
    fn empty_domain_is_none() {
        let config = AuthConfig::new("localhost").set_domain("");
        assert_eq!(config.domain(), None);
    }

    #[test]
    fn errors_keep_insertion_order() {
        let config = AuthConfig::new("localhost")
            .add_error("data 775", "Account locked")
            .add_error("data 52e", "Invalid credentials");
        let patterns: Vec<_> = config.errors().iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(patterns, vec!["data 775", "data 52e"]);
    }

    #[test]
    fn resolver_is_called_on_resolve() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let host = Host::resolver(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            String::from("ldap.example.org")
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(host.resolve(), "ldap.example.org");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(format!("{:?}", host), "Resolver(..)");
    }
}
