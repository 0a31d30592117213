//! LDAP authentication strategy.
//!
//! This crate checks a user's credentials against an LDAP directory and returns the
//! user's directory entry on success. It is meant to sit behind a web framework's
//! login handling as one of possibly several authentication strategies: the framework
//! hands over the inbound request, and gets back either an entry or nothing.
//!
//! Credentials are verified by binding as the user, with the DN
//! `mail=<username>,<base DN>`. Usernames given without a domain can be qualified with
//! a configured default domain first. When the bind succeeds, the user's entry is looked
//! up by a configured attribute and returned. When it fails, the server's diagnostic
//! message is matched against configured patterns, and the matching user-facing messages
//! are written to the request's session as flash messages.
//!
//! The directory protocol is handled by [`ldap3`](https://docs.rs/ldap3), through its
//! synchronous API. Each authenticator holds one connection, which is opened when the
//! authenticator is constructed and released when it's dropped.
//!
//! ## Usage
//!
//! ```no_run
//! use ldap_authn::{AuthConfig, FlashConfig, FormRequest, LdapAuthenticator};
//!
//! # fn main() -> ldap_authn::result::Result<()> {
//! let config = AuthConfig::new("ldap://dc1.corp.example.com")
//!     .set_base_dn("ou=Users,dc=corp,dc=example,dc=com")
//!     .set_search("mail")
//!     .set_domain("corp.example.com")
//!     .add_error("data 52e", "Invalid credentials")
//!     .add_error("data 775", "Account locked")
//!     .set_flash(FlashConfig::new("auth"));
//! let mut auth = LdapAuthenticator::new(config)?;
//! let mut req = FormRequest::new()
//!     .with_field("username", "jdoe")
//!     .with_field("password", "secret");
//! match auth.authenticate(&mut req) {
//!     Some(entry) => println!("welcome, {}", entry.dn),
//!     None => println!("login failed: {:?}", req.session("Flash.auth")),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing without a server
//!
//! The authenticator is generic over the [`Directory`](trait.Directory.html) trait.
//! [`LdapAuthenticator::with_connector()`](struct.LdapAuthenticator.html#method.with_connector)
//! accepts any [`Connector`](trait.Connector.html), so a recording fake can stand in for
//! a real server.

mod auth;
pub mod config;
mod conn;
pub mod directory;
pub mod request;
pub mod result;
pub mod util;

pub use auth::LdapAuthenticator;
pub use config::{AuthConfig, ConnOption, FieldNames, FlashConfig, Host};
pub use conn::{LdapConnector, LdapDirectory};
pub use directory::{Connector, Directory, DirectoryEntry};
pub use request::{FlashMessage, FormRequest, LoginRequest};
pub use result::{AuthError, DirectoryError, Operation};
