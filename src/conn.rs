use std::time::Duration;

use ldap3::{LdapConn, LdapConnSettings, LdapResult, Scope, SearchEntry};
use log::debug;
use url::Url;

use crate::config::ConnOption;
use crate::directory::{Connector, Directory, DirectoryEntry};
use crate::result::{DirectoryError, Operation};

/// Connector opening synchronous `ldap3` connections.
#[derive(Clone, Copy, Debug, Default)]
pub struct LdapConnector;

impl LdapConnector {
    /// Fold the options into connection settings and the per-operation timeout.
    ///
    /// Everything is validated here, before any socket is opened.
    fn settings(options: &[ConnOption]) -> Result<(LdapConnSettings, Option<Duration>), DirectoryError> {
        let mut settings = LdapConnSettings::new();
        let mut op_timeout = None;
        for option in options {
            settings = match *option {
                ConnOption::ConnTimeout(timeout) => settings.set_conn_timeout(timeout),
                #[cfg(any(feature = "tls", feature = "tls-rustls"))]
                ConnOption::StartTls(starttls) => settings.set_starttls(starttls),
                #[cfg(any(feature = "tls", feature = "tls-rustls"))]
                ConnOption::NoTlsVerify(no_verify) => settings.set_no_tls_verify(no_verify),
                #[cfg(not(any(feature = "tls", feature = "tls-rustls")))]
                ConnOption::StartTls(_) | ConnOption::NoTlsVerify(_) => {
                    return Err(DirectoryError::Unsupported(String::from("TLS support not compiled in")))
                }
                ConnOption::OpTimeout(timeout) => {
                    op_timeout = Some(timeout);
                    settings
                }
                ConnOption::ProtocolVersion(3) => settings,
                ConnOption::ProtocolVersion(v) => {
                    return Err(DirectoryError::Unsupported(format!("LDAP protocol version {}", v)))
                }
            };
        }
        Ok((settings, op_timeout))
    }
}

impl Connector for LdapConnector {
    type Directory = LdapDirectory;

    fn connect(&self, url: &Url, options: &[ConnOption]) -> Result<LdapDirectory, DirectoryError> {
        let (settings, op_timeout) = LdapConnector::settings(options)?;
        debug!("connecting to {}", url);
        let conn = LdapConn::with_settings(settings, url.as_str()).map_err(|source| DirectoryError::Protocol {
            op: Operation::Connect,
            source,
        })?;
        Ok(LdapDirectory {
            conn: Some(conn),
            op_timeout,
            diagnostic: None,
        })
    }
}

/// Directory connection backed by `ldap3::LdapConn`.
pub struct LdapDirectory {
    conn: Option<LdapConn>,
    op_timeout: Option<Duration>,
    diagnostic: Option<String>,
}

impl LdapDirectory {
    fn conn(&mut self, op: Operation) -> Result<&mut LdapConn, DirectoryError> {
        let conn = self.conn.as_mut().ok_or(DirectoryError::Closed(op))?;
        if let Some(timeout) = self.op_timeout {
            conn.with_timeout(timeout);
        }
        Ok(conn)
    }

    /// Record the outcome of an operation, keeping the server's text of a failure.
    fn check(&mut self, op: Operation, res: Result<LdapResult, ldap3::LdapError>) -> Result<(), DirectoryError> {
        match res.and_then(LdapResult::success) {
            Ok(_) => {
                self.diagnostic = None;
                Ok(())
            }
            Err(ldap3::LdapError::LdapResult { result }) => {
                self.diagnostic = Some(result.text.clone());
                Err(DirectoryError::Result {
                    op,
                    rc: result.rc,
                    text: result.text,
                })
            }
            Err(source) => {
                self.diagnostic = None;
                Err(DirectoryError::Protocol { op, source })
            }
        }
    }
}

impl Directory for LdapDirectory {
    fn bind(&mut self, dn: &str, password: &str) -> Result<(), DirectoryError> {
        let res = self.conn(Operation::Bind)?.simple_bind(dn, password);
        self.check(Operation::Bind, res)
    }

    fn search(&mut self, base: &str, filter: &str) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        let res = self
            .conn(Operation::Search)?
            .search(base, Scope::Subtree, filter, Vec::<&str>::new());
        match res {
            Ok(rs) => {
                self.check(Operation::Search, Ok(rs.1))?;
                Ok(rs.0.into_iter().map(SearchEntry::construct).collect())
            }
            Err(e) => self.check(Operation::Search, Err(e)).map(|_| Vec::new()),
        }
    }

    fn diagnostic_message(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    fn unbind(&mut self) -> Result<(), DirectoryError> {
        self.conn(Operation::Unbind)?
            .unbind()
            .map_err(|source| DirectoryError::Protocol {
                op: Operation::Unbind,
                source,
            })
    }

    fn close(&mut self) {
        self.conn = None;
    }
}
