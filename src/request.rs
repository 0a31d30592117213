//! The host framework's request, as seen by the authenticator.

use std::collections::{BTreeMap, HashMap};

/// Failure message routed to the host's flash notifications.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlashMessage {
    pub message: String,
    pub key: String,
    pub element: String,
    pub params: BTreeMap<String, String>,
}

/// Inbound login request.
///
/// The authenticator reads the credentials through [`field()`](#tymethod.field), and,
/// when a failed login produced user-facing messages, hands them over through
/// [`write_session()`](#tymethod.write_session).
pub trait LoginRequest {
    /// Value of the named form field, or `None` if the field is absent.
    fn field(&self, name: &str) -> Option<&str>;

    /// Store messages in the session under `path`.
    fn write_session(&mut self, path: &str, messages: Vec<FlashMessage>);
}

/// Simple in-memory request, holding form fields and the session writes made to it.
#[derive(Clone, Debug, Default)]
pub struct FormRequest {
    fields: HashMap<String, String>,
    session: BTreeMap<String, Vec<FlashMessage>>,
}

impl FormRequest {
    pub fn new() -> Self {
        FormRequest::default()
    }

    /// Add a form field.
    pub fn with_field<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Messages written to the session under `path`, if any.
    pub fn session(&self, path: &str) -> Option<&[FlashMessage]> {
        self.session.get(path).map(Vec::as_slice)
    }

    /// Number of distinct session paths written.
    pub fn session_len(&self) -> usize {
        self.session.len()
    }
}

impl LoginRequest for FormRequest {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    fn write_session(&mut self, path: &str, messages: Vec<FlashMessage>) {
        self.session.insert(path.to_owned(), messages);
    }
}
