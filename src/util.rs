use std::borrow::Cow;

use ldap3::{dn_escape, ldap_escape};

/// Qualify a bare username with the default domain.
///
/// The domain is appended, separated by `@`, only if there is a domain, the username
/// is non-empty, and it doesn't already contain an `@`. The argument is returned
/// unchanged otherwise.
pub fn qualify_username<'a>(username: &'a str, domain: Option<&str>) -> Cow<'a, str> {
    match domain {
        Some(domain) if !username.is_empty() && !username.contains('@') => {
            Cow::Owned(format!("{}@{}", username, domain))
        }
        _ => Cow::Borrowed(username),
    }
}

/// DN used to bind as the user: `mail=<username>,<base DN>`.
///
/// The username is escaped as an attribute value; the base DN is used verbatim.
pub fn bind_dn(username: &str, base_dn: &str) -> String {
    format!("mail={},{}", dn_escape(username), base_dn)
}

/// Filter matching the user's entry: `(<attr>=<username>)`, with the username escaped.
pub fn user_filter(attr: &str, username: &str) -> String {
    format!("({}={})", attr, ldap_escape(username))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_domain() {
        assert_eq!(qualify_username("jdoe", Some("corp.example.com")), "jdoe@corp.example.com");
    }

    #[test]
    fn keeps_qualified_username() {
        let q = qualify_username("jdoe@other.example.com", Some("corp.example.com"));
        assert_eq!(q, "jdoe@other.example.com");
        assert!(matches!(q, Cow::Borrowed(_)));
    }

    #[test]
    fn no_domain_for_empty_username() {
        assert_eq!(qualify_username("", Some("corp.example.com")), "");
    }

    #[test]
    fn no_domain_configured() {
        assert_eq!(qualify_username("jdoe", None), "jdoe");
    }

    #[test]
    fn bind_dn_template() {
        assert_eq!(
            bind_dn("jdoe@corp.example.com", "ou=People,dc=corp,dc=example,dc=com"),
            "mail=jdoe@corp.example.com,ou=People,dc=corp,dc=example,dc=com"
        );
    }

    #[test]
    fn bind_dn_escapes_username() {
        assert_eq!(bind_dn("a,b+c@x", "dc=x"), "mail=a\\2cb\\2bc@x,dc=x");
    }

    #[test]
    fn filter_escapes_username() {
        assert_eq!(user_filter("mail", "*)(uid=*"), "(mail=\\2a\\29\\28uid=\\2a)");
        assert_eq!(user_filter("mail", "jdoe@corp.example.com"), "(mail=jdoe@corp.example.com)");
    }
}
