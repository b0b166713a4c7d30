//! Masking of environment-dependent values.
//!
//! FDW/server/user-mapping options and subscription connection strings carry
//! values like hostnames, ports and passwords that vary between the
//! environment a catalog was extracted from (dev, staging, a CI container)
//! but do not represent a schema difference. We replace them with fixed
//! placeholder tokens at extraction time so that two catalogs that differ
//! only in where they're deployed diff as equal.

/// Option/GUC keys whose values are environment-specific, not schema.
const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "user",
    "host",
    "hostaddr",
    "port",
    "dbname",
    "sslmode",
    "sslcert",
    "sslkey",
    "sslrootcert",
    "sslpassword",
    "passfile",
];

pub fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.contains(&key.to_ascii_lowercase().as_str())
}

/// Mask a single `key = value` option pair if the key is sensitive.
/// Used for FDW, server and user-mapping option lists (spec: `__OPTION_<KEY>__`).
pub fn mask_option_value(key: &str, value: &str) -> String {
    if is_sensitive_key(key) {
        format!("__OPTION_{}__", key.to_ascii_uppercase())
    } else {
        value.to_string()
    }
}

/// Mask every key in a libpq-style `key=value key=value ...` connection string
/// (spec: `__CONN_<KEY>__`). Subscriptions store `subconninfo` this way.
pub fn mask_conninfo(conninfo: &str) -> Vec<crate::catalog::fdw::OptionEntry> {
    parse_conninfo(conninfo)
        .into_iter()
        .map(|(key, _value)| crate::catalog::fdw::OptionEntry {
            key: key.clone(),
            value: format!("__CONN_{}__", key.to_ascii_uppercase()),
        })
        .collect()
}

/// Parse a libpq connection string of the form `key=value key='quoted value'`.
/// Respects single-quoted values and backslash escapes within them.
pub fn parse_conninfo(conninfo: &str) -> Vec<(String, String)> {
    let mut result = Vec::new();
    let mut chars = conninfo.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == '=' {
                break;
            }
            key.push(c);
            chars.next();
        }
        if chars.next() != Some('=') {
            break; // malformed; stop parsing rather than loop forever
        }

        let mut value = String::new();
        if chars.peek() == Some(&'\'') {
            chars.next();
            while let Some(c) = chars.next() {
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            value.push(escaped);
                        }
                    }
                    '\'' => break,
                    other => value.push(other),
                }
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                value.push(c);
                chars.next();
            }
        }

        result.push((key.trim().to_string(), value));
    }

    result
}
