//! Session cookie type.

use std::fmt;

/// A cookie captured from a `Set-Cookie` response header.
///
/// Attributes are kept in the order the server sent them; valueless flags
/// such as `HttpOnly` carry an empty value.
///
/// # Example
///
/// ```
/// use odata_core::Cookie;
///
/// let cookie = Cookie::parse_set_cookie("SAP_SESSIONID=xyz; path=/; HttpOnly").unwrap();
/// assert_eq!(cookie.name(), "SAP_SESSIONID");
/// assert_eq!(cookie.pair(), "SAP_SESSIONID=xyz");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Cookie {
    name: String,
    value: String,
    attributes: Vec<(String, String)>,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            attributes: Vec::new(),
        }
    }

    /// Parse a single `Set-Cookie` header value.
    ///
    /// Returns `None` if the line has no `name=value` pair or the name is empty.
    pub fn parse_set_cookie(line: &str) -> Option<Self> {
        let mut parts = line.split(';');
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let attributes = parts
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
                None => (part.to_string(), String::new()),
            })
            .collect();

        Some(Self {
            name: name.to_string(),
            value: value.trim().to_string(),
            attributes,
        })
    }

    /// Returns the cookie name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the cookie value.
    ///
    /// # Security
    ///
    /// Session cookie values are credentials. Never log this value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the cookie attributes (`Path`, `HttpOnly`, ...).
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Whether the server sent this cookie to delete it: an empty value or a
    /// non-positive `Max-Age`. `Expires` dates are not parsed.
    pub fn is_removal(&self) -> bool {
        self.value.is_empty()
            || self.attributes.iter().any(|(key, value)| {
                key.eq_ignore_ascii_case("Max-Age")
                    && value.parse::<i64>().is_ok_and(|age| age <= 0)
            })
    }

    /// Returns the `name=value` pair as sent in a `Cookie` request header.
    pub fn pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }

    /// Join cookies into a single `Cookie` request header value.
    ///
    /// Returns `None` if there are no cookies.
    pub fn header_value(cookies: &[Cookie]) -> Option<String> {
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .iter()
                .map(Cookie::pair)
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

// Hide cookie value in Debug output
impl fmt::Debug for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cookie")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .field("attributes", &self.attributes)
            .finish()
    }
}
