//! Service base URL type.

use std::fmt;

use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated base URL of an OData service host.
///
/// Must be an absolute `http` or `https` URL with a host and without a query
/// or fragment. Relative request paths are appended to it, so a base URL may
/// already contain a service path.
///
/// # Example
///
/// ```
/// use odata_core::ServiceUrl;
///
/// let base = ServiceUrl::new("https://sapes5.sapdevcenter.com/").unwrap();
/// assert_eq!(
///     base.resolve("/sap/opu/odata/IWBEP/GWSAMPLE_BASIC/ProductSet"),
///     "https://sapes5.sapdevcenter.com/sap/opu/odata/IWBEP/GWSAMPLE_BASIC/ProductSet"
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ServiceUrl(Url);

impl ServiceUrl {
    /// Create a new service URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::ServiceUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        Ok(Self(url))
    }

    /// Returns the absolute URL for a request path.
    ///
    /// Absolute `http(s)://` inputs are returned unchanged; anything else is
    /// appended to the base URL, keeping the base path.
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        // The URL crate always adds a trailing slash to root paths,
        // so trim it before joining
        let base = self.0.as_str().trim_end_matches('/');
        format!("{}/{}", base, path.trim_start_matches('/'))
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::ServiceUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        let scheme = url.scheme();
        if scheme != "https" && scheme != "http" {
            return Err(InvalidInputError::ServiceUrl {
                value: original.to_string(),
                reason: "must use HTTP or HTTPS".to_string(),
            }
            .into());
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::ServiceUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        // Paths are appended to the base, which would land them after these.
        if url.query().is_some() || url.fragment().is_some() {
            return Err(InvalidInputError::ServiceUrl {
                value: original.to_string(),
                reason: "must not have a query or fragment".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for ServiceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
