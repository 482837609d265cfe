use serde::{Deserialize, Serialize};

/// Meta tag holding the CSRF token value.
pub const CSRF_TOKEN_META: &str = "_csrf";
/// Meta tag holding the name of the header the token travels in.
pub const CSRF_HEADER_META: &str = "_csrf_header";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrfToken {
    pub header_name: String,
    pub value: String,
}

impl CsrfToken {
    pub fn new(header_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            header_name: header_name.into(),
            value: value.into(),
        }
    }

    /// Builds the pair from the two page-level meta values; both must be
    /// present and non-blank.
    pub fn from_meta(header_name: Option<&str>, value: Option<&str>) -> Option<Self> {
        let header_name = header_name.map(str::trim).filter(|v| !v.is_empty())?;
        let value = value.map(str::trim).filter(|v| !v.is_empty())?;
        Some(Self::new(header_name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_both_meta_values() {
        assert_eq!(
            CsrfToken::from_meta(Some("X-CSRF-TOKEN"), Some("abc")),
            Some(CsrfToken::new("X-CSRF-TOKEN", "abc"))
        );
        assert_eq!(CsrfToken::from_meta(Some("X-CSRF-TOKEN"), None), None);
        assert_eq!(CsrfToken::from_meta(Some("  "), Some("abc")), None);
    }
}
