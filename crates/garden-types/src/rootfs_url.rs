use std::path::PathBuf;

use crate::error::GardenError;

/// Scheme that means "the path already refers to a directory on the host;
/// skip provisioning entirely."
pub const RAW_ROOTFS_SCHEME: &str = "raw";

/// A parsed rootfs URL. Scheme `raw` means the path component is already a
/// materialized directory on the host; any other scheme is opaque to the
/// orchestrator and is handed verbatim to the volume provider.
#[derive(Debug, Clone)]
pub struct RootfsUrl(url::Url);

impl RootfsUrl {
    pub fn parse(raw: &str) -> Result<Self, GardenError> {
        url::Url::parse(raw)
            .map(RootfsUrl)
            .map_err(|e| GardenError::invalid_input(format!("malformed rootfs url '{raw}': {e}")))
    }

    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    pub fn is_raw(&self) -> bool {
        self.scheme() == RAW_ROOTFS_SCHEME
    }

    /// Path component, with percent-decoding, usable directly as a
    /// filesystem path when `is_raw()` is true.
    pub fn path(&self) -> PathBuf {
        PathBuf::from(self.0.path())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_scheme_exposes_its_path() {
        let u = RootfsUrl::parse("raw:///tmp/rfs").unwrap();
        assert!(u.is_raw());
        assert_eq!(u.path(), PathBuf::from("/tmp/rfs"));
    }

    #[test]
    fn non_raw_scheme_is_opaque() {
        let u = RootfsUrl::parse("docker:///ubuntu").unwrap();
        assert!(!u.is_raw());
        assert_eq!(u.scheme(), "docker");
    }

    #[test]
    fn malformed_url_is_invalid_input() {
        let err = RootfsUrl::parse("not a url").unwrap_err();
        assert!(matches!(err, GardenError::InvalidInput { .. }));
    }
}
