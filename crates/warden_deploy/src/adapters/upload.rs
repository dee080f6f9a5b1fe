use std::path::Path;
use std::str::FromStr;

use warden_core::RemoteError;

use crate::error::DeployError;

/// Large-object transfer seam. Given a sealed archive on disk and a
/// destination, the uploader either succeeds or fails; this crate only
/// decides the object key.
pub trait CodeUploader {
    fn upload_archive(
        &self,
        archive_path: &Path,
        bucket: &str,
        key: &str,
    ) -> Result<(), RemoteError>;
}

/// Destination locator for uploaded bundles, `s3://bucket/prefix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Location {
    pub bucket: String,
    pub key_prefix: String,
}

impl S3Location {
    /// Object key for one function's bundle beneath this location.
    pub fn object_key(&self, function_name: &str) -> String {
        let prefix = self.key_prefix.trim_matches('/');
        if prefix.is_empty() {
            function_name.to_string()
        } else {
            format!("{prefix}/{function_name}")
        }
    }
}

impl FromStr for S3Location {
    type Err = DeployError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let rest = value
            .strip_prefix("s3://")
            .ok_or_else(|| DeployError::InvalidUploadTarget(value.to_string()))?;
        let (bucket, key_prefix) = match rest.split_once('/') {
            Some((bucket, prefix)) => (bucket, prefix),
            None => (rest, ""),
        };
        if bucket.is_empty() {
            return Err(DeployError::InvalidUploadTarget(value.to_string()));
        }
        Ok(Self {
            bucket: bucket.to_string(),
            key_prefix: key_prefix.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bucket_and_prefix() {
        let location: S3Location = "s3://warden-assets/bundles".parse().expect("should parse");
        assert_eq!(location.bucket, "warden-assets");
        assert_eq!(location.key_prefix, "bundles");
        assert_eq!(
            location.object_key("warden-ec2-tag-compliance"),
            "bundles/warden-ec2-tag-compliance"
        );
    }

    #[test]
    fn bare_bucket_keys_at_the_root() {
        let location: S3Location = "s3://warden-assets".parse().expect("should parse");
        assert_eq!(location.key_prefix, "");
        assert_eq!(
            location.object_key("warden-s3-bucket-check"),
            "warden-s3-bucket-check"
        );
    }

    #[test]
    fn rejects_non_s3_uris() {
        assert!("https://warden-assets/bundles".parse::<S3Location>().is_err());
        assert!("s3://".parse::<S3Location>().is_err());
    }
}
