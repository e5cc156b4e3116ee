//! Asset Storage
//!
//! Uploads go through the [`ImageStore`] trait; the production implementation
//! is [`S3ImageStore`]. Federated profile pictures are downloaded through
//! [`RemoteImageFetcher`] before being handed to the same store.

mod remote;
mod s3;
mod ssrf;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::db::StoredImage;

pub use remote::{FetchError, HttpImageFetcher, RemoteImageFetcher};
pub use s3::S3ImageStore;
pub use ssrf::is_blocked_host;

/// Errors returned by an [`ImageStore`].
#[derive(Debug, Error)]
pub enum UploadError {
    /// Nothing to upload.
    #[error("Refusing to upload an empty file")]
    Empty,

    /// The storage backend rejected or failed the request.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Object storage for uploaded images.
///
/// One attempt per call; the bytes are stored unmodified.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `data` under the logical `folder` and return where it lives.
    async fn upload(&self, data: Bytes, folder: &str) -> Result<StoredImage, UploadError>;
}

/// Logical namespaces uploads are filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetFolder {
    ProfilePictures,
    MessOutlets,
    ResidencyOutlets,
    Rooms,
    Roommates,
    MenuItems,
}

impl AssetFolder {
    const fn suffix(self) -> &'static str {
        match self {
            Self::ProfilePictures => "users/profile_picture",
            Self::MessOutlets => "mess/outlets",
            Self::ResidencyOutlets => "residency/outlets",
            Self::Rooms => "residency/rooms",
            Self::Roommates => "residency/roommies",
            Self::MenuItems => "mess/menu",
        }
    }

    /// Full folder path below the configured asset root.
    #[must_use]
    pub fn path(self, root: &str) -> String {
        let root = root.trim_matches('/');
        if root.is_empty() {
            self.suffix().to_string()
        } else {
            format!("{root}/{}", self.suffix())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folders_live_under_the_asset_root() {
        assert_eq!(
            AssetFolder::ProfilePictures.path("space-venture"),
            "space-venture/users/profile_picture"
        );
        assert_eq!(AssetFolder::Roommates.path("/assets/"), "assets/residency/roommies");
        assert_eq!(AssetFolder::MenuItems.path(""), "mess/menu");
    }
}
