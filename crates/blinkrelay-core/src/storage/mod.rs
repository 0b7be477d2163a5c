//! Storage module for publishing snapshots
//!
//! - `ObjectStore`: the put-object capability the relay writes through
//! - `SupabaseStorage`: Supabase Storage REST implementation
//! - `SnapshotRelay`: derives object paths and uploads camera thumbnails

pub mod error;
pub mod relay;
pub mod supabase;

use async_trait::async_trait;

pub use error::UploadError;
pub use relay::SnapshotRelay;
pub use supabase::SupabaseStorage;

/// Where an object is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub bucket: String,
    pub path: String,
}

/// Object storage backend trait
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `bytes` to `target`, replacing any existing object.
    /// One attempt; callers decide what a failure means.
    async fn put_object(
        &self,
        target: &UploadTarget,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), UploadError>;
}
