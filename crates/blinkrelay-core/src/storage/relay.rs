use tracing::{error, info};

use crate::config::Config;
use crate::utils::{format_kb, slugify};

use super::{ObjectStore, UploadError, UploadTarget};

pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Publishes camera thumbnails under stable object paths.
pub struct SnapshotRelay<S> {
    store: S,
    bucket: String,
    prefix: String,
}

impl<S: ObjectStore> SnapshotRelay<S> {
    pub fn new(store: S, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    pub fn from_config(store: S, config: &Config) -> Self {
        Self::new(store, config.bucket_name.clone(), config.path_prefix.clone())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// `cameras/<prefix>-<slug>-latest.jpg`
    pub fn device_target(&self, name: &str) -> UploadTarget {
        self.target(format!("cameras/{}-{}-latest.jpg", self.prefix, slugify(name)))
    }

    /// `cameras/<prefix>-latest.jpg`, the alias for the primary device
    pub fn alias_target(&self) -> UploadTarget {
        self.target(format!("cameras/{}-latest.jpg", self.prefix))
    }

    /// Every target a device's image goes to. Only the first enumerated
    /// device also gets the alias.
    pub fn targets_for(&self, index: usize, name: &str) -> Vec<UploadTarget> {
        let mut targets = vec![self.device_target(name)];
        if index == 0 {
            targets.push(self.alias_target());
        }
        targets
    }

    fn target(&self, path: String) -> UploadTarget {
        UploadTarget {
            bucket: self.bucket.clone(),
            path,
        }
    }

    /// Upload one JPEG. Failures are logged here and returned; there is no retry.
    pub async fn upload(&self, bytes: &[u8], target: &UploadTarget) -> Result<(), UploadError> {
        match self.store.put_object(target, bytes, JPEG_CONTENT_TYPE).await {
            Ok(()) => {
                info!("Uploaded {} ({})", target.path, format_kb(bytes.len()));
                Ok(())
            }
            Err(e) => {
                error!(path = %target.path, status = ?e.status(), "{}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingStore;

    fn relay() -> SnapshotRelay<RecordingStore> {
        SnapshotRelay::new(RecordingStore::default(), "housephotos", "blink")
    }

    #[test]
    fn test_paths() {
        let relay = relay();
        assert_eq!(
            relay.device_target("Front Door"),
            UploadTarget {
                bucket: "housephotos".to_string(),
                path: "cameras/blink-front-door-latest.jpg".to_string(),
            }
        );
        assert_eq!(relay.alias_target().path, "cameras/blink-latest.jpg");
    }

    #[test]
    fn test_alias_only_for_first_device() {
        let relay = relay();
        let first: Vec<_> = relay.targets_for(0, "Yard/Gate").into_iter().map(|t| t.path).collect();
        assert_eq!(first, vec!["cameras/blink-yard-gate-latest.jpg", "cameras/blink-latest.jpg"]);
        assert_eq!(relay.targets_for(1, "Porch").len(), 1);
    }

    #[tokio::test]
    async fn test_upload_sends_jpeg() {
        let relay = relay();
        let target = relay.alias_target();
        relay.upload(&[1, 2, 3], &target).await.unwrap();

        let puts = relay.store().puts();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].0, target);
        assert_eq!(puts[0].1, vec![1, 2, 3]);
        assert_eq!(puts[0].2, "image/jpeg");
    }

    #[tokio::test]
    async fn test_upload_failure_is_returned() {
        let relay = relay();
        let target = relay.device_target("Porch");
        relay.store().fail_path(&target.path);
        let err = relay.upload(&[1, 2, 3], &target).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "Upload failed (500): storage unavailable");
    }
}
