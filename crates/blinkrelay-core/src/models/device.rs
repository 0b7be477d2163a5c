use serde::{Deserialize, Serialize};

/// Thumbnails smaller than this are placeholders or truncated downloads.
pub const MIN_IMAGE_BYTES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceKind {
    Camera,
    /// Blink Mini (the API calls these "owls")
    Mini,
    Doorbell,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Camera => "camera",
            DeviceKind::Mini => "mini",
            DeviceKind::Doorbell => "doorbell",
        }
    }
}

/// A camera as enumerated on one refresh. Not retained across cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: u64,
    pub network_id: u64,
    pub kind: DeviceKind,
    pub name: String,
    /// Last known thumbnail bytes
    pub image: Option<Vec<u8>>,
}

impl Device {
    /// The cached image, or `None` when it is missing or too small to be a
    /// real JPEG.
    pub fn image_for(&self) -> Option<&[u8]> {
        self.image
            .as_deref()
            .filter(|bytes| bytes.len() >= MIN_IMAGE_BYTES)
    }
}

/// Response from the homescreen endpoint. Only the fields the relay needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Homescreen {
    #[serde(default)]
    pub cameras: Vec<HomescreenDevice>,
    #[serde(default)]
    pub owls: Vec<HomescreenDevice>,
    #[serde(default)]
    pub doorbells: Vec<HomescreenDevice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HomescreenDevice {
    pub id: u64,
    pub network_id: u64,
    pub name: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl Homescreen {
    /// All devices in provider order: cameras, then minis, then doorbells.
    pub fn entries(&self) -> impl Iterator<Item = (DeviceKind, &HomescreenDevice)> {
        self.cameras
            .iter()
            .map(|d| (DeviceKind::Camera, d))
            .chain(self.owls.iter().map(|d| (DeviceKind::Mini, d)))
            .chain(self.doorbells.iter().map(|d| (DeviceKind::Doorbell, d)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(image: Option<Vec<u8>>) -> Device {
        Device {
            id: 1,
            network_id: 2,
            kind: DeviceKind::Camera,
            name: "Porch".to_string(),
            image,
        }
    }

    #[test]
    fn test_image_for_threshold() {
        assert!(device(None).image_for().is_none());
        assert!(device(Some(Vec::new())).image_for().is_none());
        assert!(device(Some(vec![0xff; 99])).image_for().is_none());
        assert_eq!(device(Some(vec![0xff; 100])).image_for().map(|b| b.len()), Some(100));
    }

    #[test]
    fn test_parse_homescreen_order() {
        let json = r#"{
            "account": {"id": 77},
            "cameras": [{"id": 10, "network_id": 5, "name": "Driveway", "thumbnail": "/media/u014/account/77/network/5/camera/10/clip_abc", "enabled": true}],
            "owls": [{"id": 20, "network_id": 5, "name": "Kitchen", "thumbnail": "/api/v3/media/accounts/77/networks/5/owl/20/thumbnail/thumbnail.jpg?ts=1700000000&ext="}],
            "doorbells": [{"id": 30, "network_id": 6, "name": "Front Door"}]
        }"#;

        let home: Homescreen = serde_json::from_str(json).expect("Failed to parse homescreen test JSON");
        let entries: Vec<_> = home.entries().map(|(kind, d)| (kind, d.name.as_str())).collect();
        assert_eq!(
            entries,
            vec![
                (DeviceKind::Camera, "Driveway"),
                (DeviceKind::Mini, "Kitchen"),
                (DeviceKind::Doorbell, "Front Door"),
            ]
        );
        assert!(home.doorbells[0].thumbnail.is_none());
    }

    #[test]
    fn test_parse_homescreen_missing_sections() {
        let home: Homescreen = serde_json::from_str(r#"{"cameras": []}"#).unwrap();
        assert_eq!(home.entries().count(), 0);
    }
}
