use crate::utils::error::{Result, WeaverError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

pub const PORTRAIT_MEDIA_TYPE: &str = "image/png";
pub const PORTRAIT_FILENAME: &str = "Burger_AI_Portrait.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoSlot {
    Child,
    Adult,
}

impl PhotoSlot {
    pub fn label(&self) -> &'static str {
        match self {
            PhotoSlot::Child => "child",
            PhotoSlot::Adult => "adult",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPhase {
    Idle,
    AwaitingPhotos,
    Generating,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAsset {
    pub data: String,
    pub media_type: String,
    pub source: String,
}

impl ImageAsset {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct PortraitImage {
    // base64 payload exactly as the API returned it; decoding happens at save time
    data: String,
}

impl PortraitImage {
    pub fn new(data: String) -> Self {
        PortraitImage { data }
    }

    pub fn payload(&self) -> &str {
        &self.data
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", PORTRAIT_MEDIA_TYPE, self.data)
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(&self.data)
            .map_err(|e| WeaverError::ResponseParseError {
                message: format!("Portrait payload is not valid base64: {}", e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_keeps_payload_verbatim() {
        let portrait = PortraitImage::new("ABC123".to_string());
        assert_eq!(portrait.data_uri(), "data:image/png;base64,ABC123");
        assert_eq!(portrait.payload(), "ABC123");
    }

    #[test]
    fn test_decode_rejects_invalid_payload() {
        let portrait = PortraitImage::new("not base64!!!".to_string());
        assert!(portrait.decode().is_err());
    }

    #[test]
    fn test_decode_roundtrip() {
        let encoded = BASE64.encode(b"fake png bytes");
        let portrait = PortraitImage::new(encoded);
        assert_eq!(portrait.decode().unwrap(), b"fake png bytes");
    }
}
