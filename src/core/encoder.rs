use crate::domain::model::ImageAsset;
use crate::domain::ports::Storage;
use crate::utils::error::{Result, WeaverError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// 上傳照片的大小上限（4MB），在讀檔之前就先檢查
pub const MAX_PHOTO_BYTES: u64 = 4 * 1024 * 1024;

pub fn media_type_for(path: &str) -> Option<&'static str> {
    let extension = std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())?
        .to_ascii_lowercase();

    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

pub async fn encode_photo<S: Storage>(
    storage: &S,
    path: &str,
    media_type: &str,
) -> Result<ImageAsset> {
    let bytes = storage.read_file(path).await.map_err(|e| match e {
        WeaverError::IoError(source) => WeaverError::EncodingError { source },
        other => other,
    })?;

    tracing::debug!("Encoding {} bytes from {} as {}", bytes.len(), path, media_type);

    Ok(ImageAsset {
        data: BASE64.encode(&bytes),
        media_type: media_type.to_string(),
        source: path.to_string(),
    })
}
