use crate::core::encoder::{self, MAX_PHOTO_BYTES};
use crate::core::invoker::BackoffInvoker;
use crate::core::request::{portrait_request, GenerateContentRequest};
use crate::core::response::{extract_portrait, GenerateContentResponse};
use crate::domain::model::{
    GenerationPhase, ImageAsset, PhotoSlot, PortraitImage, PORTRAIT_FILENAME,
};
use crate::domain::ports::{ConfigProvider, Storage};
use crate::utils::error::{Result, WeaverError};

pub const MISSING_PHOTOS_MESSAGE: &str = "Upload both photos first.";
pub const NO_IMAGE_MESSAGE: &str = "Model couldn't generate an image.";
pub const OVERSIZED_PHOTO_MESSAGE: &str = "Image exceeds 4MB";
pub const UNSUPPORTED_PHOTO_MESSAGE: &str = "Only JPEG and PNG photos are supported";
pub const GENERATION_BUSY_MESSAGE: &str = "A generation is already in progress.";

pub struct PortraitEngine<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    invoker: BackoffInvoker,
    child: Option<ImageAsset>,
    adult: Option<ImageAsset>,
    phase: GenerationPhase,
    error_message: Option<String>,
    portrait: Option<PortraitImage>,
}

impl<S: Storage, C: ConfigProvider> PortraitEngine<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let invoker = BackoffInvoker::from_config(&config);
        Self {
            storage,
            config,
            invoker,
            child: None,
            adult: None,
            phase: GenerationPhase::Idle,
            error_message: None,
            portrait: None,
        }
    }

    pub fn phase(&self) -> GenerationPhase {
        self.phase
    }

    pub fn photo(&self, slot: PhotoSlot) -> Option<&ImageAsset> {
        match slot {
            PhotoSlot::Child => self.child.as_ref(),
            PhotoSlot::Adult => self.adult.as_ref(),
        }
    }

    pub fn portrait(&self) -> Option<&PortraitImage> {
        self.portrait.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub async fn attach_photo(&mut self, slot: PhotoSlot, path: &str) -> Result<()> {
        let media_type = match encoder::media_type_for(path) {
            Some(media_type) => media_type,
            None => {
                tracing::warn!("❌ {} photo rejected: unsupported type ({})", slot.label(), path);
                return Err(self.record_failure(WeaverError::ValidationError {
                    message: UNSUPPORTED_PHOTO_MESSAGE.to_string(),
                }));
            }
        };

        // 大小限制在讀檔之前檢查，超過就不動原本的照片
        let size = match self.storage.file_size(path).await {
            Ok(size) => size,
            Err(WeaverError::IoError(source)) => {
                return Err(self.record_failure(WeaverError::EncodingError { source }));
            }
            Err(other) => return Err(self.record_failure(other)),
        };
        if size > MAX_PHOTO_BYTES {
            tracing::warn!("❌ {} photo rejected: {} bytes", slot.label(), size);
            return Err(self.record_failure(WeaverError::ValidationError {
                message: OVERSIZED_PHOTO_MESSAGE.to_string(),
            }));
        }

        let asset = match encoder::encode_photo(&self.storage, path, media_type).await {
            Ok(asset) => asset,
            Err(error) => return Err(self.record_failure(error)),
        };

        tracing::info!(
            "📷 Attached {} photo from {} ({} base64 chars)",
            slot.label(),
            path,
            asset.data.len()
        );

        match slot {
            PhotoSlot::Child => self.child = Some(asset),
            PhotoSlot::Adult => self.adult = Some(asset),
        }
        self.error_message = None;
        if self.phase == GenerationPhase::Idle {
            self.phase = GenerationPhase::AwaitingPhotos;
        }
        Ok(())
    }

    pub async fn generate(&mut self) -> Result<()> {
        // 同一個 engine 同時只允許一個生成流程
        if self.phase == GenerationPhase::Generating {
            return Err(self.record_failure(WeaverError::ValidationError {
                message: GENERATION_BUSY_MESSAGE.to_string(),
            }));
        }

        let (Some(child), Some(adult)) = (&self.child, &self.adult) else {
            let error = WeaverError::ValidationError {
                message: MISSING_PHOTOS_MESSAGE.to_string(),
            };
            self.error_message = Some(error.to_string());
            self.phase = GenerationPhase::Failed;
            return Err(error);
        };
        if child.is_empty() || adult.is_empty() {
            let error = WeaverError::ValidationError {
                message: MISSING_PHOTOS_MESSAGE.to_string(),
            };
            self.error_message = Some(error.to_string());
            self.phase = GenerationPhase::Failed;
            return Err(error);
        }

        tracing::info!(
            "🎨 Generating portrait from {} + {}",
            child.source,
            adult.source
        );
        let request = portrait_request(child, adult);

        // 進入 Generating 前清掉上一輪的結果與錯誤
        self.portrait = None;
        self.error_message = None;
        self.phase = GenerationPhase::Generating;

        match self.run_generation(&request).await {
            Ok(payload) => {
                tracing::info!("✅ Portrait generated ({} base64 chars)", payload.len());
                self.portrait = Some(PortraitImage::new(payload));
                self.phase = GenerationPhase::Succeeded;
                Ok(())
            }
            Err(error) => {
                tracing::error!("❌ Generation failed: {}", error);
                self.phase = GenerationPhase::Failed;
                Err(self.record_failure(error))
            }
        }
    }

    async fn run_generation(&self, request: &GenerateContentRequest) -> Result<String> {
        let response = self.invoker.invoke(request).await?;
        let parsed: GenerateContentResponse = response.json().await?;

        match extract_portrait(&parsed) {
            Some(payload) if !payload.is_empty() => Ok(payload),
            _ => Err(WeaverError::ResponseParseError {
                message: NO_IMAGE_MESSAGE.to_string(),
            }),
        }
    }

    pub async fn save_portrait(&self) -> Result<Option<String>> {
        let Some(portrait) = &self.portrait else {
            return Ok(None);
        };

        let bytes = portrait.decode()?;
        self.storage.write_file(PORTRAIT_FILENAME, &bytes).await?;

        let output_path = format!("{}/{}", self.config.output_path(), PORTRAIT_FILENAME);
        tracing::info!("💾 Portrait saved to {}", output_path);
        Ok(Some(output_path))
    }

    pub fn reset(&mut self) {
        self.child = None;
        self.adult = None;
        self.portrait = None;
        self.error_message = None;
        self.phase = GenerationPhase::Idle;
    }

    fn record_failure(&mut self, error: WeaverError) -> WeaverError {
        self.error_message = Some(error.to_string());
        error
    }
}
