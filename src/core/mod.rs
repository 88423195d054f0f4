pub mod encoder;
pub mod engine;
pub mod invoker;
pub mod request;
pub mod response;

pub use crate::domain::model::{GenerationPhase, ImageAsset, PhotoSlot, PortraitImage};
pub use crate::domain::ports::{ConfigProvider, Storage};
pub use crate::utils::error::Result;
