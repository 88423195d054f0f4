pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::cli::LocalStorage;
pub use config::toml_config::WeaverConfig;
pub use crate::core::engine::PortraitEngine;
pub use crate::core::invoker::{BackoffInvoker, RetryPolicy};
pub use domain::model::{GenerationPhase, PhotoSlot, PortraitImage};
pub use utils::error::{Result, WeaverError};
