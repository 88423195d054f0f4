pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "memory-weaver")]
#[command(about = "Weave a childhood photo and an adult photo into one AI reunion portrait")]
pub struct CliConfig {
    #[arg(value_name = "CHILD_PHOTO", help = "Childhood photo (JPEG or PNG)")]
    pub child_photo: String,

    #[arg(value_name = "ADULT_PHOTO", help = "Adult photo (JPEG or PNG)")]
    pub adult_photo: String,

    #[arg(long, help = "TOML config file to load")]
    pub config: Option<String>,

    #[arg(long, help = "Generation endpoint URL override")]
    pub endpoint: Option<String>,

    #[arg(long, help = "API key (falls back to the GEMINI_API_KEY env var)")]
    pub api_key: Option<String>,

    #[arg(long, help = "Directory the portrait is saved into")]
    pub output_path: Option<String>,

    #[arg(long, help = "Retry ceiling for rate-limited requests")]
    pub max_retries: Option<u32>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}
