use clap::Parser;
use memory_weaver::utils::logger;
use memory_weaver::{CliConfig, LocalStorage, PhotoSlot, PortraitEngine, WeaverConfig};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting memory-weaver CLI");
    if cli.verbose {
        tracing::debug!("CLI args: {:?}", cli);
    }

    // 解析配置：TOML 檔 + CLI 覆寫 + 環境變數補位
    let config = match WeaverConfig::resolve(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration failed: {}", e);
            eprintln!("❌ {}", e);
            eprintln!("💡 Set GEMINI_API_KEY or pass --api-key; see --help for all options");
            std::process::exit(1);
        }
    };

    // 創建存儲與生成引擎
    let storage = LocalStorage::new(config.output.path.clone());
    let mut engine = PortraitEngine::new(storage, config);

    match run(&mut engine, &cli).await {
        Ok(saved) => {
            println!("✅ Portrait generated successfully!");
            if let Some(path) = saved {
                println!("📁 Saved to: {}", path);
            }
        }
        Err(e) => {
            tracing::error!("❌ Portrait pipeline failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}

async fn run(
    engine: &mut PortraitEngine<LocalStorage, WeaverConfig>,
    cli: &CliConfig,
) -> memory_weaver::Result<Option<String>> {
    engine
        .attach_photo(PhotoSlot::Child, &cli.child_photo)
        .await?;
    engine
        .attach_photo(PhotoSlot::Adult, &cli.adult_photo)
        .await?;
    engine.generate().await?;
    engine.save_portrait().await
}
