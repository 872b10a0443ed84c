//! # optimize-assets
//!
//! Punto di ingresso del processore immagini.
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Costruisce e valida la configurazione
//! 4. Controlla la presenza di `cwebp` (solo warning)
//! 5. Elabora il catalogo, scrive `asset-manifest.json` e stampa il riepilogo
//!
//! ## Esempio di utilizzo:
//! ```bash
//! optimize-assets --source-dir ../levelgarment-clone --target-dir public/assets --verbose
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::error;

use site_asset_optimizer::cli::{init_logging, CommonArgs};
use site_asset_optimizer::platform::PlatformCommands;
use site_asset_optimizer::{AssetManifest, EventLog, ImageProcessor, NativeCodec};

#[derive(Parser)]
#[command(name = "optimize-assets")]
#[command(about = "Resize and re-encode site images into responsive WebP variants")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn print_summary(manifest: &AssetManifest, events: &EventLog) {
    let summary = &manifest.summary;
    println!("\n📊 Optimization Summary:");
    println!("  Total images processed: {}", summary.total_images);
    println!("  Total videos processed: {}", summary.total_videos);
    println!("  Original size: {}", summary.total_original_formatted);
    println!("  Optimized size: {}", summary.total_optimized_formatted);
    println!("  Compression: {:.2}%", summary.compression_ratio);
    if events.warning_count() > 0 {
        println!("  Warnings: {}", events.warning_count());
    }
    println!("\n✨ Asset optimization complete!");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.common.verbose)?;

    let config = args.common.load_config().await?;

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    PlatformCommands::instance()
        .check_tools(&[("cwebp", "WebP encoding")])
        .await;

    let json_output = config.json_output;
    let processor = ImageProcessor::new(config, NativeCodec::new());
    let mut events = EventLog::new(json_output);

    match processor.run(&mut events).await {
        Ok(manifest) => {
            if !json_output {
                print_summary(&manifest, &events);
            }
            Ok(())
        }
        Err(e) => {
            error!("❌ Asset optimization failed: {:#}", e);
            Err(e)
        }
    }
}
