//! # optimize-videos
//!
//! Punto di ingresso del processore video.
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI e configura il logging
//! 2. Costruisce e valida la configurazione
//! 3. Controlla `ffmpeg`, `ffprobe` e `cwebp` (solo warning)
//! 4. Transcodifica i video della homepage, estrae i poster
//! 5. Scrive `videos/video-optimization-report.json` e stampa il riepilogo

use anyhow::Result;
use clap::Parser;
use tracing::error;

use site_asset_optimizer::cli::{init_logging, CommonArgs};
use site_asset_optimizer::platform::PlatformCommands;
use site_asset_optimizer::{EventLog, FfmpegTranscoder, NativeCodec, VideoProcessor, VideoReport};

#[derive(Parser)]
#[command(name = "optimize-videos")]
#[command(about = "Transcode homepage videos to MP4/WebM and extract poster frames")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

fn print_summary(report: &VideoReport, events: &EventLog) {
    let summary = &report.summary;
    println!("\n📊 Video Optimization Summary:");
    println!("  Total videos processed: {}", summary.total_videos);
    println!("  Original size: {}", summary.total_original_formatted);
    println!("  Optimized size: {}", summary.total_optimized_formatted);
    println!(
        "  Space saved: {} ({:.1}%)",
        summary.total_savings_formatted, summary.savings_percent
    );
    if events.warning_count() > 0 {
        println!("  Warnings: {}", events.warning_count());
    }
    println!("\n✨ Video optimization complete!");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.common.verbose)?;

    let config = args.common.load_config().await?;

    PlatformCommands::instance()
        .check_tools(&[
            ("ffmpeg", "video transcoding and poster frames"),
            ("ffprobe", "video duration"),
            ("cwebp", "poster WebP encoding"),
        ])
        .await;

    let json_output = config.json_output;
    let processor = VideoProcessor::new(config, FfmpegTranscoder::new(), NativeCodec::new());
    let mut events = EventLog::new(json_output);

    match processor.run(&mut events).await {
        Ok(report) => {
            if !json_output {
                print_summary(&report, &events);
            }
            Ok(())
        }
        Err(e) => {
            error!("❌ Video optimization failed: {:#}", e);
            Err(e)
        }
    }
}
