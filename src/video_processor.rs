//! # Video Processing Module
//!
//! Questo modulo ottimizza i video della homepage e scrive il report video.
//!
//! ## Responsabilità:
//! - Lettura durata e dimensione dell'originale
//! - Copia primaria MP4 (H.264 + AAC, `+faststart`) e alternativa WebM (VP9 + Opus)
//! - Poster: frame a 0.5s scalato a 1280px, convertito in WebP q85
//! - Aggregazione dei risultati nel [`VideoReport`]
//!
//! ## Pipeline per video:
//! 1. Sorgente assente → evento `missing_source`, video saltato
//! 2. `ffprobe` per la durata (errore → durata 0)
//! 3. MP4, poi WebM: un fallimento elimina solo quella variante
//! 4. Poster PNG → WebP; se la conversione fallisce resta il PNG
//!
//! Nessuno step interrompe i successivi né gli altri video.
//!
//! ## Controllo qualità (CRF):
//! - 18-23: Alta qualità
//! - 24-28: Buona qualità (default 28, bilanciato per il web)
//! - 29+: File piccoli, qualità visibilmente ridotta

use crate::config::Config;
use crate::events::{EventLog, PipelineEvent};
use crate::file_manager::FileManager;
use crate::imaging::{EncodeParams, ImageCodec, OutputFormat};
use crate::progress::ProgressManager;
use crate::report::{OriginalVideo, PosterRecord, VideoRecord, VideoReport, VideoVariant};
use crate::transcoder::{Transcoder, VideoEncoding};
use anyhow::Result;
use std::path::Path;
use tracing::{debug, info};

/// Handles homepage video optimization
pub struct VideoProcessor<T: Transcoder, C: ImageCodec> {
    config: Config,
    transcoder: T,
    codec: C,
}

impl<T: Transcoder, C: ImageCodec> VideoProcessor<T, C> {
    pub fn new(config: Config, transcoder: T, codec: C) -> Self {
        Self {
            config,
            transcoder,
            codec,
        }
    }

    pub fn transcoder(&self) -> &T {
        &self.transcoder
    }

    fn web_path(&self, path: &Path) -> String {
        FileManager::web_path(path, &self.config.public_root())
    }

    /// Optimize one catalogued video; `None` when the source is missing
    pub async fn process_video(
        &self,
        file: &str,
        events: &mut EventLog,
        progress: &ProgressManager,
    ) -> Option<VideoRecord> {
        let source = self
            .config
            .source_path(&self.config.catalog.videos.dir)
            .join(file);

        if !source.exists() {
            events.record(PipelineEvent::MissingSource { path: source });
            return None;
        }

        let basename = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.to_string());
        let original_size = FileManager::file_size(&source).await;

        let duration = match self.transcoder.probe_duration(&source).await {
            Ok(duration) => duration,
            Err(e) => {
                events.record(PipelineEvent::ToolFailed {
                    tool: "ffprobe".to_string(),
                    step: "duration".to_string(),
                    path: source.clone(),
                    message: e.to_string(),
                });
                0.0
            }
        };

        info!(
            "🎬 Processing {} ({}, {:.1}s)...",
            basename,
            FileManager::format_size(original_size),
            duration
        );

        let settings = &self.config.video;
        let encodings = [
            ("mp4", VideoEncoding::primary(settings)),
            ("webm", VideoEncoding::alternate(settings)),
        ];

        let target_dir = self.config.video_target_dir();
        let mut variants = Vec::new();

        for (format, encoding) in &encodings {
            let output = target_dir.join(format!("{}.{}", basename, format));
            let spinner = progress.spinner(&format!("Encoding {}.{}", basename, format));
            let result = self.transcoder.transcode(&source, &output, encoding).await;
            spinner.finish_and_clear();

            match result {
                Ok(()) => {
                    let size = FileManager::file_size(&output).await;
                    let variant =
                        VideoVariant::new(format, self.web_path(&output), size, original_size);
                    info!(
                        "  ✅ {}: {} ({}% reduction)",
                        format.to_uppercase(),
                        variant.formatted_size,
                        variant.compression
                    );
                    variants.push(variant);
                }
                Err(e) => {
                    events.record(PipelineEvent::ToolFailed {
                        tool: "ffmpeg".to_string(),
                        step: format.to_string(),
                        path: source.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let poster = self.generate_poster(&source, &basename, events, progress).await;

        Some(VideoRecord {
            name: basename,
            original: OriginalVideo {
                path: file.to_string(),
                size: original_size,
                formatted_size: FileManager::format_size(original_size),
                duration,
            },
            variants,
            poster,
        })
    }

    /// Extract the poster frame and convert it to WebP.
    ///
    /// When the WebP step fails the intermediate PNG is kept and reported.
    async fn generate_poster(
        &self,
        source: &Path,
        basename: &str,
        events: &mut EventLog,
        progress: &ProgressManager,
    ) -> Option<PosterRecord> {
        let settings = &self.config.video;
        let poster_dir = self.config.poster_dir();
        let png_path = poster_dir.join(format!("{}.png", basename));
        let webp_path = poster_dir.join(format!("{}.webp", basename));

        let spinner = progress.spinner(&format!("Extracting poster for {}", basename));
        let extracted = self
            .transcoder
            .extract_frame(
                source,
                &png_path,
                settings.poster_offset_secs,
                settings.poster_width,
            )
            .await;
        spinner.finish_and_clear();

        if let Err(e) = extracted {
            events.record(PipelineEvent::ToolFailed {
                tool: "ffmpeg".to_string(),
                step: "poster".to_string(),
                path: source.to_path_buf(),
                message: e.to_string(),
            });
            return None;
        }

        if !png_path.exists() {
            events.record(PipelineEvent::ToolFailed {
                tool: "ffmpeg".to_string(),
                step: "poster".to_string(),
                path: source.to_path_buf(),
                message: format!("no frame written to {}", png_path.display()),
            });
            return None;
        }

        let params = EncodeParams {
            source: png_path.clone(),
            output: webp_path.clone(),
            width: None,
            format: OutputFormat::WebP {
                quality: settings.poster_quality,
            },
        };

        let poster_path = match self.codec.encode(&params).await {
            Ok(_) => {
                if let Err(e) = tokio::fs::remove_file(&png_path).await {
                    debug!("Could not remove {}: {}", png_path.display(), e);
                }
                webp_path
            }
            Err(e) => {
                events.record(PipelineEvent::PosterFallback {
                    path: png_path.clone(),
                    message: e.to_string(),
                });
                png_path
            }
        };

        let size = FileManager::file_size(&poster_path).await;
        info!("  🖼️  Poster: {}", FileManager::format_size(size));

        Some(PosterRecord {
            path: self.web_path(&poster_path),
            size,
            formatted_size: FileManager::format_size(size),
        })
    }

    /// Process every catalogued video, then write the report
    pub async fn run(&self, events: &mut EventLog) -> Result<VideoReport> {
        info!("🎬 Starting video optimization...");
        events.record(PipelineEvent::Start {
            processor: "videos".to_string(),
            source_dir: self.config.source_dir.clone(),
            target_dir: self.config.target_dir.clone(),
        });

        FileManager::ensure_dir(&self.config.video_target_dir()).await?;
        FileManager::ensure_dir(&self.config.poster_dir()).await?;

        let files = &self.config.catalog.videos.files;
        let progress = ProgressManager::new(files.len() as u64, self.config.json_output);
        let mut videos = Vec::new();

        for file in files {
            progress.update(file);
            if let Some(record) = self.process_video(file, events, &progress).await {
                videos.push(record);
            }
        }

        let report = VideoReport::finalize(videos, chrono::Utc::now().to_rfc3339());
        let report_path = self.config.video_report_path();
        report.write(&report_path).await?;
        progress.finish("✅ Video report written");
        info!("📋 Report written to: {}", report_path.display());

        events.record(PipelineEvent::Complete {
            processor: "videos".to_string(),
            output: report_path,
            items: report.summary.total_videos,
            original_size: report.summary.total_original_size,
            optimized_size: report.summary.total_optimized_size,
            warnings: events.warning_count(),
        });

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::codec::tests::FakeCodec;
    use crate::transcoder::tests::{FakeCall, FakeTranscoder};
    use std::path::PathBuf;
    use tempfile::TempDir;

    const MB: u64 = 1024 * 1024;

    fn setup(files: &[&str]) -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        let mut config = Config {
            source_dir: dir.path().join("export"),
            target_dir: dir.path().join("public").join("assets"),
            ..Default::default()
        };
        config.catalog.videos.dir = PathBuf::from("uploads");
        config.catalog.videos.files = files.iter().map(|f| f.to_string()).collect();
        (dir, config)
    }

    fn write_sparse(config: &Config, file: &str, size: u64) {
        let path = config.source_dir.join("uploads").join(file);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::File::create(&path).unwrap().set_len(size).unwrap();
    }

    #[tokio::test]
    async fn test_failed_webm_keeps_mp4_and_poster() {
        let (_dir, config) = setup(&["video_1.mp4", "video_2.mp4"]);
        write_sparse(&config, "video_1.mp4", 50 * MB);
        write_sparse(&config, "video_2.mp4", 20 * MB);

        let transcoder = FakeTranscoder::new(12.0)
            .with_output("mp4", 10 * MB)
            .failing("webm");
        let processor = VideoProcessor::new(config.clone(), transcoder, FakeCodec::new());
        let mut events = EventLog::new(false);
        let report = processor.run(&mut events).await.unwrap();

        assert_eq!(report.videos.len(), 2);
        let first = &report.videos[0];
        assert_eq!(first.name, "video_1");
        assert_eq!(first.original.path, "video_1.mp4");
        assert_eq!(first.original.duration, 12.0);
        assert_eq!(first.variants.len(), 1);
        assert_eq!(first.variants[0].format, "mp4");
        assert_eq!(first.variants[0].path, "/assets/videos/homepage/video_1.mp4");
        assert_eq!(first.variants[0].compression, 80.0);
        assert_eq!(first.optimized_size(), 10 * MB);

        let poster = first.poster.as_ref().unwrap();
        assert_eq!(poster.path, "/assets/videos/posters/video_1.webp");
        assert!(!config.poster_dir().join("video_1.png").exists());

        assert_eq!(report.videos[1].variants[0].compression, 50.0);
        assert_eq!(report.summary.total_original_size, 70 * MB);
        assert_eq!(report.summary.total_optimized_size, 20 * MB);
        assert_eq!(report.summary.savings_percent, 71.4);

        let webm_failures = events
            .events()
            .iter()
            .filter(|e| matches!(e, PipelineEvent::ToolFailed { step, .. } if step == "webm"))
            .count();
        assert_eq!(webm_failures, 2);
        assert!(config.video_report_path().exists());
    }

    #[tokio::test]
    async fn test_containers_get_their_encodings_and_poster_settings() {
        let (_dir, config) = setup(&["video_1.mp4"]);
        write_sparse(&config, "video_1.mp4", MB);

        let processor =
            VideoProcessor::new(config.clone(), FakeTranscoder::new(3.0), FakeCodec::new());
        let mut events = EventLog::new(false);
        processor.run(&mut events).await.unwrap();

        let target = config.video_target_dir();
        assert_eq!(
            processor.transcoder().calls(),
            vec![
                FakeCall::Transcode {
                    output: target.join("video_1.mp4"),
                    encoding: VideoEncoding::primary(&config.video),
                },
                FakeCall::Transcode {
                    output: target.join("video_1.webm"),
                    encoding: VideoEncoding::alternate(&config.video),
                },
                FakeCall::Frame {
                    output: config.poster_dir().join("video_1.png"),
                    offset_secs: 0.5,
                    width: 1280,
                },
            ]
        );

        let primary = VideoEncoding::primary(&config.video);
        assert_eq!(primary.video_codec, "libx264");
        assert_eq!(primary.audio_codec, "aac");
        assert!(primary.faststart);
        let alternate = VideoEncoding::alternate(&config.video);
        assert_eq!(alternate.video_codec, "libvpx-vp9");
        assert_eq!(alternate.audio_codec, "libopus");
        assert!(!alternate.faststart);

        let poster = processor.codec.calls().pop().unwrap();
        assert_eq!(poster.format, OutputFormat::WebP { quality: 85 });
    }

    #[tokio::test]
    async fn test_missing_video_is_skipped() {
        let (_dir, config) = setup(&["video_1.mp4", "video_2.mp4"]);
        write_sparse(&config, "video_2.mp4", MB);

        let processor =
            VideoProcessor::new(config, FakeTranscoder::new(3.0), FakeCodec::new());
        let mut events = EventLog::new(false);
        let report = processor.run(&mut events).await.unwrap();

        assert_eq!(report.summary.total_videos, 1);
        assert_eq!(report.videos[0].name, "video_2");
        let missing = events.missing_sources();
        assert_eq!(missing.len(), 1);
        assert!(missing[0].ends_with("video_1.mp4"));
    }

    #[tokio::test]
    async fn test_poster_falls_back_to_png() {
        let (_dir, config) = setup(&["video_1.mp4"]);
        write_sparse(&config, "video_1.mp4", MB);

        let processor = VideoProcessor::new(
            config.clone(),
            FakeTranscoder::new(3.0),
            FakeCodec::new().failing_webp(),
        );
        let mut events = EventLog::new(false);
        let report = processor.run(&mut events).await.unwrap();

        let poster = report.videos[0].poster.as_ref().unwrap();
        assert_eq!(poster.path, "/assets/videos/posters/video_1.png");
        assert_eq!(poster.size, 500);
        assert!(config.poster_dir().join("video_1.png").exists());
        assert!(events
            .events()
            .iter()
            .any(|e| matches!(e, PipelineEvent::PosterFallback { .. })));
    }

    #[tokio::test]
    async fn test_probe_failure_and_no_variants() {
        let (_dir, config) = setup(&["video_1.mp4"]);
        write_sparse(&config, "video_1.mp4", 5 * MB);

        let mut transcoder = FakeTranscoder::new(0.0)
            .without_duration()
            .failing("mp4")
            .failing("webm");
        transcoder.fail_frame = true;
        let processor = VideoProcessor::new(config, transcoder, FakeCodec::new());
        let mut events = EventLog::new(false);
        let report = processor.run(&mut events).await.unwrap();

        let video = &report.videos[0];
        assert_eq!(video.original.duration, 0.0);
        assert!(video.variants.is_empty());
        assert!(video.poster.is_none());
        assert_eq!(report.summary.total_optimized_size, 5 * MB);
        assert_eq!(report.summary.savings_percent, 0.0);
        // probe, mp4, webm, poster
        assert_eq!(events.warning_count(), 4);
        assert_eq!(processor.transcoder().calls().len(), 3);
    }
}
