//! # Transcoder Module
//!
//! Capacità video usata dal processore video, dietro il trait [`Transcoder`].
//!
//! ## Responsabilità:
//! - Lettura della durata con `ffprobe`
//! - Transcodifica con `ffmpeg` secondo un [`VideoEncoding`] (MP4 o WebM)
//! - Estrazione di un singolo frame ridimensionato (poster)
//!
//! ## Comandi:
//! ```text
//! ffprobe -i in.mp4 -show_entries format=duration -v quiet -of csv=p=0
//! ffmpeg -i in.mp4 -c:v libx264 -b:v 800k -crf 28 -c:a aac -b:a 128k -movflags +faststart out.mp4 -y
//! ffmpeg -i in.mp4 -c:v libvpx-vp9 -b:v 800k -crf 28 -c:a libopus -b:a 128k out.webm -y
//! ffmpeg -i in.mp4 -ss 00:00:00.5 -vframes 1 -vf scale=1280:-1 poster.png -y
//! ```
//!
//! Ogni chiamata attende la fine del processo, senza timeout.

use crate::config::VideoSettings;
use crate::error::OptimizeError;
use crate::tools::{run_tool, ToolOutput};
use std::path::Path;
use tracing::debug;

/// Codec and rate settings of one output container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoEncoding {
    pub video_codec: String,
    pub video_bitrate: String,
    pub crf: u8,
    pub audio_codec: String,
    pub audio_bitrate: String,
    /// Move the moov atom to the front (MP4 only)
    pub faststart: bool,
}

impl VideoEncoding {
    /// H.264/AAC MP4 settings
    pub fn primary(settings: &VideoSettings) -> Self {
        Self {
            video_codec: settings.video_codec.clone(),
            video_bitrate: settings.video_bitrate.clone(),
            crf: settings.crf,
            audio_codec: settings.audio_codec.clone(),
            audio_bitrate: settings.audio_bitrate.clone(),
            faststart: true,
        }
    }

    /// VP9/Opus WebM settings
    pub fn alternate(settings: &VideoSettings) -> Self {
        Self {
            video_codec: settings.alt_video_codec.clone(),
            video_bitrate: settings.video_bitrate.clone(),
            crf: settings.crf,
            audio_codec: settings.alt_audio_codec.clone(),
            audio_bitrate: settings.audio_bitrate.clone(),
            faststart: false,
        }
    }
}

/// Video probe/transcode capability
#[allow(async_fn_in_trait)]
pub trait Transcoder {
    /// Duration of `video` in seconds
    async fn probe_duration(&self, video: &Path) -> Result<f64, OptimizeError>;

    /// Re-encode `video` into `output`, overwriting it
    async fn transcode(
        &self,
        video: &Path,
        output: &Path,
        encoding: &VideoEncoding,
    ) -> Result<(), OptimizeError>;

    /// Write the frame at `offset_secs`, scaled to `width` px, to `output`
    async fn extract_frame(
        &self,
        video: &Path,
        output: &Path,
        offset_secs: f64,
        width: u32,
    ) -> Result<(), OptimizeError>;
}

/// `ffmpeg`/`ffprobe` backed transcoder
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegTranscoder;

fn path_arg(path: &Path) -> Result<&str, OptimizeError> {
    path.to_str()
        .ok_or_else(|| OptimizeError::Validation(format!("Invalid path: {:?}", path)))
}

/// `HH:MM:SS.s` timestamp for `-ss`
pub fn format_timestamp(secs: f64) -> String {
    let secs = secs.max(0.0);
    let hours = (secs / 3600.0).floor();
    let minutes = ((secs - hours * 3600.0) / 60.0).floor();
    let seconds = secs - hours * 3600.0 - minutes * 60.0;
    format!("{:02}:{:02}:{:04.1}", hours as u64, minutes as u64, seconds)
}

impl FfmpegTranscoder {
    pub fn new() -> Self {
        Self
    }

    pub fn probe_args(video: &Path) -> Result<Vec<String>, OptimizeError> {
        Ok(crate::args![
            "-i",
            path_arg(video)?,
            "-show_entries",
            "format=duration",
            "-v",
            "quiet",
            "-of",
            "csv=p=0"
        ])
    }

    pub fn transcode_args(
        video: &Path,
        output: &Path,
        encoding: &VideoEncoding,
    ) -> Result<Vec<String>, OptimizeError> {
        let mut args = crate::args![
            "-i",
            path_arg(video)?,
            "-c:v",
            encoding.video_codec,
            "-b:v",
            encoding.video_bitrate,
            "-crf",
            encoding.crf,
            "-c:a",
            encoding.audio_codec,
            "-b:a",
            encoding.audio_bitrate
        ];
        if encoding.faststart {
            args.extend(crate::args!["-movflags", "+faststart"]);
        }
        args.extend(crate::args![path_arg(output)?, "-y"]);
        Ok(args)
    }

    pub fn frame_args(
        video: &Path,
        output: &Path,
        offset_secs: f64,
        width: u32,
    ) -> Result<Vec<String>, OptimizeError> {
        Ok(crate::args![
            "-i",
            path_arg(video)?,
            "-ss",
            format_timestamp(offset_secs),
            "-vframes",
            1,
            "-vf",
            format!("scale={}:-1", width),
            path_arg(output)?,
            "-y"
        ])
    }

    async fn run(&self, tool: &str, args: &[String]) -> Result<ToolOutput, OptimizeError> {
        let output = run_tool(tool, args).await.map_err(|e| {
            OptimizeError::MissingDependency(format!("{} could not be started: {}", tool, e))
        })?;

        if !output.success {
            return Err(OptimizeError::FFmpeg(format!(
                "{} exited with an error: {}",
                tool,
                output.error_summary()
            )));
        }

        Ok(output)
    }
}

impl Transcoder for FfmpegTranscoder {
    async fn probe_duration(&self, video: &Path) -> Result<f64, OptimizeError> {
        let output = self.run("ffprobe", &Self::probe_args(video)?).await?;
        let raw = output.stdout.trim();
        raw.parse::<f64>().map_err(|_| {
            OptimizeError::FFmpeg(format!("Unexpected ffprobe duration output: {:?}", raw))
        })
    }

    async fn transcode(
        &self,
        video: &Path,
        output: &Path,
        encoding: &VideoEncoding,
    ) -> Result<(), OptimizeError> {
        let result = self
            .run("ffmpeg", &Self::transcode_args(video, output, encoding)?)
            .await?;
        debug!(
            "{} encoded {} in {:.1}s",
            encoding.video_codec,
            output.display(),
            result.elapsed.as_secs_f64()
        );
        Ok(())
    }

    async fn extract_frame(
        &self,
        video: &Path,
        output: &Path,
        offset_secs: f64,
        width: u32,
    ) -> Result<(), OptimizeError> {
        self.run("ffmpeg", &Self::frame_args(video, output, offset_secs, width)?)
            .await?;
        Ok(())
    }
}
