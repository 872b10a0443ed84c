//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione della pipeline.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con root sorgente/destinazione, qualità e bitrate
//! - Fornisce validazione robusta dei parametri
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default identici alle costanti storiche degli script
//!
//! ## Parametri immagini (`ImageSettings`):
//! - `webp_quality`: Qualità WebP delle varianti (1-100, default: 82)
//! - `jpeg_quality`: Qualità del fallback JPEG (1-100, default: 88)
//! - `png_compression`: Livello di compressione del fallback PNG (0-9, default: 9)
//!
//! ## Parametri video (`VideoSettings`):
//! - `video_bitrate` / `audio_bitrate`: Bitrate target (default: "800k" / "128k")
//! - `crf`: CRF video (0-51, default: 28, più basso = migliore qualità)
//! - `video_codec` / `audio_codec`: Codec primari MP4 (libx264 + aac)
//! - `alt_video_codec` / `alt_audio_codec`: Codec WebM (libvpx-vp9 + libopus)
//! - `poster_offset_secs`, `poster_width`, `poster_quality`: Frame poster (0.5s, 1280px, q85)
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     target_dir: PathBuf::from("dist/assets"),
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::catalog::AssetCatalog;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Encoding settings for image variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    /// WebP quality for resized and full-size variants (1-100)
    pub webp_quality: u8,
    /// JPEG quality for the original-format fallback (1-100)
    pub jpeg_quality: u8,
    /// PNG compression level for the original-format fallback (0-9)
    pub png_compression: u8,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            webp_quality: 82,
            jpeg_quality: 88,
            png_compression: 9,
        }
    }
}

/// Transcoding settings for homepage videos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    pub video_bitrate: String,
    pub audio_bitrate: String,
    /// Video CRF value (0-51, lower = better quality)
    pub crf: u8,
    pub video_codec: String,
    pub audio_codec: String,
    pub alt_video_codec: String,
    pub alt_audio_codec: String,
    /// Playback offset of the poster frame, in seconds
    pub poster_offset_secs: f64,
    pub poster_width: u32,
    /// WebP quality of the poster (1-100)
    pub poster_quality: u8,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            video_bitrate: "800k".to_string(),
            audio_bitrate: "128k".to_string(),
            crf: 28,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            alt_video_codec: "libvpx-vp9".to_string(),
            alt_audio_codec: "libopus".to_string(),
            poster_offset_secs: 0.5,
            poster_width: 1280,
            poster_quality: 85,
        }
    }
}

/// Configuration shared by the asset and video processors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the legacy content export
    pub source_dir: PathBuf,
    /// Root of the generated site assets
    pub target_dir: PathBuf,
    pub image: ImageSettings,
    pub video: VideoSettings,
    pub catalog: AssetCatalog,
    /// Output progress and pipeline events as JSON lines for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("../levelgarment-clone"),
            target_dir: PathBuf::from("public/assets"),
            image: ImageSettings::default(),
            video: VideoSettings::default(),
            catalog: AssetCatalog::default(),
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        for (name, quality) in [
            ("WebP quality", self.image.webp_quality),
            ("JPEG quality", self.image.jpeg_quality),
            ("Poster quality", self.video.poster_quality),
        ] {
            if quality == 0 || quality > 100 {
                return Err(anyhow::anyhow!("{} must be between 1 and 100", name));
            }
        }

        if self.image.png_compression > 9 {
            return Err(anyhow::anyhow!("PNG compression must be between 0 and 9"));
        }

        if self.video.crf > 51 {
            return Err(anyhow::anyhow!("Video CRF must be between 0 and 51"));
        }

        if self.video.poster_width == 0 {
            return Err(anyhow::anyhow!("Poster width must be greater than 0"));
        }

        if !self.video.poster_offset_secs.is_finite() || self.video.poster_offset_secs < 0.0 {
            return Err(anyhow::anyhow!("Poster offset must be a non-negative number of seconds"));
        }

        if self.video.video_bitrate.trim().is_empty() || self.video.audio_bitrate.trim().is_empty() {
            return Err(anyhow::anyhow!("Video and audio bitrates must not be empty"));
        }

        let widths = [
            &self.catalog.logos.widths,
            &self.catalog.products.widths,
            &self.catalog.blog.widths,
            &self.catalog.portfolio.widths,
        ];
        if widths.iter().any(|list| list.contains(&0)) {
            return Err(anyhow::anyhow!("Variant widths must be greater than 0"));
        }

        if self.source_dir == self.target_dir {
            return Err(anyhow::anyhow!(
                "Source and target directories must differ: {}",
                self.source_dir.display()
            ));
        }

        Ok(())
    }

    /// Directory receiving homepage videos (copied or transcoded)
    pub fn video_target_dir(&self) -> PathBuf {
        self.target_dir.join("videos").join("homepage")
    }

    /// Directory receiving poster stills
    pub fn poster_dir(&self) -> PathBuf {
        self.target_dir.join("videos").join("posters")
    }

    /// Path of the image manifest
    pub fn manifest_path(&self) -> PathBuf {
        self.target_dir.join("asset-manifest.json")
    }

    /// Path of the video report, next to the homepage video directory
    pub fn video_report_path(&self) -> PathBuf {
        self.target_dir.join("videos").join("video-optimization-report.json")
    }

    /// Web root that video paths are reported against (parent of the target root)
    pub fn public_root(&self) -> PathBuf {
        self.target_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Resolve a catalog path against the source root
    pub fn source_path(&self, relative: &Path) -> PathBuf {
        self.source_dir.join(relative)
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.image.webp_quality = 0;
        assert!(config.validate().is_err());

        config.image.webp_quality = 82;
        config.video.crf = 52;
        assert!(config.validate().is_err());

        config.video.crf = 28;
        config.image.png_compression = 10;
        assert!(config.validate().is_err());

        config.image.png_compression = 9;
        config.catalog.logos.widths.push(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.image.webp_quality, 82);
        assert_eq!(config.image.jpeg_quality, 88);
        assert_eq!(config.image.png_compression, 9);
        assert_eq!(config.video.crf, 28);
        assert_eq!(config.video.video_bitrate, "800k");
        assert_eq!(config.video.audio_bitrate, "128k");
        assert_eq!(config.video.poster_width, 1280);
        assert_eq!(config.video.poster_quality, 85);
        assert!(!config.json_output);
    }

    #[test]
    fn test_output_layout() {
        let config = Config {
            target_dir: PathBuf::from("/site/public/assets"),
            ..Default::default()
        };
        assert_eq!(config.manifest_path(), PathBuf::from("/site/public/assets/asset-manifest.json"));
        assert_eq!(config.video_target_dir(), PathBuf::from("/site/public/assets/videos/homepage"));
        assert_eq!(config.poster_dir(), PathBuf::from("/site/public/assets/videos/posters"));
        assert_eq!(
            config.video_report_path(),
            PathBuf::from("/site/public/assets/videos/video-optimization-report.json")
        );
        assert_eq!(config.public_root(), PathBuf::from("/site/public"));
    }

    #[tokio::test]
    async fn test_config_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let mut original_config = Config {
            source_dir: PathBuf::from("/export"),
            target_dir: PathBuf::from("/site/assets"),
            ..Default::default()
        };
        original_config.video.crf = 24;
        original_config.catalog.portfolio.limit = 10;

        original_config.save_to_file(&config_path).await.unwrap();
        let loaded_config = Config::from_file(&config_path).await.unwrap();

        assert_eq!(loaded_config, original_config);
    }

    #[tokio::test]
    async fn test_partial_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        tokio::fs::write(&config_path, r#"{"target_dir": "out", "video": {"crf": 30}}"#)
            .await
            .unwrap();

        let loaded = Config::from_file(&config_path).await.unwrap();
        assert_eq!(loaded.target_dir, PathBuf::from("out"));
        assert_eq!(loaded.video.crf, 30);
        assert_eq!(loaded.video.video_bitrate, "800k");
        assert_eq!(loaded.catalog, AssetCatalog::default());
    }

    #[tokio::test]
    async fn test_missing_config_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = Config::from_file(&temp_dir.path().join("nope.json")).await.unwrap();
        assert_eq!(loaded, Config::default());
    }
}
