//! # Video Report Module
//!
//! Report JSON scritto dal processore video (`video-optimization-report.json`).
//!
//! ## Responsabilità:
//! - Record per video: originale, varianti prodotte, poster opzionale
//! - Calcolo della compressione per variante (1 decimale)
//! - Summary derivato una sola volta: per ogni video conta la variante più
//!   piccola, oppure l'originale se nessuna variante è stata prodotta
//! - Scrittura del report in un'unica operazione

use crate::file_manager::FileManager;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginalVideo {
    pub path: String,
    pub size: u64,
    pub formatted_size: String,
    /// Duration in seconds, 0 when it could not be probed
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoVariant {
    pub format: String,
    pub path: String,
    pub size: u64,
    pub formatted_size: String,
    /// Size reduction versus the original, in percent
    pub compression: f64,
}

impl VideoVariant {
    pub fn new(format: &str, path: String, size: u64, original_size: u64) -> Self {
        Self {
            format: format.to_string(),
            path,
            size,
            formatted_size: FileManager::format_size(size),
            compression: FileManager::round_to(
                FileManager::calculate_reduction(original_size, size),
                1,
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosterRecord {
    pub path: String,
    pub size: u64,
    pub formatted_size: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub name: String,
    pub original: OriginalVideo,
    pub variants: Vec<VideoVariant>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub poster: Option<PosterRecord>,
}

impl VideoRecord {
    /// Smallest produced variant, or the original size when none succeeded
    pub fn optimized_size(&self) -> u64 {
        self.variants
            .iter()
            .map(|v| v.size)
            .min()
            .unwrap_or(self.original.size)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    pub total_videos: usize,
    pub total_original_size: u64,
    pub total_original_formatted: String,
    pub total_optimized_size: u64,
    pub total_optimized_formatted: String,
    /// Negative when the outputs are larger than the sources
    pub total_savings: i64,
    pub total_savings_formatted: String,
    pub savings_percent: f64,
}

impl VideoSummary {
    pub fn derive(videos: &[VideoRecord]) -> Self {
        let total_original_size: u64 = videos.iter().map(|v| v.original.size).sum();
        let total_optimized_size: u64 = videos.iter().map(|v| v.optimized_size()).sum();
        let total_savings = total_original_size as i64 - total_optimized_size as i64;

        let savings_percent = FileManager::round_to(
            FileManager::calculate_reduction(total_original_size, total_optimized_size),
            1,
        );

        Self {
            total_videos: videos.len(),
            total_original_size,
            total_original_formatted: FileManager::format_size(total_original_size),
            total_optimized_size,
            total_optimized_formatted: FileManager::format_size(total_optimized_size),
            total_savings,
            total_savings_formatted: format_signed_size(total_savings),
            savings_percent,
        }
    }
}

fn format_signed_size(bytes: i64) -> String {
    let formatted = FileManager::format_size(bytes.unsigned_abs());
    if bytes < 0 {
        format!("-{}", formatted)
    } else {
        formatted
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoReport {
    pub generated_at: String,
    pub summary: VideoSummary,
    pub videos: Vec<VideoRecord>,
}

impl VideoReport {
    pub fn finalize(videos: Vec<VideoRecord>, generated_at: String) -> Self {
        Self {
            generated_at,
            summary: VideoSummary::derive(&videos),
            videos,
        }
    }

    /// Serialize the report to `path`, replacing any previous file
    pub async fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            FileManager::ensure_dir(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
