//! # File Management Module
//!
//! Questo modulo gestisce tutte le operazioni sui file della pipeline.
//!
//! ## Responsabilità:
//! - Discovery dei file immagine dentro le cartelle di upload (profondità 1)
//! - Determinazione formato file (immagine vs video)
//! - Dimensione dei file con fallback a 0 (mai errori)
//! - Path relativi "stile web" per manifest e report
//! - Formattazione human-readable delle dimensioni
//!
//! ## Formati supportati:
//! - **Immagini**: JPG, JPEG, PNG, WebP
//! - **Video**: MP4, MOV, WebM
//!
//! ## Utilità:
//! - `format_size()`: Converte bytes in formato leggibile (B, KB, MB, GB)
//! - `calculate_reduction()`: Calcola percentuale di riduzione
//! - `round_to()`: Arrotonda le percentuali per i report
//!
//! ## Esempio:
//! ```rust,ignore
//! let files = FileManager::list_images(&dir, Some("650x387"))?;
//! for file in files {
//!     let size = FileManager::file_size(&file).await;
//! }
//! ```

use anyhow::Result;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Size of a file in bytes, 0 when it cannot be read
    pub async fn file_size(path: &Path) -> u64 {
        fs::metadata(path).await.map(|m| m.len()).unwrap_or(0)
    }

    /// Create a directory and all its parents if needed
    pub async fn ensure_dir(path: &Path) -> Result<()> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create directory {}: {}", path.display(), e))
    }

    /// List the image files directly inside `dir`, sorted by file name.
    ///
    /// When `name_contains` is set only file names containing that marker are
    /// returned. Subdirectories are not descended into.
    pub fn list_images(dir: &Path, name_contains: Option<&str>) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let matches_marker = match name_contains {
                Some(marker) => entry.file_name().to_string_lossy().contains(marker),
                None => true,
            };

            if Self::is_image(path) && matches_marker {
                files.push(path.to_path_buf());
            }
        }

        Ok(files)
    }

    /// Lowercased extension of a path, without the dot
    pub fn extension(path: &Path) -> Option<String> {
        path.extension().map(|ext| ext.to_string_lossy().to_lowercase())
    }

    /// Check if a file is an image
    pub fn is_image(path: &Path) -> bool {
        matches!(
            Self::extension(path).as_deref(),
            Some("jpg" | "jpeg" | "png" | "webp")
        )
    }

    /// Render `path` relative to `base` as a web path (`/images/logo/x.webp`).
    ///
    /// Falls back to the full path when `path` is not inside `base`.
    pub fn web_path(path: &Path, base: &Path) -> String {
        let relative = path.strip_prefix(base).unwrap_or(path);
        let parts: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        format!("/{}", parts.join("/"))
    }

    /// Get human-readable file size (`0 B`, `512 B`, `1.5 KB`, `10 MB`)
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

        if size == 0 {
            return "0 B".to_string();
        }

        let mut value = size as f64;
        let mut unit_index = 0;

        while value >= 1024.0 && unit_index < UNITS.len() - 1 {
            value /= 1024.0;
            unit_index += 1;
        }

        let rendered = format!("{:.2}", value);
        let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
        format!("{} {}", rendered, UNITS[unit_index])
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }

    /// Round to a fixed number of decimals
    pub fn round_to(value: f64, decimals: i32) -> f64 {
        let factor = 10f64.powi(decimals);
        (value * factor).round() / factor
    }
}
