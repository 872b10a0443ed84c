//! # Asset Manifest Module
//!
//! Questo modulo definisce il manifest JSON prodotto dal processore immagini.
//!
//! ## Responsabilità:
//! - Strutture dati serializzabili (`AssetManifest`, `Categories`, record e varianti)
//! - Calcolo del `summary` una sola volta, a categorie complete
//! - Scrittura del manifest in un'unica operazione, sovrascrivendo il file precedente
//!
//! ## Invariante:
//! `summary.totalOptimizedSize` è sempre la somma di `optimizedSize` di tutte le
//! varianti più la dimensione dei video copiati, perché viene derivato dalle
//! categorie e mai aggiornato incrementalmente.
//!
//! ## Esempio struttura:
//! ```json
//! {
//!   "version": "1.0.0",
//!   "generatedAt": "2025-08-14T10:00:00+00:00",
//!   "summary": { "totalImages": 7, "compressionRatio": 41.32, ... },
//!   "categories": { "logo": [ { "name": "favicon", "variants": [ ... ] } ], ... }
//! }
//! ```

use crate::catalog::GarmentType;
use crate::file_manager::FileManager;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MANIFEST_VERSION: &str = "1.0.0";

/// Width of a variant, or `"original"` when the source width is unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariantSize {
    Width(u32),
    Original(OriginalMarker),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginalMarker {
    Original,
}

impl VariantSize {
    /// Intrinsic width, or the `"original"` marker when it is unknown (0)
    pub fn intrinsic(width: u32) -> Self {
        if width == 0 {
            VariantSize::Original(OriginalMarker::Original)
        } else {
            VariantSize::Width(width)
        }
    }
}

/// One produced output file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantRecord {
    pub size: VariantSize,
    pub path: String,
    pub original_size: u64,
    pub optimized_size: u64,
    pub format: String,
}

/// One catalogued source image and its variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    pub name: String,
    pub source: String,
    pub original_size: u64,
    pub variants: Vec<VariantRecord>,
}

/// A homepage video copied as-is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoCopyRecord {
    pub name: String,
    pub source: String,
    pub path: String,
    pub size: u64,
    pub formatted_size: String,
    pub note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductCategories {
    pub tshirt: Vec<AssetRecord>,
    pub jersey: Vec<AssetRecord>,
    pub workshirt: Vec<AssetRecord>,
    pub jacket: Vec<AssetRecord>,
}

impl ProductCategories {
    pub fn get(&self, garment: GarmentType) -> &Vec<AssetRecord> {
        match garment {
            GarmentType::Tshirt => &self.tshirt,
            GarmentType::Jersey => &self.jersey,
            GarmentType::Workshirt => &self.workshirt,
            GarmentType::Jacket => &self.jacket,
        }
    }

    pub fn get_mut(&mut self, garment: GarmentType) -> &mut Vec<AssetRecord> {
        match garment {
            GarmentType::Tshirt => &mut self.tshirt,
            GarmentType::Jersey => &mut self.jersey,
            GarmentType::Workshirt => &mut self.workshirt,
            GarmentType::Jacket => &mut self.jacket,
        }
    }

    pub fn all(&self) -> impl Iterator<Item = &AssetRecord> {
        GarmentType::ALL.into_iter().flat_map(move |g| self.get(g).iter())
    }
}

/// Every category of the manifest, in output order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Categories {
    pub logo: Vec<AssetRecord>,
    pub products: ProductCategories,
    pub blog: Vec<AssetRecord>,
    /// Reserved for interface images; the catalog has none yet
    pub ui: Vec<AssetRecord>,
    pub portfolio: Vec<AssetRecord>,
    pub videos: Vec<VideoCopyRecord>,
}

impl Categories {
    /// Every image asset record across categories
    pub fn assets(&self) -> impl Iterator<Item = &AssetRecord> {
        self.logo
            .iter()
            .chain(self.products.all())
            .chain(self.blog.iter())
            .chain(self.ui.iter())
            .chain(self.portfolio.iter())
    }

    /// Every image variant record across categories
    pub fn variants(&self) -> impl Iterator<Item = &VariantRecord> {
        self.assets().flat_map(|a| a.variants.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestSummary {
    pub total_images: usize,
    pub total_videos: usize,
    pub total_original_size: u64,
    pub total_optimized_size: u64,
    pub compression_ratio: f64,
    pub total_original_formatted: String,
    pub total_optimized_formatted: String,
}

impl ManifestSummary {
    /// Derive the summary from completed categories
    pub fn derive(categories: &Categories) -> Self {
        let total_images = categories.variants().count();
        let total_videos = categories.videos.len();

        let video_bytes: u64 = categories.videos.iter().map(|v| v.size).sum();
        let total_original_size =
            categories.assets().map(|a| a.original_size).sum::<u64>() + video_bytes;
        let total_optimized_size =
            categories.variants().map(|v| v.optimized_size).sum::<u64>() + video_bytes;

        let compression_ratio = if total_original_size > 0 {
            FileManager::round_to(
                (1.0 - total_optimized_size as f64 / total_original_size as f64) * 100.0,
                2,
            )
        } else {
            0.0
        };

        Self {
            total_images,
            total_videos,
            total_original_size,
            total_optimized_size,
            compression_ratio,
            total_original_formatted: FileManager::format_size(total_original_size),
            total_optimized_formatted: FileManager::format_size(total_optimized_size),
        }
    }
}

/// The image processor's output document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetManifest {
    pub version: String,
    pub generated_at: String,
    pub summary: ManifestSummary,
    pub categories: Categories,
}

impl AssetManifest {
    /// Build the final manifest; the summary is computed here and only here
    pub fn finalize(categories: Categories, generated_at: String) -> Self {
        let summary = ManifestSummary::derive(&categories);
        Self {
            version: MANIFEST_VERSION.to_string(),
            generated_at,
            summary,
            categories,
        }
    }

    /// Serialize the whole manifest to `path`, replacing any previous file
    pub async fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            FileManager::ensure_dir(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
