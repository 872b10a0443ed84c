//! # Asset Catalog Module
//!
//! Questo modulo descrive, come dati dichiarativi, quali file sorgente la
//! pipeline deve elaborare.
//!
//! ## Responsabilità:
//! - Elenco fisso dei loghi (sorgente, nome di output, target)
//! - Elenco fisso delle foto prodotto per tipo di capo
//! - Cartelle dei thumbnail del blog e filtro sul nome file
//! - Cartella del portfolio e limite massimo di file
//! - Cartella e nomi dei video della homepage
//!
//! Tutti i path sono relativi alla `source_dir` (input) o alla `target_dir`
//! (output) della [`Config`](crate::config::Config). Il `Default` corrisponde
//! al catalogo dell'export WordPress; un file di configurazione JSON può
//! sostituirlo interamente.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Upload folder of the main site inside the export.
const SITE_UPLOADS: &str = "levelgarment.com/wp-content/uploads";

/// Garment types used to group product photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GarmentType {
    Tshirt,
    Jersey,
    Workshirt,
    Jacket,
}

impl GarmentType {
    pub const ALL: [GarmentType; 4] = [
        GarmentType::Tshirt,
        GarmentType::Jersey,
        GarmentType::Workshirt,
        GarmentType::Jacket,
    ];

    /// Key used in the manifest and in the output directory name
    pub fn as_str(&self) -> &'static str {
        match self {
            GarmentType::Tshirt => "tshirt",
            GarmentType::Jersey => "jersey",
            GarmentType::Workshirt => "workshirt",
            GarmentType::Jacket => "jacket",
        }
    }
}

/// A logo to optimize
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoEntry {
    /// Output base name (also the manifest `name`)
    pub name: String,
    /// Source path relative to the source root
    pub source: PathBuf,
    /// Output path relative to the target root; its stem names the variants
    pub target: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoCatalog {
    pub widths: Vec<u32>,
    pub entries: Vec<LogoEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCatalog {
    /// Folder (relative to the source root) holding every product photo
    pub dir: PathBuf,
    pub widths: Vec<u32>,
    pub tshirt: Vec<String>,
    pub jersey: Vec<String>,
    pub workshirt: Vec<String>,
    pub jacket: Vec<String>,
}

impl ProductCatalog {
    /// File names listed for a garment type
    pub fn files(&self, garment: GarmentType) -> &[String] {
        match garment {
            GarmentType::Tshirt => &self.tshirt,
            GarmentType::Jersey => &self.jersey,
            GarmentType::Workshirt => &self.workshirt,
            GarmentType::Jacket => &self.jacket,
        }
    }

    pub fn len(&self) -> usize {
        GarmentType::ALL.iter().map(|g| self.files(*g).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogCatalog {
    pub dirs: Vec<PathBuf>,
    /// Only file names containing this marker are blog thumbnails
    pub name_contains: String,
    pub widths: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioCatalog {
    pub dir: PathBuf,
    /// Maximum number of images taken from the folder
    pub limit: usize,
    pub widths: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoCatalog {
    pub dir: PathBuf,
    pub files: Vec<String>,
}

/// Full description of the sources processed by both binaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetCatalog {
    pub logos: LogoCatalog,
    pub products: ProductCatalog,
    pub blog: BlogCatalog,
    pub portfolio: PortfolioCatalog,
    pub videos: VideoCatalog,
}

fn uploads(rest: &str) -> PathBuf {
    PathBuf::from(SITE_UPLOADS).join(rest)
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for AssetCatalog {
    fn default() -> Self {
        Self {
            logos: LogoCatalog {
                widths: vec![32, 64, 128, 256, 512],
                entries: vec![
                    LogoEntry {
                        name: "logo-colored".into(),
                        source: uploads("2024/06/07062024-lg-logo.png"),
                        target: PathBuf::from("images/logo/logo-colored.png"),
                    },
                    LogoEntry {
                        name: "logo-white".into(),
                        source: uploads("2022/03/07062024-lg-logo-white.png"),
                        target: PathBuf::from("images/logo/logo-white.png"),
                    },
                    LogoEntry {
                        name: "favicon".into(),
                        source: uploads("2024/06/07062024-lg-favicon.png"),
                        target: PathBuf::from("images/logo/favicon.png"),
                    },
                ],
            },
            products: ProductCatalog {
                dir: uploads("2025/05"),
                widths: vec![320, 480, 640, 768, 1024],
                tshirt: names(&[
                    "20250523-T-Shirt_Basic_1.webp",
                    "20250523-T-Shirt_Basic_2.webp",
                    "20250523-Lineup-T-Shirt.webp",
                ]),
                jersey: names(&[
                    "20250526-Jersey_1.webp",
                    "20250526-Jersey_2.webp",
                    "20250526-Jersey_3.webp",
                    "20250523-Lineup-Jersey-.png",
                ]),
                workshirt: names(&[
                    "20250523-Workshirt_Basic_1.webp",
                    "20250523-Workshirt_Basic_2.webp",
                    "20250523-Workshit_PDH_1.webp",
                    "20250523-Workshit_PDH_2.webp",
                    "20250523-Lineup-Workshirt.webp",
                ]),
                jacket: names(&[
                    "20250523-Jacket_Bomber_1.webp",
                    "20250523-Jacket_Coach_1.webp",
                    "20250523-Jacket_Parka_1.webp",
                    "20250523-Jacket_Trucker_1.webp",
                    "20250523-Jacket_Varsity_1.webp",
                    "20250523-Jacket_Varsity_2.webp",
                    "20250523-Jacket_Varsity_3.webp",
                    "20250523-Lineup-Jacket.webp",
                ]),
            },
            blog: BlogCatalog {
                dirs: vec![uploads("2024/01"), uploads("2024/06"), uploads("2025/07")],
                name_contains: "650x387".into(),
                widths: vec![320, 480, 640, 768],
            },
            portfolio: PortfolioCatalog {
                dir: PathBuf::from("portfolio.levelgarment.com/wp-content/uploads/2025/08"),
                limit: 50,
                widths: vec![320, 480, 640, 768, 1024],
            },
            videos: VideoCatalog {
                dir: uploads("2025/04"),
                files: names(&["video_1.mp4", "video_2.mp4", "video_3.mp4", "video_4.mp4"]),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_shape() {
        let catalog = AssetCatalog::default();
        assert_eq!(catalog.logos.entries.len(), 3);
        assert_eq!(catalog.products.files(GarmentType::Tshirt).len(), 3);
        assert_eq!(catalog.products.files(GarmentType::Jersey).len(), 4);
        assert_eq!(catalog.products.files(GarmentType::Workshirt).len(), 5);
        assert_eq!(catalog.products.files(GarmentType::Jacket).len(), 8);
        assert_eq!(catalog.products.len(), 20);
        assert_eq!(catalog.blog.dirs.len(), 3);
        assert_eq!(catalog.portfolio.limit, 50);
        assert_eq!(catalog.videos.files.len(), 4);
    }

    #[test]
    fn test_logo_sources_live_under_site_uploads() {
        let catalog = AssetCatalog::default();
        for logo in &catalog.logos.entries {
            assert!(logo.source.starts_with(SITE_UPLOADS));
            assert_eq!(logo.target.file_stem().unwrap().to_str().unwrap(), logo.name);
        }
    }

    #[test]
    fn test_garment_keys() {
        let keys: Vec<&str> = GarmentType::ALL.iter().map(|g| g.as_str()).collect();
        assert_eq!(keys, vec!["tshirt", "jersey", "workshirt", "jacket"]);
    }

    #[test]
    fn test_catalog_json_roundtrip_keeps_order() {
        let catalog = AssetCatalog::default();
        let json = serde_json::to_string(&catalog).unwrap();
        let back: AssetCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, catalog);
        assert_eq!(back.videos.files[0], "video_1.mp4");
    }
}
