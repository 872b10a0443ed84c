//! # Image Processing Module
//!
//! Questo modulo elabora il catalogo immagini e produce il manifest degli asset.
//!
//! ## Responsabilità:
//! - Varianti responsive WebP per ogni larghezza richiesta (mai upscaling)
//! - Una copia WebP a piena risoluzione per ogni immagine elaborata
//! - Fallback nel formato originale quando richiesto dalla categoria
//! - Copia byte-per-byte dei video della homepage
//! - Aggregazione di tutti i record nel manifest e scrittura su disco
//!
//! ## Categorie:
//! | Categoria | Larghezze | Fallback | Destinazione |
//! |---|---|---|---|
//! | logo | 32, 64, 128, 256, 512 | sì | `images/logo` |
//! | products | 320 … 1024 | solo sorgenti `.png` | `images/products/<tipo>` |
//! | blog | 320, 480, 640, 768 | sì | `images/blog` |
//! | portfolio | 320 … 1024 | sì | `images/portfolio` |
//! | videos | copia | - | `videos/homepage` |
//!
//! ## Naming output:
//! ```text
//! images/logo/logo-colored-w32.webp   # variante ridimensionata
//! images/logo/logo-colored.webp       # piena risoluzione
//! images/logo/logo-colored.png        # fallback formato originale
//! ```
//!
//! ## Error Handling:
//! - **Sorgente mancante**: evento `missing_source`, item saltato
//! - **Errore di codifica**: evento `transform_failed`, item senza varianti
//! - **Impossibile creare la root o scrivere il manifest**: errore fatale
//!
//! Tutto è sequenziale: ogni file è completato prima del successivo.

use crate::catalog::GarmentType;
use crate::config::Config;
use crate::error::OptimizeError;
use crate::events::{EventLog, PipelineEvent};
use crate::file_manager::FileManager;
use crate::imaging::{EncodeParams, ImageCodec, OutputFormat};
use crate::manifest::{
    AssetManifest, AssetRecord, Categories, ProductCategories, VariantRecord, VariantSize,
    VideoCopyRecord,
};
use crate::progress::ProgressManager;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const VIDEO_COPY_NOTE: &str = "Videos need FFmpeg for compression - currently copied as-is";

/// What to produce for one source image
#[derive(Debug, Clone, Copy)]
pub struct VariantOptions<'a> {
    /// Candidate widths; the ones wider than the source are skipped
    pub widths: &'a [u32],
    /// Also write a copy in the source's own format
    pub keep_original: bool,
}

/// Processes the image catalog with an [`ImageCodec`]
pub struct ImageProcessor<C: ImageCodec> {
    config: Config,
    codec: C,
}

impl<C: ImageCodec> ImageProcessor<C> {
    pub fn new(config: Config, codec: C) -> Self {
        Self { config, codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Produce every variant of `source` next to `target`.
    ///
    /// The stem of `target` names the outputs. Any failure is recorded as a
    /// `transform_failed` event and yields an empty list.
    pub async fn optimize_image(
        &self,
        source: &Path,
        target: &Path,
        options: &VariantOptions<'_>,
        events: &mut EventLog,
    ) -> Vec<VariantRecord> {
        let original_size = FileManager::file_size(source).await;
        self.optimize_sized(source, target, original_size, options, events)
            .await
    }

    /// [`Self::optimize_image`] for a source whose size is already known
    async fn optimize_sized(
        &self,
        source: &Path,
        target: &Path,
        original_size: u64,
        options: &VariantOptions<'_>,
        events: &mut EventLog,
    ) -> Vec<VariantRecord> {
        match self
            .try_optimize_image(source, target, original_size, options)
            .await
        {
            Ok(variants) => variants,
            Err(e) => {
                events.record(PipelineEvent::TransformFailed {
                    path: source.to_path_buf(),
                    message: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    async fn try_optimize_image(
        &self,
        source: &Path,
        target: &Path,
        original_size: u64,
        options: &VariantOptions<'_>,
    ) -> Result<Vec<VariantRecord>, OptimizeError> {
        let dimensions = self.codec.identify(source).await?;

        let dir = target.parent().unwrap_or_else(|| Path::new(""));
        let basename = target
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| {
                OptimizeError::Validation(format!("Invalid target path: {}", target.display()))
            })?;
        tokio::fs::create_dir_all(dir).await?;

        let webp = OutputFormat::WebP {
            quality: self.config.image.webp_quality,
        };
        let mut variants = Vec::new();

        for &width in options.widths {
            if width > dimensions.width {
                debug!(
                    "Skipping w{} for {} ({}px wide)",
                    width,
                    source.display(),
                    dimensions.width
                );
                continue;
            }

            let output = dir.join(format!("{}-w{}.webp", basename, width));
            let params = EncodeParams {
                source: source.to_path_buf(),
                output,
                width: Some(width),
                format: webp,
            };
            let written = self.codec.encode(&params).await?;
            variants.push(self.variant(
                VariantSize::Width(width),
                &params.output,
                original_size,
                written,
                webp.tag(),
            ));
        }

        let full_params = EncodeParams {
            source: source.to_path_buf(),
            output: dir.join(format!("{}.webp", basename)),
            width: None,
            format: webp,
        };
        let written = self.codec.encode(&full_params).await?;
        let intrinsic = VariantSize::intrinsic(dimensions.width);
        variants.push(self.variant(
            intrinsic,
            &full_params.output,
            original_size,
            written,
            webp.tag(),
        ));

        if options.keep_original {
            let fallback = match source.extension() {
                Some(ext) => dir.join(format!("{}.{}", basename, ext.to_string_lossy())),
                None => dir.join(&basename),
            };

            if fallback == full_params.output {
                debug!(
                    "Full-size WebP already serves as fallback for {}",
                    source.display()
                );
            } else {
                let ext = FileManager::extension(source).unwrap_or_default();
                let fallback_format = match ext.as_str() {
                    "png" => Some(OutputFormat::Png {
                        compression: self.config.image.png_compression,
                    }),
                    "jpg" | "jpeg" => Some(OutputFormat::Jpeg {
                        quality: self.config.image.jpeg_quality,
                    }),
                    _ => None,
                };

                let written = match fallback_format {
                    Some(format) => {
                        let params = EncodeParams {
                            source: source.to_path_buf(),
                            output: fallback.clone(),
                            width: None,
                            format,
                        };
                        self.codec.encode(&params).await?
                    }
                    None => tokio::fs::copy(source, &fallback).await?,
                };
                variants.push(self.variant(intrinsic, &fallback, original_size, written, &ext));
            }
        }

        Ok(variants)
    }

    fn variant(
        &self,
        size: VariantSize,
        output: &Path,
        original_size: u64,
        optimized_size: u64,
        format: &str,
    ) -> VariantRecord {
        VariantRecord {
            size,
            path: FileManager::web_path(output, &self.config.target_dir),
            original_size,
            optimized_size,
            format: format.to_string(),
        }
    }

    /// Process an existing source into an [`AssetRecord`]
    async fn process_asset(
        &self,
        name: String,
        source_id: String,
        source: &Path,
        target: &Path,
        options: &VariantOptions<'_>,
        events: &mut EventLog,
    ) -> AssetRecord {
        let original_size = FileManager::file_size(source).await;
        let variants = self
            .optimize_sized(source, target, original_size, options, events)
            .await;
        debug!("{}: {} variants", name, variants.len());
        AssetRecord {
            name,
            source: source_id,
            original_size,
            variants,
        }
    }

    fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn file_stem(path: &Path) -> String {
        path.file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub async fn process_logos(
        &self,
        events: &mut EventLog,
        progress: &ProgressManager,
    ) -> Vec<AssetRecord> {
        info!("🎨 Processing logos...");
        let catalog = &self.config.catalog.logos;
        let options = VariantOptions {
            widths: &catalog.widths,
            keep_original: true,
        };
        let mut records = Vec::new();

        for logo in &catalog.entries {
            progress.update(&format!("logo: {}", logo.name));
            let source = self.config.source_path(&logo.source);
            if !source.exists() {
                events.record(PipelineEvent::MissingSource { path: source });
                continue;
            }

            let target = self.config.target_dir.join(&logo.target);
            let source_id = FileManager::web_path(&source, &self.config.source_dir);
            records.push(
                self.process_asset(logo.name.clone(), source_id, &source, &target, &options, events)
                    .await,
            );
        }

        records
    }

    pub async fn process_products(
        &self,
        events: &mut EventLog,
        progress: &ProgressManager,
    ) -> ProductCategories {
        info!("👕 Processing product images...");
        let catalog = &self.config.catalog.products;
        let products_dir = self.config.source_path(&catalog.dir);
        let mut products = ProductCategories::default();

        for garment in GarmentType::ALL {
            info!("  Processing {}...", garment.as_str());
            let target_dir = self
                .config
                .target_dir
                .join("images")
                .join("products")
                .join(garment.as_str());

            for file in catalog.files(garment) {
                progress.update(&format!("products/{}: {}", garment.as_str(), file));
                let source = products_dir.join(file);
                if !source.exists() {
                    events.record(PipelineEvent::MissingSource { path: source });
                    continue;
                }

                let basename = Self::file_stem(&source);
                let target = target_dir.join(format!("{}.webp", basename));
                let options = VariantOptions {
                    widths: &catalog.widths,
                    keep_original: source.extension().and_then(|e| e.to_str()) == Some("png"),
                };

                let record = self
                    .process_asset(basename, file.clone(), &source, &target, &options, events)
                    .await;
                products.get_mut(garment).push(record);
            }
        }

        products
    }

    /// List the images of a catalogued folder, recording a missing or unreadable folder
    fn list_folder(
        &self,
        dir: &Path,
        name_contains: Option<&str>,
        events: &mut EventLog,
    ) -> Vec<PathBuf> {
        if !dir.is_dir() {
            events.record(PipelineEvent::MissingSource {
                path: dir.to_path_buf(),
            });
            return Vec::new();
        }

        match FileManager::list_images(dir, name_contains) {
            Ok(files) => files,
            Err(e) => {
                events.record(PipelineEvent::TransformFailed {
                    path: dir.to_path_buf(),
                    message: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    /// Process every listed file of a folder category into `target_dir`
    async fn process_listed(
        &self,
        files: Vec<PathBuf>,
        target_dir: &Path,
        options: &VariantOptions<'_>,
        label: &str,
        events: &mut EventLog,
        progress: &ProgressManager,
    ) -> Vec<AssetRecord> {
        let mut records = Vec::with_capacity(files.len());

        for source in files {
            let file = Self::file_name(&source);
            progress.update(&format!("{}: {}", label, file));

            let basename = Self::file_stem(&source);
            let target = target_dir.join(format!("{}.webp", basename));
            records.push(
                self.process_asset(basename, file, &source, &target, options, events)
                    .await,
            );
        }

        records
    }

    pub async fn process_blog_images(
        &self,
        events: &mut EventLog,
        progress: &ProgressManager,
    ) -> Vec<AssetRecord> {
        info!("📝 Processing blog images...");
        let catalog = &self.config.catalog.blog;
        let target_dir = self.config.target_dir.join("images").join("blog");
        let options = VariantOptions {
            widths: &catalog.widths,
            keep_original: true,
        };
        let mut records = Vec::new();

        for dir in &catalog.dirs {
            let dir = self.config.source_path(dir);
            let files = self.list_folder(&dir, Some(catalog.name_contains.as_str()), events);
            progress.add_items(files.len() as u64);

            records.extend(
                self.process_listed(files, &target_dir, &options, "blog", events, progress)
                    .await,
            );
        }

        records
    }

    pub async fn process_portfolio_images(
        &self,
        events: &mut EventLog,
        progress: &ProgressManager,
    ) -> Vec<AssetRecord> {
        info!("🖼️  Processing portfolio images...");
        let catalog = &self.config.catalog.portfolio;
        let dir = self.config.source_path(&catalog.dir);

        let mut files = self.list_folder(&dir, None, events);
        files.truncate(catalog.limit);
        progress.add_items(files.len() as u64);

        let target_dir = self.config.target_dir.join("images").join("portfolio");
        let options = VariantOptions {
            widths: &catalog.widths,
            keep_original: true,
        };

        self.process_listed(files, &target_dir, &options, "portfolio", events, progress)
            .await
    }

    /// Copy the homepage videos unchanged
    pub async fn process_videos(
        &self,
        events: &mut EventLog,
        progress: &ProgressManager,
    ) -> Result<Vec<VideoCopyRecord>> {
        info!("🎬 Copying homepage videos...");
        let catalog = &self.config.catalog.videos;
        let source_dir = self.config.source_path(&catalog.dir);
        let target_dir = self.config.video_target_dir();
        FileManager::ensure_dir(&target_dir).await?;

        let mut records = Vec::new();

        for file in &catalog.files {
            progress.update(&format!("videos: {}", file));
            let source = source_dir.join(file);
            if !source.exists() {
                events.record(PipelineEvent::MissingSource { path: source });
                continue;
            }

            let target = target_dir.join(file);
            if let Err(e) = tokio::fs::copy(&source, &target).await {
                events.record(PipelineEvent::TransformFailed {
                    path: source,
                    message: e.to_string(),
                });
                continue;
            }

            let size = FileManager::file_size(&source).await;
            records.push(VideoCopyRecord {
                name: Self::file_stem(&source),
                source: file.clone(),
                path: FileManager::web_path(&target, &self.config.target_dir),
                size,
                formatted_size: FileManager::format_size(size),
                note: VIDEO_COPY_NOTE.to_string(),
            });
        }

        Ok(records)
    }

    /// Run every category, then write the manifest.
    ///
    /// Only an unusable target root or an unwritable manifest is an error;
    /// everything else ends up in `events`.
    pub async fn run(&self, events: &mut EventLog) -> Result<AssetManifest> {
        info!("🚀 Starting asset optimization...");
        events.record(PipelineEvent::Start {
            processor: "assets".to_string(),
            source_dir: self.config.source_dir.clone(),
            target_dir: self.config.target_dir.clone(),
        });

        FileManager::ensure_dir(&self.config.target_dir).await?;

        let catalog = &self.config.catalog;
        let fixed_items =
            catalog.logos.entries.len() + catalog.products.len() + catalog.videos.files.len();
        let progress = ProgressManager::new(fixed_items as u64, self.config.json_output);

        let categories = Categories {
            logo: self.process_logos(events, &progress).await,
            products: self.process_products(events, &progress).await,
            blog: self.process_blog_images(events, &progress).await,
            ui: Vec::new(),
            portfolio: self.process_portfolio_images(events, &progress).await,
            videos: self.process_videos(events, &progress).await?,
        };

        let manifest = AssetManifest::finalize(categories, chrono::Utc::now().to_rfc3339());
        let manifest_path = self.config.manifest_path();
        manifest.write(&manifest_path).await?;
        progress.finish("✅ Asset manifest written");
        info!("📋 Asset manifest written to: {}", manifest_path.display());

        events.record(PipelineEvent::Complete {
            processor: "assets".to_string(),
            output: manifest_path,
            items: manifest.summary.total_images + manifest.summary.total_videos,
            original_size: manifest.summary.total_original_size,
            optimized_size: manifest.summary.total_optimized_size,
            warnings: events.warning_count(),
        });

        Ok(manifest)
    }
}
