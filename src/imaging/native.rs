//! Production image codec.
//!
//! WebP variants are produced by `cwebp` (lossy quality + `-resize`), the
//! same encoder the rest of the toolchain relies on. Identify and the
//! PNG/JPEG fallbacks run in-process with the `image` crate on the blocking
//! thread pool.

use super::codec::{Dimensions, EncodeParams, ImageCodec, OutputFormat};
use crate::error::OptimizeError;
use crate::file_manager::FileManager;
use crate::tools::{run_tool, to_string_vec};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageEncoder};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;

/// Codec backed by `cwebp` and the `image` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeCodec;

impl NativeCodec {
    pub fn new() -> Self {
        Self
    }

    /// Arguments for a cwebp encode, resized when `width` is set
    fn cwebp_args(params: &EncodeParams, quality: u8) -> Result<Vec<String>, OptimizeError> {
        let input = params
            .source
            .to_str()
            .ok_or_else(|| OptimizeError::Validation(format!("Invalid input path: {:?}", params.source)))?;
        let output = params
            .output
            .to_str()
            .ok_or_else(|| OptimizeError::Validation(format!("Invalid output path: {:?}", params.output)))?;

        let mut args = to_string_vec(["-quiet", "-q", &quality.to_string(), "-m", "4", "-mt"]);
        if let Some(width) = params.width {
            args.extend(to_string_vec(["-resize", &width.to_string(), "0"]));
        }
        args.extend(to_string_vec([input, "-o", output]));
        Ok(args)
    }

    async fn encode_webp(&self, params: &EncodeParams, quality: u8) -> Result<(), OptimizeError> {
        let args = Self::cwebp_args(params, quality)?;

        let output = run_tool("cwebp", &args).await.map_err(|e| {
            OptimizeError::MissingDependency(format!("cwebp could not be started: {}", e))
        })?;

        if !output.success {
            return Err(OptimizeError::Encoder(format!(
                "cwebp failed for {}: {}",
                params.source.display(),
                output.error_summary()
            )));
        }

        debug!(
            "cwebp encoded {} in {:.1}s",
            params.output.display(),
            output.elapsed.as_secs_f64()
        );
        Ok(())
    }

    async fn encode_in_process(&self, params: &EncodeParams) -> Result<(), OptimizeError> {
        let params = params.clone();
        tokio::task::spawn_blocking(move || encode_with_image_crate(&params))
            .await
            .map_err(|e| OptimizeError::Encoder(format!("Encoder task failed: {}", e)))?
    }
}

fn png_compression(level: u8) -> CompressionType {
    match level {
        0..=2 => CompressionType::Fast,
        3..=8 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

fn encode_with_image_crate(params: &EncodeParams) -> Result<(), OptimizeError> {
    let img = image::open(&params.source)?;
    let img = match params.width {
        Some(width) if width < img.width() => img.resize(width, u32::MAX, FilterType::Lanczos3),
        _ => img,
    };

    let writer = BufWriter::new(File::create(&params.output)?);

    match params.format {
        OutputFormat::Png { compression } => {
            let encoder =
                PngEncoder::new_with_quality(writer, png_compression(compression), PngFilter::Adaptive);
            encoder.write_image(img.as_bytes(), img.width(), img.height(), img.color())?;
        }
        OutputFormat::Jpeg { quality } => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(writer, quality);
            encoder.write_image(rgb.as_bytes(), rgb.width(), rgb.height(), rgb.color())?;
        }
        OutputFormat::WebP { .. } => {
            return Err(OptimizeError::UnsupportedFormat(
                "WebP is encoded through cwebp".to_string(),
            ));
        }
    }

    Ok(())
}

impl ImageCodec for NativeCodec {
    async fn identify(&self, path: &Path) -> Result<Dimensions, OptimizeError> {
        let path = path.to_path_buf();
        let (width, height) = tokio::task::spawn_blocking(move || image::image_dimensions(&path))
            .await
            .map_err(|e| OptimizeError::Encoder(format!("Identify task failed: {}", e)))??;
        Ok(Dimensions { width, height })
    }

    async fn encode(&self, params: &EncodeParams) -> Result<u64, OptimizeError> {
        if let Some(parent) = params.output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        match params.format {
            OutputFormat::WebP { quality } => self.encode_webp(params, quality).await?,
            OutputFormat::Png { .. } | OutputFormat::Jpeg { .. } => {
                self.encode_in_process(params).await?
            }
        }

        Ok(FileManager::file_size(&params.output).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_png(path: &Path, width: u32, height: u32) {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        });
        img.save(path).unwrap();
    }

    fn write_jpeg(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 64]));
        img.save(path).unwrap();
    }

    #[tokio::test]
    async fn test_identify_reads_dimensions() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("logo.png");
        write_png(&source, 120, 40);

        let dims = NativeCodec::new().identify(&source).await.unwrap();
        assert_eq!(dims, Dimensions { width: 120, height: 40 });
    }

    #[tokio::test]
    async fn test_identify_corrupt_file_fails() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("broken.png");
        std::fs::write(&source, b"definitely not a png").unwrap();

        assert!(NativeCodec::new().identify(&source).await.is_err());
    }

    #[tokio::test]
    async fn test_png_fallback_is_written() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("logo.png");
        write_png(&source, 64, 64);

        let params = EncodeParams {
            source: source.clone(),
            output: dir.path().join("out").join("logo.png"),
            width: None,
            format: OutputFormat::Png { compression: 9 },
        };
        let written = NativeCodec::new().encode(&params).await.unwrap();

        assert!(written > 0);
        assert_eq!(image::image_dimensions(&params.output).unwrap(), (64, 64));
    }

    #[tokio::test]
    async fn test_jpeg_fallback_drops_alpha_and_resizes() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("photo.png");
        write_png(&source, 200, 100);

        let params = EncodeParams {
            source,
            output: dir.path().join("photo.jpg"),
            width: Some(100),
            format: OutputFormat::Jpeg { quality: 88 },
        };
        NativeCodec::new().encode(&params).await.unwrap();

        assert_eq!(image::image_dimensions(&params.output).unwrap(), (100, 50));
    }

    #[tokio::test]
    async fn test_jpeg_source_reencodes() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("photo.jpg");
        write_jpeg(&source, 80, 60);

        let params = EncodeParams {
            source,
            output: dir.path().join("fallback").join("photo.jpg"),
            width: None,
            format: OutputFormat::Jpeg { quality: 88 },
        };
        let written = NativeCodec::new().encode(&params).await.unwrap();
        assert!(written > 0);
    }

    #[test]
    fn test_cwebp_args() {
        let params = EncodeParams {
            source: PathBuf::from("/src/a.png"),
            output: PathBuf::from("/dst/a-w320.webp"),
            width: Some(320),
            format: OutputFormat::WebP { quality: 82 },
        };
        let args = NativeCodec::cwebp_args(&params, 82).unwrap();
        assert_eq!(
            args,
            vec!["-quiet", "-q", "82", "-m", "4", "-mt", "-resize", "320", "0", "/src/a.png", "-o", "/dst/a-w320.webp"]
        );

        let full = EncodeParams { width: None, ..params };
        let args = NativeCodec::cwebp_args(&full, 82).unwrap();
        assert!(!args.contains(&"-resize".to_string()));
    }

    #[test]
    fn test_png_compression_mapping() {
        assert_eq!(png_compression(9), CompressionType::Best);
        assert_eq!(png_compression(6), CompressionType::Default);
        assert_eq!(png_compression(1), CompressionType::Fast);
    }
}
