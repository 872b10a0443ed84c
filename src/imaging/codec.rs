//! Image codec capability and the parameters it accepts.
//!
//! [`EncodeParams`] describes *what* to produce; an [`ImageCodec`] decides
//! *how*. Every encode returns the number of bytes written so callers can
//! fill manifest records without a second `stat`.

use crate::error::OptimizeError;
use std::path::{Path, PathBuf};

/// Intrinsic pixel size of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Target encoding of one output file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossy WebP at the given quality (1-100)
    WebP { quality: u8 },
    /// Lossless PNG at the given compression level (0-9)
    Png { compression: u8 },
    /// JPEG at the given quality (1-100)
    Jpeg { quality: u8 },
}

impl OutputFormat {
    /// Short format tag used in manifests
    pub fn tag(&self) -> &'static str {
        match self {
            OutputFormat::WebP { .. } => "webp",
            OutputFormat::Png { .. } => "png",
            OutputFormat::Jpeg { .. } => "jpg",
        }
    }
}

/// One resize-and-encode request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Target width; `None` keeps the intrinsic size. Height follows the aspect ratio.
    pub width: Option<u32>,
    pub format: OutputFormat,
}

/// Image identify/encode capability.
///
/// Calls are awaited one at a time by the processors; implementations do not
/// need to be `Send`.
#[allow(async_fn_in_trait)]
pub trait ImageCodec {
    /// Read the intrinsic dimensions of an image.
    async fn identify(&self, path: &Path) -> Result<Dimensions, OptimizeError>;

    /// Produce `params.output`, returning the bytes written.
    async fn encode(&self, params: &EncodeParams) -> Result<u64, OptimizeError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Fake codec that records requests and writes placeholder files.
    ///
    /// Dimensions are looked up by source file name; sources listed in
    /// `corrupt` fail to identify, like a damaged upload would. Each output
    /// is written with `bytes_for(params)` zero bytes so sizes are predictable.
    #[derive(Default)]
    pub struct FakeCodec {
        pub dimensions: HashMap<String, Dimensions>,
        pub corrupt: Vec<String>,
        pub fail_webp: bool,
        pub calls: RefCell<Vec<EncodeParams>>,
    }

    impl FakeCodec {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_image(mut self, file_name: &str, width: u32, height: u32) -> Self {
            self.dimensions
                .insert(file_name.to_string(), Dimensions { width, height });
            self
        }

        pub fn with_corrupt(mut self, file_name: &str) -> Self {
            self.corrupt.push(file_name.to_string());
            self
        }

        pub fn failing_webp(mut self) -> Self {
            self.fail_webp = true;
            self
        }

        /// Deterministic output size: width-dependent for WebP, fixed otherwise
        pub fn bytes_for(params: &EncodeParams) -> u64 {
            match params.format {
                OutputFormat::WebP { .. } => 100 + params.width.unwrap_or(4000) as u64,
                OutputFormat::Png { .. } => 3_000,
                OutputFormat::Jpeg { .. } => 2_000,
            }
        }

        pub fn calls(&self) -> Vec<EncodeParams> {
            self.calls.borrow().clone()
        }

        fn key(path: &Path) -> String {
            path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default()
        }
    }

    impl ImageCodec for FakeCodec {
        async fn identify(&self, path: &Path) -> Result<Dimensions, OptimizeError> {
            let key = Self::key(path);
            if self.corrupt.contains(&key) {
                return Err(OptimizeError::Encoder(format!("corrupt image data in {}", key)));
            }
            self.dimensions
                .get(&key)
                .copied()
                .ok_or_else(|| OptimizeError::UnsupportedFormat(key))
        }

        async fn encode(&self, params: &EncodeParams) -> Result<u64, OptimizeError> {
            self.calls.borrow_mut().push(params.clone());

            if self.fail_webp && matches!(params.format, OutputFormat::WebP { .. }) {
                return Err(OptimizeError::Encoder("cwebp exited with status 255".into()));
            }

            let bytes = Self::bytes_for(params);
            if let Some(parent) = params.output.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&params.output, vec![0u8; bytes as usize]).await?;
            Ok(bytes)
        }
    }

    #[tokio::test]
    async fn fake_records_and_writes_outputs() {
        let dir = tempfile::TempDir::new().unwrap();
        let codec = FakeCodec::new().with_image("logo.png", 2000, 1000);

        let dims = codec.identify(Path::new("/src/logo.png")).await.unwrap();
        assert_eq!(dims, Dimensions { width: 2000, height: 1000 });

        let params = EncodeParams {
            source: PathBuf::from("/src/logo.png"),
            output: dir.path().join("logo-w32.webp"),
            width: Some(32),
            format: OutputFormat::WebP { quality: 82 },
        };
        let written = codec.encode(&params).await.unwrap();
        assert_eq!(written, 132);
        assert_eq!(std::fs::metadata(&params.output).unwrap().len(), 132);
        assert_eq!(codec.calls(), vec![params]);
    }

    #[test]
    fn format_tags() {
        assert_eq!(OutputFormat::WebP { quality: 82 }.tag(), "webp");
        assert_eq!(OutputFormat::Png { compression: 9 }.tag(), "png");
        assert_eq!(OutputFormat::Jpeg { quality: 88 }.tag(), "jpg");
    }
}
