//! # Imaging Module
//!
//! Capacità di codifica immagini usata dai due processori.
//!
//! ## Struttura:
//! - `codec`: trait [`ImageCodec`] + tipi dei parametri (cosa fare)
//! - `native`: [`NativeCodec`], implementazione di produzione (come farlo)
//!
//! | Operazione | Implementazione |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Resize → WebP** | `cwebp -q <q> -resize <w> 0` |
//! | **Full size → WebP** | `cwebp -q <q>` |
//! | **Fallback PNG** | `image` + `PngEncoder` (`CompressionType::Best` per livello 9) |
//! | **Fallback JPEG** | `image` + `JpegEncoder` (qualità configurata) |
//!
//! La separazione permette ai test di sostituire il codec con un fake che
//! registra le chiamate senza lanciare binari esterni.

pub mod codec;
pub mod native;

pub use codec::{Dimensions, EncodeParams, ImageCodec, OutputFormat};
pub use native::NativeCodec;
