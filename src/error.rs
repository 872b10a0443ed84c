//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom della pipeline.
//!
//! ## Responsabilità:
//! - Definisce `OptimizeError` enum per categorizzare gli errori dei processori
//! - Fornisce messaggi di errore descrittivi e strutturati
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (file non trovati, permessi, etc.)
//! - `Image`: Errori di decodifica/codifica immagini (formati corrotti, etc.)
//! - `FFmpeg`: Errori di ffmpeg/ffprobe (exit code diverso da zero)
//! - `Encoder`: Errori del codificatore WebP esterno (cwebp)
//! - `UnsupportedFormat`: Formato file non supportato
//! - `MissingDependency`: Tool esterno mancante (cwebp, ffmpeg, ffprobe)
//! - `Validation`: Errori di validazione configurazione
//!
//! ## Politica:
//! Gli errori per singolo file vengono catturati il più vicino possibile alla
//! sorgente e trasformati in eventi (`events::PipelineEvent`); solo gli errori
//! fatali risalgono fino al `main` tramite `anyhow`.

/// Custom error types for the asset pipeline
#[derive(thiserror::Error, Debug)]
pub enum OptimizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("FFmpeg error: {0}")]
    FFmpeg(String),

    #[error("Encoder error: {0}")]
    Encoder(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_message() {
        let err = OptimizeError::FFmpeg("ffprobe exited with an error".into());
        assert_eq!(err.to_string(), "FFmpeg error: ffprobe exited with an error");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: OptimizeError = io.into();
        assert!(matches!(err, OptimizeError::Io(_)));
        assert!(err.to_string().starts_with("IO error"));
    }
}
