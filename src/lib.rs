//! # Site Asset Optimizer Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dei due processori batch
//! - Espone i tipi principali tramite re-exports
//! - Fornisce un'interfaccia pulita per i binari `optimize-assets` e `optimize-videos`
//!
//! ## Architettura dei moduli:
//! - `cli`: Flag comuni dei binari e inizializzazione del logging
//! - `config`: Configurazione, validazione e caricamento da JSON
//! - `catalog`: Elenco dichiarativo dei file sorgente (loghi, prodotti, blog, portfolio, video)
//! - `error`: Tipi di errore custom
//! - `events`: Eventi strutturati per i fallimenti non fatali
//! - `file_manager`: Operazioni sui file, discovery e formattazione dimensioni
//! - `imaging`: Capacità di codifica immagini (trait + implementazione cwebp/image)
//! - `transcoder`: Capacità video (trait + implementazione ffmpeg/ffprobe)
//! - `image_processor`: Processore immagini e copia video grezzi
//! - `video_processor`: Processore video (MP4, WebM, poster)
//! - `manifest` / `report`: Documenti JSON di output
//! - `platform` / `tools`: Risoluzione ed esecuzione dei tool esterni
//! - `progress`: Progress bar e spinner
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use site_asset_optimizer::{Config, EventLog, ImageProcessor, NativeCodec};
//!
//! let config = Config::default();
//! let processor = ImageProcessor::new(config, NativeCodec::new());
//! let mut events = EventLog::new(false);
//! let manifest = processor.run(&mut events).await?;
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod file_manager;
pub mod image_processor;
pub mod imaging;
pub mod manifest;
pub mod platform;
pub mod progress;
pub mod report;
pub mod tools;
pub mod transcoder;
pub mod video_processor;

pub use catalog::AssetCatalog;
pub use config::Config;
pub use error::OptimizeError;
pub use events::{EventLog, PipelineEvent};
pub use image_processor::ImageProcessor;
pub use imaging::{ImageCodec, NativeCodec};
pub use manifest::AssetManifest;
pub use report::VideoReport;
pub use transcoder::{FfmpegTranscoder, Transcoder};
pub use video_processor::VideoProcessor;
