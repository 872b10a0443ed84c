//! # Pipeline Events Module
//!
//! Questo modulo rende osservabili tutti gli errori "ingoiati" dalla pipeline.
//!
//! ## Responsabilità:
//! - Definisce `PipelineEvent`, un evento strutturato per ogni fallimento non fatale
//! - Raccoglie gli eventi in un `EventLog` passato esplicitamente ad ogni step
//! - Logga ogni evento con `tracing::warn!`
//! - In modalità JSON emette ogni evento su stdout come singola riga
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio di un processore
//! - `missing_source`: File o cartella sorgente assente (item saltato)
//! - `transform_failed`: Errore di codifica/decodifica (item senza varianti)
//! - `tool_failed`: Tool esterno terminato con errore (variante non prodotta)
//! - `poster_fallback`: Poster WebP non riuscito, mantenuto il PNG intermedio
//! - `complete`: Fine processore con statistiche finali

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Structured record of a non-fatal pipeline event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// A processor started
    Start {
        processor: String,
        source_dir: PathBuf,
        target_dir: PathBuf,
    },

    /// A catalogued file or folder does not exist
    MissingSource { path: PathBuf },

    /// Decoding or encoding an image failed, the asset has no variants
    TransformFailed { path: PathBuf, message: String },

    /// An external tool exited with an error
    ToolFailed {
        tool: String,
        step: String,
        path: PathBuf,
        message: String,
    },

    /// The poster could not be converted to WebP and the intermediate was kept
    PosterFallback { path: PathBuf, message: String },

    /// A processor finished and wrote its output document
    Complete {
        processor: String,
        output: PathBuf,
        items: usize,
        original_size: u64,
        optimized_size: u64,
        warnings: usize,
    },
}

impl PipelineEvent {
    /// Whether the event reports a swallowed failure
    pub fn is_warning(&self) -> bool {
        !matches!(self, Self::Start { .. } | Self::Complete { .. })
    }

    /// Emits the event as a JSON line on stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    fn log(&self) {
        match self {
            Self::MissingSource { path } => {
                warn!("⚠️  Not found: {}", path.display());
            }
            Self::TransformFailed { path, message } => {
                warn!("❌ Error optimizing {}: {}", path.display(), message);
            }
            Self::ToolFailed {
                tool,
                step,
                path,
                message,
            } => {
                warn!("❌ {} failed during {} for {}: {}", tool, step, path.display(), message);
            }
            Self::PosterFallback { path, message } => {
                warn!(
                    "⚠️  Poster WebP conversion failed, keeping {}: {}",
                    path.display(),
                    message
                );
            }
            Self::Start { .. } | Self::Complete { .. } => {}
        }
    }
}

/// Ordered collection of the events of one run
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<PipelineEvent>,
    json_output: bool,
}

impl EventLog {
    pub fn new(json_output: bool) -> Self {
        Self {
            events: Vec::new(),
            json_output,
        }
    }

    /// Log, optionally emit, and keep an event
    pub fn record(&mut self, event: PipelineEvent) {
        event.log();
        if self.json_output {
            event.emit();
        }
        self.events.push(event);
    }

    pub fn events(&self) -> &[PipelineEvent] {
        &self.events
    }

    /// Number of swallowed failures recorded so far
    pub fn warning_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_warning()).count()
    }

    /// Paths reported as missing, in order
    pub fn missing_sources(&self) -> Vec<&PathBuf> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PipelineEvent::MissingSource { path } => Some(path),
                _ => None,
            })
            .collect()
    }
}
