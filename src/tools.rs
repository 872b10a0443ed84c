//! # External Tool Runner
//!
//! Punto unico per lanciare i tool esterni (cwebp, ffmpeg, ffprobe).
//!
//! ## Responsabilità:
//! - Costruzione comoda degli argomenti (`to_string_vec`, macro `args!`)
//! - Risoluzione del path del tool tramite `PlatformCommands`
//! - Esecuzione asincrona con `tokio::process::Command`, attesa completa
//! - Cattura di stdout/stderr e tempo impiegato per il logging
//!
//! Nessun timeout: un tool bloccato blocca l'intera esecuzione.

use crate::platform::PlatformCommands;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Converts any iterable of string-like items to `Vec<String>`.
///
/// ```rust,ignore
/// let crf = 28;
/// let args = to_string_vec(["-crf", &crf.to_string(), "-y"]);
/// ```
pub fn to_string_vec<T, I>(items: I) -> Vec<String>
where
    T: ToString,
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|item| item.to_string()).collect()
}

/// Builds an argument vector from mixed expressions.
///
/// ```rust,ignore
/// let args = args!["-crf", 28, "-y"];
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        vec![$($item.to_string()),*]
    };
}

/// Result of a finished tool invocation
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl ToolOutput {
    /// Last non-empty stderr line, the most useful part of an ffmpeg failure
    pub fn error_summary(&self) -> String {
        self.stderr
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("no output")
            .trim()
            .to_string()
    }
}

/// Run `tool` with `args` and wait for it to finish.
///
/// Returns `Err` only when the process cannot be spawned; a non-zero exit is
/// reported through [`ToolOutput::success`].
pub async fn run_tool(tool: &str, args: &[String]) -> std::io::Result<ToolOutput> {
    let platform = PlatformCommands::instance();
    let tool_path = platform.get_tool_path(tool);

    debug!("Running {} {:?}", tool_path.display(), args);
    let start_time = std::time::Instant::now();

    let output = Command::new(&tool_path).args(args).output().await?;
    let elapsed = start_time.elapsed();

    let result = ToolOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        elapsed,
    };

    debug!(
        "{} finished in {:.1}s (success: {})",
        tool,
        elapsed.as_secs_f64(),
        result.success
    );

    Ok(result)
}
