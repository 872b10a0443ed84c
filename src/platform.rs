//! # Platform-specific utilities
//!
//! Questo modulo centralizza la logica cross-platform per i tool esterni
//! usati dalla pipeline (cwebp, ffmpeg, ffprobe): nome del comando per
//! piattaforma, ricerca nel `PATH` e controllo delle dipendenze all'avvio.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Platform-specific command manager
pub struct PlatformCommands {
    commands: HashMap<&'static str, &'static str>,
    which_command: &'static str,
}

impl PlatformCommands {
    /// Get the singleton instance
    pub fn instance() -> &'static Self {
        static INSTANCE: OnceLock<PlatformCommands> = OnceLock::new();
        INSTANCE.get_or_init(Self::new)
    }

    fn new() -> Self {
        let mut commands = HashMap::new();
        let which_command = if cfg!(windows) {
            commands.insert("cwebp", "cwebp.exe");
            commands.insert("ffmpeg", "ffmpeg.exe");
            commands.insert("ffprobe", "ffprobe.exe");
            "where"
        } else {
            commands.insert("cwebp", "cwebp");
            commands.insert("ffmpeg", "ffmpeg");
            commands.insert("ffprobe", "ffprobe");
            "which"
        };

        Self {
            commands,
            which_command,
        }
    }

    /// Get the platform-specific command name
    pub fn get_command<'a>(&self, base_name: &'a str) -> &'a str {
        self.commands.get(base_name).copied().unwrap_or(base_name)
    }

    /// Get the command used to check if a program exists
    pub fn which_command(&self) -> &str {
        self.which_command
    }

    /// Resolve a tool to a path, preferring an absolute path found on `PATH`
    pub fn get_tool_path(&self, base_name: &str) -> PathBuf {
        let command = self.get_command(base_name);
        Self::find_in_system_path(command).unwrap_or_else(|| PathBuf::from(command))
    }

    fn find_in_system_path(command: &str) -> Option<PathBuf> {
        let paths = env::var_os("PATH")?;
        env::split_paths(&paths)
            .map(|dir| dir.join(command))
            .find(|candidate| Path::new(candidate).is_file())
    }

    /// Check if a command is available on the system
    pub async fn is_command_available(&self, base_name: &str) -> bool {
        let command_name = self.get_command(base_name);
        if Self::find_in_system_path(command_name).is_some() {
            return true;
        }

        // Fallback to the which/where command for shells with extra lookup rules
        let result = tokio::process::Command::new(self.which_command)
            .arg(command_name)
            .output()
            .await;

        match result {
            Ok(output) => output.status.success(),
            Err(_) => false,
        }
    }

    /// Log which of the given tools are available.
    ///
    /// Missing tools are only warned about: every step that needs them fails
    /// on its own and is recorded as a pipeline event. Returns the missing ones.
    pub async fn check_tools(&self, tools: &[(&'static str, &'static str)]) -> Vec<&'static str> {
        info!("🔧 Checking external tools:");
        let mut missing = Vec::new();

        for (tool, purpose) in tools {
            if self.is_command_available(tool).await {
                debug!("Resolved {} -> {}", tool, self.get_tool_path(tool).display());
                info!("  ✅ {} - {}", tool, purpose);
            } else {
                warn!("  ❌ {} - {} (steps needing it will be skipped)", tool, purpose);
                missing.push(*tool);
            }
        }

        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_commands() {
        let platform = PlatformCommands::instance();

        let ffmpeg = platform.get_command("ffmpeg");
        assert!(ffmpeg.starts_with("ffmpeg"));

        // Unknown tools pass through unchanged
        assert_eq!(platform.get_command("something-else"), "something-else");

        let which = platform.which_command();
        assert!(!which.is_empty());
    }

    #[tokio::test]
    async fn test_missing_tool_is_reported() {
        let platform = PlatformCommands::instance();
        let missing = platform
            .check_tools(&[("definitely-not-a-real-tool-4821", "nothing")])
            .await;
        assert_eq!(missing, vec!["definitely-not-a-real-tool-4821"]);
    }
}
