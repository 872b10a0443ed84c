//! # Progress Tracking Module
//!
//! Feedback visivo durante l'elaborazione del catalogo.
//!
//! ## Responsabilità:
//! - Progress bar con `indicatif` sugli item del catalogo (immagini o video)
//! - Spinner per gli step ffmpeg di durata indeterminata
//! - Disattivazione completa in modalità JSON, così stdout resta leggibile da macchina
//!
//! La barra scrive su stderr e `indicatif` la nasconde da sola quando stderr
//! non è un terminale.
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:42] [=========>------------------------------] 12/55 (21%) products/jacket: 20250523-Jacket_Coach_1.webp
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}";
const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";

/// Progress reporting over catalog items
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
    hidden: bool,
}

impl ProgressManager {
    /// Create a progress bar over `total_items`, hidden when `hidden` is set
    pub fn new(total_items: u64, hidden: bool) -> Self {
        if hidden {
            return Self {
                bar: ProgressBar::hidden(),
                hidden,
            };
        }

        let bar = ProgressBar::new(total_items);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar, hidden }
    }

    /// Advance by one item and show `message`
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Grow the total once a folder listing is known
    pub fn add_items(&self, count: u64) {
        self.bar.inc_length(count);
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Spinner for a long external step, hidden together with the bar
    pub fn spinner(&self, message: &str) -> ProgressBar {
        if self.hidden {
            return ProgressBar::hidden();
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template(SPINNER_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_progress_still_counts() {
        let progress = ProgressManager::new(1, true);
        progress.add_items(2);
        progress.update("logo");
        progress.update("favicon");
        assert_eq!(progress.bar.position(), 2);

        let spinner = progress.spinner("ffmpeg");
        assert!(spinner.is_hidden());
        spinner.finish_and_clear();
        progress.finish("done");
    }
}
