//! Event handling and progress display

use crate::logging::log_event_with_tracing;
use console::{Style, Term};
use tawata_events::{AppEvent, RemediationEvent, ScanEvent};

/// Event handler for structured logs and user feedback
pub struct EventHandler {
    /// Whether colors are enabled
    colors_enabled: bool,
    /// Suppress human-readable status lines (JSON mode)
    quiet: bool,
    term: Term,
}

impl EventHandler {
    pub fn new(colors_enabled: bool, quiet: bool) -> Self {
        Self {
            colors_enabled,
            quiet,
            term: Term::stderr(),
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: AppEvent) {
        log_event_with_tracing(&event);

        if self.quiet {
            return;
        }

        match &event {
            AppEvent::Scan(ScanEvent::Started { root, entries }) => {
                self.show_status(&format!(
                    "Scanning {entries} entries in {}",
                    root.display()
                ));
            }
            AppEvent::Scan(ScanEvent::RootMissing { root }) => {
                self.show_status(&format!("No {} directory, nothing to do", root.display()));
            }
            AppEvent::Scan(ScanEvent::DependencySkipped { path, failure }) => {
                self.show_warning(&format!("Skipped {}: {}", path.display(), failure.message));
            }
            AppEvent::Remediation(RemediationEvent::WouldFile { identity }) => {
                self.show_status(&format!("Would open an issue on {identity}"));
            }
            AppEvent::Remediation(RemediationEvent::Filed { url, .. }) => {
                self.show_success(&format!("Opened {url}"));
            }
            AppEvent::Remediation(RemediationEvent::Failed { identity, failure }) => {
                self.show_error(&format!(
                    "Opening an issue on {identity} failed: {}",
                    failure.message
                ));
            }
            _ => {}
        }
    }

    fn show_status(&self, message: &str) {
        self.write_line(message, &Style::new().dim());
    }

    fn show_success(&self, message: &str) {
        self.write_line(message, &Style::new().green());
    }

    fn show_warning(&self, message: &str) {
        self.write_line(message, &Style::new().yellow());
    }

    fn show_error(&self, message: &str) {
        self.write_line(message, &Style::new().red().bold());
    }

    fn write_line(&self, message: &str, style: &Style) {
        let line = if self.colors_enabled {
            style.apply_to(message).to_string()
        } else {
            message.to_string()
        };
        // stderr is best effort; a closed pipe must not abort the scan
        let _ = self.term.write_line(&line);
    }
}
