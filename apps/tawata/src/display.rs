//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use std::io;
use tawata_types::{
    ColorChoice, DependencyReport, DependencyStatus, RemediationOutcome, ScanSummary,
};

/// Output renderer for scan results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Color configuration
    color_choice: ColorChoice,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            color_choice,
            term: Term::stdout(),
        }
    }

    /// Render the scan summary
    pub fn render_summary(&self, summary: &ScanSummary) -> io::Result<()> {
        if self.json_output {
            let json = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        if !summary.root_present {
            println!("No dependencies installed at {}.", summary.root.display());
            return Ok(());
        }

        if !summary.dependencies.is_empty() {
            self.render_dependency_table(&summary.dependencies);
        }

        if !summary.skipped.is_empty() {
            println!();
            println!("Skipped ({}):", summary.skipped.len());
            for skipped in &summary.skipped {
                println!("  {}: {}", skipped.path.display(), skipped.reason);
            }
        }

        let counts = summary.counts();
        println!();
        println!(
            "{} dependencies in {} ms: {} compliant, {} non-compliant, {} remediated, {} unresolved, {} failed, {} skipped",
            summary.dependencies.len(),
            summary.duration_ms(),
            counts.compliant,
            counts.non_compliant,
            counts.remediated,
            counts.unresolved,
            counts.failed,
            counts.skipped,
        );
        if summary.issues_filed() > 0 {
            println!(
                "{}",
                self.style_bold(&format!("{} issue(s) opened upstream", summary.issues_filed()))
            );
        }

        Ok(())
    }

    fn render_dependency_table(&self, dependencies: &[DependencyReport]) {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("Package").add_attribute(Attribute::Bold),
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("Repository").add_attribute(Attribute::Bold),
            Cell::new("Local").add_attribute(Attribute::Bold),
            Cell::new("Upstream").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Action").add_attribute(Attribute::Bold),
        ]);

        for dependency in dependencies {
            let repository = dependency
                .identity
                .as_ref()
                .map_or_else(|| "-".to_string(), ToString::to_string);
            let upstream = dependency.remote.as_ref().map_or_else(
                || "-".to_string(),
                |remote| {
                    format!(
                        "{}, .npmignore {}",
                        remote.manifest.label(),
                        remote.ignore.label()
                    )
                },
            );

            table.add_row(vec![
                Cell::new(dependency.display_name()),
                Cell::new(dependency.version.as_deref().unwrap_or("-")),
                Cell::new(repository),
                Cell::new(dependency.local.label()),
                Cell::new(upstream),
                self.format_status(dependency.status()),
                Cell::new(format_remediation(&dependency.remediation)),
            ]);
        }

        println!("{table}");
    }

    fn format_status(&self, status: DependencyStatus) -> Cell {
        let cell = Cell::new(status.as_str());
        if !self.supports_color() {
            return cell;
        }
        match status {
            DependencyStatus::Compliant => cell.fg(Color::Green),
            DependencyStatus::Remediated => cell.fg(Color::Cyan),
            DependencyStatus::NonCompliant => cell.fg(Color::Yellow),
            DependencyStatus::Unresolved => cell.fg(Color::DarkGrey),
            DependencyStatus::Failed => cell.fg(Color::Red),
        }
    }

    fn style_bold(&self, text: &str) -> String {
        if self.supports_color() {
            Style::new().bold().apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Check if color output is supported
    fn supports_color(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }
}

fn format_remediation(outcome: &RemediationOutcome) -> String {
    use tawata_types::DuplicateSource;

    match outcome {
        RemediationOutcome::NotRequired => "-".to_string(),
        RemediationOutcome::Undetermined { reason } => format!("skipped: {reason}"),
        RemediationOutcome::Disabled => "disabled".to_string(),
        RemediationOutcome::DryRun => "would open issue".to_string(),
        RemediationOutcome::Duplicate { source } => match source {
            DuplicateSource::OpenIssue { number, .. } => format!("open issue #{number}"),
            DuplicateSource::Ledger { last_attempt } => {
                format!("filed {}", last_attempt.format("%Y-%m-%d"))
            }
            DuplicateSource::SameRun => "filed this run".to_string(),
        },
        RemediationOutcome::Filed { url, .. } => url.clone(),
        RemediationOutcome::Failed { error } => format!("failed: {error}"),
    }
}
