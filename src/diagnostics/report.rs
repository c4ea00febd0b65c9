//! Running probes and rendering the report

use std::time::Instant;

use colored::Colorize;
use tabled::{
    builder::Builder,
    settings::{Alignment, Modify, Style, object::Rows},
};
use tracing::{debug, warn};

use super::probe::{Probe, ProbeResult, ProbeStatus};

/// Results of one diagnostics run, in probe order
#[derive(Debug)]
pub struct DiagnosticsReport {
    pub results: Vec<(&'static str, ProbeResult)>,
}

impl DiagnosticsReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn count(&self, status: ProbeStatus) -> usize {
        self.results
            .iter()
            .filter(|(_, result)| result.status == status)
            .count()
    }

    /// Worst status across all probes, Pass when empty
    pub fn overall(&self) -> ProbeStatus {
        self.results
            .iter()
            .map(|(_, result)| result.status)
            .max()
            .unwrap_or(ProbeStatus::Pass)
    }

    /// No probe failed
    pub fn is_healthy(&self) -> bool {
        self.overall().is_ok()
    }

    /// 0 = all pass, 1 = any fail, 2 = warnings only
    pub fn exit_code(&self) -> i32 {
        match self.overall() {
            ProbeStatus::Pass => 0,
            ProbeStatus::Fail => 1,
            ProbeStatus::Warn => 2,
        }
    }

    /// Renders the report as a table followed by a summary
    pub fn render(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Subsystem", "Status", "Duration", "Message"]);

        for (name, result) in &self.results {
            builder.push_record([
                name.to_string(),
                result.status.label(),
                format!("{:.2?}", result.duration),
                result.message.clone(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let mut output = table.to_string();
        output.push('\n');
        output.push_str(&format!("\n{}\n", "Summary".bold().underline()));
        output.push_str(&format!("  Probes: {}\n", self.total()));
        output.push_str(&format!(
            "  {} Passed: {}\n",
            "✓".green(),
            self.count(ProbeStatus::Pass)
        ));

        let warned = self.count(ProbeStatus::Warn);
        if warned > 0 {
            output.push_str(&format!("  {} Warned: {}\n", "⚠".yellow(), warned));
        }
        let failed = self.count(ProbeStatus::Fail);
        if failed > 0 {
            output.push_str(&format!("  {} Failed: {}\n", "✗".red(), failed));
        }

        let verdict = match self.overall() {
            ProbeStatus::Pass => "Overall: HEALTHY".green().bold(),
            ProbeStatus::Warn => "Overall: HEALTHY (with warnings)".yellow().bold(),
            ProbeStatus::Fail => "Overall: UNHEALTHY".red().bold(),
        };
        output.push_str(&format!("\n  {}\n", verdict));

        output
    }

    /// Prints the table and every probe's details to stdout
    pub fn print(&self) {
        println!("{}", self.render());

        for (name, result) in &self.results {
            if !result.details.is_empty() {
                println!("\n{} Details:", name.bold());
                println!("{}", result.details.join("\n"));
            }
        }
    }
}

/// Runs probes in the order they were added
#[derive(Default)]
pub struct Diagnostics {
    probes: Vec<Box<dyn Probe>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_probe<P: Probe + 'static>(mut self, probe: P) -> Self {
        self.probes.push(Box::new(probe));
        self
    }

    pub fn run(self) -> DiagnosticsReport {
        let results = self
            .probes
            .into_iter()
            .map(|probe| {
                let start = Instant::now();
                let mut result = probe.run();
                result.duration = start.elapsed();

                match result.status {
                    ProbeStatus::Pass => debug!(probe = probe.name(), "{}", result.message),
                    _ => warn!(probe = probe.name(), status = ?result.status, "{}", result.message),
                }

                (probe.name(), result)
            })
            .collect();

        DiagnosticsReport { results }
    }
}
