//! Output formatting functionality
//!
//! This module provides formatters for different output formats.

use crate::error::Result;
use crate::models::rewrite::RewriteReport;
use ansi_term::Colour::{Cyan, Green, Red, Yellow};
use ansi_term::Style;
use std::path::Path;
use std::time::Duration;

/// Format a rewrite report as text
pub fn format_report_text(report: &RewriteReport, use_colors: bool, verbose: bool) -> String {
    let mut output = String::new();
    let rewritten = report.rewritten_files();

    let title = if report.dry_run {
        "Import Rewrite Summary (dry run)"
    } else {
        "Import Rewrite Summary"
    };
    if use_colors {
        output.push_str(&format!("{}\n", Style::new().bold().paint(title)));
    } else {
        output.push_str(&format!("{}\n", title));
    }
    output.push_str(&format!("{}\n", "=".repeat(title.len())));

    output.push_str(&format!(
        "Converted files: {} ({} with default export)\n",
        report.converted_files, report.default_exports
    ));
    output.push_str(&format!(
        "Candidates: {} parseable, {} legacy\n",
        report.parseable_candidates, report.legacy_candidates
    ));

    let verb = if report.dry_run { "Would rewrite" } else { "Rewrote" };
    let count = if use_colors {
        Green.bold().paint(rewritten.len().to_string()).to_string()
    } else {
        rewritten.len().to_string()
    };
    output.push_str(&format!("{} {} file(s)\n", verb, count));

    if verbose {
        output.push_str(&format!("  structural: {}\n", report.structural_rewrites.len()));
        for pass in &report.pass_rewrites {
            output.push_str(&format!("  {}: {}\n", pass.pass, pass.files.len()));
        }
        output.push_str(&format!("  legacy: {}\n", report.legacy_rewrites.len()));
    }

    for path in &rewritten {
        output.push_str(&format!("  {}\n", paint_path(path, use_colors)));
    }

    if !report.pass_failures.is_empty() {
        output.push_str("\nFailed passes:\n");
        for failure in &report.pass_failures {
            let label = if use_colors {
                Red.bold().paint("ERROR").to_string()
            } else {
                "ERROR".to_string()
            };
            output.push_str(&format!("  [{}] {}: {}\n", label, failure.pass, failure.message));
        }
    }

    if !report.failures.is_empty() {
        output.push_str("\nSkipped files:\n");
        for failure in &report.failures {
            let label = if use_colors {
                Yellow.paint("WARNING").to_string()
            } else {
                "WARNING".to_string()
            };
            output.push_str(&format!("  [{}] {}\n", label, failure.message));
        }
    }

    output.push_str(&format!("\nDuration: {}\n", format_duration(report.duration)));
    output
}

/// Only the rewritten paths, one per line
pub fn format_report_paths(report: &RewriteReport) -> String {
    report
        .rewritten_files()
        .iter()
        .map(|path| format!("{}\n", path.display()))
        .collect()
}

/// Format a rewrite report as JSON
pub fn format_report_json(report: &RewriteReport, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    Ok(json)
}

fn paint_path(path: &Path, use_colors: bool) -> String {
    if use_colors {
        Cyan.paint(path.display().to_string()).to_string()
    } else {
        path.display().to_string()
    }
}

/// Format a duration in a human-readable way
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}
