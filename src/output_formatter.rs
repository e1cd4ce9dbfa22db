use crate::cli::OutputFormat;
use crate::errors::Result;
use crate::replacer::Outcome;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// Totals for one run, folded from the collected outcomes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Files processed, whatever their result.
    pub scanned: usize,
    /// Files with at least one replacement.
    pub touched: usize,
    pub replacements: usize,
    pub errors: usize,
}

impl Summary {
    /// Folds a set of outcomes into totals. Order does not matter.
    pub fn from_outcomes(outcomes: &[Outcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut summary, outcome| {
            summary.scanned += 1;
            match outcome.replacements() {
                None => summary.errors += 1,
                Some(0) => {}
                Some(count) => {
                    summary.touched += 1;
                    summary.replacements += count;
                }
            }
            summary
        })
    }
}

/// Writes the report for a finished run in one of the supported formats.
///
/// Only files that were touched or failed are listed, sorted by path.
/// Dry runs and real runs share the same totals; only the wording differs.
pub struct OutputFormatter {
    format: OutputFormat,
    dry_run: bool,
    tool_name: String,
    tool_version: String,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, dry_run: bool) -> Self {
        Self {
            format,
            dry_run,
            tool_name: env!("CARGO_PKG_NAME").to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn write_report<W: Write>(&self, writer: &mut W, outcomes: &[Outcome]) -> Result<()> {
        let summary = Summary::from_outcomes(outcomes);
        let listed = listed_outcomes(outcomes);

        let output = match self.format {
            OutputFormat::Text => self.format_text(&listed, &summary),
            OutputFormat::Json => self.format_json(&listed, &summary)?,
            OutputFormat::Csv => self.format_csv(&listed)?,
        };

        writer.write_all(output.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    fn status(&self, outcome: &Outcome) -> &'static str {
        match (outcome.error(), self.dry_run) {
            (Some(_), _) => "error",
            (None, true) => "would_replace",
            (None, false) => "replaced",
        }
    }

    /// Formats the listing and totals as a human-readable report.
    fn format_text(&self, listed: &[&Outcome], summary: &Summary) -> String {
        let mut output = String::new();

        output.push('\n');
        if self.dry_run {
            output.push_str("=== Dry run ===\n");
        } else {
            output.push_str("=== Replacements ===\n");
        }
        output.push('\n');

        for outcome in listed {
            let path = outcome.path.display();
            match &outcome.result {
                Err(e) => output.push_str(&format!("  [error] {path}: {e}\n")),
                Ok(count) if self.dry_run => {
                    output.push_str(&format!("  [would replace] {path} ({count} occurrences)\n"))
                }
                Ok(count) => output.push_str(&format!("  [replaced] {path} ({count} replacements)\n")),
            }
        }

        output.push_str(&format!("\n{}\n", "-".repeat(50)));
        output.push_str(&format!("Files scanned : {}\n", summary.scanned));
        output.push_str(&format!("Files touched : {}\n", summary.touched));
        output.push_str(&format!("Replacements  : {}\n", summary.replacements));
        if summary.errors > 0 {
            output.push_str(&format!("Errors        : {}\n", summary.errors));
        }

        output
    }

    /// Formats the listing and totals as a structured JSON document.
    fn format_json(&self, listed: &[&Outcome], summary: &Summary) -> Result<String> {
        #[derive(Serialize)]
        struct JsonOutput<'a> {
            tool: ToolInfo<'a>,
            run_time: DateTime<Utc>,
            dry_run: bool,
            summary: &'a Summary,
            files: Vec<JsonFile>,
        }

        #[derive(Serialize)]
        struct ToolInfo<'a> {
            name: &'a str,
            version: &'a str,
        }

        #[derive(Serialize)]
        struct JsonFile {
            path: String,
            replacements: Option<usize>,
            error: Option<String>,
        }

        let files = listed
            .iter()
            .map(|o| JsonFile {
                path: o.path.display().to_string(),
                replacements: o.replacements(),
                error: o.error().map(|e| e.to_string()),
            })
            .collect();

        let output = JsonOutput {
            tool: ToolInfo {
                name: &self.tool_name,
                version: &self.tool_version,
            },
            run_time: Utc::now(),
            dry_run: self.dry_run,
            summary,
            files,
        };

        let mut json = serde_json::to_string_pretty(&output)?;
        json.push('\n');
        Ok(json)
    }

    /// Formats the listing as a CSV table.
    fn format_csv(&self, listed: &[&Outcome]) -> Result<String> {
        use csv::Writer;

        let mut wtr = Writer::from_writer(vec![]);
        wtr.write_record(["path", "status", "replacements", "error"])?;

        for outcome in listed {
            let replacements = outcome
                .replacements()
                .map(|c| c.to_string())
                .unwrap_or_default();
            let error = outcome.error().map(|e| e.to_string()).unwrap_or_default();
            wtr.write_record([
                outcome.path.display().to_string().as_str(),
                self.status(outcome),
                replacements.as_str(),
                error.as_str(),
            ])?;
        }

        let data = wtr
            .into_inner()
            .map_err(|e| format!("CSV writer error: {e}"))?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }
}

/// Touched and failed outcomes, sorted by path. Untouched files are omitted.
fn listed_outcomes(outcomes: &[Outcome]) -> Vec<&Outcome> {
    let mut listed: Vec<&Outcome> = outcomes
        .iter()
        .filter(|o| o.error().is_some() || o.is_touched())
        .collect();
    listed.sort_by(|a, b| a.path.cmp(&b.path));
    listed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ReplaceError;
    use std::io;
    use std::path::Path;

    fn sample() -> Vec<Outcome> {
        vec![
            Outcome::counted(Path::new("src/b.rs"), 3),
            Outcome::counted(Path::new("src/untouched.rs"), 0),
            Outcome::failed(
                Path::new("src/locked.rs"),
                ReplaceError::Read(io::Error::new(io::ErrorKind::PermissionDenied, "denied")),
            ),
            Outcome::counted(Path::new("src/a.rs"), 1),
        ]
    }

    fn render(format: OutputFormat, dry_run: bool, outcomes: &[Outcome]) -> String {
        let mut out = Vec::new();
        OutputFormatter::new(format, dry_run)
            .write_report(&mut out, outcomes)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_summary_fold() {
        let summary = Summary::from_outcomes(&sample());
        assert_eq!(
            summary,
            Summary {
                scanned: 4,
                touched: 2,
                replacements: 4,
                errors: 1,
            }
        );
        assert_eq!(Summary::from_outcomes(&[]), Summary::default());
    }

    #[test]
    fn test_text_report_real_run() {
        let text = render(OutputFormat::Text, false, &sample());

        assert!(text.contains("=== Replacements ==="));
        assert!(text.contains("  [replaced] src/b.rs (3 replacements)"));
        assert!(text.contains("  [error] src/locked.rs: read failed: denied"));
        assert!(!text.contains("untouched"));
        assert!(text.contains("Files touched : 2"));
        assert!(text.contains("Replacements  : 4"));
        assert!(text.contains("Errors        : 1"));

        let a = text.find("src/a.rs").unwrap();
        let b = text.find("src/b.rs").unwrap();
        assert!(a < b, "listing should be sorted by path");
    }

    #[test]
    fn test_text_report_dry_run_wording() {
        let outcomes = vec![Outcome::counted(Path::new("notes.md"), 2)];
        let text = render(OutputFormat::Text, true, &outcomes);

        assert!(text.contains("=== Dry run ==="));
        assert!(text.contains("  [would replace] notes.md (2 occurrences)"));
        assert!(!text.contains("Errors"), "error line is omitted when zero");
    }

    #[test]
    fn test_json_report() {
        let json = render(OutputFormat::Json, true, &sample());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["tool"]["name"], "bulkrep");
        assert_eq!(value["dry_run"], true);
        assert_eq!(value["summary"]["touched"], 2);
        assert_eq!(value["summary"]["errors"], 1);

        let files = value["files"].as_array().unwrap();
        assert_eq!(files.len(), 3);
        assert_eq!(files[0]["path"], "src/a.rs");
        assert_eq!(files[0]["replacements"], 1);
        assert_eq!(files[1]["path"], "src/b.rs");
        assert_eq!(files[2]["replacements"], serde_json::Value::Null);
        assert!(files[2]["error"].as_str().unwrap().contains("denied"));
    }

    #[test]
    fn test_csv_report() {
        let csv = render(OutputFormat::Csv, false, &sample());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "path,status,replacements,error");
        assert_eq!(lines[1], "src/a.rs,replaced,1,");
        assert_eq!(lines[2], "src/b.rs,replaced,3,");
        assert_eq!(lines[3], "src/locked.rs,error,,read failed: denied");
        assert_eq!(lines.len(), 4);
    }
}
