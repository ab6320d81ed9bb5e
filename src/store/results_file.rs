use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use crate::config::Config;
use crate::error::SpanError;
use crate::session::options::PhaseOptions;
use crate::session::result::{self, HEADER, TrialResult};

/// Tab separated results of one participant.
///
/// The preamble is written when the run starts so that a crashed session
/// still leaves its settings behind; the report is appended once the script
/// has finished.
pub struct ResultsFile {
    path: PathBuf,
}

/// Rows and summary recovered from a results file.
#[derive(Debug, Default)]
pub struct Report {
    pub subject: Option<String>,
    pub results: Vec<TrialResult>,
    pub pcu: Option<f64>,
}

impl ResultsFile {
    /// Truncates `path` and writes the settings preamble.
    pub fn create(path: &Path, subject: &str, config: &Config) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)
            .with_context(|| format!("cannot create results file {}", path.display()))?;
        let mut out = BufWriter::new(file);
        writeln!(out, "# Py-span-task")?;
        writeln!(out, "# Written by spantask {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "# Started {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(out, "# Settings:")?;
        writeln!(out, "# subject id = {subject}")?;
        writeln!(out, "# allow_sloppy_spelling = {}", py_bool(config.allow_sloppy_spelling))?;
        writeln!(out, "# heed_order = {}", py_bool(config.heed_order))?;
        writeln!(out, "# time_out_factor = {:?}", config.time_out_factor)?;
        out.flush()?;

        tracing::info!(path = %path.display(), subject, "results file created");
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends the header, one row per list and the PCU line.
    pub fn append_report(&self, options: &PhaseOptions) -> Result<()> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("cannot open results file {}", self.path.display()))?;
        let mut out = BufWriter::new(file);
        writeln!(out, "{HEADER}")?;
        for row in &options.results {
            writeln!(out, "{row}")?;
        }
        if let Some(pcu) = options.pcu {
            writeln!(out, "{}", result::pcu_line(pcu))?;
        }
        out.flush()?;
        tracing::info!(rows = options.results.len(), pcu = ?options.pcu, "report written");
        Ok(())
    }

    pub fn read_report(path: &Path) -> Result<Report> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read results file {}", path.display()))?;
        let mut report = Report::default();
        for line in content.lines() {
            if line.trim().is_empty() || line == HEADER {
                continue;
            }
            if let Some(pcu) = result::parse_pcu_line(line) {
                report.pcu = Some(pcu);
            } else if let Some(subject) = line.strip_prefix("# subject id = ") {
                report.subject = Some(subject.trim().to_string());
            } else if !line.starts_with('#') {
                report.results.push(line.parse()?);
            }
        }
        Ok(report)
    }
}

/// Subject ids name the results file, so only ASCII letters and digits pass.
pub fn parse_subject_id(input: &str) -> std::result::Result<String, SpanError> {
    let id = input.trim();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(SpanError::InvalidSubjectId(id.to_string()));
    }
    Ok(id.to_string())
}

pub fn path_for_subject(subject: &str) -> PathBuf {
    PathBuf::from(format!("{subject}.tsv"))
}

/// Subject id recorded for an explicitly named results file: the file name
/// up to its first dot.
pub fn subject_from_path(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.split('.').next())
        .unwrap_or_default()
        .to_string()
}

fn py_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

#[cfg(test)]
mod tests {
    use regex::Regex;
    use tempfile::TempDir;

    use super::*;

    fn options() -> PhaseOptions {
        PhaseOptions {
            time_out_ms: Some(2000),
            results: vec![
                TrialResult::sample("practice", 1),
                TrialResult::sample("test", 1),
                TrialResult::sample("test", 2),
            ],
            pcu: Some(2.0 / 3.0),
        }
    }

    #[test]
    fn preamble_lists_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p01.tsv");
        let config = Config {
            allow_sloppy_spelling: true,
            time_out_factor: 3.0,
            ..Config::default()
        };
        ResultsFile::create(&path, "p01", &config).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "# Py-span-task");
        assert!(lines.iter().all(|l| l.starts_with('#')));
        assert!(lines.contains(&"# subject id = p01"));
        assert!(lines.contains(&"# allow_sloppy_spelling = True"));
        assert!(lines.contains(&"# heed_order = True"));
        assert!(lines.contains(&"# time_out_factor = 3.0"));
    }

    #[test]
    fn report_is_appended_after_preamble() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("p02.tsv");
        let file = ResultsFile::create(&path, "p02", &Config::default()).unwrap();
        file.append_report(&options()).unwrap();

        let content = fs::read_to_string(file.path()).unwrap();
        let body: Vec<&str> = content.lines().skip_while(|l| l.starts_with('#')).collect();
        assert_eq!(body[0], HEADER);
        assert_eq!(body.len(), 5);

        let row = Regex::new(r"^(practice|test)\t\d+\t\d+\t\d+\t\d+\t\d+\t\d+\t[^\t]*\t[^\t]*$").unwrap();
        for line in &body[1..4] {
            assert!(row.is_match(line), "bad row: {line:?}");
        }
        let pcu = Regex::new(r"^# Partial credit unit score \(PCU\): \d\.\d{3}$").unwrap();
        assert!(pcu.is_match(body[4]));
    }

    #[test]
    fn read_report_recovers_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p03.tsv");
        let file = ResultsFile::create(&path, "p03", &Config::default()).unwrap();
        file.append_report(&options()).unwrap();

        let report = ResultsFile::read_report(&path).unwrap();
        assert_eq!(report.subject.as_deref(), Some("p03"));
        assert_eq!(report.results, options().results);
        assert_eq!(report.pcu, Some(0.667));
    }

    #[test]
    fn subject_ids_are_alphanumeric() {
        assert_eq!(parse_subject_id(" p07 \n").unwrap(), "p07");
        assert!(parse_subject_id("").is_err());
        assert!(parse_subject_id("p 07").is_err());
        assert!(parse_subject_id("../p07").is_err());
        assert!(parse_subject_id("pé").is_err());
    }

    #[test]
    fn subject_and_path() {
        assert_eq!(path_for_subject("p07"), PathBuf::from("p07.tsv"));
        assert_eq!(subject_from_path(Path::new("out/p07.session1.tsv")), "p07");
        assert_eq!(subject_from_path(Path::new("p08")), "p08");
    }

    #[test]
    fn create_truncates_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p04.tsv");
        fs::write(&path, "stale\tcontent\n").unwrap();
        ResultsFile::create(&path, "p04", &Config::default()).unwrap();
        let report = ResultsFile::read_report(&path).unwrap();
        assert!(report.results.is_empty());
        assert_eq!(report.pcu, None);
    }
}
