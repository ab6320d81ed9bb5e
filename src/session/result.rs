use std::fmt;
use std::str::FromStr;

use crate::error::SpanError;

/// Column names of the results file, tab separated.
pub const HEADER: &str = "phase\tset.id\tnum.items\tcorrectly.recalled\tcorrectly.verified\tmean.rt\tmax.rt\tpresented.items\trecalled.items";

const FIELDS: usize = 9;

/// Outcome of one list: recall score, verification accuracy and timing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrialResult {
    pub phase: String,
    pub set_id: usize,
    pub level: usize,
    pub recalled: usize,
    pub verified: usize,
    pub mean_rt_ms: u64,
    pub max_rt_ms: u64,
    pub presented: Vec<String>,
    pub entered: Vec<String>,
}

impl TrialResult {
    pub fn proportion_recalled(&self) -> f64 {
        if self.level == 0 {
            return 0.0;
        }
        self.recalled as f64 / self.level as f64
    }

    pub fn to_line(&self) -> String {
        self.to_string()
    }

    #[cfg(test)]
    pub(crate) fn sample(phase: &str, set_id: usize) -> Self {
        Self {
            phase: phase.to_string(),
            set_id,
            level: 3,
            recalled: 2,
            verified: 3,
            mean_rt_ms: 1450,
            max_rt_ms: 2210,
            presented: vec!["f".into(), "k".into(), "q".into()],
            entered: vec!["f".into(), "q".into()],
        }
    }
}

impl fmt::Display for TrialResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.phase,
            self.set_id,
            self.level,
            self.recalled,
            self.verified,
            self.mean_rt_ms,
            self.max_rt_ms,
            self.presented.join(" "),
            self.entered.join(" "),
        )
    }
}

impl FromStr for TrialResult {
    type Err = SpanError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let malformed = || SpanError::MalformedResultLine(line.to_string());
        let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
        if fields.len() != FIELDS || fields[0].is_empty() {
            return Err(malformed());
        }
        let int = |s: &str| s.trim().parse::<u64>().map_err(|_| malformed());
        let words = |s: &str| s.split_whitespace().map(str::to_string).collect();

        Ok(Self {
            phase: fields[0].to_string(),
            set_id: int(fields[1])? as usize,
            level: int(fields[2])? as usize,
            recalled: int(fields[3])? as usize,
            verified: int(fields[4])? as usize,
            mean_rt_ms: int(fields[5])?,
            max_rt_ms: int(fields[6])?,
            presented: words(fields[7]),
            entered: words(fields[8]),
        })
    }
}

/// The closing comment line of a results file.
pub fn pcu_line(pcu: f64) -> String {
    format!("# Partial credit unit score (PCU): {pcu:.3}")
}

/// Parses a line produced by [`pcu_line`].
pub fn parse_pcu_line(line: &str) -> Option<f64> {
    line.trim()
        .strip_prefix("# Partial credit unit score (PCU):")?
        .trim()
        .parse()
        .ok()
}
