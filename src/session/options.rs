use crate::session::result::TrialResult;

/// Values a phase hands forward to the phases after it.
///
/// Options only grow along the chain: a later phase may replace a scalar
/// with a newer estimate but results are only ever appended.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PhaseOptions {
    /// Adaptive verification timeout estimated during practice.
    pub time_out_ms: Option<u64>,
    pub results: Vec<TrialResult>,
    /// Partial credit unit of the most recent test phase.
    pub pcu: Option<f64>,
}

impl PhaseOptions {
    pub fn with_time_out(time_out_ms: u64) -> Self {
        Self {
            time_out_ms: Some(time_out_ms),
            ..Self::default()
        }
    }

    pub fn merge(&mut self, update: PhaseOptions) {
        if update.time_out_ms.is_some() {
            self.time_out_ms = update.time_out_ms;
        }
        if update.pcu.is_some() {
            self.pcu = update.pcu;
        }
        self.results.extend(update.results);
    }
}
