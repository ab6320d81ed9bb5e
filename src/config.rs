use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::engine::edit_distance::word_distance;
use crate::error::{Result, SpanError};
use crate::items::{ItemPool, ProcessingItem};
use crate::session::input::ResponseKeys;

/// Run configuration. Every field has a default so a partial file is enough.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub processing_items_file: Option<PathBuf>,
    #[serde(default)]
    pub target_items_file: Option<PathBuf>,
    #[serde(default = "default_responses")]
    pub responses: BTreeMap<String, char>,

    #[serde(default)]
    pub allow_sloppy_spelling: bool,
    #[serde(default = "default_true")]
    pub heed_order: bool,
    #[serde(default = "default_true")]
    pub pseudo_random_targets: bool,

    #[serde(default = "default_practice_processing_items")]
    pub practice_processing_items: usize,
    #[serde(default = "default_measure_time_after_trial")]
    pub measure_time_after_trial: usize,
    #[serde(default = "default_practice_levels", deserialize_with = "one_or_many")]
    pub practice_levels: Vec<usize>,
    #[serde(default = "default_practice_items_per_level")]
    pub practice_items_per_level: usize,
    #[serde(default = "default_levels", deserialize_with = "one_or_many")]
    pub levels: Vec<usize>,
    #[serde(default = "default_items_per_level")]
    pub items_per_level: usize,

    #[serde(default = "default_time_out_factor")]
    pub time_out_factor: f64,
    #[serde(default = "default_target_display_time")]
    pub target_display_time: u64,
    #[serde(default = "default_response_display_time")]
    pub response_display_time: u64,
    #[serde(default = "default_time_out_notice_time")]
    pub time_out_notice_time: u64,

    #[serde(default = "default_welcome_text")]
    pub welcome_text: String,
    #[serde(default = "default_instructions1")]
    pub instructions1: String,
    #[serde(default = "default_instructions2")]
    pub instructions2: String,
    #[serde(default = "default_instructions3")]
    pub instructions3: String,
    #[serde(default = "default_practice_correct_response")]
    pub practice_correct_response: String,
    #[serde(default = "default_practice_incorrect_response")]
    pub practice_incorrect_response: String,
    #[serde(default = "default_practice_summary")]
    pub practice_summary: String,
    #[serde(default = "default_next_message")]
    pub next_message: String,
    #[serde(default = "default_finished_message")]
    pub finished_message: String,
    #[serde(default = "default_time_out_message")]
    pub time_out_message: String,
    #[serde(default = "default_good_bye_text")]
    pub good_bye_text: String,

    #[serde(default = "default_theme")]
    pub theme: String,

    /// Directory relative item paths are resolved against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

fn default_responses() -> BTreeMap<String, char> {
    BTreeMap::from([("yes".to_string(), 'j'), ("no".to_string(), 'f')])
}
fn default_true() -> bool {
    true
}
fn default_practice_processing_items() -> usize {
    15
}
fn default_measure_time_after_trial() -> usize {
    3
}
fn default_practice_levels() -> Vec<usize> {
    vec![2, 3]
}
fn default_practice_items_per_level() -> usize {
    1
}
fn default_levels() -> Vec<usize> {
    vec![3, 4, 5, 6]
}
fn default_items_per_level() -> usize {
    3
}
fn default_time_out_factor() -> f64 {
    2.5
}
fn default_target_display_time() -> u64 {
    1000
}
fn default_response_display_time() -> u64 {
    1000
}
fn default_time_out_notice_time() -> u64 {
    1000
}
fn default_welcome_text() -> String {
    "Welcome!\n\nPress the space bar to continue.".to_string()
}
fn default_instructions1() -> String {
    "You will see simple arithmetic statements.\n\n\
     Press J if the statement is correct and F if it is wrong.\n\
     Answer as quickly and accurately as you can.\n\n\
     Press the space bar to start the practice."
        .to_string()
}
fn default_instructions2() -> String {
    "Now each statement is followed by a letter. Remember the letters in order.\n\n\
     At the question mark, type the letters you remember and press Enter.\n\n\
     Press the space bar to start a few practice sets."
        .to_string()
}
fn default_instructions3() -> String {
    "The practice is over. The real task works the same way.\n\n\
     Press the space bar to begin."
        .to_string()
}
fn default_practice_correct_response() -> String {
    "Correct!".to_string()
}
fn default_practice_incorrect_response() -> String {
    "Wrong.".to_string()
}
fn default_practice_summary() -> String {
    "You answered {correct} of {total} statements correctly.\n\n\
     Press the space bar to continue."
        .to_string()
}
fn default_next_message() -> String {
    "Press the space bar for the next set.".to_string()
}
fn default_finished_message() -> String {
    "Done. Press the space bar to continue.".to_string()
}
fn default_time_out_message() -> String {
    "Too slow!".to_string()
}
fn default_good_bye_text() -> String {
    "Thank you for participating!\n\nPress any key to quit.".to_string()
}
fn default_theme() -> String {
    "terminal-default".to_string()
}

/// Accepts `levels = 4` as well as `levels = [3, 4, 5]`.
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(usize),
        Many(Vec<usize>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(n) => vec![n],
        OneOrMany::Many(v) => v,
    })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            processing_items_file: None,
            target_items_file: None,
            responses: default_responses(),
            allow_sloppy_spelling: false,
            heed_order: default_true(),
            pseudo_random_targets: default_true(),
            practice_processing_items: default_practice_processing_items(),
            measure_time_after_trial: default_measure_time_after_trial(),
            practice_levels: default_practice_levels(),
            practice_items_per_level: default_practice_items_per_level(),
            levels: default_levels(),
            items_per_level: default_items_per_level(),
            time_out_factor: default_time_out_factor(),
            target_display_time: default_target_display_time(),
            response_display_time: default_response_display_time(),
            time_out_notice_time: default_time_out_notice_time(),
            welcome_text: default_welcome_text(),
            instructions1: default_instructions1(),
            instructions2: default_instructions2(),
            instructions3: default_instructions3(),
            practice_correct_response: default_practice_correct_response(),
            practice_incorrect_response: default_practice_incorrect_response(),
            practice_summary: default_practice_summary(),
            next_message: default_next_message(),
            finished_message: default_finished_message(),
            time_out_message: default_time_out_message(),
            good_bye_text: default_good_bye_text(),
            theme: default_theme(),
            base_dir: None,
        }
    }
}

/// Problems that do not prevent a run but deserve confirmation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigWarning {
    #[error("there are duplicates in the list of targets: {}", .0.join(", "))]
    DuplicateTargets(Vec<String>),
    #[error("there are duplicates in the list of processing items: {}", .0.join(", "))]
    DuplicateProcessingItems(Vec<String>),
    #[error("there are very few target items ({available} for sets of up to {max_level}); they might repeat too often")]
    FewTargets { available: usize, max_level: usize },
    #[error("only {0} practice trials are measured; the timeout estimate may be unreliable")]
    FewMeasuredTrials(usize),
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| SpanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Maximum edit distance for an entered word to count as a target.
    pub fn typo_tolerance(&self) -> usize {
        if self.allow_sloppy_spelling { 1 } else { 0 }
    }

    pub fn response_keys(&self) -> ResponseKeys {
        ResponseKeys::new(self.responses.clone())
    }

    pub fn processing_items_path(&self) -> Option<PathBuf> {
        self.resolve(self.processing_items_file.as_deref())
    }

    pub fn target_items_path(&self) -> Option<PathBuf> {
        self.resolve(self.target_items_file.as_deref())
    }

    fn resolve(&self, path: Option<&Path>) -> Option<PathBuf> {
        let path = path?;
        match &self.base_dir {
            Some(base) if path.is_relative() => Some(base.join(path)),
            _ => Some(path.to_path_buf()),
        }
    }

    pub fn max_level(&self) -> usize {
        self.practice_levels
            .iter()
            .chain(&self.levels)
            .copied()
            .max()
            .unwrap_or(0)
    }

    /// Processing items consumed by the practice and test sets together.
    pub fn processing_items_needed(&self) -> usize {
        self.practice_levels.iter().sum::<usize>() * self.practice_items_per_level
            + self.levels.iter().sum::<usize>() * self.items_per_level
    }

    /// Checks the preconditions of a run against the loaded pools.
    ///
    /// Errors make the run impossible; warnings are returned for the caller
    /// to report.
    pub fn validate(
        &self,
        processing: &ItemPool,
        processing_items: &[ProcessingItem],
        targets: &ItemPool,
    ) -> Result<Vec<ConfigWarning>> {
        let mut warnings = Vec::new();

        if self.responses.is_empty() {
            return Err(SpanError::NoResponses);
        }
        if self.levels.is_empty() {
            return Err(SpanError::NoTestLevels);
        }
        if self.levels.iter().chain(&self.practice_levels).any(|&l| l == 0) {
            return Err(SpanError::ZeroLevel);
        }
        if self.items_per_level == 0 {
            return Err(SpanError::NoListsPerLevel("items_per_level"));
        }
        if self.practice_items_per_level == 0 && !self.practice_levels.is_empty() {
            return Err(SpanError::NoListsPerLevel("practice_items_per_level"));
        }

        if !targets.duplicates().is_empty() {
            warnings.push(ConfigWarning::DuplicateTargets(targets.duplicates().to_vec()));
        }
        let max_level = self.max_level();
        targets.ensure_capacity(max_level)?;
        if targets.len() < 2 * max_level {
            warnings.push(ConfigWarning::FewTargets {
                available: targets.len(),
                max_level,
            });
        }

        if self.allow_sloppy_spelling {
            let items = targets.items();
            for (i, a) in items.iter().enumerate() {
                for b in &items[i + 1..] {
                    if word_distance(a, b) < 2 {
                        return Err(SpanError::TargetsTooSimilar(a.clone(), b.clone()));
                    }
                }
            }
        }

        let measured = self
            .practice_processing_items
            .saturating_sub(self.measure_time_after_trial);
        if measured < 1 {
            return Err(SpanError::TooFewPracticeTrials {
                practice: self.practice_processing_items,
                warm_up: self.measure_time_after_trial,
            });
        }
        if measured < 6 {
            warnings.push(ConfigWarning::FewMeasuredTrials(measured));
        }

        if !processing.duplicates().is_empty() {
            warnings.push(ConfigWarning::DuplicateProcessingItems(
                processing.duplicates().to_vec(),
            ));
        }
        let required = self.processing_items_needed();
        if required > processing.len() {
            return Err(SpanError::NotEnoughProcessingItems {
                available: processing.len(),
                required,
            });
        }

        let found = ItemPool::response_labels(processing_items);
        let configured: Vec<String> = self.responses.keys().cloned().collect();
        if !found.iter().eq(configured.iter()) {
            return Err(SpanError::ResponseMismatch {
                found: found.into_iter().collect(),
                configured,
            });
        }

        Ok(warnings)
    }
}
