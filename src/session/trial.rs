use std::collections::VecDeque;
use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::engine::{scoring, timing};
use crate::error::{Result, SpanError};
use crate::host::{Align, TimerId};
use crate::items::{ItemSource, ProcessingItem};
use crate::session::input::{Input, ResponseKeys};
use crate::session::options::PhaseOptions;
use crate::session::result::TrialResult;
use crate::session::script::{PhaseContext, Script, Step};

#[derive(Clone, Debug)]
pub struct TrialSettings {
    /// Name written to the results file, e.g. "practice" or "test".
    pub phase: String,
    pub levels: Vec<usize>,
    pub items_per_level: usize,
    pub target_display_ms: u64,
    pub time_out_notice_ms: u64,
    pub typo_tolerance: usize,
    pub heed_order: bool,
    pub responses: ResponseKeys,
    pub next_message: String,
    pub time_out_message: String,
    pub finished_message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrialState {
    /// Waiting for space before the first item of a list.
    AwaitProcessingItem,
    /// A processing item is on screen and the verification timer is armed.
    ShowingProcessingItem {
        expected: String,
        started: Duration,
        timer: TimerId,
    },
    /// The response window closed without a response.
    TimeoutNotice { timer: TimerId },
    ShowingTarget { timer: TimerId },
    AwaitRecallEntry,
    /// All lists are scored; waiting for a key to hand over.
    Finished,
}

/// Accumulators for the list in progress.
#[derive(Debug)]
struct ListState {
    set_id: usize,
    level: usize,
    processing: VecDeque<ProcessingItem>,
    targets: VecDeque<String>,
    presented: Vec<String>,
    verified: usize,
    reaction_times_ms: Vec<f64>,
}

/// Runs the lists of one phase: processing items interleaved with targets,
/// followed by typed recall of the targets.
pub struct TrialPhase {
    settings: TrialSettings,
    /// Remaining list sizes; the next list is popped from the back.
    sets: Vec<usize>,
    state: TrialState,
    list: Option<ListState>,
    next_set_id: usize,
    time_out: Duration,
    proportions: Vec<f64>,
    results: Vec<TrialResult>,
}

impl TrialPhase {
    /// Every level appears `items_per_level` times, in random order.
    pub fn new<R: Rng>(settings: TrialSettings, rng: &mut R) -> Self {
        let mut sets: Vec<usize> = (0..settings.items_per_level)
            .flat_map(|_| settings.levels.iter().copied())
            .collect();
        sets.shuffle(rng);
        Self {
            settings,
            sets,
            state: TrialState::AwaitProcessingItem,
            list: None,
            next_set_id: 1,
            time_out: Duration::ZERO,
            proportions: Vec::new(),
            results: Vec::new(),
        }
    }

    pub fn state(&self) -> &TrialState {
        &self.state
    }

    pub fn results(&self) -> &[TrialResult] {
        &self.results
    }

    pub fn remaining_sets(&self) -> usize {
        self.sets.len()
    }

    fn start_list(&mut self, cx: &mut PhaseContext<'_>) -> bool {
        let Some(level) = self.sets.pop() else {
            return false;
        };
        let set_id = self.next_set_id;
        self.next_set_id += 1;
        let processing = cx.material.processing.draw_set(level).into();
        let targets = cx.material.targets.draw_set(level).into();
        tracing::debug!(phase = %self.settings.phase, set_id, level, "starting list");
        self.list = Some(ListState {
            set_id,
            level,
            processing,
            targets,
            presented: Vec::new(),
            verified: 0,
            reaction_times_ms: Vec::new(),
        });
        true
    }

    fn show_processing_item(&mut self, cx: &mut PhaseContext<'_>) {
        let Some(item) = self.list.as_mut().and_then(|l| l.processing.pop_front()) else {
            self.ask_for_recall(cx);
            return;
        };
        cx.host.display(&item.prompt, Align::Center);
        let timer = cx.host.schedule(self.time_out);
        self.state = TrialState::ShowingProcessingItem {
            expected: item.expected,
            started: cx.host.now(),
            timer,
        };
    }

    fn show_target(&mut self, cx: &mut PhaseContext<'_>) {
        if let Some(list) = self.list.as_mut() {
            let target = list.targets.pop_front().unwrap_or_default();
            cx.host.display(&target, Align::Center);
            list.presented.push(target);
        }
        let timer = cx
            .host
            .schedule(Duration::from_millis(self.settings.target_display_ms));
        self.state = TrialState::ShowingTarget { timer };
    }

    fn after_target(&mut self, cx: &mut PhaseContext<'_>) {
        let more = self.list.as_ref().is_some_and(|l| !l.processing.is_empty());
        if more {
            self.show_processing_item(cx);
        } else {
            self.ask_for_recall(cx);
        }
    }

    fn ask_for_recall(&mut self, cx: &mut PhaseContext<'_>) {
        cx.host.display("?", Align::Center);
        cx.host.clear_text_input();
        cx.host.enable_text_input();
        self.state = TrialState::AwaitRecallEntry;
    }

    fn score_list(&mut self, cx: &mut PhaseContext<'_>) -> Result<()> {
        let entry = cx.host.read_text_input();
        cx.host.clear_text_input();
        cx.host.disable_text_input();

        let Some(list) = self.list.take() else {
            return Ok(());
        };
        let entered = scoring::tokenize_recall(&entry, cx.material.single_letters);
        let presented: Vec<String> = list.presented.iter().map(|t| t.to_lowercase()).collect();
        let recalled = scoring::score(
            &entered,
            &presented,
            self.settings.typo_tolerance,
            self.settings.heed_order,
        );

        let mean_rt = timing::mean(&list.reaction_times_ms)?;
        let max_rt = list
            .reaction_times_ms
            .iter()
            .copied()
            .fold(0.0_f64, f64::max);

        tracing::info!(
            phase = %self.settings.phase,
            set_id = list.set_id,
            presented = %presented.join(", "),
            entered = %entered.join(", "),
            "correct: {recalled} out of {}",
            list.level
        );

        let result = TrialResult {
            phase: self.settings.phase.clone(),
            set_id: list.set_id,
            level: list.level,
            recalled,
            verified: list.verified,
            mean_rt_ms: mean_rt as u64,
            max_rt_ms: max_rt as u64,
            presented,
            entered,
        };
        self.proportions.push(result.proportion_recalled());
        self.results.push(result);
        Ok(())
    }

    fn next_list_or_finish(&mut self, cx: &mut PhaseContext<'_>) {
        if self.start_list(cx) {
            cx.host.display(&self.settings.next_message, Align::Center);
            self.state = TrialState::AwaitProcessingItem;
        } else {
            cx.host.display(&self.settings.finished_message, Align::Center);
            self.state = TrialState::Finished;
        }
    }

    fn hand_over(&mut self) -> Result<Step> {
        let pcu = if self.proportions.is_empty() {
            None
        } else {
            Some(scoring::partial_credit_unit(&self.proportions)?)
        };
        if let Some(pcu) = pcu {
            tracing::info!(phase = %self.settings.phase, pcu, "phase finished");
        }
        Ok(Step::Complete(PhaseOptions {
            time_out_ms: None,
            results: std::mem::take(&mut self.results),
            pcu,
        }))
    }
}

impl Script for TrialPhase {
    fn handle(&mut self, input: Input, cx: &mut PhaseContext<'_>) -> Result<Step> {
        match (&self.state, input) {
            (_, Input::Activate) => {
                let time_out = cx
                    .options
                    .time_out_ms
                    .ok_or(SpanError::MissingOption("time_out"))?;
                self.time_out = Duration::from_millis(time_out);
                if !self.start_list(cx) {
                    return self.hand_over();
                }
                self.show_processing_item(cx);
            }
            (TrialState::AwaitProcessingItem, input) if input.is_space() => {
                self.show_processing_item(cx);
            }
            (TrialState::ShowingProcessingItem { expected, started, timer }, Input::Key(key))
                if self.settings.responses.is_response(key) =>
            {
                cx.host.cancel(*timer);
                let rt = cx.host.now().saturating_sub(*started);
                let correct = self.settings.responses.accepts(expected, key);
                if let Some(list) = self.list.as_mut() {
                    list.reaction_times_ms.push(rt.as_secs_f64() * 1000.0);
                    if correct {
                        list.verified += 1;
                    }
                }
                tracing::debug!(rt_ms = rt.as_millis() as u64, correct, "verification response");
                self.show_target(cx);
            }
            (TrialState::ShowingProcessingItem { timer, .. }, Input::Timer(fired))
                if *timer == fired =>
            {
                if let Some(list) = self.list.as_mut() {
                    list.reaction_times_ms
                        .push(self.time_out.as_secs_f64() * 1000.0);
                }
                tracing::debug!("verification timed out");
                cx.host.display(&self.settings.time_out_message, Align::Center);
                let notice = cx
                    .host
                    .schedule(Duration::from_millis(self.settings.time_out_notice_ms));
                self.state = TrialState::TimeoutNotice { timer: notice };
            }
            (TrialState::TimeoutNotice { timer }, Input::Timer(fired)) if *timer == fired => {
                self.show_target(cx);
            }
            (TrialState::ShowingTarget { timer }, Input::Timer(fired)) if *timer == fired => {
                self.after_target(cx);
            }
            (TrialState::AwaitRecallEntry, Input::Submit) => {
                self.score_list(cx)?;
                self.next_list_or_finish(cx);
            }
            (TrialState::Finished, Input::Key(_)) => return self.hand_over(),
            (state, input) => {
                tracing::trace!(?state, ?input, "trial ignored input");
            }
        }
        Ok(Step::Active)
    }
}
