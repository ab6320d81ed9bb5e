use std::collections::VecDeque;

use rand::Rng;

use crate::config::Config;
use crate::error::Result;
use crate::host::{Align, Host};
use crate::items::Material;
use crate::session::input::Input;
use crate::session::options::PhaseOptions;
use crate::session::practice::{PracticePhase, PracticeSettings};
use crate::session::screen::{GoodbyeScreen, TextScreen};
use crate::session::trial::{TrialPhase, TrialSettings};

/// What a phase sees while it handles one input.
pub struct PhaseContext<'a> {
    pub host: &'a mut dyn Host,
    pub material: &'a mut Material,
    /// Values forwarded by the phases that already completed.
    pub options: &'a PhaseOptions,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Active,
    /// The phase is done; the options are merged into what later phases see.
    Complete(PhaseOptions),
}

/// The contract every phase of the chain follows.
pub trait Script {
    fn handle(&mut self, input: Input, cx: &mut PhaseContext<'_>) -> Result<Step>;
}

pub enum Phase {
    Text(TextScreen),
    Practice(PracticePhase),
    Trials(TrialPhase),
    Goodbye(GoodbyeScreen),
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Text(_) => "text",
            Phase::Practice(_) => "practice",
            Phase::Trials(_) => "trials",
            Phase::Goodbye(_) => "goodbye",
        }
    }
}

impl Script for Phase {
    fn handle(&mut self, input: Input, cx: &mut PhaseContext<'_>) -> Result<Step> {
        match self {
            Phase::Text(p) => p.handle(input, cx),
            Phase::Practice(p) => p.handle(input, cx),
            Phase::Trials(p) => p.handle(input, cx),
            Phase::Goodbye(p) => p.handle(input, cx),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Dispatch {
    /// A phase is still active.
    Running,
    /// The last phase just completed. Reported exactly once.
    Finished(PhaseOptions),
    /// Nothing is left to receive the input.
    Idle,
}

/// Routes inputs to the head of an ordered queue of phases.
///
/// When the head completes it is dropped, its options are merged into the
/// carried options and the next phase is activated straight away so it can
/// show its first screen.
pub struct ScriptChain {
    phases: VecDeque<Phase>,
    options: PhaseOptions,
    material: Material,
    finished: bool,
}

impl ScriptChain {
    pub fn new(phases: Vec<Phase>, material: Material) -> Self {
        Self {
            phases: phases.into(),
            options: PhaseOptions::default(),
            material,
            finished: false,
        }
    }

    /// Activates the first phase.
    pub fn start(&mut self, host: &mut dyn Host) -> Result<Dispatch> {
        self.deliver(Input::Activate, host)
    }

    pub fn dispatch(&mut self, input: Input, host: &mut dyn Host) -> Result<Dispatch> {
        if self.phases.is_empty() {
            tracing::trace!(?input, "no active phase");
            return Ok(self.finish());
        }
        self.deliver(input, host)
    }

    pub fn current_phase(&self) -> Option<&'static str> {
        self.phases.front().map(Phase::name)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn deliver(&mut self, mut input: Input, host: &mut dyn Host) -> Result<Dispatch> {
        loop {
            let Some(phase) = self.phases.front_mut() else {
                return Ok(self.finish());
            };
            let mut cx = PhaseContext {
                host: &mut *host,
                material: &mut self.material,
                options: &self.options,
            };
            match phase.handle(input, &mut cx)? {
                Step::Active => return Ok(Dispatch::Running),
                Step::Complete(update) => {
                    if let Some(done) = self.phases.pop_front() {
                        tracing::debug!(phase = done.name(), remaining = self.phases.len(), "phase complete");
                    }
                    self.options.merge(update);
                    input = Input::Activate;
                }
            }
        }
    }

    fn finish(&mut self) -> Dispatch {
        if self.finished {
            return Dispatch::Idle;
        }
        self.finished = true;
        tracing::info!(lists = self.options.results.len(), "script finished");
        Dispatch::Finished(self.options.clone())
    }
}

/// The standard run: welcome, practice of the processing task, practice
/// lists, test lists, goodbye.
pub fn standard_script<R: Rng>(config: &Config, rng: &mut R) -> Vec<Phase> {
    let responses = config.response_keys();
    let trial_settings = |phase: &str, levels: &[usize], items_per_level: usize| TrialSettings {
        phase: phase.to_string(),
        levels: levels.to_vec(),
        items_per_level,
        target_display_ms: config.target_display_time,
        time_out_notice_ms: config.time_out_notice_time,
        typo_tolerance: config.typo_tolerance(),
        heed_order: config.heed_order,
        responses: responses.clone(),
        next_message: config.next_message.clone(),
        time_out_message: config.time_out_message.clone(),
        finished_message: config.finished_message.clone(),
    };

    vec![
        Phase::Text(TextScreen::new(&config.welcome_text, Align::Center)),
        Phase::Text(TextScreen::new(&config.instructions1, Align::Left)),
        Phase::Practice(PracticePhase::new(PracticeSettings {
            trials: config.practice_processing_items,
            warm_up: config.measure_time_after_trial,
            time_out_factor: config.time_out_factor,
            feedback_ms: config.response_display_time,
            correct_text: config.practice_correct_response.clone(),
            incorrect_text: config.practice_incorrect_response.clone(),
            summary_template: config.practice_summary.clone(),
            responses: responses.clone(),
        })),
        Phase::Text(TextScreen::new(&config.instructions2, Align::Left)),
        Phase::Trials(TrialPhase::new(
            trial_settings(
                "practice",
                &config.practice_levels,
                config.practice_items_per_level,
            ),
            rng,
        )),
        Phase::Text(TextScreen::new(&config.instructions3, Align::Left)),
        Phase::Trials(TrialPhase::new(
            trial_settings("test", &config.levels, config.items_per_level),
            rng,
        )),
        Phase::Goodbye(GoodbyeScreen::new(&config.good_bye_text)),
    ]
}
