use std::time::Duration;

use crate::engine::timing;
use crate::error::Result;
use crate::host::{Align, TimerId};
use crate::items::ItemSource;
use crate::session::input::{Input, ResponseKeys};
use crate::session::options::PhaseOptions;
use crate::session::script::{PhaseContext, Script, Step};

#[derive(Clone, Debug)]
pub struct PracticeSettings {
    pub trials: usize,
    /// Leading trials left out of the timeout estimate.
    pub warm_up: usize,
    pub time_out_factor: f64,
    pub feedback_ms: u64,
    pub correct_text: String,
    pub incorrect_text: String,
    /// Summary screen; `{correct}` and `{total}` are filled in.
    pub summary_template: String,
    pub responses: ResponseKeys,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum PracticeState {
    Idle,
    AwaitingResponse { expected: String },
    Feedback { timer: TimerId },
    Summary,
}

/// Processing items alone, with feedback, to measure how long the
/// participant needs per item.
pub struct PracticePhase {
    settings: PracticeSettings,
    state: PracticeState,
    shown: usize,
    correct: usize,
    onsets_ms: Vec<f64>,
    time_out_ms: Option<u64>,
}

impl PracticePhase {
    pub fn new(settings: PracticeSettings) -> Self {
        Self {
            settings,
            state: PracticeState::Idle,
            shown: 0,
            correct: 0,
            onsets_ms: Vec::new(),
            time_out_ms: None,
        }
    }

    pub fn correct(&self) -> usize {
        self.correct
    }

    pub fn time_out_ms(&self) -> Option<u64> {
        self.time_out_ms
    }

    fn show_item(&mut self, cx: &mut PhaseContext<'_>) {
        let item = cx.material.processing.next_item();
        self.onsets_ms.push(millis(cx.host.now()));
        cx.host.display(&item.prompt, Align::Center);
        self.shown += 1;
        self.state = PracticeState::AwaitingResponse {
            expected: item.expected,
        };
    }

    fn show_summary(&mut self, cx: &mut PhaseContext<'_>) -> Result<()> {
        self.onsets_ms.push(millis(cx.host.now()));
        let summary = self
            .settings
            .summary_template
            .replace("{total}", &self.settings.trials.to_string())
            .replace("{correct}", &self.correct.to_string());
        cx.host.display(&summary, Align::Left);

        let time_out = timing::adaptive_timeout_ms(
            &self.onsets_ms,
            self.settings.warm_up,
            self.settings.time_out_factor,
        )?;
        tracing::info!(
            correct = self.correct,
            total = self.settings.trials,
            time_out_ms = time_out,
            "practice finished"
        );
        self.time_out_ms = Some(time_out);
        self.state = PracticeState::Summary;
        Ok(())
    }
}

impl Script for PracticePhase {
    fn handle(&mut self, input: Input, cx: &mut PhaseContext<'_>) -> Result<Step> {
        match (&self.state, input) {
            (PracticeState::Idle, input) if input.is_advance() => {
                self.show_item(cx);
            }
            (PracticeState::AwaitingResponse { expected }, Input::Key(key))
                if self.settings.responses.is_response(key) =>
            {
                let feedback = if self.settings.responses.accepts(expected, key) {
                    self.correct += 1;
                    &self.settings.correct_text
                } else {
                    &self.settings.incorrect_text
                };
                cx.host.display(feedback, Align::Center);
                let timer = cx
                    .host
                    .schedule(Duration::from_millis(self.settings.feedback_ms));
                self.state = PracticeState::Feedback { timer };
            }
            (PracticeState::Feedback { timer }, Input::Timer(fired)) if *timer == fired => {
                if self.shown >= self.settings.trials {
                    self.show_summary(cx)?;
                } else {
                    self.show_item(cx);
                }
            }
            (PracticeState::Summary, Input::Key(_)) => {
                let time_out = self.time_out_ms.unwrap_or_default();
                return Ok(Step::Complete(PhaseOptions::with_time_out(time_out)));
            }
            (state, input) => {
                tracing::trace!(?state, ?input, "practice ignored input");
            }
        }
        Ok(Step::Active)
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::host::Host;
    use crate::host::testing::RecordingHost;
    use crate::items::{ItemPool, Material};

    fn material() -> Material {
        let processing = ItemPool::from_text("processing", "p0\tyes\np1\tno\np2\tyes\np3\tno").unwrap();
        let targets = ItemPool::from_text("targets", "a\nb\nc").unwrap();
        Material::new(
            processing.processing_items().unwrap(),
            &targets,
            true,
            SmallRng::seed_from_u64(1),
        )
    }

    fn settings(trials: usize, warm_up: usize) -> PracticeSettings {
        PracticeSettings {
            trials,
            warm_up,
            time_out_factor: 2.0,
            feedback_ms: 500,
            correct_text: "Correct!".into(),
            incorrect_text: "Wrong.".into(),
            summary_template: "{correct} of {total}".into(),
            responses: ResponseKeys::new(BTreeMap::from([("yes".into(), 'j'), ("no".into(), 'f')])),
        }
    }

    struct Harness {
        phase: PracticePhase,
        host: RecordingHost,
        material: Material,
        options: PhaseOptions,
    }

    impl Harness {
        fn new(trials: usize, warm_up: usize) -> Self {
            Self {
                phase: PracticePhase::new(settings(trials, warm_up)),
                host: RecordingHost::new(),
                material: material(),
                options: PhaseOptions::default(),
            }
        }

        fn send(&mut self, input: Input) -> Step {
            let mut cx = PhaseContext {
                host: &mut self.host,
                material: &mut self.material,
                options: &self.options,
            };
            self.phase.handle(input, &mut cx).unwrap()
        }

        /// Answers the item on screen after `rt`.
        fn answer(&mut self, rt: Duration, correct: bool) {
            self.host.advance(rt);
            let expected = match &self.phase.state {
                PracticeState::AwaitingResponse { expected } => expected.clone(),
                other => panic!("no item on screen: {other:?}"),
            };
            let right = if expected == "yes" { 'j' } else { 'f' };
            let wrong = if expected == "yes" { 'f' } else { 'j' };
            self.send(Input::Key(if correct { right } else { wrong }));
        }

        fn end_feedback(&mut self) {
            let timer = self.host.fire_next().expect("feedback timer");
            self.send(Input::Timer(timer));
        }
    }

    #[test]
    fn feedback_then_next_item() {
        let mut h = Harness::new(3, 1);
        assert_eq!(h.send(Input::Activate), Step::Active);
        assert!(h.host.screen.starts_with('p'));

        h.answer(Duration::from_millis(800), true);
        assert_eq!(h.host.screen, "Correct!");
        h.end_feedback();
        assert!(h.host.screen.starts_with('p'));

        h.answer(Duration::from_millis(800), false);
        assert_eq!(h.host.screen, "Wrong.");
        assert_eq!(h.phase.correct(), 1);
    }

    #[test]
    fn non_response_keys_are_ignored() {
        let mut h = Harness::new(2, 0);
        h.send(Input::Activate);
        let prompt = h.host.screen.clone();
        h.send(Input::Key('x'));
        h.send(Input::Key(' '));
        h.send(Input::Submit);
        assert_eq!(h.host.screen, prompt);
        assert!(h.host.timers.next_deadline().is_none());
    }

    #[test]
    fn summary_carries_timeout_estimate() {
        let mut h = Harness::new(4, 1);
        h.send(Input::Activate);
        // Slow warm-up trial, then steady 1000 ms cycles (500 ms rt + 500 ms feedback).
        h.answer(Duration::from_millis(4000), true);
        h.end_feedback();
        for _ in 0..3 {
            h.answer(Duration::from_millis(500), true);
            h.end_feedback();
        }
        assert_eq!(h.host.screen, "4 of 4");
        assert_eq!(h.phase.time_out_ms(), Some(1000));

        match h.send(Input::Key(' ')) {
            Step::Complete(options) => assert_eq!(options.time_out_ms, Some(1000)),
            Step::Active => panic!("practice should complete after the summary"),
        }
    }

    #[test]
    fn stale_timer_is_ignored() {
        let mut h = Harness::new(2, 0);
        h.send(Input::Activate);
        h.answer(Duration::from_millis(300), true);
        let stale = h.host.schedule(Duration::from_millis(1));
        h.send(Input::Timer(stale));
        assert_eq!(h.host.screen, "Correct!");
    }
}
