use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use spantask::host::{Align, Host, TimerId, TimerQueue};
use spantask::session::input::Input;
use spantask::session::script::{Dispatch, ScriptChain};
use spantask::store::results_file::ResultsFile;

use crate::ui::line_input::{EntryResult, RecallEntry};
use crate::ui::theme::Theme;

/// Longest the main loop sleeps when no timer is pending.
const IDLE_WAIT: Duration = Duration::from_millis(250);

/// Terminal side of the engine/host contract.
pub struct TerminalHost {
    started: Instant,
    timers: TimerQueue,
    pub screen: String,
    pub align: Align,
    pub entry: RecallEntry,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            timers: TimerQueue::new(),
            screen: String::new(),
            align: Align::Left,
            entry: RecallEntry::new(),
        }
    }

    /// How long until the earliest pending timer is due.
    pub fn until_next_timer(&self) -> Duration {
        match self.timers.next_deadline() {
            Some(deadline) => deadline.saturating_sub(self.now()).min(IDLE_WAIT),
            None => IDLE_WAIT,
        }
    }

    fn pop_due(&mut self) -> Option<TimerId> {
        let now = self.now();
        self.timers.pop_due(now)
    }
}

impl Host for TerminalHost {
    fn display(&mut self, text: &str, align: Align) {
        self.screen = text.to_string();
        self.align = align;
    }

    fn enable_text_input(&mut self) {
        self.entry.set_enabled(true);
    }

    fn disable_text_input(&mut self) {
        self.entry.set_enabled(false);
    }

    fn read_text_input(&self) -> String {
        self.entry.value().to_string()
    }

    fn clear_text_input(&mut self) {
        self.entry.clear();
    }

    fn schedule(&mut self, delay: Duration) -> TimerId {
        let now = self.now();
        let id = self.timers.schedule(now, delay);
        tracing::trace!(?id, delay_ms = delay.as_millis() as u64, "timer armed");
        id
    }

    fn cancel(&mut self, timer: TimerId) {
        if self.timers.cancel(timer) {
            tracing::trace!(id = ?timer, "timer cancelled");
        }
    }

    fn now(&self) -> Duration {
        self.started.elapsed()
    }
}

pub struct App {
    pub host: TerminalHost,
    pub theme: Theme,
    pub should_quit: bool,
    /// The report has been written; the next key exits.
    pub finished: bool,
    chain: ScriptChain,
    results: ResultsFile,
}

impl App {
    pub fn new(chain: ScriptChain, results: ResultsFile, theme: Theme) -> Self {
        Self {
            host: TerminalHost::new(),
            theme,
            should_quit: false,
            finished: false,
            chain,
            results,
        }
    }

    pub fn start(&mut self) -> Result<()> {
        let outcome = self.chain.start(&mut self.host)?;
        self.after_dispatch(outcome)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Only presses count; repeats would inflate responses.
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            tracing::warn!(phase = ?self.chain.current_phase(), "run aborted by user");
            self.should_quit = true;
            return Ok(());
        }
        if self.finished {
            self.should_quit = true;
            return Ok(());
        }

        let input = if self.host.entry.is_enabled() {
            match self.host.entry.handle(key) {
                EntryResult::Submit => Some(Input::Submit),
                EntryResult::Continue => None,
            }
        } else {
            match key.code {
                KeyCode::Char(ch) => Some(Input::Key(ch)),
                KeyCode::Enter => Some(Input::Key('\n')),
                _ => None,
            }
        };

        match input {
            Some(input) => self.dispatch(input),
            None => Ok(()),
        }
    }

    /// Delivers every timer that has come due.
    pub fn tick(&mut self) -> Result<()> {
        while let Some(timer) = self.host.pop_due() {
            self.dispatch(Input::Timer(timer))?;
        }
        Ok(())
    }

    pub fn wait_time(&self) -> Duration {
        self.host.until_next_timer()
    }

    fn dispatch(&mut self, input: Input) -> Result<()> {
        let outcome = self.chain.dispatch(input, &mut self.host)?;
        self.after_dispatch(outcome)
    }

    fn after_dispatch(&mut self, outcome: Dispatch) -> Result<()> {
        if let Dispatch::Finished(options) = outcome {
            self.results.append_report(&options)?;
            self.finished = true;
        }
        Ok(())
    }

    pub fn footer_hint(&self) -> &'static str {
        if self.finished {
            "press any key to exit"
        } else if self.host.entry.is_enabled() {
            "type the items in order  [Enter] submit"
        } else {
            "[Esc] abort"
        }
    }
}
