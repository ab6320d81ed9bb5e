use crate::error::Result;
use crate::host::Align;
use crate::session::input::Input;
use crate::session::options::PhaseOptions;
use crate::session::script::{PhaseContext, Script, Step};

/// An instruction screen that stays up until the next key press.
pub struct TextScreen {
    text: String,
    align: Align,
    shown: bool,
}

impl TextScreen {
    pub fn new(text: &str, align: Align) -> Self {
        Self {
            text: text.to_string(),
            align,
            shown: false,
        }
    }
}

impl Script for TextScreen {
    fn handle(&mut self, input: Input, cx: &mut PhaseContext<'_>) -> Result<Step> {
        match input {
            Input::Activate => {
                cx.host.display(&self.text, self.align);
                self.shown = true;
                Ok(Step::Active)
            }
            Input::Key(_) if self.shown => Ok(Step::Complete(PhaseOptions::default())),
            _ => Ok(Step::Active),
        }
    }
}

/// Final screen. Completes as soon as it is shown so the run can be saved
/// while the participant reads it.
pub struct GoodbyeScreen {
    text: String,
}

impl GoodbyeScreen {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

impl Script for GoodbyeScreen {
    fn handle(&mut self, input: Input, cx: &mut PhaseContext<'_>) -> Result<Step> {
        if input == Input::Activate {
            cx.host.display(&self.text, Align::Center);
            return Ok(Step::Complete(PhaseOptions::default()));
        }
        Ok(Step::Active)
    }
}
