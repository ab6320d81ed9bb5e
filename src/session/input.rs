use std::collections::BTreeMap;

use crate::host::TimerId;

/// Events delivered to the active phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
    /// The phase just became head of the chain.
    Activate,
    /// A bound key outside the recall entry line. Space is `Key(' ')`.
    Key(char),
    /// The participant confirmed the recall entry.
    Submit,
    Timer(TimerId),
}

impl Input {
    pub fn is_space(self) -> bool {
        self == Input::Key(' ')
    }

    /// Activation or space: the events that start the next item.
    pub fn is_advance(self) -> bool {
        matches!(self, Input::Activate | Input::Key(' '))
    }
}

/// Maps response labels (as used in the processing item file) to keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseKeys {
    keys: BTreeMap<String, char>,
}

impl ResponseKeys {
    pub fn new(keys: BTreeMap<String, char>) -> Self {
        Self { keys }
    }

    pub fn is_response(&self, key: char) -> bool {
        self.keys.values().any(|&k| k == key)
    }

    pub fn key_for(&self, label: &str) -> Option<char> {
        self.keys.get(label).copied()
    }

    /// Whether `key` is the correct answer for an item expecting `label`.
    pub fn accepts(&self, label: &str, key: char) -> bool {
        self.key_for(label) == Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yes_no() -> ResponseKeys {
        ResponseKeys::new(BTreeMap::from([("yes".into(), 'j'), ("no".into(), 'f')]))
    }

    #[test]
    fn response_lookup() {
        let keys = yes_no();
        assert!(keys.is_response('j'));
        assert!(!keys.is_response(' '));
        assert!(keys.accepts("no", 'f'));
        assert!(!keys.accepts("no", 'j'));
        assert!(!keys.accepts("maybe", 'j'));
    }

    #[test]
    fn advance_events() {
        assert!(Input::Activate.is_advance());
        assert!(Input::Key(' ').is_advance());
        assert!(!Input::Key('j').is_advance());
        assert!(!Input::Submit.is_advance());
    }
}
