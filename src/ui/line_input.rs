use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryResult {
    Continue,
    Submit,
}

/// Single line editor for typed recall.
///
/// Only accepts keys while enabled; the host enables it when the recall
/// prompt is shown and disables it after the entry has been read.
#[derive(Debug, Default)]
pub struct RecallEntry {
    text: String,
    /// Char index; 0 is before the first char.
    cursor: usize,
    enabled: bool,
}

impl RecallEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Text before the cursor, the char under it (if any) and the rest.
    pub fn render_parts(&self) -> (&str, Option<char>, &str) {
        let at = self.byte_offset(self.cursor);
        let mut rest = self.text[at..].chars();
        match rest.next() {
            Some(ch) => (&self.text[..at], Some(ch), rest.as_str()),
            None => (&self.text, None, ""),
        }
    }

    pub fn handle(&mut self, key: KeyEvent) -> EntryResult {
        if !self.enabled {
            return EntryResult::Continue;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => return EntryResult::Submit,
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.remove_at(self.cursor);
            }
            KeyCode::Delete => self.remove_at(self.cursor),
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::Char('e') if ctrl => self.cursor = self.len(),
            KeyCode::Char('u') if ctrl => self.clear(),
            KeyCode::Char('w') if ctrl => self.delete_word_back(),
            KeyCode::Char(ch) if !ctrl => {
                let at = self.byte_offset(self.cursor);
                self.text.insert(at, ch);
                self.cursor += 1;
            }
            _ => {}
        }
        EntryResult::Continue
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map_or(self.text.len(), |(b, _)| b)
    }

    fn remove_at(&mut self, char_idx: usize) {
        let at = self.byte_offset(char_idx);
        if let Some(ch) = self.text[at..].chars().next() {
            self.text.replace_range(at..at + ch.len_utf8(), "");
        }
    }

    /// unix-word-rubout: trailing whitespace, then the word before it.
    fn delete_word_back(&mut self) {
        let chars: Vec<char> = self.text.chars().collect();
        let mut start = self.cursor;
        while start > 0 && chars[start - 1].is_whitespace() {
            start -= 1;
        }
        while start > 0 && !chars[start - 1].is_whitespace() {
            start -= 1;
        }
        let from = self.byte_offset(start);
        let to = self.byte_offset(self.cursor);
        self.text.replace_range(from..to, "");
        self.cursor = start;
    }
}
