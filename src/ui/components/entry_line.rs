use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::line_input::RecallEntry;
use crate::ui::theme::Theme;

/// Bordered recall line with a block cursor; blank while input is disabled.
pub struct EntryLine<'a> {
    entry: &'a RecallEntry,
    theme: &'a Theme,
}

impl<'a> EntryLine<'a> {
    pub fn new(entry: &'a RecallEntry, theme: &'a Theme) -> Self {
        Self { entry, theme }
    }
}

impl Widget for EntryLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if !self.entry.is_enabled() {
            return;
        }
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .title(Span::styled(" recall ", Style::default().fg(colors.accent())));
        let inner = block.inner(area);
        block.render(area, buf);

        let text = Style::default().fg(colors.fg());
        let cursor = Style::default().fg(colors.cursor_fg()).bg(colors.cursor_bg());
        let (before, at, after) = self.entry.render_parts();
        let line = Line::from(vec![
            Span::styled(before, text),
            Span::styled(at.map_or_else(|| " ".to_string(), String::from), cursor),
            Span::styled(after, text),
        ]);
        Paragraph::new(line).render(inner, buf);
    }
}
