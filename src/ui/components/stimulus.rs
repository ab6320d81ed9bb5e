use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Text;
use ratatui::widgets::{Paragraph, Widget, Wrap};

use spantask::host::Align;

use crate::ui::layout::wrapped_line_count;
use crate::ui::theme::Theme;

/// Whatever the engine last displayed: instructions, an item, a target.
pub struct StimulusPanel<'a> {
    text: &'a str,
    align: Align,
    theme: &'a Theme,
}

impl<'a> StimulusPanel<'a> {
    pub fn new(text: &'a str, align: Align, theme: &'a Theme) -> Self {
        Self { text, align, theme }
    }
}

impl Widget for StimulusPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 2 || area.height == 0 {
            return;
        }
        let colors = &self.theme.colors;
        let base = Style::default().fg(colors.fg()).bg(colors.bg());
        buf.set_style(area, base);

        // Centred stimuli are single items and get emphasis; left aligned
        // text is instructions and keeps a margin.
        let (inner, alignment, style) = match self.align {
            Align::Center => (area, Alignment::Center, base.add_modifier(Modifier::BOLD)),
            Align::Left => (
                Rect::new(area.x + 2, area.y + 1, area.width - 2, area.height.saturating_sub(1)),
                Alignment::Left,
                base,
            ),
        };

        let used = wrapped_line_count(self.text, inner.width as usize) as u16;
        let top = match self.align {
            Align::Center => inner.height.saturating_sub(used) / 2,
            Align::Left => 0,
        };
        let target = Rect::new(inner.x, inner.y + top, inner.width, inner.height - top);

        Paragraph::new(Text::styled(self.text, style))
            .alignment(alignment)
            .wrap(Wrap { trim: false })
            .render(target, buf);
    }
}
