//! # Limit Dialog Component
//!
//! Modal shown when a free account runs out of messages. Visibility lives in
//! the view state (`ViewState::limit_dialog_visible`); this component only
//! renders and maps keys to the two ways out.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};

use crate::tui::component::Component;
use crate::tui::components::centered_rect;
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitDialogEvent {
    Dismiss,
    Upgrade,
}

pub struct LimitDialog {
    pub limit: u32,
}

impl LimitDialog {
    pub fn new(limit: u32) -> Self {
        Self { limit }
    }

    pub fn handle_event(event: &TuiEvent) -> Option<LimitDialogEvent> {
        match event {
            TuiEvent::Escape | TuiEvent::InputChar('c') => Some(LimitDialogEvent::Dismiss),
            TuiEvent::Submit | TuiEvent::InputChar('u') => Some(LimitDialogEvent::Upgrade),
            _ => None,
        }
    }
}

impl Component for LimitDialog {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(60, 40, area);
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Message limit reached ")
            .title_bottom(Line::from(" Enter Upgrade  Esc Not now ").centered())
            .padding(Padding::uniform(1));

        let text = vec![
            Line::from(Span::styled(
                format!("You have used all {} free messages this month.", self.limit),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::default(),
            Line::from("Upgrade to Premium for unlimited messages, or come back"),
            Line::from("when your allowance resets next month."),
        ];

        let body = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(body, overlay);
    }
}
