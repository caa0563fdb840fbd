//! # Conversation List Component
//!
//! Overlay listing saved conversations, newest first. Opened with Ctrl+O,
//! dismissed with Esc. The rows come from the `ConversationIndex`, which
//! reloads whenever a refetch is requested, so a conversation that was just
//! redirected to its permanent address shows up here.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `ConversationListState` lives in `TuiState`
//! - `ConversationList` is created each frame with borrowed state

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph};

use crate::services::ConversationSummary;
use crate::tui::components::centered_rect;
use crate::tui::event::TuiEvent;

pub struct ConversationListState {
    pub entries: Vec<ConversationSummary>,
    pub selected: usize,
    pub list_state: ListState,
}

impl ConversationListState {
    pub fn new(entries: Vec<ConversationSummary>) -> Self {
        let mut list_state = ListState::default();
        if !entries.is_empty() {
            list_state.select(Some(0));
        }
        Self {
            entries,
            selected: 0,
            list_state,
        }
    }

    /// Swap in a fresh list, keeping the selection on the same conversation if it is still there.
    pub fn refresh(&mut self, entries: Vec<ConversationSummary>) {
        let selected_id = self.entries.get(self.selected).map(|e| e.id.clone());
        self.entries = entries;
        self.selected = selected_id
            .and_then(|id| self.entries.iter().position(|e| e.id == id))
            .unwrap_or(0);
        self.list_state
            .select((!self.entries.is_empty()).then_some(self.selected));
    }

    pub fn handle_event(&mut self, event: &TuiEvent) -> Option<ConversationListEvent> {
        match event {
            TuiEvent::Escape | TuiEvent::OpenConversationList => Some(ConversationListEvent::Dismiss),
            TuiEvent::CursorUp => {
                if !self.entries.is_empty() {
                    self.selected = self.selected.saturating_sub(1);
                    self.list_state.select(Some(self.selected));
                }
                None
            }
            TuiEvent::CursorDown => {
                if !self.entries.is_empty() {
                    self.selected = (self.selected + 1).min(self.entries.len() - 1);
                    self.list_state.select(Some(self.selected));
                }
                None
            }
            TuiEvent::Submit => self
                .entries
                .get(self.selected)
                .map(|entry| ConversationListEvent::Open(entry.id.clone())),
            TuiEvent::InputChar('n') => Some(ConversationListEvent::NewChat),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationListEvent {
    Open(String),
    NewChat,
    Dismiss,
}

pub struct ConversationList<'a> {
    state: &'a mut ConversationListState,
    /// Id of the conversation on screen, marked in the list.
    active_id: Option<&'a str>,
}

impl<'a> ConversationList<'a> {
    pub fn new(state: &'a mut ConversationListState, active_id: Option<&'a str>) -> Self {
        Self { state, active_id }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(80, 70, area);
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Conversations ")
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(" n New chat  Enter Open  Esc Back ").centered())
            .padding(Padding::horizontal(1));

        if self.state.entries.is_empty() {
            let empty = Paragraph::new("No saved conversations yet.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, overlay);
            return;
        }

        let inner_width = overlay.width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = self
            .state
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let date = format_timestamp(entry.updated_at);
                let marker = if self.active_id == Some(entry.id.as_str()) { "* " } else { "  " };
                let count = format!("{} msgs", entry.message_count);

                // "* Jan 15  <title>  4 msgs"
                let fixed_width = marker.len() + date.len() + 2 + 2 + count.len();
                let title_width = inner_width.saturating_sub(fixed_width);
                let title = format!(
                    "{:<width$}",
                    truncate_str(&entry.title, title_width),
                    width = title_width
                );

                let style = if i == self.state.selected {
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else {
                    Style::default().fg(Color::Gray)
                };

                ListItem::new(Line::from(vec![
                    Span::styled(marker, style),
                    Span::styled(date, style),
                    Span::styled("  ", style),
                    Span::styled(title, style),
                    Span::styled("  ", style),
                    Span::styled(count, style),
                ]))
            })
            .collect();

        frame.render_stateful_widget(List::new(items).block(block), overlay, &mut self.state.list_state);
    }
}

/// Format a Unix timestamp as "Jan 15" style date.
fn format_timestamp(ts: i64) -> String {
    use chrono::{DateTime, Local, Utc};
    let dt: DateTime<Local> = DateTime::<Utc>::from_timestamp(ts, 0)
        .unwrap_or_default()
        .with_timezone(&Local);
    dt.format("%b %d").to_string()
}

/// Truncate to `max_width` chars, adding "..." if needed.
fn truncate_str(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        ".".repeat(max_width)
    } else {
        let head: String = s.chars().take(max_width - 3).collect();
        format!("{head}...")
    }
}
