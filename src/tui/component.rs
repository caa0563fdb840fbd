use ratatui::Frame;
use ratatui::layout::Rect;

use super::event::TuiEvent;

/// A piece of the chat screen that draws itself into a `Rect`.
///
/// Display components (`TitleBar`, `Banner`, `RoutePage`) are built fresh each
/// frame from props. Stateful ones (`MessageList`, `ConversationList`) borrow
/// their state from `TuiState` for the duration of the draw.
///
/// `render` takes `&mut self` so a component can refresh caches while drawing,
/// e.g. the message list's layout cache and scroll clamp.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// Turns low-level `TuiEvent`s into a component's own events.
///
/// Returning `None` means the event changed nothing the caller cares about.
pub trait EventHandler {
    type Event;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event>;
}
