//! # TUI Components
//!
//! All UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as struct fields:
//! - `TitleBar`: address, plan usage and status
//! - `Banner`: missing configuration warnings
//! - `Ticker`: scrolling market symbols
//! - `EmptyScreen`: onboarding for an empty conversation
//! - `Message`: a single chat message
//! - `LimitDialog`: upgrade modal
//! - `RoutePage`: sign-in and pricing pages
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that keep state in `TuiState` and emit events:
//! - `InputBox`: message entry
//! - `MessageList`: scrollable conversation with layout caching
//! - `ConversationList`: saved conversation overlay
//! - `Toasts`: expiring notices
//!
//! Components receive external data as props, never by reaching into `App`,
//! which keeps them testable against a `TestBackend`:
//!
//! ```rust,ignore
//! // Good: dependencies are explicit
//! Banner::new(&app.missing_keys).render(frame, area);
//! ```

pub mod banner;
pub mod conversation_list;
pub mod empty_screen;
pub mod input_box;
pub mod limit_dialog;
pub mod message;
pub mod message_list;
pub mod route_page;
pub mod ticker;
pub mod title_bar;
pub mod toasts;

pub use banner::Banner;
pub use conversation_list::{ConversationList, ConversationListEvent, ConversationListState};
pub use empty_screen::EmptyScreen;
pub use input_box::{InputBox, InputEvent};
pub use limit_dialog::{LimitDialog, LimitDialogEvent};
pub use message_list::{MessageList, MessageListState};
pub use route_page::RoutePage;
pub use ticker::Ticker;
pub use title_bar::{TitleBar, Usage};
pub use toasts::Toasts;

use ratatui::layout::{Constraint, Layout, Rect};

/// Compute a centered rect using percentage of the outer rect.
pub fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}
