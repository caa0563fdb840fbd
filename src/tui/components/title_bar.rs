//! # TitleBar Component
//!
//! Top status bar: current address, plan, message usage and the latest status.
//!
//! TitleBar is purely presentational. It receives all data as props and has no
//! internal state:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar {
//!     address: app.address.clone(),
//!     tier: app.profile.tier,
//!     usage: Usage::Metered { used: 2, limit: 3 },
//!     status_message: app.status_message.clone(),
//! };
//! title_bar.render(frame, area);
//! ```
//!
//! Text priority, most important first, so narrow terminals keep the address:
//! `Charla | /chat/abc | free 2/3 | Thinking...`

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::state::{Tier, UserProfile};
use crate::tui::component::Component;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    Unlimited,
    Metered { used: u32, limit: u32 },
    SignedOut,
}

impl Usage {
    pub fn for_profile(profile: &UserProfile, limit: u32) -> Self {
        if !profile.is_authenticated() {
            Usage::SignedOut
        } else if profile.is_premium() {
            Usage::Unlimited
        } else {
            Usage::Metered {
                used: profile.message_count.min(limit),
                limit,
            }
        }
    }

    fn label(self) -> String {
        match self {
            Usage::Unlimited => "unlimited".to_string(),
            Usage::Metered { used, limit } => format!("{used}/{limit}"),
            Usage::SignedOut => "signed out".to_string(),
        }
    }
}

pub struct TitleBar {
    pub address: String,
    pub tier: Tier,
    pub usage: Usage,
    pub status_message: String,
}

impl TitleBar {
    pub fn new(address: String, tier: Tier, usage: Usage, status_message: String) -> Self {
        Self {
            address,
            tier,
            usage,
            status_message,
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let dim = Style::default().add_modifier(Modifier::DIM);
        let usage_style = match self.usage {
            Usage::Metered { used, limit } if used >= limit => Style::default().fg(Color::Red),
            _ => Style::default().fg(Color::Cyan),
        };

        let mut spans = vec![
            Span::styled("Charla", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(" | ", dim),
            Span::raw(self.address.as_str()),
            Span::styled(" | ", dim),
            Span::styled(
                format!("{} {}", self.tier.label(), self.usage.label()),
                usage_style,
            ),
        ];
        if !self.status_message.is_empty() {
            spans.push(Span::styled(" | ", dim));
            spans.push(Span::raw(self.status_message.as_str()));
        }

        frame.render_widget(Line::from(spans), area);
    }
}
