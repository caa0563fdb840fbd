//! # Route Page Component
//!
//! Placeholder page for addresses outside the chat view (sign-in, pricing).
//! The real pages belong to the account site; here they explain where the user
//! landed and how to get back.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Wrap};

use crate::core::state::Routes;
use crate::tui::component::Component;

pub struct RoutePage<'a> {
    pub address: &'a str,
    pub routes: &'a Routes,
    pub free_limit: u32,
}

impl<'a> RoutePage<'a> {
    pub fn new(address: &'a str, routes: &'a Routes, free_limit: u32) -> Self {
        Self {
            address,
            routes,
            free_limit,
        }
    }

    fn content(&self) -> (&'static str, Vec<String>) {
        if self.address == self.routes.sign_in {
            (
                "Sign in",
                vec![
                    "You need an account to chat with Charla.".to_string(),
                    "Sign in on the web, then restart Charla to continue.".to_string(),
                ],
            )
        } else if self.address == self.routes.pricing {
            (
                "Pricing",
                vec![
                    format!("Free: {} messages per month.", self.free_limit),
                    "Premium: unlimited messages and saved conversation links.".to_string(),
                    "Upgrade from your account page on the web.".to_string(),
                ],
            )
        } else {
            ("Not found", vec!["There is nothing at this address.".to_string()])
        }
    }
}

impl<'a> Component for RoutePage<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let (title, body) = self.content();

        let mut lines = vec![
            Line::from(Span::styled(
                self.address.to_string(),
                Style::default().fg(Color::DarkGray),
            )),
            Line::default(),
        ];
        lines.extend(body.into_iter().map(Line::from));
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Esc to go back",
            Style::default().add_modifier(Modifier::ITALIC),
        )));

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(format!(" {title} "))
            .padding(Padding::uniform(1));
        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block),
            area,
        );
    }
}
