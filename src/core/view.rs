//! # View Composer
//!
//! Decides which sections the chat view shows for a conversation snapshot.
//! The renderer always appends a scroll anchor after the body.

use crate::core::state::ConversationState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header<'a> {
    /// Warnings for unset configuration keys (may be empty).
    MissingKeyBanner(&'a [String]),
    /// Live market ticker strip.
    TickerTape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body {
    MessageList,
    EmptyScreen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewLayout<'a> {
    pub header: Header<'a>,
    pub body: Body,
}

pub fn compose<'a>(conversation: &ConversationState, missing_keys: &'a [String]) -> ViewLayout<'a> {
    if conversation.messages.is_empty() {
        ViewLayout {
            header: Header::TickerTape,
            body: Body::EmptyScreen,
        }
    } else {
        ViewLayout {
            header: Header::MissingKeyBanner(missing_keys),
            body: Body::MessageList,
        }
    }
}

/// Human-readable warning for one missing configuration key.
pub fn missing_key_warning(key: &str) -> String {
    format!("Missing {key} environment variable!")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::ChatMessage;

    #[test]
    fn test_empty_conversation_shows_ticker_and_onboarding() {
        let keys = vec!["OPENAI_API_KEY".to_string()];
        let layout = compose(&ConversationState::default(), &keys);
        assert_eq!(layout.header, Header::TickerTape);
        assert_eq!(layout.body, Body::EmptyScreen);
    }

    #[test]
    fn test_non_empty_conversation_shows_banner_and_list() {
        let keys = vec!["OPENAI_API_KEY".to_string()];
        let conversation = ConversationState {
            id: None,
            messages: vec![ChatMessage::user("hi")],
        };
        let layout = compose(&conversation, &keys);
        assert_eq!(layout.header, Header::MissingKeyBanner(&keys));
        assert_eq!(layout.body, Body::MessageList);
    }

    #[test]
    fn test_id_alone_does_not_change_branch() {
        let conversation = ConversationState {
            id: Some("abc".into()),
            messages: Vec::new(),
        };
        assert_eq!(compose(&conversation, &[]).body, Body::EmptyScreen);
    }

    #[test]
    fn test_missing_key_warning_names_key() {
        assert!(missing_key_warning("OPENAI_API_KEY").contains("OPENAI_API_KEY"));
    }
}
