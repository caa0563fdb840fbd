use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::core::state::App;
use crate::core::view::{Body, Header, compose};
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{
    Banner, ConversationList, EmptyScreen, LimitDialog, MessageList, RoutePage, Ticker, TitleBar,
    Usage,
};

/// Ticker strip: one line of symbols plus a bottom rule.
const TICKER_HEIGHT: u16 = 2;

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, ticker_offset: usize) {
    use Constraint::{Length, Min};

    let [title_area, main_area] = Layout::vertical([Length(1), Min(0)]).areas(frame.area());

    let usage = Usage::for_profile(&app.profile, app.quota.limit());
    TitleBar::new(
        app.address.clone(),
        app.profile.tier,
        usage,
        app.status_message.clone(),
    )
    .render(frame, title_area);

    let on_chat_view = app.routes.is_chat_view(&app.address);
    if on_chat_view {
        draw_chat_view(frame, main_area, app, tui, ticker_offset);
    } else {
        RoutePage::new(&app.address, &app.routes, app.quota.limit()).render(frame, main_area);
    }

    // Overlays, bottom to top. The limit dialog belongs to the chat view.
    if on_chat_view && app.view.limit_dialog_visible {
        LimitDialog::new(app.quota.limit()).render(frame, main_area);
    }
    if let Some(list) = tui.conversation_list.as_mut() {
        ConversationList::new(list, app.conversation.id.as_deref()).render(frame, main_area);
    }
    tui.toasts.render(frame, main_area);
}

fn draw_chat_view(frame: &mut Frame, area: Rect, app: &App, tui: &mut TuiState, ticker_offset: usize) {
    use Constraint::{Length, Min};

    let layout = compose(&app.conversation, &app.missing_keys);
    let header_height = match layout.header {
        Header::MissingKeyBanner(keys) => Banner::height(keys),
        Header::TickerTape => TICKER_HEIGHT,
    };

    tui.input_box.busy = app.view.is_busy();
    tui.input_box.scrolled_up = layout.body == Body::MessageList && !tui.message_list.is_at_bottom();
    let input_height = tui.input_box.calculate_height(area.width);

    let [header_area, body_area, input_area] =
        Layout::vertical([Length(header_height), Min(0), Length(input_height)]).areas(area);

    match layout.header {
        Header::MissingKeyBanner(keys) => Banner::new(keys).render(frame, header_area),
        Header::TickerTape => Ticker::new(&tui.ticker_symbols, ticker_offset).render(frame, header_area),
    }

    match layout.body {
        Body::MessageList => MessageList::new(
            &mut tui.message_list,
            &app.conversation.messages,
            app.view.awaiting_reply,
        )
        .render(frame, body_area),
        Body::EmptyScreen => EmptyScreen.render(frame, body_area),
    }

    tui.input_box.render(frame, input_area);
}
