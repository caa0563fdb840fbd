//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates keyboard events into `core::Action` values and executes the
//! `Effect`s that `update()` returns.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Background work
//!
//! Quota checks, assistant replies, conversation loads and the redirect timer
//! run on tokio tasks. Each reports back by sending an `Action` over an
//! `std::sync::mpsc` channel that the loop drains between frames. Conversation
//! snapshots arrive through the backend's `watch` subscription.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (ticker visible, toasts on screen, reply pending): draws every ~120ms.
//! - **Idle**: sleeps up to 500ms, only redraws on events or background actions.

mod component;
pub mod components;
mod event;
mod ui;

use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::task::AbortHandle;

use crate::core::action::{self, Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::quota::QuotaGate;
use crate::core::redirect::{RedirectEffect, TimerId};
use crate::core::state::{App, ConversationState, MountId};
use crate::core::view::{Header, compose, missing_key_warning};
use crate::services::{
    ConversationBackend, ConversationEvents, ConversationIndex, Navigation, Navigator,
    ProfileService, Router,
};
use crate::tui::component::EventHandler;
use crate::tui::components::{
    ConversationListEvent, ConversationListState, InputBox, InputEvent, LimitDialog,
    LimitDialogEvent, MessageListState, Toasts,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
    /// Conversation list overlay (None = hidden)
    pub conversation_list: Option<ConversationListState>,
    pub toasts: Toasts,
    pub ticker_symbols: Vec<String>,
}

impl TuiState {
    pub fn new(ticker_symbols: Vec<String>) -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(),
            conversation_list: None,
            toasts: Toasts::new(),
            ticker_symbols,
        }
    }
}

/// The collaborators the chat view talks to.
pub struct Services {
    pub profile: Arc<dyn ProfileService>,
    pub conversations: Arc<dyn ConversationBackend>,
    pub index: Arc<ConversationIndex>,
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste
        );
    }
}

/// Single-slot delayed redirect. Scheduling replaces any pending timer;
/// dropping the slot aborts it.
#[derive(Default)]
struct RedirectTimer {
    pending: Option<(TimerId, AbortHandle)>,
}

impl RedirectTimer {
    fn schedule(&mut self, timer: TimerId, delay: Duration, tx: mpsc::Sender<Action>) {
        self.abort();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(Action::RedirectTimerFired(timer)).is_err() {
                warn!("Failed to deliver redirect timer {:?}: receiver dropped", timer);
            }
        });
        self.pending = Some((timer, handle.abort_handle()));
    }

    fn cancel(&mut self, timer: TimerId) {
        if self.pending.as_ref().is_some_and(|(id, _)| *id == timer) {
            self.abort();
        }
    }

    fn abort(&mut self) {
        if let Some((id, handle)) = self.pending.take() {
            debug!("Redirect timer {:?} aborted", id);
            handle.abort();
        }
    }
}

impl Drop for RedirectTimer {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Owns the app and everything needed to carry out its effects.
struct Driver {
    app: App,
    tui: TuiState,
    router: Router,
    events: ConversationEvents,
    services: Services,
    redirect_timer: RedirectTimer,
    /// Latest conversation load; a newer load aborts it.
    load_task: Option<AbortHandle>,
    tx: mpsc::Sender<Action>,
    should_quit: bool,
}

impl Driver {
    fn dispatch(&mut self, action: Action) {
        debug!("Dispatch: {:?}", action);
        for effect in update(&mut self.app, action) {
            self.execute(effect);
        }
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::CheckQuota { text, mount } => {
                spawn_quota_check(self.app.quota, self.services.profile.clone(), text, mount, self.tx.clone());
            }
            Effect::SendMessage { text, mount } => {
                spawn_send(self.services.conversations.clone(), text, mount, self.tx.clone());
            }
            Effect::RestoreInput(text) => self.tui.input_box.restore(text),
            Effect::Navigate(navigation) => self.navigate(navigation),
            Effect::LoadConversation(id) => {
                self.tui.message_list = MessageListState::new();
                if let Some(previous) = self.load_task.take() {
                    previous.abort();
                }
                self.load_task = Some(spawn_open(
                    self.services.conversations.clone(),
                    id,
                    self.app.view.mount,
                    self.tx.clone(),
                ));
            }
            Effect::Redirect(RedirectEffect::ScheduleRedirect { timer, delay, path }) => {
                info!("Redirect to {} scheduled in {:?}", path, delay);
                self.redirect_timer.schedule(timer, delay, self.tx.clone());
            }
            Effect::Redirect(RedirectEffect::CancelTimer(timer)) => self.redirect_timer.cancel(timer),
            Effect::Redirect(RedirectEffect::RefreshConversationList) => self.refetch_conversations(),
            Effect::Redirect(RedirectEffect::ReplaceAddress(path)) => {
                self.navigate(Navigation::Replace(path));
            }
            Effect::Quit => self.should_quit = true,
        }
    }

    fn navigate(&mut self, navigation: Navigation) {
        self.router.apply(&navigation);
        let address = self.router.current().to_string();
        self.dispatch(Action::AddressChanged(address));
    }

    fn refetch_conversations(&mut self) {
        self.events.refetch();
        if let Some(list) = self.tui.conversation_list.as_mut() {
            list.refresh(self.services.index.entries());
        }
    }

    fn handle_event(&mut self, event: TuiEvent) {
        if matches!(event, TuiEvent::Resize) {
            return;
        }

        // Ctrl+C always quits
        if matches!(event, TuiEvent::ForceQuit) {
            self.dispatch(Action::Quit);
            return;
        }

        // Conversation list takes all input while open
        if let Some(list) = self.tui.conversation_list.as_mut() {
            if let Some(list_event) = list.handle_event(&event) {
                self.tui.conversation_list = None;
                match list_event {
                    ConversationListEvent::Open(id) => self.dispatch(Action::OpenConversation(id)),
                    ConversationListEvent::NewChat => self.dispatch(Action::NewChat),
                    ConversationListEvent::Dismiss => {}
                }
            }
            return;
        }

        match event {
            TuiEvent::OpenConversationList => {
                self.events.refetch();
                self.tui.conversation_list = Some(ConversationListState::new(self.services.index.entries()));
                return;
            }
            TuiEvent::NewChat => {
                self.dispatch(Action::NewChat);
                return;
            }
            _ => {}
        }

        // Route pages only know how to go back
        if !self.app.routes.is_chat_view(&self.app.address) {
            if matches!(event, TuiEvent::Escape) {
                self.dispatch(Action::NavigateBack);
            }
            return;
        }

        // Limit dialog is modal
        if self.app.view.limit_dialog_visible {
            match LimitDialog::handle_event(&event) {
                Some(LimitDialogEvent::Dismiss) => self.dispatch(Action::DismissLimitDialog),
                Some(LimitDialogEvent::Upgrade) => self.dispatch(Action::UpgradeFromLimitDialog),
                None => {}
            }
            return;
        }

        let scroll = match event {
            TuiEvent::CursorUp => Some(TuiEvent::ScrollUp),
            TuiEvent::CursorDown => Some(TuiEvent::ScrollDown),
            TuiEvent::ScrollUp
            | TuiEvent::ScrollDown
            | TuiEvent::ScrollPageUp
            | TuiEvent::ScrollPageDown
            | TuiEvent::ScrollToBottom => Some(event.clone()),
            _ => None,
        };
        if let Some(scroll) = scroll {
            self.tui.message_list.handle_event(&scroll);
            return;
        }

        if let Some(InputEvent::Submit(text)) = self.tui.input_box.handle_event(&event) {
            self.dispatch(Action::Submit(text));
        }
    }

    /// Forward a new conversation snapshot, if the backend published one.
    fn poll_conversation(&mut self, rx: &mut watch::Receiver<ConversationState>) -> bool {
        match rx.has_changed() {
            Ok(true) => {
                let snapshot = rx.borrow_and_update().clone();
                self.dispatch(Action::ConversationChanged(snapshot));
                true
            }
            Ok(false) => false,
            Err(_) => {
                warn!("Conversation subscription closed");
                false
            }
        }
    }
}

pub fn run(config: ResolvedConfig, address: String, services: Services) -> std::io::Result<()> {
    let app = App::from_config(address.clone(), services.profile.snapshot(), &config);
    let mut tui = TuiState::new(config.ticker_symbols.clone());

    let started = Instant::now();
    for key in &app.missing_keys {
        warn!("Missing configuration key: {}", key);
        tui.toasts.push(missing_key_warning(key), started);
    }

    let mut events = ConversationEvents::new();
    events.subscribe(services.index.clone());
    let mut conversation_rx = services.conversations.subscribe();

    let (tx, rx) = mpsc::channel();
    let mut driver = Driver {
        app,
        tui,
        router: Router::new(address),
        events,
        services,
        redirect_timer: RedirectTimer::default(),
        load_task: None,
        tx,
        should_quit: false,
    };

    for effect in action::mount(&mut driver.app) {
        driver.execute(effect);
    }

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();
    let mut needs_redraw = true;

    loop {
        let now = Instant::now();
        if driver.tui.toasts.prune(now) {
            needs_redraw = true;
        }

        let ticker_visible = driver.app.routes.is_chat_view(&driver.app.address)
            && compose(&driver.app.conversation, &driver.app.missing_keys).header == Header::TickerTape;
        let animating = ticker_visible || !driver.tui.toasts.is_empty() || driver.app.view.awaiting_reply;
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let ticker_offset = (started.elapsed().as_secs_f32() * 8.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &driver.app, &mut driver.tui, ticker_offset))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            Duration::from_millis(120)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }
        for event in first_event.into_iter().chain(std::iter::from_fn(poll_event_immediate)) {
            driver.handle_event(event);
            if driver.should_quit {
                break;
            }
        }
        if driver.should_quit {
            break;
        }

        if driver.poll_conversation(&mut conversation_rx) {
            needs_redraw = true;
        }

        // Handle background task actions
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            driver.dispatch(action);
        }
        if driver.should_quit {
            break;
        }
    }

    info!("Shutting down at {}", driver.router.current());
    ratatui::restore();
    Ok(())
}

fn spawn_quota_check(
    gate: QuotaGate,
    profile: Arc<dyn ProfileService>,
    text: String,
    mount: MountId,
    tx: mpsc::Sender<Action>,
) {
    tokio::spawn(async move {
        let decision = gate.check(profile.as_ref()).await;
        let profile = profile.snapshot();
        if tx
            .send(Action::QuotaChecked {
                text,
                decision,
                profile,
                mount,
            })
            .is_err()
        {
            warn!("Failed to send quota decision: receiver dropped");
        }
    });
}

fn spawn_send(conversations: Arc<dyn ConversationBackend>, text: String, mount: MountId, tx: mpsc::Sender<Action>) {
    info!("Sending message ({} chars)", text.len());
    tokio::spawn(async move {
        let action = match conversations.send(text).await {
            Ok(()) => Action::ReplyFinished { mount },
            Err(e) => {
                warn!("Assistant reply failed: {}", e);
                Action::ReplyFailed {
                    reason: e.to_string(),
                    mount,
                }
            }
        };
        if tx.send(action).is_err() {
            warn!("Failed to send reply status: receiver dropped");
        }
    });
}

fn spawn_open(
    conversations: Arc<dyn ConversationBackend>,
    id: Option<String>,
    mount: MountId,
    tx: mpsc::Sender<Action>,
) -> AbortHandle {
    tokio::spawn(async move {
        if let Err(e) = conversations.open(id.as_deref()).await {
            warn!("Failed to open conversation {:?}: {}", id, e);
            let action = Action::ConversationLoadFailed {
                reason: e.to_string(),
                mount,
            };
            if tx.send(action).is_err() {
                warn!("Failed to send load failure: receiver dropped");
            }
        }
    })
    .abort_handle()
}
