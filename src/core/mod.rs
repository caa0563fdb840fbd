//! # Core Application Logic
//!
//! The chat view's business logic. It knows nothing about any specific UI
//! technology and performs no I/O; the services it needs are reached through
//! the traits in [`crate::services`].
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    └───────────┬─────────────┘
//!                                │ Effects
//!            ┌───────────────────┴───────────────────┐
//!            ▼                                       ▼
//!     ┌────────────┐                          ┌────────────┐
//!     │    TUI     │                          │  Services  │
//!     │  Adapter   │ ───────────────────────▶ │  (traits)  │
//!     │ (ratatui)  │                          │            │
//!     └────────────┘                          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all chat view state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`quota`]: The per-submission quota gate
//! - [`redirect`]: The new-chat redirect state machine
//! - [`view`]: Which header and body the chat view shows
//! - [`config`]: `~/.charla/config.toml` loading and resolution

pub mod action;
pub mod config;
pub mod quota;
pub mod redirect;
pub mod state;
pub mod view;
