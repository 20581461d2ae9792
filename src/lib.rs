//! Orchestration core of the webface chat client.
//!
//! The crate is host-agnostic: it never touches a terminal, a socket or a
//! wall-clock timer on its own. A front end owns the event loop and feeds
//! [`ChatSession`] four kinds of events:
//!
//! - user actions (`submit`, `clear_history`, `toggle_theme`)
//! - inbound signals from embedded surfaces ([`InboundSignal`])
//! - backend completions (`on_backend_completed`)
//! - the passage of time (`advance`, paced by `next_deadline`)
//!
//! Time and randomness are injected through [`Clock`] and [`RandomSource`],
//! so every scheduling decision can be replayed in tests with
//! [`ManualClock`] and [`ScriptedRandom`].
//!
//! # Modes
//! - [`Mode::Direct`]: one-to-one chat with session rotation, page overlays,
//!   glitch effects and the glitch easter egg.
//! - [`Mode::Forum`]: multi-agent batches delivered with staggered delays.

pub mod chat;
pub mod clock;
pub mod config;
pub mod delivery;
pub mod glitch;
pub mod logging;
pub mod message_log;
pub mod overlay;
pub mod random;
pub mod signal;
pub mod timers;

pub use crate::chat::{
    ChatSession, HostOps, RequestId, SubmissionOutcome, SubmissionState, SubmitOutcome,
    SurfaceSnapshot, ERROR_PREFIX,
};
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::config::{EnvConfig, Mode};
pub use crate::delivery::{agent_category, DeliveryItem, DeliveryQueue};
pub use crate::glitch::{GlitchEffect, GlitchScheduler};
pub use crate::message_log::{LogEvent, Message, MessageId, MessageKind, MessageLog, SubscriptionId};
pub use crate::overlay::{OverlayController, OverlaySession};
pub use crate::random::{RandomSource, ScriptedRandom, SeededRandom};
pub use crate::signal::InboundSignal;
pub use crate::timers::{TimerEvent, TimerQueue};
