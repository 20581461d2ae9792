//! Submission orchestration for both conversation surfaces.
//!
//! [`ChatSession`] is a pure state machine in the style of a run-to-completion
//! event handler: user actions, timer expiries, inbound signals and backend
//! completions are each applied in one call, and every side effect outside
//! the session goes through [`HostOps`]. Network calls are issued with a
//! [`RequestId`]; the host reports completion through
//! [`ChatSession::on_backend_completed`], and ids the session no longer
//! tracks are dropped.

mod direct;
mod forum;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use session_store::{SessionStore, Theme};
use tracing::{debug, info, warn};
use webface_api::{ApiError, BackendRequest, BackendResponse, Endpoint};

use crate::clock::Clock;
use crate::config::Mode;
use crate::delivery::DeliveryQueue;
use crate::glitch::{GlitchEffect, GlitchScheduler, FONT_DURATION, STRETCH_DURATION, TICK_PERIOD};
use crate::message_log::{LogEvent, MessageId, MessageKind, MessageLog, SubscriptionId};
use crate::overlay::{OverlayController, OverlaySession};
use crate::random::RandomSource;
use crate::signal::InboundSignal;
use crate::timers::{TimerEvent, TimerQueue};

pub type RequestId = u64;

/// Prefix of the inline message that reports a failed request.
pub const ERROR_PREFIX: &str = "Ошибка: ";

/// Side effects the session cannot perform itself.
pub trait HostOps {
    /// Starts `request`; its result must come back through
    /// [`ChatSession::on_backend_completed`] with the same id.
    fn send(&mut self, request_id: RequestId, request: BackendRequest) -> Result<(), String>;
    fn open_page(&mut self, overlay: &OverlaySession);
    fn close_page(&mut self);
    fn restore_focus(&mut self);
    fn request_render(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Sending { request_id: RequestId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Delivered,
    Failed,
}

/// What [`ChatSession::submit`] did with the current input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing happened.
    Empty,
    /// A direct-mode request is still in flight.
    Busy,
    Sent(RequestId),
    /// The host refused the request; an inline error was appended.
    DispatchFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingRequest {
    Chat { text: String },
    ClearHistory,
    AfterRead,
    ForumStart,
    ForumChat,
}

impl PendingRequest {
    fn endpoint(&self) -> Endpoint {
        match self {
            Self::Chat { .. } => Endpoint::Chat,
            Self::ClearHistory => Endpoint::ChatClear,
            Self::AfterRead => Endpoint::AfterRead,
            Self::ForumStart => Endpoint::ForumStart,
            Self::ForumChat => Endpoint::ForumChat,
        }
    }

    fn label(&self) -> &'static str {
        self.endpoint().label()
    }
}

/// Everything a renderer needs besides the message log itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceSnapshot {
    pub mode: Mode,
    pub input_enabled: bool,
    pub busy: bool,
    pub stretch_active: bool,
    pub font_target: Option<MessageId>,
    pub overlay: Option<OverlaySession>,
    pub theme: Theme,
}

pub struct ChatSession {
    mode: Mode,
    store: SessionStore,
    log: MessageLog,
    overlay: OverlayController,
    glitch: GlitchScheduler,
    delivery: DeliveryQueue,
    timers: TimerQueue<TimerEvent>,
    clock: Arc<dyn Clock>,
    random: Box<dyn RandomSource>,
    submission: SubmissionState,
    last_outcome: Option<SubmissionOutcome>,
    input: String,
    pending: HashMap<RequestId, PendingRequest>,
    next_request_id: RequestId,
    started: bool,
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("mode", &self.mode)
            .field("session_id", &self.store.id())
            .field("submission", &self.submission)
            .field("messages", &self.log.len())
            .field("pending", &self.pending.len())
            .field("timers", &self.timers.len())
            .finish()
    }
}

impl ChatSession {
    /// The glitch clock starts now.
    pub fn new(
        mode: Mode,
        store: SessionStore,
        clock: Arc<dyn Clock>,
        random: Box<dyn RandomSource>,
    ) -> Self {
        let start = clock.now();
        Self {
            mode,
            store,
            log: MessageLog::new(Arc::clone(&clock)),
            overlay: OverlayController::new(),
            glitch: GlitchScheduler::new(start),
            delivery: DeliveryQueue::new(),
            timers: TimerQueue::new(),
            clock,
            random,
            submission: SubmissionState::Idle,
            last_outcome: None,
            input: String::new(),
            pending: HashMap::new(),
            next_request_id: 1,
            started: false,
        }
    }

    /// Arms the glitch tick (direct mode) or requests the opening forum
    /// batch (forum mode). Only the first call has any effect.
    pub fn start(&mut self, host: &mut dyn HostOps) {
        if self.started {
            return;
        }
        self.started = true;
        info!(mode = self.mode.as_str(), session_id = %self.store.id(), "chat session started");

        match self.mode {
            Mode::Direct => {
                let first_tick = self.glitch.start_time() + TICK_PERIOD;
                self.timers.schedule_at(first_tick, TimerEvent::GlitchTick);
            }
            Mode::Forum => self.start_forum(host),
        }
        host.request_render();
    }

    pub fn on_input_replace(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Submits the current input according to the mode.
    pub fn submit(&mut self, host: &mut dyn HostOps) -> SubmitOutcome {
        match self.mode {
            Mode::Direct => self.submit_direct(host),
            Mode::Forum => self.submit_forum(host),
        }
    }

    /// Replaces the input with `text` and submits it.
    pub fn submit_text(&mut self, text: &str, host: &mut dyn HostOps) -> SubmitOutcome {
        self.on_input_replace(text);
        self.submit(host)
    }

    /// Applies the result of a request issued through [`HostOps::send`].
    pub fn on_backend_completed(
        &mut self,
        request_id: RequestId,
        result: Result<BackendResponse, ApiError>,
        host: &mut dyn HostOps,
    ) {
        let Some(pending) = self.pending.remove(&request_id) else {
            debug!(request_id, "ignoring completion for unknown request");
            return;
        };
        let endpoint = pending.label();
        debug!(request_id, endpoint, ok = result.is_ok(), "backend request completed");

        match pending {
            PendingRequest::Chat { text } => {
                self.on_chat_completed(request_id, &text, result, host)
            }
            PendingRequest::AfterRead => self.on_after_read_completed(result),
            PendingRequest::ClearHistory => match result {
                Ok(_) => debug!("backend history cleared"),
                Err(error) => {
                    warn!(%error, "backend history clear failed; local log stays cleared")
                }
            },
            PendingRequest::ForumStart | PendingRequest::ForumChat => {
                self.on_forum_completed(endpoint, result)
            }
        }
        host.request_render();
    }

    /// Fires every timer that is due at the clock's current time. Returns
    /// how many fired.
    pub fn advance(&mut self, host: &mut dyn HostOps) -> usize {
        let now = self.clock.now();
        let mut fired = 0usize;
        while let Some((due, event)) = self.timers.pop_due(now) {
            self.on_timer(due, now, event);
            fired += 1;
        }
        if fired > 0 {
            host.request_render();
        }
        fired
    }

    /// A late tick is evaluated once at `now`; the slots it missed are
    /// dropped and the next tick stays on the original period grid.
    fn on_timer(&mut self, due: Instant, now: Instant, event: TimerEvent) {
        match event {
            TimerEvent::GlitchTick => {
                match self.glitch.tick(now, &mut self.log, self.random.as_mut()) {
                    Some(GlitchEffect::Stretch { .. }) => {
                        self.timers
                            .schedule_at(now + STRETCH_DURATION, TimerEvent::StretchExpired);
                    }
                    Some(GlitchEffect::Font { target, .. }) => {
                        self.timers
                            .schedule_at(now + FONT_DURATION, TimerEvent::FontExpired(target));
                    }
                    None => {}
                }
                self.timers
                    .schedule_at(next_tick_after(due, now), TimerEvent::GlitchTick);
            }
            TimerEvent::StretchExpired => self.glitch.stretch_expired(),
            TimerEvent::FontExpired(target) => self.glitch.font_expired(target),
            TimerEvent::Deliver(item) => {
                self.delivery.deliver(&item, &mut self.log);
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Time until the next timer is due; zero if one is already overdue.
    pub fn time_until_next_timer(&self) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_duration_since(self.clock.now()))
    }

    pub fn on_signal(&mut self, signal: InboundSignal, host: &mut dyn HostOps) {
        match signal {
            InboundSignal::Close => {
                if !self.overlay.is_visible() {
                    debug!("close signal ignored: no overlay visible");
                    return;
                }
                self.close_overlay(host);
            }
            InboundSignal::Other(payload) => {
                debug!(%payload, "ignoring unrecognised inbound signal");
            }
        }
    }

    /// Clears the local log at once and tells the backend afterwards. A
    /// failed backend call does not bring the history back. Forum mode keeps
    /// no server-side history, so only the local log is cleared there.
    pub fn clear_history(&mut self, host: &mut dyn HostOps) {
        self.log.clear();
        info!("history cleared locally");
        if self.mode == Mode::Forum {
            host.request_render();
            return;
        }
        let request = BackendRequest::ClearHistory {
            session_id: self.store.id().to_string(),
        };
        if let Err(error) = self.issue(request, PendingRequest::ClearHistory, host) {
            warn!(%error, "history clear could not be sent");
        }
        host.request_render();
    }

    pub fn toggle_theme(&mut self, host: &mut dyn HostOps) -> Theme {
        let theme = match self.store.toggle_theme() {
            Ok(theme) => theme,
            Err(error) => {
                warn!(%error, "theme preference not persisted");
                self.store.theme()
            }
        };
        host.request_render();
        theme
    }

    pub fn surface(&self) -> SurfaceSnapshot {
        let busy = matches!(self.submission, SubmissionState::Sending { .. });
        SurfaceSnapshot {
            mode: self.mode,
            input_enabled: !busy,
            busy,
            stretch_active: self.glitch.stretch_active(),
            font_target: self.glitch.font_target(),
            overlay: self.overlay.current().cloned(),
            theme: self.store.theme(),
        }
    }

    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&LogEvent<'_>) + Send + 'static,
    ) -> SubscriptionId {
        self.log.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.log.unsubscribe(id)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn session_id(&self) -> &str {
        self.store.id()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn submission_state(&self) -> SubmissionState {
        self.submission
    }

    pub fn last_outcome(&self) -> Option<SubmissionOutcome> {
        self.last_outcome
    }

    pub fn overlay(&self) -> Option<&OverlaySession> {
        self.overlay.current()
    }

    pub fn glitch(&self) -> &GlitchScheduler {
        &self.glitch
    }

    pub fn delivery(&self) -> &DeliveryQueue {
        &self.delivery
    }

    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    fn issue(
        &mut self,
        request: BackendRequest,
        pending: PendingRequest,
        host: &mut dyn HostOps,
    ) -> Result<RequestId, String> {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        let label = pending.label();
        self.pending.insert(request_id, pending);

        match host.send(request_id, request) {
            Ok(()) => {
                debug!(request_id, endpoint = label, "backend request issued");
                Ok(request_id)
            }
            Err(error) => {
                self.pending.remove(&request_id);
                Err(error)
            }
        }
    }

    /// Adopts a server-issued session id. Persistence failures keep the new
    /// id in memory.
    fn apply_rotation(&mut self, candidate: Option<&str>) {
        if let Err(error) = self.store.rotate(candidate) {
            warn!(%error, "rotated session id was not persisted");
        }
    }

    fn append_error(&mut self, error: &ApiError) -> MessageId {
        warn!(%error, "backend request failed");
        self.log
            .append(
                format!("{ERROR_PREFIX}{}", error.user_message()),
                MessageKind::Assistant,
                None,
            )
    }
}

fn next_tick_after(due: Instant, now: Instant) -> Instant {
    let behind = now.saturating_duration_since(due).as_nanos();
    let skipped = u32::try_from(behind / TICK_PERIOD.as_nanos()).unwrap_or(u32::MAX);
    due + TICK_PERIOD * skipped.saturating_add(1)
}

fn unexpected_response(endpoint: &'static str, response: &BackendResponse) -> ApiError {
    ApiError::MalformedResponse {
        endpoint,
        message: format!("unexpected response shape: {}", response.kind()),
    }
}
