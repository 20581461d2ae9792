#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use session_store::{MemoryStore, SessionStore, SESSION_ID_KEY};
use webface::{ChatSession, HostOps, ManualClock, Mode, OverlaySession, RequestId, ScriptedRandom};
use webface_api::{ApiError, BackendRequest, BackendResponse};

#[derive(Default)]
pub struct HostSpy {
    pub sent: Vec<(RequestId, BackendRequest)>,
    pub opened_pages: Vec<OverlaySession>,
    pub closed_pages: usize,
    pub focus_restores: usize,
    pub render_requests: usize,
    pub refuse_sends: Option<String>,
}

impl HostSpy {
    pub fn last_sent(&self) -> &(RequestId, BackendRequest) {
        self.sent.last().expect("a request was sent")
    }

    pub fn last_request_id(&self) -> RequestId {
        self.last_sent().0
    }
}

impl HostOps for HostSpy {
    fn send(&mut self, request_id: RequestId, request: BackendRequest) -> Result<(), String> {
        if let Some(error) = &self.refuse_sends {
            return Err(error.clone());
        }
        self.sent.push((request_id, request));
        Ok(())
    }

    fn open_page(&mut self, overlay: &OverlaySession) {
        self.opened_pages.push(overlay.clone());
    }

    fn close_page(&mut self) {
        self.closed_pages += 1;
    }

    fn restore_focus(&mut self) {
        self.focus_restores += 1;
    }

    fn request_render(&mut self) {
        self.render_requests += 1;
    }
}

pub struct Harness {
    pub session: ChatSession,
    pub host: HostSpy,
    pub clock: ManualClock,
}

impl Harness {
    pub fn direct(session_id: &str, random: ScriptedRandom) -> Self {
        Self::new(Mode::Direct, session_id, random)
    }

    pub fn forum(random: ScriptedRandom) -> Self {
        Self::new(Mode::Forum, "forum-session", random)
    }

    fn new(mode: Mode, session_id: &str, random: ScriptedRandom) -> Self {
        let clock = ManualClock::new();
        let store = SessionStore::ensure(Box::new(
            MemoryStore::new().with_value(SESSION_ID_KEY, session_id),
        ));
        let mut session = ChatSession::new(mode, store, Arc::new(clock.clone()), Box::new(random));
        let mut host = HostSpy::default();
        session.start(&mut host);
        Self {
            session,
            host,
            clock,
        }
    }

    /// Moves the clock and fires whatever became due.
    pub fn advance(&mut self, by: Duration) -> usize {
        self.clock.advance(by);
        self.session.advance(&mut self.host)
    }

    pub fn submit(&mut self, text: &str) -> webface::SubmitOutcome {
        self.session.submit_text(text, &mut self.host)
    }

    pub fn complete(&mut self, request_id: RequestId, result: Result<BackendResponse, ApiError>) {
        self.session
            .on_backend_completed(request_id, result, &mut self.host);
    }

    pub fn complete_last(&mut self, result: Result<BackendResponse, ApiError>) {
        let request_id = self.host.last_request_id();
        self.complete(request_id, result);
    }

    pub fn texts(&self) -> Vec<String> {
        self.session
            .log()
            .messages()
            .iter()
            .map(|message| message.text.clone())
            .collect()
    }

    pub fn roles(&self) -> Vec<String> {
        self.session
            .log()
            .messages()
            .iter()
            .map(|message| message.role.clone())
            .collect()
    }
}
