use tracing::info;
use webface_api::{ApiError, BackendRequest, BackendResponse};

use super::{unexpected_response, ChatSession, HostOps, PendingRequest, SubmitOutcome};
use crate::message_log::{MessageKind, USER_ROLE};

impl ChatSession {
    pub(super) fn start_forum(&mut self, host: &mut dyn HostOps) {
        let issued = self.issue(BackendRequest::ForumStart, PendingRequest::ForumStart, host);
        if let Err(error) = issued {
            self.append_error(&ApiError::Dispatch(error));
        }
    }

    /// Forum submissions are not guarded: several may be in flight, and
    /// their batches interleave.
    pub(super) fn submit_forum(&mut self, host: &mut dyn HostOps) -> SubmitOutcome {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return SubmitOutcome::Empty;
        }

        self.log
            .append(text.as_str(), MessageKind::User, Some(USER_ROLE));
        self.input.clear();

        let outcome = match self.issue(
            BackendRequest::ForumChat { message: text },
            PendingRequest::ForumChat,
            host,
        ) {
            Ok(request_id) => {
                info!(request_id, "forum message sent");
                SubmitOutcome::Sent(request_id)
            }
            Err(error) => {
                self.append_error(&ApiError::Dispatch(error));
                SubmitOutcome::DispatchFailed
            }
        };
        host.request_render();
        outcome
    }

    pub(super) fn on_forum_completed(
        &mut self,
        endpoint: &'static str,
        result: Result<BackendResponse, ApiError>,
    ) {
        match result {
            Ok(BackendResponse::Forum(batch)) => {
                let now = self.clock.now();
                self.delivery.enqueue_batch(
                    now,
                    &batch.messages,
                    self.random.as_mut(),
                    &mut self.timers,
                );
            }
            Ok(other) => {
                self.append_error(&unexpected_response(endpoint, &other));
            }
            Err(error) => {
                self.append_error(&error);
            }
        }
    }
}
