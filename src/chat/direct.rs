use tracing::{debug, info};
use webface_api::{ApiError, BackendRequest, BackendResponse};

use super::{
    unexpected_response, ChatSession, HostOps, PendingRequest, RequestId, SubmissionOutcome,
    SubmissionState, SubmitOutcome,
};
use crate::glitch::{is_glitch_question, EASTER_EGG_LINE};
use crate::message_log::MessageKind;

impl ChatSession {
    pub(super) fn submit_direct(&mut self, host: &mut dyn HostOps) -> SubmitOutcome {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return SubmitOutcome::Empty;
        }
        if let SubmissionState::Sending { request_id } = self.submission {
            debug!(request_id, "submission ignored: previous message still sending");
            return SubmitOutcome::Busy;
        }

        self.log.append(text.as_str(), MessageKind::User, None);
        let request = BackendRequest::Chat {
            session_id: self.store.id().to_string(),
            message: text.clone(),
        };

        match self.issue(request, PendingRequest::Chat { text }, host) {
            Ok(request_id) => {
                info!(request_id, "chat message sent");
                self.submission = SubmissionState::Sending { request_id };
                host.request_render();
                SubmitOutcome::Sent(request_id)
            }
            Err(error) => {
                self.append_error(&ApiError::Dispatch(error));
                self.finish_submission(SubmissionOutcome::Failed, host);
                SubmitOutcome::DispatchFailed
            }
        }
    }

    pub(super) fn on_chat_completed(
        &mut self,
        request_id: RequestId,
        text: &str,
        result: Result<BackendResponse, ApiError>,
        host: &mut dyn HostOps,
    ) {
        let outcome = match result {
            Ok(BackendResponse::Chat(reply)) => {
                self.apply_rotation(reply.server_session_id());
                self.log
                    .append(reply.reply.as_str(), MessageKind::Assistant, None);

                if let Some(page) = reply.page_directive() {
                    let overlay = self.overlay.show(page.url, page.version).clone();
                    host.open_page(&overlay);
                }

                if is_glitch_question(text) && self.glitch.recently_glitched(self.clock.now()) {
                    debug!("glitch question answered in-universe");
                    self.log
                        .append(EASTER_EGG_LINE, MessageKind::Assistant, None);
                }
                SubmissionOutcome::Delivered
            }
            Ok(other) => {
                self.append_error(&unexpected_response("/chat", &other));
                SubmissionOutcome::Failed
            }
            Err(error) => {
                self.append_error(&error);
                SubmissionOutcome::Failed
            }
        };

        debug!(request_id, ?outcome, "chat submission resolved");
        self.finish_submission(outcome, host);
    }

    /// Runs after every direct submission, whichever way it ended.
    fn finish_submission(&mut self, outcome: SubmissionOutcome, host: &mut dyn HostOps) {
        self.last_outcome = Some(outcome);
        self.submission = SubmissionState::Idle;
        self.input.clear();
        host.restore_focus();
        host.request_render();
    }

    /// Hides the overlay and asks the backend for its follow-up line.
    pub(super) fn close_overlay(&mut self, host: &mut dyn HostOps) {
        let Some(version) = self.overlay.request_close() else {
            return;
        };
        host.close_page();

        let request = BackendRequest::AfterRead {
            version,
            session_id: self.store.id().to_string(),
        };
        if let Err(error) = self.issue(request, PendingRequest::AfterRead, host) {
            self.append_error(&ApiError::Dispatch(error));
        }
        host.request_render();
    }

    pub(super) fn on_after_read_completed(&mut self, result: Result<BackendResponse, ApiError>) {
        match result {
            Ok(BackendResponse::AfterRead(reply)) => {
                self.apply_rotation(reply.server_session_id());
                self.log
                    .append(reply.reply.as_str(), MessageKind::Assistant, None);
            }
            Ok(other) => {
                self.append_error(&unexpected_response("/after_read", &other));
            }
            Err(error) => {
                self.append_error(&error);
            }
        }
    }
}
