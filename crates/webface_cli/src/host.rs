use std::sync::mpsc::Sender;
use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::debug;
use webface::{HostOps, OverlaySession, RequestId};
use webface_api::{resolve_page_url, BackendRequest, WebfaceApiClient};

use crate::render::{write_line, write_prompt, SharedWriter};
use crate::runtime::LoopEvent;

/// Runs backend requests on a tokio runtime and reports each result back to
/// the event loop as [`LoopEvent::Completed`].
pub struct ApiHost {
    runtime: Handle,
    client: Arc<WebfaceApiClient>,
    events: Sender<LoopEvent>,
    out: SharedWriter,
}

impl ApiHost {
    pub fn new(
        runtime: Handle,
        client: WebfaceApiClient,
        events: Sender<LoopEvent>,
        out: SharedWriter,
    ) -> Self {
        Self {
            runtime,
            client: Arc::new(client),
            events,
            out,
        }
    }

    /// Absolute URL for a page directive, resolved against the backend base.
    pub fn page_url(&self, overlay: &OverlaySession) -> String {
        resolve_page_url(self.client.base_url(), &overlay.url)
    }
}

impl HostOps for ApiHost {
    fn send(&mut self, request_id: RequestId, request: BackendRequest) -> Result<(), String> {
        let client = Arc::clone(&self.client);
        let events = self.events.clone();
        self.runtime.spawn(async move {
            let result = client.execute(&request).await;
            if events
                .send(LoopEvent::Completed { request_id, result })
                .is_err()
            {
                debug!(request_id, "event loop gone; completion dropped");
            }
        });
        Ok(())
    }

    fn open_page(&mut self, overlay: &OverlaySession) {
        let url = self.page_url(overlay);
        let version = if overlay.version.is_empty() {
            String::new()
        } else {
            format!(" (version {})", overlay.version)
        };
        write_line(
            &self.out,
            &format!("[page] {url}{version}; type /close when you have read it"),
        );
    }

    fn close_page(&mut self) {
        write_line(&self.out, "[page closed]");
    }

    fn restore_focus(&mut self) {
        write_prompt(&self.out);
    }

    // Lines are written as they are produced; there is no frame to redraw.
    fn request_render(&mut self) {}
}
