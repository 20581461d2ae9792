use tracing::{debug, info};

/// A secondary document shown over the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlaySession {
    pub url: String,
    /// Empty when the directive carried no version.
    pub version: String,
    pub visible: bool,
}

/// Holds at most one overlay. A new `show` replaces the current one.
#[derive(Debug, Default)]
pub struct OverlayController {
    current: Option<OverlaySession>,
}

impl OverlayController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, url: impl Into<String>, version: impl Into<String>) -> &OverlaySession {
        let session = OverlaySession {
            url: url.into(),
            version: version.into(),
            visible: true,
        };
        if let Some(previous) = &self.current {
            debug!(replaced = %previous.url, "overlay replaced");
        }
        info!(url = %session.url, version = %session.version, "overlay opened");
        self.current.insert(session)
    }

    /// Hides the overlay and hands back its version, clearing it.
    ///
    /// Returns `None` when nothing is visible, so a stray close signal never
    /// leads to an after-read call.
    pub fn request_close(&mut self) -> Option<String> {
        let session = self.current.take()?;
        info!(url = %session.url, version = %session.version, "overlay closed");
        Some(session.version)
    }

    pub fn current(&self) -> Option<&OverlaySession> {
        self.current.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.current.as_ref().is_some_and(|session| session.visible)
    }
}
