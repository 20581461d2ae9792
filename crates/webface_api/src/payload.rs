use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// JSON body for `POST /chat` and `POST /forum/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response of `POST /chat`. Only `reply` is required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// A request to show a secondary document in the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDirective {
    pub url: String,
    pub version: String,
}

impl ChatReply {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            session_id: None,
            page: None,
            version: None,
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_page(mut self, page: impl Into<String>, version: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self.version = Some(version.into());
        self
    }

    /// Server-issued session id, ignoring empty values.
    pub fn server_session_id(&self) -> Option<&str> {
        non_empty(&self.session_id)
    }

    /// Overlay directive when `page` is present and non-empty. A missing
    /// version becomes the empty string.
    pub fn page_directive(&self) -> Option<PageDirective> {
        let url = non_empty(&self.page)?;
        Some(PageDirective {
            url: url.to_owned(),
            version: non_empty(&self.version).unwrap_or_default().to_owned(),
        })
    }
}

/// Response of `GET /after_read`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AfterReadReply {
    pub reply: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl AfterReadReply {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            session_id: None,
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn server_session_id(&self) -> Option<&str> {
        non_empty(&self.session_id)
    }
}

/// One agent line inside a forum batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumMessage {
    pub name: String,
    pub text: String,
}

impl ForumMessage {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Response of `GET /forum/start` and `POST /forum/chat`, in delivery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumBatch {
    pub messages: Vec<ForumMessage>,
}

/// Decode a success body, mapping any shape mismatch to
/// [`ApiError::MalformedResponse`].
pub fn decode<T>(endpoint: &'static str, body: &[u8]) -> Result<T, ApiError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_slice(body).map_err(|error| ApiError::MalformedResponse {
        endpoint,
        message: error.to_string(),
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}
