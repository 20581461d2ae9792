use reqwest::Method;

use crate::payload::{AfterReadReply, ChatReply, ForumBatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Chat,
    ChatClear,
    AfterRead,
    ForumStart,
    ForumChat,
}

impl Endpoint {
    /// Path relative to the base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::ChatClear => "chat/clear",
            Self::AfterRead => "after_read",
            Self::ForumStart => "forum/start",
            Self::ForumChat => "forum/chat",
        }
    }

    /// Label used in logs and error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Chat => "/chat",
            Self::ChatClear => "/chat/clear",
            Self::AfterRead => "/after_read",
            Self::ForumStart => "/forum/start",
            Self::ForumChat => "/forum/chat",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Self::AfterRead | Self::ForumStart => Method::GET,
            Self::Chat | Self::ChatClear | Self::ForumChat => Method::POST,
        }
    }
}

/// One backend call, carrying every value it needs captured at issue time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendRequest {
    Chat { session_id: String, message: String },
    ClearHistory { session_id: String },
    AfterRead { version: String, session_id: String },
    ForumStart,
    ForumChat { message: String },
}

impl BackendRequest {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Chat { .. } => Endpoint::Chat,
            Self::ClearHistory { .. } => Endpoint::ChatClear,
            Self::AfterRead { .. } => Endpoint::AfterRead,
            Self::ForumStart => Endpoint::ForumStart,
            Self::ForumChat { .. } => Endpoint::ForumChat,
        }
    }

    /// Session id the request was issued with, when the endpoint carries one.
    pub fn session_id(&self) -> Option<&str> {
        match self {
            Self::Chat { session_id, .. }
            | Self::ClearHistory { session_id }
            | Self::AfterRead { session_id, .. } => Some(session_id),
            Self::ForumStart | Self::ForumChat { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendResponse {
    Chat(ChatReply),
    Cleared,
    AfterRead(AfterReadReply),
    Forum(ForumBatch),
}

impl BackendResponse {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Chat(_) => "chat reply",
            Self::Cleared => "clear acknowledgement",
            Self::AfterRead(_) => "after-read reply",
            Self::Forum(_) => "forum batch",
        }
    }
}
