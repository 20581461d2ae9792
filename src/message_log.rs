//! Append-only record of rendered turns.
//!
//! Renderers observe the log through [`MessageLog::subscribe`] instead of
//! being written to directly. Appends notify observers synchronously, so an
//! observer never sees a half-applied append.

use std::fmt;
use std::sync::Arc;

use time::OffsetDateTime;
use tracing::debug;

use crate::clock::Clock;

pub const USER_ROLE: &str = "You";
pub const ASSISTANT_ROLE: &str = "Assistant";
pub const USER_CATEGORY: &str = "user";
pub const ASSISTANT_CATEGORY: &str = "assistant";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    User,
    Assistant,
}

impl MessageKind {
    pub fn default_role(self) -> &'static str {
        match self {
            Self::User => USER_ROLE,
            Self::Assistant => ASSISTANT_ROLE,
        }
    }

    pub fn default_category(self) -> &'static str {
        match self {
            Self::User => USER_CATEGORY,
            Self::Assistant => ASSISTANT_CATEGORY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub role: String,
    pub kind: MessageKind,
    /// Stable styling token: `user`, `assistant` or `agent-<slug>`.
    pub category: String,
    pub timestamp: OffsetDateTime,
}

impl Message {
    /// Avatar glyph: upper-cased first character of the role.
    pub fn avatar(&self) -> String {
        self.role
            .chars()
            .next()
            .map(|first| first.to_uppercase().collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEvent<'a> {
    Appended(&'a Message),
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&LogEvent<'_>) + Send>;

pub struct MessageLog {
    clock: Arc<dyn Clock>,
    messages: Vec<Message>,
    next_id: u64,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl fmt::Debug for MessageLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageLog")
            .field("messages", &self.messages)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl MessageLog {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            messages: Vec::new(),
            next_id: 1,
            observers: Vec::new(),
            next_subscription: 1,
        }
    }

    /// Appends a turn. `role` defaults to `You` / `Assistant` by kind.
    pub fn append(
        &mut self,
        text: impl Into<String>,
        kind: MessageKind,
        role: Option<&str>,
    ) -> MessageId {
        self.append_categorized(text, kind, role, kind.default_category())
    }

    pub fn append_categorized(
        &mut self,
        text: impl Into<String>,
        kind: MessageKind,
        role: Option<&str>,
        category: &str,
    ) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;

        let message = Message {
            id,
            text: text.into(),
            role: role.unwrap_or(kind.default_role()).to_string(),
            kind,
            category: category.to_string(),
            timestamp: self.clock.wall_time(),
        };
        debug!(id = %id, role = %message.role, category = %message.category, "message appended");
        self.messages.push(message);

        if let Some(message) = self.messages.last() {
            let event = LogEvent::Appended(message);
            for (_, observer) in &mut self.observers {
                observer(&event);
            }
        }
        id
    }

    /// Drops every message. Ids keep increasing across clears.
    pub fn clear(&mut self) {
        self.messages.clear();
        debug!("message log cleared");
        for (_, observer) in &mut self.observers {
            observer(&LogEvent::Cleared);
        }
    }

    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&LogEvent<'_>) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == id)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
