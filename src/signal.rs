/// Typed message arriving from an embedded surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundSignal {
    /// The overlay document asked to be dismissed.
    Close,
    Other(String),
}

pub const CLOSE_PAYLOAD: &str = "close";

impl InboundSignal {
    /// Only the exact payload `close` is a close signal.
    pub fn parse(payload: &str) -> Self {
        if payload == CLOSE_PAYLOAD {
            Self::Close
        } else {
            Self::Other(payload.to_string())
        }
    }
}
