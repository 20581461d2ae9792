//! Staggered delivery of multi-agent forum batches.
//!
//! Offsets inside a batch are cumulative: each item waits a fresh
//! `U[10s, 20s)` after the previous one, so delivery times strictly increase.
//! Separate batches are scheduled independently and may interleave.

use std::time::{Duration, Instant};

use tracing::{debug, info};
use webface_api::ForumMessage;

use crate::message_log::{MessageId, MessageKind, MessageLog};
use crate::random::RandomSource;
use crate::timers::{TimerEvent, TimerQueue};

pub const MIN_DELAY: Duration = Duration::from_secs(10);
pub const DELAY_SPAN: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryItem {
    pub agent_name: String,
    pub text: String,
    /// Offset from the moment the batch was enqueued.
    pub scheduled_offset: Duration,
    pub batch: u64,
}

#[derive(Debug, Default)]
pub struct DeliveryQueue {
    next_batch: u64,
    in_flight: usize,
    delivered: usize,
}

impl DeliveryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules every message of `batch` and returns the planned items.
    pub fn enqueue_batch(
        &mut self,
        now: Instant,
        batch: &[ForumMessage],
        random: &mut dyn RandomSource,
        timers: &mut TimerQueue<TimerEvent>,
    ) -> Vec<DeliveryItem> {
        let batch_id = self.next_batch;
        self.next_batch += 1;

        let items = plan_offsets(batch, random)
            .into_iter()
            .map(|(message, scheduled_offset)| DeliveryItem {
                agent_name: message.name.clone(),
                text: message.text.clone(),
                scheduled_offset,
                batch: batch_id,
            })
            .collect::<Vec<_>>();

        for item in &items {
            timers.schedule_at(now + item.scheduled_offset, TimerEvent::Deliver(item.clone()));
        }
        self.in_flight += items.len();
        info!(
            batch = batch_id,
            items = items.len(),
            last_offset_ms = items
                .last()
                .map(|item| item.scheduled_offset.as_millis())
                .unwrap_or(0),
            "forum batch scheduled"
        );
        items
    }

    /// Appends a due item to the log under the agent's name.
    pub fn deliver(&mut self, item: &DeliveryItem, log: &mut MessageLog) -> MessageId {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.delivered += 1;
        let category = agent_category(&item.agent_name);
        debug!(batch = item.batch, agent = %item.agent_name, "forum message delivered");
        log.append_categorized(
            item.text.as_str(),
            MessageKind::Assistant,
            Some(&item.agent_name),
            &category,
        )
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn delivered(&self) -> usize {
        self.delivered
    }
}

/// Cumulative offsets: `offset_i = offset_{i-1} + U[10s, 20s)`.
pub fn plan_offsets<'a>(
    batch: &'a [ForumMessage],
    random: &mut dyn RandomSource,
) -> Vec<(&'a ForumMessage, Duration)> {
    let mut offset = Duration::ZERO;
    batch
        .iter()
        .map(|message| {
            offset += random_delay(random);
            (message, offset)
        })
        .collect()
}

fn random_delay(random: &mut dyn RandomSource) -> Duration {
    MIN_DELAY + DELAY_SPAN.mul_f64(random.next_unit())
}

/// Styling token for an agent: `agent-` plus the lower-cased name with every
/// run of non-alphanumeric characters collapsed to one `-`.
pub fn agent_category(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator {
                slug.push('-');
                pending_separator = false;
            }
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    if pending_separator {
        slug.push('-');
    }
    format!("agent-{slug}")
}
