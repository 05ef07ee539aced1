//! The observable event surface and its append-only log.
//!
//! No internal ledger of past swaps exists anywhere else; this log is the
//! system of record for approval and swap history.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::types::{amount, Address};
use crate::venues::VenueTag;

/// Payload shared by every approval event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalDetails {
    pub spender: Address,
    pub token: Address,
    #[serde(with = "amount")]
    pub amount: u128,
}

/// Payload shared by every swap completion event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapDetails {
    pub token_in: Address,
    pub token_out: Address,
    pub trader: Address,
}

/// Everything this core emits. The variant name is the event name consumers
/// match on. Within each family the payload is identical across venues;
/// the name alone carries the venue identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum SwapEvent {
    TokensSwapApproved(ApprovalDetails),
    TokensApprovedOnApeswap(ApprovalDetails),
    TokensApprovedOnUniswapV2(ApprovalDetails),
    TokensApprovedOnUniswapV3(ApprovalDetails),
    TokensApprovedOnSushiswap(ApprovalDetails),
    TokensApprovedOnOneInch(ApprovalDetails),
    TokensSwapped(SwapDetails),
    TokensSwappedOnApeswap(SwapDetails),
    TokensSwappedOnUniswapV2(SwapDetails),
    TokensSwappedOnUniswapV3(SwapDetails),
    TokensSwappedOnSushiswap(SwapDetails),
    TokensSwappedOnOneInch(SwapDetails),
}

impl SwapEvent {
    /// Venue-named approval event.
    pub fn approved_on(venue: VenueTag, details: ApprovalDetails) -> Self {
        match venue {
            VenueTag::Apeswap => SwapEvent::TokensApprovedOnApeswap(details),
            VenueTag::UniswapV2 => SwapEvent::TokensApprovedOnUniswapV2(details),
            VenueTag::UniswapV3 => SwapEvent::TokensApprovedOnUniswapV3(details),
            VenueTag::Sushiswap => SwapEvent::TokensApprovedOnSushiswap(details),
            VenueTag::OneInch => SwapEvent::TokensApprovedOnOneInch(details),
        }
    }

    /// Venue-named completion event.
    pub fn swapped_on(venue: VenueTag, details: SwapDetails) -> Self {
        match venue {
            VenueTag::Apeswap => SwapEvent::TokensSwappedOnApeswap(details),
            VenueTag::UniswapV2 => SwapEvent::TokensSwappedOnUniswapV2(details),
            VenueTag::UniswapV3 => SwapEvent::TokensSwappedOnUniswapV3(details),
            VenueTag::Sushiswap => SwapEvent::TokensSwappedOnSushiswap(details),
            VenueTag::OneInch => SwapEvent::TokensSwappedOnOneInch(details),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SwapEvent::TokensSwapApproved(_) => "TokensSwapApproved",
            SwapEvent::TokensApprovedOnApeswap(_) => "TokensApprovedOnApeswap",
            SwapEvent::TokensApprovedOnUniswapV2(_) => "TokensApprovedOnUniswapV2",
            SwapEvent::TokensApprovedOnUniswapV3(_) => "TokensApprovedOnUniswapV3",
            SwapEvent::TokensApprovedOnSushiswap(_) => "TokensApprovedOnSushiswap",
            SwapEvent::TokensApprovedOnOneInch(_) => "TokensApprovedOnOneInch",
            SwapEvent::TokensSwapped(_) => "TokensSwapped",
            SwapEvent::TokensSwappedOnApeswap(_) => "TokensSwappedOnApeswap",
            SwapEvent::TokensSwappedOnUniswapV2(_) => "TokensSwappedOnUniswapV2",
            SwapEvent::TokensSwappedOnUniswapV3(_) => "TokensSwappedOnUniswapV3",
            SwapEvent::TokensSwappedOnSushiswap(_) => "TokensSwappedOnSushiswap",
            SwapEvent::TokensSwappedOnOneInch(_) => "TokensSwappedOnOneInch",
        }
    }
}

/// One committed entry in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub sequence: u64,
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: SwapEvent,
}

/// Append-only event log with live fan-out to stream subscribers.
pub struct EventLog {
    entries: RwLock<Vec<EventRecord>>,
    tx: broadcast::Sender<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        EventLog {
            entries: RwLock::new(Vec::new()),
            tx,
        }
    }

    /// Commit an event. Sequences start at 1 and never repeat or reorder.
    pub fn append(&self, event: SwapEvent) -> EventRecord {
        let mut entries = self.entries.write();
        let record = EventRecord {
            sequence: entries.len() as u64 + 1,
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            event,
        };
        entries.push(record.clone());
        debug!(sequence = record.sequence, event = record.event.name(), "event recorded");
        // Streaming is best-effort; the log itself is the durable surface.
        let _ = self.tx.send(record.clone());
        record
    }

    pub fn all(&self) -> Vec<EventRecord> {
        self.entries.read().clone()
    }

    /// Entries strictly after `sequence`.
    pub fn since(&self, sequence: u64) -> Vec<EventRecord> {
        self.entries
            .read()
            .iter()
            .filter(|r| r.sequence > sequence)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.tx.subscribe()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        EventLog::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approval() -> ApprovalDetails {
        ApprovalDetails {
            spender: Address::new([1; 20]),
            token: Address::new([2; 20]),
            amount: 1_200_000_000_000_000,
        }
    }

    #[test]
    fn sequences_are_monotonic_from_one() {
        let log = EventLog::new();
        let first = log.append(SwapEvent::TokensSwapApproved(approval()));
        let second = log.append(SwapEvent::approved_on(VenueTag::UniswapV2, approval()));
        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn since_returns_strictly_newer_entries() {
        let log = EventLog::new();
        for _ in 0..3 {
            log.append(SwapEvent::TokensSwapApproved(approval()));
        }
        let newer = log.since(1);
        assert_eq!(newer.len(), 2);
        assert!(newer.iter().all(|r| r.sequence > 1));
        assert!(log.since(3).is_empty());
    }

    #[test]
    fn event_names_carry_the_venue_identity() {
        let event = SwapEvent::approved_on(VenueTag::UniswapV3, approval());
        assert_eq!(event.name(), "TokensApprovedOnUniswapV3");

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "TokensApprovedOnUniswapV3");
        assert_eq!(value["payload"]["amount"], "1200000000000000");
    }

    #[test]
    fn records_flatten_the_event_envelope() {
        let log = EventLog::new();
        let record = log.append(SwapEvent::TokensSwapped(SwapDetails {
            token_in: Address::new([3; 20]),
            token_out: Address::new([4; 20]),
            trader: Address::new([5; 20]),
        }));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["sequence"], 1);
        assert_eq!(value["event"], "TokensSwapped");

        let back: EventRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[tokio::test]
    async fn subscribers_see_appends_live() {
        let log = EventLog::new();
        let mut rx = log.subscribe();
        log.append(SwapEvent::TokensSwapApproved(approval()));
        let received = rx.recv().await.unwrap();
        assert_eq!(received.sequence, 1);
    }
}
