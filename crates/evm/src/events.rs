// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::ledger::{LedgerClient, LedgerError, ReturnValues};
use crate::log_fetcher::{fetch_logs_chunked, TimestampTracker};
use alloy::{primitives::TxHash, rpc::types::BlockNumberOrTag};
use chrono::{DateTime, Utc};
use tracing::info;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// A `NewPatientAdded` occurrence annotated with the timestamp of its block
#[derive(Debug, Clone, PartialEq)]
pub struct PatientAddedEvent {
    pub block_number: u64,
    pub transaction_hash: Option<TxHash>,
    pub return_values: ReturnValues,
    /// Seconds since the epoch
    pub timestamp: u64,
}

impl PatientAddedEvent {
    pub fn emitted_at(&self) -> Option<DateTime<Utc>> {
        to_datetime(self.timestamp)
    }
}

pub fn to_datetime(timestamp: u64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(i64::try_from(timestamp).ok()?, 0)
}

/// The result of one event replay
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSummary {
    pub events: Vec<PatientAddedEvent>,
    /// Timestamp of the chain head at load time, only fetched when there are events
    pub latest_timestamp: Option<u64>,
    /// Days between the first event's block and the chain head
    pub elapsed_days: Option<f64>,
}

impl EventSummary {
    pub fn count(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<u64> {
        self.events.first().map(|e| e.timestamp)
    }
}

/// Days between two unix timestamps
pub fn elapsed_days(first: u64, latest: u64) -> f64 {
    latest.saturating_sub(first) as f64 / SECONDS_PER_DAY
}

/// Replay `NewPatientAdded` events between `from_block` and `to_block` (the chain head when
/// `None`), resolving the block timestamp of every event. Any failed lookup fails the replay.
pub async fn load_past_events<L: LedgerClient + ?Sized>(
    ledger: &L,
    from_block: u64,
    to_block: Option<u64>,
) -> Result<EventSummary, LedgerError> {
    let to_block = match to_block {
        Some(block) => block,
        None => ledger.block_number().await?,
    };

    let logs = fetch_logs_chunked(ledger, from_block, to_block).await?;

    let mut tracker = TimestampTracker::new();
    let mut events = Vec::with_capacity(logs.len());
    for log in logs {
        let block_number = log.block_number.ok_or(LedgerError::MissingBlockNumber)?;
        let timestamp = tracker.get(ledger, block_number).await?;
        match to_datetime(timestamp) {
            Some(at) => info!(block_number, "Event emitted at {}", at),
            None => info!(block_number, timestamp, "Event emitted"),
        }
        events.push(PatientAddedEvent {
            block_number,
            transaction_hash: log.transaction_hash,
            return_values: log.return_values,
            timestamp,
        });
    }

    let Some(first) = events.first().map(|e| e.timestamp) else {
        return Ok(EventSummary::default());
    };

    let latest = ledger.block_timestamp(BlockNumberOrTag::Latest).await?;
    let days = elapsed_days(first, latest);
    info!(
        days,
        "Number of days from the first block to the latest: {}", days
    );

    Ok(EventSummary {
        events,
        latest_timestamp: Some(latest),
        elapsed_days: Some(days),
    })
}
