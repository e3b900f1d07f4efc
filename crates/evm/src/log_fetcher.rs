// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::ledger::{LedgerClient, LedgerError, RawPatientEvent};
use alloy::rpc::types::BlockNumberOrTag;
use tracing::{debug, info};

pub(crate) const GET_LOGS_CHUNK_SIZE: u64 = 10_000;

/// Fetch `NewPatientAdded` logs in chunks from `from_block` to `to_block` (inclusive).
/// A failing chunk fails the whole fetch.
pub(crate) async fn fetch_logs_chunked<L: LedgerClient + ?Sized>(
    ledger: &L,
    from_block: u64,
    to_block: u64,
) -> Result<Vec<RawPatientEvent>, LedgerError> {
    if to_block < from_block {
        return Ok(vec![]);
    }

    let total_blocks = to_block - from_block + 1;
    let total_chunks = total_blocks.div_ceil(GET_LOGS_CHUNK_SIZE);
    debug!(from_block, to_block, total_chunks, "Fetching logs in chunks");

    let mut logs = Vec::new();
    let mut cursor = from_block;
    let mut chunk_idx = 0u64;

    while cursor <= to_block {
        let chunk_end = cursor
            .saturating_add(GET_LOGS_CHUNK_SIZE - 1)
            .min(to_block);
        chunk_idx += 1;

        let chunk = ledger.patient_logs(cursor, chunk_end).await?;
        debug!(
            chunk = chunk_idx,
            total_chunks,
            from = cursor,
            to = chunk_end,
            events = chunk.len(),
            "Fetched log chunk"
        );
        logs.extend(chunk);

        if chunk_end == u64::MAX {
            break;
        }
        cursor = chunk_end + 1;
    }

    info!(events = logs.len(), chunks = chunk_idx, "Log fetch complete");
    Ok(logs)
}

/// Remembers the last looked up block so consecutive events from one block cost one lookup
pub(crate) struct TimestampTracker {
    current: Option<(u64, u64)>, // (block_number, timestamp)
}

impl TimestampTracker {
    pub fn new() -> Self {
        Self { current: None }
    }

    pub async fn get<L: LedgerClient + ?Sized>(
        &mut self,
        ledger: &L,
        block_number: u64,
    ) -> Result<u64, LedgerError> {
        if let Some((cached_bn, ts)) = self.current {
            if cached_bn == block_number {
                return Ok(ts);
            }
        }

        let ts = ledger
            .block_timestamp(BlockNumberOrTag::Number(block_number))
            .await?;
        self.current = Some((block_number, ts));
        Ok(ts)
    }
}
