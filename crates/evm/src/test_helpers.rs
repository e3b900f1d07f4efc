// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::ledger::{LedgerClient, LedgerError, RawPatientEvent, ReturnValues};
use crate::patient::PatientRecord;
use alloy::{
    primitives::{Address, TxHash, B256},
    rpc::types::BlockNumberOrTag,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const OWNER: Address = Address::new([0x11; 20]);

/// In-memory ledger. Successful writes mine a `NewPatientAdded` event in a new block.
#[derive(Clone, Default)]
pub struct FakeLedger {
    inner: Arc<Mutex<FakeState>>,
}

#[derive(Default)]
struct FakeState {
    owner_error: Option<String>,
    write_error: Option<String>,
    log_error: Option<String>,
    events: Vec<RawPatientEvent>,
    timestamps: HashMap<u64, u64>,
    head: u64,
    latest_timestamp: Option<u64>,
    writes: Vec<(Address, PatientRecord)>,
    log_ranges: Vec<(u64, u64)>,
    timestamp_lookups: u32,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_event(&self, block_number: u64, timestamp: u64) {
        self.push_event_with(block_number, timestamp, vec![]);
    }

    pub fn push_event_with(&self, block_number: u64, timestamp: u64, values: Vec<(&str, &str)>) {
        let mut state = self.inner.lock().unwrap();
        let index = state.events.len() as u8;
        state.events.push(RawPatientEvent {
            block_number: Some(block_number),
            transaction_hash: Some(B256::repeat_byte(index)),
            return_values: ReturnValues::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
        });
        state.timestamps.insert(block_number, timestamp);
        state.head = state.head.max(block_number);
    }

    pub fn set_block_timestamp(&self, block_number: u64, timestamp: u64) {
        let mut state = self.inner.lock().unwrap();
        state.timestamps.insert(block_number, timestamp);
        state.head = state.head.max(block_number);
    }

    pub fn push_raw(&self, event: RawPatientEvent) {
        self.inner.lock().unwrap().events.push(event);
    }

    /// Make the node unable to find the header of `block_number`
    pub fn forget_block(&self, block_number: u64) {
        self.inner.lock().unwrap().timestamps.remove(&block_number);
    }

    pub fn set_latest_timestamp(&self, timestamp: u64) {
        self.inner.lock().unwrap().latest_timestamp = Some(timestamp);
    }

    pub fn fail_owner(&self, msg: &str) {
        self.inner.lock().unwrap().owner_error = Some(msg.to_string());
    }

    pub fn fail_writes(&self, msg: &str) {
        self.inner.lock().unwrap().write_error = Some(msg.to_string());
    }

    pub fn fail_logs(&self, msg: &str) {
        self.inner.lock().unwrap().log_error = Some(msg.to_string());
    }

    pub fn heal_logs(&self) {
        self.inner.lock().unwrap().log_error = None;
    }

    pub fn writes(&self) -> Vec<(Address, PatientRecord)> {
        self.inner.lock().unwrap().writes.clone()
    }

    pub fn log_ranges(&self) -> Vec<(u64, u64)> {
        self.inner.lock().unwrap().log_ranges.clone()
    }

    pub fn timestamp_lookups(&self) -> u32 {
        self.inner.lock().unwrap().timestamp_lookups
    }
}

#[async_trait]
impl LedgerClient for FakeLedger {
    async fn owner(&self) -> Result<Address, LedgerError> {
        match &self.inner.lock().unwrap().owner_error {
            Some(msg) => Err(LedgerError::Rpc(msg.clone())),
            None => Ok(OWNER),
        }
    }

    async fn add_user(
        &self,
        from: Address,
        record: &PatientRecord,
    ) -> Result<TxHash, LedgerError> {
        let mut state = self.inner.lock().unwrap();
        state.writes.push((from, record.clone()));
        if let Some(msg) = &state.write_error {
            return Err(LedgerError::Rpc(msg.clone()));
        }

        let block = state.head + 1;
        let timestamp = state.timestamps.get(&state.head).copied().unwrap_or(0) + 12;
        let tx_hash = B256::repeat_byte(0xaa);
        state.events.push(RawPatientEvent {
            block_number: Some(block),
            transaction_hash: Some(tx_hash),
            return_values: ReturnValues::new(vec![
                ("ethAddress".to_string(), record.eth_address.to_string()),
                ("age".to_string(), record.age.clone()),
            ]),
        });
        state.timestamps.insert(block, timestamp);
        state.head = block;
        Ok(tx_hash)
    }

    async fn patient_logs(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawPatientEvent>, LedgerError> {
        let mut state = self.inner.lock().unwrap();
        state.log_ranges.push((from_block, to_block));
        if let Some(msg) = &state.log_error {
            return Err(LedgerError::Rpc(msg.clone()));
        }
        Ok(state
            .events
            .iter()
            .filter(|e| {
                e.block_number
                    .map(|bn| bn >= from_block && bn <= to_block)
                    .unwrap_or(true)
            })
            .cloned()
            .collect())
    }

    async fn block_number(&self) -> Result<u64, LedgerError> {
        Ok(self.inner.lock().unwrap().head)
    }

    async fn block_timestamp(&self, block: BlockNumberOrTag) -> Result<u64, LedgerError> {
        let mut state = self.inner.lock().unwrap();
        state.timestamp_lookups += 1;
        let found = match block {
            BlockNumberOrTag::Number(bn) => state.timestamps.get(&bn).copied(),
            BlockNumberOrTag::Latest => state
                .latest_timestamp
                .or_else(|| state.timestamps.get(&state.head).copied()),
            _ => None,
        };
        found.ok_or(LedgerError::BlockNotFound(block))
    }
}
