// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::patient::PatientRecord;
use alloy::{
    primitives::{Address, TxHash},
    rpc::types::BlockNumberOrTag,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("ABI error: {0}")]
    Abi(String),

    #[error("Block {0} not found")]
    BlockNotFound(BlockNumberOrTag),

    #[error("Log is missing its block number")]
    MissingBlockNumber,

    #[error("Transaction {0} reverted")]
    Reverted(TxHash),

    #[error("Unexpected response to `{0}`")]
    UnexpectedResponse(&'static str),
}

/// Return values of a decoded event, in ABI declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReturnValues(Vec<(String, String)>);

impl ReturnValues {
    pub fn new(values: Vec<(String, String)>) -> Self {
        Self(values)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A `NewPatientAdded` log as returned by the ledger, before its block timestamp is known
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPatientEvent {
    pub block_number: Option<u64>,
    pub transaction_hash: Option<TxHash>,
    pub return_values: ReturnValues,
}

/// Everything the gateway needs from a ledger node and the bound contract.
/// Enables unit testing without a real EVM provider.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// `getOwner()` read call
    async fn owner(&self) -> Result<Address, LedgerError>;

    /// `addUser(..)` transaction sent from `from`. Resolves once the transaction is mined.
    async fn add_user(&self, from: Address, record: &PatientRecord)
        -> Result<TxHash, LedgerError>;

    /// `NewPatientAdded` logs within the inclusive block range, in log order
    async fn patient_logs(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawPatientEvent>, LedgerError>;

    async fn block_number(&self) -> Result<u64, LedgerError>;

    /// Timestamp in seconds of the given block
    async fn block_timestamp(&self, block: BlockNumberOrTag) -> Result<u64, LedgerError>;
}

#[async_trait]
impl<L: LedgerClient + ?Sized> LedgerClient for Arc<L> {
    async fn owner(&self) -> Result<Address, LedgerError> {
        (**self).owner().await
    }

    async fn add_user(
        &self,
        from: Address,
        record: &PatientRecord,
    ) -> Result<TxHash, LedgerError> {
        (**self).add_user(from, record).await
    }

    async fn patient_logs(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawPatientEvent>, LedgerError> {
        (**self).patient_logs(from_block, to_block).await
    }

    async fn block_number(&self) -> Result<u64, LedgerError> {
        (**self).block_number().await
    }

    async fn block_timestamp(&self, block: BlockNumberOrTag) -> Result<u64, LedgerError> {
        (**self).block_timestamp(block).await
    }
}
