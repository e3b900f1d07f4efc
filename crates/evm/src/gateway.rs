// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::events::{load_past_events, EventSummary};
use crate::ledger::{LedgerClient, LedgerError};
use crate::patient::{PatientInput, PatientRecord, ValidationError};
use crate::wallet::{WalletConnector, WalletError};
use alloy::primitives::{Address, TxHash};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Could not resolve the contract owner: {0}")]
    Owner(LedgerError),

    #[error("addUser failed: {0}")]
    Write(LedgerError),

    #[error("Could not load past events: {0}")]
    Events(LedgerError),

    #[error("Could not resolve a block timestamp: {0}")]
    Timestamp(LedgerError),

    #[error("Contract ABI mismatch: {0}")]
    Abi(LedgerError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl GatewayError {
    fn owner(err: LedgerError) -> Self {
        match err {
            LedgerError::Abi(_) => Self::Abi(err),
            _ => Self::Owner(err),
        }
    }

    fn write(err: LedgerError) -> Self {
        match err {
            LedgerError::Abi(_) => Self::Abi(err),
            _ => Self::Write(err),
        }
    }

    fn events(err: LedgerError) -> Self {
        match err {
            LedgerError::Abi(_) => Self::Abi(err),
            LedgerError::BlockNotFound(_) => Self::Timestamp(err),
            _ => Self::Events(err),
        }
    }
}

/// Where the gateway is in its write/reload cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshState {
    #[default]
    Idle,
    /// A transaction is in flight
    Writing,
    /// The binding changed, a write succeeded or a reload failed. The next `refresh` reloads.
    RefreshPending,
    /// An event reload is in flight
    Refreshing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No account is connected so nothing was sent
    Skipped,
    Submitted(TxHash),
}

/// A submission and the reload that follows it. The write may succeed while the reload fails.
#[derive(Debug)]
pub struct SubmitReport {
    pub outcome: SubmitOutcome,
    pub refresh: Result<bool, GatewayError>,
}

/// Results of the mount flow. Owner resolution and the event reload fail independently.
#[derive(Debug)]
pub struct MountReport {
    pub owner: Result<Address, GatewayError>,
    pub events: Result<bool, GatewayError>,
}

/// Typed access to the deployed patient management contract plus the client state derived
/// from it: the resolved owner, the connected account and the last event replay.
pub struct ContractGateway<L: LedgerClient> {
    ledger: L,
    from_block: u64,
    to_block: Option<u64>,
    owner: Option<Address>,
    account: Option<Address>,
    summary: Option<EventSummary>,
    state: RefreshState,
}

impl<L: LedgerClient> ContractGateway<L> {
    pub fn new(ledger: L, from_block: u64) -> Self {
        Self {
            ledger,
            from_block,
            to_block: None,
            owner: None,
            account: None,
            summary: None,
            state: RefreshState::Idle,
        }
    }

    /// Stop replays at `to_block` instead of the chain head
    pub fn with_to_block(mut self, to_block: Option<u64>) -> Self {
        self.to_block = to_block;
        self
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn owner(&self) -> Option<Address> {
        self.owner
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn summary(&self) -> Option<&EventSummary> {
        self.summary.as_ref()
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    pub fn set_account(&mut self, account: Option<Address>) {
        self.account = account;
    }

    /// Resolve `getOwner`. On failure the owner stays unresolved.
    pub async fn get_owner(&mut self) -> Result<Address, GatewayError> {
        let result = self.ledger.owner().await.map_err(GatewayError::owner);
        self.apply_owner(result)
    }

    fn apply_owner(
        &mut self,
        result: Result<Address, GatewayError>,
    ) -> Result<Address, GatewayError> {
        match &result {
            Ok(owner) => {
                info!(%owner, "Contract owner resolved");
                self.owner = Some(*owner);
            }
            Err(e) => error!("{e}"),
        }
        result
    }

    /// Ask the wallet for an account and use it to sign subsequent writes. On failure the
    /// current account is left as it was.
    pub async fn connect(&mut self, wallet: &WalletConnector) -> Result<Address, WalletError> {
        let account = wallet.connect().await?;
        self.account = Some(account);
        Ok(account)
    }

    /// Send `addUser` from the connected account. Without one the write is skipped.
    pub async fn add_user(&mut self, record: &PatientRecord) -> Result<SubmitOutcome, GatewayError> {
        let Some(from) = self.account else {
            debug!("No connected account, skipping addUser");
            return Ok(SubmitOutcome::Skipped);
        };

        let previous = self.state;
        self.state = RefreshState::Writing;
        match self.ledger.add_user(from, record).await {
            Ok(tx_hash) => {
                info!(%tx_hash, patient = %record.eth_address, "Patient added");
                self.state = RefreshState::RefreshPending;
                Ok(SubmitOutcome::Submitted(tx_hash))
            }
            Err(e) => {
                let err = GatewayError::write(e);
                error!("{err}");
                self.state = previous;
                Err(err)
            }
        }
    }

    /// Validate the form input and submit it with the default record fields
    pub async fn submit(&mut self, input: &PatientInput) -> Result<SubmitOutcome, GatewayError> {
        let patient = input.validate()?;
        self.add_user(&PatientRecord::from(patient)).await
    }

    /// Submit, then reload events when the write went through
    pub async fn submit_and_refresh(
        &mut self,
        input: &PatientInput,
    ) -> Result<SubmitReport, GatewayError> {
        let outcome = self.submit(input).await?;
        let refresh = match outcome {
            SubmitOutcome::Submitted(_) => self.refresh().await,
            SubmitOutcome::Skipped => Ok(false),
        };
        Ok(SubmitReport { outcome, refresh })
    }

    /// Replay events over an explicit range without touching the gateway's own state
    pub async fn load_past_events(
        &self,
        from_block: u64,
        to_block: Option<u64>,
    ) -> Result<EventSummary, GatewayError> {
        load_past_events(&self.ledger, from_block, to_block)
            .await
            .map_err(GatewayError::events)
    }

    /// True when the binding changed, a write succeeded or no replay has completed yet
    pub fn needs_refresh(&self) -> bool {
        self.state == RefreshState::RefreshPending || self.summary.is_none()
    }

    /// Reload events when needed. Returns whether a reload ran. A failed reload keeps the
    /// previous events and leaves the refresh outstanding.
    pub async fn refresh(&mut self) -> Result<bool, GatewayError> {
        if !self.begin_refresh() {
            return Ok(false);
        }
        let result = self.load_past_events(self.from_block, self.to_block).await;
        self.finish_refresh(result)
    }

    fn begin_refresh(&mut self) -> bool {
        if !self.needs_refresh() {
            debug!(state = ?self.state, "Events are current, skipping reload");
            return false;
        }
        self.state = RefreshState::Refreshing;
        true
    }

    fn finish_refresh(
        &mut self,
        result: Result<EventSummary, GatewayError>,
    ) -> Result<bool, GatewayError> {
        match result {
            Ok(summary) => {
                info!(events = summary.count(), "Events loaded");
                self.summary = Some(summary);
                self.state = RefreshState::Idle;
                Ok(true)
            }
            Err(err) => {
                warn!("{err}");
                self.state = RefreshState::RefreshPending;
                Err(err)
            }
        }
    }

    /// Resolve the owner and reload events concurrently
    pub async fn mount(&mut self) -> MountReport {
        let reload = self.begin_refresh();
        let (owner, events) = {
            let ledger = &self.ledger;
            let (from_block, to_block) = (self.from_block, self.to_block);
            tokio::join!(ledger.owner(), async move {
                if reload {
                    Some(load_past_events(ledger, from_block, to_block).await)
                } else {
                    None
                }
            })
        };

        let owner = self.apply_owner(owner.map_err(GatewayError::owner));
        let events = match events {
            Some(result) => self.finish_refresh(result.map_err(GatewayError::events)),
            None => Ok(false),
        };
        MountReport { owner, events }
    }

    /// Point the gateway at a different contract. Derived state is dropped and a reload is
    /// requested.
    pub fn rebind(&mut self, ledger: L) {
        info!("Contract binding changed");
        self.ledger = ledger;
        self.owner = None;
        self.summary = None;
        self.state = RefreshState::RefreshPending;
    }
}
