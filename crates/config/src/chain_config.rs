// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{contract::ContractAddresses, rpc::RPC};
use anyhow::*;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Ganache's default development network id
pub const DEVELOPMENT_NETWORK_ID: u64 = 5777;

#[derive(Debug, Clone, PartialEq, Hash, Eq, Deserialize, Serialize)]
pub struct ChainConfig {
    pub name: String,
    /// Key into the deployment artifact's `networks` table
    #[serde(default = "default_network_id")]
    pub network_id: u64,
    pub rpc_url: String,
    #[serde(default)]
    pub contracts: ContractAddresses,
}

fn default_network_id() -> u64 {
    DEVELOPMENT_NETWORK_ID
}

impl ChainConfig {
    pub fn rpc_url(&self) -> Result<RPC> {
        Ok(RPC::from_url(&self.rpc_url)
            .map_err(|e| anyhow!("Failed to parse RPC URL for chain {}: {}", self.name, e))?)
    }

    /// First block to replay `NewPatientAdded` events from.
    ///
    /// Replaying from genesis is only allowed against a local development node.
    pub fn event_start_block(&self) -> Result<u64> {
        let rpc = self.rpc_url()?;
        let deploy_block = self
            .contracts
            .patient_management
            .as_ref()
            .and_then(|c| c.deploy_block())
            .unwrap_or(0);

        if deploy_block == 0 && !rpc.is_local() {
            let rpc_url = rpc.url().to_string();
            error!(
                "Querying from block 0 on a non-local node ({}) without a specific deploy_block is not allowed.",
                rpc_url
            );
            bail!(
                "Misconfiguration: Attempted to query historical events from genesis on a non-local node. \
                Please specify a `deploy_block` for the patient_management contract on chain '{}' ({rpc_url})",
                self.name
            );
        }

        Ok(deploy_block)
    }
}
