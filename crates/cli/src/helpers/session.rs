// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{Context, Result};
use pmd_config::AppConfig;
use pmd_evm::{connect_provider, ContractGateway, PatientManagementContract, WalletConnector};
use std::sync::Arc;
use tracing::info;

pub type Gateway = ContractGateway<Arc<PatientManagementContract>>;

/// A node connection bound to the configured contract, plus the wallet used for signing
pub struct Session {
    contract: Arc<PatientManagementContract>,
    wallet: WalletConnector,
}

impl Session {
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let chain = config.chain();
        let rpc = chain.rpc_url()?;
        let binding = config.binding()?;

        // A local key has to sign on the provider itself
        let signer = WalletConnector::local_signer(config.wallet())?;
        let provider = connect_provider(rpc.url().as_str(), signer)
            .await
            .with_context(|| format!("Could not connect to {}", rpc.url()))?;

        let wallet = WalletConnector::from_config(config.wallet(), provider.clone())?;

        info!(
            chain = %chain.name,
            contract = %binding.address,
            "Connected to {}",
            rpc.url()
        );

        Ok(Self {
            contract: Arc::new(PatientManagementContract::new(provider, binding)),
            wallet,
        })
    }

    pub fn wallet(&self) -> &WalletConnector {
        &self.wallet
    }

    /// A gateway replaying events from the chain's configured start block
    pub fn gateway(&self, config: &AppConfig) -> Result<Gateway> {
        Ok(self.gateway_from(config.chain().event_start_block()?))
    }

    pub fn gateway_from(&self, from_block: u64) -> Gateway {
        ContractGateway::new(self.contract.clone(), from_block)
    }
}
