// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use serde::{Deserialize, Serialize};

/// A configured contract location. Either a bare address or an address with the block it was
/// deployed at, which bounds historical event queries.
#[derive(Debug, Clone, Hash, Eq, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Contract {
    Full {
        address: String,
        deploy_block: Option<u64>,
    },
    AddressOnly(String),
}

impl Contract {
    pub fn address(&self) -> &str {
        match self {
            Contract::Full { address, .. } => address,
            Contract::AddressOnly(address) => address,
        }
    }

    pub fn deploy_block(&self) -> Option<u64> {
        match self {
            Contract::Full { deploy_block, .. } => *deploy_block,
            Contract::AddressOnly(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, Hash, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContractAddresses {
    /// When absent the address is taken from the deployment artifact for the chain's network id
    pub patient_management: Option<Contract>,
}
