// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::contract::Contract;
use alloy::{json_abi::JsonAbi, primitives::Address};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};
use tracing::{debug, info};

pub const GET_OWNER: &str = "getOwner";
pub const ADD_USER: &str = "addUser";
pub const NEW_PATIENT_ADDED: &str = "NewPatientAdded";

/// A Truffle style build artifact, eg. `build/contracts/PatientManagement.json`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentArtifact {
    #[serde(default)]
    pub contract_name: Option<String>,
    pub abi: JsonAbi,
    /// Deployments keyed by network id
    #[serde(default)]
    pub networks: HashMap<String, NetworkDeployment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDeployment {
    pub address: Address,
    #[serde(default)]
    pub transaction_hash: Option<String>,
}

impl DeploymentArtifact {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Could not read deployment artifact at {:?}", path))?;
        Self::from_json(&contents).with_context(|| format!("Invalid deployment artifact {:?}", path))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn name(&self) -> &str {
        self.contract_name.as_deref().unwrap_or("PatientManagement")
    }

    pub fn deployed_address(&self, network_id: u64) -> Option<Address> {
        self.networks
            .get(&network_id.to_string())
            .map(|deployment| deployment.address)
    }
}

/// The deployed contract this client talks to. Immutable once resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractBinding {
    pub address: Address,
    pub abi: JsonAbi,
}

impl ContractBinding {
    /// Resolve the binding for `network_id`. A configured contract address wins over the
    /// artifact's `networks` table. Fails when neither knows about the network or when the ABI
    /// lacks a member this client calls.
    pub fn resolve(
        artifact: &DeploymentArtifact,
        network_id: u64,
        configured: Option<&Contract>,
    ) -> Result<Self> {
        let address = match configured {
            Some(contract) => {
                let address: Address = contract.address().parse().with_context(|| {
                    format!("Invalid contract address '{}'", contract.address())
                })?;
                debug!(%address, "Using configured contract address");
                address
            }
            None => match artifact.deployed_address(network_id) {
                Some(address) => address,
                None => {
                    let mut known: Vec<&String> = artifact.networks.keys().collect();
                    known.sort();
                    bail!(
                        "No deployment of {} found for network id {}. Known network ids: {:?}. \
                        Redeploy the contract or set `contracts.patient_management` in your configuration.",
                        artifact.name(),
                        network_id,
                        known
                    );
                }
            },
        };

        let binding = ContractBinding {
            address,
            abi: artifact.abi.clone(),
        };
        binding.validate()?;
        info!(%address, network_id, "Resolved {} binding", artifact.name());
        Ok(binding)
    }

    fn validate(&self) -> Result<()> {
        for function in [GET_OWNER, ADD_USER] {
            if self.abi.function(function).is_none() {
                bail!("Contract ABI is missing function `{}`", function);
            }
        }
        if self.abi.event(NEW_PATIENT_ADDED).is_none() {
            bail!("Contract ABI is missing event `{}`", NEW_PATIENT_ADDED);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTIFACT: &str =
        include_str!("../../../fixtures/build/contracts/PatientManagement.json");

    #[test]
    fn test_resolves_from_artifact_network() -> Result<()> {
        let artifact = DeploymentArtifact::from_json(ARTIFACT)?;
        let binding = ContractBinding::resolve(&artifact, 5777, None)?;
        assert_eq!(
            binding.address,
            "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0".parse::<Address>()?
        );
        assert!(binding.abi.function(ADD_USER).is_some());
        Ok(())
    }

    #[test]
    fn test_configured_address_wins() -> Result<()> {
        let artifact = DeploymentArtifact::from_json(ARTIFACT)?;
        let configured =
            Contract::AddressOnly("0xCf7Ed3AccA5a467e9e704C703E8D87F634fB0Fc9".to_string());
        // The configured address also covers networks the artifact never saw
        let binding = ContractBinding::resolve(&artifact, 11155111, Some(&configured))?;
        assert_eq!(
            binding.address,
            "0xCf7Ed3AccA5a467e9e704C703E8D87F634fB0Fc9".parse::<Address>()?
        );
        Ok(())
    }

    #[test]
    fn test_missing_network_is_reported() -> Result<()> {
        let artifact = DeploymentArtifact::from_json(ARTIFACT)?;
        let err = ContractBinding::resolve(&artifact, 1337, None).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("network id 1337"), "unexpected error: {msg}");
        assert!(msg.contains("5777"), "unexpected error: {msg}");
        Ok(())
    }

    #[test]
    fn test_abi_missing_event_is_rejected() -> Result<()> {
        let mut artifact = DeploymentArtifact::from_json(ARTIFACT)?;
        artifact.abi.events.clear();
        let err = ContractBinding::resolve(&artifact, 5777, None).unwrap_err();
        assert!(err.to_string().contains(NEW_PATIENT_ADDED));
        Ok(())
    }

    #[test]
    fn test_invalid_configured_address() -> Result<()> {
        let artifact = DeploymentArtifact::from_json(ARTIFACT)?;
        let configured = Contract::AddressOnly("0x1234".to_string());
        assert!(ContractBinding::resolve(&artifact, 5777, Some(&configured)).is_err());
        Ok(())
    }
}
