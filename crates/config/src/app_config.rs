// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::chain_config::ChainConfig;
use crate::deployment::{ContractBinding, DeploymentArtifact};
use crate::load_config::{find_in_parent, resolve_config_path, DEFAULT_CONFIG_NAME};
use crate::yaml::load_yaml_with_env;
use anyhow::{bail, Context, Result};
use figment::{
    providers::{Format, Serialized, Yaml},
    Figment,
};
use path_clean::clean;
use serde::{Deserialize, Serialize};
use std::{env, fmt, path::PathBuf};

/// Where signing accounts come from. Leaving this out of the configuration means no wallet is
/// available and connecting fails.
#[derive(Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WalletConfig {
    /// Accounts managed by the node itself, authorized through `eth_requestAccounts`
    Rpc,
    /// A local signing key, usually supplied as `${PRIVATE_KEY}`
    PrivateKey { private_key: String },
}

impl fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletConfig::Rpc => write!(f, "Rpc"),
            WalletConfig::PrivateKey { .. } => write!(f, "PrivateKey(<redacted>)"),
        }
    }
}

/// Names of the `NewPatientAdded` fields the statistics table reads
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StatsConfig {
    pub district_field: String,
    pub deceased_field: String,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            district_field: "district".to_string(),
            deceased_field: "isDead".to_string(),
        }
    }
}

/// The config actually used throughout the app
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// The selected chain
    chain: ChainConfig,
    /// Deployment artifact, resolved against the config file's folder
    artifact: PathBuf,
    wallet: Option<WalletConfig>,
    stats: StatsConfig,
    /// Open Telemetry collector grpc endpoint. Eg. http://localhost:4317
    otel: Option<String>,
    config_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn try_from_unscoped(config: UnscopedAppConfig, cwd: &PathBuf) -> Result<Self> {
        if config.chains.is_empty() {
            bail!("No chains configured. Add at least one entry under `chains`.");
        }

        let chain = match &config.network {
            Some(name) => match config.chains.iter().find(|c| &c.name == name) {
                Some(chain) => chain.clone(),
                None => {
                    let names: Vec<&str> = config.chains.iter().map(|c| c.name.as_str()).collect();
                    bail!(
                        "Could not find chain '{}'. Configured chains: {:?}",
                        name,
                        names
                    );
                }
            },
            None => config.chains[0].clone(),
        };

        // Validates the url up front so later calls can rely on it
        chain.rpc_url()?;

        let base_dir = config
            .found_config_file
            .as_ref()
            .and_then(|f| f.parent().map(PathBuf::from))
            .unwrap_or_else(|| cwd.clone());
        let artifact = if config.artifact.is_absolute() {
            config.artifact.clone()
        } else {
            clean(base_dir.join(&config.artifact))
        };

        Ok(AppConfig {
            chain,
            artifact,
            wallet: config.wallet,
            stats: config.stats,
            otel: config.otel,
            config_file: config.found_config_file,
        })
    }

    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    pub fn artifact(&self) -> &PathBuf {
        &self.artifact
    }

    pub fn wallet(&self) -> Option<&WalletConfig> {
        self.wallet.as_ref()
    }

    pub fn stats(&self) -> &StatsConfig {
        &self.stats
    }

    pub fn otel(&self) -> Option<String> {
        self.otel.clone()
    }

    pub fn config_file(&self) -> Option<&PathBuf> {
        self.config_file.as_ref()
    }

    /// Read the deployment artifact and resolve the contract binding for the selected chain
    pub fn binding(&self) -> Result<ContractBinding> {
        let artifact = DeploymentArtifact::from_file(&self.artifact)?;
        ContractBinding::resolve(
            &artifact,
            self.chain.network_id,
            self.chain.contracts.patient_management.as_ref(),
        )
        .with_context(|| format!("Could not bind contract on chain '{}'", self.chain.name))
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct UnscopedAppConfig {
    /// Name of the chain to use, defaults to the first configured chain
    network: Option<String>,
    chains: Vec<ChainConfig>,
    artifact: PathBuf,
    wallet: Option<WalletConfig>,
    stats: StatsConfig,
    otel: Option<String>,
    /// The config file as found. This is set by the loader and should not be used in
    /// configurations
    found_config_file: Option<PathBuf>,
}

impl Default for UnscopedAppConfig {
    fn default() -> Self {
        Self {
            network: None,
            chains: vec![],
            artifact: PathBuf::from("build/contracts/PatientManagement.json"),
            wallet: None,
            stats: StatsConfig::default(),
            otel: None,
            found_config_file: None,
        }
    }
}

impl UnscopedAppConfig {
    pub fn into_scoped(self) -> Result<AppConfig> {
        AppConfig::try_from_unscoped(self, &env::current_dir()?)
    }
}

/// Value struct for passing configuration from the cli to the configuration
#[derive(Default, Serialize, Deserialize, Clone, Debug)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otel: Option<String>,
    pub found_config_file: Option<PathBuf>,
}

/// Load the config at the config_file or the default location if not provided
pub fn load_config(
    network: Option<String>,
    config_file: Option<String>,
    otel: Option<String>,
) -> Result<AppConfig> {
    let cli_file = config_file.map(PathBuf::from);
    let cwd = env::current_dir()?;

    let resolved_config_path = resolve_config_path(
        find_in_parent,
        &cwd,
        &OsDirs::config_dir(),
        DEFAULT_CONFIG_NAME,
        cli_file.as_deref(),
    );

    let loaded_yaml =
        load_yaml_with_env(&resolved_config_path).context("Configuration file not found")?;

    let config: UnscopedAppConfig =
        Figment::from(Serialized::defaults(&UnscopedAppConfig::default()))
            .merge(Yaml::string(&loaded_yaml))
            .merge(Serialized::defaults(&CliOverrides {
                network,
                otel,
                found_config_file: Some(resolved_config_path),
            }))
            .extract()
            .context("Could not parse configuration")?;

    config.into_scoped()
}

pub struct OsDirs;
impl OsDirs {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("patient-dash")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::Contract;
    use figment::Jail;

    const CONFIG: &str = r#"
network: ganache
artifact: "./build/contracts/PatientManagement.json"
chains:
  - name: "hardhat"
    network_id: 31337
    rpc_url: "http://localhost:8545"
  - name: "ganache"
    rpc_url: "http://127.0.0.1:7545"
    contracts:
      patient_management:
        address: "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0"
        deploy_block: 12
wallet:
  type: private_key
  private_key: "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
stats:
  district_field: "location"
"#;

    #[test]
    fn test_deserialization() -> Result<()> {
        let mut unscoped: UnscopedAppConfig = serde_yaml::from_str(CONFIG)?;
        unscoped.found_config_file = Some(PathBuf::from("/project/patient-dash.config.yaml"));
        let config = AppConfig::try_from_unscoped(unscoped, &PathBuf::from("/my/cwd"))?;

        assert_eq!(config.chain().name, "ganache");
        assert_eq!(config.chain().network_id, 5777);
        assert_eq!(
            config.chain().contracts.patient_management,
            Some(Contract::Full {
                address: "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0".to_string(),
                deploy_block: Some(12),
            })
        );
        assert_eq!(
            config.artifact(),
            &PathBuf::from("/project/build/contracts/PatientManagement.json")
        );
        assert!(matches!(
            config.wallet(),
            Some(WalletConfig::PrivateKey { .. })
        ));
        assert_eq!(config.stats().district_field, "location");
        assert_eq!(config.stats().deceased_field, "isDead");
        Ok(())
    }

    #[test]
    fn test_defaults_to_first_chain_and_no_wallet() -> Result<()> {
        let unscoped: UnscopedAppConfig = serde_yaml::from_str(
            r#"
chains:
  - name: "hardhat"
    rpc_url: "http://localhost:8545"
"#,
        )?;
        let config = AppConfig::try_from_unscoped(unscoped, &PathBuf::from("/my/cwd"))?;
        assert_eq!(config.chain().name, "hardhat");
        assert_eq!(config.wallet(), None);
        assert_eq!(
            config.artifact(),
            &PathBuf::from("/my/cwd/build/contracts/PatientManagement.json")
        );
        Ok(())
    }

    #[test]
    fn test_unknown_network_is_an_error() -> Result<()> {
        let unscoped: UnscopedAppConfig = serde_yaml::from_str(
            r#"
network: mainnet
chains:
  - name: "hardhat"
    rpc_url: "http://localhost:8545"
"#,
        )?;
        let err = AppConfig::try_from_unscoped(unscoped, &PathBuf::from("/")).unwrap_err();
        assert!(err.to_string().contains("mainnet"));
        Ok(())
    }

    #[test]
    fn test_no_chains_is_an_error() {
        let err = AppConfig::try_from_unscoped(UnscopedAppConfig::default(), &PathBuf::from("/"))
            .unwrap_err();
        assert!(err.to_string().contains("No chains configured"));
    }

    #[test]
    fn test_wallet_debug_is_redacted() {
        let wallet = WalletConfig::PrivateKey {
            private_key: "0xdeadbeef".to_string(),
        };
        assert!(!format!("{:?}", wallet).contains("deadbeef"));
    }

    #[test]
    fn test_file_not_found() -> Result<()> {
        let Err(err) = load_config(None, Some("/nope".to_string()), None) else {
            bail!("error expected");
        };
        let Some(e) = err.downcast_ref::<std::io::Error>() else {
            bail!("io error expected");
        };
        assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
        Ok(())
    }

    #[test]
    fn test_load_config_with_env_and_overrides() {
        Jail::expect_with(|jail| {
            jail.set_env("PMD_TEST_RPC_PORT", "7545");
            jail.set_env(
                "PMD_TEST_CONTRACT",
                "0x1234567890123456789012345678901234567890",
            );
            let filename = jail.directory().join(DEFAULT_CONFIG_NAME);
            jail.create_file(
                &filename,
                r#"
chains:
  - name: "ganache"
    rpc_url: "http://localhost:${PMD_TEST_RPC_PORT}"
    contracts:
      patient_management: "${PMD_TEST_CONTRACT}"
  - name: "sepolia"
    network_id: 11155111
    rpc_url: "https://sepolia.example.org"
"#,
            )?;

            let config = load_config(
                None,
                Some(filename.to_string_lossy().to_string()),
                Some("http://localhost:4317".to_string()),
            )
            .map_err(|e| e.to_string())?;

            assert_eq!(config.chain().rpc_url, "http://localhost:7545");
            assert_eq!(
                config
                    .chain()
                    .contracts
                    .patient_management
                    .as_ref()
                    .map(|c| c.address().to_string()),
                Some("0x1234567890123456789012345678901234567890".to_string())
            );
            assert_eq!(config.otel(), Some("http://localhost:4317".to_string()));
            assert_eq!(config.config_file(), Some(&filename));

            let config = load_config(
                Some("sepolia".to_string()),
                Some(filename.to_string_lossy().to_string()),
                None,
            )
            .map_err(|e| e.to_string())?;
            assert_eq!(config.chain().network_id, 11155111);
            assert_eq!(config.otel(), None);

            Ok(())
        });
    }
}
