// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::{
    primitives::Address,
    providers::{DynProvider, Provider},
    signers::local::PrivateKeySigner,
    transports::{RpcError, TransportError},
};
use async_trait::async_trait;
use pmd_config::WalletConfig;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// EIP-1193 "User Rejected Request"
pub const USER_REJECTED_REQUEST: i64 = 4001;

/// JSON-RPC "Method not found"
pub const METHOD_NOT_FOUND: i64 = -32601;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("No wallet provider available. Please install or configure a wallet.")]
    ProviderMissing,

    #[error("Account authorization was rejected: {0}")]
    Rejected(String),

    #[error("The wallet did not authorize any account")]
    NoAccounts,

    #[error("Wallet RPC error: {0}")]
    Rpc(String),

    #[error("Invalid wallet key: {0}")]
    InvalidKey(String),
}

impl From<TransportError> for WalletError {
    fn from(err: TransportError) -> Self {
        match &err {
            RpcError::ErrorResp(payload) if payload.code == USER_REJECTED_REQUEST => {
                WalletError::Rejected(payload.message.to_string())
            }
            _ => WalletError::Rpc(err.to_string()),
        }
    }
}

/// Something that holds keys and can authorize accounts on request
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask for account authorization. May wait on the user for as long as they take.
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;
}

/// Accounts managed by the node, authorized via `eth_requestAccounts`
pub struct RpcWallet {
    provider: DynProvider,
}

impl RpcWallet {
    pub fn new(provider: DynProvider) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        request_with_fallback(|method| async move {
            self.provider
                .raw_request::<_, Vec<Address>>(method.into(), ())
                .await
        })
        .await
    }
}

/// `eth_requestAccounts`, falling back to `eth_accounts` on nodes that do not implement it
async fn request_with_fallback<F, Fut>(request: F) -> Result<Vec<Address>, WalletError>
where
    F: Fn(&'static str) -> Fut,
    Fut: Future<Output = Result<Vec<Address>, TransportError>>,
{
    match request("eth_requestAccounts").await {
        Err(RpcError::ErrorResp(payload)) if payload.code == METHOD_NOT_FOUND => {
            debug!("eth_requestAccounts is not supported, using eth_accounts");
            Ok(request("eth_accounts").await?)
        }
        result => Ok(result?),
    }
}

/// An in-process signing key. Authorization is implicit.
pub struct LocalWallet {
    signer: PrivateKeySigner,
}

impl LocalWallet {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    pub fn from_private_key(private_key: &str) -> Result<Self, WalletError> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|e| WalletError::InvalidKey(format!("{e}")))?;
        Ok(Self::new(signer))
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

#[async_trait]
impl WalletProvider for LocalWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(vec![self.signer.address()])
    }
}

/// Connects to whichever wallet provider is available
#[derive(Clone, Default)]
pub struct WalletConnector {
    provider: Option<Arc<dyn WalletProvider>>,
}

impl WalletConnector {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// A connector with no provider. Every connect fails with `ProviderMissing`.
    pub fn unavailable() -> Self {
        Self { provider: None }
    }

    /// The key the provider has to sign with, when the configured wallet holds one
    pub fn local_signer(
        config: Option<&WalletConfig>,
    ) -> Result<Option<PrivateKeySigner>, WalletError> {
        match config {
            Some(WalletConfig::PrivateKey { private_key }) => Ok(Some(
                LocalWallet::from_private_key(private_key)?.signer().clone(),
            )),
            _ => Ok(None),
        }
    }

    /// Build a connector for the configured wallet. `provider` is the node connection used by
    /// node managed accounts.
    pub fn from_config(
        config: Option<&WalletConfig>,
        provider: DynProvider,
    ) -> Result<Self, WalletError> {
        Ok(match config {
            None => Self::unavailable(),
            Some(WalletConfig::Rpc) => Self::new(Arc::new(RpcWallet::new(provider))),
            Some(WalletConfig::PrivateKey { private_key }) => {
                Self::new(Arc::new(LocalWallet::from_private_key(private_key)?))
            }
        })
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    /// Request authorization and return the first authorized account
    pub async fn connect(&self) -> Result<Address, WalletError> {
        let Some(provider) = &self.provider else {
            warn!("Connect requested without a wallet provider");
            return Err(WalletError::ProviderMissing);
        };

        let accounts = provider.request_accounts().await?;
        let account = accounts.first().copied().ok_or(WalletError::NoAccounts)?;
        info!(%account, "Wallet connected");
        Ok(account)
    }
}
