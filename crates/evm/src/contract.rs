// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::ledger::{LedgerClient, LedgerError, RawPatientEvent, ReturnValues};
use crate::patient::PatientRecord;
use alloy::{
    contract::{ContractInstance, Interface},
    dyn_abi::{DynSolType, DynSolValue, EventExt, Specifier},
    hex,
    json_abi::{Event, Function},
    network::{EthereumWallet, ReceiptResponse},
    primitives::{Address, TxHash},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{BlockNumberOrTag, Filter, Log},
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use pmd_config::{ContractBinding, ADD_USER, GET_OWNER, NEW_PATIENT_ADDED};
use tracing::{debug, error, info};

fn rpc_err(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::Rpc(e.to_string())
}

fn abi_err(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::Abi(e.to_string())
}

/// Connect to a node. With a signer the provider signs transactions locally, without one
/// `eth_sendTransaction` leaves signing to the node.
pub async fn connect_provider(
    rpc_url: &str,
    signer: Option<PrivateKeySigner>,
) -> Result<DynProvider, LedgerError> {
    let provider = match signer {
        Some(signer) => ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect(rpc_url)
            .await
            .map_err(rpc_err)?
            .erased(),
        None => ProviderBuilder::new()
            .connect(rpc_url)
            .await
            .map_err(rpc_err)?
            .erased(),
    };
    Ok(provider)
}

/// The deployed patient management contract reached through an alloy provider. Calls are
/// encoded against the binding's ABI at runtime.
pub struct PatientManagementContract {
    provider: DynProvider,
    instance: ContractInstance<DynProvider>,
    binding: ContractBinding,
}

impl PatientManagementContract {
    pub fn new(provider: DynProvider, binding: ContractBinding) -> Self {
        let instance = ContractInstance::new(
            binding.address,
            provider.clone(),
            Interface::new(binding.abi.clone()),
        );
        Self {
            provider,
            instance,
            binding,
        }
    }

    pub fn address(&self) -> Address {
        self.binding.address
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    fn function(&self, name: &str) -> Result<&Function, LedgerError> {
        self.binding
            .abi
            .function(name)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| LedgerError::Abi(format!("function `{name}` is not in the ABI")))
    }

    fn event(&self) -> Result<&Event, LedgerError> {
        self.binding
            .abi
            .event(NEW_PATIENT_ADDED)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| {
                LedgerError::Abi(format!("event `{NEW_PATIENT_ADDED}` is not in the ABI"))
            })
    }
}

/// Coerce textual arguments into the function's declared parameter types
pub fn encode_args(function: &Function, args: &[String]) -> Result<Vec<DynSolValue>, LedgerError> {
    if function.inputs.len() != args.len() {
        return Err(LedgerError::Abi(format!(
            "`{}` takes {} arguments, {} given",
            function.name,
            function.inputs.len(),
            args.len()
        )));
    }

    function
        .inputs
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            let ty: DynSolType = param.resolve().map_err(abi_err)?;
            match ty {
                DynSolType::String => Ok(DynSolValue::String(arg.clone())),
                ty => ty.coerce_str(arg).map_err(|e| {
                    LedgerError::Abi(format!("argument `{}` = {:?}: {}", param.name, arg, e))
                }),
            }
        })
        .collect()
}

/// Human readable rendering of a decoded value
pub fn display_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Address(address) => address.to_string(),
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Uint(n, _) => n.to_string(),
        DynSolValue::Int(n, _) => n.to_string(),
        DynSolValue::String(s) => s.clone(),
        DynSolValue::FixedBytes(word, size) => hex::encode_prefixed(&word[..*size]),
        DynSolValue::Bytes(bytes) => hex::encode_prefixed(bytes),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            let items: Vec<String> = items.iter().map(display_value).collect();
            format!("[{}]", items.join(", "))
        }
        other => format!("{:?}", other),
    }
}

/// Decode a log into named return values following the event's declaration order
pub fn decode_patient_log(event: &Event, log: &Log) -> Result<RawPatientEvent, LedgerError> {
    let decoded = event.decode_log(log.data()).map_err(abi_err)?;
    let mut indexed = decoded.indexed.iter();
    let mut body = decoded.body.iter();

    let mut values = Vec::with_capacity(event.inputs.len());
    for (position, input) in event.inputs.iter().enumerate() {
        let value = if input.indexed {
            indexed.next()
        } else {
            body.next()
        };
        let Some(value) = value else {
            return Err(LedgerError::Abi(format!(
                "log is missing `{}`",
                input.name
            )));
        };
        let name = if input.name.is_empty() {
            position.to_string()
        } else {
            input.name.clone()
        };
        values.push((name, display_value(value)));
    }

    Ok(RawPatientEvent {
        block_number: log.block_number,
        transaction_hash: log.transaction_hash,
        return_values: ReturnValues::new(values),
    })
}

#[async_trait]
impl LedgerClient for PatientManagementContract {
    async fn owner(&self) -> Result<Address, LedgerError> {
        let output = self
            .instance
            .function(GET_OWNER, &[])
            .map_err(abi_err)?
            .call()
            .await
            .map_err(rpc_err)?;
        output
            .first()
            .and_then(|value| value.as_address())
            .ok_or(LedgerError::UnexpectedResponse(GET_OWNER))
    }

    async fn add_user(
        &self,
        from: Address,
        record: &PatientRecord,
    ) -> Result<TxHash, LedgerError> {
        let args = encode_args(self.function(ADD_USER)?, &record.call_args())?;
        debug!(%from, patient = %record.eth_address, "Sending addUser");

        let receipt = self
            .instance
            .function(ADD_USER, &args)
            .map_err(abi_err)?
            .from(from)
            .send()
            .await
            .map_err(rpc_err)?
            .get_receipt()
            .await
            .map_err(rpc_err)?;

        let tx_hash = receipt.transaction_hash();
        if !receipt.status() {
            error!(%tx_hash, "addUser reverted");
            return Err(LedgerError::Reverted(tx_hash));
        }
        info!(%tx_hash, block = ?receipt.block_number(), "addUser mined");
        Ok(tx_hash)
    }

    async fn patient_logs(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawPatientEvent>, LedgerError> {
        let event = self.event()?;
        let filter = Filter::new()
            .address(self.binding.address)
            .event_signature(event.selector())
            .from_block(from_block)
            .to_block(to_block);

        let logs = self.provider.get_logs(&filter).await.map_err(rpc_err)?;
        logs.iter()
            .map(|log| decode_patient_log(event, log))
            .collect()
    }

    async fn block_number(&self) -> Result<u64, LedgerError> {
        self.provider.get_block_number().await.map_err(rpc_err)
    }

    async fn block_timestamp(&self, block: BlockNumberOrTag) -> Result<u64, LedgerError> {
        self.provider
            .get_block_by_number(block)
            .await
            .map_err(rpc_err)?
            .map(|b| b.header.timestamp)
            .ok_or(LedgerError::BlockNotFound(block))
    }
}
