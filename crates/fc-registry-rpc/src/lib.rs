//! JSON-RPC adapter for the username registry.
//!
//! Reads go through `eth_call`, preparation is `eth_call` + `eth_estimateGas`
//! from the sender, and confirmation is a receipt lookup. The transport is
//! pluggable; the browser front end routes it through the injected wallet.

pub mod ens;
pub mod transport;

use alloy_primitives::{U64, hex};
use alloy_sol_types::SolCall;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use fc_registry::{IRegistry, PreparedTx, RegistryCall, RegistryContract, abi};
use fc_types::{Address, AddressExt, DirectoryUrl, TxHash, TxStatus, Username};
use serde_json::{Value, json};
use tracing::{debug, warn};

pub use ens::EnsAvatars;
pub use transport::{JsonRpcTransport, RpcError};

pub struct RpcRegistry<T> {
    transport: T,
    contract: Address,
}

impl<T: JsonRpcTransport> RpcRegistry<T> {
    pub fn new(transport: T, contract: Address) -> Self {
        Self {
            transport,
            contract,
        }
    }

    pub fn contract(&self) -> Address {
        self.contract
    }
}

pub(crate) fn from_hex_data(value: &Value) -> Result<Vec<u8>> {
    let text = value
        .as_str()
        .ok_or_else(|| anyhow!("expected hex string, got {value}"))?;
    hex::decode(text).with_context(|| format!("invalid hex data {text}"))
}

pub(crate) fn parse_quantity(value: &Value) -> Result<u64> {
    let quantity: U64 = serde_json::from_value(value.clone())
        .with_context(|| format!("invalid quantity {value}"))?;
    Ok(quantity.to::<u64>())
}

/// `eth_call` against the latest block, returning raw return data.
pub(crate) async fn eth_call<T: JsonRpcTransport + ?Sized>(
    transport: &T,
    from: Option<&Address>,
    to: &Address,
    data: &[u8],
) -> Result<Vec<u8>> {
    let mut call = json!({
        "to": to.to_lower_hex(),
        "data": hex::encode_prefixed(data),
    });
    if let Some(from) = from {
        call["from"] = Value::String(from.to_lower_hex());
    }
    let result = transport.request("eth_call", json!([call, "latest"])).await?;
    from_hex_data(&result)
}

/// Turns a failed simulation into the message shown beside the form.
///
/// Nodes often answer a bare "execution reverted" and put the encoded
/// `Error(string)` in `data`; the reason is appended when present.
fn preparation_error(err: anyhow::Error) -> anyhow::Error {
    let Some(rpc) = err.downcast_ref::<RpcError>() else {
        return err;
    };
    let reason = rpc
        .data
        .as_ref()
        .and_then(|data| from_hex_data(data).ok())
        .and_then(|bytes| abi::revert_reason(&bytes));

    match reason {
        Some(reason) if !rpc.message.contains(&reason) => {
            anyhow!("{}: {reason}", rpc.message)
        }
        _ => anyhow!("{}", rpc.message),
    }
}

#[async_trait(?Send)]
impl<T: JsonRpcTransport> RegistryContract for RpcRegistry<T> {
    async fn username_of(&self, address: &Address) -> Result<Option<Username>> {
        debug!(%address, "reading addressToUsername");
        let data = IRegistry::addressToUsernameCall { owner: *address }.abi_encode();
        let ret = eth_call(&self.transport, None, &self.contract, &data)
            .await
            .context("addressToUsername")?;
        if ret.is_empty() {
            return Ok(None);
        }
        let slot = IRegistry::addressToUsernameCall::abi_decode_returns(&ret)
            .context("addressToUsername return data")?;
        Ok(Username::from_bytes32(&slot)?)
    }

    async fn directory_url_of(&self, username: &Username) -> Result<Option<DirectoryUrl>> {
        debug!(%username, "reading getDirectoryUrl");
        let data = IRegistry::getDirectoryUrlCall {
            username: username.to_bytes32(),
        }
        .abi_encode();
        let ret = eth_call(&self.transport, None, &self.contract, &data)
            .await
            .context("getDirectoryUrl")?;
        if ret.is_empty() {
            return Ok(None);
        }
        let url = IRegistry::getDirectoryUrlCall::abi_decode_returns(&ret)
            .context("getDirectoryUrl return data")?;
        Ok((!url.is_empty()).then_some(DirectoryUrl(url)))
    }

    async fn prepare(&self, from: &Address, call: RegistryCall) -> Result<PreparedTx> {
        let data = call.calldata();
        eth_call(&self.transport, Some(from), &self.contract, &data)
            .await
            .map_err(preparation_error)?;

        let estimate = self
            .transport
            .request(
                "eth_estimateGas",
                json!([{
                    "from": from.to_lower_hex(),
                    "to": self.contract.to_lower_hex(),
                    "data": hex::encode_prefixed(&data),
                }]),
            )
            .await
            .map_err(preparation_error)?;
        let gas = match parse_quantity(&estimate) {
            Ok(gas) => Some(gas),
            Err(err) => {
                warn!(error = %err, "unreadable gas estimate, leaving it to the wallet");
                None
            }
        };
        debug!(function = call.function_name(), ?gas, "prepared registry call");

        Ok(PreparedTx {
            from: *from,
            to: self.contract,
            call,
            data,
            gas,
        })
    }

    async fn transaction_status(&self, hash: &TxHash) -> Result<TxStatus> {
        let receipt = self
            .transport
            .request("eth_getTransactionReceipt", json!([hash.to_string()]))
            .await
            .context("eth_getTransactionReceipt")?;

        if receipt.is_null() {
            return Ok(TxStatus::Pending);
        }
        let status = receipt
            .get("status")
            .map(parse_quantity)
            .transpose()?
            .unwrap_or(1);
        Ok(if status == 1 {
            TxStatus::Confirmed
        } else {
            TxStatus::Failed
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays scripted answers and records every request.
    #[derive(Default)]
    pub struct CannedTransport {
        answers: RefCell<VecDeque<(String, Result<Value, RpcError>)>>,
        pub log: RefCell<Vec<(String, Value)>>,
    }

    impl CannedTransport {
        pub fn answer(&self, method: &str, value: Value) {
            self.answers
                .borrow_mut()
                .push_back((method.to_owned(), Ok(value)));
        }

        pub fn fail(&self, method: &str, message: &str, data: Option<Value>) {
            self.answers.borrow_mut().push_back((
                method.to_owned(),
                Err(RpcError {
                    code: -32000,
                    message: message.to_owned(),
                    data,
                }),
            ));
        }
    }

    #[async_trait(?Send)]
    impl JsonRpcTransport for CannedTransport {
        async fn request(&self, method: &str, params: Value) -> Result<Value> {
            self.log.borrow_mut().push((method.to_owned(), params));
            let (expected, answer) = self
                .answers
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| anyhow!("no scripted answer for {method}"))?;
            assert_eq!(expected, method, "unexpected rpc method");
            answer.map_err(Into::into)
        }
    }

    pub fn word_hex(words: impl AsRef<[u8]>) -> Value {
        Value::String(hex::encode_prefixed(words))
    }
}
