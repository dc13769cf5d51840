//! EIP-1193 bridge to the injected browser wallet (`window.ethereum`).
//!
//! The same provider serves contract reads (as a JSON-RPC transport) and the
//! wallet capability (accounts, network switch, sign-and-send).

use alloy_primitives::hex;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use fc_registry::{PreparedTx, WalletProvider};
use fc_registry_rpc::{JsonRpcTransport, RpcError};
use fc_types::{Address, AddressExt, TxHash};
use js_sys::{Function, Promise, Reflect};
use serde::Serialize;
use serde_json::{Value, json};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

/// Wallet error code for "chain not added".
const UNRECOGNIZED_CHAIN: i64 = 4902;

#[derive(Serialize)]
struct RequestArguments<'a> {
    method: &'a str,
    params: &'a Value,
}

pub struct Eip1193 {
    ethereum: JsValue,
}

impl Eip1193 {
    /// The injected provider, if the page has one.
    pub fn detect() -> Option<Self> {
        let ethereum = Reflect::get(&gloo_utils::window(), &JsValue::from_str("ethereum")).ok()?;
        if ethereum.is_undefined() || ethereum.is_null() {
            return None;
        }
        Some(Self { ethereum })
    }

    async fn raw_request(&self, method: &str, params: &Value) -> Result<JsValue, JsValue> {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let args = RequestArguments { method, params }.serialize(&serializer)?;
        let request: Function = Reflect::get(&self.ethereum, &JsValue::from_str("request"))?.dyn_into()?;
        let promise: Promise = request.call1(&self.ethereum, &args)?.dyn_into()?;
        JsFuture::from(promise).await
    }

    /// Subscribes to `accountsChanged`. The closure lives as long as the page.
    pub fn on_accounts_changed<F>(&self, mut handler: F) -> Result<(), JsValue>
    where
        F: FnMut(Vec<Address>) + 'static,
    {
        let on: Function = Reflect::get(&self.ethereum, &JsValue::from_str("on"))?.dyn_into()?;
        let cb = Closure::wrap(Box::new(move |accounts: JsValue| {
            handler(parse_accounts_js(accounts));
        }) as Box<dyn FnMut(JsValue)>);
        on.call2(
            &self.ethereum,
            &JsValue::from_str("accountsChanged"),
            cb.as_ref(),
        )?;
        cb.forget();
        Ok(())
    }
}

fn parse_accounts_js(accounts: JsValue) -> Vec<Address> {
    serde_wasm_bindgen::from_value::<Value>(accounts)
        .map(|value| parse_accounts(&value))
        .unwrap_or_default()
}

fn parse_accounts(value: &Value) -> Vec<Address> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .filter_map(|raw| raw.parse().ok())
                .collect()
        })
        .unwrap_or_default()
}

fn js_string(value: &JsValue, key: &str) -> Option<String> {
    Reflect::get(value, &JsValue::from_str(key)).ok()?.as_string()
}

/// Normalises a provider rejection into an [`RpcError`].
///
/// MetaMask wraps node errors as `{code: -32603, data: {code, message, data}}`;
/// the inner error carries the revert reason, so it wins when present.
fn rpc_error(err: JsValue) -> anyhow::Error {
    let Some(message) = js_string(&err, "message") else {
        return anyhow!("{}", err.as_string().unwrap_or_else(|| format!("{err:?}")));
    };
    let code = Reflect::get(&err, &JsValue::from_str("code"))
        .ok()
        .and_then(|c| c.as_f64())
        .map(|c| c as i64)
        .unwrap_or_default();
    let data = Reflect::get(&err, &JsValue::from_str("data"))
        .ok()
        .filter(|d| !d.is_undefined() && !d.is_null())
        .and_then(|d| serde_wasm_bindgen::from_value::<Value>(d).ok());

    let error = match data {
        Some(Value::Object(inner)) if inner.get("message").and_then(Value::as_str).is_some() => {
            RpcError {
                code: inner.get("code").and_then(Value::as_i64).unwrap_or(code),
                message: inner
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or(message.as_str())
                    .to_owned(),
                data: inner.get("data").cloned(),
            }
        }
        data => RpcError {
            code,
            message,
            data,
        },
    };
    error.into()
}

#[async_trait(?Send)]
impl JsonRpcTransport for Eip1193 {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let result = self.raw_request(method, &params).await.map_err(rpc_error)?;
        if result.is_undefined() || result.is_null() {
            return Ok(Value::Null);
        }
        serde_wasm_bindgen::from_value(result).map_err(|err| anyhow!("{method} result: {err}"))
    }
}

#[async_trait(?Send)]
impl WalletProvider for Eip1193 {
    async fn accounts(&self) -> Result<Vec<Address>> {
        Ok(parse_accounts(&self.request("eth_accounts", json!([])).await?))
    }

    async fn request_accounts(&self) -> Result<Vec<Address>> {
        Ok(parse_accounts(&self.request("eth_requestAccounts", json!([])).await?))
    }

    async fn ensure_chain(&self, chain_id: u64) -> Result<()> {
        let wanted = format!("0x{chain_id:x}");
        let current = self.request("eth_chainId", json!([])).await?;
        if current.as_str().map(str::to_lowercase).as_deref() == Some(wanted.as_str()) {
            return Ok(());
        }
        match self
            .request("wallet_switchEthereumChain", json!([{ "chainId": wanted }]))
            .await
        {
            Ok(_) => Ok(()),
            Err(err) => match err.downcast_ref::<RpcError>() {
                Some(rpc) if rpc.code == UNRECOGNIZED_CHAIN => {
                    Err(anyhow!("network {chain_id} is not configured in the wallet"))
                }
                _ => Err(err),
            },
        }
    }

    async fn send_transaction(&self, tx: &PreparedTx) -> Result<TxHash> {
        let mut call = json!({
            "from": tx.from.to_lower_hex(),
            "to": tx.to.to_lower_hex(),
            "data": hex::encode_prefixed(&tx.data),
        });
        if let Some(gas) = tx.gas {
            call["gas"] = Value::String(format!("0x{gas:x}"));
        }
        let hash = self.request("eth_sendTransaction", json!([call])).await?;
        hash.as_str()
            .ok_or_else(|| anyhow!("eth_sendTransaction returned {hash}"))?
            .parse::<TxHash>()
            .map_err(|err| anyhow!("eth_sendTransaction: {err}"))
    }
}
