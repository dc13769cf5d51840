use std::rc::Rc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error object returned by a JSON-RPC node or an EIP-1193 provider.
///
/// Displays as the bare message so it can be shown to the user unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// A JSON-RPC endpoint: `request` resolves to the `result` member or fails
/// with an [`RpcError`].
#[async_trait(?Send)]
pub trait JsonRpcTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value>;
}

#[async_trait(?Send)]
impl<T: JsonRpcTransport + ?Sized> JsonRpcTransport for Rc<T> {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        (**self).request(method, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_object_displays_bare_message() {
        let error: RpcError = serde_json::from_value(json!({
            "code": -32000,
            "message": "insufficient funds"
        }))
        .unwrap();
        assert_eq!(error.data, None);

        let err: anyhow::Error = error.into();
        assert_eq!(err.to_string(), "insufficient funds");
        assert_eq!(err.downcast_ref::<RpcError>().map(|e| e.code), Some(-32000));
    }
}
