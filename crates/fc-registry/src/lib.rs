//! Registry contract surface consumed by the client.
//!
//! The traits here are `?Send`: the client runs on a single-threaded event
//! loop and browser futures are not `Send`.

pub mod abi;
pub mod config;
pub mod memory;

use std::rc::Rc;

use alloy_sol_types::SolCall;
use anyhow::Result;
use async_trait::async_trait;
use fc_types::{Address, DirectoryUrl, TxHash, TxStatus, Username};

pub use abi::IRegistry;
pub use config::RegistryConfig;
pub use memory::InMemoryRegistry;

/// A state-changing registry call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryCall {
    Register {
        username: Username,
        directory_url: DirectoryUrl,
    },
    Modify {
        directory_url: DirectoryUrl,
    },
}

impl RegistryCall {
    pub fn function_name(&self) -> &'static str {
        match self {
            RegistryCall::Register { .. } => "register",
            RegistryCall::Modify { .. } => "modify",
        }
    }

    pub fn calldata(&self) -> Vec<u8> {
        match self {
            RegistryCall::Register {
                username,
                directory_url,
            } => IRegistry::registerCall {
                username: username.to_bytes32(),
                directoryUrl: directory_url.0.clone(),
            }
            .abi_encode(),
            RegistryCall::Modify { directory_url } => IRegistry::modifyCall {
                directoryUrl: directory_url.0.clone(),
            }
            .abi_encode(),
        }
    }
}

/// A call that survived simulation and is ready to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTx {
    pub from: Address,
    pub to: Address,
    pub call: RegistryCall,
    pub data: Vec<u8>,
    pub gas: Option<u64>,
}

#[async_trait(?Send)]
pub trait RegistryContract {
    async fn username_of(&self, address: &Address) -> Result<Option<Username>>;
    async fn directory_url_of(&self, username: &Username) -> Result<Option<DirectoryUrl>>;
    /// Simulates `call` from `from`. The error's message is what the user
    /// sees, so implementations keep it free of wrapping context.
    async fn prepare(&self, from: &Address, call: RegistryCall) -> Result<PreparedTx>;
    async fn transaction_status(&self, hash: &TxHash) -> Result<TxStatus>;
}

/// The wallet-side capability: account discovery and sign-and-send.
#[async_trait(?Send)]
pub trait WalletProvider {
    /// Accounts already authorised, without prompting.
    async fn accounts(&self) -> Result<Vec<Address>>;
    /// Prompts the user to connect.
    async fn request_accounts(&self) -> Result<Vec<Address>>;
    async fn ensure_chain(&self, chain_id: u64) -> Result<()>;
    async fn send_transaction(&self, tx: &PreparedTx) -> Result<TxHash>;
}

#[async_trait(?Send)]
pub trait AvatarRecords {
    async fn avatar_of(&self, address: &Address) -> Result<Option<String>>;
}

/// Avatar source for networks without a name service.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAvatars;

#[async_trait(?Send)]
impl AvatarRecords for NoAvatars {
    async fn avatar_of(&self, _address: &Address) -> Result<Option<String>> {
        Ok(None)
    }
}

// Shared handles: one wallet/registry instance is used by several components.

#[async_trait(?Send)]
impl<T: RegistryContract + ?Sized> RegistryContract for Rc<T> {
    async fn username_of(&self, address: &Address) -> Result<Option<Username>> {
        (**self).username_of(address).await
    }

    async fn directory_url_of(&self, username: &Username) -> Result<Option<DirectoryUrl>> {
        (**self).directory_url_of(username).await
    }

    async fn prepare(&self, from: &Address, call: RegistryCall) -> Result<PreparedTx> {
        (**self).prepare(from, call).await
    }

    async fn transaction_status(&self, hash: &TxHash) -> Result<TxStatus> {
        (**self).transaction_status(hash).await
    }
}

#[async_trait(?Send)]
impl<T: WalletProvider + ?Sized> WalletProvider for Rc<T> {
    async fn accounts(&self) -> Result<Vec<Address>> {
        (**self).accounts().await
    }

    async fn request_accounts(&self) -> Result<Vec<Address>> {
        (**self).request_accounts().await
    }

    async fn ensure_chain(&self, chain_id: u64) -> Result<()> {
        (**self).ensure_chain(chain_id).await
    }

    async fn send_transaction(&self, tx: &PreparedTx) -> Result<TxHash> {
        (**self).send_transaction(tx).await
    }
}

#[async_trait(?Send)]
impl<T: AvatarRecords + ?Sized> AvatarRecords for Rc<T> {
    async fn avatar_of(&self, address: &Address) -> Result<Option<String>> {
        (**self).avatar_of(address).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::hex;

    #[test]
    fn register_calldata_layout() {
        let call = RegistryCall::Register {
            username: Username::new("alice").unwrap(),
            directory_url: DirectoryUrl("https://alice.example".into()),
        };
        let data = call.calldata();
        assert_eq!(hex::encode(&data[..4]), "cf2d31fb");
        assert_eq!(&data[4..9], b"alice");
        // selector + bytes32 + offset + length + one data word
        assert_eq!(data.len(), 4 + 32 * 4);
        assert_eq!(call.function_name(), "register");

        let decoded = IRegistry::registerCall::abi_decode(&data).unwrap();
        assert_eq!(decoded.directoryUrl, "https://alice.example");
    }

    #[test]
    fn modify_calldata_layout() {
        let call = RegistryCall::Modify {
            directory_url: DirectoryUrl("https://bob.example".into()),
        };
        let data = call.calldata();
        assert_eq!(hex::encode(&data[..4]), "7f2eec02");
        let decoded = IRegistry::modifyCall::abi_decode(&data).unwrap();
        assert_eq!(decoded.directoryUrl, "https://bob.example");
    }

    #[tokio::test]
    async fn no_avatars_is_always_empty() {
        let address = Address::repeat_byte(7);
        assert_eq!(NoAvatars.avatar_of(&address).await.unwrap(), None);
    }
}
