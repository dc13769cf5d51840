pub use alloy_primitives::{Address, B256};
use alloy_primitives::hex;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const USERNAME_SLOT_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("username is {0} bytes; at most 32 fit in the registry slot")]
    UsernameTooLong(usize),
    #[error("username slot is not valid UTF-8")]
    InvalidUsernameEncoding,
}

// ── Address ──

/// Display forms the client needs beyond the EIP-55 `Display` of [`Address`].
pub trait AddressExt {
    /// Lower-case `0x` hex, the form used in RPC payloads and identicon keys.
    fn to_lower_hex(&self) -> String;
    /// `0x1234…abcd`, used by the connect control.
    fn short(&self) -> String;
}

impl AddressExt for Address {
    fn to_lower_hex(&self) -> String {
        format!("0x{}", hex::encode(self.as_slice()))
    }

    fn short(&self) -> String {
        let full = self.to_checksum(None);
        format!("{}…{}", &full[..6], &full[full.len() - 4..])
    }
}

// ── Username ──

/// A registry username. Stored on chain as a zero-padded `bytes32`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    pub fn new(name: &str) -> Result<Self, TypeError> {
        if name.len() > USERNAME_SLOT_LEN {
            return Err(TypeError::UsernameTooLong(name.len()));
        }
        Ok(Self(name.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_bytes32(&self) -> B256 {
        let mut slot = B256::ZERO;
        slot[..self.0.len()].copy_from_slice(self.0.as_bytes());
        slot
    }

    /// Decodes a registry slot. An all-zero slot is "not bound".
    pub fn from_bytes32(slot: &B256) -> Result<Option<Self>, TypeError> {
        let end = slot
            .iter()
            .rposition(|b| *b != 0)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        if end == 0 {
            return Ok(None);
        }
        let name =
            std::str::from_utf8(&slot[..end]).map_err(|_| TypeError::InvalidUsernameEncoding)?;
        Ok(Some(Self(name.to_owned())))
    }
}

impl TryFrom<String> for Username {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Directory URL ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUrl(pub String);

impl DirectoryUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DirectoryUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Account ──

/// A fully resolved registry account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInformation {
    pub username: Username,
    pub address: Address,
    pub directory_url: DirectoryUrl,
}

impl AccountInformation {
    /// Builds the account only when every part is known and non-empty.
    pub fn assemble(
        username: Option<&Username>,
        directory_url: Option<&DirectoryUrl>,
        address: Option<&Address>,
    ) -> Option<Self> {
        let username = username.filter(|u| !u.is_empty())?;
        let directory_url = directory_url.filter(|d| !d.is_empty())?;
        let address = address?;

        Some(Self {
            username: username.clone(),
            address: *address,
            directory_url: directory_url.clone(),
        })
    }
}

// ── Transactions ──

pub type TxHash = B256;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    Pending,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub hash: TxHash,
    pub status: TxStatus,
}

// ── Wallet connection ──

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected(Address),
}

impl ConnectionStatus {
    pub fn address(&self) -> Option<Address> {
        match self {
            ConnectionStatus::Connected(address) => Some(*address),
            _ => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected(_))
    }
}
