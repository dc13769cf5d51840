//! In-process registry and wallet.
//!
//! Mirrors the contract's observable rules closely enough to drive the client
//! flows in tests and offline demos. Failures can be scripted per stage.

use std::cell::RefCell;
use std::collections::HashMap;

use alloy_primitives::keccak256;
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use fc_types::{Address, AddressExt, DirectoryUrl, TxHash, TxStatus, Username};
use tracing::debug;

use crate::{AvatarRecords, PreparedTx, RegistryCall, RegistryContract, WalletProvider};

const SIMULATED_GAS: u64 = 90_000;

#[derive(Debug)]
struct Submitted {
    tx: PreparedTx,
    polls_left: u32,
    outcome: Option<TxStatus>,
}

#[derive(Debug, Default)]
struct Ledger {
    usernames: HashMap<Address, Username>,
    directories: HashMap<Username, DirectoryUrl>,
    avatars: HashMap<Address, String>,
    accounts: Vec<Address>,
    authorized: bool,
    chain_id: u64,
    transactions: HashMap<TxHash, Submitted>,
    nonce: u64,
    pending_polls: u32,
    read_failure: Option<String>,
    prepare_failure: Option<String>,
    send_failure: Option<String>,
    revert_on_inclusion: bool,
    read_log: Vec<String>,
    sent: usize,
}

#[derive(Debug)]
pub struct InMemoryRegistry {
    contract: Address,
    ledger: RefCell<Ledger>,
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new(Address::repeat_byte(0xe3))
    }
}

impl InMemoryRegistry {
    pub fn new(contract: Address) -> Self {
        Self {
            contract,
            ledger: RefCell::new(Ledger::default()),
        }
    }

    /// Makes `address` available to `request_accounts`.
    pub fn with_account(self, address: Address) -> Self {
        self.ledger.borrow_mut().accounts.push(address);
        self
    }

    /// Marks the wallet as already connected.
    pub fn authorize(&self) {
        self.ledger.borrow_mut().authorized = true;
    }

    /// Seeds an existing registration.
    pub fn bind(&self, address: Address, username: &str, directory_url: &str) -> Result<()> {
        let username = Username::new(username)?;
        let mut ledger = self.ledger.borrow_mut();
        ledger.usernames.insert(address, username.clone());
        ledger
            .directories
            .insert(username, DirectoryUrl(directory_url.to_owned()));
        Ok(())
    }

    pub fn set_avatar(&self, address: Address, uri: &str) {
        self.ledger.borrow_mut().avatars.insert(address, uri.to_owned());
    }

    /// Number of `Pending` answers a receipt poll gives before settling.
    pub fn confirm_after(&self, polls: u32) {
        self.ledger.borrow_mut().pending_polls = polls;
    }

    pub fn fail_reads(&self, message: &str) {
        self.ledger.borrow_mut().read_failure = Some(message.to_owned());
    }

    pub fn fail_preparation(&self, message: &str) {
        self.ledger.borrow_mut().prepare_failure = Some(message.to_owned());
    }

    pub fn fail_sends(&self, message: &str) {
        self.ledger.borrow_mut().send_failure = Some(message.to_owned());
    }

    pub fn revert_on_inclusion(&self) {
        self.ledger.borrow_mut().revert_on_inclusion = true;
    }

    pub fn clear_failures(&self) {
        let mut ledger = self.ledger.borrow_mut();
        ledger.read_failure = None;
        ledger.prepare_failure = None;
        ledger.send_failure = None;
        ledger.revert_on_inclusion = false;
    }

    /// Reads issued so far, as `function:argument`.
    pub fn read_log(&self) -> Vec<String> {
        self.ledger.borrow().read_log.clone()
    }

    pub fn sent_count(&self) -> usize {
        self.ledger.borrow().sent
    }

    pub fn chain_id(&self) -> u64 {
        self.ledger.borrow().chain_id
    }

    pub fn directory_of(&self, address: &Address) -> Option<DirectoryUrl> {
        let ledger = self.ledger.borrow();
        let username = ledger.usernames.get(address)?;
        ledger.directories.get(username).cloned()
    }

    fn check_call(ledger: &Ledger, from: &Address, call: &RegistryCall) -> Result<()> {
        match call {
            RegistryCall::Register { username, .. } => {
                if username.is_empty() {
                    bail!("execution reverted: invalid username");
                }
                if ledger.usernames.contains_key(from) {
                    bail!("execution reverted: address already registered");
                }
                if ledger.directories.contains_key(username) {
                    bail!("execution reverted: username taken");
                }
            }
            RegistryCall::Modify { .. } => {
                if !ledger.usernames.contains_key(from) {
                    bail!("execution reverted: not registered");
                }
            }
        }
        Ok(())
    }

    fn apply(ledger: &mut Ledger, from: &Address, call: &RegistryCall) {
        match call {
            RegistryCall::Register {
                username,
                directory_url,
            } => {
                ledger.usernames.insert(*from, username.clone());
                ledger
                    .directories
                    .insert(username.clone(), directory_url.clone());
            }
            RegistryCall::Modify { directory_url } => {
                if let Some(username) = ledger.usernames.get(from).cloned() {
                    ledger.directories.insert(username, directory_url.clone());
                }
            }
        }
    }
}

#[async_trait(?Send)]
impl RegistryContract for InMemoryRegistry {
    async fn username_of(&self, address: &Address) -> Result<Option<Username>> {
        let mut ledger = self.ledger.borrow_mut();
        ledger
            .read_log
            .push(format!("addressToUsername:{}", address.to_lower_hex()));
        if let Some(message) = &ledger.read_failure {
            return Err(anyhow!("{message}"));
        }
        Ok(ledger.usernames.get(address).cloned())
    }

    async fn directory_url_of(&self, username: &Username) -> Result<Option<DirectoryUrl>> {
        let mut ledger = self.ledger.borrow_mut();
        ledger.read_log.push(format!("getDirectoryUrl:{username}"));
        if let Some(message) = &ledger.read_failure {
            return Err(anyhow!("{message}"));
        }
        Ok(ledger
            .directories
            .get(username)
            .filter(|url| !url.is_empty())
            .cloned())
    }

    async fn prepare(&self, from: &Address, call: RegistryCall) -> Result<PreparedTx> {
        let ledger = self.ledger.borrow();
        if let Some(message) = &ledger.prepare_failure {
            return Err(anyhow!("{message}"));
        }
        Self::check_call(&ledger, from, &call)?;

        Ok(PreparedTx {
            from: *from,
            to: self.contract,
            data: call.calldata(),
            call,
            gas: Some(SIMULATED_GAS),
        })
    }

    async fn transaction_status(&self, hash: &TxHash) -> Result<TxStatus> {
        let mut ledger = self.ledger.borrow_mut();
        let revert = ledger.revert_on_inclusion;

        let (from, call) = {
            let submitted = ledger
                .transactions
                .get_mut(hash)
                .ok_or_else(|| anyhow!("unknown transaction {hash}"))?;
            if submitted.polls_left > 0 {
                submitted.polls_left -= 1;
                return Ok(TxStatus::Pending);
            }
            if let Some(outcome) = submitted.outcome {
                return Ok(outcome);
            }
            (submitted.tx.from, submitted.tx.call.clone())
        };

        let outcome = if revert || Self::check_call(&ledger, &from, &call).is_err() {
            TxStatus::Failed
        } else {
            Self::apply(&mut ledger, &from, &call);
            TxStatus::Confirmed
        };
        debug!(%hash, ?outcome, "in-memory transaction settled");

        if let Some(submitted) = ledger.transactions.get_mut(hash) {
            submitted.outcome = Some(outcome);
        }
        Ok(outcome)
    }
}

#[async_trait(?Send)]
impl WalletProvider for InMemoryRegistry {
    async fn accounts(&self) -> Result<Vec<Address>> {
        let ledger = self.ledger.borrow();
        if ledger.authorized {
            Ok(ledger.accounts.clone())
        } else {
            Ok(Vec::new())
        }
    }

    async fn request_accounts(&self) -> Result<Vec<Address>> {
        let mut ledger = self.ledger.borrow_mut();
        if ledger.accounts.is_empty() {
            bail!("User rejected the request.");
        }
        ledger.authorized = true;
        Ok(ledger.accounts.clone())
    }

    async fn ensure_chain(&self, chain_id: u64) -> Result<()> {
        self.ledger.borrow_mut().chain_id = chain_id;
        Ok(())
    }

    async fn send_transaction(&self, tx: &PreparedTx) -> Result<TxHash> {
        let mut ledger = self.ledger.borrow_mut();
        if let Some(message) = &ledger.send_failure {
            return Err(anyhow!("{message}"));
        }
        if !ledger.authorized || !ledger.accounts.contains(&tx.from) {
            bail!("account {} is not connected", tx.from);
        }

        ledger.nonce += 1;
        ledger.sent += 1;
        let hash: TxHash = keccak256(ledger.nonce.to_be_bytes());
        let polls_left = ledger.pending_polls;
        ledger.transactions.insert(
            hash,
            Submitted {
                tx: tx.clone(),
                polls_left,
                outcome: None,
            },
        );
        Ok(hash)
    }
}

#[async_trait(?Send)]
impl AvatarRecords for InMemoryRegistry {
    async fn avatar_of(&self, address: &Address) -> Result<Option<String>> {
        Ok(self.ledger.borrow().avatars.get(address).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: Address = Address::repeat_byte(0xa1);

    fn register(name: &str, url: &str) -> RegistryCall {
        RegistryCall::Register {
            username: Username::new(name).unwrap(),
            directory_url: DirectoryUrl(url.to_owned()),
        }
    }

    #[tokio::test]
    async fn register_settles_after_pending_polls() -> anyhow::Result<()> {
        let registry = InMemoryRegistry::default().with_account(ALICE);
        registry.authorize();
        registry.confirm_after(1);

        let tx = registry
            .prepare(&ALICE, register("alice", "https://alice.example"))
            .await?;
        let hash = registry.send_transaction(&tx).await?;

        assert_eq!(registry.transaction_status(&hash).await?, TxStatus::Pending);
        assert_eq!(registry.transaction_status(&hash).await?, TxStatus::Confirmed);
        assert_eq!(
            registry.username_of(&ALICE).await?,
            Some(Username::new("alice")?)
        );
        assert_eq!(
            registry.directory_of(&ALICE),
            Some(DirectoryUrl("https://alice.example".into()))
        );
        Ok(())
    }

    #[tokio::test]
    async fn taken_username_fails_preparation() {
        let registry = InMemoryRegistry::default().with_account(ALICE);
        registry
            .bind(Address::repeat_byte(0xb0), "bob", "https://bob.example")
            .unwrap();

        let err = registry
            .prepare(&ALICE, register("bob", "https://elsewhere.example"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "execution reverted: username taken");
    }

    #[tokio::test]
    async fn modify_requires_registration() {
        let registry = InMemoryRegistry::default();
        let call = RegistryCall::Modify {
            directory_url: DirectoryUrl("https://x.example".into()),
        };
        assert!(registry.prepare(&ALICE, call).await.is_err());
    }

    #[tokio::test]
    async fn reverted_inclusion_leaves_state_untouched() -> anyhow::Result<()> {
        let registry = InMemoryRegistry::default().with_account(ALICE);
        registry.authorize();
        registry.revert_on_inclusion();

        let tx = registry.prepare(&ALICE, register("alice", "https://a")).await?;
        let hash = registry.send_transaction(&tx).await?;
        assert_eq!(registry.transaction_status(&hash).await?, TxStatus::Failed);
        assert_eq!(registry.username_of(&ALICE).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn wallet_requires_authorisation() -> anyhow::Result<()> {
        let registry = InMemoryRegistry::default().with_account(ALICE);
        assert!(registry.accounts().await?.is_empty());
        assert_eq!(registry.request_accounts().await?, vec![ALICE]);
        assert_eq!(registry.accounts().await?, vec![ALICE]);

        let empty = InMemoryRegistry::default();
        assert!(empty.request_accounts().await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn reads_are_logged_in_order() -> anyhow::Result<()> {
        let registry = InMemoryRegistry::default();
        registry.bind(ALICE, "alice", "https://alice.example")?;
        let name = registry.username_of(&ALICE).await?.unwrap();
        registry.directory_url_of(&name).await?;
        assert_eq!(
            registry.read_log(),
            vec![
                format!("addressToUsername:{}", ALICE.to_lower_hex()),
                "getDirectoryUrl:alice".to_owned(),
            ]
        );
        Ok(())
    }
}
