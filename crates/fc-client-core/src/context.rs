use fc_registry::{
    AvatarRecords, NoAvatars, PreparedTx, RegistryCall, RegistryConfig, RegistryContract,
    WalletProvider,
};
use fc_types::{Address, TxHash, TxStatus};
use tracing::{info, warn};

use crate::account::{ReadRequest, ReadResult};
use crate::avatar;
use crate::error::FlowError;

/// Everything a component needs to reach the chain.
///
/// Built once at start-up and handed to each flow; dropped on disconnect.
pub struct ChainContext<R, W, A = NoAvatars> {
    registry: R,
    wallet: W,
    avatars: A,
    config: RegistryConfig,
}

impl<R, W> ChainContext<R, W, NoAvatars>
where
    R: RegistryContract,
    W: WalletProvider,
{
    pub fn new(registry: R, wallet: W, config: RegistryConfig) -> Self {
        Self {
            registry,
            wallet,
            avatars: NoAvatars,
            config,
        }
    }
}

impl<R, W, A> ChainContext<R, W, A>
where
    R: RegistryContract,
    W: WalletProvider,
    A: AvatarRecords,
{
    pub fn with_avatars<B: AvatarRecords>(self, avatars: B) -> ChainContext<R, W, B> {
        ChainContext {
            registry: self.registry,
            wallet: self.wallet,
            avatars,
            config: self.config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    /// Account the wallet already authorised, if any.
    pub async fn restore(&self) -> anyhow::Result<Option<Address>> {
        Ok(self.wallet.accounts().await?.into_iter().next())
    }

    /// Prompts for a connection and switches network when one is configured.
    pub async fn connect(&self) -> anyhow::Result<Address> {
        let address = self
            .wallet
            .request_accounts()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("wallet returned no accounts"))?;
        if let Some(chain_id) = self.config.chain_id {
            self.wallet.ensure_chain(chain_id).await?;
        }
        info!(%address, "wallet connected");
        Ok(address)
    }

    /// Runs one account read. Failures read as "not bound".
    pub async fn read(&self, request: ReadRequest) -> ReadResult {
        match request {
            ReadRequest::Username {
                generation,
                address,
            } => {
                let value = self
                    .registry
                    .username_of(&address)
                    .await
                    .unwrap_or_else(|err| {
                        warn!(%address, error = %err, "{}", FlowError::ReadUnavailable);
                        None
                    });
                ReadResult::Username { generation, value }
            }
            ReadRequest::DirectoryUrl {
                generation,
                username,
            } => {
                let value = self
                    .registry
                    .directory_url_of(&username)
                    .await
                    .unwrap_or_else(|err| {
                        warn!(%username, error = %err, "{}", FlowError::ReadUnavailable);
                        None
                    });
                ReadResult::DirectoryUrl { generation, value }
            }
        }
    }

    pub async fn prepare(&self, from: &Address, call: RegistryCall) -> Result<PreparedTx, FlowError> {
        self.registry
            .prepare(from, call)
            .await
            .map_err(|err| FlowError::Preparation(err.to_string()))
    }

    pub async fn send(&self, tx: &PreparedTx) -> Result<TxHash, FlowError> {
        let hash = self.wallet.send_transaction(tx).await.map_err(|err| {
            warn!(function = tx.call.function_name(), error = %err, "submission failed");
            FlowError::Submission(err.to_string())
        })?;
        info!(function = tx.call.function_name(), %hash, "transaction submitted");
        Ok(hash)
    }

    /// One receipt poll. Transport hiccups read as still pending.
    pub async fn poll(&self, hash: &TxHash) -> TxStatus {
        match self.registry.transaction_status(hash).await {
            Ok(status) => {
                if status != TxStatus::Pending {
                    info!(%hash, ?status, "transaction settled");
                }
                status
            }
            Err(err) => {
                warn!(%hash, error = %err, "receipt lookup failed, will retry");
                TxStatus::Pending
            }
        }
    }

    /// On-chain avatar record, if the name service has one.
    pub async fn avatar_record(&self, address: &Address) -> Option<String> {
        self.avatars.avatar_of(address).await.unwrap_or_else(|err| {
            warn!(%address, error = %err, "avatar lookup failed");
            None
        })
    }

    pub fn avatar_url(&self, record: Option<&str>, address: &Address) -> String {
        avatar::resolve_avatar_with(&self.config.avatar_fallback_base, record, address)
    }
}
