//! ENS avatar lookup.
//!
//! Reverse-resolves the address to a primary name, checks that the name
//! resolves forward to the same address, then reads its `avatar` text record.

use alloy_primitives::{B256, hex, keccak256};
use alloy_sol_types::SolCall;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fc_registry::AvatarRecords;
use fc_registry::abi::{IEnsRegistry, IEnsResolver};
use fc_types::Address;
use tracing::debug;

use crate::{JsonRpcTransport, eth_call};

pub fn namehash(name: &str) -> B256 {
    let mut node = B256::ZERO;
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        let label_hash = keccak256(label.to_lowercase().as_bytes());
        node = keccak256([node.as_slice(), label_hash.as_slice()].concat());
    }
    node
}

pub struct EnsAvatars<T> {
    transport: T,
    registry: Address,
}

impl<T: JsonRpcTransport> EnsAvatars<T> {
    pub fn new(transport: T, registry: Address) -> Self {
        Self {
            transport,
            registry,
        }
    }

    async fn resolver(&self, node: B256) -> Result<Option<Address>> {
        let data = IEnsRegistry::resolverCall { node }.abi_encode();
        let ret = eth_call(&self.transport, None, &self.registry, &data).await?;
        if ret.is_empty() {
            return Ok(None);
        }
        let resolver =
            IEnsRegistry::resolverCall::abi_decode_returns(&ret).context("resolver return data")?;
        Ok((resolver != Address::ZERO).then_some(resolver))
    }

    async fn string_record<C>(&self, resolver: &Address, call: C) -> Result<Option<String>>
    where
        C: SolCall<Return = String>,
    {
        let ret = eth_call(&self.transport, None, resolver, &call.abi_encode()).await?;
        if ret.is_empty() {
            return Ok(None);
        }
        let value = C::abi_decode_returns(&ret)
            .with_context(|| format!("{} return data", C::SIGNATURE))?;
        Ok((!value.is_empty()).then_some(value))
    }

    async fn primary_name(&self, address: &Address) -> Result<Option<String>> {
        let reverse = format!("{}.addr.reverse", hex::encode(address.as_slice()));
        let node = namehash(&reverse);
        let Some(resolver) = self.resolver(node).await? else {
            return Ok(None);
        };
        self.string_record(&resolver, IEnsResolver::nameCall { node })
            .await
    }
}

#[async_trait(?Send)]
impl<T: JsonRpcTransport> AvatarRecords for EnsAvatars<T> {
    async fn avatar_of(&self, address: &Address) -> Result<Option<String>> {
        let Some(name) = self.primary_name(address).await? else {
            return Ok(None);
        };
        let node = namehash(&name);
        let Some(resolver) = self.resolver(node).await? else {
            return Ok(None);
        };

        let data = IEnsResolver::addrCall { node }.abi_encode();
        let ret = eth_call(&self.transport, None, &resolver, &data).await?;
        let forward =
            IEnsResolver::addrCall::abi_decode_returns(&ret).context("addr return data")?;
        if forward != *address {
            debug!(%address, ens_name = %name, "primary name does not resolve back, ignoring");
            return Ok(None);
        }

        self.string_record(
            &resolver,
            IEnsResolver::textCall {
                node,
                key: "avatar".to_owned(),
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CannedTransport, word_hex};
    use alloy_sol_types::SolValue;
    use std::rc::Rc;

    const ENS: Address = Address::repeat_byte(0xee);
    const RESOLVER_ADDR: Address = Address::repeat_byte(0x77);
    const VITALIK: Address = Address::repeat_byte(0xd8);

    fn address_word(address: Address) -> serde_json::Value {
        word_hex((address,).abi_encode_params())
    }

    fn string_word(text: &str) -> serde_json::Value {
        word_hex((text.to_owned(),).abi_encode_params())
    }

    #[test]
    fn namehash_matches_eip137() {
        assert_eq!(namehash(""), B256::ZERO);
        assert_eq!(
            hex::encode(namehash("eth")),
            "93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae"
        );
        assert_eq!(
            hex::encode(namehash("foo.eth")),
            "de9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f"
        );
    }

    #[tokio::test]
    async fn resolves_verified_avatar() -> Result<()> {
        let transport = Rc::new(CannedTransport::default());
        transport.answer("eth_call", address_word(RESOLVER_ADDR));
        transport.answer("eth_call", string_word("vitalik.eth"));
        transport.answer("eth_call", address_word(RESOLVER_ADDR));
        transport.answer("eth_call", address_word(VITALIK));
        transport.answer("eth_call", string_word("https://img.example/v.png"));

        let avatars = EnsAvatars::new(transport.clone(), ENS);
        assert_eq!(
            avatars.avatar_of(&VITALIK).await?.as_deref(),
            Some("https://img.example/v.png")
        );
        let log = transport.log.borrow();
        assert_eq!(log.len(), 5);
        let text_call = log[4].1[0]["data"].as_str().unwrap();
        assert!(text_call.starts_with(&hex::encode_prefixed(IEnsResolver::textCall::SELECTOR)));
        Ok(())
    }

    #[tokio::test]
    async fn missing_reverse_resolver_means_no_avatar() -> Result<()> {
        let transport = Rc::new(CannedTransport::default());
        transport.answer("eth_call", address_word(Address::ZERO));

        let avatars = EnsAvatars::new(transport, ENS);
        assert_eq!(avatars.avatar_of(&VITALIK).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn mismatched_forward_record_is_ignored() -> Result<()> {
        let transport = Rc::new(CannedTransport::default());
        transport.answer("eth_call", address_word(RESOLVER_ADDR));
        transport.answer("eth_call", string_word("impostor.eth"));
        transport.answer("eth_call", address_word(RESOLVER_ADDR));
        transport.answer("eth_call", address_word(Address::repeat_byte(0x01)));

        let avatars = EnsAvatars::new(transport, ENS);
        assert_eq!(avatars.avatar_of(&VITALIK).await?, None);
        Ok(())
    }
}
