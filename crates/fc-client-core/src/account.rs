//! Account directory binding.
//!
//! Two dependent reads, `addressToUsername` then `getDirectoryUrl`, kept as a
//! small query graph. Each query is re-run when its input changes or when a
//! refresh is requested; the directory query only runs once the username
//! query has settled on a bound name. Every issued read carries a generation
//! number and results from superseded reads are dropped.

use fc_types::{AccountInformation, Address, DirectoryUrl, Username};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadRequest {
    Username { generation: u64, address: Address },
    DirectoryUrl { generation: u64, username: Username },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadResult {
    Username {
        generation: u64,
        value: Option<Username>,
    },
    DirectoryUrl {
        generation: u64,
        value: Option<DirectoryUrl>,
    },
}

/// What is known about one lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a, T> {
    Loading,
    Unbound,
    Bound(&'a T),
}

#[derive(Debug, Clone)]
struct Query<T> {
    data: Option<T>,
    resolved: bool,
    stale: bool,
    in_flight: Option<u64>,
}

impl<T> Default for Query<T> {
    fn default() -> Self {
        Self {
            data: None,
            resolved: false,
            stale: false,
            in_flight: None,
        }
    }
}

impl<T> Query<T> {
    /// The input changed: forget the old answer and fetch again.
    fn reset(&mut self, needs_fetch: bool) {
        *self = Self {
            stale: needs_fetch,
            resolved: !needs_fetch,
            ..Self::default()
        };
    }

    fn ready_to_issue(&self) -> bool {
        self.stale && self.in_flight.is_none()
    }

    fn settle(&mut self, generation: u64, value: Option<T>) -> bool {
        if self.in_flight != Some(generation) {
            return false;
        }
        self.in_flight = None;
        self.data = value;
        self.resolved = true;
        true
    }

    fn lookup(&self) -> Lookup<'_, T> {
        match (&self.data, self.resolved) {
            (Some(value), _) => Lookup::Bound(value),
            (None, true) => Lookup::Unbound,
            (None, false) => Lookup::Loading,
        }
    }

    fn is_settled(&self) -> bool {
        !self.stale && self.in_flight.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccountBinding {
    address: Option<Address>,
    next_generation: u64,
    username: Query<Username>,
    directory_url: Query<DirectoryUrl>,
}

impl AccountBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(&self) -> Option<Address> {
        self.address
    }

    /// Points the binding at a (possibly different) account.
    pub fn set_address(&mut self, address: Option<Address>) {
        if self.address == address {
            return;
        }
        self.address = address;
        self.username.reset(address.is_some());
        self.directory_url.reset(false);
        self.directory_url.resolved = false;
    }

    /// Re-issues both reads, keeping the last answers visible meanwhile.
    pub fn refresh(&mut self) {
        if self.address.is_none() {
            return;
        }
        self.username.stale = true;
        if self.username.data.is_some() {
            self.directory_url.stale = true;
        }
    }

    /// The next read whose inputs are ready, in dependency order.
    pub fn next_read(&mut self) -> Option<ReadRequest> {
        let address = self.address?;

        if self.username.ready_to_issue() {
            let generation = self.issue();
            self.username.stale = false;
            self.username.in_flight = Some(generation);
            return Some(ReadRequest::Username {
                generation,
                address,
            });
        }

        if !self.username.is_settled() {
            return None;
        }
        let username = self.username.data.clone()?;
        if self.directory_url.ready_to_issue() {
            let generation = self.issue();
            self.directory_url.stale = false;
            self.directory_url.in_flight = Some(generation);
            return Some(ReadRequest::DirectoryUrl {
                generation,
                username,
            });
        }
        None
    }

    fn issue(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Applies a read result; returns `false` when it was superseded.
    pub fn apply(&mut self, result: ReadResult) -> bool {
        match result {
            ReadResult::Username { generation, value } => {
                let value = value.filter(|name| !name.is_empty());
                let previous = self.username.data.clone();
                if !self.username.settle(generation, value) {
                    debug!(generation, "dropping superseded username read");
                    return false;
                }
                let current = &self.username.data;
                if *current != previous {
                    self.directory_url.reset(current.is_some());
                } else if current.is_none() {
                    self.directory_url.reset(false);
                }
                true
            }
            ReadResult::DirectoryUrl { generation, value } => {
                let value = value.filter(|url| !url.is_empty());
                let applied = self.directory_url.settle(generation, value);
                if !applied {
                    debug!(generation, "dropping superseded directory read");
                }
                applied
            }
        }
    }

    pub fn username(&self) -> Lookup<'_, Username> {
        if self.address.is_none() {
            return Lookup::Unbound;
        }
        self.username.lookup()
    }

    pub fn directory_url(&self) -> Lookup<'_, DirectoryUrl> {
        match self.username() {
            Lookup::Bound(_) => self.directory_url.lookup(),
            Lookup::Loading => Lookup::Loading,
            Lookup::Unbound => Lookup::Unbound,
        }
    }

    /// Complete account, or nothing.
    pub fn account_information(&self) -> Option<AccountInformation> {
        AccountInformation::assemble(
            self.username.data.as_ref(),
            self.directory_url.data.as_ref(),
            self.address.as_ref(),
        )
    }

    pub fn is_settled(&self) -> bool {
        self.username.is_settled() && self.directory_url.is_settled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: Address = Address::repeat_byte(0xa1);
    const BOB: Address = Address::repeat_byte(0xb0);

    fn name(raw: &str) -> Username {
        Username::new(raw).unwrap()
    }

    fn url(raw: &str) -> DirectoryUrl {
        DirectoryUrl(raw.to_owned())
    }

    #[test]
    fn no_address_means_no_reads() {
        let mut binding = AccountBinding::new();
        assert_eq!(binding.next_read(), None);
        assert_eq!(binding.username(), Lookup::Unbound);
        assert!(binding.account_information().is_none());
    }

    #[test]
    fn directory_waits_for_a_bound_username() {
        let mut binding = AccountBinding::new();
        binding.set_address(Some(BOB));

        let Some(ReadRequest::Username { generation, .. }) = binding.next_read() else {
            panic!("expected username read first");
        };
        // nothing else may run until the username settles
        assert_eq!(binding.next_read(), None);
        assert_eq!(binding.username(), Lookup::Loading);

        binding.apply(ReadResult::Username {
            generation,
            value: Some(name("bob")),
        });
        assert_eq!(binding.directory_url(), Lookup::Loading);
        assert!(binding.account_information().is_none());

        let Some(ReadRequest::DirectoryUrl { generation, username }) = binding.next_read() else {
            panic!("expected directory read");
        };
        assert_eq!(username, name("bob"));
        binding.apply(ReadResult::DirectoryUrl {
            generation,
            value: Some(url("https://bob.example")),
        });

        let account = binding.account_information().unwrap();
        assert_eq!(account.address, BOB);
        assert_eq!(account.directory_url, url("https://bob.example"));
        assert!(binding.is_settled());
    }

    #[test]
    fn unbound_username_never_reads_directory() {
        let mut binding = AccountBinding::new();
        binding.set_address(Some(ALICE));
        let Some(ReadRequest::Username { generation, .. }) = binding.next_read() else {
            panic!("expected username read");
        };
        binding.apply(ReadResult::Username {
            generation,
            value: None,
        });
        assert_eq!(binding.next_read(), None);
        assert_eq!(binding.username(), Lookup::Unbound);
        assert_eq!(binding.directory_url(), Lookup::Unbound);
    }

    #[test]
    fn address_change_discards_inflight_result() {
        let mut binding = AccountBinding::new();
        binding.set_address(Some(BOB));
        let Some(ReadRequest::Username { generation: old, .. }) = binding.next_read() else {
            panic!("expected username read");
        };

        binding.set_address(Some(ALICE));
        assert!(!binding.apply(ReadResult::Username {
            generation: old,
            value: Some(name("bob")),
        }));
        assert_eq!(binding.username(), Lookup::Loading);

        let Some(ReadRequest::Username { address, .. }) = binding.next_read() else {
            panic!("expected a fresh username read");
        };
        assert_eq!(address, ALICE);
    }

    #[test]
    fn refresh_keeps_previous_answers_visible() {
        let mut binding = AccountBinding::new();
        binding.set_address(Some(BOB));
        let Some(ReadRequest::Username { generation, .. }) = binding.next_read() else {
            panic!()
        };
        binding.apply(ReadResult::Username {
            generation,
            value: Some(name("bob")),
        });
        let Some(ReadRequest::DirectoryUrl { generation, .. }) = binding.next_read() else {
            panic!()
        };
        binding.apply(ReadResult::DirectoryUrl {
            generation,
            value: Some(url("https://old.example")),
        });

        binding.refresh();
        assert!(binding.account_information().is_some());
        assert!(matches!(binding.next_read(), Some(ReadRequest::Username { .. })));
        assert!(binding.account_information().is_some());
    }

    #[test]
    fn failed_directory_read_settles_as_unbound() {
        let mut binding = AccountBinding::new();
        binding.set_address(Some(BOB));
        let Some(ReadRequest::Username { generation, .. }) = binding.next_read() else {
            panic!("expected username read");
        };
        binding.apply(ReadResult::Username {
            generation,
            value: Some(name("bob")),
        });
        let Some(ReadRequest::DirectoryUrl { generation, .. }) = binding.next_read() else {
            panic!("expected directory read");
        };
        binding.apply(ReadResult::DirectoryUrl {
            generation,
            value: None,
        });

        assert_eq!(binding.next_read(), None);
        assert_eq!(binding.directory_url(), Lookup::Unbound);
        assert!(binding.account_information().is_none());
        assert!(binding.is_settled());
    }
}
