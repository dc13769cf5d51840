//! Page shell: decides which flow is visible.

use fc_registry::RegistryCall;
use fc_types::{AccountInformation, Address, AddressExt, ConnectionStatus, TxHash, TxStatus};
use tracing::info;

use crate::account::{AccountBinding, Lookup};
use crate::edit::EditFlow;
use crate::register::RegistrationFlow;
use crate::submission::Submission;

pub const CONNECT_WALLET: &str = "Connect Wallet";
pub const CONNECTING: &str = "Connecting…";

/// Static page metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub heading: &'static str,
    pub tagline: &'static str,
    pub learn_more_url: &'static str,
    pub credit_name: &'static str,
    pub credit_url: &'static str,
}

pub const PAGE_META: PageMeta = PageMeta {
    title: "Farcasts",
    description: "Farcaster Client",
    icon: "/favicon.ico",
    heading: "Farcasts",
    tagline: "Claim your Farcaster handle.",
    learn_more_url: "https://farcaster.xyz",
    credit_name: "Albert",
    credit_url: "https://twitter.com/AlbertPurnama",
};

/// The two transaction forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    Registration,
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewKind {
    /// Only the connect control.
    ConnectPrompt,
    Registration,
    EditAccount(AccountInformation),
    /// Connected, account reads not settled yet.
    Loading,
}

#[derive(Debug, Clone, Default)]
pub struct PageShell {
    mounted: bool,
    connection: ConnectionStatus,
    binding: AccountBinding,
    registration: RegistrationFlow,
    edit: EditFlow,
}

impl PageShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the one-time gate for wallet-dependent output.
    pub fn mount(&mut self) {
        self.mounted = true;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    pub fn set_connecting(&mut self) {
        if !self.connection.is_connected() {
            self.connection = ConnectionStatus::Connecting;
        }
    }

    pub fn connected(&mut self, address: Address) {
        if self.connection.address() != Some(address) {
            info!(%address, "account active");
            self.registration.reset();
            self.edit.reset();
        }
        self.connection = ConnectionStatus::Connected(address);
        self.binding.set_address(Some(address));
    }

    pub fn disconnected(&mut self) {
        if self.connection.is_connected() {
            info!("wallet disconnected");
        }
        self.connection = ConnectionStatus::Disconnected;
        self.binding.set_address(None);
        self.registration.reset();
        self.edit.reset();
    }

    /// Follows the wallet's `accountsChanged` notification.
    pub fn accounts_changed(&mut self, accounts: &[Address]) {
        match accounts.first() {
            Some(address) => self.connected(*address),
            None => self.disconnected(),
        }
    }

    pub fn address(&self) -> Option<Address> {
        self.connection.address()
    }

    pub fn binding(&self) -> &AccountBinding {
        &self.binding
    }

    pub fn binding_mut(&mut self) -> &mut AccountBinding {
        &mut self.binding
    }

    pub fn registration(&self) -> &RegistrationFlow {
        &self.registration
    }

    pub fn registration_mut(&mut self) -> &mut RegistrationFlow {
        &mut self.registration
    }

    pub fn edit(&self) -> &EditFlow {
        &self.edit
    }

    pub fn edit_mut(&mut self) -> &mut EditFlow {
        &mut self.edit
    }

    pub fn view(&self) -> ViewKind {
        if !self.mounted || !self.connection.is_connected() {
            return ViewKind::ConnectPrompt;
        }
        match self.binding.username() {
            Lookup::Unbound => ViewKind::Registration,
            Lookup::Loading => ViewKind::Loading,
            Lookup::Bound(_) => match self.binding.account_information() {
                Some(account) => ViewKind::EditAccount(account),
                None if matches!(self.binding.directory_url(), Lookup::Loading) => ViewKind::Loading,
                None => ViewKind::Registration,
            },
        }
    }

    pub fn connect_label(&self) -> String {
        if !self.mounted {
            return CONNECT_WALLET.to_owned();
        }
        match self.connection {
            ConnectionStatus::Disconnected => CONNECT_WALLET.to_owned(),
            ConnectionStatus::Connecting => CONNECTING.to_owned(),
            ConnectionStatus::Connected(address) => address.short(),
        }
    }

    pub fn meta(&self) -> &'static PageMeta {
        &PAGE_META
    }

    /// "Edit" on the account card.
    pub fn begin_edit(&mut self) -> bool {
        let Some(account) = self.binding.account_information() else {
            return false;
        };
        self.edit.begin_edit(&account.directory_url);
        true
    }

    pub fn submission(&self, form: Form) -> &Submission {
        match form {
            Form::Registration => self.registration.submission(),
            Form::Edit => self.edit.submission(),
        }
    }

    pub fn submission_mut(&mut self, form: Form) -> &mut Submission {
        match form {
            Form::Registration => self.registration.submission_mut(),
            Form::Edit => self.edit.submission_mut(),
        }
    }

    /// Starts a simulation of the form's current input, if it is complete.
    pub fn begin_prepare(&mut self, form: Form) -> Option<(u64, RegistryCall)> {
        match form {
            Form::Registration => self.registration.begin_prepare(),
            Form::Edit => self.edit.begin_prepare(),
        }
    }

    /// Records a receipt; a confirmation re-reads the account.
    pub fn record_status(&mut self, form: Form, hash: &TxHash, status: TxStatus) -> bool {
        let confirmed = self.submission_mut(form).record_status(hash, status);
        if confirmed {
            self.binding.refresh();
        }
        confirmed
    }
}
