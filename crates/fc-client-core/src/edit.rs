//! Profile view and directory URI editor for a bound account.

use fc_registry::RegistryCall;
use fc_types::{AccountInformation, Address, DirectoryUrl};

use crate::submission::{Phase, StatusLine, Submission};

pub const UPDATE: &str = "Update";
pub const UPDATING: &str = "Updating...";
pub const EDIT_BREADCRUMB: &str = " / Edit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    Display,
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AvatarState {
    Requested(Address),
    Known(Address, Option<String>),
}

#[derive(Debug, Clone, Default)]
pub struct EditFlow {
    mode: EditMode,
    draft: String,
    submission: Submission,
    avatar: Option<AvatarState>,
}

impl EditFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Enters edit mode with the on-chain value as the draft.
    pub fn begin_edit(&mut self, current: &DirectoryUrl) {
        if self.mode == EditMode::Edit {
            return;
        }
        self.mode = EditMode::Edit;
        self.draft = current.as_str().to_owned();
    }

    /// "Your Account": back to the read view, discarding the draft. Ignored
    /// while an update is in flight so its status stays visible.
    pub fn show_account(&mut self) -> bool {
        if self.submission.is_busy() {
            return false;
        }
        self.mode = EditMode::Display;
        self.draft.clear();
        self.submission.reset();
        true
    }

    /// Forgets everything tied to the previous account.
    pub fn reset(&mut self) {
        self.mode = EditMode::Display;
        self.draft.clear();
        self.submission.reset();
        self.avatar = None;
    }

    pub fn set_draft(&mut self, value: &str) {
        self.draft = value.to_owned();
    }

    pub fn breadcrumb(&self) -> &'static str {
        match self.mode {
            EditMode::Display => "",
            EditMode::Edit => EDIT_BREADCRUMB,
        }
    }

    pub fn call(&self) -> Option<RegistryCall> {
        if self.mode != EditMode::Edit || self.draft.is_empty() {
            return None;
        }
        Some(RegistryCall::Modify {
            directory_url: DirectoryUrl(self.draft.clone()),
        })
    }

    pub fn begin_prepare(&mut self) -> Option<(u64, RegistryCall)> {
        match self.call() {
            Some(call) => Some((self.submission.begin_prepare(), call)),
            None => {
                self.submission.invalidate();
                None
            }
        }
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    pub fn submission_mut(&mut self) -> &mut Submission {
        &mut self.submission
    }

    pub fn submit_enabled(&self) -> bool {
        self.mode == EditMode::Edit && self.submission.can_submit()
    }

    pub fn submit_label(&self) -> &'static str {
        if self.submission.is_busy() {
            UPDATING
        } else {
            UPDATE
        }
    }

    pub fn phase(&self) -> Phase {
        self.submission.phase()
    }

    pub fn status_lines(&self) -> Vec<StatusLine> {
        self.submission.status_lines()
    }

    /// Address whose avatar record still has to be fetched, if any.
    pub fn avatar_request(&mut self, account: &AccountInformation) -> Option<Address> {
        let address = account.address;
        match &self.avatar {
            Some(AvatarState::Requested(known) | AvatarState::Known(known, _)) if *known == address => {
                None
            }
            _ => {
                self.avatar = Some(AvatarState::Requested(address));
                Some(address)
            }
        }
    }

    pub fn set_avatar_record(&mut self, address: Address, record: Option<String>) {
        if self.avatar == Some(AvatarState::Requested(address)) {
            self.avatar = Some(AvatarState::Known(address, record));
        }
    }

    pub fn avatar_record(&self, address: &Address) -> Option<&str> {
        match &self.avatar {
            Some(AvatarState::Known(known, record)) if known == address => record.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlowError;
    use fc_registry::PreparedTx;
    use fc_types::{TxHash, TxStatus, Username};

    const BOB: Address = Address::repeat_byte(0xb0);

    fn bob() -> AccountInformation {
        AccountInformation {
            username: Username::new("bob").unwrap(),
            address: BOB,
            directory_url: DirectoryUrl("https://bob.example".into()),
        }
    }

    fn prepared(call: RegistryCall) -> Result<PreparedTx, FlowError> {
        Ok(PreparedTx {
            from: BOB,
            to: Address::repeat_byte(0xe3),
            data: call.calldata(),
            call,
            gas: None,
        })
    }

    #[test]
    fn edit_prefills_and_breadcrumb_follows_mode() {
        let mut flow = EditFlow::new();
        assert_eq!(flow.mode(), EditMode::Display);
        assert_eq!(flow.breadcrumb(), "");

        flow.begin_edit(&bob().directory_url);
        assert_eq!(flow.mode(), EditMode::Edit);
        assert_eq!(flow.draft(), "https://bob.example");
        assert_eq!(flow.breadcrumb(), " / Edit");
    }

    #[test]
    fn empty_draft_cannot_be_submitted() {
        let mut flow = EditFlow::new();
        flow.begin_edit(&bob().directory_url);
        flow.set_draft("");
        assert_eq!(flow.begin_prepare(), None);
        assert!(!flow.submit_enabled());
    }

    #[test]
    fn display_mode_never_prepares() {
        let mut flow = EditFlow::new();
        flow.set_draft("https://bob.new");
        assert_eq!(flow.call(), None);
        assert_eq!(flow.begin_prepare(), None);
    }

    #[test]
    fn your_account_discards_the_draft() {
        let mut flow = EditFlow::new();
        flow.begin_edit(&bob().directory_url);
        flow.set_draft("https://changed.example");
        assert!(flow.show_account());
        assert_eq!(flow.mode(), EditMode::Display);

        flow.begin_edit(&bob().directory_url);
        assert_eq!(flow.draft(), "https://bob.example");
    }

    #[test]
    fn discarded_draft_simulation_is_never_signed() {
        let mut flow = EditFlow::new();
        flow.begin_edit(&bob().directory_url);
        flow.set_draft("https://typo.example");
        let (stale, stale_call) = flow.begin_prepare().unwrap();

        assert!(flow.show_account());
        flow.begin_edit(&bob().directory_url);
        let (fresh, fresh_call) = flow.begin_prepare().unwrap();

        assert!(!flow.submission_mut().finish_prepare(stale, prepared(stale_call)));
        assert!(!flow.submit_enabled());
        assert!(flow.submission_mut().finish_prepare(fresh, prepared(fresh_call)));

        let tx = flow.submission_mut().begin_submit().unwrap();
        assert_eq!(
            tx.call,
            RegistryCall::Modify {
                directory_url: DirectoryUrl("https://bob.example".into()),
            }
        );
    }

    #[test]
    fn update_stays_in_edit_until_done() {
        let mut flow = EditFlow::new();
        flow.begin_edit(&bob().directory_url);
        flow.set_draft("https://bob.new");
        let (generation, call) = flow.begin_prepare().unwrap();
        flow.submission_mut().finish_prepare(generation, prepared(call));
        assert!(flow.submit_enabled());
        assert_eq!(flow.submit_label(), UPDATE);

        flow.submission_mut().begin_submit();
        let hash = TxHash::repeat_byte(6);
        flow.submission_mut().finish_submit(Ok(hash));
        assert_eq!(flow.submit_label(), UPDATING);
        assert!(!flow.show_account());
        assert_eq!(flow.mode(), EditMode::Edit);

        assert!(flow.submission_mut().record_status(&hash, TxStatus::Confirmed));
        assert_eq!(flow.status_lines()[0].text, "Success!");
        assert!(flow.show_account());
    }

    #[test]
    fn avatar_is_requested_once_per_account() {
        let mut flow = EditFlow::new();
        assert_eq!(flow.avatar_request(&bob()), Some(BOB));
        assert_eq!(flow.avatar_request(&bob()), None);
        assert_eq!(flow.avatar_record(&BOB), None);

        flow.set_avatar_record(BOB, Some("ipfs://QmBob".into()));
        assert_eq!(flow.avatar_record(&BOB), Some("ipfs://QmBob"));
        // a record for an account nobody asked about is dropped
        flow.set_avatar_record(Address::repeat_byte(0xa1), Some("ipfs://QmAlice".into()));
        assert_eq!(flow.avatar_record(&Address::repeat_byte(0xa1)), None);

        flow.reset();
        assert_eq!(flow.avatar_request(&bob()), Some(BOB));
    }
}
