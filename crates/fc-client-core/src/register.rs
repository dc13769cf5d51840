//! Username claim form.

use fc_registry::RegistryCall;
use fc_types::{DirectoryUrl, Username};

use crate::error::FlowError;
use crate::submission::{Phase, StatusLine, Submission};

pub const CLAIM: &str = "Claim!";
pub const CLAIMING: &str = "Claiming...";

#[derive(Debug, Clone, Default)]
pub struct RegistrationFlow {
    username: String,
    directory_uri: String,
    submission: Submission,
}

impl RegistrationFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn directory_uri(&self) -> &str {
        &self.directory_uri
    }

    pub fn set_username(&mut self, value: &str) {
        self.username = value.to_owned();
    }

    pub fn set_directory_uri(&mut self, value: &str) {
        self.directory_uri = value.to_owned();
    }

    /// Empties the form for another account.
    pub fn reset(&mut self) {
        self.username.clear();
        self.directory_uri.clear();
        self.submission.reset();
    }

    /// The `register` call for the current inputs; `None` while either is empty.
    pub fn call(&self) -> Result<Option<RegistryCall>, FlowError> {
        if self.username.is_empty() || self.directory_uri.is_empty() {
            return Ok(None);
        }
        let username =
            Username::new(&self.username).map_err(|err| FlowError::Preparation(err.to_string()))?;
        Ok(Some(RegistryCall::Register {
            username,
            directory_url: DirectoryUrl(self.directory_uri.clone()),
        }))
    }

    /// Starts a simulation for the current inputs. Returns the call to
    /// simulate, or `None` when there is nothing to run.
    pub fn begin_prepare(&mut self) -> Option<(u64, RegistryCall)> {
        match self.call() {
            Ok(Some(call)) => Some((self.submission.begin_prepare(), call)),
            Ok(None) => {
                self.submission.invalidate();
                None
            }
            Err(err) => {
                let generation = self.submission.begin_prepare();
                self.submission.finish_prepare(generation, Err(err));
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
        self.submission.can_submit()
    }

    pub fn submit_label(&self) -> &'static str {
        if self.submission.is_busy() {
            CLAIMING
        } else {
            CLAIM
        }
    }

    pub fn phase(&self) -> Phase {
        self.submission.phase()
    }

    pub fn status_lines(&self) -> Vec<StatusLine> {
        self.submission.status_lines()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::{Preparation, StatusKind};
    use fc_registry::PreparedTx;
    use fc_types::{Address, TxHash, TxStatus};

    const ALICE: Address = Address::repeat_byte(0xa1);

    fn filled() -> RegistrationFlow {
        let mut flow = RegistrationFlow::new();
        flow.set_username("alice");
        flow.set_directory_uri("https://alice.example");
        flow
    }

    fn simulate(flow: &mut RegistrationFlow, outcome: Result<(), &str>) {
        let (generation, call) = flow.begin_prepare().expect("inputs are complete");
        let result = match outcome {
            Ok(()) => Ok(PreparedTx {
                from: ALICE,
                to: Address::repeat_byte(0xe3),
                data: call.calldata(),
                call,
                gas: None,
            }),
            Err(message) => Err(FlowError::Preparation(message.to_owned())),
        };
        assert!(flow.submission_mut().finish_prepare(generation, result));
    }

    #[test]
    fn incomplete_inputs_never_prepare() {
        let mut flow = RegistrationFlow::new();
        assert_eq!(flow.begin_prepare(), None);
        flow.set_username("alice");
        assert_eq!(flow.begin_prepare(), None);
        assert!(!flow.submit_enabled());
        assert_eq!(flow.phase(), Phase::CollectingInput);
    }

    #[test]
    fn complete_inputs_build_a_register_call() {
        let mut flow = filled();
        let (_, call) = flow.begin_prepare().unwrap();
        assert_eq!(
            call,
            RegistryCall::Register {
                username: Username::new("alice").unwrap(),
                directory_url: DirectoryUrl("https://alice.example".into()),
            }
        );
        assert!(!flow.submit_enabled());
    }

    #[test]
    fn oversized_username_is_a_preparation_error() {
        let mut flow = RegistrationFlow::new();
        flow.set_username(&"x".repeat(33));
        flow.set_directory_uri("https://alice.example");
        assert_eq!(flow.begin_prepare(), None);
        assert!(matches!(flow.submission().preparation(), Preparation::Failed(_)));
        assert!(!flow.submit_enabled());
        assert_eq!(flow.status_lines()[0].kind, StatusKind::Error);
    }

    #[test]
    fn simulation_error_is_shown_verbatim() {
        let mut flow = filled();
        simulate(&mut flow, Err("execution reverted: username taken"));
        assert!(!flow.submit_enabled());
        assert_eq!(
            flow.status_lines()[0].text,
            "execution reverted: username taken"
        );
    }

    #[test]
    fn claim_walks_through_labels() {
        let mut flow = filled();
        simulate(&mut flow, Ok(()));
        assert!(flow.submit_enabled());
        assert_eq!(flow.submit_label(), CLAIM);

        assert!(flow.submission_mut().begin_submit().is_some());
        assert_eq!(flow.submit_label(), CLAIMING);
        let hash = TxHash::repeat_byte(5);
        flow.submission_mut().finish_submit(Ok(hash));
        assert_eq!(flow.submit_label(), CLAIMING);
        assert!(!flow.submit_enabled());

        assert!(flow.submission_mut().record_status(&hash, TxStatus::Confirmed));
        assert_eq!(flow.submit_label(), CLAIM);
        assert_eq!(flow.phase(), Phase::Confirmed);
        assert_eq!(flow.status_lines()[0].text, "Success!");
    }

    #[test]
    fn form_keeps_inputs_after_failure() {
        let mut flow = filled();
        simulate(&mut flow, Ok(()));
        flow.submission_mut().begin_submit();
        flow.submission_mut()
            .finish_submit(Err(FlowError::Submission("User denied transaction signature".into())));

        assert_eq!(flow.phase(), Phase::Failed);
        assert_eq!(flow.status_lines()[0].text, "Transaction error");
        assert_eq!(flow.username(), "alice");
        assert_eq!(flow.directory_uri(), "https://alice.example");
        assert!(flow.submit_enabled());
    }

    #[test]
    fn reset_empties_the_form() {
        let mut flow = filled();
        simulate(&mut flow, Ok(()));
        flow.reset();
        assert_eq!(flow.username(), "");
        assert_eq!(flow.directory_uri(), "");
        assert!(!flow.submit_enabled());
    }
}
