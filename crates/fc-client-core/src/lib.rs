//! Farcasts client state: account binding, the claim and edit forms, and
//! the page shell that picks between them.
//!
//! Everything here is UI-agnostic. A front end keeps a [`PageShell`], implements
//! [`ShellHost`] for it and calls the drivers in [`driver`].

pub mod account;
pub mod avatar;
pub mod context;
pub mod driver;
pub mod edit;
pub mod error;
pub mod register;
pub mod shell;
pub mod submission;

pub use account::{AccountBinding, Lookup, ReadRequest, ReadResult};
pub use avatar::resolve_avatar;
pub use context::ChainContext;
pub use driver::ShellHost;
pub use edit::{EditFlow, EditMode};
pub use error::FlowError;
pub use register::RegistrationFlow;
pub use shell::{Form, PageMeta, PageShell, ViewKind};
pub use submission::{Phase, Preparation, StatusKind, StatusLine, Submission};
