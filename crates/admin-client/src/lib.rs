//! Administration client for the cooperative member-management backend
//!
//! Holds the client-side state of the admin front end: the persisted
//! session, the login exchange, the associates CRUD controller and the
//! top-level view routing.

pub mod api;
pub mod associates;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod shell;

pub use api::{ApiClient, AssociatesApi, AuthApi};
pub use associates::{AssociatesController, Confirm, Mode, Notice};
pub use auth::AuthFlow;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use shell::{route, ModuleKind, ShellState, View, ViewShell};
