#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use
)]

pub mod backends;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod llm;
pub mod recall;
pub mod store;
pub mod vector;

pub use client::StrandkeepClient;
pub use config::Config;
pub use error::{StrandError, ValidationError};
pub use recall::{ContextPackage, RecallEngine};
