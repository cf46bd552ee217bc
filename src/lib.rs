//! Client library for the GitHub Gists API.
//!
//! [`GistClient`] covers the create, list, get, edit and delete endpoints
//! with Basic auth; [`Gist`] is the typed form of API responses. The binary
//! in `main.rs` wires these up behind a small set of subcommands.

pub mod api;
pub mod commands;
pub mod error;
pub mod models;

pub use api::GistClient;
pub use error::{Error, Result};
pub use models::{FileEdit, FileEdits, Gist, GistFile, GistOwner};
