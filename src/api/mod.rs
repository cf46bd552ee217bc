//! HTTP client for the GitHub Gists API.

pub mod client;

pub use client::GistClient;
