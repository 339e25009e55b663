//! debsync-lib: release sync pipeline for a self-hosted Debian repository
//!
//! This crate provides the pieces the `debsync` binary composes:
//! - `release`: discovers the latest upstream release and its `.deb` assets
//! - `fetch`: downloads assets concurrently into a staging directory
//! - `config`: loads, rewrites, and atomically saves the repository config
//! - `builder`: validates and invokes the external repository builder
//! - `pipeline`: sequences one run and guarantees staging cleanup

pub mod arch;
pub mod builder;
pub mod config;
pub mod consts;
pub mod fetch;
pub mod pipeline;
pub mod release;
pub mod settings;

#[cfg(test)]
mod util;
