#![doc = "reg-publish-local-core: core publish/fetch logic for reg-publish-local."]

//! This crate contains the data models, store seam and pipelines used to publish a
//! visual-regression report tree into a key-prefixed artifact store and to fetch a
//! previously published snapshot back for the next comparison run.
//!
//! # Usage
//! Prepare a store root with [`prepare`], then [`publisher::Publisher::init`] with the
//! run's working directories and call `publish(key)` or `fetch(key)`.
//! CLI glue and config files live in the `reg-publish-local` crate.

pub mod classify;
pub mod contract;
pub mod enumerate;
pub mod error;
pub mod prepare;
pub mod progress;
pub mod publisher;
pub mod store;
pub mod transfer;

pub use error::StoreError;
