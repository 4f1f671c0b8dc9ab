//! Fleetroll compute-provider surface.
//!
//! Everything the rollout engine needs from the cloud control plane:
//! domain types for images, launch templates and managed instance groups,
//! the [`ComputeClient`] capability trait, a REST-backed implementation of
//! that trait, and a scripted in-memory mock for tests (behind the `mock`
//! feature).
//!
//! # Components
//!
//! - **`types`** — wire/domain types for the compute surface
//! - **`client`** — the `ComputeClient` capability trait
//! - **`rest`** — `RestClient`, the trait over the provider's v1 REST API
//! - **`error`** — `ComputeError` and the `ComputeResult` alias

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod rest;
pub mod types;

pub use client::ComputeClient;
pub use error::{ComputeError, ComputeResult};
pub use rest::RestClient;
pub use types::{
    AttachedDisk, CurrentAction, DiskInitializeParams, Image, InstanceGroup, InstanceTemplate,
    ManagedInstance, TemplateProperties,
};
