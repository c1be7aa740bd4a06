//! Headless GPU device management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue without a surface
//! - choosing the render target format the adapter can store
//! - exposing the device limits that bound the render target size

mod gpu;
mod init;

pub use gpu::{AdapterSummary, HeadlessGpu};
pub use init::{BackendChoice, HeadlessInit, LimitsPolicy};
