//! The gradient job: validate, render, read back, write.
//!
//! [`run`] is the whole program; [`render_gradient`] is the GPU half on its
//! own, generic over the backend so tests can instrument it.

mod config;
mod run;
mod session;

pub use config::{BackendKind, JobConfig};
pub use run::{open_backend, render_gradient, run, JobReport};
pub use session::Session;
