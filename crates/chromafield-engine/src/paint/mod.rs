//! Host-side color model.
//!
//! `gradient` is the closed-form color function the fragment shader evaluates;
//! keeping a host copy lets the software backend and tests produce reference
//! pixels without a GPU.

mod color;
pub mod gradient;

pub use color::{quantize_unorm16, Rgb};
