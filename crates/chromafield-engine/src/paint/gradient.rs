//! The interference gradient.
//!
//! Each channel is a slow sine band plus a faint high-frequency ripple:
//!
//! ```text
//! r = clamp(0.5(1 + sin(20πx + 5y))    + 0.1(1 + sin(50πy)),      0, 1)
//! g = clamp(0.5(1 + sin(20πy + 5x))    + 0.1(1 + sin(50πx)),      0, 1)
//! b = clamp(0.5(1 + sin(40πxy + 10x))  + 0.1(1 + sin(80π(x + y))), 0, 1)
//! ```
//!
//! `shaders/gradient.wgsl` must stay in sync with [`shade`].

use crate::coords::Uv;

use super::Rgb;

/// π as written in the shader source. Host and GPU use the same literal so
/// reference pixels agree to float precision.
pub const PI: f32 = 3.141592;

/// Evaluates the gradient at a normalized coordinate.
#[inline]
pub fn shade(uv: Uv) -> Rgb {
    let Uv { x, y } = uv;

    let mut r = 0.5 * (1.0 + (20.0 * PI * x + 5.0 * y).sin());
    let mut g = 0.5 * (1.0 + (20.0 * PI * y + 5.0 * x).sin());
    let mut b = 0.5 * (1.0 + (40.0 * PI * (x * y) + 10.0 * x).sin());

    r += 0.1 * (1.0 + (50.0 * PI * y).sin());
    g += 0.1 * (1.0 + (50.0 * PI * x).sin());
    b += 0.1 * (1.0 + (80.0 * PI * (x + y)).sin());

    Rgb::new(r, g, b).clamped()
}

/// Evaluates the gradient and quantizes to 16-bit samples.
#[inline]
pub fn shade_unorm16(uv: Uv) -> [u16; 3] {
    shade(uv).to_unorm16()
}
