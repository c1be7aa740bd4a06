//! Render pipeline description.
//!
//! Everything here is backend-neutral data: the quad, the shader program, the
//! target format, and the ordered command list a backend executes.
//!
//! Convention:
//! - quad vertices are clip-space positions in `[-1, 1]²`
//! - the vertex stage forwards `uv = (pos + 1) / 2` to the fragment stage

mod commands;
pub mod quad;
mod shader;
mod target;

pub use commands::{ClearColor, CommandList, RenderCommand};
pub use quad::{QuadMesh, QuadVertex};
pub use shader::ShaderProgramDesc;
pub use target::{check_target_size, TargetDesc, TargetFormat};
