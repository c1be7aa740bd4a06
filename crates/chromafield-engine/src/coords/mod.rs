//! Output-space geometry.
//!
//! Two coordinate spaces meet here:
//! - pixel space: integer `(column, row)` with row 0 at the top edge
//! - normalized space: `(x, y)` in `[0, 1]²` with `y = 0` at the bottom edge,
//!   which is what the fragment stage sees as its texture coordinate

mod extent;

pub use extent::{Extent, Uv};
