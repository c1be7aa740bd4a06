//! Full-screen quad geometry.

use bytemuck::{Pod, Zeroable};

use crate::error::{RenderError, RenderResult};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub pos: [f32; 2], // clip space
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

pub const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [-1.0, -1.0] },
    QuadVertex { pos: [1.0, -1.0] },
    QuadVertex { pos: [1.0, 1.0] },
    QuadVertex { pos: [-1.0, 1.0] },
];

pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

/// Indexed triangle mesh handed to a backend for upload.
#[derive(Debug, Copy, Clone)]
pub struct QuadMesh<'a> {
    pub vertices: &'a [QuadVertex],
    pub indices: &'a [u32],
}

impl QuadMesh<'static> {
    /// The quad covering all of clip space: two counter-clockwise triangles.
    pub const fn full_screen() -> Self {
        Self {
            vertices: &QUAD_VERTICES,
            indices: &QUAD_INDICES,
        }
    }
}

impl QuadMesh<'_> {
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Checks the mesh is a non-empty triangle list with in-range indices.
    pub fn validate(&self) -> RenderResult<()> {
        if self.vertices.is_empty() || self.indices.is_empty() {
            return Err(RenderError::Geometry {
                reason: "mesh has no vertices or no indices".into(),
            });
        }
        if self.indices.len() % 3 != 0 {
            return Err(RenderError::Geometry {
                reason: format!("{} indices do not form whole triangles", self.indices.len()),
            });
        }
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= self.vertices.len()) {
            return Err(RenderError::Geometry {
                reason: format!(
                    "index {bad} out of range for {} vertices",
                    self.vertices.len()
                ),
            });
        }
        Ok(())
    }

    /// Triangles as vertex position triples.
    pub fn triangles(&self) -> impl Iterator<Item = [[f32; 2]; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| {
            [
                self.vertices[t[0] as usize].pos,
                self.vertices[t[1] as usize].pos,
                self.vertices[t[2] as usize].pos,
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_area(t: [[f32; 2]; 3]) -> f32 {
        let [a, b, c] = t;
        0.5 * ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]))
    }

    #[test]
    fn full_screen_quad_is_valid() {
        let mesh = QuadMesh::full_screen();
        mesh.validate().unwrap();
        assert_eq!(mesh.index_count(), 6);
        assert_eq!(mesh.vertices.len(), 4);
    }

    #[test]
    fn full_screen_quad_covers_clip_space() {
        // Clip space is 2x2; both triangles are counter-clockwise.
        let areas: Vec<f32> = QuadMesh::full_screen().triangles().map(signed_area).collect();
        assert_eq!(areas.len(), 2);
        assert!(areas.iter().all(|&a| a > 0.0));
        assert_eq!(areas.iter().sum::<f32>(), 4.0);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mesh = QuadMesh {
            vertices: &QUAD_VERTICES,
            indices: &[0, 1, 4],
        };
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn partial_triangle_is_rejected() {
        let mesh = QuadMesh {
            vertices: &QUAD_VERTICES,
            indices: &[0, 1],
        };
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn vertex_layout_matches_struct() {
        let layout = QuadVertex::layout();
        assert_eq!(layout.array_stride, 8);
        assert_eq!(layout.attributes.len(), 1);
    }
}
