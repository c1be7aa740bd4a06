/// Source and entry points of a vertex + fragment program.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ShaderProgramDesc<'a> {
    pub label: &'a str,
    pub wgsl: &'a str,
    pub vertex_entry: &'a str,
    pub fragment_entry: &'a str,
}

impl ShaderProgramDesc<'static> {
    /// The gradient program. See `paint::gradient` for the host-side twin.
    pub const fn gradient() -> Self {
        Self {
            label: "chromafield gradient",
            wgsl: include_str!("shaders/gradient.wgsl"),
            vertex_entry: "vs_main",
            fragment_entry: "fs_main",
        }
    }
}

impl ShaderProgramDesc<'_> {
    /// Cheap pre-flight check that both entry points are declared.
    ///
    /// Real validation happens in the backend compiler; this only catches
    /// mismatched entry point names with a readable message.
    pub fn declared_entry_points(&self) -> Result<(), String> {
        for (stage, entry) in [
            ("@vertex", self.vertex_entry),
            ("@fragment", self.fragment_entry),
        ] {
            let declared = self
                .wgsl
                .split(stage)
                .skip(1)
                .any(|rest| rest.trim_start().starts_with(&format!("fn {entry}(")));
            if !declared {
                return Err(format!("no {stage} entry point named '{entry}'"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_program_declares_its_entry_points() {
        ShaderProgramDesc::gradient().declared_entry_points().unwrap();
    }

    #[test]
    fn gradient_source_uses_the_host_pi() {
        let src = ShaderProgramDesc::gradient().wgsl;
        assert!(src.contains("const PI: f32 = 3.141592;"));
    }

    #[test]
    fn misnamed_entry_point_is_reported() {
        let desc = ShaderProgramDesc {
            fragment_entry: "main",
            ..ShaderProgramDesc::gradient()
        };
        let err = desc.declared_entry_points().unwrap_err();
        assert!(err.contains("'main'"), "{err}");
    }
}
