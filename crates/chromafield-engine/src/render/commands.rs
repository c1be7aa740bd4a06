//! Ordered render commands.
//!
//! A [`CommandList`] is the whole frame as data. Backends execute it in order;
//! [`CommandList::validate`] runs first so a malformed list never reaches the
//! GPU.

use crate::backend::{GeometryId, ProgramId, TargetId};
use crate::error::{RenderError, RenderResult};

/// Opaque clear color (straight RGBA, `[0, 1]`).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClearColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl ClearColor {
    pub const OPAQUE_BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r,
            g: self.g,
            b: self.b,
            a: self.a,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RenderCommand {
    /// Binds `target` as the only color attachment and clears it.
    BeginPass { target: TargetId, clear: ClearColor },
    SetProgram(ProgramId),
    SetGeometry(GeometryId),
    DrawIndexed { indices: u32 },
    EndPass,
    /// Copies `target` back to host memory. Must follow the pass that drew it.
    ReadBack { target: TargetId },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandList {
    commands: Vec<RenderCommand>,
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    /// The single-pass frame: clear, draw the quad once, read it back.
    pub fn single_pass(
        target: TargetId,
        program: ProgramId,
        geometry: GeometryId,
        indices: u32,
    ) -> Self {
        let mut list = Self::new();
        list.push(RenderCommand::BeginPass {
            target,
            clear: ClearColor::OPAQUE_BLACK,
        })
        .push(RenderCommand::SetProgram(program))
        .push(RenderCommand::SetGeometry(geometry))
        .push(RenderCommand::DrawIndexed { indices })
        .push(RenderCommand::EndPass)
        .push(RenderCommand::ReadBack { target });
        list
    }

    pub fn push(&mut self, cmd: RenderCommand) -> &mut Self {
        self.commands.push(cmd);
        self
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderCommand> {
        self.commands.iter()
    }

    /// Checks pass structure and binding order.
    ///
    /// Rules:
    /// - passes do not nest, and every pass is closed
    /// - program, geometry and draws only appear inside a pass
    /// - a draw needs a program and geometry bound in the same pass
    /// - draws cover whole triangles
    /// - a readback names a target a previous pass rendered to
    pub fn validate(&self) -> RenderResult<()> {
        let mut pass: Option<TargetId> = None;
        let mut program = false;
        let mut geometry = false;
        let mut rendered: Vec<TargetId> = Vec::new();

        for (i, cmd) in self.commands.iter().enumerate() {
            match *cmd {
                RenderCommand::BeginPass { target, .. } => {
                    if let Some(open) = pass {
                        return Err(RenderError::command(format!(
                            "#{i}: pass on {target:?} begins while pass on {open:?} is open"
                        )));
                    }
                    pass = Some(target);
                    program = false;
                    geometry = false;
                }
                RenderCommand::SetProgram(_) | RenderCommand::SetGeometry(_)
                    if pass.is_none() =>
                {
                    return Err(RenderError::command(format!("#{i}: {cmd:?} outside a pass")));
                }
                RenderCommand::SetProgram(_) => program = true,
                RenderCommand::SetGeometry(_) => geometry = true,
                RenderCommand::DrawIndexed { indices } => {
                    if pass.is_none() {
                        return Err(RenderError::command(format!("#{i}: draw outside a pass")));
                    }
                    if !program || !geometry {
                        return Err(RenderError::command(format!(
                            "#{i}: draw without a bound program and geometry"
                        )));
                    }
                    if indices == 0 || indices % 3 != 0 {
                        return Err(RenderError::command(format!(
                            "#{i}: {indices} indices do not form whole triangles"
                        )));
                    }
                }
                RenderCommand::EndPass => match pass.take() {
                    Some(target) => rendered.push(target),
                    None => {
                        return Err(RenderError::command(format!("#{i}: end without a pass")));
                    }
                },
                RenderCommand::ReadBack { target } => {
                    if pass.is_some() {
                        return Err(RenderError::command(format!(
                            "#{i}: readback inside an open pass"
                        )));
                    }
                    if !rendered.contains(&target) {
                        return Err(RenderError::command(format!(
                            "#{i}: readback of {target:?} which no pass rendered"
                        )));
                    }
                }
            }
        }

        if let Some(open) = pass {
            return Err(RenderError::command(format!("pass on {open:?} never ends")));
        }
        Ok(())
    }
}
