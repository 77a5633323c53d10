//! Camera uniforms and how they reach each shader stage.
//!
//! Both stages consume the same parameters. [`stage_parameters`] produces the
//! named writes for a camera model, and each stage's [`ParameterMap`] places
//! them into that stage's uniform block. Names a stage does not declare are
//! skipped.

use std::collections::HashMap;

use glam::{Mat4, Vec3};
use raymarcher_core::CameraModel;

/// Parameter names shared by the WGSL source and the parameter maps.
pub mod names {
    pub const MODEL: &str = "Model";
    pub const VIEW: &str = "View";
    pub const PROJECTION: &str = "Projection";
    pub const RAY_ORIGIN: &str = "RayOrigin";
}

/// Size of one stage's uniform block, matching WGSL `StageParameters`.
pub const STAGE_UNIFORM_SIZE: usize = 208;

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Transforms cube corners.
    Vertex,
    /// Marches the ray through the volume.
    Pixel,
}

impl ShaderStage {
    /// Binding of this stage's uniform block in group 0.
    #[must_use]
    pub fn uniform_binding(self) -> u32 {
        match self {
            ShaderStage::Vertex => 0,
            ShaderStage::Pixel => 1,
        }
    }

    /// The wgpu visibility flag of this stage.
    #[must_use]
    pub fn visibility(self) -> wgpu::ShaderStages {
        match self {
            ShaderStage::Vertex => wgpu::ShaderStages::VERTEX,
            ShaderStage::Pixel => wgpu::ShaderStages::FRAGMENT,
        }
    }
}

/// A typed value for a named shader parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterValue {
    /// Column-major 4x4 matrix.
    Matrix(Mat4),
    /// Three-component vector.
    Vector(Vec3),
}

impl ParameterValue {
    fn write_to(&self, out: &mut [u8]) {
        match self {
            ParameterValue::Matrix(m) => {
                out.copy_from_slice(bytemuck::cast_slice(&m.to_cols_array()));
            }
            ParameterValue::Vector(v) => out.copy_from_slice(bytemuck::cast_slice(&v.to_array())),
        }
    }

    fn byte_size(&self) -> usize {
        match self {
            ParameterValue::Matrix(_) => 64,
            ParameterValue::Vector(_) => 12,
        }
    }
}

/// A write of one value into a named parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterWrite {
    /// Parameter name as declared in the shader.
    pub name: &'static str,
    /// Value to write.
    pub value: ParameterValue,
}

/// The camera parameters written to every stage.
#[must_use]
pub fn stage_parameters(camera: &CameraModel) -> [ParameterWrite; 4] {
    [
        ParameterWrite {
            name: names::MODEL,
            value: ParameterValue::Matrix(camera.model),
        },
        ParameterWrite {
            name: names::VIEW,
            value: ParameterValue::Matrix(camera.view),
        },
        ParameterWrite {
            name: names::PROJECTION,
            value: ParameterValue::Matrix(camera.projection),
        },
        ParameterWrite {
            name: names::RAY_ORIGIN,
            value: ParameterValue::Vector(camera.ray_origin),
        },
    ]
}

/// Byte offsets of the parameters a stage declares.
///
/// The offsets are written out by hand and must follow the WGSL
/// `StageParameters` struct; a test lays that struct out from the shader
/// source and compares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterMap {
    stage: ShaderStage,
    offsets: HashMap<&'static str, usize>,
}

impl ParameterMap {
    /// Offsets into WGSL `StageParameters` for `stage`.
    ///
    /// The vertex stage only reads the matrices, so it does not declare the
    /// ray origin.
    #[must_use]
    pub fn raymarch(stage: ShaderStage) -> Self {
        let mut offsets = HashMap::from([
            (names::MODEL, 0),
            (names::VIEW, 64),
            (names::PROJECTION, 128),
        ]);
        if stage == ShaderStage::Pixel {
            offsets.insert(names::RAY_ORIGIN, 192);
        }
        Self { stage, offsets }
    }

    /// The stage this map belongs to.
    #[must_use]
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Offset of a parameter, if the stage declares it.
    #[must_use]
    pub fn offset(&self, name: &str) -> Option<usize> {
        self.offsets.get(name).copied()
    }

    /// Packs writes into a uniform block. Undeclared names are skipped.
    #[must_use]
    pub fn pack(&self, writes: &[ParameterWrite]) -> [u8; STAGE_UNIFORM_SIZE] {
        let mut block = [0u8; STAGE_UNIFORM_SIZE];
        for write in writes {
            if let Some(offset) = self.offset(write.name) {
                let end = offset + write.value.byte_size();
                write.value.write_to(&mut block[offset..end]);
            }
        }
        block
    }
}
