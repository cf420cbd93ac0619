use glam::{Mat4, Vec3};

/// Identity translated by `(x, y, 0)`.
pub fn translation(x: f32, y: f32) -> Mat4 {
    Mat4::IDENTITY * Mat4::from_translation(Vec3::new(x, y, 0.0))
}

/// `transform` uniform as laid out in the vertex shader (column-major).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub matrix: [[f32; 4]; 4],
}

impl TransformUniform {
    pub const SIZE: wgpu::BufferAddress = std::mem::size_of::<Self>() as wgpu::BufferAddress;

    pub fn translation(&self) -> Vec3 {
        Mat4::from_cols_array_2d(&self.matrix).w_axis.truncate()
    }
}

impl From<Mat4> for TransformUniform {
    fn from(matrix: Mat4) -> Self {
        Self {
            matrix: matrix.to_cols_array_2d(),
        }
    }
}
