use wgpu::util::DeviceExt;

use crate::{
    model::{DIRECT_DRAW, INDEXED_DRAW, INDICES, VERTICES},
    shader::{ShaderProgram, ShaderSources},
    transform::TransformUniform,
};

/// GPU side of the figure: program, static mesh buffers and the transform uniform.
pub struct Renderer {
    program: ShaderProgram,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    transform_buffer: wgpu::Buffer,
    transform_bind_group: wgpu::BindGroup,
    clear_color: wgpu::Color,
}

impl Renderer {
    pub async fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        clear_color: wgpu::Color,
        sources: ShaderSources<'_>,
    ) -> Renderer {
        let program = ShaderProgram::build(device, format, sources).await;

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(VERTICES),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_SRC,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(INDICES),
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_SRC,
        });

        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Transform Buffer"),
            contents: bytemuck::bytes_of(&TransformUniform::from(glam::Mat4::IDENTITY)),
            usage: wgpu::BufferUsages::UNIFORM
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
        });

        let transform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Transform Bind Group"),
            layout: &program.transform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_buffer.as_entire_binding(),
            }],
        });

        log::debug!(
            "uploaded {} vertices and {} indices",
            VERTICES.len(),
            INDICES.len()
        );

        Self {
            program,
            vertex_buffer,
            index_buffer,
            transform_buffer,
            transform_bind_group,
            clear_color,
        }
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &wgpu::Buffer {
        &self.index_buffer
    }

    pub fn transform_buffer(&self) -> &wgpu::Buffer {
        &self.transform_buffer
    }

    pub fn write_transform(&self, queue: &wgpu::Queue, transform: glam::Mat4) {
        queue.write_buffer(
            &self.transform_buffer,
            0,
            bytemuck::bytes_of(&TransformUniform::from(transform)),
        );
    }

    /// Clears `view` and draws the figure: the indexed range first, then the plain range.
    pub fn record(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_pipeline(&self.program.pipeline);
        render_pass.set_bind_group(0, &self.transform_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(INDEXED_DRAW, 0, 0..1);
        render_pass.draw(DIRECT_DRAW, 0..1);
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        log::debug!("releasing figure buffers and shader program");
    }
}
