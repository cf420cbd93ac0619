//! Shader stage compilation and program linking.
//!
//! Failures never abort: the compiler's full message is captured, logged and
//! kept on the returned [`ShaderProgram`], and the (possibly invalid) pipeline is
//! handed back anyway.

use std::fmt;

use crate::model::Vertex;

pub const VERTEX_SOURCE: &str = include_str!("shaders/vertex.wgsl");
pub const FRAGMENT_SOURCE: &str = include_str!("shaders/fragment.wgsl");

#[derive(Debug, Copy, Clone)]
pub struct ShaderSources<'a> {
    pub vertex: &'a str,
    pub fragment: &'a str,
}

impl Default for ShaderSources<'static> {
    fn default() -> Self {
        Self {
            vertex: VERTEX_SOURCE,
            fragment: FRAGMENT_SOURCE,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn label(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "Vertex Shader",
            ShaderStage::Fragment => "Fragment Shader",
        }
    }

    fn entry_point(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vs_main",
            ShaderStage::Fragment => "fs_main",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderFailure {
    Compile(ShaderStage),
    Link,
}

/// A rejected compile or link, with the driver's message.
#[derive(Debug, Clone)]
pub struct ShaderDiagnostic {
    pub failure: ShaderFailure,
    pub message: String,
}

impl fmt::Display for ShaderDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.failure {
            ShaderFailure::Compile(ShaderStage::Vertex) => {
                write!(f, "vertex shader compilation failed:\n{}", self.message)
            }
            ShaderFailure::Compile(ShaderStage::Fragment) => {
                write!(f, "fragment shader compilation failed:\n{}", self.message)
            }
            ShaderFailure::Link => write!(f, "shader program linking failed:\n{}", self.message),
        }
    }
}

/// Joins the error entries of a compilation report, one per line.
pub fn format_compilation_errors(messages: &[wgpu::CompilationMessage]) -> Option<String> {
    let lines: Vec<String> = messages
        .iter()
        .filter(|m| m.message_type == wgpu::CompilationMessageType::Error)
        .map(|m| match &m.location {
            Some(loc) => format!("{}:{}: {}", loc.line_number, loc.line_position, m.message),
            None => m.message.clone(),
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Linked render program plus the layout its `transform` uniform binds against.
pub struct ShaderProgram {
    pub pipeline: wgpu::RenderPipeline,
    pub transform_layout: wgpu::BindGroupLayout,
    diagnostics: Vec<ShaderDiagnostic>,
}

impl ShaderProgram {
    pub async fn build(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        sources: ShaderSources<'_>,
    ) -> ShaderProgram {
        let mut diagnostics = Vec::new();

        let (vertex, err) = compile_stage(device, ShaderStage::Vertex, sources.vertex).await;
        diagnostics.extend(err);
        let (fragment, err) = compile_stage(device, ShaderStage::Fragment, sources.fragment).await;
        diagnostics.extend(err);

        let transform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Transform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = link(device, format, &transform_layout, &vertex, &fragment);
        if let Some(err) = device.pop_error_scope().await {
            let diagnostic = ShaderDiagnostic {
                failure: ShaderFailure::Link,
                message: err.to_string(),
            };
            log::error!("{diagnostic}");
            diagnostics.push(diagnostic);
        }

        // `vertex` and `fragment` modules are released here; the pipeline keeps what it needs.
        ShaderProgram {
            pipeline,
            transform_layout,
            diagnostics,
        }
    }

    pub fn diagnostics(&self) -> &[ShaderDiagnostic] {
        &self.diagnostics
    }

    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

async fn compile_stage(
    device: &wgpu::Device,
    stage: ShaderStage,
    source: &str,
) -> (wgpu::ShaderModule, Option<ShaderDiagnostic>) {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(stage.label()),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let info = module.get_compilation_info().await;
    let scope_error = device.pop_error_scope().await;

    let message = format_compilation_errors(&info.messages)
        .or_else(|| scope_error.map(|err| err.to_string()));

    let diagnostic = message.map(|message| ShaderDiagnostic {
        failure: ShaderFailure::Compile(stage),
        message,
    });
    if let Some(diagnostic) = &diagnostic {
        log::error!("{diagnostic}");
    }

    (module, diagnostic)
}

fn link(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    transform_layout: &wgpu::BindGroupLayout,
    vertex: &wgpu::ShaderModule,
    fragment: &wgpu::ShaderModule,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Render Pipeline Layout"),
        bind_group_layouts: &[transform_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Render Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: vertex,
            entry_point: Some(ShaderStage::Vertex.entry_point()),
            buffers: &[Vertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: fragment,
            entry_point: Some(ShaderStage::Fragment.entry_point()),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // The figure mixes windings.
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}
