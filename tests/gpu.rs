//! Drives the renderer on a headless device. Each test returns early when the
//! machine has no usable adapter.

use std::iter;

use figure_mover::{
    app::AppState,
    input::{HeldKeys, process_input},
    model::{INDICES, VERTICES},
    renderer::Renderer,
    settings::Settings,
    shader::{ShaderFailure, ShaderSources, ShaderStage},
    transform::TransformUniform,
};
use winit::{event::ElementState, keyboard::KeyCode};

const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const SIZE: u32 = 64;

struct Headless {
    device: wgpu::Device,
    queue: wgpu::Queue,
    target: wgpu::Texture,
}

impl Headless {
    fn new() -> Option<Self> {
        let (device, queue) = pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions::default())
                .await
                .ok()?;
            adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: Some("Test Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: Default::default(),
                    trace: wgpu::Trace::Off,
                })
                .await
                .ok()
        })?;
        figure_mover::gpu::install_error_logger(&device);

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Test Target"),
            size: wgpu::Extent3d {
                width: SIZE,
                height: SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        Some(Self {
            device,
            queue,
            target,
        })
    }

    fn renderer(&self, sources: ShaderSources<'_>) -> Renderer {
        pollster::block_on(Renderer::new(
            &self.device,
            FORMAT,
            Settings::default().clear_color,
            sources,
        ))
    }

    fn frame(&self, renderer: &Renderer, app: &AppState) {
        let view = self
            .target
            .create_view(&wgpu::TextureViewDescriptor::default());
        renderer.write_transform(&self.queue, app.transform());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor::default());
        renderer.record(&mut encoder, &view);
        self.queue.submit(iter::once(encoder.finish()));
    }

    fn read_buffer(&self, buffer: &wgpu::Buffer) -> Vec<u8> {
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Staging"),
            size: buffer.size(),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor::default());
        encoder.copy_buffer_to_buffer(buffer, 0, &staging, 0, buffer.size());
        self.queue.submit(iter::once(encoder.finish()));

        self.map(&staging)
    }

    /// Target pixels, tightly packed RGBA rows (64 px * 4 bytes is already row-aligned).
    fn read_pixels(&self) -> Vec<u8> {
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Pixel Staging"),
            size: (SIZE * SIZE * 4) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor::default());
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(SIZE * 4),
                    rows_per_image: Some(SIZE),
                },
            },
            self.target.size(),
        );
        self.queue.submit(iter::once(encoder.finish()));

        self.map(&staging)
    }

    fn map(&self, staging: &wgpu::Buffer) -> Vec<u8> {
        let slice = staging.slice(..);
        slice.map_async(wgpu::MapMode::Read, |result| {
            result.expect("map staging buffer");
        });
        self.device
            .poll(wgpu::PollType::Wait)
            .expect("wait for GPU");
        let data = slice.get_mapped_range().to_vec();
        staging.unmap();
        data
    }
}

fn pixel(pixels: &[u8], x: u32, y: u32) -> [u8; 4] {
    let i = ((y * SIZE + x) * 4) as usize;
    [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
}

fn assert_color(actual: [u8; 4], expected: [u8; 4]) {
    let close = actual
        .iter()
        .zip(expected.iter())
        .all(|(a, e)| a.abs_diff(*e) <= 1);
    assert!(close, "expected {expected:?}, got {actual:?}");
}

const CLEAR: [u8; 4] = [204, 204, 0, 255];
const FIGURE: [u8; 4] = [0, 153, 0, 255];

fn holding(key: KeyCode) -> HeldKeys {
    let mut held = HeldKeys::default();
    held.apply(key, ElementState::Pressed);
    held
}

macro_rules! headless_or_skip {
    () => {
        match Headless::new() {
            Some(gpu) => gpu,
            None => {
                eprintln!("no GPU adapter available, skipping");
                return;
            }
        }
    };
}

#[test]
fn default_program_builds_cleanly() {
    let gpu = headless_or_skip!();
    let renderer = gpu.renderer(ShaderSources::default());
    assert!(renderer.program().is_valid());
    assert!(renderer.program().diagnostics().is_empty());
}

#[test]
fn geometry_is_unchanged_after_frames() {
    let gpu = headless_or_skip!();
    let renderer = gpu.renderer(ShaderSources::default());
    let settings = Settings::default();
    let held = holding(KeyCode::KeyD);
    let mut app = AppState::new();

    for _ in 0..10 {
        process_input(&held, &mut app, &settings);
        gpu.frame(&renderer, &app);
    }

    assert_eq!(
        gpu.read_buffer(renderer.vertex_buffer()),
        bytemuck::cast_slice::<_, u8>(VERTICES)
    );
    assert_eq!(
        gpu.read_buffer(renderer.index_buffer()),
        bytemuck::cast_slice::<_, u8>(INDICES)
    );
}

#[test]
fn five_frames_up_sets_transform_uniform() {
    let gpu = headless_or_skip!();
    let renderer = gpu.renderer(ShaderSources::default());
    let settings = Settings::default();
    let held = holding(KeyCode::KeyW);
    let mut app = AppState::new();

    for _ in 0..5 {
        process_input(&held, &mut app, &settings);
        gpu.frame(&renderer, &app);
    }

    let bytes = gpu.read_buffer(renderer.transform_buffer());
    let uniform: TransformUniform = bytemuck::pod_read_unaligned(&bytes);
    assert!(
        uniform
            .translation()
            .abs_diff_eq(glam::Vec3::new(0.0, 0.5, 0.0), 1e-5)
    );
}

#[test]
fn figure_is_drawn_over_clear_color_and_follows_offset() {
    let gpu = headless_or_skip!();
    let renderer = gpu.renderer(ShaderSources::default());
    let mut app = AppState::new();

    gpu.frame(&renderer, &app);
    let pixels = gpu.read_pixels();
    assert_color(pixel(&pixels, 0, 0), CLEAR);
    // middle of the head
    assert_color(pixel(&pixels, 14, 32), FIGURE);

    let held = holding(KeyCode::KeyW);
    let settings = Settings::default();
    for _ in 0..5 {
        process_input(&held, &mut app, &settings);
    }
    gpu.frame(&renderer, &app);
    let pixels = gpu.read_pixels();
    assert_color(pixel(&pixels, 14, 32), CLEAR);
    assert_color(pixel(&pixels, 14, 16), FIGURE);
}

#[test]
fn malformed_shader_is_reported_and_not_fatal() {
    let gpu = headless_or_skip!();
    let renderer = gpu.renderer(ShaderSources {
        vertex: "@vertex fn vs_main( -> {",
        ..ShaderSources::default()
    });

    let diagnostics = renderer.program().diagnostics();
    assert!(!renderer.program().is_valid());
    assert_eq!(
        diagnostics[0].failure,
        ShaderFailure::Compile(ShaderStage::Vertex)
    );
    assert!(!diagnostics[0].message.is_empty());
    assert!(
        diagnostics
            .iter()
            .all(|d| d.failure != ShaderFailure::Compile(ShaderStage::Fragment))
    );

    // frames still record and submit
    let app = AppState::new();
    for _ in 0..3 {
        gpu.frame(&renderer, &app);
    }
    gpu.device
        .poll(wgpu::PollType::Wait)
        .expect("wait for GPU");
}
