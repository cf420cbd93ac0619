use winit::dpi::PhysicalSize;

/// Horizontal movement per frame while `A` is held. `D` applies the negation.
pub const STEP_X: f32 = -0.1;
/// Vertical movement per frame while `W` is held. `S` applies the negation.
pub const STEP_Y: f32 = 0.1;

/// Fixed application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub title: String,
    pub size: PhysicalSize<u32>,
    pub clear_color: wgpu::Color,
    pub step_x: f32,
    pub step_y: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: "Lab1".to_string(),
            size: PhysicalSize::new(800, 600),
            clear_color: wgpu::Color {
                r: 0.8,
                g: 0.8,
                b: 0.0,
                a: 1.0,
            },
            step_x: STEP_X,
            step_y: STEP_Y,
        }
    }
}
