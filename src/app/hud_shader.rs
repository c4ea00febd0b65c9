//! HUD shader for 2D overlay quads
//!
//! Exposes the `view_matrix`, `transform_matrix` and `color_vec4` uniforms.
//! Transform and color are latched into each queued quad, so one frame can
//! draw many quads with different transforms in a single draw call.

use std::any::Any;

use glam::{Mat4, Vec3, Vec4};
use wgpu::{
    BindGroup, Buffer, Device, Queue, RenderPass, RenderPipeline, SurfaceConfiguration,
    util::DeviceExt,
};

use super::shader_system::Shader;
use crate::error::{EngineError, Result};
use crate::sim::HitBox;

/// Registry name of the HUD shader
pub const HUD_SHADER_NAME: &str = "hud";

const HUD_SHADER: &str = r#"
struct Camera {
    projection_matrix: mat4x4<f32>,
    view_matrix: mat4x4<f32>,
}

@group(0) @binding(0)
var<uniform> camera: Camera;

struct VertexInput {
    @location(0) position: vec2<f32>,
}

struct QuadInput {
    @location(1) transform_0: vec4<f32>,
    @location(2) transform_1: vec4<f32>,
    @location(3) transform_2: vec4<f32>,
    @location(4) transform_3: vec4<f32>,
    @location(5) color_vec4: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(vertex: VertexInput, quad: QuadInput) -> VertexOutput {
    let transform_matrix = mat4x4<f32>(
        quad.transform_0,
        quad.transform_1,
        quad.transform_2,
        quad.transform_3,
    );

    var out: VertexOutput;
    out.clip_position = camera.projection_matrix * camera.view_matrix * transform_matrix
        * vec4<f32>(vertex.position, 0.0, 1.0);
    out.color = quad.color_vec4;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

/// Value accepted by [`HudShader::set_uniform`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Mat4(Mat4),
    Vec4(Vec4),
}

/// A queued quad: the unit square mapped through `transform`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudQuad {
    pub transform: Mat4,
    pub color: Vec4,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct CameraUniforms {
    projection_matrix: [[f32; 4]; 4],
    view_matrix: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct QuadVertex {
    position: [f32; 2],
}

impl QuadVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Unit square as two triangles
const UNIT_QUAD: [QuadVertex; 6] = [
    QuadVertex { position: [0.0, 0.0] },
    QuadVertex { position: [1.0, 0.0] },
    QuadVertex { position: [1.0, 1.0] },
    QuadVertex { position: [0.0, 0.0] },
    QuadVertex { position: [1.0, 1.0] },
    QuadVertex { position: [0.0, 1.0] },
];

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct QuadInstance {
    transform: [[f32; 4]; 4],
    color: [f32; 4],
}

impl QuadInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        1 => Float32x4,
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4
    ];

    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

impl From<&HudQuad> for QuadInstance {
    fn from(quad: &HudQuad) -> Self {
        Self {
            transform: quad.transform.to_cols_array_2d(),
            color: quad.color.to_array(),
        }
    }
}

struct HudGpu {
    pipeline: RenderPipeline,
    bind_group: BindGroup,
    uniform_buffer: Buffer,
    quad_buffer: Buffer,
    instance_buffer: Option<Buffer>,
    instance_count: u32,
}

/// Orthographic projection with the origin at the top-left pixel
pub fn pixel_projection(width: f32, height: f32) -> Mat4 {
    Mat4::orthographic_rh(0.0, width.max(1.0), height.max(1.0), 0.0, -1.0, 1.0)
}

/// Shader for HUD overlays
pub struct HudShader {
    projection_matrix: Mat4,
    view_matrix: Mat4,
    transform_matrix: Mat4,
    color: Vec4,
    quads: Vec<HudQuad>,
    gpu: Option<HudGpu>,
}

impl HudShader {
    /// Creates the shader with the given projection; color starts white
    pub fn new(projection_matrix: Mat4) -> Self {
        Self {
            projection_matrix,
            view_matrix: Mat4::IDENTITY,
            transform_matrix: Mat4::IDENTITY,
            color: Vec4::ONE,
            quads: Vec::new(),
            gpu: None,
        }
    }

    pub fn set_projection_matrix(&mut self, matrix: Mat4) {
        self.projection_matrix = matrix;
    }

    pub fn set_view_matrix(&mut self, matrix: Mat4) {
        self.view_matrix = matrix;
    }

    /// Sets `transform_matrix`, remembered for [`HudShader::last_transform_matrix`]
    pub fn set_transform_matrix(&mut self, matrix: Mat4) {
        self.transform_matrix = matrix;
    }

    /// Sets `color_vec4` as linear RGBA in 0..=1
    pub fn set_color(&mut self, color: Vec4) {
        self.color = color;
    }

    /// Sets `color_vec4` from 8-bit RGBA
    pub fn set_color_rgba8(&mut self, [r, g, b, a]: [u8; 4]) {
        self.color = Vec4::new(r as f32, g as f32, b as f32, a as f32) / 255.0;
    }

    pub fn last_transform_matrix(&self) -> Mat4 {
        self.transform_matrix
    }

    /// Sets a uniform by its shader name
    pub fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<()> {
        match (name, value) {
            ("projection_matrix", UniformValue::Mat4(m)) => self.set_projection_matrix(m),
            ("view_matrix", UniformValue::Mat4(m)) => self.set_view_matrix(m),
            ("transform_matrix", UniformValue::Mat4(m)) => self.set_transform_matrix(m),
            ("color_vec4", UniformValue::Vec4(c)) => self.set_color(c),
            ("projection_matrix" | "view_matrix" | "transform_matrix", _) => {
                return Err(EngineError::UniformType {
                    name: name.to_string(),
                    expected: "mat4",
                });
            }
            ("color_vec4", _) => {
                return Err(EngineError::UniformType {
                    name: name.to_string(),
                    expected: "vec4",
                });
            }
            _ => return Err(EngineError::UnknownUniform(name.to_string())),
        }
        Ok(())
    }

    /// Reads a uniform by its shader name
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        match name {
            "projection_matrix" => Some(UniformValue::Mat4(self.projection_matrix)),
            "view_matrix" => Some(UniformValue::Mat4(self.view_matrix)),
            "transform_matrix" => Some(UniformValue::Mat4(self.transform_matrix)),
            "color_vec4" => Some(UniformValue::Vec4(self.color)),
            _ => None,
        }
    }

    /// Queues the unit square under the current transform and color
    pub fn draw_quad(&mut self) {
        self.quads.push(HudQuad {
            transform: self.transform_matrix,
            color: self.color,
        });
    }

    /// Queues a quad covering `hitbox`, under the current transform
    pub fn draw_hitbox(&mut self, hitbox: &HitBox) {
        let local = Mat4::from_translation(Vec3::new(hitbox.x(), hitbox.y(), 0.0))
            * Mat4::from_scale(Vec3::new(hitbox.width(), hitbox.height(), 1.0));
        self.quads.push(HudQuad {
            transform: self.transform_matrix * local,
            color: self.color,
        });
    }

    /// Quads queued for the current frame
    pub fn queued(&self) -> &[HudQuad] {
        &self.quads
    }

    fn camera_uniforms(&self) -> CameraUniforms {
        CameraUniforms {
            projection_matrix: self.projection_matrix.to_cols_array_2d(),
            view_matrix: self.view_matrix.to_cols_array_2d(),
        }
    }
}

impl Shader for HudShader {
    fn name(&self) -> &str {
        HUD_SHADER_NAME
    }

    fn init(&mut self, device: &Device, config: &SurfaceConfiguration) {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("HUD Uniform Buffer"),
            contents: bytemuck::cast_slice(&[self.camera_uniforms()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("HUD Quad Buffer"),
            contents: bytemuck::cast_slice(&UNIT_QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("HUD Bind Group Layout"),
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

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("HUD Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("HUD Shader"),
            source: wgpu::ShaderSource::Wgsl(HUD_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("HUD Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("HUD Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[QuadVertex::desc(), QuadInstance::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
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
        });

        self.gpu = Some(HudGpu {
            pipeline,
            bind_group,
            uniform_buffer,
            quad_buffer,
            instance_buffer: None,
            instance_count: 0,
        });
    }

    fn begin_frame(&mut self, device: &Device, queue: &Queue) {
        let uniforms = self.camera_uniforms();
        let instances: Vec<QuadInstance> = self.quads.iter().map(QuadInstance::from).collect();

        let Some(gpu) = &mut self.gpu else {
            return;
        };

        queue.write_buffer(&gpu.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        gpu.instance_count = instances.len() as u32;
        gpu.instance_buffer = if instances.is_empty() {
            None
        } else {
            Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("HUD Instance Buffer"),
                contents: bytemuck::cast_slice(&instances),
                usage: wgpu::BufferUsages::VERTEX,
            }))
        };
    }

    fn render(&self, rpass: &mut RenderPass<'_>) {
        let Some(gpu) = &self.gpu else {
            return;
        };
        let Some(instances) = &gpu.instance_buffer else {
            return;
        };

        rpass.set_pipeline(&gpu.pipeline);
        rpass.set_bind_group(0, &gpu.bind_group, &[]);
        rpass.set_vertex_buffer(0, gpu.quad_buffer.slice(..));
        rpass.set_vertex_buffer(1, instances.slice(..));
        rpass.draw(0..UNIT_QUAD.len() as u32, 0..gpu.instance_count);
    }

    fn end_frame(&mut self) {
        self.quads.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_white_with_identity_matrices() {
        let shader = HudShader::new(Mat4::IDENTITY);
        assert_eq!(shader.uniform("color_vec4"), Some(UniformValue::Vec4(Vec4::ONE)));
        assert_eq!(shader.last_transform_matrix(), Mat4::IDENTITY);
        assert_eq!(
            shader.uniform("view_matrix"),
            Some(UniformValue::Mat4(Mat4::IDENTITY))
        );
    }

    #[test]
    fn test_transform_is_remembered() {
        let mut shader = HudShader::new(Mat4::IDENTITY);
        let m = Mat4::from_translation(Vec3::new(4.0, 5.0, 0.0));
        shader.set_transform_matrix(m);
        assert_eq!(shader.last_transform_matrix(), m);
    }

    #[test]
    fn test_set_uniform_by_name() {
        let mut shader = HudShader::new(Mat4::IDENTITY);
        let view = Mat4::from_scale(Vec3::splat(2.0));
        let red = Vec4::new(1.0, 0.0, 0.0, 1.0);

        shader
            .set_uniform("view_matrix", UniformValue::Mat4(view))
            .unwrap();
        shader
            .set_uniform("color_vec4", UniformValue::Vec4(red))
            .unwrap();

        assert_eq!(shader.uniform("view_matrix"), Some(UniformValue::Mat4(view)));
        assert_eq!(shader.uniform("color_vec4"), Some(UniformValue::Vec4(red)));
    }

    #[test]
    fn test_set_uniform_rejects_unknown_and_mismatched() {
        let mut shader = HudShader::new(Mat4::IDENTITY);

        assert!(matches!(
            shader.set_uniform("light_dir", UniformValue::Vec4(Vec4::ZERO)),
            Err(EngineError::UnknownUniform(_))
        ));
        assert!(matches!(
            shader.set_uniform("color_vec4", UniformValue::Mat4(Mat4::IDENTITY)),
            Err(EngineError::UniformType { expected: "vec4", .. })
        ));
        assert!(matches!(
            shader.set_uniform("transform_matrix", UniformValue::Vec4(Vec4::ONE)),
            Err(EngineError::UniformType { expected: "mat4", .. })
        ));
    }

    #[test]
    fn test_rgba8_color() {
        let mut shader = HudShader::new(Mat4::IDENTITY);
        shader.set_color_rgba8([255, 0, 51, 255]);
        assert_eq!(
            shader.uniform("color_vec4"),
            Some(UniformValue::Vec4(Vec4::new(1.0, 0.0, 0.2, 1.0)))
        );
    }

    #[test]
    fn test_quads_latch_current_state() {
        let mut shader = HudShader::new(Mat4::IDENTITY);
        let red = Vec4::new(1.0, 0.0, 0.0, 1.0);

        shader.draw_quad();
        shader.set_color(red);
        shader.draw_hitbox(&HitBox::new(10.0, 20.0, 30.0, 40.0));

        let quads = shader.queued();
        assert_eq!(quads.len(), 2);
        assert_eq!(quads[0].color, Vec4::ONE);
        assert_eq!(quads[1].color, red);

        let corner = quads[1].transform.transform_point3(Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(corner, Vec3::new(40.0, 60.0, 0.0));
    }

    #[test]
    fn test_end_frame_clears_queue() {
        let mut shader = HudShader::new(Mat4::IDENTITY);
        shader.draw_quad();
        shader.end_frame();
        assert!(shader.queued().is_empty());
    }

    #[test]
    fn test_pixel_projection_maps_corners() {
        let projection = pixel_projection(800.0, 600.0);
        let top_left = projection.project_point3(Vec3::ZERO);
        let bottom_right = projection.project_point3(Vec3::new(800.0, 600.0, 0.0));
        assert!((top_left.x + 1.0).abs() < 1e-5 && (top_left.y - 1.0).abs() < 1e-5);
        assert!((bottom_right.x - 1.0).abs() < 1e-5 && (bottom_right.y + 1.0).abs() < 1e-5);
    }
}
