//! Shader registry
//!
//! Shaders are registered once, initialized against the surface, and then
//! driven through begin/render/end every frame in registration order.

use std::any::Any;

use indexmap::IndexMap;
use tracing::debug;
use wgpu::{Device, Queue, RenderPass, SurfaceConfiguration};

/// A GPU program with its own per-frame state
pub trait Shader {
    /// Unique registry key
    fn name(&self) -> &str;

    /// Creates GPU resources for the given surface
    fn init(&mut self, device: &Device, config: &SurfaceConfiguration);

    /// Uploads whatever changed since the last frame
    fn begin_frame(&mut self, device: &Device, queue: &Queue);

    /// Records draw calls into the pass
    fn render(&self, rpass: &mut RenderPass<'_>);

    /// Clears per-frame state
    fn end_frame(&mut self);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Shaders keyed by name, kept in registration order
#[derive(Default)]
pub struct ShaderRegistry {
    shaders: IndexMap<String, Box<dyn Shader>>,
}

impl ShaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a shader, replacing any shader with the same name
    pub fn register(&mut self, shader: Box<dyn Shader>) {
        let name = shader.name().to_string();
        debug!(shader = %name, "Shader registered");
        self.shaders.insert(name, shader);
    }

    pub fn init_all(&mut self, device: &Device, config: &SurfaceConfiguration) {
        for shader in self.shaders.values_mut() {
            shader.init(device, config);
        }
    }

    /// Typed access to a registered shader
    pub fn get<T: Shader + 'static>(&self, name: &str) -> Option<&T> {
        self.shaders
            .get(name)
            .and_then(|s| s.as_any().downcast_ref::<T>())
    }

    /// Typed mutable access to a registered shader
    pub fn get_mut<T: Shader + 'static>(&mut self, name: &str) -> Option<&mut T> {
        self.shaders
            .get_mut(name)
            .and_then(|s| s.as_any_mut().downcast_mut::<T>())
    }

    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.shaders.keys().map(String::as_str)
    }

    pub fn begin_frame(&mut self, device: &Device, queue: &Queue) {
        for shader in self.shaders.values_mut() {
            shader.begin_frame(device, queue);
        }
    }

    pub fn render_all(&self, rpass: &mut RenderPass<'_>) {
        for shader in self.shaders.values() {
            shader.render(rpass);
        }
    }

    pub fn end_frame(&mut self) {
        for shader in self.shaders.values_mut() {
            shader.end_frame();
        }
    }
}
