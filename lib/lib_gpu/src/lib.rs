pub use wgpu::util::{BufferInitDescriptor, DeviceExt};
pub use wgpu::*;

/// Borrowed GPU handles needed to create and fill resources.
#[derive(Debug, Clone, Copy)]
pub struct GpuContext<'a> {
    pub device: &'a Device,
    pub queue: &'a Queue,
    pub surface_format: TextureFormat,
}
