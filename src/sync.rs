use std::marker::PhantomData;

use bytemuck::Pod;
use wgpu::util::DeviceExt;

use crate::{
    error::{Error, Result},
    scene::{BoxObject, GlobalScene, LightDirect, LightPoint, Scene, SceneObject, Sphere, Surface},
    shader::UniformBlocks,
};

/// Name and binding point of one uniform block. The numbering is shared with
/// `asset/shader/raytrace.wgsl` and must change together with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSlot {
    pub name: &'static str,
    pub binding: u32,
}

pub const SCENE_SLOT: BufferSlot = BufferSlot {
    name: "scene_buf",
    binding: 0,
};
pub const SPHERES_SLOT: BufferSlot = BufferSlot {
    name: "spheres_buf",
    binding: 1,
};
pub const SURFACES_SLOT: BufferSlot = BufferSlot {
    name: "surfaces_buf",
    binding: 3,
};
pub const BOXES_SLOT: BufferSlot = BufferSlot {
    name: "boxes_buf",
    binding: 4,
};
pub const LIGHTS_POINT_SLOT: BufferSlot = BufferSlot {
    name: "lights_point_buf",
    binding: 7,
};
pub const LIGHTS_DIRECT_SLOT: BufferSlot = BufferSlot {
    name: "lights_direct_buf",
    binding: 8,
};

/// Bind group the scene blocks live in.
pub const SCENE_GROUP: u32 = 0;

/// GPU side of buffer synchronization.
pub trait BufferBackend {
    type Buffer;

    /// Allocate a uniform buffer of `size` bytes, optionally filled with `contents`.
    fn create_buffer(
        &mut self,
        slot: BufferSlot,
        size: u64,
        contents: Option<&[u8]>,
    ) -> Result<Self::Buffer>;

    /// Overwrite the buffer from offset zero.
    fn write_buffer(&mut self, buffer: &Self::Buffer, data: &[u8]);
}

/// A backend buffer typed by the record it holds.
pub struct UniformBuffer<B, T> {
    buffer: B,
    slot: BufferSlot,
    len: usize,
    _marker: PhantomData<fn(&T)>,
}

impl<B, T: Pod> UniformBuffer<B, T> {
    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    pub fn slot(&self) -> BufferSlot {
        self.slot
    }

    /// Number of records the buffer was sized for.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn byte_size(&self) -> u64 {
        (std::mem::size_of::<T>() * self.len.max(1)) as u64
    }
}

fn resolve_slot(blocks: &UniformBlocks, slot: BufferSlot) -> Result<()> {
    let block = blocks.resolve(slot.name)?;
    if block.group != SCENE_GROUP || block.binding != slot.binding {
        return Err(Error::BindingMismatch {
            name: slot.name.to_owned(),
            expected: slot.binding,
            found: block.binding,
        });
    }
    Ok(())
}

/// Reserve a buffer for a record that is written before its first use.
pub fn bind_record<Bk: BufferBackend, T: Pod>(
    backend: &mut Bk,
    blocks: &UniformBlocks,
    slot: BufferSlot,
) -> Result<UniformBuffer<Bk::Buffer, T>> {
    resolve_slot(blocks, slot)?;
    let size = std::mem::size_of::<T>() as u64;
    let buffer = backend.create_buffer(slot, size, None)?;
    tracing::info!(name = slot.name, binding = slot.binding, size, "bound record");
    Ok(UniformBuffer {
        buffer,
        slot,
        len: 1,
        _marker: PhantomData,
    })
}

/// Allocate a buffer sized to `items` and upload them.
///
/// An empty collection still gets one zeroed element of storage, since the
/// shader array cannot be empty; nothing is ever written to it.
pub fn bind_collection<Bk: BufferBackend, T: Pod>(
    backend: &mut Bk,
    blocks: &UniformBlocks,
    slot: BufferSlot,
    items: &[T],
) -> Result<UniformBuffer<Bk::Buffer, T>> {
    resolve_slot(blocks, slot)?;
    let placeholder;
    let contents: &[u8] = if items.is_empty() {
        placeholder = vec![0u8; std::mem::size_of::<T>()];
        &placeholder
    } else {
        bytemuck::cast_slice(items)
    };
    let size = contents.len() as u64;
    let buffer = backend.create_buffer(slot, size, Some(contents))?;
    tracing::info!(
        name = slot.name,
        binding = slot.binding,
        count = items.len(),
        size,
        "bound collection"
    );
    Ok(UniformBuffer {
        buffer,
        slot,
        len: items.len(),
        _marker: PhantomData,
    })
}

pub fn push_record<Bk: BufferBackend, T: Pod>(
    backend: &mut Bk,
    buffer: &UniformBuffer<Bk::Buffer, T>,
    record: &T,
) {
    backend.write_buffer(&buffer.buffer, bytemuck::bytes_of(record));
}

/// Re-upload a whole collection. Empty collections are skipped.
///
/// The collection must still have the length the buffer was bound with.
pub fn push_collection<Bk: BufferBackend, T: Pod>(
    backend: &mut Bk,
    buffer: &UniformBuffer<Bk::Buffer, T>,
    items: &[T],
) {
    if items.is_empty() {
        return;
    }
    debug_assert_eq!(
        items.len(),
        buffer.len,
        "{} changed size after binding",
        buffer.slot.name
    );
    backend.write_buffer(&buffer.buffer, bytemuck::cast_slice(items));
}

/// The six buffers backing one scene. Sized once at bind, then fully
/// re-uploaded every frame.
pub struct SceneBuffers<B> {
    pub scene: UniformBuffer<B, GlobalScene>,
    pub spheres: UniformBuffer<B, Sphere>,
    pub surfaces: UniformBuffer<B, Surface>,
    pub boxes: UniformBuffer<B, BoxObject>,
    pub lights_point: UniformBuffer<B, LightPoint>,
    pub lights_direct: UniformBuffer<B, LightDirect>,
}

impl<B> SceneBuffers<B> {
    pub fn bind<Bk>(backend: &mut Bk, blocks: &UniformBlocks, scene: &Scene) -> Result<Self>
    where
        Bk: BufferBackend<Buffer = B>,
    {
        Ok(Self {
            scene: bind_record(backend, blocks, SCENE_SLOT)?,
            spheres: bind_objects(backend, blocks, SPHERES_SLOT, scene)?,
            surfaces: bind_objects(backend, blocks, SURFACES_SLOT, scene)?,
            boxes: bind_objects(backend, blocks, BOXES_SLOT, scene)?,
            lights_point: bind_objects(backend, blocks, LIGHTS_POINT_SLOT, scene)?,
            lights_direct: bind_objects(backend, blocks, LIGHTS_DIRECT_SLOT, scene)?,
        })
    }

    /// Per-frame upload of the whole scene.
    pub fn push<Bk>(&self, backend: &mut Bk, scene: &Scene)
    where
        Bk: BufferBackend<Buffer = B>,
    {
        push_record(backend, &self.scene, &scene.global);
        push_collection(backend, &self.spheres, scene.spheres());
        push_collection(backend, &self.surfaces, scene.surfaces());
        push_collection(backend, &self.boxes, scene.boxes());
        push_collection(backend, &self.lights_point, scene.lights_point());
        push_collection(backend, &self.lights_direct, scene.lights_direct());
    }

    /// `(binding, buffer)` for each block, in binding order.
    pub fn entries(&self) -> [(u32, &B); 6] {
        [
            (self.scene.slot.binding, &self.scene.buffer),
            (self.spheres.slot.binding, &self.spheres.buffer),
            (self.surfaces.slot.binding, &self.surfaces.buffer),
            (self.boxes.slot.binding, &self.boxes.buffer),
            (self.lights_point.slot.binding, &self.lights_point.buffer),
            (self.lights_direct.slot.binding, &self.lights_direct.buffer),
        ]
    }
}

fn bind_objects<Bk: BufferBackend, T: SceneObject>(
    backend: &mut Bk,
    blocks: &UniformBlocks,
    slot: BufferSlot,
    scene: &Scene,
) -> Result<UniformBuffer<Bk::Buffer, T>> {
    bind_collection(backend, blocks, slot, scene.objects::<T>())
}

pub struct WgpuBackend<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
}

impl<'a> WgpuBackend<'a> {
    pub fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue) -> Self {
        Self { device, queue }
    }
}

impl BufferBackend for WgpuBackend<'_> {
    type Buffer = wgpu::Buffer;

    fn create_buffer(
        &mut self,
        slot: BufferSlot,
        size: u64,
        contents: Option<&[u8]>,
    ) -> Result<wgpu::Buffer> {
        let limit = self.device.limits().max_uniform_buffer_binding_size as u64;
        if size > limit {
            return Err(Error::BufferTooLarge {
                name: slot.name.to_owned(),
                size,
                limit,
            });
        }

        let usage = wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST;
        let buffer = match contents {
            Some(contents) => self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(slot.name),
                    contents,
                    usage,
                }),
            None => self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(slot.name),
                size,
                usage,
                mapped_at_creation: false,
            }),
        };
        Ok(buffer)
    }

    fn write_buffer(&mut self, buffer: &wgpu::Buffer, data: &[u8]) {
        self.queue.write_buffer(buffer, 0, data);
    }
}

impl SceneBuffers<wgpu::Buffer> {
    pub fn bind_group_layout(&self, device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let entries: Vec<_> = self
            .entries()
            .iter()
            .map(|(binding, _)| wgpu::BindGroupLayoutEntry {
                binding: *binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            })
            .collect();
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &entries,
            label: Some("scene_bind_group_layout"),
        })
    }

    pub fn bind_group(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::BindGroup {
        let entries: Vec<_> = self
            .entries()
            .iter()
            .map(|(binding, buffer)| wgpu::BindGroupEntry {
                binding: *binding,
                resource: buffer.as_entire_binding(),
            })
            .collect();
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &entries,
            label: Some("scene_bind_group"),
        })
    }
}
