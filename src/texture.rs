use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::error::Result;

pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Texture {
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &RgbaImage,
        label: Option<&str>,
    ) -> Self {
        let (width, height) = img.dimensions();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let texture = Self { texture, view };
        texture.update_data(queue, img);
        texture
    }

    pub fn load(device: &wgpu::Device, queue: &wgpu::Queue, path: &Path) -> Result<Self> {
        let img = image::open(path)?.to_rgba8();
        let label = path.to_string_lossy();
        Ok(Self::from_image(device, queue, &img, Some(label.as_ref())))
    }

    pub fn update_data(&self, queue: &wgpu::Queue, img: &RgbaImage) {
        let (width, height) = img.dimensions();
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            img.as_raw(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }
}

/// Stand-in used when a texture file cannot be read.
pub fn checkerboard(size: u32, cell: u32, a: [u8; 4], b: [u8; 4]) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        if ((x / cell) + (y / cell)) % 2 == 0 {
            Rgba(a)
        } else {
            Rgba(b)
        }
    })
}

/// Textures addressed by the slot numbers stored in object records.
///
/// Slot numbers start at 1 and follow load order; the shader binds slot `n` at
/// `@group(1) @binding(n)` with the shared sampler at binding 0.
pub struct TextureSlots {
    slots: Vec<Texture>,
    sampler: wgpu::Sampler,
}

impl TextureSlots {
    pub const GROUP: u32 = 1;

    pub fn load(device: &wgpu::Device, queue: &wgpu::Queue, dir: &Path, files: &[&str]) -> Self {
        let slots = files
            .iter()
            .map(|file| {
                let path = dir.join(file);
                Texture::load(device, queue, &path).unwrap_or_else(|err| {
                    tracing::warn!("{}: {err}, using placeholder", path.display());
                    let img = checkerboard(256, 32, [255, 255, 255, 255], [200, 40, 200, 255]);
                    Texture::from_image(device, queue, &img, Some(*file))
                })
            })
            .collect::<Vec<_>>();
        tracing::info!("loaded {} texture slots", slots.len());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("texture_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self { slots, sampler }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn bind_group_layout(&self, device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let mut entries = vec![wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        }];
        entries.extend((1..=self.slots.len() as u32).map(|binding| {
            wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            }
        }));
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &entries,
            label: Some("texture_bind_group_layout"),
        })
    }

    pub fn bind_group(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::BindGroup {
        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Sampler(&self.sampler),
        }];
        entries.extend(
            self.slots
                .iter()
                .zip(1u32..)
                .map(|(texture, binding)| wgpu::BindGroupEntry {
                    binding,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                }),
        );
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &entries,
            label: Some("texture_bind_group"),
        })
    }
}
