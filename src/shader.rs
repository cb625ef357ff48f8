use std::{borrow::Cow, collections::HashMap};

use glam::Vec3;

use crate::{
    error::{Error, Result},
    scene::Defines,
};

pub const RAYTRACE_TEMPLATE: &str = include_str!("asset/shader/raytrace.wgsl");

/// Group/binding of one `var<uniform>` declared by the shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockBinding {
    pub group: u32,
    pub binding: u32,
}

/// Named uniform blocks a compiled module exposes.
#[derive(Debug, Clone, Default)]
pub struct UniformBlocks(HashMap<String, BlockBinding>);

impl UniformBlocks {
    pub fn reflect(module: &naga::Module) -> Self {
        let blocks = module
            .global_variables
            .iter()
            .filter(|(_, var)| var.space == naga::AddressSpace::Uniform)
            .filter_map(|(_, var)| {
                let name = var.name.clone()?;
                let binding = var.binding.as_ref()?;
                Some((
                    name,
                    BlockBinding {
                        group: binding.group,
                        binding: binding.binding,
                    },
                ))
            })
            .collect();
        Self(blocks)
    }

    pub fn resolve(&self, name: &str) -> Result<BlockBinding> {
        self.0.get(name).copied().ok_or_else(|| Error::MissingBlock {
            name: name.to_owned(),
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, BlockBinding)> for UniformBlocks {
    fn from_iter<I: IntoIterator<Item = (String, BlockBinding)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn wgsl_vec3(v: Vec3) -> String {
    format!("vec3<f32>({:?}, {:?}, {:?})", v.x, v.y, v.z)
}

/// WGSL constants for one set of defines.
///
/// `*_SIZE` is the live object count the shader loops over. `*_CAPACITY` is the
/// declared array length, which WGSL requires to be at least one.
pub fn prelude(defines: &Defines) -> String {
    let mut out = String::new();
    let sizes = [
        ("SPHERE", defines.sphere_size),
        ("SURFACE", defines.surface_size),
        ("BOX", defines.box_size),
        ("LIGHT_POINT", defines.light_point_size),
        ("LIGHT_DIRECT", defines.light_direct_size),
    ];
    for (name, size) in sizes {
        out.push_str(&format!("const {name}_SIZE: u32 = {size}u;\n"));
        out.push_str(&format!("const {name}_CAPACITY: u32 = {}u;\n", size.max(1)));
    }
    out.push_str(&format!("const ITERATIONS: u32 = {}u;\n", defines.iterations));
    out.push_str(&format!(
        "const AMBIENT_COLOR: vec3<f32> = {};\n",
        wgsl_vec3(defines.ambient_color)
    ));
    out.push_str(&format!(
        "const SHADOW_AMBIENT: vec3<f32> = {};\n",
        wgsl_vec3(defines.shadow_ambient)
    ));
    out
}

pub struct ShaderProgram {
    source: String,
    blocks: UniformBlocks,
}

impl ShaderProgram {
    pub fn build(template: &str, defines: &Defines) -> Result<Self> {
        tracing::info!(?defines, "building ray tracing shader");
        let source = format!("{}\n{}", prelude(defines), template);
        let module = naga::front::wgsl::parse_str(&source)
            .map_err(|err| Error::Shader(err.emit_to_string(&source)))?;
        let blocks = UniformBlocks::reflect(&module);
        tracing::debug!("shader declares {} uniform blocks", blocks.len());
        Ok(Self { source, blocks })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn blocks(&self) -> &UniformBlocks {
        &self.blocks
    }

    pub fn create_module(&self, device: &wgpu::Device) -> wgpu::ShaderModule {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Ray Tracing Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(&self.source)),
        })
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn defines(size: u32) -> Defines {
        Defines {
            sphere_size: size,
            surface_size: size,
            box_size: size,
            light_point_size: size,
            light_direct_size: size,
            iterations: 5,
            ambient_color: Vec3::splat(0.25),
            shadow_ambient: Vec3::splat(0.1),
        }
    }

    #[test]
    fn prelude_keeps_capacity_non_zero() {
        let text = prelude(&defines(0));
        assert!(text.contains("const SPHERE_SIZE: u32 = 0u;"));
        assert!(text.contains("const SPHERE_CAPACITY: u32 = 1u;"));
        assert!(text.contains("const ITERATIONS: u32 = 5u;"));
        assert!(text.contains("const AMBIENT_COLOR: vec3<f32> = vec3<f32>(0.25, 0.25, 0.25);"));

        let text = prelude(&defines(3));
        assert!(text.contains("const LIGHT_DIRECT_SIZE: u32 = 3u;"));
        assert!(text.contains("const LIGHT_DIRECT_CAPACITY: u32 = 3u;"));
    }

    #[test]
    fn reflects_named_uniform_blocks() {
        let template = "
            struct Globals { tint: vec4<f32>, }
            @group(0) @binding(2) var<uniform> globals_buf: Globals;
            @group(1) @binding(0) var tex_sampler: sampler;
        ";
        let program = ShaderProgram::build(template, &defines(1)).unwrap();
        assert_eq!(program.blocks().len(), 1);
        assert_eq!(
            program.blocks().resolve("globals_buf").unwrap(),
            BlockBinding {
                group: 0,
                binding: 2
            }
        );
        assert!(matches!(
            program.blocks().resolve("spheres_buf"),
            Err(Error::MissingBlock { .. })
        ));
    }

    #[test]
    fn syntax_errors_are_reported() {
        let result = ShaderProgram::build("fn broken( {", &defines(1));
        assert!(matches!(result, Err(Error::Shader(_))));
    }

    #[test]
    fn bundled_shader_declares_every_scene_block() {
        let program = ShaderProgram::build(RAYTRACE_TEMPLATE, &defines(2)).unwrap();
        for (name, binding) in [
            ("scene_buf", 0),
            ("spheres_buf", 1),
            ("surfaces_buf", 3),
            ("boxes_buf", 4),
            ("lights_point_buf", 7),
            ("lights_direct_buf", 8),
        ] {
            assert_eq!(program.blocks().resolve(name).unwrap().binding, binding);
        }
    }
}
