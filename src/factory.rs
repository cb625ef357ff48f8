use bytemuck::Zeroable;
use glam::{Quat, Vec3, Vec4};

use crate::scene::{
    BoxObject, GlobalScene, LightDirect, LightPoint, Material, Sphere, Surface, NO_TEXTURE,
};

pub const DEFAULT_DIFFUSE: f32 = 0.7;
pub const DEFAULT_KD: f32 = 0.8;
pub const DEFAULT_KS: f32 = 0.2;
pub const DEFAULT_LINEAR_K: f32 = 0.22;
pub const DEFAULT_QUADRATIC_K: f32 = 0.2;
pub const DEFAULT_REFLECT_DEPTH: i32 = 5;

/// Color from 0-255 channel values.
pub fn rgb(r: f32, g: f32, b: f32) -> Vec3 {
    Vec3::new(r, g, b) / 255.0
}

/// Opaque material with default diffuse weight and Phong coefficients.
pub fn material(color: Vec3, specular: i32, reflectivity: f32) -> Material {
    refractive_material(color, specular, reflectivity, 0.0, Vec3::ZERO, DEFAULT_DIFFUSE)
}

pub fn refractive_material(
    color: Vec3,
    specular: i32,
    reflectivity: f32,
    refractivity: f32,
    absorb: Vec3,
    diffuse: f32,
) -> Material {
    let mut material = Material::zeroed();
    material.color = color;
    material.absorb = absorb;
    material.specular = specular;
    material.reflectivity = reflectivity;
    material.refractivity = refractivity;
    material.diffuse = diffuse;
    material.kd = DEFAULT_KD;
    material.ks = DEFAULT_KS;
    material
}

pub fn global_scene(width: u32, height: u32) -> GlobalScene {
    let mut scene = GlobalScene::zeroed();
    scene.camera_rotation = Quat::IDENTITY;
    scene.camera_pos = Vec3::ZERO;
    scene.bg_color = Vec3::ZERO;
    scene.canvas_width = width as i32;
    scene.canvas_height = height as i32;
    scene.reflect_depth = DEFAULT_REFLECT_DEPTH;
    scene
}

pub fn sphere(center: Vec3, radius: f32, material: Material, hollow: bool) -> Sphere {
    let mut sphere = Sphere::zeroed();
    sphere.material = material;
    sphere.obj = center.extend(radius);
    sphere.rotation = Quat::IDENTITY;
    sphere.texture_num = NO_TEXTURE;
    sphere.hollow = hollow as u32;
    sphere
}

/// Box centered at `pos` with half extents `form`.
pub fn cuboid(pos: Vec3, form: Vec3, material: Material) -> BoxObject {
    let mut cuboid = BoxObject::zeroed();
    cuboid.material = material;
    cuboid.rotation = Quat::IDENTITY;
    cuboid.pos = pos;
    cuboid.form = form;
    cuboid.texture_num = NO_TEXTURE;
    cuboid
}

fn unbounded_surface(material: Material) -> Surface {
    let mut surface = Surface::zeroed();
    surface.material = material;
    surface.rotation = Quat::IDENTITY;
    surface.set_bounds(Vec3::splat(-f32::MAX), Vec3::splat(f32::MAX));
    surface
}

/// `x²/a² + y²/b² = 1`, infinite along z until bounded.
pub fn elliptic_cylinder(a: f32, b: f32, material: Material) -> Surface {
    let mut surface = unbounded_surface(material);
    surface.a = a.powi(-2);
    surface.b = b.powi(-2);
    surface.f = -1.0;
    surface
}

/// `x²/a² + y²/b² - z²/c² = 0`, apex at the local origin.
pub fn elliptic_cone(a: f32, b: f32, c: f32, material: Material) -> Surface {
    let mut surface = unbounded_surface(material);
    surface.a = a.powi(-2);
    surface.b = b.powi(-2);
    surface.c = -c.powi(-2);
    surface
}

pub fn light_point(position: Vec4, color: Vec3, intensity: f32) -> LightPoint {
    light_point_attenuated(
        position,
        color,
        intensity,
        DEFAULT_LINEAR_K,
        DEFAULT_QUADRATIC_K,
    )
}

pub fn light_point_attenuated(
    position: Vec4,
    color: Vec3,
    intensity: f32,
    linear_k: f32,
    quadratic_k: f32,
) -> LightPoint {
    let mut light = LightPoint::zeroed();
    light.pos = position;
    light.color = color;
    light.intensity = intensity;
    light.linear_k = linear_k;
    light.quadratic_k = quadratic_k;
    light
}

pub fn light_direct(direction: Vec3, color: Vec3, intensity: f32) -> LightDirect {
    let mut light = LightDirect::zeroed();
    light.direction = direction;
    light.color = color;
    light.intensity = intensity;
    light
}
