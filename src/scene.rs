use std::marker::PhantomData;

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3, Vec4};

/// Texture slot value meaning "sample the material color instead".
pub const NO_TEXTURE: i32 = -1;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Material {
    pub color: Vec3,
    pub _p0: f32,

    /// Per-channel absorption applied inside refractive objects.
    pub absorb: Vec3,
    pub diffuse: f32,

    pub reflectivity: f32,
    pub refractivity: f32,
    pub specular: i32,
    pub kd: f32,

    pub ks: f32,
    pub _padding: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GlobalScene {
    pub camera_rotation: Quat,
    pub camera_pos: Vec3,
    pub _p0: f32,

    pub bg_color: Vec3,
    pub canvas_width: i32,

    pub canvas_height: i32,
    pub reflect_depth: i32,
    pub _padding: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Sphere {
    pub material: Material,
    /// Center in `xyz`, radius in `w`.
    pub obj: Vec4,
    pub rotation: Quat,
    pub texture_num: i32,
    /// Non-zero enables the refraction path.
    pub hollow: u32,
    pub _padding: [f32; 2],
}

impl Sphere {
    pub fn center(&self) -> Vec3 {
        self.obj.truncate()
    }

    pub fn radius(&self) -> f32 {
        self.obj.w
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BoxObject {
    pub material: Material,
    pub rotation: Quat,
    pub pos: Vec3,
    pub _p0: f32,
    /// Half extents along each local axis.
    pub form: Vec3,
    pub texture_num: i32,
}

/// General quadric `a·x² + b·y² + c·z² + d·z + e·y + f = 0`, evaluated in the
/// surface's local frame and clipped to the `[min, max]` box.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Surface {
    pub material: Material,
    pub rotation: Quat,
    pub x_min: f32,
    pub y_min: f32,
    pub z_min: f32,
    pub _p0: f32,
    pub x_max: f32,
    pub y_max: f32,
    pub z_max: f32,
    pub _p1: f32,
    pub pos: Vec3,
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
    pub _padding: [f32; 3],
}

impl Surface {
    pub fn coefficients(&self) -> [f32; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    pub fn set_bounds(&mut self, min: Vec3, max: Vec3) {
        self.x_min = min.x;
        self.y_min = min.y;
        self.z_min = min.z;
        self.x_max = max.x;
        self.y_max = max.y;
        self.z_max = max.z;
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightPoint {
    /// Position in `xyz`, emitter radius in `w`.
    pub pos: Vec4,
    pub color: Vec3,
    pub intensity: f32,

    pub linear_k: f32,
    pub quadratic_k: f32,
    pub _padding: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightDirect {
    pub direction: Vec3,
    pub _p0: f32,
    pub color: Vec3,
    pub intensity: f32,
}

/// Compile-time bounds handed to shader generation. Taken once at startup; the
/// buffers are sized from the same collections so the two never diverge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Defines {
    pub sphere_size: u32,
    pub surface_size: u32,
    pub box_size: u32,
    pub light_point_size: u32,
    pub light_direct_size: u32,
    pub iterations: u32,
    pub ambient_color: Vec3,
    pub shadow_ambient: Vec3,
}

/// Stable identity of an object inside its collection.
///
/// Returned by [`Scene::push`]; collections never shrink or reorder, so a
/// handle stays valid for the lifetime of the scene that issued it.
pub struct Handle<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: usize) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> std::fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Handle").field(&self.index).finish()
    }
}

/// Backing storage of a [`Scene`]. Only reachable through the scene itself, so
/// outside code can read and edit objects but never add, remove or reorder them.
mod storage {
    use super::{BoxObject, LightDirect, LightPoint, Sphere, Surface};

    #[derive(Debug, Clone)]
    pub struct Collections {
        pub(super) spheres: Vec<Sphere>,
        pub(super) surfaces: Vec<Surface>,
        pub(super) boxes: Vec<BoxObject>,
        pub(super) lights_point: Vec<LightPoint>,
        pub(super) lights_direct: Vec<LightDirect>,
    }

    pub trait Stored: Sized {
        fn items(collections: &Collections) -> &Vec<Self>;
        fn items_mut(collections: &mut Collections) -> &mut Vec<Self>;
    }
}

/// A record kind stored in one of the scene's collections.
///
/// Sealed; the collection accessors are private to this module.
///
/// ```compile_fail
/// use raytracer_lib::scene::{Scene, SceneObject, Sphere};
///
/// fn clear(scene: &mut Scene) {
///     <Sphere as SceneObject>::collection_mut(scene).clear();
/// }
/// ```
pub trait SceneObject: Pod + storage::Stored {
    const KIND: &'static str;
}

macro_rules! scene_object {
    ($ty:ty, $field:ident, $kind:literal) => {
        impl storage::Stored for $ty {
            fn items(collections: &storage::Collections) -> &Vec<Self> {
                &collections.$field
            }

            fn items_mut(collections: &mut storage::Collections) -> &mut Vec<Self> {
                &mut collections.$field
            }
        }

        impl SceneObject for $ty {
            const KIND: &'static str = $kind;
        }
    };
}

scene_object!(Sphere, spheres, "sphere");
scene_object!(Surface, surfaces, "surface");
scene_object!(BoxObject, boxes, "box");
scene_object!(LightPoint, lights_point, "point light");
scene_object!(LightDirect, lights_direct, "directional light");

/// Records that carry an orientation the frame loop may animate.
pub trait Rotatable {
    fn rotation_mut(&mut self) -> &mut Quat;
}

impl Rotatable for Sphere {
    fn rotation_mut(&mut self) -> &mut Quat {
        &mut self.rotation
    }
}

impl Rotatable for BoxObject {
    fn rotation_mut(&mut self) -> &mut Quat {
        &mut self.rotation
    }
}

impl Rotatable for Surface {
    fn rotation_mut(&mut self) -> &mut Quat {
        &mut self.rotation
    }
}

/// Single source of truth for everything the shader reads.
#[derive(Debug, Clone)]
pub struct Scene {
    pub global: GlobalScene,
    pub ambient_color: Vec3,
    pub shadow_ambient: Vec3,
    objects: storage::Collections,
}

impl Scene {
    pub fn new(global: GlobalScene, ambient_color: Vec3, shadow_ambient: Vec3) -> Self {
        Self {
            global,
            ambient_color,
            shadow_ambient,
            objects: storage::Collections {
                spheres: Vec::new(),
                surfaces: Vec::new(),
                boxes: Vec::new(),
                lights_point: Vec::new(),
                lights_direct: Vec::new(),
            },
        }
    }

    /// Append an object during startup population.
    pub fn push<T: SceneObject>(&mut self, object: T) -> Handle<T> {
        let collection = T::items_mut(&mut self.objects);
        collection.push(object);
        let handle = Handle::new(collection.len() - 1);
        tracing::debug!("added {} #{}", T::KIND, handle.index());
        handle
    }

    pub fn get<T: SceneObject>(&self, handle: Handle<T>) -> &T {
        &T::items(&self.objects)[handle.index]
    }

    pub fn get_mut<T: SceneObject>(&mut self, handle: Handle<T>) -> &mut T {
        &mut T::items_mut(&mut self.objects)[handle.index]
    }

    /// All objects of one kind, in insertion order.
    pub fn objects<T: SceneObject>(&self) -> &[T] {
        T::items(&self.objects)
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.objects.spheres
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.objects.surfaces
    }

    pub fn boxes(&self) -> &[BoxObject] {
        &self.objects.boxes
    }

    pub fn lights_point(&self) -> &[LightPoint] {
        &self.objects.lights_point
    }

    pub fn lights_direct(&self) -> &[LightDirect] {
        &self.objects.lights_direct
    }

    pub fn snapshot_defines(&self) -> Defines {
        Defines {
            sphere_size: self.objects.spheres.len() as u32,
            surface_size: self.objects.surfaces.len() as u32,
            box_size: self.objects.boxes.len() as u32,
            light_point_size: self.objects.lights_point.len() as u32,
            light_direct_size: self.objects.lights_direct.len() as u32,
            iterations: self.global.reflect_depth.max(0) as u32,
            ambient_color: self.ambient_color,
            shadow_ambient: self.shadow_ambient,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::mem::{offset_of, size_of};

    use super::*;
    use crate::factory;

    #[test]
    fn material_layout() {
        assert_eq!(size_of::<Material>(), 64);
        assert_eq!(offset_of!(Material, color), 0);
        assert_eq!(offset_of!(Material, absorb), 16);
        assert_eq!(offset_of!(Material, diffuse), 28);
        assert_eq!(offset_of!(Material, reflectivity), 32);
        assert_eq!(offset_of!(Material, refractivity), 36);
        assert_eq!(offset_of!(Material, specular), 40);
        assert_eq!(offset_of!(Material, kd), 44);
        assert_eq!(offset_of!(Material, ks), 48);
    }

    #[test]
    fn global_scene_layout() {
        assert_eq!(size_of::<GlobalScene>(), 64);
        assert_eq!(offset_of!(GlobalScene, camera_rotation), 0);
        assert_eq!(offset_of!(GlobalScene, camera_pos), 16);
        assert_eq!(offset_of!(GlobalScene, bg_color), 32);
        assert_eq!(offset_of!(GlobalScene, canvas_width), 44);
        assert_eq!(offset_of!(GlobalScene, canvas_height), 48);
        assert_eq!(offset_of!(GlobalScene, reflect_depth), 52);
    }

    #[test]
    fn sphere_layout() {
        assert_eq!(size_of::<Sphere>(), 112);
        assert_eq!(offset_of!(Sphere, material), 0);
        assert_eq!(offset_of!(Sphere, obj), 64);
        assert_eq!(offset_of!(Sphere, rotation), 80);
        assert_eq!(offset_of!(Sphere, texture_num), 96);
        assert_eq!(offset_of!(Sphere, hollow), 100);
    }

    #[test]
    fn box_layout() {
        assert_eq!(size_of::<BoxObject>(), 112);
        assert_eq!(offset_of!(BoxObject, rotation), 64);
        assert_eq!(offset_of!(BoxObject, pos), 80);
        assert_eq!(offset_of!(BoxObject, form), 96);
        assert_eq!(offset_of!(BoxObject, texture_num), 108);
    }

    #[test]
    fn surface_layout() {
        assert_eq!(size_of::<Surface>(), 160);
        assert_eq!(offset_of!(Surface, rotation), 64);
        assert_eq!(offset_of!(Surface, x_min), 80);
        assert_eq!(offset_of!(Surface, z_min), 88);
        assert_eq!(offset_of!(Surface, x_max), 96);
        assert_eq!(offset_of!(Surface, z_max), 104);
        assert_eq!(offset_of!(Surface, pos), 112);
        assert_eq!(offset_of!(Surface, a), 124);
        assert_eq!(offset_of!(Surface, d), 136);
        assert_eq!(offset_of!(Surface, f), 144);
    }

    #[test]
    fn light_layouts() {
        assert_eq!(size_of::<LightPoint>(), 48);
        assert_eq!(offset_of!(LightPoint, color), 16);
        assert_eq!(offset_of!(LightPoint, intensity), 28);
        assert_eq!(offset_of!(LightPoint, linear_k), 32);
        assert_eq!(offset_of!(LightPoint, quadratic_k), 36);

        assert_eq!(size_of::<LightDirect>(), 32);
        assert_eq!(offset_of!(LightDirect, color), 16);
        assert_eq!(offset_of!(LightDirect, intensity), 28);
    }

    fn empty_scene() -> Scene {
        Scene::new(factory::global_scene(640, 480), Vec3::splat(0.25), Vec3::splat(0.1))
    }

    fn red() -> Material {
        factory::material(Vec3::X, 100, 0.2)
    }

    #[test]
    fn defines_track_collection_sizes() {
        let mut scene = empty_scene();
        let defines = scene.snapshot_defines();
        assert_eq!(defines.sphere_size, 0);
        assert_eq!(defines.surface_size, 0);
        assert_eq!(defines.box_size, 0);
        assert_eq!(defines.light_point_size, 0);
        assert_eq!(defines.light_direct_size, 0);
        assert_eq!(defines.iterations, 5);

        scene.push(factory::sphere(Vec3::ZERO, 1.0, red(), false));
        scene.push(factory::light_direct(Vec3::NEG_Y, Vec3::ONE, 1.0));
        let defines = scene.snapshot_defines();
        assert_eq!(defines.sphere_size, 1);
        assert_eq!(defines.light_direct_size, 1);
        assert_eq!(defines.box_size, 0);

        for i in 0..7 {
            scene.push(factory::cuboid(Vec3::splat(i as f32), Vec3::ONE, red()));
        }
        for _ in 0..3 {
            scene.push(factory::light_point(Vec4::new(0.0, 5.0, 0.0, 0.1), Vec3::ONE, 2.0));
        }
        scene.push(factory::elliptic_cylinder(0.5, 0.5, red()));
        let defines = scene.snapshot_defines();
        assert_eq!(defines.sphere_size, 1);
        assert_eq!(defines.surface_size, 1);
        assert_eq!(defines.box_size, 7);
        assert_eq!(defines.light_point_size, 3);
        assert_eq!(defines.light_direct_size, 1);
        assert_eq!(defines.ambient_color, Vec3::splat(0.25));
        assert_eq!(defines.shadow_ambient, Vec3::splat(0.1));
    }

    #[test]
    fn handles_address_their_own_object() {
        let mut scene = empty_scene();
        let first = scene.push(factory::sphere(Vec3::ZERO, 1.0, red(), false));
        let second = scene.push(factory::sphere(Vec3::X, 2.0, red(), true));
        assert_ne!(first, second);

        scene.get_mut(second).obj.y = 7.0;
        assert_eq!(scene.get(first).obj.y, 0.0);
        assert_eq!(scene.get(second).center(), Vec3::new(1.0, 7.0, 0.0));
        assert_eq!(scene.get(second).hollow, 1);
        assert_eq!(scene.spheres()[second.index()].radius(), 2.0);
    }

    #[test]
    fn negative_reflect_depth_yields_zero_iterations() {
        let mut scene = empty_scene();
        scene.global.reflect_depth = -3;
        assert_eq!(scene.snapshot_defines().iterations, 0);
    }
}
