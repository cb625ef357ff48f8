use glam::{Quat, Vec3, Vec4};

use crate::{
    animation::{Animations, Orbit, Spin},
    config::RendererConfig,
    factory::{self, rgb},
    scene::Scene,
};

/// Texture files in slot order; slot numbers start at 1.
pub const TEXTURE_FILES: [&str; 2] = ["earth.jpg", "container.png"];
pub const EARTH_TEXTURE_SLOT: i32 = 1;
pub const BOX_TEXTURE_SLOT: i32 = 2;

pub const CAMERA_START: Vec3 = Vec3::new(0.0, 0.0, -5.0);

pub fn build_scene(config: &RendererConfig) -> (Scene, Animations) {
    let mut global = factory::global_scene(config.width, config.height);
    global.camera_pos = CAMERA_START;
    global.bg_color = config.background;
    global.reflect_depth = config.reflect_depth;
    let mut scene = Scene::new(global, config.ambient_color, config.shadow_ambient);
    let mut animations = Animations::new();

    scene.push(factory::light_point(
        Vec4::new(3.0, 5.0, 0.0, 0.1),
        Vec3::ONE,
        25.5,
    ));
    scene.push(factory::light_direct(
        Vec3::new(3.0, -1.0, 1.0),
        Vec3::ONE,
        1.5,
    ));

    scene.push(factory::sphere(
        Vec3::new(6.7, 0.0, 3.8),
        1.0,
        factory::material(Vec3::X, 100, 0.2),
        true,
    ));
    scene.push(factory::sphere(
        Vec3::new(0.5, 1.0, 4.0),
        1.0,
        factory::refractive_material(
            Vec3::new(0.0, 0.0, 0.8),
            200,
            0.1,
            1.125,
            Vec3::new(1.0, 0.0, 2.0),
            1.0,
        ),
        true,
    ));

    let mut earth = factory::sphere(
        Vec3::ZERO,
        500.0,
        factory::material(Vec3::ZERO, 0, 0.0),
        false,
    );
    earth.texture_num = EARTH_TEXTURE_SLOT;
    let earth = scene.push(earth);
    animations.add(Orbit {
        sphere: earth,
        radius: 2000.0,
        angular_speed: 0.5,
    });
    animations.add(Spin::new(earth, Vec3::Y));

    let upright = Quat::from_rotation_x(90f32.to_radians());

    let mut cylinder = factory::elliptic_cylinder(
        0.5,
        0.5,
        factory::material(rgb(150.0, 255.0, 50.0), 200, 0.2),
    );
    cylinder.pos = Vec3::new(-2.0, 0.0, 6.0);
    cylinder.rotation = upright;
    cylinder.y_min = -1.0;
    cylinder.y_max = 1.0;
    scene.push(cylinder);

    let mut cone = factory::elliptic_cone(
        1.0 / 3.0,
        1.0 / 3.0,
        1.0,
        factory::material(rgb(210.0, 30.0, 60.0), 200, 0.2),
    );
    cone.pos = Vec3::new(-6.0, 4.0, 6.0);
    cone.rotation = upright;
    cone.y_min = -1.0;
    cone.y_max = 4.0;
    scene.push(cone);

    scene.push(factory::cuboid(
        Vec3::new(0.0, -1.2, 6.0),
        Vec3::new(10.0, 0.2, 5.0),
        factory::material(Vec3::new(0.9, 0.7, 0.0), 100, 0.15),
    ));

    let mut crate_box = factory::cuboid(
        Vec3::new(4.2, 1.0, 6.0),
        Vec3::ONE,
        factory::material(Vec3::ZERO, 50, 0.0),
    );
    crate_box.texture_num = BOX_TEXTURE_SLOT;
    let crate_box = scene.push(crate_box);
    animations.add(Spin::new(crate_box, Vec3::ONE));

    (scene, animations)
}
