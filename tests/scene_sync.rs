use glam::{Quat, Vec3, Vec4};
use raytracer_lib::{
    animation::{Animations, FrameTime, Orbit, Spin},
    camera::{CameraController, CameraSettings, InputHandler, Key, KeyAction},
    factory,
    scene::{BoxObject, Handle, Scene, Sphere},
    shader::{ShaderProgram, RAYTRACE_TEMPLATE},
    sync::{BufferBackend, BufferSlot, SceneBuffers},
    Error, Result,
};

/// Counts bytes per buffer instead of talking to a device.
#[derive(Default)]
struct CountingBackend {
    sizes: Vec<(&'static str, u64)>,
    writes: Vec<(usize, usize)>,
}

impl CountingBackend {
    fn writes_to(&self, buffer: usize) -> usize {
        self.writes.iter().filter(|(id, _)| *id == buffer).count()
    }
}

impl BufferBackend for CountingBackend {
    type Buffer = usize;

    fn create_buffer(&mut self, slot: BufferSlot, size: u64, _: Option<&[u8]>) -> Result<usize> {
        self.sizes.push((slot.name, size));
        Ok(self.sizes.len() - 1)
    }

    fn write_buffer(&mut self, buffer: &usize, data: &[u8]) {
        self.writes.push((*buffer, data.len()));
    }
}

fn populated_scene() -> Scene {
    let mut scene = Scene::new(
        factory::global_scene(800, 600),
        Vec3::splat(0.25),
        Vec3::splat(0.1),
    );
    let plain = factory::material(Vec3::ONE, 50, 0.2);
    scene.push(factory::sphere(Vec3::new(0.0, 0.0, 5.0), 1.0, plain, false));
    scene.push(factory::sphere(Vec3::new(2.0, 0.0, 5.0), 0.5, plain, true));
    scene.push(factory::elliptic_cylinder(0.5, 0.5, plain));
    scene.push(factory::cuboid(Vec3::new(0.0, -1.0, 5.0), Vec3::new(5.0, 0.1, 5.0), plain));
    scene.push(factory::cuboid(Vec3::new(-2.0, 0.0, 5.0), Vec3::ONE, plain));
    scene.push(factory::light_point(Vec4::new(0.0, 5.0, 0.0, 0.1), Vec3::ONE, 10.0));
    scene.push(factory::light_direct(Vec3::NEG_Y, Vec3::ONE, 1.0));
    scene
}

#[test]
fn startup_binds_every_block_of_the_bundled_shader() {
    let scene = populated_scene();
    let defines = scene.snapshot_defines();
    assert_eq!(
        (
            defines.sphere_size,
            defines.surface_size,
            defines.box_size,
            defines.light_point_size,
            defines.light_direct_size,
        ),
        (2, 1, 2, 1, 1)
    );

    let program = ShaderProgram::build(RAYTRACE_TEMPLATE, &defines).unwrap();
    assert!(program.source().contains("const SPHERE_SIZE: u32 = 2u;"));

    let mut backend = CountingBackend::default();
    let buffers = SceneBuffers::bind(&mut backend, program.blocks(), &scene).unwrap();
    assert_eq!(
        backend.sizes,
        vec![
            ("scene_buf", 64),
            ("spheres_buf", 2 * 112),
            ("surfaces_buf", 160),
            ("boxes_buf", 2 * 112),
            ("lights_point_buf", 48),
            ("lights_direct_buf", 32),
        ]
    );

    buffers.push(&mut backend, &scene);
    assert_eq!(backend.writes.len(), 6);
}

#[test]
fn empty_scene_still_compiles_and_binds() {
    let scene = Scene::new(
        factory::global_scene(320, 240),
        Vec3::splat(0.25),
        Vec3::splat(0.1),
    );
    let program = ShaderProgram::build(RAYTRACE_TEMPLATE, &scene.snapshot_defines()).unwrap();
    assert!(program.source().contains("const BOX_CAPACITY: u32 = 1u;"));

    let mut backend = CountingBackend::default();
    let buffers = SceneBuffers::bind(&mut backend, program.blocks(), &scene).unwrap();
    assert!(buffers.spheres.is_empty());
    assert_eq!(backend.sizes[1], ("spheres_buf", 112));

    buffers.push(&mut backend, &scene);
    // Only the global record has anything to upload.
    assert_eq!(backend.writes, vec![(0, 64)]);
}

#[test]
fn shader_without_a_block_is_a_linkage_error() {
    let scene = populated_scene();
    let template = RAYTRACE_TEMPLATE.replace("lights_direct_buf", "directional_buf");
    let program = ShaderProgram::build(&template, &scene.snapshot_defines()).unwrap();

    let mut backend = CountingBackend::default();
    match SceneBuffers::bind(&mut backend, program.blocks(), &scene) {
        Err(err @ Error::MissingBlock { .. }) => {
            assert!(err.is_linkage());
            assert!(err.to_string().contains("lights_direct_buf"));
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("binding should fail"),
    }
}

#[test]
fn frame_loop_moves_camera_and_animates_objects() {
    let mut scene = populated_scene();
    let orbiting = scene.push(factory::sphere(
        Vec3::ZERO,
        10.0,
        factory::material(Vec3::ONE, 0, 0.0),
        false,
    ));
    let spinning: Handle<BoxObject> = scene.push(factory::cuboid(
        Vec3::ZERO,
        Vec3::ONE,
        factory::material(Vec3::ONE, 0, 0.0),
    ));

    let mut animations = Animations::new();
    animations.add(Orbit {
        sphere: orbiting,
        radius: 2000.0,
        angular_speed: 0.5,
    });
    animations.add(Spin::new(spinning, Vec3::Y));

    let program = ShaderProgram::build(RAYTRACE_TEMPLATE, &scene.snapshot_defines()).unwrap();
    let mut backend = CountingBackend::default();
    let buffers = SceneBuffers::bind(&mut backend, program.blocks(), &scene).unwrap();

    let mut camera = CameraController::new(CameraSettings::default(), Vec3::new(0.0, 0.0, -5.0));
    camera.key(Key::W, KeyAction::Pressed);

    let frame = FrameTime {
        elapsed: 0.5,
        total: 0.0,
    };
    camera.update(frame.elapsed, &mut scene.global);
    animations.run(&mut scene, frame);
    buffers.push(&mut backend, &scene);

    assert!((scene.global.camera_pos.z - -3.5).abs() < 1e-4);
    let earth: &Sphere = scene.get(orbiting);
    assert!((earth.center() - Vec3::new(2000.0, 0.0, 0.0)).length() < 1e-2);
    let spun = scene.get(spinning).rotation;
    assert!(spun.angle_between(Quat::from_rotation_y(0.5)) < 1e-4);

    for buffer in 0..6 {
        assert_eq!(backend.writes_to(buffer), 1);
    }
}
