use glam::{Quat, Vec3};

use crate::scene::{Handle, Rotatable, Scene, SceneObject, Sphere};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous frame.
    pub elapsed: f32,
    /// Seconds since startup.
    pub total: f32,
}

pub trait Animation {
    fn animate(&mut self, scene: &mut Scene, time: FrameTime);
}

/// Moves a sphere on a circle in the XZ plane around the origin.
#[derive(Debug, Clone, Copy)]
pub struct Orbit {
    pub sphere: Handle<Sphere>,
    pub radius: f32,
    /// Radians per second.
    pub angular_speed: f32,
}

impl Animation for Orbit {
    fn animate(&mut self, scene: &mut Scene, time: FrameTime) {
        let angle = time.total * self.angular_speed;
        let sphere = scene.get_mut(self.sphere);
        sphere.obj.x = angle.cos() * self.radius;
        sphere.obj.z = angle.sin() * self.radius;
    }
}

/// Rotates an object about a fixed axis at one radian per second.
#[derive(Debug, Clone, Copy)]
pub struct Spin<T> {
    pub target: Handle<T>,
    axis: Vec3,
}

impl<T> Spin<T> {
    pub fn new(target: Handle<T>, axis: Vec3) -> Self {
        Self {
            target,
            axis: axis.normalize(),
        }
    }
}

impl<T: SceneObject + Rotatable> Animation for Spin<T> {
    fn animate(&mut self, scene: &mut Scene, time: FrameTime) {
        let rotation = scene.get_mut(self.target).rotation_mut();
        *rotation = (*rotation * Quat::from_axis_angle(self.axis, time.elapsed)).normalize();
    }
}

/// Ordered list of animations run once per frame before buffer sync.
#[derive(Default)]
pub struct Animations(Vec<Box<dyn Animation>>);

impl Animations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, animation: impl Animation + 'static) {
        self.0.push(Box::new(animation));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn run(&mut self, scene: &mut Scene, time: FrameTime) {
        for animation in &mut self.0 {
            animation.animate(scene, time);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};

    use super::*;
    use crate::factory;

    fn scene() -> Scene {
        Scene::new(
            factory::global_scene(640, 480),
            Vec3::splat(0.25),
            Vec3::splat(0.1),
        )
    }

    #[test]
    fn orbit_follows_total_time() {
        let mut scene = scene();
        let plain = factory::material(Vec3::X, 1, 0.0);
        let other = scene.push(factory::sphere(Vec3::ONE, 1.0, plain, false));
        let earth = scene.push(factory::sphere(Vec3::ZERO, 500.0, plain, false));

        let mut orbit = Orbit {
            sphere: earth,
            radius: 2000.0,
            angular_speed: 0.5,
        };
        let total = std::f32::consts::PI;
        let frame = FrameTime {
            elapsed: 0.016,
            total,
        };
        orbit.animate(&mut scene, frame);

        let center = scene.get(earth).center();
        assert!((center.x - (total * 0.5).cos() * 2000.0).abs() < 1e-2);
        assert!((center.z - 2000.0).abs() < 1e-2);
        assert_eq!(scene.get(earth).radius(), 500.0);
        assert_eq!(scene.get(other).center(), Vec3::ONE);
    }

    #[test]
    fn spin_composes_on_the_right() {
        let mut scene = scene();
        let plain = factory::material(Vec3::ONE, 50, 0.0);
        let cube = scene.push(factory::cuboid(Vec3::ZERO, Vec3::ONE, plain));
        let mut animations = Animations::new();
        animations.add(Spin::new(cube, Vec3::ONE));
        assert_eq!(animations.len(), 1);

        let frame = FrameTime {
            elapsed: 0.25,
            total: 0.25,
        };
        for _ in 0..4 {
            animations.run(&mut scene, frame);
        }
        let expected = Quat::from_axis_angle(Vec3::ONE.normalize(), 1.0);
        assert!(scene.get(cube).rotation.abs_diff_eq(expected, 1e-5));
    }
}
