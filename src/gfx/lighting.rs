//! The fixed five-light rig
//!
//! One ambient light, a shadow-casting point, spot and directional light,
//! plus a second "debug" directional light aimed at its own target node.

use std::f32::consts::PI;

use cgmath::Vector3;

use crate::gfx::{
    color::Color,
    scene::{Light, LightTarget, Node, NodeId, Scene, ShadowSettings},
};

/// Intensity of every light in the rig
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightIntensities {
    pub ambient: f32,
    pub directional: f32,
    pub point: f32,
    pub spot: f32,
    pub debug: f32,
}

impl LightIntensities {
    pub const DAY: LightIntensities = LightIntensities {
        ambient: 0.2,
        directional: 0.8,
        point: 0.6,
        spot: 0.5,
        debug: 0.8,
    };

    pub const NIGHT: LightIntensities = LightIntensities {
        ambient: 0.05,
        directional: 0.3,
        point: 0.3,
        spot: 0.25,
        debug: 0.4,
    };
}

/// Node ids of the installed lights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingRig {
    pub ambient: NodeId,
    pub point: NodeId,
    pub spot: NodeId,
    pub directional: NodeId,
    pub debug: NodeId,
    pub debug_target: NodeId,
}

impl LightingRig {
    /// Adds the five lights (and the debug target) to the scene root
    pub fn install(scene: &mut Scene) -> Self {
        let day = LightIntensities::DAY;
        let origin = LightTarget::Point(Vector3::new(0.0, 0.0, 0.0));

        let ambient = scene.add(Node::light(
            "ambient",
            Light::ambient(Color::WHITE, day.ambient),
        ));

        let point = scene.add(
            Node::light(
                "point",
                Light::point(Color::WHITE, day.point, 100.0).with_shadow(ShadowSettings::new(1024)),
            )
            .with_position(5.0, 10.0, 5.0),
        );

        let spot = scene.add(
            Node::light(
                "spot",
                Light::spot(Color::WHITE, day.spot, PI / 6.0, 0.3)
                    .with_target(origin)
                    .with_shadow(ShadowSettings::new(1024)),
            )
            .with_position(-10.0, 15.0, 10.0),
        );

        let directional = scene.add(
            Node::light(
                "directional",
                Light::directional(Color::WHITE, day.directional)
                    .with_target(origin)
                    .with_shadow(ShadowSettings::new(1024)),
            )
            .with_position(10.0, 20.0, 10.0),
        );

        // Aimed once its target node exists
        let debug = scene.add(
            Node::light(
                "debug directional",
                Light::directional(Color::WHITE, day.debug)
                    .with_shadow(ShadowSettings::new(2048).with_bias(-0.001)),
            )
            .with_position(5.0, 10.0, -5.0),
        );
        let debug_target = scene.add(Node::group("debug target"));
        if let Some(light) = scene.light_mut(debug) {
            *light = light.with_target(LightTarget::Node(debug_target));
        }

        log::debug!("Installed lighting rig");

        Self {
            ambient,
            point,
            spot,
            directional,
            debug,
            debug_target,
        }
    }

    pub fn set_intensities(&self, scene: &mut Scene, intensities: LightIntensities) {
        let assignments = [
            (self.ambient, intensities.ambient),
            (self.directional, intensities.directional),
            (self.point, intensities.point),
            (self.spot, intensities.spot),
            (self.debug, intensities.debug),
        ];

        for (id, intensity) in assignments {
            if let Some(light) = scene.light_mut(id) {
                light.intensity = intensity;
            }
        }
    }

    pub fn intensities(&self, scene: &Scene) -> LightIntensities {
        let read = |id: NodeId| {
            scene
                .node(id)
                .and_then(|node| node.as_light())
                .map_or(0.0, |light| light.intensity)
        };

        LightIntensities {
            ambient: read(self.ambient),
            directional: read(self.directional),
            point: read(self.point),
            spot: read(self.spot),
            debug: read(self.debug),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::LightKind;

    #[test]
    fn test_install_adds_lights_and_target() {
        let mut scene = Scene::new();
        let rig = LightingRig::install(&mut scene);

        assert_eq!(scene.lights().count(), 5);
        assert_eq!(scene.lights().filter(|(_, l)| l.casts_shadow()).count(), 4);
        assert_eq!(rig.intensities(&scene), LightIntensities::DAY);

        let debug = scene.node(rig.debug).unwrap().as_light().unwrap();
        assert_eq!(debug.target(), Some(LightTarget::Node(rig.debug_target)));
        assert_eq!(debug.shadow.unwrap().map_size, 2048);
        assert_eq!(debug.shadow.unwrap().bias, -0.001);
        assert_eq!(rig.debug_target.0, rig.debug.0 + 1);
    }

    #[test]
    fn test_spot_cone() {
        let mut scene = Scene::new();
        let rig = LightingRig::install(&mut scene);

        let spot = scene.node(rig.spot).unwrap().as_light().unwrap();
        match spot.kind {
            LightKind::Spot { angle, penumbra, .. } => {
                assert!((angle - PI / 6.0).abs() < 1e-6);
                assert_eq!(penumbra, 0.3);
            }
            other => panic!("expected a spot light, got {:?}", other),
        }
    }

    #[test]
    fn test_set_intensities_only_touches_intensity() {
        let mut scene = Scene::new();
        let rig = LightingRig::install(&mut scene);
        let before = *scene.node(rig.point).unwrap().as_light().unwrap();

        rig.set_intensities(&mut scene, LightIntensities::NIGHT);

        let after = *scene.node(rig.point).unwrap().as_light().unwrap();
        assert_eq!(rig.intensities(&scene), LightIntensities::NIGHT);
        assert_eq!(after.kind, before.kind);
        assert_eq!(after.shadow, before.shadow);
    }
}
