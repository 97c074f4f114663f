//! Light sources
//!
//! Lights live in the scene graph like any other node; the node transform
//! gives the light its position. Only [`Light::intensity`] is expected to
//! change after construction.

use cgmath::Vector3;

use super::node::NodeId;
use crate::gfx::color::Color;

/// Where a directional or spot light points
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightTarget {
    /// A fixed world-space point
    Point(Vector3<f32>),
    /// The world position of another node
    Node(NodeId),
}

impl Default for LightTarget {
    fn default() -> Self {
        LightTarget::Point(Vector3::new(0.0, 0.0, 0.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Ambient,
    Point {
        /// Distance at which the contribution reaches zero
        range: f32,
    },
    Spot {
        /// Half-angle of the cone in radians
        angle: f32,
        /// Fraction of the cone over which the edge fades, 0..1
        penumbra: f32,
        target: LightTarget,
    },
    Directional {
        target: LightTarget,
    },
}

/// Shadow-map resolution and depth bias of a shadow-casting light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSettings {
    pub map_size: u32,
    pub bias: f32,
}

impl ShadowSettings {
    pub fn new(map_size: u32) -> Self {
        Self {
            map_size,
            bias: 0.0,
        }
    }

    pub fn with_bias(mut self, bias: f32) -> Self {
        self.bias = bias;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: Color,
    pub intensity: f32,
    pub shadow: Option<ShadowSettings>,
}

impl Light {
    pub fn ambient(color: Color, intensity: f32) -> Self {
        Self {
            kind: LightKind::Ambient,
            color,
            intensity,
            shadow: None,
        }
    }

    pub fn point(color: Color, intensity: f32, range: f32) -> Self {
        Self {
            kind: LightKind::Point { range },
            color,
            intensity,
            shadow: None,
        }
    }

    pub fn spot(color: Color, intensity: f32, angle: f32, penumbra: f32) -> Self {
        Self {
            kind: LightKind::Spot {
                angle,
                penumbra: penumbra.clamp(0.0, 1.0),
                target: LightTarget::default(),
            },
            color,
            intensity,
            shadow: None,
        }
    }

    pub fn directional(color: Color, intensity: f32) -> Self {
        Self {
            kind: LightKind::Directional {
                target: LightTarget::default(),
            },
            color,
            intensity,
            shadow: None,
        }
    }

    pub fn with_shadow(mut self, shadow: ShadowSettings) -> Self {
        self.shadow = Some(shadow);
        self
    }

    /// Points a spot or directional light; other kinds are unchanged
    pub fn with_target(mut self, new_target: LightTarget) -> Self {
        match &mut self.kind {
            LightKind::Spot { target, .. } | LightKind::Directional { target } => {
                *target = new_target;
            }
            LightKind::Ambient | LightKind::Point { .. } => {}
        }
        self
    }

    pub fn target(&self) -> Option<LightTarget> {
        match self.kind {
            LightKind::Spot { target, .. } | LightKind::Directional { target } => Some(target),
            LightKind::Ambient | LightKind::Point { .. } => None,
        }
    }

    pub fn casts_shadow(&self) -> bool {
        self.shadow.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_only_applies_to_aimed_lights() {
        let target = LightTarget::Node(NodeId(7));

        let directional = Light::directional(Color::WHITE, 0.8).with_target(target);
        let point = Light::point(Color::WHITE, 0.6, 100.0).with_target(target);

        assert_eq!(directional.target(), Some(target));
        assert_eq!(point.target(), None);
    }
}
