use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, MouseScrollDelta},
};

use super::orbit_camera::OrbitCamera;

/// Mouse-driven orbit controls with damping
///
/// Input accumulates into pending motion; [`CameraController::update`]
/// applies a `damping_factor` share of it each tick, so the camera eases
/// out after the mouse stops. A damping factor of zero applies everything
/// at once.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping_factor: f32,
    is_shift_held: bool,
    is_mouse_pressed: bool,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_zoom: f32,
    pending_pan: (f32, f32),
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            pan_speed: 0.01,
            damping_factor: 0.0,
            is_shift_held: false,
            is_mouse_pressed: false,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_zoom: 0.0,
            pending_pan: (0.0, 0.0),
        }
    }

    pub fn with_pan_speed(mut self, pan_speed: f32) -> Self {
        self.pan_speed = pan_speed;
        self
    }

    pub fn with_damping(mut self, damping_factor: f32) -> Self {
        self.damping_factor = damping_factor.clamp(0.0, 1.0);
        self
    }

    /// Raw mouse motion and wheel input
    pub fn process_events(&mut self, event: &DeviceEvent) {
        match event {
            DeviceEvent::MouseWheel { delta } => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32
                    }
                };
                self.zoom(scroll_amount);
            }
            DeviceEvent::MouseMotion { delta } => {
                self.drag(delta.0 as f32, delta.1 as f32);
            }
            _ => (),
        }
    }

    pub fn set_mouse_pressed(&mut self, pressed: bool) {
        self.is_mouse_pressed = pressed;
    }

    pub fn set_shift_held(&mut self, held: bool) {
        self.is_shift_held = held;
    }

    /// Mouse travel while the button is down; rotates, or pans with shift
    pub fn drag(&mut self, dx: f32, dy: f32) {
        if !self.is_mouse_pressed {
            return;
        }

        if self.is_shift_held {
            self.pending_pan.0 -= dx * self.pan_speed;
            self.pending_pan.1 += dy * self.pan_speed;
        } else {
            self.pending_yaw -= dx * self.rotate_speed;
            self.pending_pitch += dy * self.rotate_speed;
        }
    }

    pub fn zoom(&mut self, amount: f32) {
        self.pending_zoom += amount * self.zoom_speed;
    }

    pub fn is_settled(&self) -> bool {
        const REST: f32 = 1e-5;
        self.pending_yaw.abs() < REST
            && self.pending_pitch.abs() < REST
            && self.pending_zoom.abs() < REST
            && self.pending_pan.0.abs() < REST
            && self.pending_pan.1.abs() < REST
    }

    /// Applies one tick of pending motion to the camera
    pub fn update(&mut self, camera: &mut OrbitCamera) {
        if self.is_settled() {
            return;
        }

        let step = if self.damping_factor > 0.0 {
            self.damping_factor
        } else {
            1.0
        };

        camera.add_yaw(self.pending_yaw * step);
        camera.add_pitch(self.pending_pitch * step);
        if self.pending_zoom != 0.0 {
            camera.add_distance(self.pending_zoom * step);
        }
        if self.pending_pan != (0.0, 0.0) {
            camera.pan((self.pending_pan.0 * step, self.pending_pan.1 * step));
        }

        let keep = 1.0 - step;
        self.pending_yaw *= keep;
        self.pending_pitch *= keep;
        self.pending_zoom *= keep;
        self.pending_pan = (self.pending_pan.0 * keep, self.pending_pan.1 * keep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector3, Zero};

    #[test]
    fn test_motion_without_button_is_ignored() {
        let mut controller = CameraController::new(0.01, 0.5);
        controller.drag(50.0, 20.0);
        assert!(controller.is_settled());
    }

    #[test]
    fn test_damping_eases_out() {
        let mut camera = OrbitCamera::new(10.0, 0.0, 0.0, Vector3::zero(), 1.0);
        let mut controller = CameraController::new(0.01, 0.5).with_damping(0.5);

        controller.set_mouse_pressed(true);
        controller.drag(-100.0, 0.0);
        controller.set_mouse_pressed(false);

        controller.update(&mut camera);
        let first = camera.yaw;
        controller.update(&mut camera);
        let second = camera.yaw - first;

        assert!((first - 0.5).abs() < 1e-5);
        assert!((second - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_no_damping_applies_at_once() {
        let mut camera = OrbitCamera::new(10.0, 0.0, 0.0, Vector3::zero(), 1.0);
        let mut controller = CameraController::new(0.01, 0.5);

        controller.set_mouse_pressed(true);
        controller.drag(0.0, 10.0);
        controller.update(&mut camera);

        assert!((camera.pitch - 0.1).abs() < 1e-5);
        assert!(controller.is_settled());
    }
}
