//! # Object Picking System
//!
//! This module provides 3D object picking functionality using mouse ray-casting.
//!
//! ## How it works
//!
//! 1. **Mouse to Ray**: Convert mouse coordinates to a 3D ray in world space
//! 2. **Broad phase**: Test the ray against each candidate's world bounding box
//! 3. **Narrow phase**: Test the ray against the candidate's triangles
//! 4. **Selection**: Return the closest hit
//!
//! ## Usage
//!
//! ```no_run
//! # use daynight::gfx::{camera::OrbitCamera, picking::ObjectPicker, scene::Scene};
//! # fn demo(camera: &OrbitCamera, scene: &Scene, candidates: &[daynight::gfx::scene::NodeId]) {
//! let picker = ObjectPicker::new();
//! let ray = picker.screen_to_ray((400.0, 300.0), (800.0, 600.0), camera);
//! if let Some(hit) = picker.pick(&ray, scene, candidates) {
//!     println!("Hit {:?} at distance {}", hit.node, hit.distance);
//! }
//! # }
//! ```

use cgmath::{ElementWise, InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4, Zero};

use crate::gfx::{
    camera::orbit_camera::OrbitCamera,
    scene::{NodeId, Scene},
};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Create a new ray
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// Two-sided Möller-Trumbore ray/triangle test
    ///
    /// Returns the distance along the ray to the hit point.
    pub fn intersect_triangle(&self, triangle: [Vector3<f32>; 3]) -> Option<f32> {
        const EPSILON: f32 = 1e-7;
        let [v0, v1, v2] = triangle;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let h = self.direction.cross(edge2);
        let det = edge1.dot(h);
        if det.abs() < EPSILON {
            return None; // Parallel to the triangle plane
        }

        let inv_det = 1.0 / det;
        let s = self.origin - v0;
        let u = inv_det * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = inv_det * self.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = inv_det * edge2.dot(q);
        (t > EPSILON).then_some(t)
    }
}

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl AABB {
    /// Create a new AABB
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Create AABB from a set of vertices
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        if vertices.is_empty() {
            return Self::new(Vector3::zero(), Vector3::zero());
        }

        let mut min = Vector3::new(vertices[0][0], vertices[0][1], vertices[0][2]);
        let mut max = min;

        for vertex in vertices.iter().skip(1) {
            min.x = min.x.min(vertex[0]);
            min.y = min.y.min(vertex[1]);
            min.z = min.z.min(vertex[2]);
            max.x = max.x.max(vertex[0]);
            max.y = max.y.max(vertex[1]);
            max.z = max.z.max(vertex[2]);
        }

        Self::new(min, max)
    }

    /// Test ray-AABB intersection
    /// Returns the entry distance, `0.0` when the ray starts inside the box
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t1 = Vector3::new(
            t_min.x.min(t_max.x),
            t_min.y.min(t_max.y),
            t_min.z.min(t_max.z),
        );
        let t2 = Vector3::new(
            t_min.x.max(t_max.x),
            t_min.y.max(t_max.y),
            t_min.z.max(t_max.z),
        );

        let t_near = t1.x.max(t1.y.max(t1.z));
        let t_far = t2.x.min(t2.y.min(t2.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(t_near.max(0.0))
        } else {
            None
        }
    }

    /// Apply a transformation matrix to the AABB
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        // Transform all 8 corners of the AABB and compute new bounds
        let corners = [
            Vector3::new(self.min.x, self.min.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.min.z),
            Vector3::new(self.min.x, self.max.y, self.min.z),
            Vector3::new(self.min.x, self.min.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.max.z),
            Vector3::new(self.min.x, self.max.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.max.z),
        ];

        let transformed_corners: Vec<[f32; 3]> = corners
            .iter()
            .map(|corner| transform_point(matrix, *corner).into())
            .collect();

        Self::from_vertices(&transformed_corners)
    }
}

fn transform_point(matrix: &Matrix4<f32>, point: Vector3<f32>) -> Vector3<f32> {
    let transformed = matrix * Vector4::new(point.x, point.y, point.z, 1.0);
    transformed.truncate() / transformed.w
}

/// Result of an object picking operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickResult {
    /// The node that was hit
    pub node: NodeId,
    /// Distance from the ray origin to the intersection point
    pub distance: f32,
    /// World space intersection point
    pub point: Vector3<f32>,
}

/// Object picker for 3D mouse selection
#[derive(Debug, Default)]
pub struct ObjectPicker;

impl ObjectPicker {
    /// Create a new object picker
    pub fn new() -> Self {
        Self
    }

    /// Convert screen coordinates to a world-space ray
    pub fn screen_to_ray(
        &self,
        screen_pos: (f32, f32),
        screen_size: (f32, f32),
        camera: &OrbitCamera,
    ) -> Ray {
        let (mouse_x, mouse_y) = screen_pos;
        let (screen_width, screen_height) = screen_size;

        // Convert screen coordinates to normalized device coordinates (-1 to 1)
        let ndc_x = (2.0 * mouse_x) / screen_width - 1.0;
        let ndc_y = 1.0 - (2.0 * mouse_y) / screen_height; // Flip Y axis

        // OpenGL projection so the near and far planes sit at -1 and 1
        let view_proj_matrix = camera.projection_matrix() * camera.view_matrix();
        let inv_view_proj = view_proj_matrix
            .invert()
            .unwrap_or(Matrix4::from_scale(1.0));

        let near_3d = unproject(&inv_view_proj, Vector4::new(ndc_x, ndc_y, -1.0, 1.0));
        let far_3d = unproject(&inv_view_proj, Vector4::new(ndc_x, ndc_y, 1.0, 1.0));

        // Rays start at the eye so hit distances are camera distances
        Ray::new(camera.eye, far_3d - near_3d)
    }

    /// Nearest hit among `candidates`, by distance along the ray
    ///
    /// Nodes that are not meshes are skipped.
    pub fn pick(&self, ray: &Ray, scene: &Scene, candidates: &[NodeId]) -> Option<PickResult> {
        let mut closest_result: Option<PickResult> = None;

        for &node in candidates {
            let Some(world_aabb) = scene.world_bounds(node) else {
                continue;
            };

            // Broad phase: skip boxes that are missed or farther than the best hit
            let Some(box_distance) = world_aabb.intersect_ray(ray) else {
                continue;
            };
            if closest_result.is_some_and(|best| box_distance > best.distance) {
                continue;
            }

            let Some(distance) = self.intersect_mesh(ray, scene, node) else {
                continue;
            };

            if closest_result.map_or(true, |best| distance < best.distance) {
                closest_result = Some(PickResult {
                    node,
                    distance,
                    point: ray.point_at(distance),
                });
            }
        }

        closest_result
    }

    /// Closest triangle hit on one mesh node, in world space
    fn intersect_mesh(&self, ray: &Ray, scene: &Scene, node: NodeId) -> Option<f32> {
        let mesh = scene.mesh(node)?;
        let geometry = scene.geometry(mesh.geometry)?;
        let world = scene.world_matrix(node);

        geometry
            .data
            .triangles()
            .filter_map(|triangle| {
                let world_triangle =
                    triangle.map(|vertex| transform_point(&world, Vector3::from(vertex)));
                ray.intersect_triangle(world_triangle)
            })
            .min_by(f32::total_cmp)
    }
}

fn unproject(inv_view_proj: &Matrix4<f32>, ndc: Vector4<f32>) -> Vector3<f32> {
    let world = inv_view_proj * ndc;
    world.truncate() / world.w
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        color::Color,
        geometry::{generate_cube, generate_torus},
        resources::material::Material,
        scene::{MeshNode, Node},
    };

    #[test]
    fn test_aabb_creation() {
        let vertices = vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [-1.0, -1.0, -1.0]];
        let aabb = AABB::from_vertices(&vertices);

        assert_eq!(aabb.min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(aabb.max, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_ray_aabb_intersection() {
        let aabb = AABB::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));

        // Ray hitting the box
        let ray = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&ray).is_some());

        // Ray missing the box
        let ray_miss = Ray::new(Vector3::new(5.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&ray_miss).is_none());
    }

    #[test]
    fn test_triangle_hit_is_two_sided() {
        let triangle = [
            Vector3::new(-1.0, -1.0, 0.0),
            Vector3::new(1.0, -1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ];
        let front = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let back = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));

        assert!((front.intersect_triangle(triangle).unwrap() - 5.0).abs() < 1e-5);
        assert!((back.intersect_triangle(triangle).unwrap() - 5.0).abs() < 1e-5);
    }

    fn add_mesh(scene: &mut Scene, geometry: crate::gfx::geometry::GeometryData, z: f32) -> NodeId {
        let geometry = scene.add_geometry(geometry);
        let material = scene.materials.add_material(Material::new("m", Color::WHITE));
        scene.add(Node::mesh("m", MeshNode::new(geometry, material)).with_position(0.0, 0.0, z))
    }

    #[test]
    fn test_nearest_candidate_wins() {
        let mut scene = Scene::new();
        let far = add_mesh(&mut scene, generate_cube(), 0.0);
        let near = add_mesh(&mut scene, generate_cube(), 3.0);

        let ray = Ray::new(Vector3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, -1.0));
        let hit = ObjectPicker::new().pick(&ray, &scene, &[far, near]).unwrap();

        assert_eq!(hit.node, near);
        assert!((hit.distance - 6.5).abs() < 1e-4);
    }

    #[test]
    fn test_ray_from_inside_box_enters_at_zero() {
        let aabb = AABB::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(aabb.intersect_ray(&ray), Some(0.0));
    }

    #[test]
    fn test_enclosing_shape_beats_farther_hit() {
        let mut scene = Scene::new();
        let small = add_mesh(&mut scene, generate_cube(), 6.0);
        let geometry = scene.add_geometry(generate_cube());
        let material = scene.materials.add_material(Material::new("big", Color::WHITE));
        let big = scene.add(
            Node::mesh("big", MeshNode::new(geometry, material)).with_uniform_scale(10.0),
        );

        // The ray starts inside the big cube; its far wall is nearer than the small cube
        let ray = Ray::new(Vector3::new(0.1, 0.2, 0.0), Vector3::new(0.0, 0.0, 1.0));
        let hit = ObjectPicker::new().pick(&ray, &scene, &[small, big]).unwrap();

        assert_eq!(hit.node, big);
        assert!((hit.distance - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_ray_through_torus_hole_misses() {
        let mut scene = Scene::new();
        let torus = add_mesh(&mut scene, generate_torus(0.4, 0.15, 16, 100), 0.0);

        // The bounding box is hit but no triangle is
        let ray = Ray::new(Vector3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(scene.world_bounds(torus).unwrap().intersect_ray(&ray).is_some());
        assert!(ObjectPicker::new().pick(&ray, &scene, &[torus]).is_none());
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let camera = OrbitCamera::from_eye(
            Vector3::new(0.0, 5.0, 15.0),
            Vector3::zero(),
            cgmath::Deg(75.0).into(),
            1.0,
            0.1,
            1000.0,
        );
        let ray = ObjectPicker::new().screen_to_ray((400.0, 400.0), (800.0, 800.0), &camera);
        let expected = (-camera.eye).normalize();

        assert!((ray.direction - expected).magnitude() < 1e-4);
        assert_eq!(ray.origin, camera.eye);
    }
}
