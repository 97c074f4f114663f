use cgmath::{Matrix4, SquareMatrix, Vector3, Vector4};

use super::light::{Light, LightTarget};
use super::node::{MeshNode, Node, NodeId, NodeKind};
use crate::gfx::{
    color::Color,
    environment::CubeMap,
    geometry::GeometryData,
    picking::AABB,
    resources::{
        image_data::ImageData,
        material::{MaterialManager, TextureId},
    },
};

/// Index of a geometry stored in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(pub usize);

/// Index of a cube map stored in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CubeMapId(pub usize);

/// Geometry plus its local-space bounds
#[derive(Debug, Clone)]
pub struct Geometry {
    pub data: GeometryData,
    pub bounds: AABB,
}

/// What is drawn behind everything else
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Background {
    Color(Color),
    CubeMap(CubeMapId),
}

/// Arena scene graph holding nodes and the assets they reference
///
/// Node 0 is the root group. Nodes are only ever appended, so a [`NodeId`]
/// stays valid for the lifetime of the scene.
pub struct Scene {
    nodes: Vec<Node>,
    geometries: Vec<Geometry>,
    textures: Vec<ImageData>,
    cube_maps: Vec<CubeMap>,
    pub materials: MaterialManager,
    pub background: Background,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub const ROOT: NodeId = NodeId(0);

    pub fn new() -> Self {
        Self {
            nodes: vec![Node::group("root")],
            geometries: Vec::new(),
            textures: Vec::new(),
            cube_maps: Vec::new(),
            materials: MaterialManager::new(),
            background: Background::Color(Color::BLACK),
        }
    }

    pub fn add_geometry(&mut self, data: GeometryData) -> GeometryId {
        let bounds = AABB::from_vertices(&data.vertices);
        self.geometries.push(Geometry { data, bounds });
        GeometryId(self.geometries.len() - 1)
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(id.0)
    }

    pub fn add_texture(&mut self, image: ImageData) -> TextureId {
        self.textures.push(image);
        TextureId(self.textures.len() - 1)
    }

    pub fn texture(&self, id: TextureId) -> Option<&ImageData> {
        self.textures.get(id.0)
    }

    pub fn add_cube_map(&mut self, cube: CubeMap) -> CubeMapId {
        self.cube_maps.push(cube);
        CubeMapId(self.cube_maps.len() - 1)
    }

    pub fn cube_map(&self, id: CubeMapId) -> Option<&CubeMap> {
        self.cube_maps.get(id.0)
    }

    /// Appends a node as the last child of the root
    pub fn add(&mut self, node: Node) -> NodeId {
        self.add_child(Self::ROOT, node)
    }

    /// Appends a node as the last child of `parent`
    ///
    /// An unknown parent falls back to the root.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let parent = if parent.0 < self.nodes.len() {
            parent
        } else {
            log::warn!("Unknown parent {:?} for '{}', using root", parent, node.name);
            Self::ROOT
        };

        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Number of nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn root_children(&self) -> &[NodeId] {
        &self.nodes[Self::ROOT.0].children
    }

    /// `id` followed by all its descendants, depth first in child order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    pub fn world_matrix(&self, id: NodeId) -> Matrix4<f32> {
        let mut matrix = Matrix4::identity();
        let mut current = Some(id);
        while let Some(node) = current.and_then(|id| self.node(id)) {
            matrix = node.transform.matrix() * matrix;
            current = node.parent;
        }
        matrix
    }

    pub fn world_position(&self, id: NodeId) -> Vector3<f32> {
        (self.world_matrix(id) * Vector4::new(0.0, 0.0, 0.0, 1.0)).truncate()
    }

    pub fn meshes(&self) -> impl Iterator<Item = (NodeId, &MeshNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| node.as_mesh().map(|mesh| (NodeId(i), mesh)))
    }

    pub fn mesh(&self, id: NodeId) -> Option<&MeshNode> {
        self.node(id).and_then(Node::as_mesh)
    }

    pub fn lights(&self) -> impl Iterator<Item = (NodeId, &Light)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| node.as_light().map(|light| (NodeId(i), light)))
    }

    pub fn light_mut(&mut self, id: NodeId) -> Option<&mut Light> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn resolve_target(&self, target: LightTarget) -> Vector3<f32> {
        match target {
            LightTarget::Point(point) => point,
            LightTarget::Node(id) => self.world_position(id),
        }
    }

    /// World-space bounds of a mesh node
    pub fn world_bounds(&self, id: NodeId) -> Option<AABB> {
        let mesh = self.mesh(id)?;
        let geometry = self.geometry(mesh.geometry)?;
        Some(geometry.bounds.transform(&self.world_matrix(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_cube;
    use crate::gfx::resources::material::Material;

    fn cube_node(scene: &mut Scene) -> Node {
        let geometry = scene.add_geometry(generate_cube());
        let material = scene.materials.add_material(Material::new("cube", Color::WHITE));
        Node::mesh("cube", MeshNode::new(geometry, material))
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let mut scene = Scene::new();
        let a = scene.add(Node::group("a"));
        let b = scene.add(Node::group("b"));
        let c = scene.add_child(a, Node::group("c"));

        assert_eq!(scene.root_children(), &[a, b]);
        assert_eq!(scene.node(c).unwrap().parent(), Some(a));
        assert_eq!(scene.descendants(Scene::ROOT), vec![Scene::ROOT, a, c, b]);
    }

    #[test]
    fn test_world_matrix_composes_parents() {
        let mut scene = Scene::new();
        let parent = scene.add(Node::group("parent").with_position(0.0, 0.0, -3.0));
        let child = scene.add_child(parent, Node::group("child").with_position(1.0, 0.0, 0.0));

        assert_eq!(scene.world_position(child), Vector3::new(1.0, 0.0, -3.0));
    }

    #[test]
    fn test_world_bounds_follow_transform() {
        let mut scene = Scene::new();
        let node = cube_node(&mut scene).with_position(5.0, 0.0, 0.0);
        let id = scene.add(node);

        let bounds = scene.world_bounds(id).unwrap();
        assert_eq!(bounds.min, Vector3::new(4.5, -0.5, -0.5));
        assert_eq!(bounds.max, Vector3::new(5.5, 0.5, 0.5));
    }

    #[test]
    fn test_node_target_resolves_to_world_position() {
        let mut scene = Scene::new();
        let target = scene.add(Node::group("target").with_position(2.0, 0.0, 1.0));
        assert_eq!(
            scene.resolve_target(LightTarget::Node(target)),
            Vector3::new(2.0, 0.0, 1.0)
        );
    }
}
