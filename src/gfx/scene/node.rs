//! # Scene Nodes
//!
//! A flat arena of named transform nodes. Parents are always inserted before
//! their children, so world matrices can be composed in one forward pass
//! without recursion or shared ownership.

use cgmath::{Matrix4, Point3, Rad, SquareMatrix, Transform as _, Vector3, Zero};
use std::collections::HashMap;

/// Index of a node inside a [`NodeTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Local translation and XYZ Euler rotation in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vector3<f32>,
    pub rotation: Vector3<f32>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zero(),
            rotation: Vector3::zero(),
        }
    }

    pub fn from_translation(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: Vector3::new(x, y, z),
            rotation: Vector3::zero(),
        }
    }

    pub fn with_rotation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Vector3::new(x, y, z);
        self
    }

    /// `T * Rx * Ry * Rz`: Z is applied first, then Y, then X
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.translation)
            * Matrix4::from_angle_x(Rad(self.rotation.x))
            * Matrix4::from_angle_y(Rad(self.rotation.y))
            * Matrix4::from_angle_z(Rad(self.rotation.z))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub parent: Option<NodeId>,
    pub transform: Transform,
    world: Matrix4<f32>,
}

impl Node {
    /// World matrix as of the last [`NodeTable::update_world_matrices`]
    pub fn world_matrix(&self) -> Matrix4<f32> {
        self.world
    }
}

#[derive(Debug, Clone, Default)]
pub struct NodeTable {
    nodes: Vec<Node>,
    by_name: HashMap<String, NodeId>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node under `parent`. Unknown parents attach the node to the root.
    pub fn insert(&mut self, name: &str, parent: Option<NodeId>, transform: Transform) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = parent.filter(|p| p.0 < self.nodes.len());
        let parent_world = parent.map_or_else(Matrix4::identity, |p| self.nodes[p.0].world);

        self.nodes.push(Node {
            name: name.to_string(),
            parent,
            transform,
            world: parent_world * transform.matrix(),
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn transform_mut(&mut self, id: NodeId) -> Option<&mut Transform> {
        self.nodes.get_mut(id.0).map(|node| &mut node.transform)
    }

    /// Recomposes every world matrix from local transforms
    pub fn update_world_matrices(&mut self) {
        for i in 0..self.nodes.len() {
            let local = self.nodes[i].transform.matrix();
            let world = match self.nodes[i].parent {
                Some(parent) => self.nodes[parent.0].world * local,
                None => local,
            };
            self.nodes[i].world = world;
        }
    }

    pub fn world_matrix(&self, id: NodeId) -> Option<Matrix4<f32>> {
        self.get(id).map(|node| node.world)
    }

    pub fn world_position(&self, id: NodeId) -> Option<Point3<f32>> {
        self.world_matrix(id)
            .map(|m| m.transform_point(Point3::new(0.0, 0.0, 0.0)))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Point3<f32>, b: Point3<f32>) -> bool {
        (a - b).magnitude() < 1e-5
    }

    #[test]
    fn test_child_inherits_parent_transform() {
        let mut nodes = NodeTable::new();
        let root = nodes.insert("root", None, Transform::from_translation(0.0, 1.0, 10.0));
        let arm = nodes.insert("arm", Some(root), Transform::from_translation(1.0, 0.0, 0.0));

        assert!(approx(nodes.world_position(arm).unwrap(), Point3::new(1.0, 1.0, 10.0)));

        nodes.transform_mut(root).unwrap().rotation.y = FRAC_PI_2;
        nodes.update_world_matrices();
        // Yaw of +90 degrees maps local +X onto world -Z
        assert!(approx(nodes.world_position(arm).unwrap(), Point3::new(0.0, 1.0, 9.0)));
    }

    #[test]
    fn test_euler_applies_z_before_x() {
        let t = Transform::identity().with_rotation(FRAC_PI_2, 0.0, FRAC_PI_2);
        let p = t.matrix().transform_point(Point3::new(1.0, 0.0, 0.0));
        // Z turns +X into +Y, then X turns +Y into +Z
        assert!(approx(p, Point3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_lookup_and_missing_ids() {
        let mut nodes = NodeTable::new();
        let id = nodes.insert("figure", None, Transform::identity());
        assert_eq!(nodes.find("figure"), Some(id));
        assert_eq!(nodes.find("ghost"), None);

        let foreign = NodeId(42);
        assert!(nodes.get(foreign).is_none());
        assert!(nodes.transform_mut(foreign).is_none());

        // Unknown parent falls back to the root
        let orphan = nodes.insert("orphan", Some(foreign), Transform::identity());
        assert_eq!(nodes.get(orphan).unwrap().parent, None);
    }
}
