//! The scene tree.
//!
//! Nodes live in an arena owned by [`SceneTree`] and are addressed by
//! [`NodeId`]. Children are owned by the tree in insertion order; the
//! `parent` link is a plain index used for upward traversal only.

use std::fmt;
use std::ops::Index;

use hashbrown::HashMap;

use crate::engine::{BodyId, GeomId, JointGroupId, JointId, MassId, SpaceId, WorldId};
use crate::error::{Result, XodeError};
use crate::transform::Transform;

/// Index of a node in its [`SceneTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The raw arena index.
    #[must_use]
    pub const fn raw(self) -> usize {
        self.0
    }
}

/// The kind of engine object a node carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A simulation world.
    World,
    /// A collision space.
    Space,
    /// A rigid body.
    Body,
    /// A mass.
    Mass,
    /// A joint group.
    JointGroup,
    /// A joint.
    Joint,
    /// A geometry.
    Geom,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::World => "world",
            Self::Space => "space",
            Self::Body => "body",
            Self::Mass => "mass",
            Self::JointGroup => "joint group",
            Self::Joint => "joint",
            Self::Geom => "geom",
        };
        f.write_str(name)
    }
}

/// Handle to the engine object a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineObject {
    /// A world.
    World(WorldId),
    /// A space.
    Space(SpaceId),
    /// A body.
    Body(BodyId),
    /// A mass.
    Mass(MassId),
    /// A joint group.
    JointGroup(JointGroupId),
    /// A joint.
    Joint(JointId),
    /// A geometry.
    Geom(GeomId),
}

impl EngineObject {
    /// The capability this object provides.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::World(_) => NodeKind::World,
            Self::Space(_) => NodeKind::Space,
            Self::Body(_) => NodeKind::Body,
            Self::Mass(_) => NodeKind::Mass,
            Self::JointGroup(_) => NodeKind::JointGroup,
            Self::Joint(_) => NodeKind::Joint,
            Self::Geom(_) => NodeKind::Geom,
        }
    }

    /// The world handle, if this is a world.
    #[must_use]
    pub const fn as_world(&self) -> Option<WorldId> {
        match self {
            Self::World(id) => Some(*id),
            _ => None,
        }
    }

    /// The space handle, if this is a space.
    #[must_use]
    pub const fn as_space(&self) -> Option<SpaceId> {
        match self {
            Self::Space(id) => Some(*id),
            _ => None,
        }
    }

    /// The body handle, if this is a body.
    #[must_use]
    pub const fn as_body(&self) -> Option<BodyId> {
        match self {
            Self::Body(id) => Some(*id),
            _ => None,
        }
    }

    /// The mass handle, if this is a mass.
    #[must_use]
    pub const fn as_mass(&self) -> Option<MassId> {
        match self {
            Self::Mass(id) => Some(*id),
            _ => None,
        }
    }

    /// The joint group handle, if this is a joint group.
    #[must_use]
    pub const fn as_joint_group(&self) -> Option<JointGroupId> {
        match self {
            Self::JointGroup(id) => Some(*id),
            _ => None,
        }
    }

    /// The joint handle, if this is a joint.
    #[must_use]
    pub const fn as_joint(&self) -> Option<JointId> {
        match self {
            Self::Joint(id) => Some(*id),
            _ => None,
        }
    }

    /// The geometry handle, if this is a geometry.
    #[must_use]
    pub const fn as_geom(&self) -> Option<GeomId> {
        match self {
            Self::Geom(id) => Some(*id),
            _ => None,
        }
    }
}

/// One node of the scene tree.
#[derive(Debug, Clone)]
pub struct SceneNode {
    name: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    named_children: HashMap<String, NodeId>,
    transform: Transform,
    object: Option<EngineObject>,
}

impl SceneNode {
    fn new(name: Option<String>, parent: Option<NodeId>) -> Self {
        Self {
            name,
            parent,
            children: Vec::new(),
            named_children: HashMap::new(),
            transform: Transform::identity(),
            object: None,
        }
    }

    /// The node's name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The parent, or `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The local transform.
    pub fn node_transform(&self) -> &Transform {
        &self.transform
    }

    /// The engine object, if any.
    pub fn object(&self) -> Option<EngineObject> {
        self.object
    }
}

/// Arena-backed tree of [`SceneNode`]s with a single root.
#[derive(Debug, Clone)]
pub struct SceneTree {
    nodes: Vec<SceneNode>,
}

impl SceneTree {
    /// Create a tree holding only a root node.
    pub fn new(root_name: Option<String>) -> Self {
        Self {
            nodes: vec![SceneNode::new(root_name, None)],
        }
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node.
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    /// Append a child under `parent`. A name already used by a sibling is
    /// rebound to the new child.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this tree.
    pub fn add_child(&mut self, parent: NodeId, name: Option<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode::new(name.clone(), Some(parent)));

        let parent_node = &mut self.nodes[parent.0];
        if let Some(name) = name {
            parent_node.named_children.insert(name, id);
        }
        parent_node.children.push(id);
        id
    }

    /// Set the local transform of a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn set_node_transform(&mut self, id: NodeId, transform: Transform) {
        self.nodes[id.0].transform = transform;
    }

    /// Set the engine object of a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn set_object(&mut self, id: NodeId, object: EngineObject) {
        self.nodes[id.0].object = Some(object);
    }

    /// The engine object of a node, if any.
    pub fn object(&self, id: NodeId) -> Option<EngineObject> {
        self.get(id).and_then(|node| node.object)
    }

    /// Children of a node in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Parent of a node; `None` for the root or a node of another tree.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    /// Find a descendant by name.
    ///
    /// The node's own name map is checked first, then each child subtree in
    /// insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`XodeError::NameNotFound`] if no descendant has that name.
    pub fn named_child(&self, id: NodeId, name: &str) -> Result<NodeId> {
        self.find_named(id, name)
            .ok_or_else(|| XodeError::NameNotFound(name.to_string()))
    }

    fn find_named(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let node = self.get(id)?;
        if let Some(found) = node.named_children.get(name) {
            return Some(*found);
        }
        node.children
            .iter()
            .find_map(|child| self.find_named(*child, name))
    }

    /// The nearest strict ancestor whose engine object is of `kind`.
    ///
    /// Ancestors without an engine object, or with one of another kind, are
    /// walked past.
    ///
    /// # Errors
    ///
    /// Returns [`XodeError::AncestorNotFound`] if the root is reached.
    pub fn first_ancestor(&self, id: NodeId, kind: NodeKind) -> Result<NodeId> {
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            if self.object(ancestor).is_some_and(|obj| obj.kind() == kind) {
                return Ok(ancestor);
            }
            current = self.parent(ancestor);
        }
        Err(XodeError::AncestorNotFound(kind))
    }

    /// The nearest ancestor object of `kind`, if there is one.
    pub fn ancestor_object(&self, id: NodeId, kind: NodeKind) -> Option<EngineObject> {
        self.first_ancestor(id, kind)
            .ok()
            .and_then(|ancestor| self.object(ancestor))
    }

    /// The absolute transform: every local transform from the root down to
    /// `id`, composed in that order.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn transform(&self, id: NodeId) -> Transform {
        self.compose_down(id, None)
    }

    /// Compose the local transforms strictly below `stop_at` down to `id`.
    ///
    /// If `stop_at` is not an ancestor of `id` this equals
    /// [`transform`](Self::transform).
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn relative_transform(&self, id: NodeId, stop_at: NodeId) -> Transform {
        self.compose_down(id, Some(stop_at))
    }

    fn compose_down(&self, id: NodeId, stop_at: Option<NodeId>) -> Transform {
        let mut chain = vec![id];
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            if Some(ancestor) == stop_at {
                break;
            }
            chain.push(ancestor);
            current = self.parent(ancestor);
        }

        let mut nodes = chain.iter().rev();
        let Some(first) = nodes.next() else {
            return Transform::identity();
        };
        nodes.fold(self[*first].transform, |acc, node| acc * self[*node].transform)
    }
}

/// # Panics
///
/// Panics if the id does not belong to this tree.
impl Index<NodeId> for SceneTree {
    type Output = SceneNode;

    fn index(&self, id: NodeId) -> &SceneNode {
        &self.nodes[id.0]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    struct Chain {
        tree: SceneTree,
        node1: NodeId,
        node2: NodeId,
        node3: NodeId,
        t2: Transform,
        t3: Transform,
    }

    fn chain() -> Chain {
        let mut tree = SceneTree::new(Some("node1".into()));
        let node1 = tree.root();
        let node2 = tree.add_child(node1, Some("node2".into()));
        let node3 = tree.add_child(node2, Some("node3".into()));

        let mut t2 = Transform::identity();
        t2.scale(2.0, 3.0, 4.0);
        tree.set_node_transform(node2, t2);

        let mut t3 = Transform::identity();
        t3.rotate(1.0, 2.0, 3.0);
        tree.set_node_transform(node3, t3);

        tree.set_object(node1, EngineObject::Space(SpaceId::new(0)));
        tree.set_object(node2, EngineObject::Space(SpaceId::new(1)));
        tree.set_object(node3, EngineObject::Body(BodyId::new(0)));

        Chain {
            tree,
            node1,
            node2,
            node3,
            t2,
            t3,
        }
    }

    #[test]
    fn test_name_and_parent() {
        let c = chain();
        assert_eq!(c.tree[c.node1].name(), Some("node1"));
        assert_eq!(c.tree.parent(c.node2), Some(c.node1));
        assert_eq!(c.tree.parent(c.node1), None);
    }

    #[test]
    fn test_foreign_node_lookups() {
        let c = chain();
        let small = SceneTree::new(None);
        assert!(small.get(c.node3).is_none());
        assert_eq!(small.parent(c.node3), None);
        assert_eq!(small.object(c.node3), None);
        assert!(small.named_child(c.node3, "node1").is_err());
        assert!(small.first_ancestor(c.node3, NodeKind::Space).is_err());
        assert_eq!(c.tree.get(c.node3).and_then(SceneNode::name), Some("node3"));
    }

    #[test]
    fn test_children() {
        let c = chain();
        assert_eq!(c.tree.children(c.node1), &[c.node2]);
        assert_eq!(c.tree.children(c.node2), &[c.node3]);
        assert!(c.tree.children(c.node3).is_empty());
    }

    #[test]
    fn test_named_child_local() {
        let c = chain();
        assert_eq!(c.tree.named_child(c.node1, "node2").unwrap(), c.node2);
    }

    #[test]
    fn test_named_child_remote() {
        let c = chain();
        assert_eq!(c.tree.named_child(c.node1, "node3").unwrap(), c.node3);
    }

    #[test]
    fn test_named_child_not_found() {
        let c = chain();
        let err = c.tree.named_child(c.node1, "undefined").unwrap_err();
        assert!(matches!(err, XodeError::NameNotFound(ref n) if n == "undefined"));
    }

    #[test]
    fn test_named_child_rebinds_duplicate_name() {
        let mut tree = SceneTree::new(None);
        let root = tree.root();
        let _first = tree.add_child(root, Some("dup".into()));
        let second = tree.add_child(root, Some("dup".into()));
        assert_eq!(tree.named_child(root, "dup").unwrap(), second);
        assert_eq!(tree.children(root).len(), 2);
    }

    #[test]
    fn test_first_ancestor() {
        let c = chain();
        assert_eq!(
            c.tree.first_ancestor(c.node3, NodeKind::Space).unwrap(),
            c.node2
        );
    }

    #[test]
    fn test_first_ancestor_excludes_self() {
        let c = chain();
        let err = c.tree.first_ancestor(c.node3, NodeKind::Body).unwrap_err();
        assert!(matches!(err, XodeError::AncestorNotFound(NodeKind::Body)));
    }

    #[test]
    fn test_first_ancestor_skips_objectless_nodes() {
        let mut tree = SceneTree::new(None);
        let root = tree.root();
        tree.set_object(root, EngineObject::World(WorldId::new(0)));
        let plain = tree.add_child(root, None);
        let leaf = tree.add_child(plain, None);
        assert_eq!(tree.first_ancestor(leaf, NodeKind::World).unwrap(), root);
        assert_eq!(
            tree.ancestor_object(leaf, NodeKind::World),
            Some(EngineObject::World(WorldId::new(0)))
        );
        assert_eq!(tree.ancestor_object(leaf, NodeKind::Body), None);
    }

    #[test]
    fn test_initial_transform() {
        let c = chain();
        assert_eq!(*c.tree[c.node1].node_transform(), Transform::identity());
    }

    #[test]
    fn test_get_transform() {
        let c = chain();
        let expected = *c.tree[c.node1].node_transform() * c.t2 * c.t3;
        assert_eq!(c.tree.transform(c.node3), expected);
    }

    #[test]
    fn test_relative_transform() {
        let mut c = chain();
        let node4 = c.tree.add_child(c.node3, Some("node4".into()));
        let mut t4 = Transform::identity();
        t4.translate(1.0, 2.0, 3.0);
        c.tree.set_node_transform(node4, t4);

        assert_eq!(c.tree.relative_transform(node4, c.node2), c.t3 * t4);
        assert_eq!(
            c.tree.relative_transform(node4, node4),
            c.tree.transform(node4)
        );
    }

    #[test]
    fn test_transform_reflects_later_ancestor_changes() {
        let mut c = chain();
        let before = c.tree.transform(c.node3);
        let mut t1 = Transform::identity();
        t1.translate(5.0, 0.0, 0.0);
        c.tree.set_node_transform(c.node1, t1);
        assert_ne!(c.tree.transform(c.node3), before);
    }
}
