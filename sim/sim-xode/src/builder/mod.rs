//! Element builders.
//!
//! Each XODE element that owns an engine object has a builder. A builder is
//! created when its start tag is seen, adds its node to the tree, creates the
//! engine object and then handles the element's children until its own end
//! tag pops it off the handler stack.

mod body;
mod geom;
mod joint;
mod scene;
mod transform;

pub(crate) use scene::RootHandler;

use crate::engine::{BodyId, JointGroupId, MassId, SpaceId, WorldId};
use crate::error::{Result, XodeError};
use crate::parser::Attributes;
use crate::tree::{NodeId, NodeKind, SceneTree};

/// Add the node for a new element, registered under its `name` attribute.
fn add_node(tree: &mut SceneTree, parent: NodeId, attrs: &Attributes) -> NodeId {
    tree.add_child(parent, attrs.name())
}

/// The governing world. Every element below `<world>` has one.
fn ancestor_world(tree: &SceneTree, node: NodeId) -> Result<WorldId> {
    let ancestor = tree.first_ancestor(node, NodeKind::World)?;
    tree.object(ancestor)
        .and_then(|object| object.as_world())
        .ok_or(XodeError::AncestorNotFound(NodeKind::World))
}

fn ancestor_space(tree: &SceneTree, node: NodeId) -> Option<SpaceId> {
    tree.ancestor_object(node, NodeKind::Space)
        .and_then(|object| object.as_space())
}

fn ancestor_body(tree: &SceneTree, node: NodeId) -> Option<BodyId> {
    tree.ancestor_object(node, NodeKind::Body)
        .and_then(|object| object.as_body())
}

fn ancestor_mass(tree: &SceneTree, node: NodeId) -> Option<MassId> {
    tree.ancestor_object(node, NodeKind::Mass)
        .and_then(|object| object.as_mass())
}

fn ancestor_joint_group(tree: &SceneTree, node: NodeId) -> Option<JointGroupId> {
    tree.ancestor_object(node, NodeKind::JointGroup)
        .and_then(|object| object.as_joint_group())
}
