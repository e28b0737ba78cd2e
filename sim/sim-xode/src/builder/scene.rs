//! Builders for the document root, `<world>`, `<space>` and `<jointgroup>`.

use tracing::{debug, warn};

use super::body::BodyBuilder;
use super::geom::GeomBuilder;
use super::joint::JointBuilder;
use super::transform::TransformBuilder;
use super::{add_node, ancestor_space};
use crate::error::{Result, XodeError};
use crate::parser::{Attributes, Context, ElementHandler};
use crate::tree::{EngineObject, NodeId};

/// Handles the children of the root element.
pub(crate) struct RootHandler {
    node: NodeId,
    tag: String,
}

impl RootHandler {
    pub(crate) fn new(node: NodeId, tag: &str) -> Self {
        Self {
            node,
            tag: tag.to_string(),
        }
    }
}

impl ElementHandler for RootHandler {
    fn start(&mut self, ctx: &mut Context<'_>, tag: &str, attrs: &Attributes) -> Result<()> {
        match tag {
            "world" => {
                let world = WorldBuilder::begin(ctx, self.node, attrs);
                ctx.push(world);
            }
            "ext" => {
                warn!("<ext> is not supported, skipping");
                ctx.skip();
            }
            _ => return Err(XodeError::invalid_child(&self.tag, tag)),
        }
        Ok(())
    }

    fn end(&mut self, ctx: &mut Context<'_>, tag: &str) -> Result<()> {
        if tag == self.tag {
            ctx.pop();
        }
        Ok(())
    }
}

/// `<world>`: creates an engine world.
struct WorldBuilder {
    node: NodeId,
}

impl WorldBuilder {
    fn begin(ctx: &mut Context<'_>, parent: NodeId, attrs: &Attributes) -> Self {
        let node = add_node(ctx.tree, parent, attrs);
        let world = ctx.engine.create_world();
        ctx.tree.set_object(node, EngineObject::World(world));
        debug!(name = ?attrs.get("name"), %world, "created world");
        Self { node }
    }
}

impl ElementHandler for WorldBuilder {
    fn start(&mut self, ctx: &mut Context<'_>, tag: &str, attrs: &Attributes) -> Result<()> {
        match tag {
            "transform" => ctx.push(TransformBuilder::begin(self.node, attrs)?),
            "space" => {
                let space = SpaceBuilder::begin(ctx, self.node, attrs);
                ctx.push(space);
            }
            "ext" => {
                warn!("<ext> is not supported, skipping");
                ctx.skip();
            }
            _ => return Err(XodeError::invalid_child("world", tag)),
        }
        Ok(())
    }

    fn end(&mut self, ctx: &mut Context<'_>, tag: &str) -> Result<()> {
        if tag == "world" {
            ctx.pop();
        }
        Ok(())
    }
}

/// `<space>`: creates a collision space, nested in the enclosing space if
/// there is one.
pub(super) struct SpaceBuilder {
    node: NodeId,
}

impl SpaceBuilder {
    pub(super) fn begin(ctx: &mut Context<'_>, parent: NodeId, attrs: &Attributes) -> Self {
        let node = add_node(ctx.tree, parent, attrs);
        let parent_space = ancestor_space(ctx.tree, node);
        let space = ctx.engine.create_space(parent_space);
        ctx.tree.set_object(node, EngineObject::Space(space));
        debug!(name = ?attrs.get("name"), %space, "created space");
        Self { node }
    }
}

impl ElementHandler for SpaceBuilder {
    fn start(&mut self, ctx: &mut Context<'_>, tag: &str, attrs: &Attributes) -> Result<()> {
        match tag {
            "transform" => ctx.push(TransformBuilder::begin(self.node, attrs)?),
            "geom" => {
                let geom = GeomBuilder::begin(ctx, self.node, attrs, None)?;
                ctx.push(geom);
            }
            "body" => {
                let body = BodyBuilder::begin(ctx, self.node, attrs)?;
                ctx.push(body);
            }
            "jointgroup" => {
                let group = JointGroupBuilder::begin(ctx, self.node, attrs);
                ctx.push(group);
            }
            "joint" => {
                let joint = JointBuilder::begin(ctx, self.node, attrs)?;
                ctx.push(joint);
            }
            "space" => {
                let space = SpaceBuilder::begin(ctx, self.node, attrs);
                ctx.push(space);
            }
            "group" | "ext" => {
                warn!(element = tag, "element is not supported, skipping");
                ctx.skip();
            }
            _ => return Err(XodeError::invalid_child("space", tag)),
        }
        Ok(())
    }

    fn end(&mut self, ctx: &mut Context<'_>, tag: &str) -> Result<()> {
        if tag == "space" {
            ctx.pop();
        }
        Ok(())
    }
}

/// `<jointgroup>`: creates a joint group for the joints it contains.
struct JointGroupBuilder {
    node: NodeId,
}

impl JointGroupBuilder {
    fn begin(ctx: &mut Context<'_>, parent: NodeId, attrs: &Attributes) -> Self {
        let node = add_node(ctx.tree, parent, attrs);
        let group = ctx.engine.create_joint_group();
        ctx.tree.set_object(node, EngineObject::JointGroup(group));
        Self { node }
    }
}

impl ElementHandler for JointGroupBuilder {
    fn start(&mut self, ctx: &mut Context<'_>, tag: &str, attrs: &Attributes) -> Result<()> {
        match tag {
            "joint" => {
                let joint = JointBuilder::begin(ctx, self.node, attrs)?;
                ctx.push(joint);
            }
            "ext" => {
                warn!("<ext> is not supported, skipping");
                ctx.skip();
            }
            _ => return Err(XodeError::invalid_child("jointgroup", tag)),
        }
        Ok(())
    }

    fn end(&mut self, ctx: &mut Context<'_>, tag: &str) -> Result<()> {
        if tag == "jointgroup" {
            ctx.pop();
        }
        Ok(())
    }
}
