//! Builders for `<body>` and `<mass>`.

use nalgebra::Vector3;
use tracing::{debug, warn};

use super::geom::GeomBuilder;
use super::joint::JointBuilder;
use super::transform::TransformBuilder;
use super::{add_node, ancestor_body, ancestor_mass, ancestor_world};
use crate::engine::{BodyId, MassId};
use crate::error::{Result, XodeError};
use crate::parser::{Attributes, Context, ElementHandler};
use crate::tree::{EngineObject, NodeId, NodeKind};

/// `<body>`: creates a rigid body in the governing world.
///
/// The body's local transform is committed to the engine once, when the
/// first child other than `<transform>` starts or, failing that, when the
/// body closes.
pub(super) struct BodyBuilder {
    node: NodeId,
    body: BodyId,
    mass: Option<MassId>,
    transformed: bool,
}

impl BodyBuilder {
    pub(super) fn begin(ctx: &mut Context<'_>, parent: NodeId, attrs: &Attributes) -> Result<Self> {
        let node = add_node(ctx.tree, parent, attrs);
        let world = ancestor_world(ctx.tree, node)?;
        let body = ctx.engine.create_body(world);
        ctx.tree.set_object(node, EngineObject::Body(body));

        match attrs.get("enabled").unwrap_or("true") {
            "true" => {}
            "false" => ctx.engine.body_disable(body),
            _ => {
                return Err(XodeError::invalid_attribute(
                    "enabled",
                    "body",
                    "must be 'true' or 'false'",
                ));
            }
        }

        if attrs.i32_or("body", "gravitymode", 1)? == 0 {
            ctx.engine.body_set_gravity_mode(body, 0);
        }

        debug!(name = ?attrs.get("name"), %body, %world, "created body");
        Ok(Self {
            node,
            body,
            mass: None,
            transformed: false,
        })
    }

    fn apply_transform(&mut self, ctx: &mut Context<'_>) {
        if self.transformed {
            return;
        }
        let t = ctx.tree.transform(self.node);
        ctx.engine.body_set_position(self.body, t.position());
        ctx.engine.body_set_rotation(self.body, t.rotation());
        self.transformed = true;
    }

    fn finite_rotation(&mut self, ctx: &mut Context<'_>, attrs: &Attributes) -> Result<()> {
        let mode = attrs.i32("finiteRotation", "mode")?;
        let axis = Vector3::new(
            attrs.f64("finiteRotation", "xaxis")?,
            attrs.f64("finiteRotation", "yaxis")?,
            attrs.f64("finiteRotation", "zaxis")?,
        );
        if !matches!(mode, 0 | 1) {
            return Err(XodeError::invalid_attribute(
                "mode",
                "finiteRotation",
                "must be 0 or 1",
            ));
        }
        ctx.engine.body_set_finite_rotation_mode(self.body, mode);
        ctx.engine.body_set_finite_rotation_axis(self.body, axis);
        Ok(())
    }
}

impl ElementHandler for BodyBuilder {
    fn start(&mut self, ctx: &mut Context<'_>, tag: &str, attrs: &Attributes) -> Result<()> {
        if tag != "transform" {
            self.apply_transform(ctx);
        }

        match tag {
            "transform" => ctx.push(TransformBuilder::begin(self.node, attrs)?),
            "torque" => {
                let torque = attrs.vector3(tag)?;
                ctx.engine.body_set_torque(self.body, torque);
            }
            "force" => {
                let force = attrs.vector3(tag)?;
                ctx.engine.body_set_force(self.body, force);
            }
            "finiteRotation" => self.finite_rotation(ctx, attrs)?,
            "linearVel" => {
                let velocity = attrs.vector3(tag)?;
                ctx.engine.body_set_linear_vel(self.body, velocity);
            }
            "angularVel" => {
                let velocity = attrs.vector3(tag)?;
                ctx.engine.body_set_angular_vel(self.body, velocity);
            }
            "mass" => {
                let mass = MassBuilder::begin(ctx, self.node, attrs)?;
                self.mass = Some(mass.mass);
                ctx.push(mass);
            }
            "joint" => {
                let joint = JointBuilder::begin(ctx, self.node, attrs)?;
                ctx.push(joint);
            }
            "geom" => {
                let geom = GeomBuilder::begin(ctx, self.node, attrs, None)?;
                ctx.push(geom);
            }
            "body" => {
                let body = Self::begin(ctx, self.node, attrs)?;
                ctx.push(body);
            }
            "ext" => {
                warn!("<ext> is not supported, skipping");
                ctx.skip();
            }
            _ => return Err(XodeError::invalid_child("body", tag)),
        }
        Ok(())
    }

    fn end(&mut self, ctx: &mut Context<'_>, tag: &str) -> Result<()> {
        if tag == "body" {
            ctx.pop();
            self.apply_transform(ctx);
            if let Some(mass) = self.mass {
                ctx.engine.body_set_mass(self.body, mass);
            }
        }
        Ok(())
    }
}

/// `<mass>`: creates a mass and immediately installs it on the nearest body.
///
/// A nested `<mass>` is added into its enclosing mass when it closes.
struct MassBuilder {
    node: NodeId,
    mass: MassId,
}

impl MassBuilder {
    fn begin(ctx: &mut Context<'_>, parent: NodeId, attrs: &Attributes) -> Result<Self> {
        let node = add_node(ctx.tree, parent, attrs);
        let mass = ctx.engine.create_mass();
        ctx.tree.set_object(node, EngineObject::Mass(mass));

        let body =
            ancestor_body(ctx.tree, node).ok_or(XodeError::AncestorNotFound(NodeKind::Body))?;
        ctx.engine.body_set_mass(body, mass);
        Ok(Self { node, mass })
    }
}

impl ElementHandler for MassBuilder {
    fn start(&mut self, ctx: &mut Context<'_>, tag: &str, attrs: &Attributes) -> Result<()> {
        match tag {
            "mass_shape" => ctx.push(MassShapeHandler {
                mass: self.mass,
                density: attrs.f64_opt("mass_shape", "density")?,
            }),
            "adjust" => {
                let total = attrs.f64("adjust", "total")?;
                ctx.engine.mass_adjust(self.mass, total);
            }
            "mass" => {
                let mass = Self::begin(ctx, self.node, attrs)?;
                ctx.push(mass);
            }
            "mass_struct" | "transform" => {
                warn!(element = tag, "not supported inside <mass>, skipping");
                ctx.skip();
            }
            _ => return Err(XodeError::invalid_child("mass", tag)),
        }
        Ok(())
    }

    fn end(&mut self, ctx: &mut Context<'_>, tag: &str) -> Result<()> {
        if tag == "mass" {
            if let Some(parent) = ancestor_mass(ctx.tree, self.node) {
                ctx.engine.mass_add(parent, self.mass);
            }
            ctx.pop();
        }
        Ok(())
    }
}

/// `<mass_shape>`: sets the mass from a shape and an optional density.
struct MassShapeHandler {
    mass: MassId,
    density: Option<f64>,
}

impl ElementHandler for MassShapeHandler {
    fn start(&mut self, ctx: &mut Context<'_>, tag: &str, attrs: &Attributes) -> Result<()> {
        if tag == "sphere" {
            let radius = attrs.f64_or("sphere", "radius", 1.0)?;
            if let Some(density) = self.density {
                ctx.engine.mass_set_sphere(self.mass, density, radius);
            }
        } else {
            warn!(element = tag, "mass shape is not supported, skipping");
            ctx.skip();
        }
        Ok(())
    }

    fn end(&mut self, ctx: &mut Context<'_>, tag: &str) -> Result<()> {
        if tag == "mass_shape" {
            ctx.pop();
        }
        Ok(())
    }
}
