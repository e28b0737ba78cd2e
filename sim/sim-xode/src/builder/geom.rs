//! `<geom>` and its shape elements.

use nalgebra::{Point3, Vector3};
use tracing::{debug, warn};

use super::transform::TransformBuilder;
use super::{add_node, ancestor_body, ancestor_space};
use crate::engine::{BodyId, GeomId, GeomShape, SpaceId};
use crate::error::{Result, XodeError};
use crate::parser::{Attributes, Context, ElementHandler};
use crate::tree::{EngineObject, NodeId};

/// The geom a nested `<geom>` is wrapped into.
#[derive(Debug, Clone, Copy)]
pub(super) struct Enclosing {
    node: NodeId,
    space: Option<SpaceId>,
}

/// `<geom>`: one collision shape, or a nested `<geom>` wrapped in a
/// transform geometry.
///
/// A geom inside a body is attached to it. A free geom is placed at its
/// absolute transform. A nested geom is placed relative to the geom that
/// encloses it.
pub(super) struct GeomBuilder {
    node: NodeId,
    space: Option<SpaceId>,
    body: Option<BodyId>,
    enclosing: Option<Enclosing>,
    placeable: bool,
}

impl GeomBuilder {
    pub(super) fn begin(
        ctx: &mut Context<'_>,
        parent: NodeId,
        attrs: &Attributes,
        enclosing: Option<Enclosing>,
    ) -> Result<Self> {
        let node = add_node(ctx.tree, parent, attrs);
        // Only the outermost geom of a nest is registered in a space.
        let space = match enclosing {
            Some(_) => None,
            None => ancestor_space(ctx.tree, node),
        };
        Ok(Self {
            node,
            space,
            body: ancestor_body(ctx.tree, node),
            enclosing,
            placeable: true,
        })
    }

    /// Fail if this geom already has a shape.
    fn ensure_vacant(&self, ctx: &Context<'_>, tag: &str) -> Result<()> {
        if ctx.tree.object(self.node).is_some() {
            return Err(XodeError::invalid_geom(format!(
                "<{tag}> is a second shape; a geom holds exactly one"
            )));
        }
        Ok(())
    }

    fn attach_shape(&mut self, ctx: &mut Context<'_>, tag: &str, shape: GeomShape) -> Result<()> {
        self.ensure_vacant(ctx, tag)?;
        self.placeable = shape.is_placeable();
        let name = shape.name();
        let geom = ctx.engine.create_geom(self.space, shape);
        ctx.tree.set_object(self.node, EngineObject::Geom(geom));
        debug!(shape = name, %geom, "created geom");
        Ok(())
    }

    /// Wrap `geom` in a transform geometry owned by the enclosing node.
    fn encapsulate(&self, ctx: &mut Context<'_>, enclosing: Enclosing, geom: GeomId) -> Result<()> {
        if !self.placeable {
            return Err(XodeError::invalid_geom("a plane cannot be encapsulated"));
        }
        let t = ctx.tree.relative_transform(self.node, enclosing.node);
        ctx.engine.geom_set_position(geom, t.position());
        ctx.engine.geom_set_rotation(geom, t.rotation());

        let wrapper = ctx.engine.create_geom_transform(enclosing.space);
        ctx.engine.geom_transform_set_geom(wrapper, geom);
        ctx.tree.set_object(enclosing.node, EngineObject::Geom(wrapper));
        Ok(())
    }
}

impl ElementHandler for GeomBuilder {
    fn start(&mut self, ctx: &mut Context<'_>, tag: &str, attrs: &Attributes) -> Result<()> {
        match tag {
            "box" => {
                let lengths = Vector3::new(
                    attrs.f64(tag, "sizex")?,
                    attrs.f64(tag, "sizey")?,
                    attrs.f64(tag, "sizez")?,
                );
                self.attach_shape(ctx, tag, GeomShape::Box { lengths })?;
            }
            "cappedCylinder" => {
                let radius = attrs.f64(tag, "radius")?;
                let length = attrs.f64(tag, "length")?;
                self.attach_shape(ctx, tag, GeomShape::CappedCylinder { radius, length })?;
            }
            "sphere" => {
                let radius = attrs.f64(tag, "radius")?;
                self.attach_shape(ctx, tag, GeomShape::Sphere { radius })?;
            }
            "plane" => {
                let normal = Vector3::new(
                    attrs.f64(tag, "a")?,
                    attrs.f64(tag, "b")?,
                    attrs.f64(tag, "c")?,
                );
                let offset = attrs.f64(tag, "d")?;
                self.attach_shape(ctx, tag, GeomShape::Plane { normal, offset })?;
            }
            "ray" => {
                let length = attrs.f64(tag, "length")?;
                self.attach_shape(ctx, tag, GeomShape::Ray { length })?;
            }
            "trimesh" => {
                self.ensure_vacant(ctx, tag)?;
                ctx.push(TrimeshHandler::new(self.node, self.space));
            }
            "geom" => {
                self.ensure_vacant(ctx, tag)?;
                let enclosing = Enclosing {
                    node: self.node,
                    space: self.space,
                };
                let inner = Self::begin(ctx, self.node, attrs, Some(enclosing))?;
                ctx.push(inner);
            }
            "transform" => ctx.push(TransformBuilder::begin(self.node, attrs)?),
            "ext" => {
                warn!("<ext> is not supported, skipping");
                ctx.skip();
            }
            _ => return Err(XodeError::invalid_child("geom", tag)),
        }
        Ok(())
    }

    fn end(&mut self, ctx: &mut Context<'_>, tag: &str) -> Result<()> {
        if tag != "geom" {
            return Ok(());
        }

        let geom = ctx
            .tree
            .object(self.node)
            .and_then(|object| object.as_geom())
            .ok_or_else(|| XodeError::invalid_geom("no shape element found"))?;

        if let Some(enclosing) = self.enclosing {
            self.encapsulate(ctx, enclosing, geom)?;
        } else if let Some(body) = self.body {
            if !self.placeable {
                return Err(XodeError::invalid_geom("a plane cannot be attached to a body"));
            }
            ctx.engine.geom_set_body(geom, body);
            if !ctx.tree[self.node].node_transform().is_identity() {
                warn!(
                    %geom,
                    "transform of a body-attached geom is ignored; wrap the shape in a nested <geom> to offset it"
                );
            }
        } else if self.placeable {
            let t = ctx.tree.transform(self.node);
            ctx.engine.geom_set_position(geom, t.position());
            ctx.engine.geom_set_rotation(geom, t.rotation());
        }

        ctx.pop();
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MeshSection {
    Outside,
    Vertices,
    Triangles,
}

/// `<trimesh>`: collects `<vertices>/<v>` and `<triangles>/<t>` and creates
/// the mesh geom when it closes.
struct TrimeshHandler {
    node: NodeId,
    space: Option<SpaceId>,
    section: MeshSection,
    vertices: Vec<Point3<f64>>,
    triangles: Vec<[usize; 3]>,
}

impl TrimeshHandler {
    fn new(node: NodeId, space: Option<SpaceId>) -> Self {
        Self {
            node,
            space,
            section: MeshSection::Outside,
            vertices: Vec::new(),
            triangles: Vec::new(),
        }
    }

    /// Triangle indices are 1-based in the document.
    fn zero_based(&self, triangle: [usize; 3]) -> Result<[usize; 3]> {
        let count = self.vertices.len();
        let mut out = [0; 3];
        for (slot, index) in out.iter_mut().zip(triangle) {
            if index == 0 || index > count {
                return Err(XodeError::invalid_geom(format!(
                    "triangle index {index} outside 1..={count}"
                )));
            }
            *slot = index - 1;
        }
        Ok(out)
    }
}

impl ElementHandler for TrimeshHandler {
    fn start(&mut self, _ctx: &mut Context<'_>, tag: &str, attrs: &Attributes) -> Result<()> {
        match (self.section, tag) {
            (MeshSection::Outside, "vertices") => self.section = MeshSection::Vertices,
            (MeshSection::Outside, "triangles") => self.section = MeshSection::Triangles,
            (MeshSection::Vertices, "v") => {
                self.vertices.push(Point3::from(attrs.vector3(tag)?));
            }
            (MeshSection::Triangles, "t") => self.triangles.push([
                attrs.usize(tag, "ia")?,
                attrs.usize(tag, "ib")?,
                attrs.usize(tag, "ic")?,
            ]),
            (MeshSection::Outside, _) => return Err(XodeError::invalid_child("trimesh", tag)),
            (MeshSection::Vertices, _) => return Err(XodeError::invalid_child("vertices", tag)),
            (MeshSection::Triangles, _) => {
                return Err(XodeError::invalid_child("triangles", tag));
            }
        }
        Ok(())
    }

    fn end(&mut self, ctx: &mut Context<'_>, tag: &str) -> Result<()> {
        match tag {
            "vertices" | "triangles" => self.section = MeshSection::Outside,
            "trimesh" => {
                let triangles = self
                    .triangles
                    .iter()
                    .map(|t| self.zero_based(*t))
                    .collect::<Result<Vec<_>>>()?;
                let shape = GeomShape::TriMesh {
                    vertices: std::mem::take(&mut self.vertices),
                    triangles,
                };
                let name = shape.name();
                let geom = ctx.engine.create_geom(self.space, shape);
                ctx.tree.set_object(self.node, EngineObject::Geom(geom));
                debug!(shape = name, %geom, "created geom");
                ctx.pop();
            }
            _ => {}
        }
        Ok(())
    }
}
