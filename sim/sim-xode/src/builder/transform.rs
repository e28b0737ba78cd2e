//! `<transform>`: accumulates a local transform for its owning node.

use std::f64::consts::PI;

use tracing::warn;

use crate::error::Result;
use crate::parser::{Attributes, Context, ElementHandler};
use crate::transform::Transform;
use crate::tree::NodeId;

const MATRIX_CELLS: [[&str; 4]; 4] = [
    ["m00", "m01", "m02", "m03"],
    ["m10", "m11", "m12", "m13"],
    ["m20", "m21", "m22", "m23"],
    ["m30", "m31", "m32", "m33"],
];

/// Folds `<matrix4f>`, `<position>` and `<euler>` children into one matrix,
/// applies the uniform `scale` last and stores the result as the owner's
/// local transform when `</transform>` is reached.
pub(super) struct TransformBuilder {
    owner: NodeId,
    scale: f64,
    transform: Transform,
}

impl TransformBuilder {
    pub(super) fn begin(owner: NodeId, attrs: &Attributes) -> Result<Self> {
        Ok(Self {
            owner,
            scale: attrs.f64_or("transform", "scale", 1.0)?,
            transform: Transform::identity(),
        })
    }

    fn matrix4f(&mut self, attrs: &Attributes) -> Result<()> {
        self.transform.set_identity();
        for (r, row) in MATRIX_CELLS.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                self.transform.set(r, c, attrs.f64("matrix4f", *cell)?);
            }
        }
        Ok(())
    }

    fn euler(&mut self, attrs: &Attributes) -> Result<()> {
        // Anything but `degrees` is read as radians.
        let coeff = match attrs.get("aformat") {
            Some("degrees") => PI / 180.0,
            Some("radians") | None => 1.0,
            Some(other) => {
                warn!(aformat = other, "unknown angle format, assuming radians");
                1.0
            }
        };
        let angles = attrs.vector3("euler")? * coeff;
        self.transform.rotate(angles.x, angles.y, angles.z);
        Ok(())
    }
}

impl ElementHandler for TransformBuilder {
    fn start(&mut self, ctx: &mut Context<'_>, tag: &str, attrs: &Attributes) -> Result<()> {
        match tag {
            "matrix4f" => self.matrix4f(attrs)?,
            "position" => {
                let p = attrs.vector3("position")?;
                self.transform.translate(p.x, p.y, p.z);
            }
            // Wrapper only; its children arrive here.
            "rotation" => {}
            "euler" => self.euler(attrs)?,
            "quaternion" | "axisangle" => {
                warn!(element = tag, "rotation format is not supported, ignoring");
            }
            _ => {
                warn!(element = tag, "unknown transform element, skipping");
                ctx.skip();
            }
        }
        Ok(())
    }

    fn end(&mut self, ctx: &mut Context<'_>, tag: &str) -> Result<()> {
        if tag == "transform" {
            self.transform.scale(self.scale, self.scale, self.scale);
            ctx.tree.set_node_transform(self.owner, self.transform);
            ctx.pop();
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    use crate::engine::MemoryEngine;
    use crate::error::{ErrorKind, XodeError};
    use crate::parser::parse_xode_str;
    use crate::tree::SceneTree;

    fn world_with(transform: &str) -> Result<SceneTree, XodeError> {
        let mut engine = MemoryEngine::new();
        parse_xode_str(
            &mut engine,
            &format!(r#"<xode><world name="w">{transform}</world></xode>"#),
        )
    }

    #[test]
    fn test_position() {
        let tree = world_with(r#"<transform><position x="1" y="2" z="3"/></transform>"#).unwrap();
        let w = tree.named_child(tree.root(), "w").unwrap();
        assert_relative_eq!(tree.transform(w).position(), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_scale_applied_last() {
        let tree = world_with(
            r#"<transform scale="2"><position x="1" y="2" z="3"/></transform>"#,
        )
        .unwrap();
        let w = tree.named_child(tree.root(), "w").unwrap();
        let t = tree[w].node_transform();
        assert_relative_eq!(t.position(), Vector3::new(2.0, 4.0, 6.0));
        assert_relative_eq!(t.get(0, 0), 2.0);
        assert_relative_eq!(t.get(3, 3), 1.0);
    }

    #[test]
    fn test_matrix4f() {
        let tree = world_with(
            r#"<transform><matrix4f
                m00="1" m01="0" m02="0" m03="0"
                m10="0" m11="1" m12="0" m13="0"
                m20="0" m21="0" m22="1" m23="0"
                m30="10" m31="20" m32="30" m33="1"/></transform>"#,
        )
        .unwrap();
        let w = tree.named_child(tree.root(), "w").unwrap();
        assert_relative_eq!(tree.transform(w).position(), Vector3::new(10.0, 20.0, 30.0));
    }

    #[test]
    fn test_matrix4f_requires_every_cell() {
        let err = world_with(r#"<transform><matrix4f m00="1"/></transform>"#).unwrap_err();
        assert!(matches!(err, XodeError::MissingAttribute { attribute: "m01", .. }));
    }

    #[test]
    fn test_euler_degrees_matches_radians() {
        let degrees = world_with(
            r#"<transform><rotation><euler x="0" y="0" z="90" aformat="degrees"/></rotation></transform>"#,
        )
        .unwrap();
        let radians = world_with(&format!(
            r#"<transform><rotation><euler x="0" y="0" z="{}"/></rotation></transform>"#,
            std::f64::consts::FRAC_PI_2
        ))
        .unwrap();

        let a = degrees.transform(degrees.named_child(degrees.root(), "w").unwrap());
        let b = radians.transform(radians.named_child(radians.root(), "w").unwrap());
        assert_relative_eq!(*a.matrix(), *b.matrix(), epsilon = 1e-12);
        assert!(!a.is_identity());
    }

    #[test]
    fn test_euler_unknown_format_is_radians() {
        let unknown = world_with(
            r#"<transform><euler x="0" y="0" z="1" aformat="gradians"/></transform>"#,
        )
        .unwrap();
        let radians =
            world_with(r#"<transform><euler x="0" y="0" z="1"/></transform>"#).unwrap();

        let a = unknown.transform(unknown.named_child(unknown.root(), "w").unwrap());
        let b = radians.transform(radians.named_child(radians.root(), "w").unwrap());
        assert_relative_eq!(*a.matrix(), *b.matrix());
    }

    #[test]
    fn test_quaternion_ignored() {
        let tree = world_with(
            r#"<transform><rotation><quaternion x="0" y="0" z="0" w="1"/></rotation></transform>"#,
        )
        .unwrap();
        let w = tree.named_child(tree.root(), "w").unwrap();
        assert!(tree.transform(w).is_identity());
    }

    #[test]
    fn test_unknown_child_is_skipped() {
        let tree = world_with(
            r#"<transform>
                <shear><position x="9" y="9" z="9"/></shear>
                <position x="1" y="2" z="3"/>
            </transform>"#,
        )
        .unwrap();
        let w = tree.named_child(tree.root(), "w").unwrap();
        assert_relative_eq!(tree.transform(w).position(), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_bad_position_value() {
        let err = world_with(r#"<transform><position x="1" y="a" z="3"/></transform>"#)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }
}
