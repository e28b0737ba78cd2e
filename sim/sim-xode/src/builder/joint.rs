//! `<joint>` and its `<ball>` type element.

use nalgebra::Vector3;
use tracing::{debug, warn};

use super::{add_node, ancestor_body, ancestor_joint_group, ancestor_world};
use crate::engine::{BodyId, JointGroupId, JointLink, WorldId};
use crate::error::{Result, XodeError};
use crate::parser::{Attributes, Context, ElementHandler};
use crate::tree::{EngineObject, NodeId, SceneTree};

/// Joint types that are recognised but not built.
const UNSUPPORTED_TYPES: &[&str] = &[
    "fixed",
    "hinge",
    "hinge2",
    "slider",
    "universal",
    "amotor",
    "ext",
];

/// `<joint>`: collects `<link1>`/`<link2>` references and builds the joint
/// when its type element closes.
pub(super) struct JointBuilder {
    node: NodeId,
    world: WorldId,
    group: Option<JointGroupId>,
    body: Option<BodyId>,
    link1: Option<String>,
    link2: Option<String>,
}

impl JointBuilder {
    pub(super) fn begin(ctx: &mut Context<'_>, parent: NodeId, attrs: &Attributes) -> Result<Self> {
        let node = add_node(ctx.tree, parent, attrs);
        Ok(Self {
            node,
            world: ancestor_world(ctx.tree, node)?,
            group: ancestor_joint_group(ctx.tree, node),
            body: ancestor_body(ctx.tree, node),
            link1: None,
            link2: None,
        })
    }

    /// Resolve both ends of the joint.
    ///
    /// An unnamed link falls back to the containing body, which only the
    /// first unnamed link can claim; after that it falls back to the
    /// environment.
    fn links(&self, tree: &SceneTree) -> Result<(JointLink, JointLink)> {
        let mut implicit = self.body.map_or(JointLink::Environment, JointLink::Body);

        let link1 = match &self.link1 {
            Some(name) => resolve_link(tree, name)?,
            None => std::mem::replace(&mut implicit, JointLink::Environment),
        };
        let link2 = match &self.link2 {
            Some(name) => resolve_link(tree, name)?,
            None => implicit,
        };

        if link1 == link2 {
            return Err(XodeError::IdenticalLinks);
        }
        Ok((link1, link2))
    }
}

/// Look up a link target anywhere in the tree parsed so far.
fn resolve_link(tree: &SceneTree, name: &str) -> Result<JointLink> {
    let node = tree
        .named_child(tree.root(), name)
        .map_err(|_| XodeError::UnresolvedLink(name.to_string()))?;
    tree.object(node)
        .and_then(|object| object.as_body())
        .map(JointLink::Body)
        .ok_or_else(|| XodeError::LinkNotBody(name.to_string()))
}

impl ElementHandler for JointBuilder {
    fn start(&mut self, ctx: &mut Context<'_>, tag: &str, attrs: &Attributes) -> Result<()> {
        match tag {
            "link1" => self.link1 = Some(attrs.require(tag, "body")?.to_string()),
            "link2" => self.link2 = Some(attrs.require(tag, "body")?.to_string()),
            "ball" => {
                let (link1, link2) = self.links(ctx.tree)?;
                ctx.push(BallHandler {
                    node: self.node,
                    world: self.world,
                    group: self.group,
                    link1,
                    link2,
                    anchor: None,
                });
            }
            _ if UNSUPPORTED_TYPES.contains(&tag) => {
                warn!(element = tag, "joint type is not supported, skipping");
                ctx.skip();
            }
            _ => return Err(XodeError::invalid_child("joint", tag)),
        }
        Ok(())
    }

    fn end(&mut self, ctx: &mut Context<'_>, tag: &str) -> Result<()> {
        if tag == "joint" {
            if ctx.tree.object(self.node).is_none() {
                return Err(XodeError::MissingJointType);
            }
            ctx.pop();
        }
        Ok(())
    }
}

/// `<ball>`: a ball-and-socket joint with an optional anchor.
struct BallHandler {
    node: NodeId,
    world: WorldId,
    group: Option<JointGroupId>,
    link1: JointLink,
    link2: JointLink,
    anchor: Option<Vector3<f64>>,
}

impl ElementHandler for BallHandler {
    fn start(&mut self, _ctx: &mut Context<'_>, tag: &str, attrs: &Attributes) -> Result<()> {
        match tag {
            "anchor" => self.anchor = Some(attrs.vector3(tag)?),
            _ => return Err(XodeError::invalid_child("ball", tag)),
        }
        Ok(())
    }

    fn end(&mut self, ctx: &mut Context<'_>, tag: &str) -> Result<()> {
        if tag == "ball" {
            let joint = ctx.engine.create_ball_joint(self.world, self.group);
            ctx.engine.joint_attach(joint, self.link1, self.link2);
            if let Some(anchor) = self.anchor {
                ctx.engine.joint_set_anchor(joint, anchor);
            }
            ctx.tree.set_object(self.node, EngineObject::Joint(joint));
            debug!(%joint, link1 = ?self.link1, link2 = ?self.link2, "created ball joint");
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

    use crate::engine::{JointLink, JointState, MemoryEngine};
    use crate::error::{ErrorKind, XodeError};
    use crate::parser::parse_xode_str;
    use crate::tree::SceneTree;

    fn in_space(content: &str) -> Result<(SceneTree, MemoryEngine), XodeError> {
        let mut engine = MemoryEngine::new();
        let tree = parse_xode_str(
            &mut engine,
            &format!(r#"<xode><world><space>{content}</space></world></xode>"#),
        )?;
        Ok((tree, engine))
    }

    fn joint<'e>(tree: &SceneTree, engine: &'e MemoryEngine, name: &str) -> &'e JointState {
        let id = tree
            .object(tree.named_child(tree.root(), name).unwrap())
            .unwrap()
            .as_joint()
            .unwrap();
        engine.joint(id).unwrap()
    }

    fn body_link(tree: &SceneTree, name: &str) -> JointLink {
        let node = tree.named_child(tree.root(), name).unwrap();
        JointLink::Body(tree.object(node).unwrap().as_body().unwrap())
    }

    #[test]
    fn test_implicit_body_and_environment() {
        let (tree, engine) = in_space(r#"<body name="b"><joint name="j"><ball/></joint></body>"#)
            .unwrap();
        let j = joint(&tree, &engine, "j");
        assert_eq!(j.link(0), body_link(&tree, "b"));
        assert_eq!(j.link(1), JointLink::Environment);
        assert_eq!(j.anchor, None);
    }

    #[test]
    fn test_explicit_links_and_anchor() {
        let (tree, engine) = in_space(
            r#"<body name="a"/><body name="b"/>
            <joint name="j">
                <link1 body="a"/><link2 body="b"/>
                <ball><anchor x="1" y="2" z="3"/></ball>
            </joint>"#,
        )
        .unwrap();
        let j = joint(&tree, &engine, "j");
        assert_eq!(j.link(0), body_link(&tree, "a"));
        assert_eq!(j.link(1), body_link(&tree, "b"));
        assert_relative_eq!(j.anchor.unwrap(), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_link2_takes_containing_body_when_link1_named() {
        let (tree, engine) = in_space(
            r#"<body name="a"/>
            <body name="b"><joint name="j"><link1 body="a"/><ball/></joint></body>"#,
        )
        .unwrap();
        let j = joint(&tree, &engine, "j");
        assert_eq!(j.link(0), body_link(&tree, "a"));
        assert_eq!(j.link(1), body_link(&tree, "b"));
    }

    #[test]
    fn test_links_resolve_across_subtrees() {
        let (tree, engine) = in_space(
            r#"<space><body name="far"/></space>
            <body name="b"><joint name="j"><link2 body="far"/><ball/></joint></body>"#,
        )
        .unwrap();
        let j = joint(&tree, &engine, "j");
        assert_eq!(j.link(0), body_link(&tree, "b"));
        assert_eq!(j.link(1), body_link(&tree, "far"));
    }

    #[test]
    fn test_two_environments_fail() {
        let err = in_space(r#"<joint><ball/></joint>"#).unwrap_err();
        assert!(matches!(err, XodeError::IdenticalLinks));
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_same_body_twice_fails() {
        let err = in_space(
            r#"<body name="a"/><joint><link1 body="a"/><link2 body="a"/><ball/></joint>"#,
        )
        .unwrap_err();
        assert!(matches!(err, XodeError::IdenticalLinks));
    }

    #[test]
    fn test_forward_reference_fails() {
        let err = in_space(
            r#"<body name="a"><joint><link2 body="later"/><ball/></joint></body>
            <body name="later"/>"#,
        )
        .unwrap_err();
        assert!(matches!(err, XodeError::UnresolvedLink(ref name) if name == "later"));
    }

    #[test]
    fn test_link_to_non_body_fails() {
        let err = in_space(
            r#"<body name="a"><mass name="m"/><joint><link2 body="m"/><ball/></joint></body>"#,
        )
        .unwrap_err();
        assert!(matches!(err, XodeError::LinkNotBody(ref name) if name == "m"));
    }

    #[test]
    fn test_missing_type() {
        let err = in_space(r#"<body><joint/></body>"#).unwrap_err();
        assert!(matches!(err, XodeError::MissingJointType));
    }

    #[test]
    fn test_unsupported_type_is_skipped_but_still_missing() {
        let err = in_space(r#"<body><joint><hinge><axis x="0" y="0" z="1"/></hinge></joint></body>"#)
            .unwrap_err();
        assert!(matches!(err, XodeError::MissingJointType));
    }

    #[test]
    fn test_wrong_type() {
        let err = in_space(r#"<body><joint><test/></joint></body>"#).unwrap_err();
        assert!(matches!(
            err,
            XodeError::InvalidChild { ref parent, ref child } if parent == "joint" && child == "test"
        ));
    }

    #[test]
    fn test_ball_child_error() {
        let err = in_space(r#"<body><joint><ball><axis/></ball></joint></body>"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Child);
    }

    #[test]
    fn test_link_requires_body_attribute() {
        let err = in_space(r#"<body><joint><link1/><ball/></joint></body>"#).unwrap_err();
        assert!(matches!(err, XodeError::MissingAttribute { attribute: "body", .. }));
    }
}
