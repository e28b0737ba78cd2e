//! XODE scene loader for rigid-body simulation.
//!
//! This crate reads XODE documents, an XML format describing worlds,
//! collision spaces, rigid bodies, masses, joints and geometries, and builds
//! a [`SceneTree`] whose nodes carry local transforms and handles to objects
//! created through an [`Engine`].
//!
//! The parser is streaming: the XML tokenizer emits start and end tags in
//! document order and a stack of element handlers consumes them, each handler
//! owning the subtree of the element that pushed it. No DOM is built.
//!
//! # Example
//!
//! ```
//! use sim_xode::{load_xode_str, JointLink};
//!
//! let scene = load_xode_str(r#"
//!     <xode>
//!         <world name="world">
//!             <space>
//!                 <body name="pendulum">
//!                     <transform><position x="0" y="0" z="2"/></transform>
//!                     <mass><mass_shape density="1"><sphere radius="0.1"/></mass_shape></mass>
//!                     <joint name="pivot"><ball><anchor x="0" y="0" z="3"/></ball></joint>
//!                 </body>
//!             </space>
//!         </world>
//!     </xode>
//! "#).expect("should load");
//!
//! let body = scene.object("pendulum").and_then(|o| o.as_body()).expect("body");
//! assert_eq!(scene.engine.body(body).expect("state").position.z, 2.0);
//!
//! let joint = scene.object("pivot").and_then(|o| o.as_joint()).expect("joint");
//! assert_eq!(scene.engine.joint(joint).expect("state").link(1), JointLink::Environment);
//! ```
//!
//! # Supported elements
//!
//! - `<world>`, `<space>` (nested spaces allowed), `<jointgroup>`
//! - `<body>` with `<torque>`, `<force>`, `<linearVel>`, `<angularVel>`,
//!   `<finiteRotation>`, `<mass>`, `<joint>`, `<geom>` and nested `<body>`
//! - `<mass>` with `<mass_shape>` (sphere), `<adjust>` and nested `<mass>`
//! - `<joint>` with `<link1>`, `<link2>` and `<ball>`
//! - `<geom>` with `<box>`, `<cappedCylinder>`, `<sphere>`, `<plane>`,
//!   `<ray>`, `<trimesh>` and nested `<geom>`
//! - `<transform>` with `<matrix4f>`, `<position>` and `<euler>`
//!
//! # Limitations
//!
//! - Quaternion and axis-angle rotations are ignored (logged as warning)
//! - `<group>`, `<ext>` and joint types other than ball are skipped
//! - Only sphere mass shapes contribute mass

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::redundant_closure_for_method_calls,
    clippy::doc_markdown,
    clippy::float_cmp,
    clippy::suboptimal_flops,
    clippy::struct_field_names,
    clippy::use_self
)]

mod builder;
mod config;
mod engine;
mod error;
mod loader;
mod parser;
mod transform;
mod tree;

pub use config::{DEFAULT_MAX_DEPTH, DEFAULT_ROOT_TAG, ParserConfig};
pub use engine::{
    BodyId, BodyState, Engine, GeomId, GeomShape, GeomState, JointGroupId, JointGroupState,
    JointId, JointKind, JointLink, JointState, MassId, MassProperties, MemoryEngine, SpaceId,
    SpaceState, WorldId, WorldState,
};
pub use error::{ErrorKind, Result, XodeError};
pub use loader::{LoadedScene, XodeLoader, load_xode_file, load_xode_str};
pub use parser::{Parser, parse_xode_str};
pub use transform::Transform;
pub use tree::{EngineObject, NodeId, NodeKind, SceneNode, SceneTree};
