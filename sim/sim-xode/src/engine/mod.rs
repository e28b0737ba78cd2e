//! The simulation engine seam.
//!
//! The loader never simulates anything itself. It creates and configures
//! engine objects through the [`Engine`] trait and records the returned
//! handles in the scene tree. [`MemoryEngine`] is a complete in-memory
//! implementation that keeps every value it is given.

mod mass;
mod memory;

use std::fmt;

use nalgebra::{Matrix3, Point3, Vector3};

pub use mass::MassProperties;
pub use memory::{
    BodyState, GeomState, JointGroupState, JointKind, JointState, MemoryEngine, SpaceState,
    WorldState,
};

macro_rules! engine_handle {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub usize);

        impl $name {
            /// Create a handle from a raw index.
            #[must_use]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// The raw index.
            #[must_use]
            pub const fn raw(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

engine_handle!(
    /// Handle to an engine world.
    WorldId,
    "World"
);
engine_handle!(
    /// Handle to a collision space.
    SpaceId,
    "Space"
);
engine_handle!(
    /// Handle to a rigid body.
    BodyId,
    "Body"
);
engine_handle!(
    /// Handle to a mass object.
    MassId,
    "Mass"
);
engine_handle!(
    /// Handle to a joint group.
    JointGroupId,
    "JointGroup"
);
engine_handle!(
    /// Handle to a joint.
    JointId,
    "Joint"
);
engine_handle!(
    /// Handle to a geometry.
    GeomId,
    "Geom"
);

/// One end of a joint: a body or the static environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointLink {
    /// The static world. There is exactly one.
    Environment,
    /// A rigid body.
    Body(BodyId),
}

impl JointLink {
    /// The body, if this link is not the environment.
    #[must_use]
    pub const fn body(self) -> Option<BodyId> {
        match self {
            Self::Environment => None,
            Self::Body(id) => Some(id),
        }
    }
}

/// Collision geometry shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum GeomShape {
    /// Box with full side lengths.
    Box {
        /// Side lengths along x, y and z.
        lengths: Vector3<f64>,
    },
    /// Capsule along the local z axis.
    CappedCylinder {
        /// Radius of the cylinder and caps.
        radius: f64,
        /// Length of the cylindrical part.
        length: f64,
    },
    /// Sphere.
    Sphere {
        /// Radius.
        radius: f64,
    },
    /// Plane `a*x + b*y + c*z = d`.
    Plane {
        /// Plane normal `(a, b, c)`.
        normal: Vector3<f64>,
        /// Offset `d`.
        offset: f64,
    },
    /// Ray along the local z axis.
    Ray {
        /// Ray length.
        length: f64,
    },
    /// Triangle mesh with zero-based vertex indices.
    TriMesh {
        /// Mesh vertices.
        vertices: Vec<Point3<f64>>,
        /// Triangles as vertex index triples.
        triangles: Vec<[usize; 3]>,
    },
}

impl GeomShape {
    /// Whether the shape can be positioned, rotated or attached to a body.
    #[must_use]
    pub const fn is_placeable(&self) -> bool {
        !matches!(self, Self::Plane { .. })
    }

    /// Short name for diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Box { .. } => "box",
            Self::CappedCylinder { .. } => "cappedCylinder",
            Self::Sphere { .. } => "sphere",
            Self::Plane { .. } => "plane",
            Self::Ray { .. } => "ray",
            Self::TriMesh { .. } => "trimesh",
        }
    }
}

/// The engine operations the loader needs.
///
/// Handles passed in are always ones the same engine returned earlier.
pub trait Engine {
    /// Create a world.
    fn create_world(&mut self) -> WorldId;
    /// Create a collision space, optionally inside another space.
    fn create_space(&mut self, parent: Option<SpaceId>) -> SpaceId;
    /// Create a body in a world.
    fn create_body(&mut self, world: WorldId) -> BodyId;
    /// Create an empty mass.
    fn create_mass(&mut self) -> MassId;
    /// Create a joint group.
    fn create_joint_group(&mut self) -> JointGroupId;
    /// Create a ball joint.
    fn create_ball_joint(&mut self, world: WorldId, group: Option<JointGroupId>) -> JointId;
    /// Create a geometry, optionally registered in a space.
    fn create_geom(&mut self, space: Option<SpaceId>, shape: GeomShape) -> GeomId;
    /// Create a transform geometry, optionally registered in a space.
    fn create_geom_transform(&mut self, space: Option<SpaceId>) -> GeomId;

    /// Disable a body.
    fn body_disable(&mut self, body: BodyId);
    /// Set whether gravity affects a body (0 disables).
    fn body_set_gravity_mode(&mut self, body: BodyId, mode: i32);
    /// Set body position.
    fn body_set_position(&mut self, body: BodyId, position: Vector3<f64>);
    /// Set body orientation.
    fn body_set_rotation(&mut self, body: BodyId, rotation: Matrix3<f64>);
    /// Set accumulated torque.
    fn body_set_torque(&mut self, body: BodyId, torque: Vector3<f64>);
    /// Set accumulated force.
    fn body_set_force(&mut self, body: BodyId, force: Vector3<f64>);
    /// Set finite rotation mode (0 or 1).
    fn body_set_finite_rotation_mode(&mut self, body: BodyId, mode: i32);
    /// Set finite rotation axis.
    fn body_set_finite_rotation_axis(&mut self, body: BodyId, axis: Vector3<f64>);
    /// Set linear velocity.
    fn body_set_linear_vel(&mut self, body: BodyId, velocity: Vector3<f64>);
    /// Set angular velocity.
    fn body_set_angular_vel(&mut self, body: BodyId, velocity: Vector3<f64>);
    /// Copy a mass onto a body.
    fn body_set_mass(&mut self, body: BodyId, mass: MassId);

    /// Make a mass a uniform sphere.
    fn mass_set_sphere(&mut self, mass: MassId, density: f64, radius: f64);
    /// Rescale a mass to a new total.
    fn mass_adjust(&mut self, mass: MassId, total: f64);
    /// Add `other` into `mass`.
    fn mass_add(&mut self, mass: MassId, other: MassId);

    /// Connect a joint to two links.
    fn joint_attach(&mut self, joint: JointId, link1: JointLink, link2: JointLink);
    /// Set a joint anchor.
    fn joint_set_anchor(&mut self, joint: JointId, anchor: Vector3<f64>);

    /// Attach a geometry to a body.
    fn geom_set_body(&mut self, geom: GeomId, body: BodyId);
    /// Set geometry position.
    fn geom_set_position(&mut self, geom: GeomId, position: Vector3<f64>);
    /// Set geometry orientation.
    fn geom_set_rotation(&mut self, geom: GeomId, rotation: Matrix3<f64>);
    /// Wrap `geom` inside the transform geometry `transform`.
    fn geom_transform_set_geom(&mut self, transform: GeomId, geom: GeomId);
}
