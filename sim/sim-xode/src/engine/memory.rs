//! In-memory engine that records every object and setting.

use nalgebra::{Matrix3, Vector3};

use super::{
    BodyId, Engine, GeomId, GeomShape, JointGroupId, JointId, JointLink, MassId, MassProperties,
    SpaceId, WorldId,
};

/// A recorded world.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldState {
    /// Bodies created in this world, in creation order.
    pub bodies: Vec<BodyId>,
    /// Joints created in this world, in creation order.
    pub joints: Vec<JointId>,
}

/// A recorded collision space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpaceState {
    /// Enclosing space, if any.
    pub parent: Option<SpaceId>,
    /// Geometries registered directly in this space.
    pub geoms: Vec<GeomId>,
}

/// A recorded rigid body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyState {
    /// Owning world.
    pub world: WorldId,
    /// Whether the body takes part in simulation.
    pub enabled: bool,
    /// Gravity mode (0 = no gravity).
    pub gravity_mode: i32,
    /// Position.
    pub position: Vector3<f64>,
    /// Orientation.
    pub rotation: Matrix3<f64>,
    /// Accumulated torque.
    pub torque: Vector3<f64>,
    /// Accumulated force.
    pub force: Vector3<f64>,
    /// Finite rotation mode.
    pub finite_rotation_mode: i32,
    /// Finite rotation axis.
    pub finite_rotation_axis: Vector3<f64>,
    /// Linear velocity.
    pub linear_vel: Vector3<f64>,
    /// Angular velocity.
    pub angular_vel: Vector3<f64>,
    /// Mass properties, copied at `body_set_mass` time.
    pub mass: MassProperties,
}

impl BodyState {
    fn new(world: WorldId) -> Self {
        Self {
            world,
            enabled: true,
            gravity_mode: 1,
            position: Vector3::zeros(),
            rotation: Matrix3::identity(),
            torque: Vector3::zeros(),
            force: Vector3::zeros(),
            finite_rotation_mode: 0,
            finite_rotation_axis: Vector3::zeros(),
            linear_vel: Vector3::zeros(),
            angular_vel: Vector3::zeros(),
            mass: MassProperties::zero(),
        }
    }
}

/// A recorded joint group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JointGroupState {
    /// Joints created in this group.
    pub joints: Vec<JointId>,
}

/// Joint types the engine can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointKind {
    /// Ball-and-socket joint.
    Ball,
}

/// A recorded joint.
#[derive(Debug, Clone, PartialEq)]
pub struct JointState {
    /// Joint type.
    pub kind: JointKind,
    /// Owning world.
    pub world: WorldId,
    /// Owning joint group, if any.
    pub group: Option<JointGroupId>,
    /// Attached links, once `joint_attach` ran.
    pub links: Option<(JointLink, JointLink)>,
    /// Anchor point, if set.
    pub anchor: Option<Vector3<f64>>,
}

impl JointState {
    /// The link at `index` (0 or 1); unattached joints report the environment.
    #[must_use]
    pub fn link(&self, index: usize) -> JointLink {
        match (self.links, index) {
            (Some((l1, _)), 0) => l1,
            (Some((_, l2)), 1) => l2,
            _ => JointLink::Environment,
        }
    }
}

/// A recorded geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct GeomState {
    /// Space the geometry is registered in.
    pub space: Option<SpaceId>,
    /// Shape, or `None` for a transform geometry.
    pub shape: Option<GeomShape>,
    /// Body the geometry is attached to.
    pub body: Option<BodyId>,
    /// Position.
    pub position: Vector3<f64>,
    /// Orientation.
    pub rotation: Matrix3<f64>,
    /// Geometry wrapped by a transform geometry.
    pub encapsulated: Option<GeomId>,
}

impl GeomState {
    fn new(space: Option<SpaceId>, shape: Option<GeomShape>) -> Self {
        Self {
            space,
            shape,
            body: None,
            position: Vector3::zeros(),
            rotation: Matrix3::identity(),
            encapsulated: None,
        }
    }

    /// Whether this is a transform geometry.
    #[must_use]
    pub fn is_transform(&self) -> bool {
        self.shape.is_none()
    }
}

/// An [`Engine`] that stores everything in plain vectors indexed by handle.
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    worlds: Vec<WorldState>,
    spaces: Vec<SpaceState>,
    bodies: Vec<BodyState>,
    masses: Vec<MassProperties>,
    joint_groups: Vec<JointGroupState>,
    joints: Vec<JointState>,
    geoms: Vec<GeomState>,
}

impl MemoryEngine {
    /// Create an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a world.
    pub fn world(&self, id: WorldId) -> Option<&WorldState> {
        self.worlds.get(id.raw())
    }

    /// Look up a space.
    pub fn space(&self, id: SpaceId) -> Option<&SpaceState> {
        self.spaces.get(id.raw())
    }

    /// Look up a body.
    pub fn body(&self, id: BodyId) -> Option<&BodyState> {
        self.bodies.get(id.raw())
    }

    /// Look up a mass.
    pub fn mass(&self, id: MassId) -> Option<&MassProperties> {
        self.masses.get(id.raw())
    }

    /// Look up a joint group.
    pub fn joint_group(&self, id: JointGroupId) -> Option<&JointGroupState> {
        self.joint_groups.get(id.raw())
    }

    /// Look up a joint.
    pub fn joint(&self, id: JointId) -> Option<&JointState> {
        self.joints.get(id.raw())
    }

    /// Look up a geometry.
    pub fn geom(&self, id: GeomId) -> Option<&GeomState> {
        self.geoms.get(id.raw())
    }

    /// Number of worlds.
    pub fn world_count(&self) -> usize {
        self.worlds.len()
    }

    /// Number of bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of joints.
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Number of geometries.
    pub fn geom_count(&self) -> usize {
        self.geoms.len()
    }

    fn body_mut(&mut self, id: BodyId) -> Option<&mut BodyState> {
        self.bodies.get_mut(id.raw())
    }

    fn geom_mut(&mut self, id: GeomId) -> Option<&mut GeomState> {
        self.geoms.get_mut(id.raw())
    }
}

impl Engine for MemoryEngine {
    fn create_world(&mut self) -> WorldId {
        self.worlds.push(WorldState::default());
        WorldId::new(self.worlds.len() - 1)
    }

    fn create_space(&mut self, parent: Option<SpaceId>) -> SpaceId {
        self.spaces.push(SpaceState {
            parent,
            geoms: Vec::new(),
        });
        SpaceId::new(self.spaces.len() - 1)
    }

    fn create_body(&mut self, world: WorldId) -> BodyId {
        let id = BodyId::new(self.bodies.len());
        self.bodies.push(BodyState::new(world));
        if let Some(w) = self.worlds.get_mut(world.raw()) {
            w.bodies.push(id);
        }
        id
    }

    fn create_mass(&mut self) -> MassId {
        self.masses.push(MassProperties::zero());
        MassId::new(self.masses.len() - 1)
    }

    fn create_joint_group(&mut self) -> JointGroupId {
        self.joint_groups.push(JointGroupState::default());
        JointGroupId::new(self.joint_groups.len() - 1)
    }

    fn create_ball_joint(&mut self, world: WorldId, group: Option<JointGroupId>) -> JointId {
        let id = JointId::new(self.joints.len());
        self.joints.push(JointState {
            kind: JointKind::Ball,
            world,
            group,
            links: None,
            anchor: None,
        });
        if let Some(w) = self.worlds.get_mut(world.raw()) {
            w.joints.push(id);
        }
        if let Some(g) = group.and_then(|g| self.joint_groups.get_mut(g.raw())) {
            g.joints.push(id);
        }
        id
    }

    fn create_geom(&mut self, space: Option<SpaceId>, shape: GeomShape) -> GeomId {
        let id = GeomId::new(self.geoms.len());
        self.geoms.push(GeomState::new(space, Some(shape)));
        if let Some(s) = space.and_then(|s| self.spaces.get_mut(s.raw())) {
            s.geoms.push(id);
        }
        id
    }

    fn create_geom_transform(&mut self, space: Option<SpaceId>) -> GeomId {
        let id = GeomId::new(self.geoms.len());
        self.geoms.push(GeomState::new(space, None));
        if let Some(s) = space.and_then(|s| self.spaces.get_mut(s.raw())) {
            s.geoms.push(id);
        }
        id
    }

    fn body_disable(&mut self, body: BodyId) {
        if let Some(b) = self.body_mut(body) {
            b.enabled = false;
        }
    }

    fn body_set_gravity_mode(&mut self, body: BodyId, mode: i32) {
        if let Some(b) = self.body_mut(body) {
            b.gravity_mode = mode;
        }
    }

    fn body_set_position(&mut self, body: BodyId, position: Vector3<f64>) {
        if let Some(b) = self.body_mut(body) {
            b.position = position;
        }
    }

    fn body_set_rotation(&mut self, body: BodyId, rotation: Matrix3<f64>) {
        if let Some(b) = self.body_mut(body) {
            b.rotation = rotation;
        }
    }

    fn body_set_torque(&mut self, body: BodyId, torque: Vector3<f64>) {
        if let Some(b) = self.body_mut(body) {
            b.torque = torque;
        }
    }

    fn body_set_force(&mut self, body: BodyId, force: Vector3<f64>) {
        if let Some(b) = self.body_mut(body) {
            b.force = force;
        }
    }

    fn body_set_finite_rotation_mode(&mut self, body: BodyId, mode: i32) {
        if let Some(b) = self.body_mut(body) {
            b.finite_rotation_mode = mode;
        }
    }

    fn body_set_finite_rotation_axis(&mut self, body: BodyId, axis: Vector3<f64>) {
        if let Some(b) = self.body_mut(body) {
            b.finite_rotation_axis = axis;
        }
    }

    fn body_set_linear_vel(&mut self, body: BodyId, velocity: Vector3<f64>) {
        if let Some(b) = self.body_mut(body) {
            b.linear_vel = velocity;
        }
    }

    fn body_set_angular_vel(&mut self, body: BodyId, velocity: Vector3<f64>) {
        if let Some(b) = self.body_mut(body) {
            b.angular_vel = velocity;
        }
    }

    fn body_set_mass(&mut self, body: BodyId, mass: MassId) {
        let Some(props) = self.masses.get(mass.raw()).copied() else {
            return;
        };
        if let Some(b) = self.body_mut(body) {
            b.mass = props;
        }
    }

    fn mass_set_sphere(&mut self, mass: MassId, density: f64, radius: f64) {
        if let Some(m) = self.masses.get_mut(mass.raw()) {
            *m = MassProperties::sphere_with_density(density, radius);
        }
    }

    fn mass_adjust(&mut self, mass: MassId, total: f64) {
        if let Some(m) = self.masses.get_mut(mass.raw()) {
            m.adjust(total);
        }
    }

    fn mass_add(&mut self, mass: MassId, other: MassId) {
        let Some(other) = self.masses.get(other.raw()).copied() else {
            return;
        };
        if let Some(m) = self.masses.get_mut(mass.raw()) {
            m.add(&other);
        }
    }

    fn joint_attach(&mut self, joint: JointId, link1: JointLink, link2: JointLink) {
        if let Some(j) = self.joints.get_mut(joint.raw()) {
            j.links = Some((link1, link2));
        }
    }

    fn joint_set_anchor(&mut self, joint: JointId, anchor: Vector3<f64>) {
        if let Some(j) = self.joints.get_mut(joint.raw()) {
            j.anchor = Some(anchor);
        }
    }

    fn geom_set_body(&mut self, geom: GeomId, body: BodyId) {
        let Some(b) = self.bodies.get(body.raw()) else {
            return;
        };
        let (position, rotation) = (b.position, b.rotation);
        if let Some(g) = self.geom_mut(geom) {
            g.body = Some(body);
            g.position = position;
            g.rotation = rotation;
        }
    }

    fn geom_set_position(&mut self, geom: GeomId, position: Vector3<f64>) {
        if let Some(g) = self.geom_mut(geom) {
            g.position = position;
        }
    }

    fn geom_set_rotation(&mut self, geom: GeomId, rotation: Matrix3<f64>) {
        if let Some(g) = self.geom_mut(geom) {
            g.rotation = rotation;
        }
    }

    fn geom_transform_set_geom(&mut self, transform: GeomId, geom: GeomId) {
        if let Some(g) = self.geom_mut(transform) {
            g.encapsulated = Some(geom);
        }
    }
}
