use faer::{Col, Mat};
use serde::{Deserialize, Serialize};

use crate::{
    config::RigidBodyConfig,
    error::{require_positive, ConfigError, Result},
    frame::CoordinateFrame,
    quaternion::Quaternion,
    util::{add, add_assign, cross, dot, scale, sub},
};

/// Load accumulation and time integration of a body.
pub trait PhysicsBody {
    /// Zeroes the force and torque accumulators
    fn reset_loads(&mut self);

    /// Adds a world force acting through the centre of mass
    fn add_world_force(&mut self, force: &[f64; 3]);

    /// Adds a world force acting at a world point
    fn add_world_force_at(&mut self, force: &[f64; 3], point: &[f64; 3]);

    /// Adds a world torque about the centre of mass
    fn add_world_torque(&mut self, torque: &[f64; 3]);

    /// Advances the state by `dt` under the accumulated loads
    fn integrate(&mut self, dt: f64);
}

/// Degrees of freedom that respond to loads.
///
/// Translation flags refer to world axes, rotation flags to body axes. The
/// velocity components of locked axes are held at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveDofs {
    pub translation: [bool; 3],
    pub rotation: [bool; 3],
}

impl Default for ActiveDofs {
    fn default() -> Self {
        Self::all()
    }
}

impl ActiveDofs {
    pub fn all() -> Self {
        Self {
            translation: [true; 3],
            rotation: [true; 3],
        }
    }

    /// Surge, sway, roll and yaw; heave and pitch locked
    pub fn surface_vessel() -> Self {
        Self {
            translation: [true, true, false],
            rotation: [true, false, true],
        }
    }
}

/// Rigid body with diagonal inertia about body axes through the centre of mass.
///
/// The frame origin is the body reference point; the centre of mass sits at
/// `center_of_mass` in body coordinates. Velocities are world-frame and refer
/// to the centre of mass.
#[derive(Debug, Clone)]
pub struct RigidBody {
    mass: f64,
    inertia: [f64; 3],
    center_of_mass: [f64; 3],
    frame: CoordinateFrame,
    velocity: [f64; 3],
    angular_velocity: [f64; 3],
    force: [f64; 3],
    torque: [f64; 3],
    pub dofs: ActiveDofs,
}

impl RigidBody {
    pub fn new(mass: f64, inertia: [f64; 3], center_of_mass: [f64; 3]) -> Result<Self> {
        require_positive("body.mass", mass)?;
        for (i, &moment) in inertia.iter().enumerate() {
            require_positive(&format!("body.inertia[{i}]"), moment)?;
        }
        if center_of_mass.iter().any(|c| !c.is_finite()) {
            return Err(ConfigError::InvalidParameter {
                parameter: "body.center_of_mass".to_string(),
                reason: "must be finite".to_string(),
            });
        }
        Ok(Self {
            mass,
            inertia,
            center_of_mass,
            frame: CoordinateFrame::identity(),
            velocity: [0.; 3],
            angular_velocity: [0.; 3],
            force: [0.; 3],
            torque: [0.; 3],
            dofs: ActiveDofs::all(),
        })
    }

    pub fn from_config(config: &RigidBodyConfig) -> Result<Self> {
        let mut body = Self::new(config.mass, config.inertia, config.center_of_mass)?;
        body.frame = CoordinateFrame::new(
            config.position,
            Quaternion::from_spherical(config.heading, 0., config.heel),
        );
        body.velocity = config.velocity;
        body.angular_velocity = config.angular_velocity;
        body.dofs = config.dofs;
        body.apply_dofs();
        Ok(body)
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn inertia(&self) -> [f64; 3] {
        self.inertia
    }

    /// Body frame, origin at the body reference point
    pub fn frame(&self) -> &CoordinateFrame {
        &self.frame
    }

    pub fn set_frame(&mut self, frame: CoordinateFrame) {
        self.frame = frame;
    }

    pub fn center_of_mass(&self) -> [f64; 3] {
        self.center_of_mass
    }

    pub fn center_of_mass_world(&self) -> [f64; 3] {
        self.frame.local_to_world_point(&self.center_of_mass)
    }

    /// World velocity of the centre of mass
    pub fn velocity(&self) -> [f64; 3] {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: [f64; 3]) {
        self.velocity = velocity;
        self.apply_dofs();
    }

    /// World angular velocity (rad/s)
    pub fn angular_velocity(&self) -> [f64; 3] {
        self.angular_velocity
    }

    pub fn set_angular_velocity(&mut self, angular_velocity: [f64; 3]) {
        self.angular_velocity = angular_velocity;
        self.apply_dofs();
    }

    /// World velocity of a world point moving with the body
    pub fn point_velocity(&self, point: &[f64; 3]) -> [f64; 3] {
        let r = sub(point, &self.center_of_mass_world());
        add(&self.velocity, &cross(&self.angular_velocity, &r))
    }

    /// Accumulated world force
    pub fn force(&self) -> [f64; 3] {
        self.force
    }

    /// Accumulated world torque about the centre of mass
    pub fn torque(&self) -> [f64; 3] {
        self.torque
    }

    /// World inverse inertia tensor `R diag(1/I) R^T`
    pub fn inverse_inertia_world(&self) -> Mat<f64> {
        let m = self.frame.orientation.as_matrix();
        let r = Mat::from_fn(3, 3, |i, j| m[i][j]);
        let d = Mat::from_fn(3, 3, |i, j| if i == j { 1. / self.inertia[i] } else { 0. });
        let rd = r.as_ref() * d.as_ref();
        rd.as_ref() * r.transpose()
    }

    pub fn kinetic_energy(&self) -> f64 {
        let w = self
            .frame
            .world_to_local_vector(&self.angular_velocity);
        let translational = 0.5 * self.mass * dot(&self.velocity, &self.velocity);
        let rotational = 0.5
            * (self.inertia[0] * w[0] * w[0]
                + self.inertia[1] * w[1] * w[1]
                + self.inertia[2] * w[2] * w[2]);
        translational + rotational
    }

    /// Zeroes the velocity components of locked degrees of freedom
    fn apply_dofs(&mut self) {
        self.velocity
            .iter_mut()
            .zip(self.dofs.translation)
            .filter(|(_, active)| !active)
            .for_each(|(v, _)| *v = 0.);

        if self.dofs.rotation.iter().all(|&active| active) {
            return;
        }
        let mut w = self.frame.world_to_local_vector(&self.angular_velocity);
        w.iter_mut()
            .zip(self.dofs.rotation)
            .filter(|(_, active)| !active)
            .for_each(|(w, _)| *w = 0.);
        self.angular_velocity = self.frame.local_to_world_vector(&w);
    }
}

impl PhysicsBody for RigidBody {
    fn reset_loads(&mut self) {
        self.force = [0.; 3];
        self.torque = [0.; 3];
    }

    fn add_world_force(&mut self, force: &[f64; 3]) {
        add_assign(&mut self.force, force);
    }

    fn add_world_force_at(&mut self, force: &[f64; 3], point: &[f64; 3]) {
        let r = sub(point, &self.center_of_mass_world());
        add_assign(&mut self.force, force);
        add_assign(&mut self.torque, &cross(&r, force));
    }

    fn add_world_torque(&mut self, torque: &[f64; 3]) {
        add_assign(&mut self.torque, torque);
    }

    /// Semi-implicit Euler: velocities first, then positions with the new
    /// velocities.
    fn integrate(&mut self, dt: f64) {
        if dt <= 0. {
            return;
        }

        // Linear
        let com = self.center_of_mass_world();
        add_assign(&mut self.velocity, &scale(&self.force, dt / self.mass));

        // Angular
        let i_inv = self.inverse_inertia_world();
        let tau = Col::from_fn(3, |i| self.torque[i]);
        let alpha = i_inv.as_ref() * tau.as_ref();
        add_assign(
            &mut self.angular_velocity,
            &[alpha[0] * dt, alpha[1] * dt, alpha[2] * dt],
        );

        self.apply_dofs();

        let com = add(&com, &scale(&self.velocity, dt));
        self.frame.orientation = self.frame.orientation.integrate(&self.angular_velocity, dt);

        // Body origin from the integrated centre of mass
        let offset = self.frame.local_to_world_vector(&self.center_of_mass);
        self.frame.position = sub(&com, &offset);
    }
}
