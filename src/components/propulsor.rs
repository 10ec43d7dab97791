use log::warn;

use crate::{
    config::PropulsorConfig,
    error::{require_non_negative, ConfigError, Result},
    rigid_body::{PhysicsBody, RigidBody},
    util::{scale, unit_vector},
};

/// Body-fixed thrust source such as an outboard or a paddle.
#[derive(Debug, Clone)]
pub struct Propulsor {
    pub name: String,
    pub position: [f64; 3],  // Body coordinates
    pub direction: [f64; 3], // Unit thrust direction in body coordinates
    pub max_thrust: f64,     // N
    throttle: f64,           // [-1, 1]
}

impl Propulsor {
    pub fn new(config: &PropulsorConfig) -> Result<Self> {
        let direction = unit_vector(&config.direction).ok_or_else(|| ConfigError::InvalidParameter {
            parameter: format!("{}.direction", config.name),
            reason: "must be a non-zero vector".to_string(),
        })?;
        let mut propulsor = Self {
            name: config.name.clone(),
            position: config.position,
            direction,
            max_thrust: require_non_negative(&format!("{}.max_thrust", config.name), config.max_thrust)?,
            throttle: 0.,
        };
        propulsor.set_throttle(config.throttle);
        Ok(propulsor)
    }

    pub fn throttle(&self) -> f64 {
        self.throttle
    }

    /// Sets the throttle, clamped to `[-1, 1]`.
    pub fn set_throttle(&mut self, throttle: f64) {
        let clamped = throttle.clamp(-1., 1.);
        if clamped != throttle {
            warn!("propulsor '{}' throttle {throttle} clamped to {clamped}", self.name);
        }
        self.throttle = clamped;
    }

    /// Current thrust along the thrust direction (N)
    pub fn thrust(&self) -> f64 {
        self.throttle * self.max_thrust
    }

    /// Adds the thrust to `body` at the mounting point and returns the world force.
    pub fn apply(&self, body: &mut RigidBody) -> [f64; 3] {
        let frame = *body.frame();
        let force = frame.local_to_world_vector(&scale(&self.direction, self.thrust()));
        let point = frame.local_to_world_point(&self.position);
        body.add_world_force_at(&force, &point);
        force
    }
}
