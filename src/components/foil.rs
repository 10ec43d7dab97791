use std::sync::Arc;

use log::{trace, warn};

use crate::{
    components::{
        inflow::FlowField,
        polar::{LiftDragCurve, PolarCatalog},
    },
    config::FoilConfig,
    error::{require_non_negative, require_positive, ConfigError, Result},
    frame::CoordinateFrame,
    quaternion::Quaternion,
    rigid_body::RigidBody,
    util::{add, cross, dot, intersect_line_plane, norm, scale, sub, unit_vector},
};

/// Immutable geometry of a lifting surface.
///
/// The mount frame is given in body coordinates with +X along the span, +Y
/// from the leading edge to the trailing edge and +Z toward the pressure side.
#[derive(Debug, Clone)]
pub struct Foil {
    pub name: String,
    pub curve: String,
    pub chord: f64,
    pub span: f64,
    pub slice_offset: f64, // Mount point to centre of effort along the span
    pub mount: CoordinateFrame,
}

impl Foil {
    pub fn new(config: &FoilConfig) -> Result<Self> {
        let chord = require_positive(&format!("{}.chord", config.name), config.chord)?;
        let span = require_positive(&format!("{}.span", config.name), config.span)?;
        let slice_offset = require_non_negative(
            &format!("{}.slice_offset", config.name),
            config.slice_offset.unwrap_or(0.5 * span),
        )?;
        let orientation = mount_orientation(&config.span_axis, &config.chord_axis).ok_or_else(|| {
            ConfigError::DegenerateAxes {
                foil: config.name.clone(),
            }
        })?;
        Ok(Self {
            name: config.name.clone(),
            curve: config.curve.clone(),
            chord,
            span,
            slice_offset,
            mount: CoordinateFrame::new(config.position, orientation),
        })
    }

    /// Planform area
    pub fn area(&self) -> f64 {
        self.chord * self.span
    }
}

/// Orientation whose X axis is `span_axis` and whose Y axis is the part of
/// `chord_axis` perpendicular to it.
fn mount_orientation(span_axis: &[f64; 3], chord_axis: &[f64; 3]) -> Option<Quaternion> {
    let x = unit_vector(span_axis)?;
    let perpendicular = sub(chord_axis, &scale(&x, dot(chord_axis, &x)));
    if norm(&perpendicular) <= 1e-9 * norm(chord_axis) {
        return None;
    }
    let y = unit_vector(&perpendicular)?;
    let z = cross(&x, &y);
    let m = [[x[0], y[0], z[0]], [x[1], y[1], z[1]], [x[2], y[2], z[2]]];
    Some(Quaternion::from_matrix(&m).normalize())
}

//------------------------------------------------------------------------------
// Force model
//------------------------------------------------------------------------------

/// Force and torque of one foil for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FoilLoad {
    pub force: [f64; 3],  // World force (N)
    pub torque: [f64; 3], // World torque about the centre of mass (N m)
    pub aoa: f64,         // Angle of attack (deg)
}

/// Computes the lift and drag of `foil` in the relative flow `v_rel_world`.
///
/// `frame` is the working world frame of the foil with its origin at the
/// centre of effort. The planform area is scaled by `immersion`. Zero in-plane
/// flow produces no load.
pub fn compute_force(
    v_rel_world: &[f64; 3],
    density: f64,
    foil: &Foil,
    frame: &CoordinateFrame,
    curve: &LiftDragCurve,
    com_world: &[f64; 3],
    immersion: f64,
) -> FoilLoad {
    // Relative flow in the local frame with +Y to the trailing edge and +Z to
    // the pressure side; spanwise flow carries no load
    let v_local = frame.world_to_local_vector(v_rel_world);
    let v_rel = [0., v_local[1], v_local[2]];
    let speed = norm(&v_rel);
    if speed <= f64::EPSILON {
        return FoilLoad::default();
    }

    let aoa = calculate_angle_of_attack(&v_rel).to_degrees();
    if immersion <= 0. {
        return FoilLoad {
            aoa,
            ..Default::default()
        };
    }

    let (cl, cd) = curve.evaluate(aoa);
    let dynamic_pressure = 0.5 * density * speed * speed * foil.chord * foil.span * immersion;

    // Drag along the flow, lift perpendicular to it in the section plane
    let drag_vector = scale(&v_rel, 1. / speed);
    let lift_vector = cross(&[-1., 0., 0.], &drag_vector);
    let force_local = add(
        &scale(&lift_vector, cl * dynamic_pressure),
        &scale(&drag_vector, cd * dynamic_pressure),
    );

    let force = frame.local_to_world_vector(&force_local);
    let r = sub(&frame.position, com_world);
    FoilLoad {
        force,
        torque: cross(&r, &force),
        aoa,
    }
}

fn calculate_angle_of_attack(v_rel: &[f64; 3]) -> f64 {
    (-v_rel[2]).atan2(v_rel[1])
}

//------------------------------------------------------------------------------
// Mounted foil
//------------------------------------------------------------------------------

/// Per-tick working state of one foil instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct FoilScratch {
    pub frame: CoordinateFrame,      // World frame at the centre of effort
    pub root: [f64; 3],              // World mount point
    pub flow_velocity: [f64; 3],     // Fluid velocity at the centre of effort
    pub relative_velocity: [f64; 3], // Fluid velocity relative to the foil
    pub immersion: f64,              // Fraction of span carrying load
    pub load: FoilLoad,
}

/// Foil mounted on a vessel with an adjustable trim angle.
#[derive(Debug, Clone)]
pub struct FoilInstance {
    foil: Foil,
    curve: Arc<LiftDragCurve>,
    trim: f64,       // deg
    trim_limit: f64, // deg
    clip_to_water: bool,
    scratch: FoilScratch,
}

impl FoilInstance {
    /// Mounts `foil`. With `clip_to_water` only the span below `z = 0` carries
    /// load, otherwise the full span does.
    pub fn new(foil: Foil, curve: Arc<LiftDragCurve>, clip_to_water: bool) -> Self {
        let mut instance = Self {
            foil,
            curve,
            trim: 0.,
            trim_limit: 180.,
            clip_to_water,
            scratch: FoilScratch {
                immersion: 1.,
                ..Default::default()
            },
        };
        instance.refresh(&CoordinateFrame::identity());
        instance
    }

    pub fn from_config(config: &FoilConfig, catalog: &PolarCatalog, clip_to_water: bool) -> Result<Self> {
        let foil = Foil::new(config)?;
        let curve = catalog.get(&foil.curve)?;
        let trim_limit = require_non_negative(&format!("{}.trim_limit", config.name), config.trim_limit)?;
        let mut instance = Self::new(foil, curve, clip_to_water);
        instance.trim_limit = trim_limit;
        instance.set_trim(config.trim);
        instance.refresh(&CoordinateFrame::identity());
        Ok(instance)
    }

    pub fn name(&self) -> &str {
        &self.foil.name
    }

    pub fn foil(&self) -> &Foil {
        &self.foil
    }

    pub fn curve(&self) -> &Arc<LiftDragCurve> {
        &self.curve
    }

    /// Trim angle about the span axis (deg)
    pub fn trim(&self) -> f64 {
        self.trim
    }

    /// Sets the trim angle about the span axis, clamped to the trim limit.
    ///
    /// Positive trim raises the angle of attack of flow along the untrimmed
    /// chord. Takes effect at the next [`FoilInstance::refresh`].
    pub fn set_trim(&mut self, trim: f64) {
        let clamped = trim.clamp(-self.trim_limit, self.trim_limit);
        if clamped != trim {
            warn!(
                "foil '{}' trim {trim:.1} clamped to {clamped:.1}",
                self.foil.name
            );
        }
        self.trim = clamped;
    }

    pub fn scratch(&self) -> &FoilScratch {
        &self.scratch
    }

    /// Load computed by the last [`FoilInstance::update_load`]
    pub fn load(&self) -> &FoilLoad {
        &self.scratch.load
    }

    /// Fraction of the span below the water surface, or 1 when not clipped
    pub fn immersion(&self) -> f64 {
        self.scratch.immersion
    }

    /// Recomputes the working world frame and immersion from the body frame.
    pub fn refresh(&mut self, body_frame: &CoordinateFrame) {
        let trim = Quaternion::from_axis_angle(self.trim.to_radians(), &[1., 0., 0.]);
        let mount = CoordinateFrame::new(
            self.foil.mount.position,
            self.foil.mount.orientation.compose(&trim),
        );
        let world = body_frame.compose(&mount);
        let center = world.local_to_world_point(&[self.foil.slice_offset, 0., 0.]);

        self.scratch.root = world.position;
        self.scratch.frame = CoordinateFrame::new(center, world.orientation);
        self.scratch.immersion = if self.clip_to_water {
            let span = world.local_to_world_vector(&[self.foil.span, 0., 0.]);
            immersed_fraction(&world.position, &span)
        } else {
            1.
        };
    }

    /// Samples `flow` at the centre of effort and computes the load against
    /// the motion of `body`.
    pub fn update_load(&mut self, flow: &dyn FlowField, density: f64, body: &RigidBody) -> FoilLoad {
        let point = self.scratch.frame.position;
        flow.flow_velocity_into(&point, &mut self.scratch.flow_velocity);
        self.scratch.relative_velocity =
            sub(&self.scratch.flow_velocity, &body.point_velocity(&point));

        let load = compute_force(
            &self.scratch.relative_velocity,
            density,
            &self.foil,
            &self.scratch.frame,
            &self.curve,
            &body.center_of_mass_world(),
            self.scratch.immersion,
        );
        trace!(
            "foil '{}' aoa={:.2} force=[{:.2}, {:.2}, {:.2}]",
            self.foil.name,
            load.aoa,
            load.force[0],
            load.force[1],
            load.force[2]
        );
        self.scratch.load = load;
        load
    }
}

/// Fraction of the segment `root .. root + span` below the plane `z = 0`.
fn immersed_fraction(root: &[f64; 3], span: &[f64; 3]) -> f64 {
    match intersect_line_plane(root, span, &[0., 0., 0.], &[0., 0., 1.]) {
        // Parallel to the surface
        None => {
            if root[2] < 0. {
                1.
            } else {
                0.
            }
        }
        Some((t, _)) => {
            let t = t.clamp(0., 1.);
            if span[2] < 0. {
                1. - t
            } else {
                t
            }
        }
    }
}
