use log::trace;

use crate::{
    config::{FluidConfig, HullConfig},
    error::{require_non_negative, require_positive, ConfigError, Result},
    interp::interpolate,
    rigid_body::{PhysicsBody, RigidBody},
    util::{add_assign, cross, norm, scale, sub},
};

/// Froude numbers of the residuary resistance bins
const FROUDE_BINS: [f64; 15] = [
    0.0, 0.10, 0.15, 0.20, 0.25, 0.30, 0.35, 0.40, 0.45, 0.50, 0.55, 0.60, 0.65, 0.70, 0.75,
];

/// Residuary resistance coefficients `a0..a7` per Froude bin
const RESIDUARY_COEFFICIENTS: [[f64; 8]; 15] = [
    [0., 0., 0., 0., 0., 0., 0., 0.],
    [0., 0., 0., 0., 0., 0., 0., 0.],
    [-0.0005, 0.0023, -0.0086, -0.0015, 0.0061, 0.0010, 0.0001, 0.0052],
    [-0.0003, 0.0059, -0.0064, 0.0070, 0.0014, 0.0013, 0.0005, -0.0020],
    [-0.0002, -0.0156, 0.0031, -0.0021, -0.0070, 0.0148, 0.0010, -0.0043],
    [-0.0009, 0.0016, 0.0337, -0.0285, -0.0367, 0.0218, 0.0015, -0.0172],
    [-0.0026, -0.0567, 0.0446, -0.1091, -0.0707, 0.0914, 0.0021, -0.0078],
    [-0.0064, -0.4034, -0.1250, 0.0273, -0.1341, 0.3578, 0.0045, 0.1115],
    [-0.0218, -0.5261, -0.2945, 0.2485, -0.2428, 0.6293, 0.0081, 0.2086],
    [-0.0388, -0.5986, -0.3038, 0.6033, -0.0430, 0.8332, 0.0106, 0.1336],
    [-0.0347, -0.4764, -0.2361, 0.8726, 0.4219, 0.3899, 0.0096, -0.2272],
    [-0.0361, 0.0037, -0.2960, 0.9661, 0.6123, 0.5212, 0.0115, -0.3352],
    [0.0008, 0.3728, -0.3667, 1.3957, 1.0343, 0.3945, 0.0195, -0.4632],
    [0.0108, -0.1238, -0.2026, 1.1129, 1.5686, 0.4981, 0.0180, -0.7313],
    [0.1023, 0.7726, 0.5040, 1.7867, 2.1452, 0.6229, 0.0411, -1.4541],
];

/// Heel angles of the wetted surface bins (deg)
const HEEL_BINS: [f64; 8] = [0., 5., 10., 15., 20., 25., 30., 35.];

/// Wetted surface heel coefficients `s0..s3` per heel bin
const HEEL_COEFFICIENTS: [[f64; 4]; 8] = [
    [0., 0., 0., 0.],
    [-4.112, 0.054, -0.027, 6.329],
    [-4.522, -0.132, -0.077, 8.738],
    [-3.291, -0.389, -0.118, 8.949],
    [1.850, -1.200, -0.109, 5.364],
    [6.510, -2.305, -0.066, 3.443],
    [12.334, -3.911, 0.024, 1.767],
    [14.648, -5.182, 0.102, 3.497],
];

/// Smallest Reynolds number used in the friction line
const MIN_REYNOLDS: f64 = 1e5;

/// Validated hull geometry, lengths in metres.
#[derive(Debug, Clone)]
pub struct HullGeometry {
    pub lwl: f64,
    pub bwl: f64,
    pub tc: f64,
    pub displacement: f64,
    pub cp: f64,
    pub cm: f64,
    pub lcb_fpp: f64,
    pub lcf_fpp: f64,
    pub waterplane_area: f64,
    pub wetted_surface_coefficient: f64,
    pub lateral_resistance_center: [f64; 3],
    pub metacentric_height: f64,
    pub roll_damping: f64,
}

impl HullGeometry {
    pub fn new(config: &HullConfig) -> Result<Self> {
        let geometry = Self {
            lwl: require_positive("hull.lwl", config.lwl)?,
            bwl: require_positive("hull.bwl", config.bwl)?,
            tc: require_positive("hull.tc", config.tc)?,
            displacement: require_positive("hull.displacement", config.displacement)?,
            cp: require_positive("hull.cp", config.cp)?,
            cm: require_positive("hull.cm", config.cm)?,
            lcb_fpp: require_positive("hull.lcb_fpp", config.lcb_fpp)?,
            lcf_fpp: require_positive("hull.lcf_fpp", config.lcf_fpp)?,
            waterplane_area: require_positive("hull.waterplane_area", config.waterplane_area)?,
            wetted_surface_coefficient: require_positive(
                "hull.wetted_surface_coefficient",
                config.wetted_surface_coefficient,
            )?,
            lateral_resistance_center: config.lateral_resistance_center,
            metacentric_height: config.metacentric_height,
            roll_damping: require_non_negative("hull.roll_damping", config.roll_damping)?,
        };
        if !geometry.metacentric_height.is_finite() {
            return Err(ConfigError::InvalidParameter {
                parameter: "hull.metacentric_height".to_string(),
                reason: "must be finite".to_string(),
            });
        }
        Ok(geometry)
    }
}

//------------------------------------------------------------------------------
// Regressions
//------------------------------------------------------------------------------

pub fn froude_number(speed: f64, lwl: f64, gravity: f64) -> f64 {
    speed / (gravity * lwl).sqrt()
}

/// Residuary resistance divided by `rho g Vc` at Froude number `froude`,
/// from the Delft Systematic Yacht Hull Series regression.
///
/// Froude numbers outside the tabulated bins clamp to the end bins.
pub fn residuary_resistance(hull: &HullGeometry, froude: f64) -> f64 {
    let a: [f64; 8] = std::array::from_fn(|k| {
        let column: [f64; 15] = std::array::from_fn(|j| RESIDUARY_COEFFICIENTS[j][k]);
        interpolate(&FROUDE_BINS, &column, froude)
    });
    let vc = hull.displacement;
    a[0] + (a[1] * hull.lcb_fpp / hull.lwl
        + a[2] * hull.cp
        + a[3] * vc.powf(2. / 3.) / hull.waterplane_area
        + a[4] * hull.bwl / hull.lwl
        + a[5] * hull.lcb_fpp / hull.lcf_fpp
        + a[6] * hull.bwl / hull.tc
        + a[7] * hull.cm)
        * vc.cbrt()
        / hull.lwl
}

/// Residuary resistance force (N)
pub fn residuary_resistance_force(hull: &HullGeometry, froude: f64, fluids: &FluidConfig) -> f64 {
    residuary_resistance(hull, froude) * fluids.water_density * fluids.gravity * hull.displacement
}

/// Ratio of heeled to upright wetted surface at `heel` degrees.
///
/// Uses `|heel|`; angles beyond the tabulated bins clamp.
pub fn wetted_surface_heel_correction(hull: &HullGeometry, heel: f64) -> f64 {
    let s: [f64; 4] = std::array::from_fn(|k| {
        let column: [f64; 8] = std::array::from_fn(|j| HEEL_COEFFICIENTS[j][k]);
        interpolate(&HEEL_BINS, &column, heel.abs())
    });
    let bt = hull.bwl / hull.tc;
    1. + (s[0] + s[1] * bt + s[2] * bt * bt + s[3] * hull.cm) / 100.
}

pub fn corrected_wetted_surface_coefficient(hull: &HullGeometry, heel: f64) -> f64 {
    hull.wetted_surface_coefficient * wetted_surface_heel_correction(hull, heel)
}

/// Wetted surface area (m^2) at `heel` degrees
pub fn wetted_surface(hull: &HullGeometry, heel: f64) -> f64 {
    corrected_wetted_surface_coefficient(hull, heel) * (hull.displacement * hull.lwl).sqrt()
}

/// ITTC-57 friction coefficient; the Reynolds number is clamped to stay clear
/// of the pole at `Rn = 100`.
pub fn friction_coefficient(reynolds: f64) -> f64 {
    let r = reynolds.max(MIN_REYNOLDS).log10() - 2.;
    0.075 / (r * r)
}

/// Reynolds number on 70% of the waterline length
pub fn reynolds_number(hull: &HullGeometry, speed: f64, fluids: &FluidConfig) -> f64 {
    speed * 0.7 * hull.lwl / fluids.water_kinematic_viscosity
}

/// Frictional resistance force (N)
pub fn frictional_resistance(hull: &HullGeometry, speed: f64, heel: f64, fluids: &FluidConfig) -> f64 {
    let cf = friction_coefficient(reynolds_number(hull, speed, fluids));
    0.5 * fluids.water_density * speed * speed * wetted_surface(hull, heel) * cf
}

/// Hydrostatic righting moment about the body roll axis at `heel` degrees (N m)
pub fn righting_moment(hull: &HullGeometry, heel: f64, fluids: &FluidConfig) -> f64 {
    -fluids.water_density
        * fluids.gravity
        * hull.displacement
        * hull.metacentric_height
        * heel.to_radians().sin()
}

//------------------------------------------------------------------------------
// Hull
//------------------------------------------------------------------------------

/// Derived hull state for the current tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HullSnapshot {
    pub speed: f64,           // Horizontal speed through the water (m/s)
    pub heel: f64,            // deg
    pub froude: f64,          //
    pub reynolds: f64,        //
    pub wetted_surface: f64,  // m^2
    pub residuary: f64,       // N
    pub frictional: f64,      // N
    pub righting_moment: f64, // N m
}

impl HullSnapshot {
    /// Total resistance (N)
    pub fn resistance(&self) -> f64 {
        self.residuary + self.frictional
    }
}

/// World force and torque applied by the hull in one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HullLoad {
    pub force: [f64; 3],
    pub torque: [f64; 3],
}

#[derive(Debug, Clone)]
pub struct Hull {
    pub geometry: HullGeometry,
    snapshot: HullSnapshot,
}

impl Hull {
    pub fn new(config: &HullConfig) -> Result<Self> {
        Ok(Self {
            geometry: HullGeometry::new(config)?,
            snapshot: HullSnapshot::default(),
        })
    }

    pub fn snapshot(&self) -> &HullSnapshot {
        &self.snapshot
    }

    /// Refreshes the snapshot for the current speed and heel.
    pub fn update(&mut self, speed: f64, heel: f64, fluids: &FluidConfig) -> &HullSnapshot {
        let hull = &self.geometry;
        let froude = froude_number(speed, hull.lwl, fluids.gravity);
        self.snapshot = HullSnapshot {
            speed,
            heel,
            froude,
            reynolds: reynolds_number(hull, speed, fluids),
            wetted_surface: wetted_surface(hull, heel),
            // Regression may dip below zero between the low-speed bins
            residuary: residuary_resistance_force(hull, froude, fluids).max(0.),
            frictional: frictional_resistance(hull, speed, heel, fluids),
            righting_moment: righting_moment(hull, heel, fluids),
        };
        trace!(
            "hull Fn={:.3} Rr={:.2} Rf={:.2} RM={:.1}",
            froude,
            self.snapshot.residuary,
            self.snapshot.frictional,
            self.snapshot.righting_moment
        );
        &self.snapshot
    }

    /// Applies the snapshot to `body`.
    ///
    /// `velocity_through_water` is the world velocity of the lateral resistance
    /// centre relative to the water; resistance opposes its horizontal part.
    /// The righting moment and roll damping act about the body roll axis.
    pub fn apply(&self, body: &mut RigidBody, velocity_through_water: &[f64; 3]) -> HullLoad {
        let frame = *body.frame();
        let center = frame.local_to_world_point(&self.geometry.lateral_resistance_center);

        let horizontal = [velocity_through_water[0], velocity_through_water[1], 0.];
        let speed = norm(&horizontal);
        let force = if speed > f64::EPSILON {
            scale(&horizontal, -self.snapshot.resistance() / speed)
        } else {
            [0.; 3]
        };

        let roll_rate = frame.world_to_local_vector(&body.angular_velocity())[0];
        let roll_moment = self.snapshot.righting_moment - self.geometry.roll_damping * roll_rate;
        let hydrostatic = frame.local_to_world_vector(&[roll_moment, 0., 0.]);

        let r = sub(&center, &body.center_of_mass_world());
        let mut torque = cross(&r, &force);
        add_assign(&mut torque, &hydrostatic);

        body.add_world_force_at(&force, &center);
        body.add_world_torque(&hydrostatic);
        HullLoad { force, torque }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{frame::CoordinateFrame, quaternion::Quaternion};
    use approx::assert_relative_eq;

    fn test_hull() -> HullGeometry {
        HullGeometry::new(&HullConfig {
            lwl: 10.,
            bwl: 3.,
            tc: 0.5,
            displacement: 7.,
            cp: 0.56,
            cm: 0.75,
            lcb_fpp: 5.3,
            lcf_fpp: 5.6,
            waterplane_area: 22.,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_residuary_resistance_golden() {
        let hull = test_hull();
        let a = [-0.0026, -0.0567, 0.0446, -0.1091, -0.0707, 0.0914, 0.0021, -0.0078];
        let expected = a[0]
            + (a[1] * 5.3 / 10.
                + a[2] * 0.56
                + a[3] * 7f64.powf(2. / 3.) / 22.
                + a[4] * 3. / 10.
                + a[5] * 5.3 / 5.6
                + a[6] * 3. / 0.5
                + a[7] * 0.75)
                * 7f64.cbrt()
                / 10.;

        let rr = residuary_resistance(&hull, 0.35);
        assert_relative_eq!(rr, expected, epsilon = 1e-12);
        assert_relative_eq!(rr, 0.0067392632, epsilon = 1e-10);

        let force = residuary_resistance_force(&hull, 0.35, &FluidConfig::default());
        assert_relative_eq!(force, 474.3548, epsilon = 1e-4);
    }

    #[test]
    fn test_residuary_resistance_bins() {
        let hull = test_hull();
        // Zero at rest
        assert_eq!(residuary_resistance(&hull, 0.), 0.);
        assert_eq!(residuary_resistance(&hull, 0.1), 0.);
        // Clamped past the last bin
        assert_eq!(
            residuary_resistance(&hull, 0.75),
            residuary_resistance(&hull, 2.)
        );
        // Grows with speed through hull speed
        let r = [0.3, 0.4, 0.5].map(|f| residuary_resistance(&hull, f));
        assert!(r[0] < r[1] && r[1] < r[2]);
    }

    #[test]
    fn test_heel_correction() {
        let hull = test_hull();
        assert_eq!(wetted_surface_heel_correction(&hull, 0.), 1.);
        assert_relative_eq!(wetted_surface_heel_correction(&hull, 15.), 0.9683875, epsilon = 1e-12);
        assert_eq!(
            wetted_surface_heel_correction(&hull, -15.),
            wetted_surface_heel_correction(&hull, 15.)
        );
        assert_eq!(
            wetted_surface_heel_correction(&hull, 35.),
            wetted_surface_heel_correction(&hull, 80.)
        );
        assert_relative_eq!(
            corrected_wetted_surface_coefficient(&hull, 15.),
            hull.wetted_surface_coefficient * 0.9683875,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_friction() {
        // Reynolds number clamped near zero speed
        assert_eq!(friction_coefficient(0.), friction_coefficient(1e5));
        assert_relative_eq!(friction_coefficient(1e7), 0.075 / 25., epsilon = 1e-12);

        let hull = test_hull();
        let fluids = FluidConfig::default();
        assert_eq!(frictional_resistance(&hull, 0., 0., &fluids), 0.);
        let rf1 = frictional_resistance(&hull, 1., 0., &fluids);
        let rf2 = frictional_resistance(&hull, 2., 0., &fluids);
        assert!(rf1 > 0. && rf2 > 3. * rf1 && rf2 < 4. * rf1);
    }

    #[test]
    fn test_righting_moment_restores() {
        let hull = test_hull();
        let fluids = FluidConfig::default();
        assert_eq!(righting_moment(&hull, 0., &fluids), 0.);
        assert!(righting_moment(&hull, 10., &fluids) < 0.);
        assert_eq!(
            righting_moment(&hull, -10., &fluids),
            -righting_moment(&hull, 10., &fluids)
        );
    }

    #[test]
    fn test_apply_opposes_motion() {
        let mut hull = Hull::new(&HullConfig::default()).unwrap();
        let fluids = FluidConfig::default();
        let mut body = RigidBody::new(200., [80., 250., 280.], [0., 0., 0.]).unwrap();
        body.set_frame(CoordinateFrame::new([0.; 3], Quaternion::from_spherical(30., 0., 10.)));

        let snapshot = *hull.update(2., 10., &fluids);
        assert!(snapshot.resistance() > 0.);
        assert_eq!(snapshot.wetted_surface, wetted_surface(&hull.geometry, 10.));

        let load = hull.apply(&mut body, &[2., 0., 0.5]);
        assert_relative_eq!(load.force[0], -snapshot.resistance(), epsilon = 1e-12);
        assert_eq!(load.force[1], 0.);
        assert_eq!(load.force[2], 0.);
        assert_eq!(body.force(), load.force);

        // Righting moment about the heeled roll axis opposes the heel
        let roll_axis = body.frame().local_to_world_vector(&[1., 0., 0.]);
        let hydrostatic = crate::util::dot(&body.torque(), &roll_axis);
        assert!(hydrostatic < 0.);
        for i in 0..3 {
            assert_relative_eq!(body.torque()[i], load.torque[i], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_invalid_geometry() {
        let result = Hull::new(&HullConfig {
            lwl: 0.,
            ..Default::default()
        });
        assert!(matches!(result, Err(ConfigError::InvalidParameter { .. })));
    }
}
