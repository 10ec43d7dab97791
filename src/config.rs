use std::path::Path;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    catalog,
    error::{require_non_negative, require_positive, ConfigError, Result},
    rigid_body::ActiveDofs,
};

/// Reads and parses a YAML configuration file.
pub fn read_yaml_from_file<T: DeserializeOwned>(file_path: impl AsRef<Path>) -> Result<T> {
    let yaml = std::fs::read_to_string(file_path)?;
    Ok(serde_yaml::from_str(&yaml)?)
}

/// Parses a YAML configuration string.
pub fn read_yaml_from_str<T: DeserializeOwned>(yaml: &str) -> Result<T> {
    Ok(serde_yaml::from_str(yaml)?)
}

//------------------------------------------------------------------------------
// Scenario
//------------------------------------------------------------------------------

/// Complete simulation setup: environment, vessels and run length.
///
/// Absent fields of this and every nested record keep their `Default` value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub environment: EnvironmentConfig,
    pub vessels: Vec<VesselConfig>,
    pub time_step: f64, // Tick length (s)
    pub duration: f64,  // Simulated time (s)
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            environment: EnvironmentConfig::default(),
            vessels: vec![VesselConfig::default()],
            time_step: 0.02,
            duration: 60.,
        }
    }
}

impl ScenarioConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        read_yaml_from_str(yaml)
    }

    pub fn from_yaml_file(file_path: impl AsRef<Path>) -> Result<Self> {
        read_yaml_from_file(file_path)
    }

    /// Number of ticks needed to cover `duration`, at most `u32::MAX`.
    pub fn n_steps(&self) -> Result<usize> {
        let time_step = require_positive("time_step", self.time_step)?;
        let duration = require_non_negative("duration", self.duration)?;
        let n_steps = (duration / time_step).round();
        if n_steps > u32::MAX as f64 {
            return Err(ConfigError::InvalidParameter {
                parameter: "time_step".to_string(),
                reason: format!("{time_step} s gives too many steps for a {duration} s run"),
            });
        }
        Ok(n_steps as usize)
    }
}

//------------------------------------------------------------------------------
// Environment
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub fluids: FluidConfig,
    pub wind: WindConfig,
    pub water: WaterConfig,
    /// Additional lift/drag curves; a curve named like a built-in replaces it
    pub curves: Vec<CurveConfig>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FluidConfig {
    pub air_density: f64,               // kg/m^3
    pub water_density: f64,             // kg/m^3
    pub water_kinematic_viscosity: f64, // m^2/s
    pub gravity: f64,                   // m/s^2
}

impl Default for FluidConfig {
    fn default() -> Self {
        Self {
            air_density: 1.225,
            water_density: 1025.,
            water_kinematic_viscosity: 1.1892e-6,
            gravity: 9.81,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    pub speed: f64,            // Horizontal speed at reference height (m/s)
    pub direction: f64,        // Flow angle relative to +X, clockwise seen from above (deg)
    pub reference_height: f64, // Reference height (m)
    pub shear_exponent: f64,   // Vertical power law exponent
    pub puffs: Option<PuffGeneratorConfig>,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            speed: 5.,
            direction: 0.,
            reference_height: 10.,
            shear_exponent: 0.,
            puffs: None,
        }
    }
}

/// Taper band widths of a wind puff as fractions of its footprint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuffTaper {
    /// Length of the leading and trailing bands as a fraction of depth
    pub edge: f64,
    /// Width of the lateral bands as a fraction of the local half-width
    pub side: f64,
}

impl Default for PuffTaper {
    fn default() -> Self {
        Self {
            edge: 0.2,
            side: 0.2,
        }
    }
}

impl PuffTaper {
    /// Hard-edged footprint
    pub fn none() -> Self {
        Self { edge: 0., side: 0. }
    }
}

/// Random puff source. Ranges are inclusive `[min, max]` pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PuffGeneratorConfig {
    pub seed: u64,
    pub interval: f64,              // Time between puffs (s)
    pub speed: [f64; 2],            // Puff speed (m/s)
    pub direction_spread: f64,      // Max deviation from the steady wind direction (deg)
    pub depth: [f64; 2],            // Along-wind length (m)
    pub leading_width: [f64; 2],    // m
    pub trailing_width: [f64; 2],   // m
    pub travel_distance: [f64; 2],  // Distance before retirement (m)
    pub center: [f64; 2],           // Centre of the sailing area (m)
    pub upwind_distance: f64,       // Spawn distance upwind of the centre (m)
    pub lateral_spread: f64,        // Max crosswind offset of the spawn point (m)
    pub taper: PuffTaper,
}

impl Default for PuffGeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            interval: 8.,
            speed: [1., 3.],
            direction_spread: 10.,
            depth: [20., 60.],
            leading_width: [20., 60.],
            trailing_width: [10., 40.],
            travel_distance: [200., 400.],
            center: [0., 0.],
            upwind_distance: 150.,
            lateral_spread: 100.,
            taper: PuffTaper::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterConfig {
    pub speed: f64,     // Current speed (m/s)
    pub direction: f64, // Flow angle relative to +X, clockwise seen from above (deg)
}

/// Lift/drag polar record, angles in degrees.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    pub name: String,
    /// Table covers `[0, 180]` and is mirrored for negative angles
    pub symmetric: bool,
    pub aoa: Vec<f64>,
    pub cl: Vec<f64>,
    pub cd: Vec<f64>,
}

//------------------------------------------------------------------------------
// Vessel
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VesselConfig {
    pub name: String,
    pub body: RigidBodyConfig,
    pub hull: HullConfig,
    pub aero_foils: Vec<FoilConfig>,
    pub hydro_foils: Vec<FoilConfig>,
    pub propulsors: Vec<PropulsorConfig>,
}

impl Default for VesselConfig {
    fn default() -> Self {
        catalog::dinghy()
    }
}

impl VesselConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        read_yaml_from_str(yaml)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RigidBodyConfig {
    pub mass: f64,                  // kg
    pub inertia: [f64; 3],          // Principal moments about body axes through the COM (kg m^2)
    pub center_of_mass: [f64; 3],   // Body coordinates (m)
    pub position: [f64; 3],         // Initial world position of the body origin (m)
    pub heading: f64,               // Initial azimuth (deg)
    pub heel: f64,                  // Initial rotation about the body X axis (deg)
    pub velocity: [f64; 3],         // Initial world velocity of the COM (m/s)
    pub angular_velocity: [f64; 3], // Initial world angular velocity (rad/s)
    pub dofs: ActiveDofs,
}

impl Default for RigidBodyConfig {
    fn default() -> Self {
        Self {
            mass: 200.,
            inertia: [80., 250., 280.],
            center_of_mass: [0., 0., 0.],
            position: [0., 0., 0.],
            heading: 0.,
            heel: 0.,
            velocity: [0., 0., 0.],
            angular_velocity: [0., 0., 0.],
            dofs: ActiveDofs::surface_vessel(),
        }
    }
}

/// Hull geometry for the resistance regressions, lengths in metres.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HullConfig {
    pub lwl: f64,                        // Waterline length
    pub bwl: f64,                        // Waterline beam
    pub tc: f64,                         // Canoe body draft
    pub displacement: f64,               // Canoe body displaced volume (m^3)
    pub cp: f64,                         // Prismatic coefficient
    pub cm: f64,                         // Midship section coefficient
    pub lcb_fpp: f64,                    // Longitudinal centre of buoyancy from forward perpendicular
    pub lcf_fpp: f64,                    // Longitudinal centre of flotation from forward perpendicular
    pub waterplane_area: f64,            // m^2
    pub wetted_surface_coefficient: f64, // S = c * sqrt(displacement * lwl) upright
    pub lateral_resistance_center: [f64; 3], // Body coordinates
    pub metacentric_height: f64,         // GM
    pub roll_damping: f64,               // N m s/rad
}

impl Default for HullConfig {
    fn default() -> Self {
        Self {
            lwl: 3.8,
            bwl: 1.2,
            tc: 0.12,
            displacement: 0.2,
            cp: 0.55,
            cm: 0.65,
            lcb_fpp: 2.0,
            lcf_fpp: 2.1,
            waterplane_area: 3.4,
            wetted_surface_coefficient: 2.6,
            lateral_resistance_center: [0., 0., -0.1],
            metacentric_height: 0.8,
            roll_damping: 400.,
        }
    }
}

/// Lifting surface mounted on a vessel.
///
/// The foil frame has +X along `span_axis`, +Y along `chord_axis` (leading to
/// trailing edge) and +Z completing the right-handed set, all in body
/// coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FoilConfig {
    pub name: String,
    pub curve: String,             // Lift/drag curve name
    pub chord: f64,                // m
    pub span: f64,                 // m
    pub slice_offset: Option<f64>, // Mount point to centre of effort along the span (default span / 2)
    pub position: [f64; 3],        // Mount point in body coordinates
    pub span_axis: [f64; 3],
    pub chord_axis: [f64; 3],
    pub trim: f64,       // Initial rotation about the span axis (deg)
    pub trim_limit: f64, // Largest allowed |trim| (deg)
}

impl Default for FoilConfig {
    fn default() -> Self {
        Self {
            name: String::from("foil"),
            curve: String::from("naca0012"),
            chord: 1.,
            span: 1.,
            slice_offset: None,
            position: [0., 0., 0.],
            span_axis: [0., 0., -1.],
            chord_axis: [-1., 0., 0.],
            trim: 0.,
            trim_limit: 90.,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PropulsorConfig {
    pub name: String,
    pub position: [f64; 3],  // Body coordinates
    pub direction: [f64; 3], // Thrust direction in body coordinates
    pub max_thrust: f64,     // N
    pub throttle: f64,       // Initial throttle in [-1, 1]
}

impl Default for PropulsorConfig {
    fn default() -> Self {
        Self {
            name: String::from("motor"),
            position: [0., 0., 0.],
            direction: [1., 0., 0.],
            max_thrust: 0.,
            throttle: 0.,
        }
    }
}
