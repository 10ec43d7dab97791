use std::{collections::BTreeMap, path::Path};

use itertools::Itertools;
use log::debug;

use crate::{
    config::{
        read_yaml_from_file, read_yaml_from_str, CurveConfig, FoilConfig, HullConfig,
        RigidBodyConfig, VesselConfig,
    },
    error::Result,
};

//------------------------------------------------------------------------------
// Curves
//------------------------------------------------------------------------------

/// Built-in curves: `sail`, `naca0012` and `flat_plate`, all symmetric.
pub fn builtin_curves() -> Vec<CurveConfig> {
    vec![sail(), naca0012(), flat_plate()]
}

fn symmetric_curve(name: &str, rows: &[[f64; 3]]) -> CurveConfig {
    let (aoa, cl, cd): (Vec<f64>, Vec<f64>, Vec<f64>) =
        rows.iter().map(|r| (r[0], r[1], r[2])).multiunzip();
    CurveConfig {
        name: name.to_string(),
        symmetric: true,
        aoa,
        cl,
        cd,
    }
}

/// Soft sail with mast, stalling gently past 25 degrees
fn sail() -> CurveConfig {
    symmetric_curve(
        "sail",
        &[
            // aoa, cl, cd
            [0., 0.0, 0.05],
            [5., 0.45, 0.06],
            [10., 0.9, 0.09],
            [15., 1.2, 0.14],
            [20., 1.35, 0.22],
            [25., 1.38, 0.32],
            [30., 1.3, 0.45],
            [40., 1.15, 0.7],
            [60., 0.85, 1.05],
            [90., 0.1, 1.3],
            [120., -0.4, 1.05],
            [150., -0.6, 0.6],
            [180., 0.0, 0.1],
        ],
    )
}

/// NACA 0012 section at moderate Reynolds number
fn naca0012() -> CurveConfig {
    symmetric_curve(
        "naca0012",
        &[
            // aoa, cl, cd
            [0., 0.0, 0.008],
            [4., 0.44, 0.009],
            [8., 0.85, 0.012],
            [12., 1.1, 0.02],
            [14., 1.15, 0.03],
            [16., 0.9, 0.12],
            [20., 0.75, 0.25],
            [30., 0.9, 0.5],
            [45., 1.0, 1.0],
            [60., 0.85, 1.4],
            [90., 0.0, 1.8],
            [120., -0.75, 1.4],
            [150., -0.8, 0.6],
            [165., -0.6, 0.15],
            [180., 0.0, 0.02],
        ],
    )
}

/// Thin flat plate, `cl = sin(2a)`, `cd = 2 sin^2(a)` plus skin friction
fn flat_plate() -> CurveConfig {
    let aoa = (0..=36).map(|i| i as f64 * 5.).collect_vec();
    let cl = aoa.iter().map(|a| (2. * a.to_radians()).sin()).collect_vec();
    let cd = aoa
        .iter()
        .map(|a| 2. * a.to_radians().sin().powi(2) + 0.01)
        .collect_vec();
    CurveConfig {
        name: "flat_plate".to_string(),
        symmetric: true,
        aoa,
        cl,
        cd,
    }
}

//------------------------------------------------------------------------------
// Boats
//------------------------------------------------------------------------------

/// Single-handed 4 m dinghy: una rig, centreboard and rudder.
pub fn dinghy() -> VesselConfig {
    VesselConfig {
        name: "dinghy".to_string(),
        body: RigidBodyConfig::default(),
        hull: HullConfig::default(),
        aero_foils: vec![FoilConfig {
            name: "sail".to_string(),
            curve: "sail".to_string(),
            chord: 1.8,
            span: 4.,
            slice_offset: Some(1.8),
            position: [0.5, 0., 0.3],
            span_axis: [0., 0., 1.],
            chord_axis: [-1., 0., 0.],
            trim: 0.,
            trim_limit: 90.,
        }],
        hydro_foils: vec![
            FoilConfig {
                name: "centreboard".to_string(),
                curve: "naca0012".to_string(),
                chord: 0.35,
                span: 1.,
                slice_offset: None,
                position: [0.3, 0., -0.05],
                span_axis: [0., 0., -1.],
                chord_axis: [-1., 0., 0.],
                trim: 0.,
                trim_limit: 0.,
            },
            FoilConfig {
                name: "rudder".to_string(),
                curve: "naca0012".to_string(),
                chord: 0.25,
                span: 0.9,
                slice_offset: None,
                position: [-1.9, 0., 0.1],
                span_axis: [0., 0., -1.],
                chord_axis: [-1., 0., 0.],
                trim: 0.,
                trim_limit: 35.,
            },
        ],
        propulsors: vec![],
    }
}

/// Named boat configurations.
#[derive(Debug, Clone)]
pub struct BoatCatalog {
    boats: BTreeMap<String, VesselConfig>,
}

impl Default for BoatCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl BoatCatalog {
    /// Catalog with the compiled-in boats
    pub fn builtin() -> Self {
        let mut catalog = Self {
            boats: BTreeMap::new(),
        };
        catalog.insert(dinghy());
        catalog
    }

    /// Adds boats from a YAML list of vessel records, replacing same-named boats.
    pub fn extend_from_yaml_str(&mut self, yaml: &str) -> Result<()> {
        let boats: Vec<VesselConfig> = read_yaml_from_str(yaml)?;
        boats.into_iter().for_each(|boat| self.insert(boat));
        Ok(())
    }

    pub fn extend_from_yaml_file(&mut self, file_path: impl AsRef<Path>) -> Result<()> {
        let boats: Vec<VesselConfig> = read_yaml_from_file(file_path)?;
        boats.into_iter().for_each(|boat| self.insert(boat));
        Ok(())
    }

    pub fn insert(&mut self, boat: VesselConfig) {
        debug!("boat catalog: added '{}'", boat.name);
        self.boats.insert(boat.name.clone(), boat);
    }

    pub fn get(&self, name: &str) -> Option<&VesselConfig> {
        self.boats.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.boats.keys().map(|k| k.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{components::polar::LiftDragCurve, interp::CurveTable};
    use itertools::izip;

    #[test]
    fn test_builtin_curves_are_valid() {
        for config in builtin_curves() {
            CurveTable::new(&config.name, config.aoa.clone(), vec![config.cl.clone(), config.cd.clone()])
                .unwrap();
            let curve = LiftDragCurve::from_config(&config).unwrap();
            assert_eq!(curve.domain(), (0., 180.));
            assert_eq!(curve.evaluate(0.).0, 0.);
            for (&a, &cd) in izip!(&config.aoa, &config.cd) {
                assert!(cd > 0., "{} cd at {a}", config.name);
            }
        }
    }

    #[test]
    fn test_boat_catalog() {
        let mut catalog = BoatCatalog::builtin();
        assert!(catalog.get("dinghy").is_some());

        let yaml = r#"
- name: skiff
  hull:
    lwl: 4.5
- name: dinghy
  propulsors:
    - name: oars
      max_thrust: 60.0
"#;
        catalog.extend_from_yaml_str(yaml).unwrap();
        assert_eq!(catalog.names().collect_vec(), vec!["dinghy", "skiff"]);
        assert_eq!(catalog.get("skiff").unwrap().hull.lwl, 4.5);
        assert_eq!(catalog.get("dinghy").unwrap().propulsors[0].max_thrust, 60.);

        assert!(matches!(
            catalog.extend_from_yaml_file("does/not/exist.yaml"),
            Err(crate::error::ConfigError::Io(_))
        ));
    }
}
