use std::{collections::BTreeMap, sync::Arc};

use log::{debug, warn};

use crate::{
    config::CurveConfig,
    error::{ConfigError, Result},
    interp::CurveTable,
};

const CL: usize = 0;
const CD: usize = 1;

/// Lift and drag coefficients tabulated against angle of attack in degrees.
#[derive(Debug, Clone)]
pub struct LiftDragCurve {
    pub name: String,
    /// Table covers `[0, 180]`; negative angles mirror it with Cl negated
    pub symmetric: bool,
    table: CurveTable,
}

impl LiftDragCurve {
    pub fn new(name: &str, symmetric: bool, aoa: Vec<f64>, cl: Vec<f64>, cd: Vec<f64>) -> Result<Self> {
        let table = CurveTable::new(name, aoa, vec![cl, cd])?;
        if symmetric {
            let (first, last) = table.domain();
            if first < 0. || last > 180. {
                return Err(ConfigError::InvalidParameter {
                    parameter: format!("{name}.aoa"),
                    reason: format!("symmetric curve must lie within [0, 180], got [{first}, {last}]"),
                });
            }
        }
        Ok(Self {
            name: name.to_string(),
            symmetric,
            table,
        })
    }

    pub fn from_config(config: &CurveConfig) -> Result<Self> {
        Self::new(
            &config.name,
            config.symmetric,
            config.aoa.clone(),
            config.cl.clone(),
            config.cd.clone(),
        )
    }

    /// Returns `(cl, cd)` at the angle of attack `aoa` in degrees.
    ///
    /// Angles outside the table clamp to the end samples.
    pub fn evaluate(&self, aoa: f64) -> (f64, f64) {
        if self.symmetric {
            let a = aoa.abs();
            let cl = self.table.evaluate(CL, a);
            let cd = self.table.evaluate(CD, a);
            if aoa < 0. {
                (-cl, cd)
            } else {
                (cl, cd)
            }
        } else {
            (self.table.evaluate(CL, aoa), self.table.evaluate(CD, aoa))
        }
    }

    /// Angle of attack domain `(first, last)` in degrees
    pub fn domain(&self) -> (f64, f64) {
        self.table.domain()
    }
}

/// Named lift/drag curves shared between foils.
#[derive(Debug, Clone, Default)]
pub struct PolarCatalog {
    curves: BTreeMap<String, Arc<LiftDragCurve>>,
}

impl PolarCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the compiled-in curves
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for config in crate::catalog::builtin_curves() {
            // Built-in tables are valid by construction; an invalid one is skipped
            match LiftDragCurve::from_config(&config) {
                Ok(curve) => catalog.insert(curve),
                Err(e) => warn!("skipping built-in curve '{}': {e}", config.name),
            }
        }
        catalog
    }

    /// Adds a curve, replacing any curve with the same name.
    pub fn insert(&mut self, curve: LiftDragCurve) {
        debug!("registered lift/drag curve '{}'", curve.name);
        self.curves.insert(curve.name.clone(), Arc::new(curve));
    }

    /// Validates and adds every configured curve.
    pub fn extend_from_config(&mut self, configs: &[CurveConfig]) -> Result<()> {
        for config in configs {
            self.insert(LiftDragCurve::from_config(config)?);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<LiftDragCurve>> {
        self.curves
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownCurve(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.curves.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_curve() -> LiftDragCurve {
        LiftDragCurve::new(
            "test",
            false,
            vec![-10., 0., 10., 20.],
            vec![-1., 0., 1., 1.2],
            vec![0.1, 0.01, 0.1, 0.3],
        )
        .unwrap()
    }

    #[test]
    fn test_evaluate_at_samples_and_clamped() {
        let curve = test_curve();

        struct Case {
            aoa: f64,
            cl: f64,
            cd: f64,
        }

        vec![
            Case { aoa: -10., cl: -1., cd: 0.1 },
            Case { aoa: 0., cl: 0., cd: 0.01 },
            Case { aoa: 20., cl: 1.2, cd: 0.3 },
            Case { aoa: -45., cl: -1., cd: 0.1 },
            Case { aoa: 90., cl: 1.2, cd: 0.3 },
        ]
        .iter()
        .for_each(|c| {
            let (cl, cd) = curve.evaluate(c.aoa);
            assert_relative_eq!(cl, c.cl, epsilon = 1e-12);
            assert_relative_eq!(cd, c.cd, epsilon = 1e-12);
        });
    }

    #[test]
    fn test_symmetric_curve_mirrors() {
        let curve = LiftDragCurve::new(
            "sym",
            true,
            vec![0., 10., 20., 90., 180.],
            vec![0., 1., 1.1, 0.1, 0.],
            vec![0.01, 0.05, 0.2, 1.3, 0.05],
        )
        .unwrap();

        for aoa in [3., 10., 15., 47.5, 90., 170.] {
            let (cl_pos, cd_pos) = curve.evaluate(aoa);
            let (cl_neg, cd_neg) = curve.evaluate(-aoa);
            assert_eq!(cl_neg, -cl_pos);
            assert_eq!(cd_neg, cd_pos);
        }
        assert_eq!(curve.evaluate(0.).0, 0.);
        assert_relative_eq!(curve.evaluate(-10.).0, -1., epsilon = 1e-12);
    }

    #[test]
    fn test_symmetric_curve_rejects_negative_angles() {
        let result = LiftDragCurve::new("sym", true, vec![-5., 5.], vec![0., 0.], vec![0., 0.]);
        assert!(matches!(result, Err(ConfigError::InvalidParameter { .. })));
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = PolarCatalog::builtin();
        for name in ["sail", "naca0012", "flat_plate"] {
            assert!(catalog.get(name).is_ok(), "missing {name}");
        }
        assert!(matches!(
            catalog.get("nope"),
            Err(ConfigError::UnknownCurve(name)) if name == "nope"
        ));

        // Same name shares the same table
        let a = catalog.get("sail").unwrap();
        let b = catalog.get("sail").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_catalog_override() {
        let mut catalog = PolarCatalog::builtin();
        let n = catalog.len();
        catalog
            .extend_from_config(&[CurveConfig {
                name: "sail".to_string(),
                symmetric: false,
                aoa: vec![0., 1.],
                cl: vec![2., 2.],
                cd: vec![0., 0.],
            }])
            .unwrap();
        assert_eq!(catalog.len(), n);
        assert_eq!(catalog.get("sail").unwrap().evaluate(0.5).0, 2.);
    }
}
