use log::debug;

use crate::{
    components::{
        inflow::{FlowField, Water, Wind},
        polar::PolarCatalog,
    },
    config::{EnvironmentConfig, FluidConfig, ScenarioConfig, VesselConfig},
    error::{require_positive, Result},
    vessel::Vessel,
};

/// World state: fluids, flow fields and the vessels moving through them.
///
/// Each [`Environment::update`] advances the flow fields first and then every
/// vessel in insertion order.
#[derive(Debug, Clone)]
pub struct Environment {
    fluids: FluidConfig,
    wind: Wind,
    water: Water,
    catalog: PolarCatalog,
    vessels: Vec<Vessel>,
    time: f64,
}

impl Environment {
    pub fn new(config: &EnvironmentConfig) -> Result<Self> {
        let fluids = config.fluids;
        require_positive("fluids.air_density", fluids.air_density)?;
        require_positive("fluids.water_density", fluids.water_density)?;
        require_positive(
            "fluids.water_kinematic_viscosity",
            fluids.water_kinematic_viscosity,
        )?;
        require_positive("fluids.gravity", fluids.gravity)?;

        let mut catalog = PolarCatalog::builtin();
        catalog.extend_from_config(&config.curves)?;

        let environment = Self {
            fluids,
            wind: Wind::new(&config.wind)?,
            water: Water::new(&config.water)?,
            catalog,
            vessels: vec![],
            time: 0.,
        };
        debug!(
            "environment created: wind {:.1} m/s, {} curves",
            config.wind.speed,
            environment.catalog.len()
        );
        Ok(environment)
    }

    /// Builds the environment and every vessel of a scenario.
    pub fn from_scenario(config: &ScenarioConfig) -> Result<Self> {
        let mut environment = Self::new(&config.environment)?;
        for vessel in &config.vessels {
            environment.add_vessel(vessel)?;
        }
        Ok(environment)
    }

    /// Adds a vessel and returns its index.
    pub fn add_vessel(&mut self, config: &VesselConfig) -> Result<usize> {
        let vessel = Vessel::new(config, &self.catalog)?;
        self.vessels.push(vessel);
        debug!(
            "added vessel '{}' as #{}",
            config.name,
            self.vessels.len() - 1
        );
        Ok(self.vessels.len() - 1)
    }

    /// Advances the world by `dt` seconds.
    pub fn update(&mut self, dt: f64) {
        self.wind.update(dt);
        self.water.update(dt);
        for vessel in self.vessels.iter_mut() {
            vessel.update_forces(dt, &self.wind, &self.water, &self.fluids);
        }
        self.time += dt;
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn fluids(&self) -> &FluidConfig {
        &self.fluids
    }

    pub fn catalog(&self) -> &PolarCatalog {
        &self.catalog
    }

    pub fn wind(&self) -> &Wind {
        &self.wind
    }

    pub fn wind_mut(&mut self) -> &mut Wind {
        &mut self.wind
    }

    pub fn water(&self) -> &Water {
        &self.water
    }

    pub fn vessels(&self) -> &[Vessel] {
        &self.vessels
    }

    pub fn vessel_mut(&mut self, index: usize) -> Option<&mut Vessel> {
        self.vessels.get_mut(index)
    }

    pub fn vessel_by_name(&self, name: &str) -> Option<&Vessel> {
        self.vessels.iter().find(|vessel| vessel.name == name)
    }

    /// Sets the trim of the foil named `foil` on every vessel that has one and
    /// returns how many were trimmed.
    pub fn set_trim_all(&mut self, foil: &str, trim: f64) -> usize {
        let mut count = 0;
        for vessel in self.vessels.iter_mut() {
            if vessel.set_trim(foil, trim) {
                count += 1;
            } else {
                debug!("vessel '{}' has no foil named '{foil}'", vessel.name);
            }
        }
        count
    }
}
