use itertools::Itertools;
use log::{debug, trace};

use crate::{
    components::{
        foil::FoilInstance,
        hull::Hull,
        inflow::FlowField,
        polar::PolarCatalog,
        propulsor::Propulsor,
    },
    config::{FluidConfig, VesselConfig},
    error::Result,
    frame::CoordinateFrame,
    rigid_body::{PhysicsBody, RigidBody},
    util::{add_assign, cross, norm, sub},
};

/// Force and torque contributed by one stage of the vessel update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageLoad {
    pub force: [f64; 3],  // World force (N)
    pub torque: [f64; 3], // World torque about the centre of mass (N m)
}

impl StageLoad {
    fn add(&mut self, force: &[f64; 3], torque: &[f64; 3]) {
        add_assign(&mut self.force, force);
        add_assign(&mut self.torque, torque);
    }
}

/// Loads applied in the last update, one entry per stage in application order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VesselLoads {
    pub aero: StageLoad,
    pub hydro: StageLoad,
    pub hull: StageLoad,
    pub propulsion: StageLoad,
}

impl VesselLoads {
    pub fn total(&self) -> StageLoad {
        let mut total = StageLoad::default();
        for stage in [&self.aero, &self.hydro, &self.hull, &self.propulsion] {
            total.add(&stage.force, &stage.torque);
        }
        total
    }
}

/// Sailing craft: a rigid body carrying a hull, foils and propulsors.
///
/// Loads are applied in a fixed order every update: aero foils, hydro foils,
/// hull, propulsion. The order is part of the contract as floating point
/// accumulation is order dependent.
#[derive(Debug, Clone)]
pub struct Vessel {
    pub name: String,
    body: RigidBody,
    hull: Hull,
    aero_foils: Vec<FoilInstance>,
    hydro_foils: Vec<FoilInstance>,
    propulsors: Vec<Propulsor>,
    loads: VesselLoads,
}

impl Vessel {
    /// Builds a vessel, resolving foil curves against `catalog`.
    pub fn new(config: &VesselConfig, catalog: &PolarCatalog) -> Result<Self> {
        let body = RigidBody::from_config(&config.body)?;
        let hull = Hull::new(&config.hull)?;
        let aero_foils = config
            .aero_foils
            .iter()
            .map(|foil| FoilInstance::from_config(foil, catalog, false))
            .collect::<Result<Vec<_>>>()?;
        let hydro_foils = config
            .hydro_foils
            .iter()
            .map(|foil| FoilInstance::from_config(foil, catalog, true))
            .collect::<Result<Vec<_>>>()?;
        let propulsors = config
            .propulsors
            .iter()
            .map(Propulsor::new)
            .collect::<Result<Vec<_>>>()?;

        let mut vessel = Self {
            name: config.name.clone(),
            body,
            hull,
            aero_foils,
            hydro_foils,
            propulsors,
            loads: VesselLoads::default(),
        };
        vessel.refresh_foils();

        debug!(
            "built vessel '{}' with foils [{}] and {} propulsor(s)",
            vessel.name,
            vessel.foils().map(|f| f.name()).join(", "),
            vessel.propulsors.len()
        );
        Ok(vessel)
    }

    /// Applies one tick of loads and integrates the body by `dt`.
    pub fn update_forces(
        &mut self,
        dt: f64,
        wind: &dyn FlowField,
        water: &dyn FlowField,
        fluids: &FluidConfig,
    ) {
        let mut loads = VesselLoads::default();
        self.body.reset_loads();
        self.refresh_foils();

        // Aero foils
        for foil in self.aero_foils.iter_mut() {
            let load = foil.update_load(wind, fluids.air_density, &self.body);
            self.body.add_world_force(&load.force);
            self.body.add_world_torque(&load.torque);
            loads.aero.add(&load.force, &load.torque);
        }

        // Hydro foils
        for foil in self.hydro_foils.iter_mut() {
            let load = foil.update_load(water, fluids.water_density, &self.body);
            self.body.add_world_force(&load.force);
            self.body.add_world_torque(&load.torque);
            loads.hydro.add(&load.force, &load.torque);
        }

        // Hull
        let center = self
            .body
            .frame()
            .local_to_world_point(&self.hull.geometry.lateral_resistance_center);
        let through_water = sub(
            &self.body.point_velocity(&center),
            &water.flow_velocity(&center),
        );
        let speed = norm(&[through_water[0], through_water[1], 0.]);
        let heel = self.heel_deg();
        self.hull.update(speed, heel, fluids);
        let load = self.hull.apply(&mut self.body, &through_water);
        loads.hull.add(&load.force, &load.torque);

        // Propulsion
        for propulsor in self.propulsors.iter() {
            let force = propulsor.apply(&mut self.body);
            let point = self.body.frame().local_to_world_point(&propulsor.position);
            let r = sub(&point, &self.body.center_of_mass_world());
            loads
                .propulsion
                .add(&force, &cross(&r, &force));
        }

        self.loads = loads;
        let total = loads.total();
        trace!(
            "vessel '{}' force=[{:.2}, {:.2}, {:.2}] torque=[{:.2}, {:.2}, {:.2}]",
            self.name,
            total.force[0],
            total.force[1],
            total.force[2],
            total.torque[0],
            total.torque[1],
            total.torque[2]
        );

        self.body.integrate(dt);
    }

    fn refresh_foils(&mut self) {
        let frame = *self.body.frame();
        self.aero_foils
            .iter_mut()
            .chain(self.hydro_foils.iter_mut())
            .for_each(|foil| foil.refresh(&frame));
    }

    pub fn body(&self) -> &RigidBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut RigidBody {
        &mut self.body
    }

    pub fn frame(&self) -> &CoordinateFrame {
        self.body.frame()
    }

    pub fn hull(&self) -> &Hull {
        &self.hull
    }

    /// Loads applied in the last update
    pub fn loads(&self) -> &VesselLoads {
        &self.loads
    }

    /// Horizontal speed over ground (m/s)
    pub fn speed(&self) -> f64 {
        let v = self.body.velocity();
        norm(&[v[0], v[1], 0.])
    }

    /// Azimuth of the bow (deg)
    pub fn heading_deg(&self) -> f64 {
        self.frame().spherical_angles()[0]
    }

    /// Rotation about the body roll axis (deg)
    pub fn heel_deg(&self) -> f64 {
        self.frame().spherical_angles()[2]
    }

    pub fn aero_foils(&self) -> &[FoilInstance] {
        &self.aero_foils
    }

    pub fn hydro_foils(&self) -> &[FoilInstance] {
        &self.hydro_foils
    }

    /// Aero foils followed by hydro foils
    pub fn foils(&self) -> impl Iterator<Item = &FoilInstance> {
        self.aero_foils.iter().chain(self.hydro_foils.iter())
    }

    /// First foil named `name`, aero foils searched first
    pub fn foil_mut(&mut self, name: &str) -> Option<&mut FoilInstance> {
        self.aero_foils
            .iter_mut()
            .chain(self.hydro_foils.iter_mut())
            .find(|foil| foil.name() == name)
    }

    /// Sets the trim of the foil named `name`; returns false if there is none.
    pub fn set_trim(&mut self, name: &str, trim: f64) -> bool {
        match self.foil_mut(name) {
            Some(foil) => {
                foil.set_trim(trim);
                true
            }
            None => false,
        }
    }

    pub fn propulsors(&self) -> &[Propulsor] {
        &self.propulsors
    }

    /// Sets the throttle of every propulsor
    pub fn set_throttle(&mut self, throttle: f64) {
        self.propulsors
            .iter_mut()
            .for_each(|propulsor| propulsor.set_throttle(throttle));
    }
}
