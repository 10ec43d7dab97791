use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    components::puff::WindPuff,
    config::{PuffGeneratorConfig, WaterConfig, WindConfig},
    error::{require_non_negative, require_positive, ConfigError, Result},
    util::norm2,
};

/// Spatially varying fluid velocity sampled by foils and hulls.
pub trait FlowField {
    /// Fluid velocity at a world position
    fn flow_velocity(&self, position: &[f64; 3]) -> [f64; 3];

    /// Writes the fluid velocity at a world position into `out`
    fn flow_velocity_into(&self, position: &[f64; 3], out: &mut [f64; 3]) {
        *out = self.flow_velocity(position);
    }

    /// Advances any time-dependent state of the field
    fn update(&mut self, dt: f64);
}

//------------------------------------------------------------------------------
// Steady wind
//------------------------------------------------------------------------------

/// Power law sheared wind that is constant in time.
#[derive(Debug, Clone)]
pub struct SteadyWind {
    pub velocity_horizontal: f64,   // Horizontal inflow velocity at reference height (m/s)
    pub height_reference: f64,      // Reference height (m)
    pub shear_vertical: f64,        // Vertical shear exponent
    pub flow_angle_horizontal: f64, // Flow angle relative to x axis (radians)
}

impl SteadyWind {
    pub fn velocity(&self, position: &[f64; 3]) -> [f64; 3] {
        // Calculate horizontal velocity, no wind below the water surface
        let vh = if self.shear_vertical == 0. {
            self.velocity_horizontal
        } else {
            self.velocity_horizontal
                * (position[2].max(0.) / self.height_reference).powf(self.shear_vertical)
        };

        // Get sin and cos of flow angle
        let (sin_flow_angle, cos_flow_angle) = self.flow_angle_horizontal.sin_cos();

        // Apply horizontal direction
        [vh * cos_flow_angle, -vh * sin_flow_angle, 0.]
    }

    /// Unit horizontal flow direction
    pub fn direction(&self) -> [f64; 2] {
        let (sin_flow_angle, cos_flow_angle) = self.flow_angle_horizontal.sin_cos();
        [cos_flow_angle, -sin_flow_angle]
    }
}

//------------------------------------------------------------------------------
// Wind
//------------------------------------------------------------------------------

/// Steady wind plus travelling puffs.
#[derive(Debug, Clone)]
pub struct Wind {
    steady: SteadyWind,
    puffs: Vec<WindPuff>,
    generator: Option<PuffGenerator>,
    time: f64,
}

impl Wind {
    /// Steady wind without puffs, `flow_angle` in degrees
    pub fn steady(
        velocity_horizontal: f64,
        flow_angle: f64,
        height_reference: f64,
        shear_vertical: f64,
    ) -> Self {
        Wind {
            steady: SteadyWind {
                velocity_horizontal,
                height_reference,
                shear_vertical,
                flow_angle_horizontal: flow_angle.to_radians(),
            },
            puffs: vec![],
            generator: None,
            time: 0.,
        }
    }

    pub fn new(config: &WindConfig) -> Result<Self> {
        require_non_negative("wind.speed", config.speed)?;
        require_positive("wind.reference_height", config.reference_height)?;
        require_non_negative("wind.shear_exponent", config.shear_exponent)?;
        if !config.direction.is_finite() {
            return Err(ConfigError::InvalidParameter {
                parameter: "wind.direction".to_string(),
                reason: "must be finite".to_string(),
            });
        }
        let mut wind = Self::steady(
            config.speed,
            config.direction,
            config.reference_height,
            config.shear_exponent,
        );
        wind.generator = config.puffs.as_ref().map(PuffGenerator::new).transpose()?;
        Ok(wind)
    }

    pub fn steady_wind(&self) -> &SteadyWind {
        &self.steady
    }

    /// Active puffs in creation order
    pub fn puffs(&self) -> &[WindPuff] {
        &self.puffs
    }

    pub fn add_puff(&mut self, puff: WindPuff) {
        debug!(
            "added wind puff at ({:.1}, {:.1}) t={:.2}",
            puff.leading_edge[0], puff.leading_edge[1], self.time
        );
        self.puffs.push(puff);
    }

    pub fn time(&self) -> f64 {
        self.time
    }
}

impl FlowField for Wind {
    fn flow_velocity(&self, position: &[f64; 3]) -> [f64; 3] {
        let mut v = self.steady.velocity(position);
        let p = [position[0], position[1]];
        self.puffs.iter().for_each(|puff| {
            let g = puff.velocity_at(&p);
            v[0] += g[0];
            v[1] += g[1];
        });
        v
    }

    fn update(&mut self, dt: f64) {
        self.time += dt;

        self.puffs.iter_mut().for_each(|puff| puff.update(dt));
        let n_before = self.puffs.len();
        self.puffs.retain(|puff| !puff.is_retired());
        if self.puffs.len() < n_before {
            debug!(
                "retired {} wind puff(s) t={:.2}",
                n_before - self.puffs.len(),
                self.time
            );
        }

        if let Some(generator) = self.generator.as_mut() {
            generator.update(dt, &self.steady, &mut self.puffs);
        }
    }
}

//------------------------------------------------------------------------------
// Puff generator
//------------------------------------------------------------------------------

/// Seeded source of random puffs spawned upwind of the sailing area.
#[derive(Debug, Clone)]
pub struct PuffGenerator {
    config: PuffGeneratorConfig,
    rng: StdRng,
    timer: f64,
}

impl PuffGenerator {
    pub fn new(config: &PuffGeneratorConfig) -> Result<Self> {
        require_positive("puffs.interval", config.interval)?;
        require_non_negative("puffs.upwind_distance", config.upwind_distance)?;
        require_non_negative("puffs.lateral_spread", config.lateral_spread)?;
        require_non_negative("puffs.direction_spread", config.direction_spread)?;
        require_non_negative("puffs.taper.edge", config.taper.edge)?;
        require_non_negative("puffs.taper.side", config.taper.side)?;
        for (name, range) in [
            ("puffs.speed", config.speed),
            ("puffs.depth", config.depth),
            ("puffs.leading_width", config.leading_width),
            ("puffs.trailing_width", config.trailing_width),
            ("puffs.travel_distance", config.travel_distance),
        ] {
            require_non_negative(name, range[0])?;
            require_non_negative(name, range[1])?;
            if range[0] > range[1] {
                return Err(ConfigError::InvalidParameter {
                    parameter: name.to_string(),
                    reason: format!("range minimum {} exceeds maximum {}", range[0], range[1]),
                });
            }
        }
        require_positive("puffs.depth", config.depth[0])?;
        require_positive("puffs.leading_width", config.leading_width[0])?;

        Ok(Self {
            config: config.clone(),
            rng: StdRng::seed_from_u64(config.seed),
            timer: 0.,
        })
    }

    fn sample(&mut self, range: [f64; 2]) -> f64 {
        self.rng.gen_range(range[0]..=range[1])
    }

    /// Spawns a puff every `interval` seconds into `puffs`.
    pub fn update(&mut self, dt: f64, steady: &SteadyWind, puffs: &mut Vec<WindPuff>) {
        self.timer += dt;
        while self.timer >= self.config.interval {
            self.timer -= self.config.interval;
            let puff = self.spawn(steady);
            debug!(
                "spawned wind puff at ({:.1}, {:.1}) speed {:.2}",
                puff.leading_edge[0],
                puff.leading_edge[1],
                norm2(&puff.velocity)
            );
            puffs.push(puff);
        }
    }

    fn spawn(&mut self, steady: &SteadyWind) -> WindPuff {
        let spread = self.config.direction_spread;
        let angle =
            steady.flow_angle_horizontal + self.sample([-spread, spread]).to_radians();
        let (sin_angle, cos_angle) = angle.sin_cos();
        let d = [cos_angle, -sin_angle];

        let speed = self.sample(self.config.speed);
        let depth = self.sample(self.config.depth);
        let leading_width = self.sample(self.config.leading_width);
        let trailing_width = self.sample(self.config.trailing_width);
        let travel_distance = self.sample(self.config.travel_distance);
        let lateral = self.config.lateral_spread;
        let offset = self.sample([-lateral, lateral]);

        // Upwind of the centre, shifted across the wind
        let base = steady.direction();
        let across = [-base[1], base[0]];
        let c = self.config.center;
        let upwind = self.config.upwind_distance;
        let leading_edge = [
            c[0] - base[0] * upwind + across[0] * offset,
            c[1] - base[1] * upwind + across[1] * offset,
        ];

        WindPuff::new(
            leading_edge,
            [d[0] * speed, d[1] * speed],
            depth,
            leading_width,
            trailing_width,
            travel_distance,
            self.config.taper,
        )
    }
}

//------------------------------------------------------------------------------
// Water
//------------------------------------------------------------------------------

/// Uniform horizontal water current.
#[derive(Debug, Clone, Default)]
pub struct Water {
    pub speed: f64,      // m/s
    pub flow_angle: f64, // Flow angle relative to x axis (radians)
    time: f64,
}

impl Water {
    pub fn new(config: &WaterConfig) -> Result<Self> {
        require_non_negative("water.speed", config.speed)?;
        Ok(Self::uniform(config.speed, config.direction))
    }

    /// Uniform current, `flow_angle` in degrees
    pub fn uniform(speed: f64, flow_angle: f64) -> Self {
        Self {
            speed,
            flow_angle: flow_angle.to_radians(),
            time: 0.,
        }
    }

    /// Still water
    pub fn still() -> Self {
        Self::default()
    }

    pub fn time(&self) -> f64 {
        self.time
    }
}

impl FlowField for Water {
    fn flow_velocity(&self, _position: &[f64; 3]) -> [f64; 3] {
        let (sin_flow_angle, cos_flow_angle) = self.flow_angle.sin_cos();
        [self.speed * cos_flow_angle, -self.speed * sin_flow_angle, 0.]
    }

    fn update(&mut self, dt: f64) {
        self.time += dt;
    }
}
