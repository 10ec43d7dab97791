use crate::{
    config::PuffTaper,
    util::{dot2, norm2, perp2, unit_vector2},
};

/// Transient gust with a trapezoidal footprint that travels across the water.
///
/// The footprint runs from the trailing edge (`s = 0`) to the leading edge
/// (`s = depth`) along the travel direction and widens linearly from
/// `trailing_width` to `leading_width`.
#[derive(Debug, Clone, PartialEq)]
pub struct WindPuff {
    pub leading_edge: [f64; 2],     // Centre of the leading edge (m)
    pub velocity: [f64; 2],         // Travel velocity, also the peak gust velocity (m/s)
    pub depth: f64,                 // Length along the travel direction (m)
    pub leading_width: f64,         // m
    pub trailing_width: f64,        // m
    pub total_travel_distance: f64, // Distance before retirement (m)
    pub distance_travelled: f64,    // m
    pub taper: PuffTaper,
}

impl WindPuff {
    pub fn new(
        leading_edge: [f64; 2],
        velocity: [f64; 2],
        depth: f64,
        leading_width: f64,
        trailing_width: f64,
        total_travel_distance: f64,
        taper: PuffTaper,
    ) -> Self {
        Self {
            leading_edge,
            velocity,
            depth,
            leading_width,
            trailing_width,
            total_travel_distance,
            distance_travelled: 0.,
            taper,
        }
    }

    /// Unit travel direction, `None` for a stationary puff
    pub fn direction(&self) -> Option<[f64; 2]> {
        unit_vector2(&self.velocity)
    }

    /// Centre of the trailing edge
    pub fn trailing_edge(&self) -> [f64; 2] {
        match self.direction() {
            Some(d) => [
                self.leading_edge[0] - d[0] * self.depth,
                self.leading_edge[1] - d[1] * self.depth,
            ],
            None => self.leading_edge,
        }
    }

    /// Horizontal gust velocity the puff adds at `position`.
    ///
    /// Zero outside the footprint, at the trailing edge centre and at or
    /// beyond the leading edge.
    pub fn velocity_at(&self, position: &[f64; 2]) -> [f64; 2] {
        let Some(d) = self.direction() else {
            return [0., 0.];
        };
        if self.depth <= 0. || self.leading_width <= 0. {
            return [0., 0.];
        }
        let n = perp2(&d);

        // Footprint coordinates relative to the trailing edge centre
        let trailing = self.trailing_edge();
        let r = [position[0] - trailing[0], position[1] - trailing[1]];
        let s = dot2(&r, &d);
        let w = dot2(&r, &n);
        if s <= 0. || s >= self.depth {
            return [0., 0.];
        }

        let half_leading = 0.5 * self.leading_width;
        let half_trailing = 0.5 * self.trailing_width;
        let dh_ds = (half_leading - half_trailing) / self.depth;
        let h = half_trailing + dh_ds * s;
        if w.abs() >= h {
            return [0., 0.];
        }

        let speed = norm2(&self.velocity) * h / half_leading
            * self.edge_taper(s)
            * self.side_taper(w, h);

        // Flow fans out along the footprint sides
        let lateral = w / h * dh_ds;
        let dir = [d[0] + n[0] * lateral, d[1] + n[1] * lateral];
        match unit_vector2(&dir) {
            Some(u) => [u[0] * speed, u[1] * speed],
            None => [0., 0.],
        }
    }

    fn edge_taper(&self, s: f64) -> f64 {
        let band = self.taper.edge * self.depth;
        if band <= 0. {
            return 1.;
        }
        (s / band).min((self.depth - s) / band).min(1.)
    }

    fn side_taper(&self, w: f64, h: f64) -> f64 {
        let band = self.taper.side * h;
        if band <= 0. {
            return 1.;
        }
        ((h - w.abs()) / band).min(1.)
    }

    /// Advances the puff along its velocity.
    pub fn update(&mut self, dt: f64) {
        self.leading_edge[0] += self.velocity[0] * dt;
        self.leading_edge[1] += self.velocity[1] * dt;
        self.distance_travelled += norm2(&self.velocity) * dt;
    }

    pub fn is_retired(&self) -> bool {
        self.distance_travelled > self.total_travel_distance
    }
}
