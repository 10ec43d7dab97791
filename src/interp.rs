use itertools::Itertools;

use crate::error::{ConfigError, Result};

//------------------------------------------------------------------------------
// Lagrange Polynomials
//------------------------------------------------------------------------------

pub fn lagrange_polynomial(x: f64, xs: &[f64]) -> Vec<f64> {
    xs.iter()
        .enumerate()
        .map(|(j, &xj)| {
            xs.iter()
                .enumerate()
                .filter(|(m, _)| *m != j)
                .map(|(_, &xm)| (x - xm) / (xj - xm))
                .product()
        })
        .collect()
}

#[cfg(test)]
mod test_lagrange {

    use super::*;

    #[test]
    fn test_lagrange_polynomial() {
        let xs = vec![1.0, 2.0, 3.0];
        let ys = [1.0, 4.0, 9.0];
        let dot = |w: &[f64]| w.iter().zip(ys.iter()).map(|(a, b)| a * b).sum::<f64>();

        let w1 = lagrange_polynomial(1.0, &xs);
        let w2 = lagrange_polynomial(2.0, &xs);
        let w3 = lagrange_polynomial(3.0, &xs);

        assert_eq!(w1, vec![1.0, 0.0, 0.0]);
        assert_eq!(w2, vec![0.0, 1.0, 0.0]);
        assert_eq!(w3, vec![0.0, 0.0, 1.0]);

        assert_eq!(dot(&w1), 1.0);
        assert_eq!(dot(&w2), 4.0);
        assert_eq!(dot(&w3), 9.0);

        let w4 = lagrange_polynomial(1.5, &xs);
        assert_eq!(dot(&w4), 1.5 * 1.5);
    }
}

//------------------------------------------------------------------------------
// Table lookup
//------------------------------------------------------------------------------

/// Returns the index of the greatest sample `<= value` in the strictly
/// increasing slice `xs`.
///
/// Returns `None` when `value` is below the first sample and the last index
/// when `value` is at or beyond the last sample.
pub fn locate(xs: &[f64], value: f64) -> Option<usize> {
    let last = xs.len().checked_sub(1)?;
    if value < xs[0] {
        return None;
    }
    if value >= xs[last] {
        return Some(last);
    }
    let mut low = 0;
    let mut high = last;
    while high - low > 1 {
        let mid = (low + high) >> 1;
        if value < xs[mid] {
            high = mid;
        } else {
            low = mid;
        }
    }
    Some(low)
}

/// Interpolates `ys` sampled at the strictly increasing `xs` at `value`.
///
/// Uses a non-uniform Catmull-Rom cubic where both outer neighbors of the
/// segment exist, a quadratic through the three available samples next to
/// the table ends, and a straight line for two-sample tables. Values outside
/// the table clamp to the end samples. Stored samples are reproduced exactly.
///
/// # Panics
/// Panics if `xs` is empty or `ys` is shorter than `xs`.
pub fn interpolate(xs: &[f64], ys: &[f64], value: f64) -> f64 {
    let last = xs.len() - 1;
    let i = match locate(xs, value) {
        None => return ys[0],
        Some(i) if i == last => return ys[last],
        Some(i) => i,
    };

    let has_prev = i > 0;
    let has_next = i + 2 <= last;

    match (has_prev, has_next) {
        (true, true) => catmull_rom(&xs[i - 1..i + 3], &ys[i - 1..i + 3], value),
        (true, false) => quadratic(&xs[i - 1..i + 2], &ys[i - 1..i + 2], value),
        (false, true) => quadratic(&xs[i..i + 3], &ys[i..i + 3], value),
        (false, false) => {
            let alpha = (value - xs[i]) / (xs[i + 1] - xs[i]);
            ys[i] + alpha * (ys[i + 1] - ys[i])
        }
    }
}

/// Cubic Hermite segment between the middle two of four samples with
/// finite-difference tangents over the non-uniform spacing.
fn catmull_rom(x: &[f64], y: &[f64], value: f64) -> f64 {
    let h = x[2] - x[1];
    let u = (value - x[1]) / h;
    let m1 = (y[2] - y[0]) / (x[2] - x[0]);
    let m2 = (y[3] - y[1]) / (x[3] - x[1]);

    let u2 = u * u;
    let u3 = u2 * u;
    let h00 = 2. * u3 - 3. * u2 + 1.;
    let h10 = u3 - 2. * u2 + u;
    let h01 = -2. * u3 + 3. * u2;
    let h11 = u3 - u2;

    h00 * y[1] + h10 * h * m1 + h01 * y[2] + h11 * h * m2
}

fn quadratic(x: &[f64], y: &[f64], value: f64) -> f64 {
    lagrange_polynomial(value, x)
        .iter()
        .zip(y)
        .map(|(w, y)| w * y)
        .sum()
}

//------------------------------------------------------------------------------
// Curve table
//------------------------------------------------------------------------------

/// Parameter column shared by one or more value columns.
///
/// Parameters are finite and strictly increasing; the table is read-only
/// once constructed.
#[derive(Clone, Debug)]
pub struct CurveTable {
    x: Vec<f64>,
    columns: Vec<Vec<f64>>,
}

impl CurveTable {
    /// Validates and builds a table. `name` only labels errors.
    pub fn new(name: &str, x: Vec<f64>, columns: Vec<Vec<f64>>) -> Result<Self> {
        if x.is_empty() {
            return Err(ConfigError::EmptyTable {
                table: name.to_string(),
            });
        }
        if let Some(index) = x.iter().position(|v| !v.is_finite()) {
            return Err(ConfigError::NonFinite {
                table: name.to_string(),
                index,
            });
        }
        if let Some((index, (&previous, &value))) = x
            .iter()
            .tuple_windows()
            .enumerate()
            .find(|(_, (a, b))| b <= a)
        {
            return Err(ConfigError::NonIncreasing {
                table: name.to_string(),
                index: index + 1,
                previous,
                value,
            });
        }
        for (column, values) in columns.iter().enumerate() {
            if values.len() != x.len() {
                return Err(ConfigError::LengthMismatch {
                    table: name.to_string(),
                    column,
                    got: values.len(),
                    expected: x.len(),
                });
            }
            if let Some(index) = values.iter().position(|v| !v.is_finite()) {
                return Err(ConfigError::NonFinite {
                    table: name.to_string(),
                    index,
                });
            }
        }
        Ok(Self { x, columns })
    }

    pub fn parameters(&self) -> &[f64] {
        &self.x
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Domain `(first, last)` of the parameter column
    pub fn domain(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    /// Index of the sample at or below `value`, see [`locate`]
    pub fn locate(&self, value: f64) -> Option<usize> {
        locate(&self.x, value)
    }

    /// Interpolated value of one column at `value`
    ///
    /// # Panics
    /// Panics if `column >= self.n_columns()`.
    pub fn evaluate(&self, column: usize, value: f64) -> f64 {
        interpolate(&self.x, &self.columns[column], value)
    }

    /// Interpolates every column at `value` into `out`, in column order.
    ///
    /// Only `min(out.len(), self.n_columns())` entries are written.
    pub fn evaluate_into(&self, value: f64, out: &mut [f64]) {
        out.iter_mut()
            .zip(self.columns.iter())
            .for_each(|(o, ys)| *o = interpolate(&self.x, ys, value));
    }
}
