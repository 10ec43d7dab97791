use serde::{Deserialize, Serialize};

/// Rotation quaternion stored as `[w, x, y, z]`.
#[derive(Clone, Debug, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    w: f64,
    x: f64,
    y: f64,
    z: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quaternion {
    pub fn identity() -> Self {
        Quaternion {
            w: 1.,
            x: 0.,
            y: 0.,
            z: 0.,
        }
    }

    pub fn from_vec(a: &[f64; 4]) -> Self {
        Self {
            w: a[0],
            x: a[1],
            y: a[2],
            z: a[3],
        }
    }

    pub fn as_vec(self) -> [f64; 4] {
        [self.w, self.x, self.y, self.z]
    }

    pub fn norm(self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Returns the unit quaternion, or identity if the norm vanished.
    pub fn normalize(self) -> Self {
        let m = self.norm();
        if m < f64::EPSILON || !m.is_finite() {
            Self::identity()
        } else {
            Self {
                w: self.w / m,
                x: self.x / m,
                y: self.y / m,
                z: self.z / m,
            }
        }
    }

    /// Multiplicative inverse, the conjugate over the squared norm
    pub fn inverse(self) -> Self {
        let norm_squared = self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z;
        Self {
            w: self.w / norm_squared,
            x: -self.x / norm_squared,
            y: -self.y / norm_squared,
            z: -self.z / norm_squared,
        }
    }

    /// Hamilton product `self * q2`; the result applies `q2` first.
    pub fn compose(self, q2: &Quaternion) -> Quaternion {
        Quaternion {
            w: self.w * q2.w - self.x * q2.x - self.y * q2.y - self.z * q2.z,
            x: self.w * q2.x + self.x * q2.w + self.y * q2.z - self.z * q2.y,
            y: self.w * q2.y - self.x * q2.z + self.y * q2.w + self.z * q2.x,
            z: self.w * q2.z + self.x * q2.y - self.y * q2.x + self.z * q2.w,
        }
    }

    pub fn as_matrix(self) -> [[f64; 3]; 3] {
        [
            [
                self.w * self.w + self.x * self.x - self.y * self.y - self.z * self.z,
                2. * (self.x * self.y - self.w * self.z),
                2. * (self.x * self.z + self.w * self.y),
            ],
            [
                2. * (self.x * self.y + self.w * self.z),
                self.w * self.w - self.x * self.x + self.y * self.y - self.z * self.z,
                2. * (self.y * self.z - self.w * self.x),
            ],
            [
                2. * (self.x * self.z - self.w * self.y),
                2. * (self.y * self.z + self.w * self.x),
                self.w * self.w - self.x * self.x - self.y * self.y + self.z * self.z,
            ],
        ]
    }

    pub fn from_matrix(m: &[[f64; 3]; 3]) -> Self {
        let m22_p_m33 = m[1][1] + m[2][2];
        let m22_m_m33 = m[1][1] - m[2][2];
        let vals = [
            m[0][0] + m22_p_m33,
            m[0][0] - m22_p_m33,
            -m[0][0] + m22_m_m33,
            -m[0][0] - m22_m_m33,
        ];
        let (max_idx, max_num) =
            vals.iter()
                .enumerate()
                .fold((0, vals[0]), |(idx_max, val_max), (idx, val)| {
                    if &val_max > val {
                        (idx_max, val_max)
                    } else {
                        (idx, *val)
                    }
                });

        let half = 0.5;
        let tmp = (max_num + 1.).sqrt();
        let coef = half / tmp;

        match max_idx {
            0 => Self {
                w: half * tmp,
                x: (m[2][1] - m[1][2]) * coef,
                y: (m[0][2] - m[2][0]) * coef,
                z: (m[1][0] - m[0][1]) * coef,
            },
            1 => Self {
                w: (m[2][1] - m[1][2]) * coef,
                x: half * tmp,
                y: (m[0][1] + m[1][0]) * coef,
                z: (m[0][2] + m[2][0]) * coef,
            },
            2 => Self {
                w: (m[0][2] - m[2][0]) * coef,
                x: (m[0][1] + m[1][0]) * coef,
                y: half * tmp,
                z: (m[1][2] + m[2][1]) * coef,
            },
            _ => Self {
                w: (m[1][0] - m[0][1]) * coef,
                x: (m[0][2] + m[2][0]) * coef,
                y: (m[1][2] + m[2][1]) * coef,
                z: half * tmp,
            },
        }
    }

    /// Rotation of `angle` radians about the unit vector `axis`.
    pub fn from_axis_angle(angle: f64, axis: &[f64; 3]) -> Self {
        if angle.abs() < 1e-12 {
            Self::identity()
        } else {
            let (sin, cos) = (angle / 2.).sin_cos();
            Quaternion {
                w: cos,
                x: axis[0] * sin,
                y: axis[1] * sin,
                z: axis[2] * sin,
            }
        }
    }

    /// Rotation whose axis is the direction of `v` and whose angle is its length.
    pub fn from_rotation_vector(v: &[f64; 3]) -> Self {
        let angle = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        if angle < 1e-12 {
            Self::identity()
        } else {
            let (sin, cos) = (angle / 2.).sin_cos();
            let factor = sin / angle;
            Quaternion {
                w: cos,
                x: v[0] * factor,
                y: v[1] * factor,
                z: v[2] * factor,
            }
        }
    }

    pub fn rotate_vector(self, v: &[f64; 3]) -> [f64; 3] {
        [
            (self.w * self.w + self.x * self.x - self.y * self.y - self.z * self.z) * v[0]
                + 2. * (self.x * self.y - self.w * self.z) * v[1]
                + 2. * (self.x * self.z + self.w * self.y) * v[2],
            2. * (self.x * self.y + self.w * self.z) * v[0]
                + (self.w * self.w - self.x * self.x + self.y * self.y - self.z * self.z) * v[1]
                + 2. * (self.y * self.z - self.w * self.x) * v[2],
            2. * (self.x * self.z - self.w * self.y) * v[0]
                + 2. * (self.y * self.z + self.w * self.x) * v[1]
                + (self.w * self.w - self.x * self.x - self.y * self.y + self.z * self.z) * v[2],
        ]
    }

    /// Time derivative of the quaternion for a world-frame angular velocity.
    pub fn derivative(self, omega: &[f64; 3]) -> Quaternion {
        let w = Quaternion {
            w: 0.,
            x: omega[0],
            y: omega[1],
            z: omega[2],
        }
        .compose(&self);
        Quaternion {
            w: 0.5 * w.w,
            x: 0.5 * w.x,
            y: 0.5 * w.y,
            z: 0.5 * w.z,
        }
    }

    /// Advances the orientation by `dt` under angular velocity `omega` and
    /// renormalizes to remove drift.
    pub fn integrate(self, omega: &[f64; 3], dt: f64) -> Quaternion {
        let d = self.derivative(omega);
        Quaternion {
            w: self.w + d.w * dt,
            x: self.x + d.x * dt,
            y: self.y + d.y * dt,
            z: self.z + d.z * dt,
        }
        .normalize()
    }

    /// Orientation from spherical angles in degrees.
    ///
    /// * `azimuth` - rotation about world +Z (heading)
    /// * `elevation` - tilt of the body +X axis above the horizontal plane
    /// * `rotation` - rotation about the body +X axis (heel/roll)
    pub fn from_spherical(azimuth: f64, elevation: f64, rotation: f64) -> Self {
        let qz = Self::from_axis_angle(azimuth.to_radians(), &[0., 0., 1.]);
        let qy = Self::from_axis_angle(-elevation.to_radians(), &[0., 1., 0.]);
        let qx = Self::from_axis_angle(rotation.to_radians(), &[1., 0., 0.]);
        qz.compose(&qy).compose(&qx)
    }

    /// Spherical angles `[azimuth, elevation, rotation]` in degrees, inverse of
    /// [`Quaternion::from_spherical`]. Elevation is in `[-90, 90]`; at the poles
    /// the rotation is folded into the azimuth.
    pub fn as_spherical(self) -> [f64; 3] {
        let m = self.normalize().as_matrix();
        let cos_el = m[0][0].hypot(m[1][0]);
        if cos_el < 1e-9 {
            let azimuth = (-m[0][1]).atan2(m[1][1]);
            [azimuth.to_degrees(), 90_f64.copysign(m[2][0]), 0.]
        } else {
            let elevation = m[2][0].atan2(cos_el);
            let azimuth = m[1][0].atan2(m[0][0]);
            let rotation = m[2][1].atan2(m[2][2]);
            [
                azimuth.to_degrees(),
                elevation.to_degrees(),
                rotation.to_degrees(),
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::wrap_degrees;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn assert_same_rotation(q1: Quaternion, q2: Quaternion) {
        for v in [[1., 0., 0.], [0., 1., 0.], [0., 0., 1.]] {
            let a = q1.rotate_vector(&v);
            let b = q2.rotate_vector(&v);
            for i in 0..3 {
                assert_relative_eq!(a[i], b[i], epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_compose_matches_matrix_product() {
        let q1 = Quaternion::from_axis_angle(0.3, &[0., 0., 1.]);
        let q2 = Quaternion::from_axis_angle(-0.7, &[1., 0., 0.]);
        let q = q1.compose(&q2);
        let v = [0.2, -1.3, 0.8];
        let expected = q1.rotate_vector(&q2.rotate_vector(&v));
        let actual = q.rotate_vector(&v);
        for i in 0..3 {
            assert_relative_eq!(actual[i], expected[i], epsilon = 1e-14);
        }
    }

    #[test]
    fn test_matrix_round_trip() {
        let q = Quaternion::from_rotation_vector(&[0.4, -1.1, 2.3]);
        let q2 = Quaternion::from_matrix(&q.as_matrix());
        assert_same_rotation(q, q2);
        assert_eq!(Quaternion::from_vec(&q.as_vec()), q);
    }

    #[test]
    fn test_inverse() {
        let q = Quaternion::from_axis_angle(PI / 3., &[0., 1., 0.]);
        let v = [1., 2., 3.];
        let back = q.inverse().rotate_vector(&q.rotate_vector(&v));
        for i in 0..3 {
            assert_relative_eq!(back[i], v[i], epsilon = 1e-14);
        }

        // Non-unit quaternions invert to the identity as well
        let scaled = Quaternion::from_vec(&[3. * q.w, 3. * q.x, 3. * q.y, 3. * q.z]);
        let product = scaled.inverse().compose(&scaled).as_vec();
        let identity = Quaternion::identity().as_vec();
        for i in 0..4 {
            assert_relative_eq!(product[i], identity[i], epsilon = 1e-14);
        }
    }

    #[test]
    fn test_integrate_constant_rate() {
        // Spin about z at 1 rad/s for 1 s in small steps
        let mut q = Quaternion::identity();
        let n = 10000;
        for _ in 0..n {
            q = q.integrate(&[0., 0., 1.], 1. / n as f64);
        }
        let x = q.rotate_vector(&[1., 0., 0.]);
        assert_relative_eq!(x[0], 1f64.cos(), epsilon = 1e-4);
        assert_relative_eq!(x[1], 1f64.sin(), epsilon = 1e-4);
        assert_relative_eq!(q.norm(), 1., epsilon = 1e-12);
    }

    #[test]
    fn test_spherical_axes() {
        struct Case {
            angles: [f64; 3],
            x_axis: [f64; 3],
        }

        let cases = vec![
            Case {
                angles: [90., 0., 0.],
                x_axis: [0., 1., 0.],
            },
            Case {
                angles: [0., 90., 0.],
                x_axis: [0., 0., 1.],
            },
            Case {
                angles: [0., 0., 90.],
                x_axis: [1., 0., 0.],
            },
            Case {
                angles: [180., 45., 0.],
                x_axis: [-(0.5f64.sqrt()), 0., 0.5f64.sqrt()],
            },
        ];

        for case in cases {
            let q = Quaternion::from_spherical(case.angles[0], case.angles[1], case.angles[2]);
            let x = q.rotate_vector(&[1., 0., 0.]);
            for i in 0..3 {
                assert_relative_eq!(x[i], case.x_axis[i], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_spherical_round_trip() {
        let angles = (-12..=12).map(|i| i as f64 * 30.).collect::<Vec<_>>();
        for &azimuth in &angles {
            for &elevation in &angles {
                for &rotation in &angles {
                    let q = Quaternion::from_spherical(azimuth, elevation, rotation);
                    let [az, el, rot] = q.as_spherical();

                    // Orientation is always recovered
                    assert_same_rotation(q, Quaternion::from_spherical(az, el, rot));

                    // Angles are recovered modulo 360 away from and short of the poles
                    if elevation.to_radians().cos() > 1e-6 {
                        assert_relative_eq!(wrap_degrees(az - azimuth), 0., epsilon = 1e-8);
                        assert_relative_eq!(wrap_degrees(el - elevation), 0., epsilon = 1e-8);
                        assert_relative_eq!(wrap_degrees(rot - rotation), 0., epsilon = 1e-8);
                    }
                }
            }
        }
    }

    #[test]
    fn test_spherical_poles() {
        struct Case {
            angles: [f64; 3],
            elevation: f64,
        }

        let cases = vec![
            Case {
                angles: [-330., -270., 0.],
                elevation: 90.,
            },
            Case {
                angles: [45., 90., 30.],
                elevation: 90.,
            },
            Case {
                angles: [120., -90., -60.],
                elevation: -90.,
            },
            Case {
                angles: [0., 270., 15.],
                elevation: -90.,
            },
        ];

        for case in cases {
            let q = Quaternion::from_spherical(case.angles[0], case.angles[1], case.angles[2]);
            let [az, el, rot] = q.as_spherical();
            assert_eq!(el, case.elevation);
            assert_eq!(rot, 0.);
            assert_same_rotation(q, Quaternion::from_spherical(az, el, rot));
        }
    }
}
