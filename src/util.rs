use faer::Mat;

//------------------------------------------------------------------------------
// 3D vectors
//------------------------------------------------------------------------------

// Returns the dot product of two vectors
#[inline]
pub fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

// Returns the L2-norm of a vector
#[inline]
pub fn norm(v: &[f64; 3]) -> f64 {
    dot(v, v).sqrt()
}

// Returns unit vector of given vector or None
pub fn unit_vector(v: &[f64; 3]) -> Option<[f64; 3]> {
    let m = norm(v);
    if m == 0. || !m.is_finite() {
        None
    } else {
        Some([v[0] / m, v[1] / m, v[2] / m])
    }
}

// Returns the cross product of two vectors
#[inline]
pub fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn add(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn sub(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn scale(v: &[f64; 3], s: f64) -> [f64; 3] {
    [v[0] * s, v[1] * s, v[2] * s]
}

/// Adds `v` to `acc` in place, component by component.
#[inline]
pub fn add_assign(acc: &mut [f64; 3], v: &[f64; 3]) {
    acc[0] += v[0];
    acc[1] += v[1];
    acc[2] += v[2];
}

//------------------------------------------------------------------------------
// 2D vectors
//------------------------------------------------------------------------------

#[inline]
pub fn dot2(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    a[0] * b[0] + a[1] * b[1]
}

#[inline]
pub fn norm2(v: &[f64; 2]) -> f64 {
    dot2(v, v).sqrt()
}

// Returns the vector rotated 90 degrees counter-clockwise
#[inline]
pub fn perp2(v: &[f64; 2]) -> [f64; 2] {
    [-v[1], v[0]]
}

// Returns unit vector of given 2D vector or None
pub fn unit_vector2(v: &[f64; 2]) -> Option<[f64; 2]> {
    let m = norm2(v);
    if m == 0. || !m.is_finite() {
        None
    } else {
        Some([v[0] / m, v[1] / m])
    }
}

//------------------------------------------------------------------------------
// Geometry
//------------------------------------------------------------------------------

/// Intersects the line `origin + t * direction` with the plane through
/// `plane_point` with normal `plane_normal`.
///
/// Returns the line parameter `t` and the intersection point, or `None` when
/// the line is parallel to the plane.
pub fn intersect_line_plane(
    origin: &[f64; 3],
    direction: &[f64; 3],
    plane_point: &[f64; 3],
    plane_normal: &[f64; 3],
) -> Option<(f64, [f64; 3])> {
    let denom = dot(direction, plane_normal);
    if denom.abs() < 1e-12 {
        return None;
    }
    let t = dot(&sub(plane_point, origin), plane_normal) / denom;
    Some((t, add(origin, &scale(direction, t))))
}

/// Wraps an angle in degrees to `(-180, 180]`.
pub fn wrap_degrees(angle: f64) -> f64 {
    let a = (angle + 180.).rem_euclid(360.) - 180.;
    if a == -180. {
        180.
    } else {
        a
    }
}

//------------------------------------------------------------------------------
// Matrices
//------------------------------------------------------------------------------

/// Builds a 4x4 homogeneous transform from a rotation matrix and a translation.
pub fn homogeneous_matrix(rotation: &[[f64; 3]; 3], translation: &[f64; 3]) -> Mat<f64> {
    Mat::from_fn(4, 4, |i, j| match (i, j) {
        (3, 3) => 1.,
        (3, _) => 0.,
        (_, 3) => translation[i],
        _ => rotation[i][j],
    })
}

/// Applies a 4x4 homogeneous transform to a point.
pub fn transform_point(m: &Mat<f64>, p: &[f64; 3]) -> [f64; 3] {
    let mut out = [0.; 3];
    for (i, o) in out.iter_mut().enumerate() {
        *o = m[(i, 0)] * p[0] + m[(i, 1)] * p[1] + m[(i, 2)] * p[2] + m[(i, 3)];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cross_and_unit_vector() {
        assert_eq!(cross(&[1., 0., 0.], &[0., 1., 0.]), [0., 0., 1.]);
        assert_eq!(cross(&[0., 0., 1.], &[1., 0., 0.]), [0., 1., 0.]);
        assert_eq!(unit_vector(&[0., 0., 0.]), None);
        let u = unit_vector(&[3., 0., 4.]).unwrap();
        assert_relative_eq!(u[0], 0.6, epsilon = 1e-15);
        assert_relative_eq!(u[2], 0.8, epsilon = 1e-15);
    }

    #[test]
    fn test_intersect_line_plane() {
        struct Case {
            origin: [f64; 3],
            direction: [f64; 3],
            expected: Option<(f64, [f64; 3])>,
        }

        let cases = vec![
            // Vertical line through the water plane
            Case {
                origin: [1., 2., 3.],
                direction: [0., 0., -1.],
                expected: Some((3., [1., 2., 0.])),
            },
            // Inclined line
            Case {
                origin: [0., 0., -1.],
                direction: [1., 0., 1.],
                expected: Some((1., [1., 0., 0.])),
            },
            // Parallel to the plane
            Case {
                origin: [0., 0., 1.],
                direction: [1., 1., 0.],
                expected: None,
            },
        ];

        for case in cases {
            let result = intersect_line_plane(&case.origin, &case.direction, &[0., 0., 0.], &[0., 0., 1.]);
            match (result, case.expected) {
                (None, None) => {}
                (Some((t, p)), Some((t_exp, p_exp))) => {
                    assert_relative_eq!(t, t_exp, epsilon = 1e-12);
                    for i in 0..3 {
                        assert_relative_eq!(p[i], p_exp[i], epsilon = 1e-12);
                    }
                }
                (r, e) => panic!("expected {:?}, got {:?}", e, r),
            }
        }
    }

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(0.), 0.);
        assert_eq!(wrap_degrees(190.), -170.);
        assert_eq!(wrap_degrees(-190.), 170.);
        assert_eq!(wrap_degrees(540.), 180.);
        assert_eq!(wrap_degrees(-180.), 180.);
    }

    #[test]
    fn test_homogeneous_matrix() {
        let r = [[0., -1., 0.], [1., 0., 0.], [0., 0., 1.]];
        let m = homogeneous_matrix(&r, &[1., 2., 3.]);
        assert_eq!(m[(3, 3)], 1.);
        assert_eq!(m[(3, 0)], 0.);
        let p = transform_point(&m, &[1., 0., 0.]);
        assert_relative_eq!(p[0], 1., epsilon = 1e-15);
        assert_relative_eq!(p[1], 3., epsilon = 1e-15);
        assert_relative_eq!(p[2], 3., epsilon = 1e-15);
    }
}
