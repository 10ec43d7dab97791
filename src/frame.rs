use faer::Mat;

use crate::{
    quaternion::Quaternion,
    util::{add, homogeneous_matrix, sub},
};

/// Position and orientation defining a local-to-world transform.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CoordinateFrame {
    pub position: [f64; 3],
    pub orientation: Quaternion,
}

impl CoordinateFrame {
    /// Frame at `position`; `orientation` is normalized.
    pub fn new(position: [f64; 3], orientation: Quaternion) -> Self {
        Self {
            position,
            orientation: orientation.normalize(),
        }
    }

    pub fn identity() -> Self {
        Self::default()
    }

    /// Maps a point from local to world coordinates
    pub fn local_to_world_point(&self, p: &[f64; 3]) -> [f64; 3] {
        add(&self.position, &self.orientation.rotate_vector(p))
    }

    /// Maps a direction from local to world coordinates
    pub fn local_to_world_vector(&self, v: &[f64; 3]) -> [f64; 3] {
        self.orientation.rotate_vector(v)
    }

    /// Maps a point from world to local coordinates
    pub fn world_to_local_point(&self, p: &[f64; 3]) -> [f64; 3] {
        self.orientation
            .inverse()
            .rotate_vector(&sub(p, &self.position))
    }

    /// Maps a direction from world to local coordinates
    pub fn world_to_local_vector(&self, v: &[f64; 3]) -> [f64; 3] {
        self.orientation.inverse().rotate_vector(v)
    }

    /// Returns the world frame of `child`, whose pose is given in this frame.
    pub fn compose(&self, child: &CoordinateFrame) -> CoordinateFrame {
        CoordinateFrame {
            position: self.local_to_world_point(&child.position),
            orientation: self.orientation.compose(&child.orientation).normalize(),
        }
    }

    /// 4x4 homogeneous local-to-world matrix
    pub fn as_matrix(&self) -> Mat<f64> {
        homogeneous_matrix(&self.orientation.as_matrix(), &self.position)
    }

    /// Spherical angles `[azimuth, elevation, rotation]` of the frame in degrees
    pub fn spherical_angles(&self) -> [f64; 3] {
        self.orientation.as_spherical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::transform_point;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_round_trip() {
        let frame = CoordinateFrame::new(
            [10., -2., 0.5],
            Quaternion::from_spherical(35., 5., -12.),
        );
        let p = [1.5, 0.3, -0.8];
        let w = frame.local_to_world_point(&p);
        let back = frame.world_to_local_point(&w);
        for i in 0..3 {
            assert_relative_eq!(back[i], p[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_matrix_matches_transform() {
        let frame = CoordinateFrame::new(
            [1., 2., 3.],
            Quaternion::from_spherical(-70., 20., 45.),
        );
        let m = frame.as_matrix();
        let p = [0.4, -0.2, 1.1];
        let a = transform_point(&m, &p);
        let b = frame.local_to_world_point(&p);
        for i in 0..3 {
            assert_relative_eq!(a[i], b[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_compose() {
        // Body yawed 90 degrees, child 1 m ahead of body origin
        let body = CoordinateFrame::new([5., 0., 0.], Quaternion::from_spherical(90., 0., 0.));
        let child = CoordinateFrame::new([1., 0., 0.], Quaternion::identity());
        let world = body.compose(&child);
        assert_relative_eq!(world.position[0], 5., epsilon = 1e-12);
        assert_relative_eq!(world.position[1], 1., epsilon = 1e-12);
        let x = world.local_to_world_vector(&[1., 0., 0.]);
        assert_relative_eq!(x[1], 1., epsilon = 1e-12);
    }

    #[test]
    fn test_non_unit_orientation_is_normalized() {
        // Quarter turn about +Z stored with norm 2
        let q = Quaternion::from_spherical(90., 0., 0.).as_vec();
        let frame = CoordinateFrame::new(
            [1., 0., 0.],
            Quaternion::from_vec(&[2. * q[0], 2. * q[1], 2. * q[2], 2. * q[3]]),
        );
        assert_relative_eq!(frame.orientation.norm(), 1., epsilon = 1e-15);

        let x = frame.local_to_world_vector(&[1., 0., 0.]);
        assert_relative_eq!(x[0], 0., epsilon = 1e-12);
        assert_relative_eq!(x[1], 1., epsilon = 1e-12);

        let p = [0.5, -2., 0.25];
        let back = frame.world_to_local_point(&frame.local_to_world_point(&p));
        for i in 0..3 {
            assert_relative_eq!(back[i], p[i], epsilon = 1e-12);
        }
    }
}
