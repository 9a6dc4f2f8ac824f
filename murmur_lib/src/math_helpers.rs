use glam::Vec2;

// because of nannou I have to keep glam version at .17
// as glam is not stable yet, there are breaking changes
// in between decimal versions, so the steering helpers live here
// rather than relying on whatever the newer Vec2 api provides
pub trait Steering {
    /// Unit vector in the same direction, the zero vector stays zero
    fn normalized(self) -> Self;
    /// Clamps the magnitude to `max`, preserving direction
    fn limit(self, max: f32) -> Self;
    /// Rescales to magnitude `mag`, the zero vector stays zero
    fn with_magnitude(self, mag: f32) -> Self;
    /// Averages an accumulated sum, a zero count leaves it untouched
    fn div_count(self, count: usize) -> Self;
}

impl Steering for Vec2 {
    #[inline]
    fn normalized(self) -> Self {
        let length = self.length();
        if length > 0. {
            self / length
        } else {
            Vec2::ZERO
        }
    }

    #[inline]
    fn limit(self, max: f32) -> Self {
        let length_sq = self.length_squared();
        if length_sq > max * max {
            self.normalized() * max
        } else {
            self
        }
    }

    #[inline]
    fn with_magnitude(self, mag: f32) -> Self {
        self.normalized() * mag
    }

    #[inline]
    fn div_count(self, count: usize) -> Self {
        if count == 0 {
            self
        } else {
            self / count as f32
        }
    }
}

/// Unit vector pointing at `theta` radians
#[inline]
pub fn from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Linear re-mapping of `value` from one range onto another, unclamped
#[inline]
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    out_min + (value - in_min) / (in_max - in_min) * (out_max - out_min)
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use approx::assert_relative_eq;
    use glam::Vec2;
    use rstest::rstest;

    use super::{from_angle, map_range, Steering};

    macro_rules! assert_eqf32 {
        ($x:expr, $y:expr) => {
            assert_relative_eq!($x, $y, epsilon = 1e-4_f32)
        };
    }

    #[test]
    fn normalize_zero_is_zero() {
        assert_eq!(Vec2::ZERO.normalized(), Vec2::ZERO);
        assert_eq!(Vec2::ZERO.with_magnitude(5.), Vec2::ZERO);
        assert_eq!(Vec2::ZERO.limit(0.), Vec2::ZERO);
    }

    #[rstest]
    #[case(Vec2::new(3., 4.), 1.)]
    #[case(Vec2::new(-300., 0.5), 0.04)]
    #[case(Vec2::new(1e6, -1e6), 6.)]
    #[case(Vec2::new(0.01, 0.02), 3.)]
    fn limit_caps_magnitude(#[case] force: Vec2, #[case] max: f32) {
        let limited = force.limit(max);
        assert!(limited.length() <= max + 1e-4);
        // direction is preserved
        assert_eqf32!(limited.normalized().dot(force.normalized()), 1.);
    }

    #[test]
    fn limit_leaves_short_vectors_alone() {
        let v = Vec2::new(0.3, -0.1);
        assert_eq!(v.limit(1.), v);
    }

    #[test]
    fn with_magnitude_rescales() {
        let v = Vec2::new(0., -2.).with_magnitude(0.05);
        assert_eqf32!(v.x, 0.);
        assert_eqf32!(v.y, -0.05);
    }

    #[test]
    fn div_count_zero_is_noop() {
        let v = Vec2::new(6., 9.);
        assert_eq!(v.div_count(0), v);
        assert_eq!(v.div_count(3), Vec2::new(2., 3.));
    }

    #[test]
    fn angles() {
        let right = from_angle(0.);
        assert_eqf32!(right.x, 1.);
        let down = from_angle(FRAC_PI_2);
        assert_eqf32!(down.y, 1.);
        assert_eqf32!(from_angle(PI).x, -1.);
    }

    #[test]
    fn map_range_is_unclamped() {
        assert_eqf32!(map_range(0., -1., 1., -0.01, 0.01), 0.);
        assert_eqf32!(map_range(3., -1., 1., -0.01, 0.01), 0.03);
    }
}
