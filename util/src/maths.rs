//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
///
/// The interpolation is linear and exact at the range endpoints. The source
/// range must not be degenerate (`source_range.0 != source_range.1`); callers
/// are responsible for guaranteeing this.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    target_range.0
        + ((value - source_range.0) * (target_range.1 - target_range.0)
            / (source_range.1 - source_range.0))
}

/// Clamp a value between a minimum and a maximum.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float,
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map_endpoints() {
        // Endpoints must map exactly, not approximately
        assert_eq!(lin_map((-0.3491, 0.0), (0.0, 5.00001), -0.3491), 0.0);
        assert_eq!(lin_map((-0.3491, 0.0), (0.0, 5.00001), 0.0), 5.00001);
    }

    #[test]
    fn test_lin_map_midpoint() {
        // Half way between the source bounds lands half way up the target
        // range
        let mapped = lin_map((-0.3491, 0.0), (0.0, 5.00001), -0.17455);
        assert!((mapped - 2.500005).abs() < 1e-6);
    }

    #[test]
    fn test_lin_map_inverted_target() {
        // Target ranges may run backwards
        assert_eq!(lin_map((0.0, 1.0), (10.0, 0.0), 0.0), 10.0);
        assert_eq!(lin_map((0.0, 1.0), (10.0, 0.0), 1.0), 0.0);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&1.5f64, &0.0, &1.0), 1.0);
        assert_eq!(clamp(&-0.5f64, &0.0, &1.0), 0.0);
        assert_eq!(clamp(&0.5f64, &0.0, &1.0), 0.5);
    }
}
