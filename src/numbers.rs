//! Floating point type wrapper, which may be changed to `f32` when the feature "f32" is active.

#[cfg(feature = "f32")]
/// The single-precision floating point type.
pub type Float = f32;
#[cfg(not(feature = "f32"))]
/// The double-precision floating point type.
pub type Float = f64;

/// The magnitude at which `clamp` saturates.
pub const THRESHOLD: Float = 15.0;

/// Stabilizes denominators which may reach zero.
pub const EPSILON: Float = 1e-8;

/// Replaces `NaN` with zero, and saturates values beyond `THRESHOLD` to `THRESHOLD` with the same sign.
pub fn clamp(x: Float) -> Float {
    if x.is_nan() {
        0.0
    } else if x > THRESHOLD {
        THRESHOLD
    } else if x < -THRESHOLD {
        -THRESHOLD
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(Float::NAN), 0.0);
        assert_eq!(clamp(100.0), 15.0);
        assert_eq!(clamp(-100.0), -15.0);
        assert_eq!(clamp(5.0), 5.0);
        assert_eq!(clamp(-15.0), -15.0);
    }

    #[test]
    fn test_clamp_infinite() {
        assert_eq!(clamp(Float::INFINITY), THRESHOLD);
        assert_eq!(clamp(Float::NEG_INFINITY), -THRESHOLD);
    }
}
