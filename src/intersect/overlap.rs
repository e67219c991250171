use crate::Error;

/// Classification of one precinct/district area ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Overlap {
    /// Precinct lies (essentially) entirely in the district.
    Full,
    /// Precinct is split; carries the fraction inside the district.
    Partial(f64),
    /// Sliver below the tolerance; no record is emitted.
    Negligible,
}

impl Overlap {
    /// Fraction to record, if any.
    #[inline]
    pub fn fraction(&self) -> Option<f64> {
        match self {
            Overlap::Full => Some(1.0),
            Overlap::Partial(r) => Some(*r),
            Overlap::Negligible => None,
        }
    }
}

/// Overlap tolerance ε: ratios at or below ε are dropped, ratios above 1 − ε snap to 1.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Tolerance(f64);

impl Tolerance {
    pub const DEFAULT: Tolerance = Tolerance(0.001);

    /// Tolerance must lie strictly between 0 and 0.5.
    pub fn new(epsilon: f64) -> Result<Self, Error> {
        if epsilon > 0.0 && epsilon < 0.5 {
            Ok(Self(epsilon))
        } else {
            Err(Error::InvalidTolerance(epsilon))
        }
    }

    #[inline] pub const fn epsilon(&self) -> f64 { self.0 }

    /// Classify an intersection-area / precinct-area ratio.
    pub fn classify(&self, ratio: f64) -> Overlap {
        if ratio > 1.0 - self.0 {
            Overlap::Full
        } else if ratio > self.0 {
            Overlap::Partial(ratio)
        } else {
            Overlap::Negligible
        }
    }
}

impl Default for Tolerance {
    fn default() -> Self { Self::DEFAULT }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_boundaries() {
        let tol = Tolerance::DEFAULT;
        assert_eq!(tol.classify(0.9995), Overlap::Full);
        assert_eq!(tol.classify(1.0000001), Overlap::Full);
        assert_eq!(tol.classify(0.998), Overlap::Partial(0.998));
        assert_eq!(tol.classify(0.5), Overlap::Partial(0.5));
        assert_eq!(tol.classify(0.001), Overlap::Negligible);
        assert_eq!(tol.classify(0.0), Overlap::Negligible);
    }

    #[test]
    fn tolerance_range() {
        assert!(Tolerance::new(0.01).is_ok());
        assert!(matches!(Tolerance::new(0.5), Err(Error::InvalidTolerance(_))));
        assert!(Tolerance::new(-0.1).is_err());
        assert!(Tolerance::new(f64::NAN).is_err());
    }

    #[test]
    fn fractions() {
        assert_eq!(Overlap::Full.fraction(), Some(1.0));
        assert_eq!(Overlap::Partial(0.25).fraction(), Some(0.25));
        assert_eq!(Overlap::Negligible.fraction(), None);
    }
}
