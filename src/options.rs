//! Simplification options and the limits they turn into.

use crate::{error::Result, Error};

/// How much to simplify, and whether to do it in place.
///
/// With neither `tolerance` nor `fraction` set, simplification is a no-op.
/// Options can be loaded from JSON (`{"tolerance": 1e-8, "mutate": false}`);
/// unknown keys are rejected.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct Options {
    /// Vertices whose effective area is below this are removed.
    pub tolerance: Option<f64>,
    /// At least this fraction of all positions is removed, regardless of area.
    pub fraction: Option<f64>,
    /// If true, the input is simplified in place. If false, it's left alone
    /// and a simplified copy is returned.
    pub mutate: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            tolerance: None,
            fraction: None,
            mutate: true,
        }
    }
}

impl Options {
    /// Sets the area tolerance.
    pub fn with_tolerance(self, tolerance: f64) -> Self {
        Options {
            tolerance: Some(tolerance),
            ..self
        }
    }

    /// Sets the fraction of positions to remove.
    pub fn with_fraction(self, fraction: f64) -> Self {
        Options {
            fraction: Some(fraction),
            ..self
        }
    }

    /// Sets whether to simplify in place.
    pub fn with_mutate(self, mutate: bool) -> Self {
        Options { mutate, ..self }
    }

    /// Checks that the options are in their domains.
    pub fn validate(&self) -> Result<()> {
        if let Some(tolerance) = self.tolerance {
            if !tolerance.is_finite() || tolerance <= 0.0 {
                return Err(Error::Tolerance(tolerance));
            }
        }
        if let Some(fraction) = self.fraction {
            if !fraction.is_finite() || fraction <= 0.0 {
                return Err(Error::Fraction(fraction));
            }
            if fraction > 1.0 {
                return Err(Error::FractionAboveOne(fraction));
            }
        }
        Ok(())
    }

    /// Is there anything to do?
    pub fn is_noop(&self) -> bool {
        self.tolerance.is_none() && self.fraction.is_none()
    }

    /// The stopping rule for a run over `positions` flat positions.
    pub(crate) fn limits(&self, positions: usize) -> Limits {
        Limits {
            tolerance: self.tolerance.unwrap_or(0.0),
            quota: self
                .fraction
                .map_or(0, |f| (f * positions as f64).ceil() as usize),
        }
    }
}

/// When the elimination loop stops.
///
/// The loop stops at the first candidate whose area is at least `tolerance`,
/// but only once `quota` deletions have been made.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Limits {
    pub tolerance: f64,
    pub quota: usize,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn defaults() {
        let opts = Options::default();
        assert!(opts.mutate);
        assert!(opts.is_noop());
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn bad_tolerance() {
        for t in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert_matches!(
                Options::default().with_tolerance(t).validate(),
                Err(Error::Tolerance(_))
            );
        }
        assert!(Options::default().with_tolerance(1e-12).validate().is_ok());
    }

    #[test]
    fn bad_fraction() {
        for f in [0.0, -0.5, f64::NAN, f64::NEG_INFINITY] {
            assert_matches!(
                Options::default().with_fraction(f).validate(),
                Err(Error::Fraction(_))
            );
        }
        assert_matches!(
            Options::default().with_fraction(1.0001).validate(),
            Err(Error::FractionAboveOne(x)) if x == 1.0001
        );
        assert_matches!(
            Options::default().with_fraction(f64::INFINITY).validate(),
            Err(Error::Fraction(_))
        );
        assert!(Options::default().with_fraction(1.0).validate().is_ok());
    }

    #[test]
    fn limits() {
        let opts = Options::default().with_fraction(0.75);
        assert_eq!(
            opts.limits(12),
            Limits {
                tolerance: 0.0,
                quota: 9
            }
        );
        assert_eq!(opts.limits(5).quota, 4);

        let opts = Options::default().with_tolerance(2.0);
        assert_eq!(
            opts.limits(12),
            Limits {
                tolerance: 2.0,
                quota: 0
            }
        );
    }

    #[test]
    fn from_json() {
        let opts: Options = serde_json::from_str(r#"{"tolerance": 1e-8, "mutate": false}"#).unwrap();
        assert_eq!(
            opts,
            Options {
                tolerance: Some(1e-8),
                fraction: None,
                mutate: false,
            }
        );
        assert!(serde_json::from_str::<Options>(r#"{"tolerence": 1}"#).is_err());
    }
}
