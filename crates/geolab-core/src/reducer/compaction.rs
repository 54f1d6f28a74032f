//! Compaction densities
//!
//! Dry density, first available source wins:
//! 1. entered wet density and water content: `ρw / (1 + w/100)`
//! 2. dry mass and volume: `md / V`
//! 3. wet mass, water content and volume: `(mh / (1 + w/100)) / V`
//!
//! Wet density comes from `mh / V`, else from the dry density: `ρd · (1 + w/100)`.
//! Entered readings are kept as typed. Derived readings are recomputed from the
//! raw fields on every call, so a stale derived value never feeds a derivation.

use super::{finite, moisture_factor, ratio, Reduce, TestParameters};
use crate::measurement::{CompactionPoint, Reading};

impl Reduce for CompactionPoint {
    fn reduce(&self, _preceding: &[Self], _parameters: &TestParameters) -> Self {
        let factor = moisture_factor(self.water_content);
        let entered_wet = self.wet_density.and_then(Reading::entered);

        let dry_density = match self.dry_density {
            Some(Reading::Entered(v)) => Some(Reading::Entered(v)),
            _ => derive_dry_density(self, entered_wet, factor).map(Reading::Derived),
        };

        let wet_density = match self.wet_density {
            Some(Reading::Entered(v)) => Some(Reading::Entered(v)),
            _ => ratio(self.wet_mass, self.volume)
                .or_else(|| {
                    let dry = finite(dry_density.map(Reading::value))?;
                    finite(Some(dry * factor?))
                })
                .map(Reading::Derived),
        };

        tracing::trace!(?dry_density, ?wet_density, "reduced compaction point");

        Self {
            wet_density,
            dry_density,
            ..self.clone()
        }
    }
}

fn derive_dry_density(
    point: &CompactionPoint,
    entered_wet: Option<f64>,
    factor: Option<f64>,
) -> Option<f64> {
    ratio(entered_wet, factor)
        .or_else(|| ratio(point.dry_mass, point.volume))
        .or_else(|| ratio(ratio(point.wet_mass, factor), point.volume))
}
