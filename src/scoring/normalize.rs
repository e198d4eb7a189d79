use crate::rules::PerformanceScale;

impl PerformanceScale {
    /// Map a performance tally onto 0..100.
    ///
    /// Linear (`tally / max_tally * 100`) unless the scale carries a banded
    /// `levels` table. Tallies above `max_tally` saturate at 100.
    pub fn normalize(&self, tally: u32) -> f64 {
        if self.max_tally == 0 {
            return 0.0;
        }
        let tally = tally.min(self.max_tally);

        match &self.levels {
            Some(levels) => levels.get(tally as usize).copied().unwrap_or(100.0),
            None => 100.0 * f64::from(tally) / f64::from(self.max_tally),
        }
    }
}
