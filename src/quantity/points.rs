use crate::quantity::energy::KilowattHours;

quantity!(Points, i64, "pts");

impl Points {
    /// Half-hourly rewards are paid in multiples of this.
    pub const INCREMENT: i64 = 8;

    pub const PER_POUND: i64 = 800;

    /// Round the raw points to the nearest [`Points::INCREMENT`].
    ///
    /// Ties go to the even multiple: `2.5 × 8` becomes `16`, and `3.5 × 8` becomes `32`.
    #[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn quantize(raw: f64) -> Self {
        let increment = Self::INCREMENT as f64;
        Self((raw / increment).round_ties_even() as i64 * Self::INCREMENT)
    }
}

quantity!(PointsPerKilowattHour, i64, "pts/kWh");

impl PointsPerKilowattHour {
    /// Reward for the energy saved within a single half-hour.
    #[expect(clippy::cast_precision_loss)]
    pub fn reward(self, saved: KilowattHours) -> Points {
        Points::quantize(saved.0 * self.0 as f64)
    }
}
