quantity!(KilowattHours, f64, "kWh");

impl KilowattHours {
    #[must_use]
    pub fn clamp_to_zero(self) -> Self {
        self.max(Self::zero())
    }
}
