use crate::quantity::points::Points;

quantity!(Pounds, f64, "GBP");

impl From<Points> for Pounds {
    /// Convert the points at the fixed rate of [`Points::PER_POUND`].
    fn from(points: Points) -> Self {
        #[expect(clippy::cast_precision_loss)]
        Self(points.0 as f64 / Points::PER_POUND as f64)
    }
}
