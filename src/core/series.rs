use std::{
    iter::Sum,
    ops::{Add, Div},
};

use itertools::Itertools;

use crate::core::calendar::DayKind;

impl<T> Aggregate for T where T: ?Sized {}

pub trait Aggregate {
    #[must_use]
    fn mean<V>(self) -> Option<V>
    where
        Self: Sized + IntoIterator<Item = V>,
        V: Copy + Sum + Div<f64, Output = V>,
    {
        let values = self.into_iter().collect_vec();
        if values.is_empty() {
            None
        } else {
            #[expect(clippy::cast_precision_loss)]
            let n = values.len() as f64;
            Some(values.into_iter().sum::<V>() / n)
        }
    }

    #[must_use]
    fn median<V>(self) -> Option<V>
    where
        Self: Sized + IntoIterator<Item = V>,
        V: Copy + Add<Output = V> + Div<f64, Output = V> + Ord,
    {
        let mut values = self.into_iter().collect_vec();
        let n_values = values.len();
        if n_values == 0 {
            return None;
        }
        let (lower, upper, _) = values.select_nth_unstable(n_values / 2);
        let upper = *upper;
        if n_values % 2 == 1 {
            Some(upper)
        } else {
            // The lower half is not sorted, its maximum is the other middle value:
            lower.iter().max().map(|lower| (*lower + upper) / 2.0)
        }
    }
}

/// Statistic which reduces the baseline days into a single curve.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Statistic {
    Mean,

    /// Taken independently for every half-hour, so with 4 days it is the mean of
    /// the two middle values of that half-hour rather than of two whole days.
    Median,
}

impl From<DayKind> for Statistic {
    fn from(day_kind: DayKind) -> Self {
        match day_kind {
            DayKind::Weekday => Self::Mean,
            DayKind::Weekend => Self::Median,
        }
    }
}

impl Statistic {
    /// Reduce the `rows × columns` matrix into a single row, column by column.
    ///
    /// Returns `None` for an empty matrix.
    pub fn reduce<V>(self, rows: &[Vec<V>]) -> Option<Vec<V>>
    where
        V: Copy + Sum + Add<Output = V> + Div<f64, Output = V> + Ord,
    {
        let n_columns = rows.iter().map(Vec::len).min()?;
        (0..n_columns)
            .map(|column| {
                let values = rows.iter().map(|row| row[column]);
                match self {
                    Self::Mean => values.mean(),
                    Self::Median => values.median(),
                }
            })
            .collect()
    }
}
