use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// One of the four difficulty axes a generated seed is scored on.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Length,
    Execution,
    Familiarity,
    Variance,
}

impl Axis {
    pub const ALL: [Axis; 4] = [
        Axis::Length,
        Axis::Execution,
        Axis::Familiarity,
        Axis::Variance,
    ];
}

/// Running four-axis score. Also used for the contribution of a single
/// option, which is why every field defaults to zero when deserialising.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Score {
    pub length: f64,
    pub execution: f64,
    pub familiarity: f64,
    pub variance: f64,
}

impl Score {
    pub const ZERO: Score = Score {
        length: 0.0,
        execution: 0.0,
        familiarity: 0.0,
        variance: 0.0,
    };

    pub fn new(length: f64, execution: f64, familiarity: f64, variance: f64) -> Self {
        Self {
            length,
            execution,
            familiarity,
            variance,
        }
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Length => self.length,
            Axis::Execution => self.execution,
            Axis::Familiarity => self.familiarity,
            Axis::Variance => self.variance,
        }
    }

    pub fn set(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::Length => self.length = value,
            Axis::Execution => self.execution = value,
            Axis::Familiarity => self.familiarity = value,
            Axis::Variance => self.variance = value,
        }
    }
}

impl Add for Score {
    type Output = Score;

    fn add(self, rhs: Score) -> Score {
        Score {
            length: self.length + rhs.length,
            execution: self.execution + rhs.execution,
            familiarity: self.familiarity + rhs.familiarity,
            variance: self.variance + rhs.variance,
        }
    }
}

impl AddAssign for Score {
    fn add_assign(&mut self, rhs: Score) {
        *self = *self + rhs;
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "length {}, execution {}, familiarity {}, variance {}",
            self.length, self.execution, self.familiarity, self.variance
        )
    }
}

/// Inclusive acceptance range for one axis.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Acceptance window over all four axes.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub length: AxisRange,
    pub execution: AxisRange,
    pub familiarity: AxisRange,
    pub variance: AxisRange,
}

impl Bounds {
    /// Same `[min, max]` on every axis.
    pub fn uniform(min: f64, max: f64) -> Self {
        let range = AxisRange::new(min, max);
        Self {
            length: range,
            execution: range,
            familiarity: range,
            variance: range,
        }
    }

    pub fn range(&self, axis: Axis) -> AxisRange {
        match axis {
            Axis::Length => self.length,
            Axis::Execution => self.execution,
            Axis::Familiarity => self.familiarity,
            Axis::Variance => self.variance,
        }
    }

    pub fn range_mut(&mut self, axis: Axis) -> &mut AxisRange {
        match axis {
            Axis::Length => &mut self.length,
            Axis::Execution => &mut self.execution,
            Axis::Familiarity => &mut self.familiarity,
            Axis::Variance => &mut self.variance,
        }
    }

    fn axes(&self) -> impl Iterator<Item = (Axis, AxisRange)> + '_ {
        Axis::ALL.into_iter().map(move |axis| (axis, self.range(axis)))
    }

    pub fn within_limits(&self, score: &Score) -> bool {
        self.axes()
            .all(|(axis, range)| range.contains(score.get(axis)))
    }

    /// Whether `score + delta` would be within limits. `score` is untouched.
    pub fn item_within_limits(&self, score: &Score, delta: &Score) -> bool {
        self.axes()
            .all(|(axis, range)| range.contains(score.get(axis) + delta.get(axis)))
    }

    /// Whether adding `delta` moves the out-of-range axes toward the window
    /// without knocking any in-range axis out of it.
    ///
    /// Axes below their minimum count `+delta`, axes above their maximum
    /// count `-delta`. An in-range axis that `delta` would push outside its
    /// range vetoes the whole item regardless of the other axes.
    pub fn better_than_current(&self, score: &Score, delta: &Score) -> bool {
        let mut gain = 0.0;
        for (axis, range) in self.axes() {
            let current = score.get(axis);
            let step = delta.get(axis);
            if current < range.min {
                gain += step;
            } else if current > range.max {
                gain -= step;
            } else if !range.contains(current + step) {
                return false;
            }
        }
        gain > 0.0
    }
}
