//! Sampled time→distance curves.
//!
//! A [`DistanceCurve`] records how far a root-motion clip has travelled at a
//! series of sample times. It is evaluated in both directions: distance at a
//! time, and (for distance matching) the time at which a distance is reached.
//! Lookups outside the sampled range clamp to the first/last sample.

use serde::{Deserialize, Serialize};

/// Validation failures for [`DistanceCurve`] samples.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    #[error("distance curve has no samples")]
    Empty,

    #[error("distance curve has {times} time samples but {distances} distance samples")]
    LengthMismatch { times: usize, distances: usize },

    #[error("time samples must be finite and strictly increasing (sample {0})")]
    TimesNotIncreasing(usize),

    #[error("distance samples must be finite and non-decreasing (sample {0})")]
    DistancesDecreasing(usize),
}

/// Serialised form of a curve; validated on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CurveSamples {
    times: Vec<f32>,
    distances: Vec<f32>,
}

/// A monotonic time→distance sample curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CurveSamples", into = "CurveSamples")]
pub struct DistanceCurve {
    times: Vec<f32>,
    distances: Vec<f32>,
}

impl DistanceCurve {
    /// Build a curve from parallel sample arrays.
    pub fn new(times: Vec<f32>, distances: Vec<f32>) -> Result<Self, CurveError> {
        if times.is_empty() {
            return Err(CurveError::Empty);
        }
        if times.len() != distances.len() {
            return Err(CurveError::LengthMismatch {
                times: times.len(),
                distances: distances.len(),
            });
        }
        if let Some(i) = (0..times.len())
            .find(|&i| !times[i].is_finite() || (i > 0 && times[i] <= times[i - 1]))
        {
            return Err(CurveError::TimesNotIncreasing(i));
        }
        if let Some(i) = (0..distances.len())
            .find(|&i| !distances[i].is_finite() || (i > 0 && distances[i] < distances[i - 1]))
        {
            return Err(CurveError::DistancesDecreasing(i));
        }
        Ok(Self { times, distances })
    }

    /// A two-sample curve covering `distance` uniformly over `duration`.
    pub fn linear(duration: f32, distance: f32) -> Result<Self, CurveError> {
        Self::new(vec![0.0, duration], vec![0.0, distance])
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always `false`; curves are validated non-empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Time of the first sample.
    #[must_use]
    pub fn start_time(&self) -> f32 {
        self.times[0]
    }

    /// Time of the last sample.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times[self.times.len() - 1]
    }

    /// Distance at the first sample.
    #[must_use]
    pub fn start_distance(&self) -> f32 {
        self.distances[0]
    }

    /// Distance covered between the first and last sample.
    #[must_use]
    pub fn total_distance(&self) -> f32 {
        self.distances[self.distances.len() - 1] - self.distances[0]
    }

    /// Distance travelled at `time`, linearly interpolated and clamped.
    #[must_use]
    pub fn distance_at(&self, time: f32) -> f32 {
        interpolate(&self.times, &self.distances, time)
    }

    /// Earliest time at which `distance` is reached, linearly interpolated and
    /// clamped to the curve bounds.
    #[must_use]
    pub fn time_at(&self, distance: f32) -> f32 {
        interpolate(&self.distances, &self.times, distance)
    }

    /// Iterate `(time, distance)` samples.
    pub fn samples(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.times.iter().copied().zip(self.distances.iter().copied())
    }
}

/// Piecewise-linear lookup of `x` in ascending `xs`, returning the matching
/// value in `ys`. Flat runs in `xs` resolve to their first sample.
fn interpolate(xs: &[f32], ys: &[f32], x: f32) -> f32 {
    let first = xs[0];
    let last = xs[xs.len() - 1];
    if x.is_nan() || x <= first {
        return ys[0];
    }
    if x >= last {
        let i = xs.partition_point(|&v| v < last);
        return ys[i];
    }

    // xs[hi - 1] < x <= xs[hi]
    let hi = xs.partition_point(|&v| v < x);
    let lo = hi - 1;
    let t = (x - xs[lo]) / (xs[hi] - xs[lo]);
    ys[lo] + t * (ys[hi] - ys[lo])
}

impl TryFrom<CurveSamples> for DistanceCurve {
    type Error = CurveError;

    fn try_from(samples: CurveSamples) -> Result<Self, Self::Error> {
        Self::new(samples.times, samples.distances)
    }
}

impl From<DistanceCurve> for CurveSamples {
    fn from(curve: DistanceCurve) -> Self {
        Self {
            times: curve.times,
            distances: curve.distances,
        }
    }
}
