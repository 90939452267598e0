//! 1-D piecewise-linear datum tables (component C1).
//!
//! A [`Datum`] maps a base field value to a scalar via linear interpolation
//! over an ordered sample set, with clamp-to-endpoint extrapolation outside
//! the sampled domain.

use crate::error::{DrapeError, DrapeResult};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// A named one-dimensional function of a base field, given as sample points.
///
/// Invariant: `x` is strictly increasing and there are at least two samples.
/// [`Datum::new`] is the only constructor and enforces both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datum {
    /// Name of the cell field this datum is evaluated against.
    pub base: String,
    /// Ordered `(x, y)` sample pairs.
    pub values: Vec<(f64, f64)>,
}

impl Datum {
    /// Validates and constructs a datum table.
    ///
    /// Rejects fewer than two samples or a non-strictly-increasing `x`
    /// sequence with [`DrapeError::InvalidDatum`].
    pub fn new(name: &str, base: String, values: Vec<(f64, f64)>) -> DrapeResult<Self> {
        if values.len() < 2 {
            return Err(DrapeError::InvalidDatum {
                name: name.to_string(),
                reason: format!("requires at least two samples, found {}", values.len()),
            });
        }
        for window in values.windows(2) {
            let (x0, _) = window[0];
            let (x1, _) = window[1];
            if !(x0 < x1) {
                return Err(DrapeError::InvalidDatum {
                    name: name.to_string(),
                    reason: format!(
                        "sample x-values must be strictly increasing, found {x0} then {x1}"
                    ),
                });
            }
        }
        Ok(Self { base, values })
    }

    /// Evaluates the datum at a single query point.
    ///
    /// Clamps to the first/last sample's `y` outside the sampled domain;
    /// otherwise linearly interpolates between the bracketing samples
    /// located via binary search over `x`.
    pub fn evaluate(&self, q: f64) -> f64 {
        let xs = &self.values;
        let (x_lo, y_lo) = xs[0];
        if q <= x_lo {
            return y_lo;
        }
        let (x_hi, y_hi) = xs[xs.len() - 1];
        if q >= x_hi {
            return y_hi;
        }

        // Binary search for the bracketing interval [xs[i], xs[i+1]).
        let idx = match xs.binary_search_by(|(x, _)| x.partial_cmp(&q).unwrap()) {
            Ok(i) => return xs[i].1,
            Err(i) => i - 1,
        };
        let (x0, y0) = xs[idx];
        let (x1, y1) = xs[idx + 1];
        let t = (q - x0) / (x1 - x0);
        y0 + t * (y1 - y0)
    }

    /// Vectorized evaluation over an array of queries.
    pub fn evaluate_array(&self, q: &Array1<f64>) -> Array1<f64> {
        q.mapv(|v| self.evaluate(v))
    }
}
