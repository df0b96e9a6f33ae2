// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! B-spline basis evaluation shared by NURBS curves and surfaces.

use smallvec::{smallvec, SmallVec};

use crate::error::{Error, Result};

/// Basis values for one knot span. Degrees above 7 spill to the heap.
pub(crate) type Basis = SmallVec<[f64; 8]>;

const KNOT_EPSILON: f64 = 1e-12;

/// Checks that `knots` is a clamped-compatible vector for `count` control
/// points of `degree`.
pub(crate) fn validate_knots(count: usize, degree: usize, knots: &[f64]) -> Result<()> {
    if degree == 0 {
        return Err(Error::InvalidNurbs("degree must be at least 1".into()));
    }
    if count < degree + 1 {
        return Err(Error::InvalidNurbs(format!(
            "{count} control points are not enough for degree {degree}"
        )));
    }
    if knots.len() != count + degree + 1 {
        return Err(Error::InvalidNurbs(format!(
            "expected {} knots for {count} control points of degree {degree}, got {}",
            count + degree + 1,
            knots.len()
        )));
    }
    if knots.windows(2).any(|w| w[1] < w[0] || !w[0].is_finite()) {
        return Err(Error::InvalidNurbs("knot vector is not non-decreasing".into()));
    }
    if knots[count] - knots[degree] <= KNOT_EPSILON {
        return Err(Error::InvalidNurbs("knot vector has an empty domain".into()));
    }
    Ok(())
}

/// Checks a weight list against `count` control points.
pub(crate) fn validate_weights(count: usize, weights: &[f64]) -> Result<()> {
    if weights.len() != count {
        return Err(Error::InvalidNurbs(format!(
            "expected {count} weights, got {}",
            weights.len()
        )));
    }
    if weights.iter().any(|w| !(*w > 0.0) || !w.is_finite()) {
        return Err(Error::InvalidNurbs("weights must be positive".into()));
    }
    Ok(())
}

/// A clamped knot vector with uniformly spaced interior knots on `[0, 1]`.
pub(crate) fn clamped_uniform_knots(count: usize, degree: usize) -> Vec<f64> {
    let spans = count - degree;
    let mut knots = Vec::with_capacity(count + degree + 1);
    knots.extend(std::iter::repeat(0.0).take(degree + 1));
    for i in 1..spans {
        knots.push(i as f64 / spans as f64);
    }
    knots.extend(std::iter::repeat(1.0).take(degree + 1));
    knots
}

/// Index of the knot span containing `u`.
///
/// `count` is the number of control points. Parameters at or past the end
/// of the domain map to the last non-empty span.
pub(crate) fn find_span(count: usize, degree: usize, u: f64, knots: &[f64]) -> usize {
    let n = count - 1;
    if u >= knots[n + 1] {
        return n;
    }
    if u <= knots[degree] {
        return degree;
    }
    let mut low = degree;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;
    while u < knots[mid] || u >= knots[mid + 1] {
        if u < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

/// Non-zero basis functions `N[span-degree..=span]` at `u`.
pub(crate) fn basis_functions(span: usize, u: f64, degree: usize, knots: &[f64]) -> Basis {
    let mut n: Basis = smallvec![0.0; degree + 1];
    let mut left: Basis = smallvec![0.0; degree + 1];
    let mut right: Basis = smallvec![0.0; degree + 1];
    n[0] = 1.0;
    for j in 1..=degree {
        left[j] = u - knots[span + 1 - j];
        right[j] = knots[span + j] - u;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            let temp = if denom.abs() < KNOT_EPSILON { 0.0 } else { n[r] / denom };
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_partition_of_unity() {
        let knots = [0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0];
        for u in [0.0, 0.2, 0.5, 0.77, 1.0] {
            let span = find_span(4, 2, u, &knots);
            let sum: f64 = basis_functions(span, u, 2, &knots).iter().sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_find_span_at_domain_end() {
        let knots = [0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0];
        assert_eq!(find_span(4, 2, 1.0, &knots), 3);
        assert_eq!(find_span(4, 2, 0.0, &knots), 2);
        assert_eq!(find_span(4, 2, 0.5, &knots), 3);
    }

    #[test]
    fn test_clamped_uniform_knots() {
        assert_eq!(
            clamped_uniform_knots(5, 2),
            vec![0.0, 0.0, 0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0, 1.0, 1.0]
        );
        assert!(validate_knots(5, 2, &clamped_uniform_knots(5, 2)).is_ok());
    }

    #[test]
    fn test_validate_knots_rejects_wrong_length() {
        assert!(validate_knots(4, 3, &[0.0, 0.0, 1.0, 1.0]).is_err());
        assert!(validate_knots(2, 3, &[0.0; 6]).is_err());
    }
}
