//! Least-squares polynomial fit used for continuation values
//!
//! Regressors are standardized before the normal equations are formed, so
//! the 3x3 system stays well conditioned whether prices sit near 1 or near
//! 10 000. The degree drops to `distinct points - 1` when there are too few
//! distinct regressors for a quadratic; with a single distinct point the fit
//! is the sample mean.

use nalgebra::{DMatrix, DVector};

/// Relative tolerance for treating two regressors as the same point.
const DISTINCT_TOL: f64 = 1e-9;

/// Fitted polynomial in standardized coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialFit {
    center: f64,
    scale: f64,
    /// Coefficients by ascending power
    coeffs: Vec<f64>,
}

impl PolynomialFit {
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let z = (x - self.center) / self.scale;
        self.coeffs.iter().rev().fold(0.0, |acc, c| acc * z + c)
    }
}

fn distinct_count(x: &[f64]) -> usize {
    let mut sorted = x.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mut count = 0;
    let mut last: Option<f64> = None;
    for &v in &sorted {
        match last {
            Some(prev) if (v - prev).abs() <= DISTINCT_TOL * prev.abs().max(1.0) => {}
            _ => {
                count += 1;
                last = Some(v);
            }
        }
    }
    count
}

/// Least-squares fit of `y` against `x` up to `max_degree`.
///
/// Returns `None` for empty or mismatched input, non-finite data, or when
/// the normal equations are not positive definite.
pub fn fit_polynomial(x: &[f64], y: &[f64], max_degree: usize) -> Option<PolynomialFit> {
    let n = x.len();
    if n == 0 || n != y.len() {
        return None;
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return None;
    }

    let nf = n as f64;
    let center = x.iter().sum::<f64>() / nf;
    let scale = (x.iter().map(|v| (v - center).powi(2)).sum::<f64>() / nf).sqrt();

    let degree = max_degree.min(distinct_count(x) - 1);
    if degree == 0 || scale <= 0.0 {
        return Some(PolynomialFit {
            center,
            scale: 1.0,
            coeffs: vec![y.iter().sum::<f64>() / nf],
        });
    }

    let terms = degree + 1;
    let mut xtx = DMatrix::<f64>::zeros(terms, terms);
    let mut xty = DVector::<f64>::zeros(terms);
    let mut powers = vec![0.0; 2 * degree + 1];

    for (&xi, &yi) in x.iter().zip(y) {
        let z = (xi - center) / scale;
        let mut p = 1.0;
        for slot in powers.iter_mut() {
            *slot = p;
            p *= z;
        }
        for r in 0..terms {
            xty[r] += powers[r] * yi;
            for c in 0..terms {
                xtx[(r, c)] += powers[r + c];
            }
        }
    }

    let beta = xtx.cholesky()?.solve(&xty);
    if beta.iter().any(|b| !b.is_finite()) {
        return None;
    }

    Some(PolynomialFit {
        center,
        scale,
        coeffs: beta.iter().copied().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_quadratic() {
        let x: Vec<f64> = (0..20).map(|i| 80.0 + i as f64 * 2.0).collect();
        let y: Vec<f64> = x.iter().map(|v| 3.0 - 0.5 * v + 0.01 * v * v).collect();

        let fit = fit_polynomial(&x, &y, 2).unwrap();
        assert_eq!(fit.degree(), 2);
        for (&xi, &yi) in x.iter().zip(&y) {
            assert!((fit.evaluate(xi) - yi).abs() < 1e-8);
        }
        // Off-sample evaluation follows the same polynomial
        assert!((fit.evaluate(150.0) - (3.0 - 75.0 + 225.0)).abs() < 1e-6);
    }

    #[test]
    fn test_large_price_level_stays_accurate() {
        let x: Vec<f64> = (0..50).map(|i| 10_000.0 + i as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().map(|v| (v - 10_010.0).powi(2)).collect();
        let fit = fit_polynomial(&x, &y, 2).unwrap();
        assert!((fit.evaluate(10_010.0)).abs() < 1e-6);
        assert!((fit.evaluate(10_020.0) - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_noisy_fit_is_least_squares() {
        // Symmetric residuals around a line leave the line unchanged
        let x = [1.0, 1.0, 2.0, 2.0, 3.0, 3.0];
        let y = [1.0, 3.0, 3.0, 5.0, 5.0, 7.0];
        let fit = fit_polynomial(&x, &y, 1).unwrap();
        assert!((fit.evaluate(1.0) - 2.0).abs() < 1e-10);
        assert!((fit.evaluate(3.0) - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_degree_reduction() {
        // All regressors identical: mean
        let fit = fit_polynomial(&[100.0, 100.0, 100.0], &[1.0, 2.0, 6.0], 2).unwrap();
        assert_eq!(fit.degree(), 0);
        assert!((fit.evaluate(100.0) - 3.0).abs() < 1e-12);

        // Two distinct points: the line through their means
        let fit = fit_polynomial(&[1.0, 1.0, 2.0], &[1.0, 3.0, 4.0], 2).unwrap();
        assert_eq!(fit.degree(), 1);
        assert!((fit.evaluate(1.0) - 2.0).abs() < 1e-10);
        assert!((fit.evaluate(2.0) - 4.0).abs() < 1e-10);

        // Single point
        let fit = fit_polynomial(&[5.0], &[7.0], 2).unwrap();
        assert_eq!(fit.degree(), 0);
        assert_eq!(fit.evaluate(5.0), 7.0);
    }

    #[test]
    fn test_invalid_input() {
        assert!(fit_polynomial(&[], &[], 2).is_none());
        assert!(fit_polynomial(&[1.0, 2.0], &[1.0], 2).is_none());
        assert!(fit_polynomial(&[1.0, f64::NAN, 3.0], &[1.0, 2.0, 3.0], 2).is_none());
    }

    #[test]
    fn test_overflowing_spread_has_no_fit() {
        let x = [2e154, 110.0, 120.0, 130.0];
        assert!(fit_polynomial(&x, &[0.0; 4], 2).is_none());
    }
}
