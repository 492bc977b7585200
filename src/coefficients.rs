use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::error::{validate_window, DenoiseError, Result};

/// Pivots smaller than this mark the system as singular.
const PIVOT_EPSILON: f64 = 1e-12;

/// Computes Savitzky-Golay smoothing coefficients by least-squares polynomial fitting.
///
/// The normal-equation matrix has entry `(p, q) = Σ k^(p+q)` over the integer
/// offsets `k` in `-half..=half`. Solving it against the unit vector `e_0`
/// selects the constant term of the fitted polynomial, i.e. its value at the
/// window centre. Evaluating the solved basis at each offset gives the taps.
///
/// # Arguments
///
/// * `window_size` - Size of the moving window (must be odd)
/// * `poly_order` - Degree of the polynomial to fit (must be < window_size)
///
/// # Returns
///
/// `window_size` filter taps ordered from offset `-half` to `+half`
pub fn compute_coefficients(window_size: usize, poly_order: usize) -> Result<Vec<f64>> {
    validate_window(window_size, "Savitzky-Golay window size")?;
    if poly_order >= window_size {
        return Err(DenoiseError::config(format!(
            "Polynomial order {} must be less than window size {}",
            poly_order, window_size
        )));
    }

    let half = (window_size / 2) as i32;
    let terms = poly_order + 1;

    let mut normal = DMatrix::<f64>::zeros(terms, terms);
    for p in 0..terms {
        for q in 0..terms {
            normal[(p, q)] = (-half..=half)
                .map(|k| f64::from(k).powi((p + q) as i32))
                .sum::<f64>();
        }
    }

    let mut rhs = DVector::<f64>::zeros(terms);
    rhs[0] = 1.0;

    let poly = gauss_eliminate(normal, rhs)?;

    let taps: Vec<f64> = (-half..=half)
        .map(|k| {
            let x = f64::from(k);
            (0..terms).map(|j| poly[j] * x.powi(j as i32)).sum::<f64>()
        })
        .collect();

    debug!(window_size, poly_order, "computed Savitzky-Golay coefficients");
    Ok(taps)
}

/// Solves `matrix · x = rhs` by Gaussian elimination with partial pivoting.
///
/// Fails with [`DenoiseError::NumericalError`] when a pivot falls below `1e-12`.
pub fn gauss_eliminate(mut matrix: DMatrix<f64>, mut rhs: DVector<f64>) -> Result<DVector<f64>> {
    let n = matrix.nrows();
    if matrix.ncols() != n || rhs.len() != n {
        return Err(DenoiseError::NumericalError(format!(
            "System shape mismatch: {}x{} matrix with {} right-hand side entries",
            n,
            matrix.ncols(),
            rhs.len()
        )));
    }

    for i in 0..n {
        let pivot_row = (i..n)
            .max_by(|&a, &b| matrix[(a, i)].abs().total_cmp(&matrix[(b, i)].abs()))
            .unwrap_or(i);
        if pivot_row != i {
            matrix.swap_rows(i, pivot_row);
            rhs.swap_rows(i, pivot_row);
        }

        let pivot = matrix[(i, i)];
        if pivot.abs() < PIVOT_EPSILON {
            return Err(DenoiseError::NumericalError(format!(
                "Matrix is singular: pivot {:e} in column {}",
                pivot, i
            )));
        }

        for k in i + 1..n {
            let factor = matrix[(k, i)] / pivot;
            for j in i..n {
                matrix[(k, j)] -= factor * matrix[(i, j)];
            }
            rhs[k] -= factor * rhs[i];
        }
    }

    let mut solution = DVector::<f64>::zeros(n);
    for i in (0..n).rev() {
        let tail: f64 = (i + 1..n).map(|j| matrix[(i, j)] * solution[j]).sum();
        solution[i] = (rhs[i] - tail) / matrix[(i, i)];
    }

    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_5_point_quadratic_smoothing() {
        let coeffs = compute_coefficients(5, 2).unwrap();
        // Known coefficients for 5-point quadratic smoothing
        let expected = vec![-3.0 / 35.0, 12.0 / 35.0, 17.0 / 35.0, 12.0 / 35.0, -3.0 / 35.0];

        for (actual, expected) in coeffs.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(actual, expected, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_7_point_cubic_smoothing() {
        let coeffs = compute_coefficients(7, 3).unwrap();
        let expected = [-2.0, 3.0, 6.0, 7.0, 6.0, 3.0, -2.0].map(|c| c / 21.0);

        for (actual, expected) in coeffs.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(actual, expected, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_order_zero_is_moving_average() {
        let coeffs = compute_coefficients(5, 0).unwrap();
        for c in coeffs {
            assert_abs_diff_eq!(c, 0.2, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_taps_sum_to_one() {
        for (window, order) in [(5, 2), (9, 4), (11, 3), (15, 4)] {
            let sum: f64 = compute_coefficients(window, order).unwrap().iter().sum();
            assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(compute_coefficients(4, 2).is_err()); // Even window size
        assert!(compute_coefficients(5, 5).is_err()); // Poly order >= window size
        assert!(compute_coefficients(0, 2).is_err()); // Zero window size
    }

    #[test]
    fn test_gauss_eliminate_needs_pivoting() {
        // Zero in the leading position forces a row swap
        let matrix = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 2.0, 1.0]);
        let rhs = DVector::from_vec(vec![3.0, 5.0]);
        let x = gauss_eliminate(matrix, rhs).unwrap();
        assert_abs_diff_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gauss_eliminate_singular() {
        let matrix = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let rhs = DVector::from_vec(vec![1.0, 2.0]);
        let result = gauss_eliminate(matrix, rhs);
        assert!(matches!(result, Err(DenoiseError::NumericalError(_))));
    }
}
