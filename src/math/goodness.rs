//! Goodness-of-fit measures.

use crate::error::{AppError, Result};

fn check_lengths(predicted: &[f64], observed: &[f64]) -> Result<()> {
    if predicted.is_empty() || observed.is_empty() {
        return Err(AppError::invalid_input("goodness of fit needs non-empty series"));
    }
    if predicted.len() != observed.len() {
        return Err(AppError::invalid_input(format!(
            "goodness of fit needs equal lengths (predicted={}, observed={})",
            predicted.len(),
            observed.len()
        )));
    }
    Ok(())
}

/// Coefficient of determination `R² = 1 - SS_res / SS_tot`.
///
/// A constant `observed` series has `SS_tot = 0`: the result is `1.0` for a
/// perfect prediction and `NaN` otherwise.
pub fn r_squared(predicted: &[f64], observed: &[f64]) -> Result<f64> {
    check_lengths(predicted, observed)?;

    let n = observed.len() as f64;
    let mean = observed.iter().sum::<f64>() / n;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (&p, &o) in predicted.iter().zip(observed) {
        ss_res += (o - p) * (o - p);
        ss_tot += (o - mean) * (o - mean);
    }

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { f64::NAN });
    }
    Ok(1.0 - ss_res / ss_tot)
}

/// Root mean squared error.
pub fn rmse(predicted: &[f64], observed: &[f64]) -> Result<f64> {
    check_lengths(predicted, observed)?;
    let sse: f64 = predicted
        .iter()
        .zip(observed)
        .map(|(p, o)| (o - p) * (o - p))
        .sum();
    Ok((sse / observed.len() as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn perfect_prediction_is_one() {
        let y = [1.0, 2.0, 4.0, 8.0];
        assert_eq!(r_squared(&y, &y).unwrap(), 1.0);
        assert_eq!(rmse(&y, &y).unwrap(), 0.0);
    }

    #[test]
    fn mean_prediction_is_zero() {
        let observed = [1.0, 2.0, 3.0];
        let predicted = [2.0, 2.0, 2.0];
        assert_abs_diff_eq!(r_squared(&predicted, &observed).unwrap(), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn worse_than_mean_is_negative() {
        let observed = [1.0, 2.0, 3.0];
        let predicted = [3.0, 2.0, 1.0];
        assert_abs_diff_eq!(r_squared(&predicted, &observed).unwrap(), -3.0, epsilon = 1e-12);
    }

    #[test]
    fn constant_target() {
        let observed = [5.0, 5.0];
        assert_eq!(r_squared(&[5.0, 5.0], &observed).unwrap(), 1.0);
        assert!(r_squared(&[4.0, 6.0], &observed).unwrap().is_nan());
    }

    #[test]
    fn rmse_of_unit_errors() {
        assert_abs_diff_eq!(rmse(&[1.0, 3.0], &[2.0, 2.0]).unwrap(), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn rejects_bad_lengths() {
        assert!(matches!(r_squared(&[], &[]), Err(AppError::InvalidInput(_))));
        assert!(matches!(r_squared(&[1.0], &[1.0, 2.0]), Err(AppError::InvalidInput(_))));
        assert!(rmse(&[1.0, 2.0], &[1.0]).is_err());
    }
}
