//! Adaptive search for the offset of `y = a * ln(t - X0) + b`.
//!
//! `X0` is the only parameter searched; `(a, b)` are re-solved in closed form
//! (OLS of `y` on `ln(t - X0)`) for every trial offset. The walk:
//!
//! - starts just left of the first coordinate (`X0 = t_first + delta`, `delta < 0`)
//! - on an R² improvement records the trial and grows the step
//! - otherwise reverts to the last improving offset and shrinks the step
//! - stops when the step underflows `exit_step` or after `max_iter` trials
//!
//! The step keeps its sign, so the walk only ever moves away from the data.
//! [`OffsetWalk`] exposes every trial as a [`WalkStep`].

use tracing::{debug, warn};

use crate::domain::OffsetWalkOptions;
use crate::error::{AppError, Result};
use crate::math::{LineFit, fit_log_line, r_squared};
use crate::models::LogOffsetModel;

/// One trial of the walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkStep {
    /// 1-based trial number.
    pub iteration: usize,
    /// Offset of the trial relative to the first coordinate.
    pub delta: f64,
    /// R² of the trial; `NaN` when the inner fit was undefined.
    pub r_squared: f64,
    /// Best R² seen so far, including this trial.
    pub best_r_squared: f64,
    /// Step that will be applied for the next trial.
    pub step: f64,
}

#[derive(Debug, Clone, Copy)]
struct Incumbent {
    line: LineFit,
    r_squared: f64,
    delta: f64,
}

/// Iterator over the trials of an offset walk.
#[derive(Debug)]
pub struct OffsetWalk<'a> {
    xs: &'a [f64],
    ys: &'a [f64],
    opts: OffsetWalkOptions,
    first: f64,
    delta: f64,
    last_valid_delta: f64,
    step: f64,
    iteration: usize,
    best: Option<Incumbent>,
    done: bool,
    shifted: Vec<f64>,
    predicted: Vec<f64>,
}

impl<'a> OffsetWalk<'a> {
    /// `xs` must be sorted ascending; the first one anchors the walk.
    pub fn new(xs: &'a [f64], ys: &'a [f64], opts: &OffsetWalkOptions) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(AppError::invalid_input(format!(
                "log-offset fit needs equal lengths (x={}, y={})",
                xs.len(),
                ys.len()
            )));
        }
        if xs.len() < 2 {
            return Err(AppError::invalid_input(format!(
                "log-offset fit needs at least 2 points, got {}",
                xs.len()
            )));
        }
        if xs.iter().chain(ys).any(|v| !v.is_finite()) {
            return Err(AppError::invalid_input("log-offset fit inputs must be finite"));
        }
        if xs.windows(2).any(|w| w[1] < w[0]) {
            return Err(AppError::invalid_input("log-offset fit needs ascending x values"));
        }

        Ok(Self {
            xs,
            ys,
            opts: opts.clone(),
            first: xs[0],
            delta: opts.initial_delta,
            last_valid_delta: opts.initial_delta,
            step: opts.initial_step,
            iteration: 0,
            best: None,
            done: false,
            shifted: vec![0.0; xs.len()],
            predicted: vec![0.0; xs.len()],
        })
    }

    /// Best R² seen so far (`-inf` before any finite trial).
    pub fn best_r_squared(&self) -> f64 {
        self.best.map_or(f64::NEG_INFINITY, |b| b.r_squared)
    }

    /// Whether the walk ended on the step floor rather than the trial budget.
    pub fn hit_step_floor(&self) -> bool {
        self.step.abs() < self.opts.exit_step
    }

    /// R² of the line fit on `ln(x - x0)`; `NaN` if undefined.
    fn trial(&mut self, x0: f64) -> (Option<LineFit>, f64) {
        for (u, &x) in self.shifted.iter_mut().zip(self.xs) {
            *u = x - x0;
        }
        let Ok(line) = fit_log_line(&self.shifted, self.ys) else {
            return (None, f64::NAN);
        };
        for (p, &u) in self.predicted.iter_mut().zip(&self.shifted) {
            *p = line.eval(u.ln());
        }
        let r2 = r_squared(&self.predicted, self.ys).unwrap_or(f64::NAN);
        (Some(line), r2)
    }

    /// Consume the remaining trials and build the model.
    ///
    /// `shift` is the frame offset the caller subtracted from `xs`.
    pub fn finish(mut self, shift: f64) -> Result<LogOffsetModel> {
        for _ in self.by_ref() {}

        let Some(best) = self.best else {
            return Err(AppError::degenerate(
                "log-offset walk found no offset with a finite R²",
            ));
        };
        if !self.hit_step_floor() {
            warn!(
                iterations = self.iteration,
                step = self.step,
                "log-offset walk hit its iteration budget before the step floor"
            );
        }

        let model = LogOffsetModel::new(
            best.line.slope,
            best.line.intercept,
            self.first + best.delta,
            self.first,
            shift,
            best.r_squared,
            self.iteration,
        );
        debug!(model = %model, iterations = self.iteration, "log-offset fit");
        Ok(model)
    }
}

impl Iterator for OffsetWalk<'_> {
    type Item = WalkStep;

    fn next(&mut self) -> Option<WalkStep> {
        if self.done || self.iteration >= self.opts.max_iter || self.hit_step_floor() {
            self.done = true;
            return None;
        }

        let delta = self.delta;
        let (line, r2) = self.trial(self.first + delta);

        match line {
            Some(line) if r2 > self.best_r_squared() => {
                self.best = Some(Incumbent {
                    line,
                    r_squared: r2,
                    delta,
                });
                self.last_valid_delta = delta;
                self.step *= self.opts.grow;
            }
            _ => {
                self.delta = self.last_valid_delta;
                self.step *= self.opts.shrink;
            }
        }
        self.delta += self.step;
        self.iteration += 1;

        Some(WalkStep {
            iteration: self.iteration,
            delta,
            r_squared: r2,
            best_r_squared: self.best_r_squared(),
            step: self.step,
        })
    }
}

/// Fit `y = a * ln(t - X0) + b`, searching `X0`.
pub fn fit_log_offset(xs: &[f64], ys: &[f64], opts: &OffsetWalkOptions) -> Result<LogOffsetModel> {
    OffsetWalk::new(xs, ys, opts)?.finish(0.0)
}

/// Like [`fit_log_offset`], but the walk runs on `xs - shift`.
///
/// The returned model still takes absolute time.
pub fn fit_log_offset_shifted(
    xs: &[f64],
    ys: &[f64],
    shift: f64,
    opts: &OffsetWalkOptions,
) -> Result<LogOffsetModel> {
    if !shift.is_finite() {
        return Err(AppError::invalid_input(format!("shift must be finite, got {shift}")));
    }
    let shifted: Vec<f64> = xs.iter().map(|x| x - shift).collect();
    OffsetWalk::new(&shifted, ys, opts)?.finish(shift)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Regression;
    use approx::assert_abs_diff_eq;

    fn log_curve(x0: f64) -> (Vec<f64>, Vec<f64>) {
        let xs: Vec<f64> = (0..41).map(|i| 2010.0 + 0.25 * i as f64).collect();
        let ys = xs.iter().map(|x| 2.0 * (x - x0).ln() + 1.0).collect();
        (xs, ys)
    }

    #[test]
    fn finds_offset_of_exact_log_curve() {
        let (xs, ys) = log_curve(2009.5);
        let model = fit_log_offset_shifted(&xs, &ys, 2000.0, &OffsetWalkOptions::default()).unwrap();

        assert_abs_diff_eq!(model.x0(), 2009.5, epsilon = 1e-2);
        assert_abs_diff_eq!(model.a(), 2.0, epsilon = 1e-2);
        assert_abs_diff_eq!(model.b(), 1.0, epsilon = 1e-2);
        assert!(model.r_squared() > 0.99999);
        assert_eq!(model.parameters()[2], model.x0());
        assert_abs_diff_eq!(model.constant_t(), 2010.0, epsilon = 1e-9);
    }

    #[test]
    fn best_r_squared_never_regresses() {
        let (xs, ys) = log_curve(2008.0);
        let shifted: Vec<f64> = xs.iter().map(|x| x - 2000.0).collect();
        let walk = OffsetWalk::new(&shifted, &ys, &OffsetWalkOptions::default()).unwrap();

        let mut previous = f64::NEG_INFINITY;
        let mut trials = 0;
        for step in walk {
            assert!(step.best_r_squared >= previous);
            assert!(!(step.r_squared > step.best_r_squared));
            assert!(step.delta < 0.0);
            previous = step.best_r_squared;
            trials += 1;
        }
        assert!(trials > 1);
        assert!(previous > 0.9999);
    }

    #[test]
    fn shifted_and_unshifted_fits_agree_on_absolute_estimates() {
        let (xs, ys) = log_curve(2009.0);
        let opts = OffsetWalkOptions::default();
        let plain = fit_log_offset(&xs, &ys, &opts).unwrap();
        let shifted = fit_log_offset_shifted(&xs, &ys, 2000.0, &opts).unwrap();

        for t in [2010.0, 2015.0, 2025.0] {
            assert_abs_diff_eq!(plain.estimate(t), shifted.estimate(t), epsilon = 1e-2);
        }
    }

    #[test]
    fn iteration_budget_is_respected() {
        let (xs, ys) = log_curve(2009.5);
        let opts = OffsetWalkOptions {
            max_iter: 10,
            ..Default::default()
        };
        let model = fit_log_offset(&xs, &ys, &opts).unwrap();
        assert_eq!(model.iterations(), 10);
    }

    #[test]
    fn constant_target_fits_flat() {
        let xs = [1.0, 2.0, 3.0];
        let ys = [5.0, 5.0, 5.0];
        let opts = OffsetWalkOptions {
            max_iter: 50,
            ..Default::default()
        };
        // Every trial predicts 5.0 exactly, so R² is 1 and the fit succeeds.
        let model = fit_log_offset(&xs, &ys, &opts).unwrap();
        assert_abs_diff_eq!(model.estimate(2.0), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn no_finite_trial_is_degenerate() {
        // ln(x - X0) is identical for both points, so no trial has a slope.
        let opts = OffsetWalkOptions::default();
        assert!(matches!(
            fit_log_offset(&[1.0, 1.0], &[1.0, 2.0], &opts),
            Err(AppError::NumericDegenerate(_))
        ));
    }

    #[test]
    fn rejects_bad_input() {
        let opts = OffsetWalkOptions::default();
        assert!(matches!(fit_log_offset(&[1.0], &[1.0], &opts), Err(AppError::InvalidInput(_))));
        assert!(matches!(
            fit_log_offset(&[2.0, 1.0], &[1.0, 2.0], &opts),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            fit_log_offset_shifted(&[1.0, 2.0], &[1.0, 2.0], f64::NAN, &opts),
            Err(AppError::InvalidInput(_))
        ));
    }
}
