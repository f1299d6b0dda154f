//! Nelder–Mead simplex minimizer.
//!
//! Used for the nonlinear exponential fit, where the objective is a sum of
//! squared residuals with no convenient closed-form gradient.
//!
//! Notes:
//! - Convergence is measured on the simplex size (largest coordinate distance
//!   from the best vertex, relative to that vertex's magnitude), not on the
//!   spread of objective values. The exponential objective is scaled by a tiny
//!   constant, so value-based tolerances would stop immediately.
//! - Non-finite objective values are treated as `+inf`, which makes the
//!   simplex retreat from undefined regions (e.g. `b < 0` with a fractional
//!   exponent).
//! - After convergence the search is re-seeded around the incumbent up to
//!   `restarts` times while the budget lasts; a collapsed simplex can stall
//!   away from the minimum on curved valleys.

use nalgebra::DVector;

use crate::domain::SimplexOptions;

/// Result of a minimization.
#[derive(Debug, Clone)]
pub struct SimplexOutcome {
    pub point: DVector<f64>,
    pub value: f64,
    /// Iterations used across all restarts.
    pub iterations: usize,
    /// Whether the final run met the size tolerance before the budget ran out.
    pub converged: bool,
}

/// Minimize `objective` starting from `initial`.
pub fn minimize<F>(objective: F, initial: &DVector<f64>, opts: &SimplexOptions) -> SimplexOutcome
where
    F: Fn(&DVector<f64>) -> f64,
{
    let eval = |p: &DVector<f64>| {
        let v = objective(p);
        if v.is_finite() { v } else { f64::INFINITY }
    };

    if initial.is_empty() {
        return SimplexOutcome {
            point: initial.clone(),
            value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let mut start = initial.clone();
    let mut best_value = f64::INFINITY;
    let mut iterations = 0;
    let mut converged = false;

    for _ in 0..=opts.restarts {
        let budget = opts.max_iter.saturating_sub(iterations);
        if budget == 0 {
            break;
        }
        let run = run_once(&eval, &start, budget, opts);
        iterations += run.iterations;
        converged = run.converged;

        let improved = run.value < best_value;
        if improved || !best_value.is_finite() {
            best_value = run.value;
            start = run.point;
        }
        if !improved || !converged {
            break;
        }
    }

    SimplexOutcome {
        point: start,
        value: best_value,
        iterations,
        converged,
    }
}

fn run_once<F>(eval: &F, initial: &DVector<f64>, max_iter: usize, opts: &SimplexOptions) -> SimplexOutcome
where
    F: Fn(&DVector<f64>) -> f64,
{
    let n = initial.len();

    let mut simplex: Vec<DVector<f64>> = Vec::with_capacity(n + 1);
    simplex.push(initial.clone());
    for i in 0..n {
        let mut vertex = initial.clone();
        let step = if initial[i].abs() > 1e-10 {
            opts.initial_step * initial[i].abs()
        } else {
            opts.initial_step
        };
        vertex[i] += step;
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(eval).collect();

    let mut order: Vec<usize> = (0..=n).collect();
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iter {
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        let best = order[0];
        let worst = order[n];
        let second_worst = order[n - 1];

        if simplex_size(&simplex, best) <= opts.tolerance * (1.0 + simplex[best].amax()) {
            converged = true;
            break;
        }
        iterations += 1;

        let centroid = centroid_without(&simplex, worst);

        let reflected = &centroid + (&centroid - &simplex[worst]) * opts.alpha;
        let reflected_value = eval(&reflected);

        if reflected_value < values[best] {
            let expanded = &centroid + (&reflected - &centroid) * opts.gamma;
            let expanded_value = eval(&expanded);
            if expanded_value < reflected_value {
                simplex[worst] = expanded;
                values[worst] = expanded_value;
            } else {
                simplex[worst] = reflected;
                values[worst] = reflected_value;
            }
            continue;
        }

        if reflected_value < values[second_worst] {
            simplex[worst] = reflected;
            values[worst] = reflected_value;
            continue;
        }

        if reflected_value < values[worst] {
            // Outside contraction.
            let contracted = &centroid + (&reflected - &centroid) * opts.rho;
            let contracted_value = eval(&contracted);
            if contracted_value <= reflected_value {
                simplex[worst] = contracted;
                values[worst] = contracted_value;
                continue;
            }
        } else {
            // Inside contraction.
            let contracted = &centroid + (&simplex[worst] - &centroid) * opts.rho;
            let contracted_value = eval(&contracted);
            if contracted_value < values[worst] {
                simplex[worst] = contracted;
                values[worst] = contracted_value;
                continue;
            }
        }

        // Shrink towards the best vertex.
        let anchor = simplex[best].clone();
        for i in 0..=n {
            if i != best {
                simplex[i] = &anchor + (&simplex[i] - &anchor) * opts.sigma;
                values[i] = eval(&simplex[i]);
            }
        }
    }

    let best = (0..=n)
        .min_by(|&a, &b| values[a].total_cmp(&values[b]))
        .unwrap_or(0);

    SimplexOutcome {
        point: simplex[best].clone(),
        value: values[best],
        iterations,
        converged,
    }
}

fn centroid_without(simplex: &[DVector<f64>], exclude: usize) -> DVector<f64> {
    let mut centroid = DVector::zeros(simplex[0].len());
    for (i, vertex) in simplex.iter().enumerate() {
        if i != exclude {
            centroid += vertex;
        }
    }
    centroid / (simplex.len() - 1) as f64
}

/// Largest infinity-norm distance of any vertex from vertex `best`.
fn simplex_size(simplex: &[DVector<f64>], best: usize) -> f64 {
    simplex
        .iter()
        .map(|v| (v - &simplex[best]).amax())
        .fold(0.0, f64::max)
}
