//! Derivative-free minimisation
//!
//! A bounded Nelder-Mead simplex search, used to estimate model
//! coefficients by minimising a sum of squared residuals.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Settings for [`nelder_mead`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplexConfig {
    /// Maximum number of iterations
    pub max_iter: usize,
    /// Stop once the spread of objective values (or the simplex size) drops below this
    pub tolerance: f64,
    /// Reflection coefficient
    pub reflection: f64,
    /// Expansion coefficient
    pub expansion: f64,
    /// Contraction coefficient
    pub contraction: f64,
    /// Shrink coefficient
    pub shrink: f64,
    /// Relative size of the initial simplex
    pub initial_step: f64,
}

impl Default for SimplexConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            reflection: 1.0,
            expansion: 2.0,
            contraction: 0.5,
            shrink: 0.5,
            initial_step: 0.05,
        }
    }
}

/// Outcome of a simplex search
#[derive(Debug, Clone)]
pub struct SimplexResult {
    /// Best point found
    pub point: Vec<f64>,
    /// Objective value at `point`
    pub value: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Whether the tolerance was reached before `max_iter`
    pub converged: bool,
}

/// Minimise `objective` starting from `initial`.
///
/// `bounds`, when given, clamps each coordinate to its `(min, max)` pair
/// after every simplex move. Non-finite objective values are treated as
/// worse than any finite value, so the search moves away from them.
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: &SimplexConfig,
) -> SimplexResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    let eval = |x: &[f64]| {
        let v = objective(x);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    };

    if n == 0 {
        return SimplexResult {
            point: Vec::new(),
            value: eval(initial),
            iterations: 0,
            converged: true,
        };
    }

    let mut simplex = Vec::with_capacity(n + 1);
    simplex.push(clamp(initial.to_vec(), bounds));
    for i in 0..n {
        let mut vertex = initial.to_vec();
        vertex[i] += if initial[i].abs() > 1e-10 {
            config.initial_step * initial[i].abs()
        } else {
            config.initial_step
        };
        simplex.push(clamp(vertex, bounds));
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| eval(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));
        let (best, second_worst, worst) = (order[0], order[n - 1], order[n]);

        if values[worst] - values[best] < config.tolerance {
            converged = true;
            break;
        }

        let centroid = centroid_without(&simplex, worst);
        let spread = simplex
            .iter()
            .map(|v| distance(v, &centroid))
            .fold(0.0, f64::max);
        if spread < config.tolerance {
            converged = true;
            break;
        }

        let reflected = clamp(
            along(&centroid, &simplex[worst], -config.reflection),
            bounds,
        );
        let reflected_value = eval(&reflected);

        if reflected_value < values[best] {
            let expanded = clamp(along(&centroid, &reflected, config.expansion), bounds);
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

        // Contract towards the better of the reflected and the worst point
        let (towards, towards_value) = if reflected_value < values[worst] {
            (reflected, reflected_value)
        } else {
            (simplex[worst].clone(), values[worst])
        };
        let contracted = clamp(along(&centroid, &towards, config.contraction), bounds);
        let contracted_value = eval(&contracted);
        if contracted_value < towards_value {
            simplex[worst] = contracted;
            values[worst] = contracted_value;
            continue;
        }

        let anchor = simplex[best].clone();
        for i in 0..=n {
            if i != best {
                let shrunk = along(&anchor, &simplex[i], config.shrink);
                simplex[i] = clamp(shrunk, bounds);
                values[i] = eval(&simplex[i]);
            }
        }
    }

    let best = (0..=n)
        .min_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal))
        .unwrap_or(0);

    SimplexResult {
        point: simplex[best].clone(),
        value: values[best],
        iterations,
        converged,
    }
}

/// `origin + factor * (point - origin)`
fn along(origin: &[f64], point: &[f64], factor: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(point.iter())
        .map(|(o, p)| o + factor * (p - o))
        .collect()
}

fn centroid_without(simplex: &[Vec<f64>], exclude: usize) -> Vec<f64> {
    let dim = simplex[0].len();
    let mut centroid = vec![0.0; dim];
    for (_, vertex) in simplex.iter().enumerate().filter(|(i, _)| *i != exclude) {
        for (c, v) in centroid.iter_mut().zip(vertex.iter()) {
            *c += v;
        }
    }
    let count = (simplex.len() - 1) as f64;
    centroid.iter_mut().for_each(|c| *c /= count);
    centroid
}

fn clamp(mut point: Vec<f64>, bounds: Option<&[(f64, f64)]>) -> Vec<f64> {
    if let Some(bounds) = bounds {
        for (x, &(lo, hi)) in point.iter_mut().zip(bounds.iter()) {
            *x = x.clamp(lo, hi);
        }
    }
    point
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
