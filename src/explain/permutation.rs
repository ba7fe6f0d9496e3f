//! Model-agnostic sampling Shapley values.
//!
//! Each round draws one feature ordering and walks it forwards and backwards
//! (antithetic pair) from every background row to `x`, crediting each feature
//! with the output change caused by switching it in. Per walk the credits sum
//! to `f(x) − f(b)`, so averaging over rounds and rows gives
//! `baseline + Σ φ = f(x)` with `baseline = mean f(b)` regardless of how many
//! rounds are drawn.
//!
//! Rounds run in parallel; each has its own seeded RNG and results are reduced
//! in round order, so output does not depend on the thread pool.

use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::models::ScoringModel;

#[derive(Debug, Clone, PartialEq)]
pub struct PermutationExplainer {
    /// Reference rows in normalized space.
    pub background: Vec<Vec<f64>>,
    /// Requested orderings; rounded up to an even number.
    pub permutations: usize,
    pub seed: u64,
}

impl PermutationExplainer {
    pub fn rounds(&self) -> usize {
        self.permutations.div_ceil(2).max(1)
    }

    /// Mean model output over the background rows.
    pub fn baseline(&self, model: &ScoringModel) -> f64 {
        let total: f64 = self.background.iter().map(|b| model.raw_output(b)).sum();
        total / self.background.len() as f64
    }

    /// Returns `(baseline, contributions)`.
    pub fn explain(&self, model: &ScoringModel, x: &[f64]) -> (f64, Vec<f64>) {
        let width = x.len();
        let rounds = self.rounds();

        let partials: Vec<Vec<f64>> = (0..rounds)
            .into_par_iter()
            .map(|round| {
                let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(round as u64));
                let mut order: Vec<usize> = (0..width).collect();
                order.shuffle(&mut rng);

                let mut phi = vec![0.0; width];
                for row in &self.background {
                    walk(model, x, row, order.iter().copied(), &mut phi);
                    walk(model, x, row, order.iter().rev().copied(), &mut phi);
                }
                phi
            })
            .collect();

        let walks = (rounds * 2 * self.background.len()) as f64;
        let mut phi = vec![0.0; width];
        for partial in &partials {
            for (acc, v) in phi.iter_mut().zip(partial) {
                *acc += v;
            }
        }
        for v in &mut phi {
            *v /= walks;
        }
        (self.baseline(model), phi)
    }
}

/// Switch features from `row` to `x` in `order`, crediting each output change.
fn walk(
    model: &ScoringModel,
    x: &[f64],
    row: &[f64],
    order: impl Iterator<Item = usize>,
    phi: &mut [f64],
) {
    let mut z = row.to_vec();
    let mut prev = model.raw_output(&z);
    for j in order {
        z[j] = x[j];
        let cur = model.raw_output(&z);
        phi[j] += cur - prev;
        prev = cur;
    }
}
