use coupled_anneal::{
    error::Result,
    options::AnnealingOptions,
    problem::{Objective, StepFunction},
    rng::RandomNumberGenerator,
    step::IdentityStep,
    CoupledAnnealer,
};

/// Distance to `target` along every coordinate; decreases monotonically while
/// walking toward it.
#[derive(Clone, Copy, Debug)]
struct DistanceTo {
    target: f64,
}

impl Objective for DistanceTo {
    fn evaluate(&self, point: &[f64]) -> Result<f64> {
        Ok(point.iter().map(|x| (x - self.target).abs()).sum())
    }
}

/// Deterministic walk along the affine path `x - k * h`.
#[derive(Clone, Copy, Debug)]
struct FixedStride {
    stride: f64,
}

impl StepFunction for FixedStride {
    fn propose(
        &self,
        current: &[f64],
        _tgen: f64,
        _rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<f64>> {
        Ok(current.iter().map(|x| x - self.stride).collect())
    }
}

fn greedy_descent<O: Objective, S: StepFunction>(
    objective: &O,
    step: &S,
    start: &[f64],
    evaluations: usize,
) -> (Vec<f64>, f64) {
    let mut rng = RandomNumberGenerator::from_seed(0);
    let mut best = start.to_vec();
    let mut best_cost = objective.evaluate(start).unwrap();
    let mut current = best.clone();

    for _ in 0..evaluations {
        let candidate = step.propose(&current, 0.0, &mut rng).unwrap();
        let cost = objective.evaluate(&candidate).unwrap();
        if cost < best_cost {
            best = candidate.clone();
            best_cost = cost;
            current = candidate;
        }
    }
    (best, best_cost)
}

fn single_chain(iterations: usize) -> AnnealingOptions {
    AnnealingOptions::builder()
        .num_chains(1)
        .max_iterations(iterations)
        .seed(99)
        .build()
}

#[test]
fn test_single_chain_matches_greedy_descent() {
    // Binary fractions keep the walk exact: the target is hit after 6 strides.
    let objective = DistanceTo { target: 0.25 };
    let step = FixedStride { stride: 0.125 };
    let start = [1.0, 1.0];

    let (greedy_point, greedy_cost) = greedy_descent(&objective, &step, &start, 20);
    let annealer = CoupledAnnealer::new(objective, step);
    let result = annealer.minimize_from(&single_chain(20), &start).unwrap();

    assert_eq!(greedy_cost, 0.0);
    assert_eq!(result.cost, greedy_cost);
    assert_eq!(result.point, greedy_point);
    assert_eq!(result.improvements, 6);
}

#[test]
fn test_single_chain_zero_variance_step() {
    let objective = DistanceTo { target: 0.0 };
    let start = [0.75, -0.5, 0.25];
    let start_cost = objective.evaluate(&start).unwrap();

    let (greedy_point, greedy_cost) = greedy_descent(&objective, &IdentityStep, &start, 100);
    let annealer = CoupledAnnealer::new(objective, IdentityStep);
    let result = annealer.minimize(&single_chain(100), &start, start_cost).unwrap();

    assert_eq!(result.point, greedy_point);
    assert_eq!(result.cost, greedy_cost);
    assert_eq!(result.cost, start_cost);
}

#[test]
fn test_single_chain_accepts_every_uphill_move() {
    // One chain is always at the population maximum with gamma = 1, so a
    // worse candidate is accepted with probability 1.
    let objective = DistanceTo { target: 0.25 };
    let step = FixedStride { stride: 0.125 };
    let annealer = CoupledAnnealer::new(objective, step);

    let result = annealer.minimize_from(&single_chain(20), &[1.0]).unwrap();

    assert_eq!(result.accepted_moves, 20);
    let chain = &result.chains[0];
    // 20 strides from 1.0 end at -1.5, i.e. 1.75 away from the target.
    assert_eq!(chain.final_cost, 1.75);
    assert_eq!(chain.best_cost, 0.0);
}

#[test]
fn test_single_chain_keeps_climbing_after_tacc_collapses() {
    // A lowering factor of 1.0 drives tacc to its floor on the first update;
    // the chain at the maximum must still accept every worse candidate.
    let objective = DistanceTo { target: 0.25 };
    let step = FixedStride { stride: 0.125 };
    let annealer = CoupledAnnealer::new(objective, step);
    let options = AnnealingOptions::builder()
        .num_chains(1)
        .max_iterations(20)
        .tacc_schedule(1.0)
        .seed(99)
        .build();

    let result = annealer.minimize_from(&options, &[1.0]).unwrap();

    assert_eq!(result.accepted_moves, 20);
    assert_eq!(result.final_tacc, f64::MIN_POSITIVE);
    assert_eq!(result.chains[0].final_cost, 1.75);
    assert_eq!(result.cost, 0.0);
}
