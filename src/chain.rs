//! # Chain State
//!
//! A chain is one of the cooperating search units. It carries the point it
//! currently sits on and the best point it has visited so far.

/// Mutable record of a single search chain.
///
/// The best cost never increases: `replace` only moves the best point when
/// the candidate is strictly better, and it moves the point and its cost
/// together.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChainState {
    id: usize,
    current_point: Vec<f64>,
    current_cost: f64,
    best_point: Vec<f64>,
    best_cost: f64,
}

impl ChainState {
    /// Creates a chain sitting on `point`, which is also its best point so far.
    pub fn new(id: usize, point: Vec<f64>, cost: f64) -> Self {
        Self {
            id,
            best_point: point.clone(),
            current_point: point,
            current_cost: cost,
            best_cost: cost,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn current_point(&self) -> &[f64] {
        &self.current_point
    }

    pub fn current_cost(&self) -> f64 {
        self.current_cost
    }

    pub fn best_point(&self) -> &[f64] {
        &self.best_point
    }

    pub fn best_cost(&self) -> f64 {
        self.best_cost
    }

    /// Number of coordinates of the chain's points.
    pub fn dimension(&self) -> usize {
        self.current_point.len()
    }

    /// Moves the chain to `candidate`.
    ///
    /// The current point and cost are always overwritten. Returns `true` when
    /// the candidate also became the chain's new best, in which case the
    /// caller is expected to notify its progress observer.
    pub fn replace(&mut self, candidate: Vec<f64>, cost: f64) -> bool {
        let improved = cost < self.best_cost;
        if improved {
            self.best_point.clone_from(&candidate);
            self.best_cost = cost;
        }
        self.current_point = candidate;
        self.current_cost = cost;
        improved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_chain_best_equals_current() {
        let chain = ChainState::new(2, vec![1.0, 2.0], 5.0);
        assert_eq!(chain.id(), 2);
        assert_eq!(chain.dimension(), 2);
        assert_eq!(chain.current_point(), chain.best_point());
        assert_eq!(chain.current_cost(), chain.best_cost());
    }

    #[test]
    fn test_replace_with_better_updates_best() {
        let mut chain = ChainState::new(0, vec![1.0], 5.0);
        assert!(chain.replace(vec![0.5], 2.0));
        assert_eq!(chain.current_cost(), 2.0);
        assert_eq!(chain.best_cost(), 2.0);
        assert_eq!(chain.best_point(), &[0.5]);
    }

    #[test]
    fn test_replace_with_worse_keeps_best() {
        let mut chain = ChainState::new(0, vec![1.0], 5.0);
        assert!(!chain.replace(vec![3.0], 9.0));
        assert_eq!(chain.current_point(), &[3.0]);
        assert_eq!(chain.current_cost(), 9.0);
        assert_eq!(chain.best_point(), &[1.0]);
        assert_eq!(chain.best_cost(), 5.0);
    }

    #[test]
    fn test_equal_cost_is_not_an_improvement() {
        let mut chain = ChainState::new(0, vec![1.0], 5.0);
        assert!(!chain.replace(vec![2.0], 5.0));
        assert_eq!(chain.best_point(), &[1.0]);
    }

    #[test]
    fn test_best_cost_never_increases() {
        let mut chain = ChainState::new(0, vec![0.0], 10.0);
        let costs = [8.0, 12.0, 7.5, 30.0, 7.0, 7.2, 1.0, 4.0];
        let mut previous = chain.best_cost();

        for (i, &cost) in costs.iter().enumerate() {
            chain.replace(vec![i as f64], cost);
            assert!(chain.best_cost() <= previous);
            previous = chain.best_cost();
        }
        assert_eq!(chain.best_cost(), 1.0);
        assert_eq!(chain.best_point(), &[6.0]);
    }
}
