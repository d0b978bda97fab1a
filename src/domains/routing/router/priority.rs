use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

const SHUFFLE_TRIES: usize = 64;

/// Hands out robot priority orders, never the same one twice.
pub(crate) struct PriorityOrders {
    tried: HashSet<Vec<usize>>,
    rng: StdRng,
    total: Option<usize>,
}

impl PriorityOrders {
    pub fn new(robots: usize, seed: u64) -> Self {
        Self {
            tried: HashSet::new(),
            rng: StdRng::seed_from_u64(seed),
            total: permutations(robots),
        }
    }

    /// Robot id order.
    pub fn first(&mut self, robots: usize) -> Vec<usize> {
        let order: Vec<usize> = (0..robots).collect();
        self.tried.insert(order.clone());
        order
    }

    /// Next order after `failed` could not be planned under `current`:
    /// `failed` goes first, falling back to seeded shuffles once that order
    /// was already tried. `None` when no untried order is left.
    pub fn next(&mut self, current: &[usize], failed: usize) -> Option<Vec<usize>> {
        if self.total.is_some_and(|t| self.tried.len() >= t) {
            return None;
        }
        let mut promoted = Vec::with_capacity(current.len());
        promoted.push(failed);
        promoted.extend(current.iter().copied().filter(|&r| r != failed));
        if self.tried.insert(promoted.clone()) {
            return Some(promoted);
        }

        let mut candidate = current.to_vec();
        for _ in 0..SHUFFLE_TRIES {
            candidate.shuffle(&mut self.rng);
            if self.tried.insert(candidate.clone()) {
                return Some(candidate);
            }
        }
        None
    }
}

/// `n!`, or `None` when it does not fit a `usize`.
fn permutations(n: usize) -> Option<usize> {
    (1..=n).try_fold(1usize, |acc, k| acc.checked_mul(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_robot_is_promoted() {
        let mut orders = PriorityOrders::new(3, 0);
        let first = orders.first(3);
        assert_eq!(first, vec![0, 1, 2]);
        assert_eq!(orders.next(&first, 2), Some(vec![2, 0, 1]));
    }

    #[test]
    fn two_robots_run_out_after_both_orders() {
        let mut orders = PriorityOrders::new(2, 0);
        let first = orders.first(2);
        let second = orders.next(&first, 1).unwrap();
        assert_eq!(second, vec![1, 0]);
        assert_eq!(orders.next(&second, 0), None);
    }

    #[test]
    fn orders_are_never_repeated() {
        let mut orders = PriorityOrders::new(4, 7);
        let mut current = orders.first(4);
        let mut seen = HashSet::from([current.clone()]);
        while let Some(next) = orders.next(&current, current[current.len() - 1]) {
            assert!(seen.insert(next.clone()));
            current = next;
        }
        assert!(seen.len() <= 24);
    }
}
