//! Utility functions for the kindness crate

use rand::{Rng, SeedableRng, distr::StandardUniform, prelude::IndexedRandom, rngs::StdRng};

/// Build the random number generator used by the stochastic solvers.
///
/// `Some(seed)` gives a reproducible stream; `None` seeds from the thread RNG.
pub fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Performs weighted random sampling from a collection of items.
///
/// A threshold is drawn uniformly from `[0, total)` and the items are scanned
/// until their cumulative weight passes it. If every weight is zero the choice
/// falls back to uniform sampling; the last item is returned if rounding keeps
/// the threshold from being crossed.
///
/// # Examples
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use kindness::utils::weighted_sample;
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let items = vec![("a", 1.0), ("b", 2.0), ("c", 1.0)];
/// assert!(weighted_sample(&mut rng, &items).is_some());
/// ```
pub fn weighted_sample<R, T, W>(rng: &mut R, items: &[(T, W)]) -> Option<T>
where
    R: Rng,
    T: Clone,
    W: Into<f64> + Copy,
{
    if items.is_empty() {
        return None;
    }

    let total: f64 = items.iter().map(|(_, w)| (*w).into()).sum();

    if total <= 0.0 {
        return items.choose(rng).map(|(item, _)| item.clone());
    }

    let mut threshold = rng.sample::<f64, _>(StandardUniform) * total;

    for (item, weight) in items {
        let w = (*weight).into();
        if threshold < w {
            return Some(item.clone());
        }
        threshold -= w;
    }

    items.last().map(|(item, _)| item.clone())
}

/// Index of the first maximum under `f64::total_cmp`; ties keep the earliest entry.
pub fn argmax<I>(values: I) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = f64>,
{
    let mut best: Option<(usize, f64)> = None;
    for (index, value) in values.into_iter().enumerate() {
        match best {
            Some((_, current)) if value.total_cmp(&current).is_le() => {}
            _ => best = Some((index, value)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_sample_empty() {
        let mut rng = build_rng(Some(42));
        let items: Vec<(i32, f64)> = vec![];
        assert_eq!(weighted_sample(&mut rng, &items), None);
    }

    #[test]
    fn test_weighted_sample_single_item() {
        let mut rng = build_rng(Some(42));
        let items = vec![("a", 1.0)];
        assert_eq!(weighted_sample(&mut rng, &items), Some("a"));
    }

    #[test]
    fn test_weighted_sample_never_picks_zero_weight() {
        let mut rng = build_rng(Some(7));
        let items = vec![("never", 0.0), ("always", 1.0)];
        for _ in 0..200 {
            assert_eq!(weighted_sample(&mut rng, &items), Some("always"));
        }
    }

    #[test]
    fn test_weighted_sample_deterministic() {
        let items = vec![("a", 1.0), ("b", 2.0), ("c", 1.0)];
        let draws = |seed| {
            let mut rng = build_rng(Some(seed));
            (0..20)
                .map(|_| weighted_sample(&mut rng, &items))
                .collect::<Vec<_>>()
        };
        assert_eq!(draws(12345), draws(12345));
    }

    #[test]
    fn argmax_keeps_first_of_ties() {
        assert_eq!(argmax(vec![1.0, 3.0, 3.0, 2.0]), Some((1, 3.0)));
        assert_eq!(argmax(Vec::new()), None);
        assert_eq!(argmax(vec![f64::NEG_INFINITY]), Some((0, f64::NEG_INFINITY)));
    }
}
