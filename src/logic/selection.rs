//! Smart message selection: a random pick that favours earlier templates.

/// Default decay: each template is 80% as likely as the one before it.
pub const DEFAULT_DECAY: f64 = 0.8;

/// What: Pick an item by exponential-decay weight using a caller-supplied roll.
///
/// Inputs:
/// - `items`: Candidates, most preferred first.
/// - `decay`: Weight ratio between neighbours; item `i` weighs `decay^i`.
///   Non-finite or non-positive values are treated as `1.0` (uniform).
/// - `roll`: Uniform sample in `[0, 1)`; clamped into that range.
///
/// Output:
/// - `None` for an empty slice, otherwise the item whose cumulative weight
///   first reaches `roll * total_weight`.
///
/// Details:
/// - Pure and deterministic for a given roll, so it can be tested without a
///   random source.
#[must_use]
pub fn select_weighted<T>(items: &[T], decay: f64, roll: f64) -> Option<&T> {
    if items.is_empty() {
        return None;
    }
    let decay = if decay.is_finite() && decay > 0.0 {
        decay
    } else {
        1.0
    };
    let weights: Vec<f64> = std::iter::successors(Some(1.0_f64), |w| Some(w * decay))
        .take(items.len())
        .collect();
    let total: f64 = weights.iter().sum();
    let mut remaining = roll.clamp(0.0, 1.0) * total;
    for (item, weight) in items.iter().zip(&weights) {
        remaining -= weight;
        if remaining <= 0.0 {
            return Some(item);
        }
    }
    items.last()
}

/// [`select_weighted`] with a roll from the thread-local generator.
#[must_use]
pub fn pick_weighted<T>(items: &[T], decay: f64) -> Option<&T> {
    select_weighted(items, decay, rand::random::<f64>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Rolls map onto items by cumulative weight `1, 0.8, 0.64`.
    fn roll_maps_through_cumulative_weights() {
        let items = ["first", "second", "third"];
        assert_eq!(select_weighted(&items, 0.8, 0.0), Some(&"first"));
        assert_eq!(select_weighted(&items, 0.8, 0.40), Some(&"first"));
        assert_eq!(select_weighted(&items, 0.8, 0.5), Some(&"second"));
        assert_eq!(select_weighted(&items, 0.8, 0.99), Some(&"third"));
        assert_eq!(select_weighted(&items, 0.8, 1.5), Some(&"third"));
    }

    #[test]
    fn empty_and_single_inputs() {
        let none: [u8; 0] = [];
        assert_eq!(select_weighted(&none, 0.8, 0.3), None);
        assert_eq!(select_weighted(&[7], 0.8, 0.99), Some(&7));
        assert_eq!(pick_weighted(&none, 0.8), None);
    }

    #[test]
    /// What: A sweep of evenly spaced rolls reproduces the weight proportions.
    fn sweep_matches_weights() {
        let items = [0usize, 1, 2];
        let mut counts = [0usize; 3];
        for k in 0..1000 {
            let roll = f64::from(k) / 1000.0;
            if let Some(&i) = select_weighted(&items, 0.8, roll) {
                counts[i] += 1;
            }
        }
        // expected shares: 1/2.44, 0.8/2.44, 0.64/2.44
        assert!((405..=415).contains(&counts[0]), "{counts:?}");
        assert!((323..=333).contains(&counts[1]), "{counts:?}");
        assert!((257..=267).contains(&counts[2]), "{counts:?}");
    }

    #[test]
    fn invalid_decay_is_uniform() {
        let items = ["a", "b"];
        assert_eq!(select_weighted(&items, f64::NAN, 0.49), Some(&"a"));
        assert_eq!(select_weighted(&items, -2.0, 0.51), Some(&"b"));
    }
}
