//! Closed-form collision probabilities for `k` uniform draws from `N` items.
//!
//! Everything is evaluated in log space with `ln_factorial`, so `N = 1024,
//! k = 100` is as cheap as `N = 365, k = 23`.

use statrs::function::factorial::{ln_binomial, ln_factorial};

/// P(all `k` draws distinct) = `N! / (N-k)! / N^k`.
pub fn prob_all_distinct(population_size: u64, sample_size: u64) -> f64 {
    if sample_size == 0 {
        return 1.0;
    }
    if population_size == 0 || sample_size > population_size {
        return 0.0;
    }
    let n = population_size;
    let k = sample_size;
    (ln_factorial(n) - ln_factorial(n - k) - k as f64 * (n as f64).ln()).exp()
}

/// P(exactly one item appears twice and the other `k-2` appear once)
/// = `C(k,2) · N! / (N-k+1)! / N^k`.
pub fn prob_exactly_one_pair(population_size: u64, sample_size: u64) -> f64 {
    if sample_size < 2 || population_size == 0 || sample_size - 1 > population_size {
        return 0.0;
    }
    let n = population_size;
    let k = sample_size;
    (ln_binomial(k, 2) + ln_factorial(n) - ln_factorial(n - (k - 1)) - k as f64 * (n as f64).ln())
        .exp()
}

/// P(at least one repeated item) = `1 - P(all distinct)`.
pub fn prob_any_collision(population_size: u64, sample_size: u64) -> f64 {
    1.0 - prob_all_distinct(population_size, sample_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn birthday_paradox() {
        let p = prob_any_collision(365, 23);
        assert!((p - 0.507_297).abs() < 1e-5, "got {p}");
    }

    #[test]
    fn small_cases_by_enumeration() {
        // N=3, k=3: 6 all-distinct, 18 one-pair, 3 triple out of 27.
        assert!((prob_all_distinct(3, 3) - 6.0 / 27.0).abs() < 1e-12);
        assert!((prob_exactly_one_pair(3, 3) - 18.0 / 27.0).abs() < 1e-12);
        // N=2, k=2
        assert!((prob_exactly_one_pair(2, 2) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn edges() {
        assert_eq!(prob_all_distinct(10, 0), 1.0);
        assert_eq!(prob_all_distinct(10, 11), 0.0);
        assert_eq!(prob_all_distinct(0, 1), 0.0);
        assert_eq!(prob_exactly_one_pair(10, 1), 0.0);
        assert_eq!(prob_exactly_one_pair(3, 5), 0.0);
        assert!((prob_exactly_one_pair(1, 2) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn reference_study_single_pair() {
        // 100 draws from 1024: one pair and 98 singles is rare but not negligible.
        let p = prob_exactly_one_pair(1024, 100);
        assert!(p > 0.0 && p < 0.05, "got {p}");
        assert!(prob_all_distinct(1024, 100) < p);
    }
}
