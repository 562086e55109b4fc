use repeatlab_stats::binomial_point_probabilities;

use super::fail;

pub fn run(trials: u64, p: f64) {
    let pmf = binomial_point_probabilities(trials, p)
        .unwrap_or_else(|e| fail("Invalid binomial parameters", e));

    println!("Binomial(n={trials}, p={p}):");
    println!("  {:>4} {:>14} {:>14}", "k", "P(K = k)", "P(K <= k)");
    let mut cumulative = 0.0;
    for (k, prob) in pmf.iter().enumerate() {
        cumulative += prob;
        println!("  {k:>4} {prob:>14.8} {:>14.8}", cumulative.min(1.0));
    }
}
