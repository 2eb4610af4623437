//! Random draws shared by the genetic operators.
//!
//! Generators are always passed in by the caller.
use rand::Rng;

/// Returns `±deviation × uniform[0, 1)`, with the
/// sign chosen by a fair coin toss.
pub(crate) fn signed_deviation<R: Rng + ?Sized>(rng: &mut R, deviation: f64) -> f64 {
    let magnitude = deviation * rng.gen::<f64>();
    if rng.gen::<bool>() {
        magnitude
    } else {
        -magnitude
    }
}

/// Bernoulli trial: `true` with probability `chance`.
///
/// A chance of `0.0` never succeeds and one
/// of `1.0` always does.
pub(crate) fn gen_chance<R: Rng + ?Sized>(rng: &mut R, chance: f64) -> bool {
    rng.gen::<f64>() < chance
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn deviation_is_bounded_and_signed() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let draws: Vec<f64> = (0..1000).map(|_| signed_deviation(&mut rng, 0.25)).collect();
        assert!(draws.iter().all(|d| d.abs() < 0.25));
        assert!(draws.iter().any(|d| *d > 0.0));
        assert!(draws.iter().any(|d| *d < 0.0));
    }

    #[test]
    fn chance_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!((0..1000).all(|_| !gen_chance(&mut rng, 0.0)));
        assert!((0..1000).all(|_| gen_chance(&mut rng, 1.0)));
    }
}
