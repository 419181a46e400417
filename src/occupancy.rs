use rand::Rng;

use crate::config::{validate_probability, validate_shape};
use crate::error::ConfigError;
use crate::grid::Grid;

/// Sample an occupancy grid: each site is independently occupied with probability `p`.
///
/// Draws one uniform `f64` in `[0, 1)` per site in row-major order, so `p = 0`
/// leaves every site empty and `p = 1` fills every site.
pub fn sample<R: Rng>(
    nx: usize,
    ny: usize,
    p: f64,
    rng: &mut R,
) -> Result<Grid<bool>, ConfigError> {
    validate_shape(nx, ny)?;
    validate_probability(p)?;
    let mut grid = Grid::new(nx, ny);
    resample(&mut grid, p, rng);
    Ok(grid)
}

/// Refill an existing grid in place. `p` must already be validated.
pub fn resample<R: Rng>(grid: &mut Grid<bool>, p: f64, rng: &mut R) {
    debug_assert!((0.0..=1.0).contains(&p));
    for site in &mut grid.data {
        *site = rng.random::<f64>() < p;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Seed;

    #[test]
    fn extremes_are_deterministic() {
        let mut rng = Seed::Fixed(1).make_rng();
        assert_eq!(sample(6, 7, 0.0, &mut rng).unwrap().count_true(), 0);
        assert_eq!(sample(6, 7, 1.0, &mut rng).unwrap().count_true(), 42);
    }

    #[test]
    fn density_tracks_p() {
        let mut rng = Seed::Fixed(99).make_rng();
        let g = sample(200, 200, 0.3, &mut rng).unwrap();
        let frac = g.count_true() as f64 / g.len() as f64;
        assert!((frac - 0.3).abs() < 0.02, "occupied fraction {frac}");
    }

    #[test]
    fn rejects_bad_probability() {
        let mut rng = Seed::Fixed(1).make_rng();
        assert_eq!(
            sample(3, 3, 1.5, &mut rng),
            Err(ConfigError::InvalidProbability(1.5))
        );
    }

    #[test]
    fn shared_generator_advances_between_samples() {
        let mut rng = Seed::Fixed(5).make_rng();
        let a = sample(16, 16, 0.5, &mut rng).unwrap();
        let b = sample(16, 16, 0.5, &mut rng).unwrap();
        assert_ne!(a, b);
    }
}
