//! Uniform sampling with replacement from a finite population.
//!
//! The population is the index set `0..population_size`. A [`Sample`] is an
//! ordered draw of `sample_size` indices, each independent and uniform.

use rand::Rng;
use rand::distr::{Distribution, Uniform};

use crate::error::{Error, Result};

/// One ordered draw from the population. Lives for a single trial.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sample(Vec<usize>);

impl Sample {
    pub fn new(items: Vec<usize>) -> Self {
        Self(items)
    }

    pub fn items(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<usize>> for Sample {
    fn from(items: Vec<usize>) -> Self {
        Self(items)
    }
}

/// Draws samples from `{0, …, population_size - 1}` with replacement.
#[derive(Debug, Clone)]
pub struct Sampler {
    population_size: usize,
    dist: Uniform<usize>,
}

impl Sampler {
    /// Build a sampler. Rejects an empty population.
    pub fn new(population_size: usize) -> Result<Self> {
        if population_size == 0 {
            return Err(Error::InvalidParameter(
                "population_size must be at least 1".to_string(),
            ));
        }
        let dist = Uniform::new(0, population_size).map_err(|e| {
            Error::InvalidParameter(format!("population_size={population_size}: {e}"))
        })?;
        Ok(Self {
            population_size,
            dist,
        })
    }

    pub fn population_size(&self) -> usize {
        self.population_size
    }

    /// Draw `sample_size` items. A zero-size draw returns an empty sample and
    /// consumes no randomness.
    pub fn draw<R: Rng + ?Sized>(&self, sample_size: usize, rng: &mut R) -> Sample {
        let items = (0..sample_size).map(|_| self.dist.sample(rng)).collect();
        Sample(items)
    }
}

/// One-shot convenience over [`Sampler::new`] + [`Sampler::draw`].
pub fn draw<R: Rng + ?Sized>(
    population_size: usize,
    sample_size: usize,
    rng: &mut R,
) -> Result<Sample> {
    Ok(Sampler::new(population_size)?.draw(sample_size, rng))
}
