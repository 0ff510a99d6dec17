// src/rng.rs
//! Random Sources for Monte Carlo Simulations
//!
//! # Design
//!
//! The engine never touches a global generator. Every simulation receives an
//! explicit random-source handle:
//! 1. **Reproducibility**: same seed gives the same draws in the same order
//! 2. **Parallel safety**: parallel path generation uses one substream per path
//! 3. **Bounded streams**: a pre-recorded stream reports exhaustion instead of
//!    wrapping around or panicking
//!
//! # Substream seeding
//!
//! Per-path substreams are seeded by a splitmix64 mix of `(base_seed, path_id)`:
//! ```text
//! z = base_seed + (path_id + 1) * 0x9e3779b97f4a7c15
//! z = (z ⊕ (z >> 30)) * 0xbf58476d1ce4e5b9
//! z = (z ⊕ (z >> 27)) * 0x94d049bb133111eb
//! seed = z ⊕ (z >> 31)
//! ```
//! so neighbouring base seeds do not share substreams.

use crate::error::{SdeError, SdeResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

/// A stream of independent standard normal draws.
pub trait NormalSource {
    /// Fill `out` with the next `out.len()` draws, in order.
    fn fill_normals(&mut self, out: &mut [f64]) -> SdeResult<()>;

    fn next_normal(&mut self) -> SdeResult<f64> {
        let mut z = [0.0];
        self.fill_normals(&mut z)?;
        Ok(z[0])
    }
}

impl NormalSource for StdRng {
    fn fill_normals(&mut self, out: &mut [f64]) -> SdeResult<()> {
        for z in out.iter_mut() {
            *z = get_normal_draw(self);
        }
        Ok(())
    }

    fn next_normal(&mut self) -> SdeResult<f64> {
        Ok(get_normal_draw(self))
    }
}

impl<S: NormalSource + ?Sized> NormalSource for &mut S {
    fn fill_normals(&mut self, out: &mut [f64]) -> SdeResult<()> {
        (**self).fill_normals(out)
    }

    fn next_normal(&mut self) -> SdeResult<f64> {
        (**self).next_normal()
    }
}

/// Bounded, pre-recorded stream of normal draws.
///
/// Useful for replaying the exact same draws through different simulation
/// schemes. A request that cannot be served in full fails with
/// [`SdeError::RandomSourceExhausted`] and consumes nothing.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    draws: Vec<f64>,
    cursor: usize,
}

impl ReplaySource {
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, cursor: 0 }
    }

    /// Record `count` draws from another source.
    pub fn record<S: NormalSource + ?Sized>(source: &mut S, count: usize) -> SdeResult<Self> {
        let mut draws = vec![0.0; count];
        source.fill_normals(&mut draws)?;
        Ok(Self::new(draws))
    }

    pub fn remaining(&self) -> usize {
        self.draws.len() - self.cursor
    }

    /// Rewind to the first draw.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }
}

impl NormalSource for ReplaySource {
    fn fill_normals(&mut self, out: &mut [f64]) -> SdeResult<()> {
        let available = self.remaining();
        if out.len() > available {
            return Err(SdeError::RandomSourceExhausted {
                requested: out.len(),
                available,
            });
        }
        let end = self.cursor + out.len();
        out.copy_from_slice(&self.draws[self.cursor..end]);
        self.cursor = end;
        Ok(())
    }
}

/// RNG factory for reproducible parallel simulations
#[derive(Debug, Clone, Copy)]
pub struct RngFactory {
    base_seed: u64,
}

impl RngFactory {
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed }
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Seed of substream `stream`
    pub fn stream_seed(&self, stream: u64) -> u64 {
        substream_seed(self.base_seed, stream)
    }

    /// Independent generator for one path
    pub fn path_rng(&self, path_id: u64) -> StdRng {
        StdRng::seed_from_u64(self.stream_seed(path_id))
    }
}

fn substream_seed(base_seed: u64, stream: u64) -> u64 {
    let mut z = base_seed.wrapping_add(stream.wrapping_add(1).wrapping_mul(0x9e3779b97f4a7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9u64);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111ebu64);
    z ^ (z >> 31)
}

pub fn seed_rng_from_u64(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn get_normal_draw<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    StandardNormal.sample(rng)
}
