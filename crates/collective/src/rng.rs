//! Seeded randomness.
//!
//! A population owns one [`SimRng`]. Each tick draws a [`TickSeed`] from it,
//! and every per-agent decision gets its own stream derived from that seed,
//! the phase, the round and the agent's slot. Streams never depend on which
//! thread runs them.

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

/// Seeded random number generator owned by a population
#[derive(Debug, Clone)]
pub struct SimRng(pub SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }

    /// Draws the seed for the next tick.
    pub fn next_tick_seed(&mut self) -> TickSeed {
        TickSeed(self.0.next_u64())
    }
}

impl RngCore for SimRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.0.try_fill_bytes(dest)
    }
}

/// Stream selector for randomness drawn inside a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Contagion,
    Decision,
    Refusal,
    Outcome,
}

impl Stream {
    fn tag(self) -> u64 {
        match self {
            Stream::Contagion => 0x11,
            Stream::Decision => 0x23,
            Stream::Refusal => 0x37,
            Stream::Outcome => 0x4b,
        }
    }
}

/// Root seed for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSeed(pub u64);

impl TickSeed {
    /// Independent generator for one (stream, round, slot) triple.
    pub fn stream(&self, stream: Stream, round: u32, slot: usize) -> SmallRng {
        let mut h = splitmix(self.0 ^ stream.tag().wrapping_mul(0xA24B_AED4_963E_E407));
        h = splitmix(h ^ u64::from(round));
        h = splitmix(h ^ slot as u64);
        SmallRng::seed_from_u64(h)
    }

    /// Uniform draw in `[0, 1)` from a fresh stream.
    pub fn roll(&self, stream: Stream, round: u32, slot: usize) -> f64 {
        self.stream(stream, round, slot).gen::<f64>()
    }
}

fn splitmix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
