//! Shared generators for integration tests
//!
//! - Deterministic RNG (xorshift) so failures reproduce
//! - RSSI walks toward and away from a device
//! - Jittery compass headings and raw sensor vectors

#![allow(dead_code)]

use bluefind_core::{SignalSample, Timestamp};

/// Gravity along +z, phone lying flat
pub const FLAT_GRAVITY: [f32; 3] = [0.0, 0.0, 9.81];

/// Deterministic pseudo-random source
pub struct TestRng {
    state: u32,
}

impl TestRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_u32(&mut self) -> u32 {
        // Xorshift algorithm
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        self.state
    }

    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / 16777216.0
    }

    pub fn gen_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Integer in `[-spread, spread]`
    pub fn jitter(&mut self, spread: i32) -> i32 {
        (self.next_u32() % (2 * spread as u32 + 1)) as i32 - spread
    }
}

/// Samples for `device` from `rssis`, one every `interval_ms` from `start`
pub fn samples(device: &str, rssis: &[i32], start: Timestamp, interval_ms: u64) -> Vec<SignalSample> {
    rssis
        .iter()
        .enumerate()
        .map(|(i, rssi)| SignalSample::new(device, *rssi, start + i as u64 * interval_ms))
        .collect()
}

/// Walk from `from` to `to` dBm in `steps` readings with ±`jitter` noise
pub fn walk(rng: &mut TestRng, from: i32, to: i32, steps: usize, jitter: i32) -> Vec<i32> {
    let span = (to - from) as f32;
    (0..steps)
        .map(|i| {
            let t = if steps > 1 { i as f32 / (steps - 1) as f32 } else { 0.0 };
            from + (span * t) as i32 + rng.jitter(jitter)
        })
        .collect()
}

/// Walking toward a device
pub fn approach_walk(rng: &mut TestRng, steps: usize) -> Vec<i32> {
    walk(rng, -90, -45, steps, 1)
}

/// Walking away from a device
pub fn recede_walk(rng: &mut TestRng, steps: usize) -> Vec<i32> {
    walk(rng, -45, -90, steps, 1)
}

/// Headings around `center` with ±`spread` degrees noise, wrapped
pub fn jittery_headings(rng: &mut TestRng, center: f32, spread: f32, count: usize) -> Vec<f32> {
    (0..count)
        .map(|_| (center + rng.gen_range(-spread, spread) + 360.0) % 360.0)
        .collect()
}

/// Horizontal magnetic field for a flat phone facing `azimuth_deg`
///
/// North is device +y at azimuth 0; the vertical component points down.
pub fn magnetic_field_for(azimuth_deg: f32) -> [f32; 3] {
    let a = azimuth_deg.to_radians();
    let strength = 30.0;
    [-strength * a.sin(), strength * a.cos(), -40.0]
}
