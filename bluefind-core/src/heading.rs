//! Compass Heading from Accelerometer + Magnetometer
//!
//! ## Pipeline
//!
//! ```text
//! accelerometer ─┐
//!                ├─→ rotation matrix ─→ azimuth ─→ [raw buffer ≤10] ─→ weighted mean ─→ published heading
//! magnetometer ──┘
//! ```
//!
//! ### Fusion
//!
//! The two vectors arrive independently and in any order. Each arrival
//! replaces the stored vector of its kind; fusion runs only once both kinds
//! have been seen. The rotation matrix is built from
//!
//! ```text
//! H = E × A   (east, device frame)
//! M = A × H   (north, device frame)
//! R = [H; M; A]   (rows, each normalized)
//! azimuth = atan2(R[0][1], R[1][1])
//! ```
//!
//! and is rejected when the device is in free fall (|A|² < g²/10) or the
//! field is nearly parallel to gravity (|H| < 0.1).
//!
//! ### Smoothing
//!
//! Up to ten raw headings are buffered. From three onward the published
//! heading is the linearly weighted mean (oldest weight 1, newest weight
//! `len`); below three the raw heading passes through unchanged.
//!
//! The mean is taken on the raw degree values. It is bounded by the
//! buffered extremes, which also means readings straddling north
//! (350°, 10°) average toward south.
//!
//! ### Publication
//!
//! The smoothed heading is stored in a [`SharedHeading`], an atomic cell
//! that any number of [`HeadingReader`]s can poll without locking.

use alloc::sync::Arc;
use core::f32::consts::PI;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::buffer::CircularBuffer;
use crate::config::HeadingConfig;
use crate::constants::heading::*;

/// Three-axis sensor vector in the device frame
pub type Vector3 = [f32; 3];

/// One orientation sensor event
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OrientationSample {
    /// Accelerometer reading (m/s²)
    Accelerometer(Vector3),
    /// Magnetic field reading (µT)
    MagneticField(Vector3),
}

/// Device orientation in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Orientation {
    /// Heading in [0, 360), clockwise from magnetic north
    pub azimuth_deg: f32,
    /// Rotation about the device x axis
    pub pitch_deg: f32,
    /// Rotation about the device y axis
    pub roll_deg: f32,
}

/// Published heading state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HeadingState {
    /// Heading in [0, 360)
    pub degrees: f32,
}

/// Cardinal direction for the compass rose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompassPoint {
    /// [315, 45)
    North,
    /// [45, 135)
    East,
    /// [135, 225)
    South,
    /// [225, 315)
    West,
}

impl CompassPoint {
    /// Cardinal point containing `degrees`
    pub fn from_degrees(degrees: f32) -> Self {
        let d = normalize_degrees(degrees);
        if d < 45.0 || d >= 315.0 {
            CompassPoint::North
        } else if d < 135.0 {
            CompassPoint::East
        } else if d < 225.0 {
            CompassPoint::South
        } else {
            CompassPoint::West
        }
    }

    /// Name for display
    pub const fn name(&self) -> &'static str {
        match self {
            CompassPoint::North => "North",
            CompassPoint::East => "East",
            CompassPoint::South => "South",
            CompassPoint::West => "West",
        }
    }

    /// Arrow glyph for display
    pub const fn arrow(&self) -> &'static str {
        match self {
            CompassPoint::North => "↑",
            CompassPoint::East => "→",
            CompassPoint::South => "↓",
            CompassPoint::West => "←",
        }
    }
}

/// Map any angle to [0, 360)
pub fn normalize_degrees(degrees: f32) -> f32 {
    let d = ((degrees % FULL_TURN_DEG) + FULL_TURN_DEG) % FULL_TURN_DEG;
    // -1e-6 + 360 rounds to 360 in f32
    if d >= FULL_TURN_DEG {
        0.0
    } else {
        d
    }
}

fn to_degrees(radians: f32) -> f32 {
    radians * 180.0 / PI
}

/// Fuse gravity and geomagnetic vectors into an orientation
///
/// Returns `None` when the device is in free fall or the field is too weak
/// or too close to vertical for a usable east vector.
pub fn fuse_orientation(gravity: Vector3, geomagnetic: Vector3) -> Option<Orientation> {
    let [ax, ay, az] = gravity;
    let [ex, ey, ez] = geomagnetic;

    let norm_sq_a = ax * ax + ay * ay + az * az;
    if !(norm_sq_a >= FREE_FALL_THRESHOLD_SQ) {
        return None;
    }

    let mut hx = ey * az - ez * ay;
    let mut hy = ez * ax - ex * az;
    let mut hz = ex * ay - ey * ax;
    let norm_h = libm::sqrtf(hx * hx + hy * hy + hz * hz);
    if !(norm_h >= MIN_EAST_NORM) {
        return None;
    }

    let inv_h = 1.0 / norm_h;
    hx *= inv_h;
    hy *= inv_h;
    hz *= inv_h;

    let inv_a = 1.0 / libm::sqrtf(norm_sq_a);
    let (ax, ay, az) = (ax * inv_a, ay * inv_a, az * inv_a);

    // R = [hx hy hz; mx my mz; ax ay az], only my is needed
    let my = az * hx - ax * hz;

    let azimuth = libm::atan2f(hy, my);
    let pitch = libm::asinf((-ay).clamp(-1.0, 1.0));
    let roll = libm::atan2f(-ax, az);

    Some(Orientation {
        azimuth_deg: normalize_degrees(to_degrees(azimuth)),
        pitch_deg: to_degrees(pitch),
        roll_deg: to_degrees(roll),
    })
}

/// Linearly weighted mean, oldest weight 1 and newest weight `len`
pub fn weighted_mean<'a>(values: impl Iterator<Item = &'a f32>) -> Option<f32> {
    let (sum, weights) = values
        .enumerate()
        .fold((0.0f32, 0.0f32), |(sum, weights), (i, v)| {
            let w = (i + 1) as f32;
            (sum + v * w, weights + w)
        });

    if weights == 0.0 {
        None
    } else {
        Some(sum / weights)
    }
}

/// Lock-free heading cell written by one smoother, read by many
#[derive(Debug, Clone, Default)]
pub struct SharedHeading {
    bits: Arc<AtomicU32>,
}

impl SharedHeading {
    /// Cell holding 0°
    pub fn new() -> Self {
        Self::default()
    }

    fn publish(&self, degrees: f32) {
        self.bits.store(degrees.to_bits(), Ordering::Release);
    }

    /// Read-only handle
    pub fn reader(&self) -> HeadingReader {
        HeadingReader {
            bits: Arc::clone(&self.bits),
        }
    }
}

/// Read-only view of a [`SharedHeading`]
///
/// `HeadingReader::default()` is detached and always reads 0°.
#[derive(Debug, Clone, Default)]
pub struct HeadingReader {
    bits: Arc<AtomicU32>,
}

impl HeadingReader {
    /// Latest published heading
    pub fn current(&self) -> HeadingState {
        HeadingState {
            degrees: f32::from_bits(self.bits.load(Ordering::Acquire)),
        }
    }

    /// Latest published heading in degrees
    pub fn degrees(&self) -> f32 {
        self.current().degrees
    }
}

/// Stabilized compass heading
///
/// The only writer of its [`SharedHeading`]. Sensor events should be
/// delivered from a single serialized path.
#[derive(Debug)]
pub struct HeadingSmoother {
    config: HeadingConfig,
    accelerometer: Option<Vector3>,
    magnetic_field: Option<Vector3>,
    raw: CircularBuffer<f32, HEADING_BUFFER_SIZE>,
    orientation: Option<Orientation>,
    listening: bool,
    shared: SharedHeading,
}

impl Default for HeadingSmoother {
    fn default() -> Self {
        Self::new(HeadingConfig::default())
    }
}

impl HeadingSmoother {
    /// Stopped smoother publishing 0°
    pub fn new(config: HeadingConfig) -> Self {
        Self {
            config,
            accelerometer: None,
            magnetic_field: None,
            raw: CircularBuffer::new(),
            orientation: None,
            listening: false,
            shared: SharedHeading::new(),
        }
    }

    /// Begin accepting sensor events
    pub fn start(&mut self) {
        self.listening = true;
        log_debug!("Heading smoother started");
    }

    /// Stop accepting events and drop buffered raw headings
    ///
    /// The published heading keeps its last value.
    pub fn stop(&mut self) {
        self.listening = false;
        self.raw.clear();
        log_debug!("Heading smoother stopped, smoothing buffer cleared");
    }

    /// Whether events are being accepted
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Ingest one sensor event, returning the newly published heading
    pub fn on_orientation_sample(&mut self, sample: OrientationSample) -> Option<f32> {
        if !self.listening {
            return None;
        }

        match sample {
            OrientationSample::Accelerometer(v) => self.accelerometer = Some(v),
            OrientationSample::MagneticField(v) => self.magnetic_field = Some(v),
        }

        let (Some(gravity), Some(field)) = (self.accelerometer, self.magnetic_field) else {
            return None;
        };

        match fuse_orientation(gravity, field) {
            Some(orientation) => {
                self.orientation = Some(orientation);
                Some(self.push_raw_heading(orientation.azimuth_deg))
            }
            None => {
                log_debug!("Orientation fusion rejected (free fall or weak field)");
                None
            }
        }
    }

    /// Shorthand for an accelerometer event
    pub fn on_accelerometer(&mut self, v: Vector3) -> Option<f32> {
        self.on_orientation_sample(OrientationSample::Accelerometer(v))
    }

    /// Shorthand for a magnetic field event
    pub fn on_magnetic_field(&mut self, v: Vector3) -> Option<f32> {
        self.on_orientation_sample(OrientationSample::MagneticField(v))
    }

    /// Buffer an already-fused raw heading and publish the smoothed value
    ///
    /// For platforms that deliver azimuth directly.
    pub fn push_raw_heading(&mut self, degrees: f32) -> f32 {
        let degrees = normalize_degrees(degrees);
        self.raw.push(degrees);

        let heading = if self.raw.len() >= self.config.min_smoothing_samples {
            weighted_mean(self.raw.iter()).unwrap_or(degrees)
        } else {
            degrees
        };

        self.shared.publish(heading);
        heading
    }

    /// Current published heading in degrees
    pub fn heading(&self) -> f32 {
        self.shared.reader().degrees()
    }

    /// Last successful orientation fix
    pub fn orientation(&self) -> Option<Orientation> {
        self.orientation
    }

    /// Raw headings currently buffered
    pub fn buffered(&self) -> usize {
        self.raw.len()
    }

    /// Handle for concurrent readers
    pub fn reader(&self) -> HeadingReader {
        self.shared.reader()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const G: f32 = 9.81;

    fn approx(a: f32, b: f32, tol: f32) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn flat_device_pointing_north() {
        let o = fuse_orientation([0.0, 0.0, G], [0.0, 30.0, -40.0]).unwrap();
        assert!(approx(o.azimuth_deg, 0.0, 0.01) || approx(o.azimuth_deg, 360.0, 0.01));
        assert!(approx(o.pitch_deg, 0.0, 0.01));
        assert!(approx(o.roll_deg, 0.0, 0.01));
    }

    #[test]
    fn flat_device_pointing_east() {
        // North lies along the device's -x axis
        let o = fuse_orientation([0.0, 0.0, G], [-30.0, 0.0, -40.0]).unwrap();
        assert!(approx(o.azimuth_deg, 90.0, 0.01), "got {}", o.azimuth_deg);
    }

    #[test]
    fn flat_device_pointing_west() {
        let o = fuse_orientation([0.0, 0.0, G], [30.0, 0.0, -40.0]).unwrap();
        assert!(approx(o.azimuth_deg, 270.0, 0.01), "got {}", o.azimuth_deg);
    }

    #[test]
    fn rejects_free_fall_and_vertical_field() {
        assert!(fuse_orientation([0.0, 0.0, 0.5], [0.0, 30.0, -40.0]).is_none());
        assert!(fuse_orientation([0.0, 0.0, G], [0.0, 0.0, -40.0]).is_none());
    }

    #[test]
    fn normalizes_angles() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
        assert_eq!(normalize_degrees(359.5), 359.5);
        assert!(normalize_degrees(-1e-6) < 360.0);
    }

    #[test]
    fn waits_for_both_vectors() {
        let mut smoother = HeadingSmoother::default();
        smoother.start();

        assert_eq!(smoother.on_accelerometer([0.0, 0.0, G]), None);
        assert_eq!(smoother.on_accelerometer([0.0, 0.0, G]), None);
        let heading = smoother.on_magnetic_field([-30.0, 0.0, -40.0]).unwrap();
        assert!(approx(heading, 90.0, 0.01));
    }

    #[test]
    fn ignores_events_while_stopped() {
        let mut smoother = HeadingSmoother::default();
        assert_eq!(smoother.on_accelerometer([0.0, 0.0, G]), None);
        smoother.start();
        assert_eq!(smoother.on_magnetic_field([-30.0, 0.0, -40.0]), None);
    }

    #[test]
    fn passes_through_below_three_samples() {
        let mut smoother = HeadingSmoother::default();
        assert_eq!(smoother.push_raw_heading(10.0), 10.0);
        assert_eq!(smoother.push_raw_heading(50.0), 50.0);
    }

    #[test]
    fn weights_newest_heaviest() {
        let mut smoother = HeadingSmoother::default();
        smoother.push_raw_heading(10.0);
        smoother.push_raw_heading(20.0);
        let h = smoother.push_raw_heading(40.0);
        // (10·1 + 20·2 + 40·3) / 6
        assert!(approx(h, 170.0 / 6.0, 1e-4));
        assert!(approx(smoother.heading(), h, 1e-6));
    }

    #[test]
    fn buffer_holds_ten() {
        let mut smoother = HeadingSmoother::default();
        for i in 0..25 {
            smoother.push_raw_heading(i as f32);
        }
        assert_eq!(smoother.buffered(), HEADING_BUFFER_SIZE);
    }

    #[test]
    fn stop_keeps_heading_clears_buffer() {
        let mut smoother = HeadingSmoother::default();
        smoother.start();
        for h in [100.0, 110.0, 120.0] {
            smoother.push_raw_heading(h);
        }
        let before = smoother.heading();
        smoother.stop();

        assert_eq!(smoother.buffered(), 0);
        assert_eq!(smoother.heading(), before);
        // fresh buffer: next reading passes through
        assert_eq!(smoother.push_raw_heading(200.0), 200.0);
    }

    #[test]
    fn readers_see_published_heading() {
        let mut smoother = HeadingSmoother::default();
        let reader = smoother.reader();
        smoother.push_raw_heading(123.0);
        assert_eq!(reader.degrees(), 123.0);
    }

    #[test]
    fn compass_points() {
        assert_eq!(CompassPoint::from_degrees(350.0), CompassPoint::North);
        assert_eq!(CompassPoint::from_degrees(44.9), CompassPoint::North);
        assert_eq!(CompassPoint::from_degrees(45.0), CompassPoint::East);
        assert_eq!(CompassPoint::from_degrees(180.0), CompassPoint::South);
        assert_eq!(CompassPoint::from_degrees(-45.0).name(), "North");
        assert_eq!(CompassPoint::from_degrees(300.0).arrow(), "←");
    }
}
