//! Compass Heading Fusion and Smoothing

/// Raw headings retained for smoothing.
pub const HEADING_BUFFER_SIZE: usize = 10;

/// Buffered headings needed before the weighted average kicks in.
pub const MIN_SMOOTHING_SAMPLES: usize = 3;

/// Standard gravity (m/s²).
pub const STANDARD_GRAVITY: f32 = 9.806_65;

/// Squared acceleration below which the device is treated as in free fall.
///
/// Same g²/10 cut-off the Android rotation-matrix routine uses.
pub const FREE_FALL_THRESHOLD_SQ: f32 = STANDARD_GRAVITY * STANDARD_GRAVITY / 10.0;

/// Minimum norm of the east vector (gravity × field) for a usable fix (µT·m/s²).
///
/// Below this the field is too weak or nearly parallel to gravity.
pub const MIN_EAST_NORM: f32 = 0.1;

/// Degrees in a full turn.
pub const FULL_TURN_DEG: f32 = 360.0;
