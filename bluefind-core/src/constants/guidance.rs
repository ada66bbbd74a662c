//! Proximity Zones and Direction Octants

/// Lower RSSI bound (dBm, inclusive) of the first seven proximity zones,
/// closest first. Anything below the last breakpoint is the farthest zone.
pub const ZONE_BREAKPOINTS_DBM: [i32; 7] = [-45, -55, -65, -75, -85, -95, -105];

/// Upper bounds (degrees, exclusive) of the relative direction octants,
/// measured clockwise from straight ahead. `[0, 30)` and `[330, 360)` are
/// both "ahead".
pub const OCTANT_BOUNDS_DEG: [f32; 8] = [30.0, 60.0, 120.0, 150.0, 210.0, 240.0, 300.0, 330.0];
