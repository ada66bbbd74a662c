//! Basic Guidance Example
//!
//! Walks toward a tag and prints what a finder screen would show after each
//! scan result.
//!
//! ## What You'll Learn
//!
//! - Starting a scan session over an externally driven feed
//! - Feeding compass readings through the heading smoother
//! - Reading guidance from a concurrent reader handle
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_basic_guidance
//! ```

use bluefind_core::{
    session::PassiveBackend, CompassPoint, FinderConfig, HeadingSmoother, ManualClock,
    ScanSession,
};

fn main() {
    println!("BlueFind Basic Guidance Example");
    println!("===============================\n");

    let clock = ManualClock::new(0);

    // Phone lying flat, facing roughly east
    let mut compass = HeadingSmoother::default();
    compass.start();
    compass.on_accelerometer([0.0, 0.0, 9.81]);
    compass.on_magnetic_field([-30.0, 0.0, -40.0]);
    let heading = compass.heading();
    let point = CompassPoint::from_degrees(heading);
    println!("Heading: {:.0}° {} {}\n", heading, point.arrow(), point.name());

    let mut session = match ScanSession::new(
        FinderConfig::default(),
        Box::new(PassiveBackend),
        Box::new(clock.clone()),
    ) {
        Ok(session) => session.with_heading(compass.reader()),
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return;
        }
    };
    let reader = session.reader();

    if let Err(e) = session.start() {
        eprintln!("Could not start scanning: {}", e);
        return;
    }

    let tag = "C4:7C:8D:6A:12:01";
    for rssi in [-88, -85, -83, -78, -74, -70, -66, -61, -55, -48] {
        clock.advance(1_500);
        session.on_signal_sample(tag, rssi);

        let Some(guidance) = reader.latest_guidance(tag) else {
            continue;
        };
        println!(
            "{:>4} dBm  {} {:>5.1} m {:<6} {:<15} {:?}/{:?}  conf {:.2}",
            rssi,
            guidance.glyph,
            guidance.distance.distance_m,
            guidance.distance.accuracy,
            guidance.distance.label(),
            guidance.trend,
            guidance.quality,
            guidance.confidence,
        );
        println!("          {}", guidance.suggestion);
        println!("          {}", guidance.direction_text);
    }

    session.stop();
    println!("\nScan stopped, {} device(s) retained", reader.devices().len());
}
