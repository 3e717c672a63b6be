//! Walks a simulated path through a site and prints every event.
//!
//! Run with: cargo run --example simulation_walk

use indoor_positioning::{Event, IndoorPositioning, Mode};
use std::time::{Duration, Instant};

fn main() {
    env_logger::init();

    let site = serde_json::json!({
        "site_id": "demo-store",
        "origin": { "latitude": 51.4416, "longitude": 5.4697, "altitude": 18.0 },
        "floors": [0, 1],
        "simulation": {
            "waypoints": [
                { "latitude": 51.44160, "longitude": 5.46970, "floor_level": 0 },
                { "latitude": 51.44165, "longitude": 5.46985, "floor_level": 0 },
                { "latitude": 51.44172, "longitude": 5.46985, "floor_level": 1 },
                { "latitude": 51.44172, "longitude": 5.46968, "floor_level": 1 }
            ],
            "step_interval_ms": 200,
            "speed_mps": 1.4
        }
    })
    .to_string();

    let positioning = IndoorPositioning::shared();
    println!("indoor-positioning {}", positioning.version());

    positioning.set_mode(Mode::Simulation).expect("set mode");
    positioning
        .set_configuration(Some(site))
        .expect("set configuration");

    let subscription = positioning.subscribe();
    positioning.start().expect("start");

    let until = Instant::now() + Duration::from_secs(10);
    while Instant::now() < until {
        match subscription.next_timeout(Duration::from_millis(500)) {
            Some(Event::LocationUpdate(location)) => {
                println!(
                    "location: {:.6}, {:.6} floor {:?} (±{:.1}m, {})",
                    location.latitude,
                    location.longitude,
                    location.floor_level,
                    location.horizontal_accuracy,
                    location.expected_accuracy.label()
                );
            }
            Some(Event::HeadingUpdate(heading)) => {
                println!(
                    "heading: {:.1}° true north, {:.1}° from start",
                    heading.degrees, heading.arbitrary_north_degrees
                );
            }
            Some(Event::Failure { error, .. }) => {
                eprintln!("error {}: {}", error.code(), error);
                break;
            }
            Some(Event::Log { message, .. }) => {
                println!("log: {}", message);
            }
            None => {}
        }
    }

    positioning.stop().expect("stop");
    println!("stopped, running = {}", positioning.running());
}
