// Motion translation for the Move Hub drive base.
// Converts requested distances and turn degrees into motor rotation angles
// and signed duty cycles, honoring the configured left/right mapping.

use crate::config::{MotorConfiguration, MotorPort, UnitMode};

/// Empirical wheel factor: motor degrees per centimeter of travel
pub const METRIC_MODIFIER: f64 = 28.5;

/// Imperial factor, tuned as a quarter of the metric one rather than a
/// literal cm/inch conversion
pub const IMPERIAL_MODIFIER: f64 = METRIC_MODIFIER / 4.0;

/// Motor degrees per degree of in-place robot rotation
pub const TURN_MODIFIER: f64 = 2.56;

/// Duty cycle magnitude used for driving
pub const DRIVE_SPEED: i8 = 25;

/// Duty cycle magnitude used for turning
pub const TURN_SPEED: i8 = 20;

/// Default sensor reading treated as "obstacle ahead"
pub const DEFAULT_STOP_DISTANCE: f64 = 105.0;

/// Default sensor reading treated as "path is clear"
pub const DEFAULT_CLEAR_DISTANCE: f64 = 120.0;

// Zero maps to reverse; the zero-angle stop commands rely on this.
fn direction(value: f64) -> i8 {
    if value > 0.0 { 1 } else { -1 }
}

/// Convert a drive distance to a motor rotation angle in degrees.
pub fn distance_to_angle(distance: f64, units: UnitMode, friction: f64) -> f64 {
    let modifier = match units {
        UnitMode::Metric => METRIC_MODIFIER,
        UnitMode::Imperial => IMPERIAL_MODIFIER,
    };
    distance.abs() * modifier * friction
}

/// Duty cycles for ports A and B when driving straight.
///
/// Both ports receive the same scalar: the sign follows the requested
/// direction and flips when port A is not mapped as the left motor.
pub fn drive_duty_cycles(distance: f64, config: &MotorConfiguration) -> (i8, i8) {
    let flip = if config.left == MotorPort::A { 1 } else { -1 };
    let duty = DRIVE_SPEED * direction(distance) * flip;
    (duty, duty)
}

/// Convert a robot turn in degrees to a motor rotation angle.
pub fn turn_angle(degrees: f64) -> f64 {
    degrees.abs() * TURN_MODIFIER
}

/// Duty cycles for ports A and B for an in-place turn.
///
/// Differential drive: the left-mapped motor runs with the turn direction,
/// the right-mapped motor against it.
pub fn turn_duty_cycles(degrees: f64, config: &MotorConfiguration) -> (i8, i8) {
    let left = TURN_SPEED * direction(degrees);
    let right = -left;
    match config.left {
        MotorPort::A => (left, right),
        MotorPort::B => (right, left),
    }
}
