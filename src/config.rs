// Motor mapping and unit configuration for the Move Hub drive base.

use serde::{Deserialize, Serialize};

/// Errors raised while building a motor configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("'{0}' is not a drive motor port (expected 'A' or 'B')")]
    InvalidPort(char),

    #[error("left and right motor can not be the same port")]
    SamePort,
}

/// Internal motor ports that can drive the base (external ports C and D
/// carry auxiliary motors only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotorPort {
    A,
    B,
}

impl TryFrom<char> for MotorPort {
    type Error = ConfigError;

    fn try_from(letter: char) -> Result<Self, ConfigError> {
        match letter {
            'A' => Ok(MotorPort::A),
            'B' => Ok(MotorPort::B),
            other => Err(ConfigError::InvalidPort(other)),
        }
    }
}

/// Which internal motor drives which side of the robot.
///
/// Validated at construction and immutable afterwards: both sides must be
/// drive ports and they can not share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorConfiguration {
    pub left: MotorPort,
    pub right: MotorPort,
}

impl MotorConfiguration {
    pub fn new(left: MotorPort, right: MotorPort) -> Result<Self, ConfigError> {
        if left == right {
            return Err(ConfigError::SamePort);
        }
        Ok(Self { left, right })
    }

    /// Build a configuration from port letters, e.g. `('B', 'A')`.
    pub fn from_ports(left: char, right: char) -> Result<Self, ConfigError> {
        Self::new(left.try_into()?, right.try_into()?)
    }

    /// Car models drive with the left motor on port B. This is the default.
    pub fn car() -> Self {
        Self {
            left: MotorPort::B,
            right: MotorPort::A,
        }
    }

    /// Vernie has the motors mirrored: left motor on port A.
    pub fn vernie() -> Self {
        Self {
            left: MotorPort::A,
            right: MotorPort::B,
        }
    }
}

impl Default for MotorConfiguration {
    fn default() -> Self {
        Self::car()
    }
}

/// Measurement system applied to drive distances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitMode {
    #[default]
    Metric,
    Imperial,
}
