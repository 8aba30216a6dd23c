//! Async control layer for the LEGO Boost Move Hub.
//!
//! Translates high-level motion intents (drive N centimeters, turn N
//! degrees, drive until an obstacle, spin until clear) into hub motor
//! commands and exposes them as awaitable operations that resolve when the
//! motion has actually finished, not merely when the command was
//! transmitted. The hub never reports completion, so it is inferred by
//! polling the rotation and distance events the hub emits on its own.
//!
//! The BLE stack and the hub wire protocol are external collaborators:
//! plug them in through [`transport::BleLink`] and
//! [`transport::HubTransport`], then walk the discovery chain with
//! [`Boost::get_hub`].

pub mod boost;
pub mod config;
pub mod hub;
pub mod messages;
pub mod motion;
pub mod poll;
pub mod transport;

pub use boost::{Boost, LinkState};
pub use config::{ConfigError, MotorConfiguration, MotorPort, UnitMode};
pub use hub::{DeferredStop, Hub, HubError, HubState, PortAngles, SETTLE_DELAY};
pub use messages::{ConnectionState, HubDetails, HubEvent, LedColor, LinkEvent, Port};
pub use transport::{BleLink, HubTransport, TransportError};
