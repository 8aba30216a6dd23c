// Event and detail types crossing the hardware abstraction boundary.

use serde::{Deserialize, Serialize};

/// Logical connectors on the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Port {
    A,
    B,
    /// Both internal drive motors addressed together
    AB,
    C,
    D,
    Led,
}

/// Colors accepted by the hub LED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedColor {
    Off,
    Pink,
    Purple,
    Blue,
    LightBlue,
    Cyan,
    Green,
    Yellow,
    Orange,
    Red,
    White,
}

/// Identity of a discovered hub, as advertised over BLE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubDetails {
    pub uuid: String,
    pub address: String,
    pub local_name: String,
}

/// Events emitted by a connected hub.
///
/// Rotation angles are a monotonic counter in motor degrees; distance is in
/// raw sensor units and decreases as an obstacle nears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HubEvent {
    Rotation { port: Port, angle: i32 },
    Distance(f64),
    Connected,
    Disconnect,
}

/// Events emitted by the BLE scanner before any hub connection exists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LinkEvent {
    BleReady(bool),
    HubFound(HubDetails),
}

/// Connection lifecycle of one hub instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Connecting,
    Connected,
    Disconnected,
}
