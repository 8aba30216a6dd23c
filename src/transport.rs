// Hardware abstraction boundary.
//
// The BLE stack and the Move Hub wire protocol live outside this crate and
// plug in through these traits. Commands resolve when the hub has accepted
// them, which says nothing about physical completion; discovering that is
// the controller's job.

use tokio::sync::mpsc;

use crate::messages::{HubEvent, LedColor, Port};

/// Errors surfaced by the hardware abstraction
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    Connect(String),

    #[error("command failed: {0}")]
    Command(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// Command surface of a connected hub.
///
/// Motor parameters are forwarded unchecked; out-of-range values are the
/// firmware's to reject, typically as a silent no-op.
pub trait HubTransport {
    /// Set the hub LED color.
    fn led(&mut self, color: LedColor) -> Result<()>;

    /// Run one motor for a number of seconds.
    fn motor_time(&mut self, port: Port, seconds: f64, duty_cycle: i8) -> Result<()>;

    /// Run both drive motors for a number of seconds.
    fn motor_time_multi(&mut self, seconds: f64, duty_cycle_a: i8, duty_cycle_b: i8)
    -> Result<()>;

    /// Turn one motor by a rotation angle in degrees.
    fn motor_angle(&mut self, port: Port, angle: f64, duty_cycle: i8) -> Result<()>;

    /// Turn both drive motors by a rotation angle in degrees.
    fn motor_angle_multi(&mut self, angle: f64, duty_cycle_a: i8, duty_cycle_b: i8)
    -> Result<()>;

    /// Ask the hub to drop the connection.
    fn disconnect(&mut self) -> Result<()>;
}

/// BLE scanner surface: connects to a discovered hub by address.
pub trait BleLink {
    type Transport: HubTransport;

    /// Connect to the hub at `address`, yielding its command surface and the
    /// channel its events will arrive on.
    fn connect(
        &mut self,
        address: &str,
    ) -> impl Future<Output = Result<(Self::Transport, mpsc::UnboundedReceiver<HubEvent>)>> + Send;
}
