// End-to-end walkthrough against a simulated hub: discovery, LED colors,
// a short drive and turn, disconnect.
//
// Run with: cargo run --example led_cycle
// (set RUST_LOG=debug to watch the command traffic)

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use movehub::transport::Result;
use movehub::{
    BleLink, Boost, HubDetails, HubEvent, HubTransport, LedColor, LinkEvent, MotorConfiguration,
    Port,
};

/// Stands in for the BLE stack plus a hub: acknowledges every command and
/// emits plausible rotation events so stability waits resolve.
struct SimulatedHub {
    events: mpsc::UnboundedSender<HubEvent>,
}

impl SimulatedHub {
    fn report_rotation(&self, port: Port, angle: f64) {
        let events = self.events.clone();
        tokio::spawn(async move {
            for step in 1..=3 {
                tokio::time::sleep(Duration::from_millis(120)).await;
                let _ = events.send(HubEvent::Rotation {
                    port,
                    angle: (angle as i32) * step / 3,
                });
            }
        });
    }
}

impl HubTransport for SimulatedHub {
    fn led(&mut self, color: LedColor) -> Result<()> {
        info!(?color, "sim: led");
        Ok(())
    }

    fn motor_time(&mut self, port: Port, seconds: f64, duty_cycle: i8) -> Result<()> {
        info!(?port, seconds, duty_cycle, "sim: motor by time");
        Ok(())
    }

    fn motor_time_multi(&mut self, seconds: f64, duty_a: i8, duty_b: i8) -> Result<()> {
        info!(seconds, duty_a, duty_b, "sim: motors by time");
        Ok(())
    }

    fn motor_angle(&mut self, port: Port, angle: f64, duty_cycle: i8) -> Result<()> {
        info!(?port, angle, duty_cycle, "sim: motor by angle");
        self.report_rotation(port, angle);
        Ok(())
    }

    fn motor_angle_multi(&mut self, angle: f64, duty_a: i8, duty_b: i8) -> Result<()> {
        info!(angle, duty_a, duty_b, "sim: motors by angle");
        self.report_rotation(Port::AB, angle);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        let _ = self.events.send(HubEvent::Disconnect);
        Ok(())
    }
}

struct SimulatedLink;

impl BleLink for SimulatedLink {
    type Transport = SimulatedHub;

    async fn connect(
        &mut self,
        address: &str,
    ) -> Result<(SimulatedHub, mpsc::UnboundedReceiver<HubEvent>)> {
        info!(address, "sim: connecting");
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(HubEvent::Connected);
        Ok((SimulatedHub { events: tx }, rx))
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let (link_tx, link_rx) = mpsc::unbounded_channel();
    link_tx.send(LinkEvent::BleReady(true))?;
    link_tx.send(LinkEvent::HubFound(HubDetails {
        uuid: "001653deadbeef".into(),
        address: "00:16:53:de:ad:be".into(),
        local_name: "LEGO Move Hub".into(),
    }))?;

    let mut boost = Boost::new(SimulatedLink, link_rx);
    let hub = boost.get_hub(MotorConfiguration::car()).await?;
    info!(config = ?hub.configuration(), "connected");

    let mut events = hub.events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!(?event, "hub event");
        }
    });

    for color in [LedColor::Red, LedColor::Yellow, LedColor::Green] {
        hub.led(color).await?;
    }

    hub.drive(20.0, true).await?;
    hub.turn(90.0, true).await?;
    hub.disconnect().await?;
    info!("done");

    Ok(())
}
