// Connection bootstrap: scan -> ready -> found -> connect.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::MotorConfiguration;
use crate::hub::{Hub, HubError, Result};
use crate::messages::{HubDetails, LinkEvent};
use crate::poll;
use crate::transport::BleLink;

/// Scanner-side state rebuilt from link events
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkState {
    pub ble_ready: Option<bool>,
    pub hub_details: Option<HubDetails>,
}

/// Entry point: wraps a BLE link and walks the discovery chain up to a
/// connected [`Hub`].
pub struct Boost<L: BleLink> {
    link: L,
    state: watch::Receiver<LinkState>,
    events: broadcast::Sender<LinkEvent>,
    pump: JoinHandle<()>,
}

impl<L: BleLink> Boost<L>
where
    L::Transport: Send + 'static,
{
    /// Wrap a BLE link and the channel its scanner events arrive on.
    pub fn new(link: L, events: mpsc::UnboundedReceiver<LinkEvent>) -> Self {
        let (state_tx, state_rx) = watch::channel(LinkState::default());
        let (event_tx, _) = broadcast::channel(16);
        let pump = spawn_pump(events, state_tx, event_tx.clone());
        Self {
            link,
            state: state_rx,
            events: event_tx,
            pump,
        }
    }

    /// Subscribe to the raw scanner events (ble-ready, hub-found).
    pub fn events(&self) -> broadcast::Receiver<LinkEvent> {
        self.events.subscribe()
    }

    /// Resolve once the adapter has reported readiness; errors if it came
    /// up unavailable.
    pub async fn ble_ready(&self) -> Result<bool> {
        let state =
            poll::await_condition(&self.state, |s| s.ble_ready.is_some(), Duration::ZERO).await;
        match state.ble_ready {
            Some(true) => Ok(true),
            _ => Err(HubError::BleUnavailable),
        }
    }

    /// Resolve with the details of the first discovered hub.
    pub async fn hub_found(&self) -> HubDetails {
        loop {
            let state =
                poll::await_condition(&self.state, |s| s.hub_details.is_some(), Duration::ZERO)
                    .await;
            if let Some(details) = state.hub_details {
                return details;
            }
        }
    }

    /// Connect to a discovered hub and wait for the connection to be
    /// reported live.
    pub async fn connect(
        &mut self,
        details: &HubDetails,
        config: MotorConfiguration,
    ) -> Result<Hub<L::Transport>> {
        info!(address = %details.address, name = %details.local_name, "connecting");
        let (transport, events) = self.link.connect(&details.address).await?;
        let hub = Hub::new(transport, events, config);
        hub.wait_connected().await;
        Ok(hub)
    }

    /// Full discovery chain: wait for the adapter, wait for a hub to be
    /// found, connect to it.
    pub async fn get_hub(&mut self, config: MotorConfiguration) -> Result<Hub<L::Transport>> {
        self.ble_ready().await?;
        let details = self.hub_found().await;
        self.connect(&details, config).await
    }
}

impl<L: BleLink> Drop for Boost<L> {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

fn spawn_pump(
    mut events: mpsc::UnboundedReceiver<LinkEvent>,
    state: watch::Sender<LinkState>,
    subscribers: broadcast::Sender<LinkEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            state.send_modify(|s| match &event {
                LinkEvent::BleReady(status) => s.ble_ready = Some(*status),
                LinkEvent::HubFound(details) => s.hub_details = Some(details.clone()),
            });
            let _ = subscribers.send(event);
        }
    })
}
