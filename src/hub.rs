// Hub controller: awaitable motion operations over the transport boundary.
//
// The hub acknowledges commands when it accepts them, not when the motion
// has finished, so every wait here is either a fixed settle delay or a poll
// of state rebuilt from the hub's own rotation and distance events.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, MotorConfiguration, UnitMode};
use crate::messages::{ConnectionState, HubEvent, LedColor, Port};
use crate::motion;
use crate::poll;
use crate::transport::{HubTransport, TransportError};

/// Pause assumed sufficient for an accepted command to take visible effect.
/// The hub acknowledges before, say, the LED color actually changes.
pub const SETTLE_DELAY: Duration = Duration::from_millis(1000 / 3);

/// Errors surfaced by hub setup and operations
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("bluetooth adapter did not become ready")]
    BleUnavailable,
}

pub type Result<T> = std::result::Result<T, HubError>;

/// Pending completion handed back by the non-waiting forms of
/// [`Hub::drive_until`] and [`Hub::turn_until`]. Resolves once the
/// stop-on-threshold command has been issued, carrying its outcome.
pub type DeferredStop = JoinHandle<Result<()>>;

/// Last-observed rotation angle per logical port, in motor degrees.
/// Zero-initialized at hub setup and updated for the connected lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortAngles {
    angles: [i32; 6],
}

impl PortAngles {
    pub fn get(&self, port: Port) -> i32 {
        self.angles[Self::index(port)]
    }

    fn set(&mut self, port: Port, angle: i32) {
        self.angles[Self::index(port)] = angle;
    }

    fn index(port: Port) -> usize {
        match port {
            Port::A => 0,
            Port::B => 1,
            Port::AB => 2,
            Port::C => 3,
            Port::D => 4,
            Port::Led => 5,
        }
    }
}

/// Hub-side state rebuilt from events, read by completion waits
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HubState {
    pub ports: PortAngles,
    pub distance: Option<f64>,
    pub connection: ConnectionState,
}

/// One connected Move Hub.
///
/// Owns the transport command surface and the event pump that rebuilds
/// [`HubState`] from hub events. Motion operations resolve when the motion
/// has physically finished (or after a settle delay where noted), not when
/// the command was transmitted. Operations are not serialized against each
/// other: issuing a second motor command before the first has settled is the
/// caller's responsibility to avoid.
pub struct Hub<T: HubTransport> {
    transport: Arc<Mutex<T>>,
    state: watch::Receiver<HubState>,
    events: broadcast::Sender<HubEvent>,
    config: MotorConfiguration,
    units: UnitMode,
    friction: f64,
    pump: JoinHandle<()>,
}

impl<T: HubTransport + Send + 'static> Hub<T> {
    /// Build a hub over an established transport and its event channel.
    pub fn new(
        transport: T,
        events: mpsc::UnboundedReceiver<HubEvent>,
        config: MotorConfiguration,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(HubState::default());
        let (event_tx, _) = broadcast::channel(64);
        let pump = spawn_pump(events, state_tx, event_tx.clone());
        info!(?config, "hub initialized");
        Self {
            transport: Arc::new(Mutex::new(transport)),
            state: state_rx,
            events: event_tx,
            config,
            units: UnitMode::Metric,
            friction: 1.0,
            pump,
        }
    }

    /// Subscribe to the raw hub events (rotation, distance, connection
    /// lifecycle) as they arrive from the hardware abstraction.
    pub fn events(&self) -> broadcast::Receiver<HubEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the last-observed hub state.
    pub fn state(&self) -> HubState {
        self.state.borrow().clone()
    }

    pub fn configuration(&self) -> MotorConfiguration {
        self.config
    }

    pub fn unit_mode(&self) -> UnitMode {
        self.units
    }

    /// Resolve once the hub reports the connection as established.
    pub async fn wait_connected(&self) {
        poll::await_condition(
            &self.state,
            |s| s.connection == ConnectionState::Connected,
            Duration::ZERO,
        )
        .await;
    }

    /// Measure drive distances in centimeters (default).
    pub fn use_metric_units(&mut self) {
        self.units = UnitMode::Metric;
    }

    /// Measure drive distances in inches.
    pub fn use_imperial_units(&mut self) {
        self.units = UnitMode::Imperial;
    }

    /// Scale all distance-to-angle conversions, e.g. for slippery surfaces.
    pub fn set_friction_modifier(&mut self, modifier: f64) {
        self.friction = modifier;
    }

    /// Set the hub LED color. Resolves after the settle delay.
    pub async fn led(&self, color: LedColor) -> Result<()> {
        debug!(?color, "led");
        self.transport.lock().await.led(color)?;
        tokio::time::sleep(SETTLE_DELAY).await;
        Ok(())
    }

    /// Run one motor for `seconds`. With `wait`, resolves after the run time
    /// has elapsed; this is duration-based and does not verify rotation.
    pub async fn motor_for_time(
        &self,
        port: Port,
        seconds: f64,
        duty_cycle: i8,
        wait: bool,
    ) -> Result<()> {
        debug!(?port, seconds, duty_cycle, "motor_for_time");
        self.transport
            .lock()
            .await
            .motor_time(port, seconds, duty_cycle)?;
        tokio::time::sleep(run_delay(seconds, wait)).await;
        Ok(())
    }

    /// Run both drive motors for `seconds`.
    pub async fn motor_for_time_multi(
        &self,
        seconds: f64,
        duty_cycle_a: i8,
        duty_cycle_b: i8,
        wait: bool,
    ) -> Result<()> {
        debug!(seconds, duty_cycle_a, duty_cycle_b, "motor_for_time_multi");
        self.transport
            .lock()
            .await
            .motor_time_multi(seconds, duty_cycle_a, duty_cycle_b)?;
        tokio::time::sleep(run_delay(seconds, wait)).await;
        Ok(())
    }

    /// Turn one motor by `angle` degrees. With `wait`, resolves via the
    /// stability wait on that port's observed rotation; this is the only
    /// motion wait verified from hardware feedback rather than a timer.
    pub async fn motor_by_angle(
        &self,
        port: Port,
        angle: f64,
        duty_cycle: i8,
        wait: bool,
    ) -> Result<()> {
        debug!(?port, angle, duty_cycle, "motor_by_angle");
        self.transport
            .lock()
            .await
            .motor_angle(port, angle, duty_cycle)?;
        self.settle_or_stabilize(port, wait).await;
        Ok(())
    }

    /// Turn both drive motors by `angle` degrees, stability-waiting on the
    /// combined AB port when `wait` is set.
    pub async fn motor_by_angle_multi(
        &self,
        angle: f64,
        duty_cycle_a: i8,
        duty_cycle_b: i8,
        wait: bool,
    ) -> Result<()> {
        debug!(angle, duty_cycle_a, duty_cycle_b, "motor_by_angle_multi");
        self.transport
            .lock()
            .await
            .motor_angle_multi(angle, duty_cycle_a, duty_cycle_b)?;
        self.settle_or_stabilize(Port::AB, wait).await;
        Ok(())
    }

    /// Drive straight for `distance` centimeters (inches in imperial mode).
    /// Positive is forward, negative backward.
    pub async fn drive(&self, distance: f64, wait: bool) -> Result<()> {
        let angle = motion::distance_to_angle(distance, self.units, self.friction);
        let (duty_a, duty_b) = motion::drive_duty_cycles(distance, &self.config);
        self.motor_by_angle_multi(angle, duty_a, duty_b, wait).await
    }

    /// Turn in place by `degrees`. Positive turns right, negative left.
    pub async fn turn(&self, degrees: f64, wait: bool) -> Result<()> {
        let angle = motion::turn_angle(degrees);
        let (duty_a, duty_b) = motion::turn_duty_cycles(degrees, &self.config);
        self.motor_by_angle_multi(angle, duty_a, duty_b, wait).await
    }

    /// Drive forward until the distance sensor reads at or below a
    /// threshold, then stop. Pass `distance = 0.0` for the default
    /// threshold; the sensor counts down as an obstacle nears.
    ///
    /// With `wait = false`, the call returns after command issuance with a
    /// [`DeferredStop`] that performs the same stop-on-threshold behavior in
    /// the background; await it to observe the stop being issued (or its
    /// failure), or drop it to let the stop proceed unobserved.
    pub async fn drive_until(&self, distance: f64, wait: bool) -> Result<Option<DeferredStop>> {
        let threshold = if distance != 0.0 {
            match self.units {
                UnitMode::Metric => distance,
                // Historical behavior: the explicit threshold is rescaled
                // to sensor units in imperial mode, unlike drive distances.
                UnitMode::Imperial => distance * 2.54,
            }
        } else {
            motion::DEFAULT_STOP_DISTANCE
        };
        debug!(threshold, "drive_until");

        // Open-ended run on a 60 second budget; the stop below cuts it short.
        self.transport.lock().await.motor_time_multi(
            60.0,
            motion::DRIVE_SPEED,
            motion::DRIVE_SPEED,
        )?;

        let obstacle = move |s: &HubState| s.distance.is_some_and(|d| d <= threshold);
        if wait {
            poll::await_condition(&self.state, obstacle, Duration::ZERO).await;
            self.motor_by_angle_multi(0.0, 100, 100, false).await?;
            Ok(None)
        } else {
            let transport = Arc::clone(&self.transport);
            let state = self.state.clone();
            let pending = tokio::spawn(async move {
                poll::await_condition(&state, obstacle, Duration::ZERO).await;
                transport
                    .lock()
                    .await
                    .motor_angle_multi(0.0, 0, 0)
                    .inspect_err(|e| warn!("failed to stop after reaching obstacle: {e}"))
                    .map_err(HubError::from)
            });
            Ok(Some(pending))
        }
    }

    /// Turn in place until the distance sensor reads clear, then stop.
    /// Positive `direction` turns right; zero or negative turns left.
    ///
    /// With `wait = false`, returns a [`DeferredStop`] the same way
    /// [`Hub::drive_until`] does.
    pub async fn turn_until(&self, direction: f64, wait: bool) -> Result<Option<DeferredStop>> {
        let modifier = if direction > 0.0 { 1.0 } else { -1.0 };
        self.turn(360.0 * modifier, false).await?;

        let clear =
            |s: &HubState| s.distance.is_some_and(|d| d >= motion::DEFAULT_CLEAR_DISTANCE);
        if wait {
            poll::await_condition(&self.state, clear, Duration::ZERO).await;
            self.turn(0.0, false).await?;
            Ok(None)
        } else {
            let transport = Arc::clone(&self.transport);
            let state = self.state.clone();
            let angle = motion::turn_angle(0.0);
            let (duty_a, duty_b) = motion::turn_duty_cycles(0.0, &self.config);
            let pending = tokio::spawn(async move {
                poll::await_condition(&state, clear, Duration::ZERO).await;
                transport
                    .lock()
                    .await
                    .motor_angle_multi(angle, duty_a, duty_b)
                    .inspect_err(|e| warn!("failed to stop after path cleared: {e}"))
                    .map_err(HubError::from)
            });
            Ok(Some(pending))
        }
    }

    /// Disconnect from the hub; resolves once the hub reports the
    /// connection as dropped.
    pub async fn disconnect(&self) -> Result<()> {
        info!("disconnecting");
        self.transport.lock().await.disconnect()?;
        poll::await_condition(
            &self.state,
            |s| s.connection == ConnectionState::Disconnected,
            Duration::ZERO,
        )
        .await;
        Ok(())
    }

    async fn settle_or_stabilize(&self, port: Port, wait: bool) {
        if wait {
            poll::await_stable(&self.state, |s| s.ports.get(port), SETTLE_DELAY).await;
        } else {
            tokio::time::sleep(SETTLE_DELAY).await;
        }
    }
}

impl<T: HubTransport> Drop for Hub<T> {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

fn run_delay(seconds: f64, wait: bool) -> Duration {
    if wait {
        SETTLE_DELAY + Duration::from_secs_f64(seconds.max(0.0))
    } else {
        SETTLE_DELAY
    }
}

fn spawn_pump(
    mut events: mpsc::UnboundedReceiver<HubEvent>,
    state: watch::Sender<HubState>,
    subscribers: broadcast::Sender<HubEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            state.send_modify(|s| apply_event(s, &event));
            // No subscribers is fine; operations poll the state copy above.
            let _ = subscribers.send(event);
        }
    })
}

// Sole writer of the hub state, keeping event application single-threaded
// with respect to delivery order.
fn apply_event(state: &mut HubState, event: &HubEvent) {
    match *event {
        HubEvent::Rotation { port, angle } => state.ports.set(port, angle),
        HubEvent::Distance(value) => state.distance = Some(value),
        HubEvent::Connected => state.connection = ConnectionState::Connected,
        HubEvent::Disconnect => state.connection = ConnectionState::Disconnected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport;
    use std::sync::Mutex as StdMutex;
    use tokio::time::Instant;

    #[derive(Debug, Clone, PartialEq)]
    enum Sent {
        Led(LedColor),
        MotorTime {
            port: Port,
            seconds: f64,
            duty: i8,
        },
        MotorTimeMulti {
            seconds: f64,
            duty_a: i8,
            duty_b: i8,
        },
        MotorAngle {
            port: Port,
            angle: f64,
            duty: i8,
        },
        MotorAngleMulti {
            angle: f64,
            duty_a: i8,
            duty_b: i8,
        },
        Disconnect,
    }

    struct MockTransport {
        sent: Arc<StdMutex<Vec<Sent>>>,
    }

    impl MockTransport {
        fn new() -> (Self, Arc<StdMutex<Vec<Sent>>>) {
            let sent = Arc::new(StdMutex::new(Vec::new()));
            (
                Self {
                    sent: Arc::clone(&sent),
                },
                sent,
            )
        }
    }

    impl HubTransport for MockTransport {
        fn led(&mut self, color: LedColor) -> transport::Result<()> {
            self.sent.lock().unwrap().push(Sent::Led(color));
            Ok(())
        }

        fn motor_time(&mut self, port: Port, seconds: f64, duty: i8) -> transport::Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push(Sent::MotorTime { port, seconds, duty });
            Ok(())
        }

        fn motor_time_multi(
            &mut self,
            seconds: f64,
            duty_a: i8,
            duty_b: i8,
        ) -> transport::Result<()> {
            self.sent.lock().unwrap().push(Sent::MotorTimeMulti {
                seconds,
                duty_a,
                duty_b,
            });
            Ok(())
        }

        fn motor_angle(&mut self, port: Port, angle: f64, duty: i8) -> transport::Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push(Sent::MotorAngle { port, angle, duty });
            Ok(())
        }

        fn motor_angle_multi(
            &mut self,
            angle: f64,
            duty_a: i8,
            duty_b: i8,
        ) -> transport::Result<()> {
            self.sent.lock().unwrap().push(Sent::MotorAngleMulti {
                angle,
                duty_a,
                duty_b,
            });
            Ok(())
        }

        fn disconnect(&mut self) -> transport::Result<()> {
            self.sent.lock().unwrap().push(Sent::Disconnect);
            Ok(())
        }
    }

    fn test_hub(
        config: MotorConfiguration,
    ) -> (
        Hub<MockTransport>,
        mpsc::UnboundedSender<HubEvent>,
        Arc<StdMutex<Vec<Sent>>>,
    ) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (transport, sent) = MockTransport::new();
        (Hub::new(transport, event_rx, config), event_tx, sent)
    }

    #[tokio::test(start_paused = true)]
    async fn drive_issues_translated_angle_command() {
        let (hub, _events, sent) = test_hub(MotorConfiguration::vernie());
        hub.drive(100.0, false).await.unwrap();
        assert_eq!(
            sent.lock().unwrap().as_slice(),
            &[Sent::MotorAngleMulti {
                angle: 2850.0,
                duty_a: 25,
                duty_b: 25
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn drive_flips_duty_for_car_mapping() {
        let (hub, _events, sent) = test_hub(MotorConfiguration::car());
        hub.drive(100.0, false).await.unwrap();
        assert_eq!(
            sent.lock().unwrap().as_slice(),
            &[Sent::MotorAngleMulti {
                angle: 2850.0,
                duty_a: -25,
                duty_b: -25
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn turn_issues_differential_command() {
        let (hub, _events, sent) = test_hub(MotorConfiguration::vernie());
        hub.turn(90.0, false).await.unwrap();
        assert_eq!(
            sent.lock().unwrap().as_slice(),
            &[Sent::MotorAngleMulti {
                angle: 230.4,
                duty_a: 20,
                duty_b: -20
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn turn_swaps_sides_for_car_mapping() {
        let (hub, _events, sent) = test_hub(MotorConfiguration::car());
        hub.turn(90.0, false).await.unwrap();
        assert_eq!(
            sent.lock().unwrap().as_slice(),
            &[Sent::MotorAngleMulti {
                angle: 230.4,
                duty_a: -20,
                duty_b: 20
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unit_mode_and_friction_reach_the_conversion() {
        let (mut hub, _events, sent) = test_hub(MotorConfiguration::vernie());

        hub.use_imperial_units();
        hub.drive(100.0, false).await.unwrap();

        // Switching twice stays metric.
        hub.use_metric_units();
        hub.use_metric_units();
        hub.set_friction_modifier(2.0);
        hub.drive(100.0, false).await.unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(
            sent[0],
            Sent::MotorAngleMulti {
                angle: 712.5,
                duty_a: 25,
                duty_b: 25
            }
        );
        assert_eq!(
            sent[1],
            Sent::MotorAngleMulti {
                angle: 5700.0,
                duty_a: 25,
                duty_b: 25
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn led_resolves_after_settle_delay() {
        let (hub, _events, sent) = test_hub(MotorConfiguration::default());
        let start = Instant::now();
        hub.led(LedColor::Red).await.unwrap();
        assert_eq!(start.elapsed(), SETTLE_DELAY);
        assert_eq!(sent.lock().unwrap().as_slice(), &[Sent::Led(LedColor::Red)]);
    }

    #[tokio::test(start_paused = true)]
    async fn motor_for_time_wait_covers_run_time() {
        let (hub, _events, sent) = test_hub(MotorConfiguration::default());
        let start = Instant::now();
        hub.motor_for_time(Port::C, 2.0, 50, true).await.unwrap();
        assert_eq!(start.elapsed(), SETTLE_DELAY + Duration::from_secs(2));
        assert_eq!(
            sent.lock().unwrap().as_slice(),
            &[Sent::MotorTime {
                port: Port::C,
                seconds: 2.0,
                duty: 50
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn motor_for_time_without_wait_only_settles() {
        let (hub, _events, _sent) = test_hub(MotorConfiguration::default());
        let start = Instant::now();
        hub.motor_for_time_multi(5.0, 30, 30, false).await.unwrap();
        assert_eq!(start.elapsed(), SETTLE_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn motor_by_angle_waits_for_rotation_to_stop() {
        let (hub, events, _sent) = test_hub(MotorConfiguration::default());
        let feeder = tokio::spawn(async move {
            for step in 1..=6 {
                tokio::time::sleep(Duration::from_millis(150)).await;
                events
                    .send(HubEvent::Rotation {
                        port: Port::AB,
                        angle: step * 60,
                    })
                    .unwrap();
            }
        });

        let start = Instant::now();
        hub.motor_by_angle_multi(360.0, 25, 25, true).await.unwrap();
        // Rotation events keep arriving until 900 ms; the wait must not
        // resolve while the angle is still moving between samples.
        assert!(start.elapsed() > Duration::from_millis(900));
        feeder.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn motor_by_angle_tracks_the_commanded_port() {
        let (hub, events, _sent) = test_hub(MotorConfiguration::default());
        let feeder = tokio::spawn(async move {
            for step in 1..=4 {
                tokio::time::sleep(Duration::from_millis(200)).await;
                events
                    .send(HubEvent::Rotation {
                        port: Port::D,
                        angle: step * 90,
                    })
                    .unwrap();
            }
        });

        let start = Instant::now();
        hub.motor_by_angle(Port::D, 360.0, 40, true).await.unwrap();
        assert!(start.elapsed() > Duration::from_millis(800));
        feeder.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn drive_until_stops_at_default_threshold() {
        let (hub, events, sent) = test_hub(MotorConfiguration::vernie());
        tokio::spawn(async move {
            for reading in [140.0, 130.0, 110.0, 100.0] {
                tokio::time::sleep(Duration::from_millis(200)).await;
                events.send(HubEvent::Distance(reading)).unwrap();
            }
        });

        let pending = hub.drive_until(0.0, true).await.unwrap();
        assert!(pending.is_none(), "waiting form has nothing left to await");

        // 110 is above the default threshold of 105, so only the reading of
        // 100 triggers the stop.
        let sent = sent.lock().unwrap();
        assert_eq!(
            sent.as_slice(),
            &[
                Sent::MotorTimeMulti {
                    seconds: 60.0,
                    duty_a: 25,
                    duty_b: 25
                },
                Sent::MotorAngleMulti {
                    angle: 0.0,
                    duty_a: 100,
                    duty_b: 100
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn drive_until_rescales_explicit_threshold_in_imperial_mode() {
        // Documents the historical unit handling on this path: the explicit
        // threshold is multiplied by 2.54, unlike drive distances.
        let (mut hub, events, sent) = test_hub(MotorConfiguration::vernie());
        hub.use_imperial_units();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            events.send(HubEvent::Distance(130.0)).unwrap();
            tokio::time::sleep(Duration::from_millis(200)).await;
            events.send(HubEvent::Distance(101.0)).unwrap();
        });

        // 40 inches -> threshold 101.6, so 130 keeps driving and 101 stops.
        hub.drive_until(40.0, true).await.unwrap();
        assert_eq!(
            sent.lock().unwrap().last(),
            Some(&Sent::MotorAngleMulti {
                angle: 0.0,
                duty_a: 100,
                duty_b: 100
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn drive_until_without_wait_returns_awaitable_stop() {
        let (hub, events, sent) = test_hub(MotorConfiguration::vernie());
        let pending = hub
            .drive_until(0.0, false)
            .await
            .unwrap()
            .expect("non-waiting form hands back the pending stop");

        // Caller got control back with only the open-ended run issued.
        assert_eq!(sent.lock().unwrap().len(), 1);

        events.send(HubEvent::Distance(90.0)).unwrap();
        // Awaiting the deferred completion observes the stop being issued.
        pending.await.unwrap().unwrap();
        assert_eq!(
            sent.lock().unwrap().as_slice(),
            &[
                Sent::MotorTimeMulti {
                    seconds: 60.0,
                    duty_a: 25,
                    duty_b: 25
                },
                Sent::MotorAngleMulti {
                    angle: 0.0,
                    duty_a: 0,
                    duty_b: 0
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn turn_until_resolves_when_path_clears() {
        let (hub, events, sent) = test_hub(MotorConfiguration::vernie());
        tokio::spawn(async move {
            events.send(HubEvent::Distance(80.0)).unwrap();
            tokio::time::sleep(Duration::from_millis(600)).await;
            events.send(HubEvent::Distance(125.0)).unwrap();
        });

        hub.turn_until(1.0, true).await.unwrap();

        let sent = sent.lock().unwrap();
        // Open-ended right turn, then the zero-angle stop.
        assert_eq!(
            sent.as_slice(),
            &[
                Sent::MotorAngleMulti {
                    angle: 921.6,
                    duty_a: 20,
                    duty_b: -20
                },
                Sent::MotorAngleMulti {
                    angle: 0.0,
                    duty_a: -20,
                    duty_b: 20
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn turn_until_without_wait_returns_awaitable_stop() {
        let (hub, events, sent) = test_hub(MotorConfiguration::car());
        let pending = hub
            .turn_until(-1.0, false)
            .await
            .unwrap()
            .expect("non-waiting form hands back the pending stop");
        assert_eq!(sent.lock().unwrap().len(), 1);

        events.send(HubEvent::Distance(140.0)).unwrap();
        pending.await.unwrap().unwrap();
        assert_eq!(
            sent.lock().unwrap().last(),
            Some(&Sent::MotorAngleMulti {
                angle: 0.0,
                duty_a: 20,
                duty_b: -20
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_waits_for_the_event() {
        let (hub, events, sent) = test_hub(MotorConfiguration::default());
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            events.send(HubEvent::Disconnect).unwrap();
        });

        let start = Instant::now();
        hub.disconnect().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(300));
        assert_eq!(sent.lock().unwrap().as_slice(), &[Sent::Disconnect]);
        assert_eq!(hub.state().connection, ConnectionState::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn events_are_rebroadcast_to_subscribers() {
        let (hub, events, _sent) = test_hub(MotorConfiguration::default());
        let mut subscription = hub.events();

        events.send(HubEvent::Distance(99.0)).unwrap();
        assert_eq!(
            subscription.recv().await.unwrap(),
            HubEvent::Distance(99.0)
        );
        assert_eq!(hub.state().distance, Some(99.0));
    }

    #[tokio::test(start_paused = true)]
    async fn state_starts_connecting_with_zeroed_ports() {
        let (hub, _events, _sent) = test_hub(MotorConfiguration::default());
        let state = hub.state();
        assert_eq!(state.connection, ConnectionState::Connecting);
        assert_eq!(state.distance, None);
        assert_eq!(state.ports.get(Port::A), 0);
        assert_eq!(state.ports.get(Port::AB), 0);
    }
}
