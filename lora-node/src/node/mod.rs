//! Node state loop
//!
//! Drives the node through join-wait, low-power waits, uplinks and downlink
//! reports. One call to [`Node::step`] is one loop iteration; [`Node::run`]
//! repeats it forever. Radio events are drained from the event queue at the
//! start of every step and after every wait, so a downlink that arrives
//! while the node sleeps is seen as soon as it wakes.

use core::fmt::{self, Write};

use embedded_hal::blocking::delay::DelayMs;

use crate::config::{ConfigError, DeviceClass, Schedule, WaitMode};
use crate::console::{self, trace, HexBytes};
use crate::gateway::{
    events::EVENT_QUEUE_LEN, Downlink, EventReceiver, RadioEvent, RadioGateway, TxOutcome,
};
use crate::sensor::{Sample, SharedReading};
use crate::telemetry;

/// Node state types
pub mod state;

pub use state::{JoinStatus, NodeState, Step};

/// Temperature/humidity LoRa node
pub struct Node<'a, G, D, L, const N: usize = EVENT_QUEUE_LEN>
where
    G: RadioGateway,
    D: DelayMs<u32>,
    L: Write,
{
    /// Vendor module
    gateway: G,
    /// Blocking wait primitive
    delay: D,
    /// Debug log sink
    log: L,
    /// Radio events from the module callbacks
    events: EventReceiver<'a, N>,
    /// Latest sensor reading
    readings: &'a SharedReading,
    /// Loop timing
    schedule: Schedule,
    /// Current loop state
    state: NodeState,
    /// Join status seen on the previous iteration
    join: JoinStatus,
    /// Device class read from the module on join
    class: DeviceClass,
    /// Low-power ticks, modulo the active period
    ticks: u32,
    /// Seconds spent waiting for transmit-complete
    tx_elapsed: u32,
    /// Outcome of the current uplink, once the module reports it
    tx_outcome: Option<TxOutcome>,
    /// Last downlink, until reported
    downlink: Option<Downlink>,
}

impl<'a, G, D, L, const N: usize> Node<'a, G, D, L, N>
where
    G: RadioGateway,
    D: DelayMs<u32>,
    L: Write,
{
    /// Create a node in the `Init` state
    pub fn new(
        gateway: G,
        delay: D,
        log: L,
        events: EventReceiver<'a, N>,
        readings: &'a SharedReading,
        schedule: Schedule,
    ) -> Result<Self, ConfigError> {
        schedule.validate()?;

        Ok(Self {
            gateway,
            delay,
            log,
            events,
            readings,
            schedule,
            state: NodeState::Init,
            join: JoinStatus::Unknown,
            class: DeviceClass::A,
            ticks: 0,
            tx_elapsed: 0,
            tx_outcome: None,
            downlink: None,
        })
    }

    /// Register the module callbacks and enter `LowPower`
    pub fn start(&mut self) {
        if let Err(e) = self.gateway.enable_events() {
            self.line(format_args!("WARN: enabling radio events failed: {:?}", e));
        }
        self.state = NodeState::LowPower;
    }

    /// Run the loop forever
    pub fn run(mut self) -> ! {
        self.start();
        loop {
            self.step();
        }
    }

    /// One loop iteration
    pub fn step(&mut self) -> Step {
        if self.state == NodeState::Init {
            self.start();
        }
        self.poll_events();

        if !self.gateway.join_state() {
            if self.join == JoinStatus::Joined {
                self.line(format_args!("LoRa is not joined."));
                trace!("join lost");
            }
            self.join = JoinStatus::NotJoined;
            self.wait(self.schedule.join_backoff_secs);
            return Step::Joining;
        }

        if self.join != JoinStatus::Joined {
            self.refresh_class();
            self.line(format_args!("LoRa Joined."));
            trace!("joined, class {}", self.class);
            self.join = JoinStatus::Joined;
            self.state = NodeState::LowPower;
            // Downlinks seen before the join belong to the old session
            self.downlink = None;
        }

        match self.state {
            NodeState::Init | NodeState::LowPower => self.low_power(),
            NodeState::Active => self.activate(),
            NodeState::Transmitting => self.await_tx_done(),
            NodeState::ReceiveDone => self.report_downlink(),
        }
    }

    /// Drain pending radio events
    pub fn poll_events(&mut self) {
        while let Some(event) = self.events.dequeue() {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: RadioEvent) {
        match event {
            RadioEvent::RxDone(downlink) => {
                self.downlink = Some(downlink);
                self.state = NodeState::ReceiveDone;
            }
            RadioEvent::TxDone(outcome) => {
                // A late transmit-complete must not cancel a pending downlink
                if self.state != NodeState::Transmitting {
                    return;
                }
                if outcome == TxOutcome::Failed {
                    self.line(format_args!("WARN: uplink failed"));
                }
                trace!("tx done: {}", outcome);
                self.tx_outcome = Some(outcome);
                self.state = NodeState::LowPower;
            }
        }
    }

    fn refresh_class(&mut self) {
        match self.gateway.device_class() {
            Ok(class) => self.class = class,
            Err(e) => self.line(format_args!(
                "WARN: reading device class failed: {:?}",
                e
            )),
        }
    }

    fn low_power(&mut self) -> Step {
        let due = if self.class.is_always_listening() {
            // Short ticks keep the loop responsive to downlinks
            self.wait(self.schedule.tick_secs);
            let due = self.ticks == 0;
            self.ticks = (self.ticks + 1) % self.ticks_per_period();
            due
        } else {
            self.wait(self.schedule.active_period_secs);
            true
        };
        self.poll_events();

        if self.state == NodeState::ReceiveDone {
            return Step::Preempted;
        }
        if !due {
            return Step::Idle;
        }
        self.state = NodeState::Active;
        Step::Activated
    }

    fn activate(&mut self) -> Step {
        let sample = self.readings.latest();
        match sample {
            Sample::Unavailable => self.line(format_args!("WARN: sensor reading unavailable")),
            Sample::Stale(_) => self.line(format_args!("WARN: sensor reading stale")),
            Sample::Fresh(_) => {}
        }

        let frame = telemetry::encode(sample.reading().as_ref());
        if frame.is_empty() {
            self.state = NodeState::LowPower;
            return Step::Skipped;
        }

        self.line(format_args!("TX: {}", HexBytes(&frame)));
        match self.gateway.send(self.schedule.uplink_port, &frame) {
            Ok(()) => {
                self.tx_elapsed = 0;
                self.tx_outcome = None;
                self.state = NodeState::Transmitting;
                Step::Sent(frame.len())
            }
            Err(e) => {
                self.line(format_args!("WARN: send failed: {:?}", e));
                self.state = NodeState::LowPower;
                Step::SendFailed
            }
        }
    }

    fn await_tx_done(&mut self) -> Step {
        self.wait(self.schedule.tick_secs);
        self.tx_elapsed = self.tx_elapsed.saturating_add(self.schedule.tick_secs);
        self.poll_events();

        match (self.state, self.tx_outcome.take()) {
            (NodeState::ReceiveDone, _) => return Step::Preempted,
            (NodeState::LowPower, Some(outcome)) => return Step::TxCompleted(outcome),
            _ => {}
        }
        match self.schedule.tx_timeout_secs {
            Some(timeout) if self.tx_elapsed >= timeout => {
                self.line(format_args!("WARN: no transmit-complete after {}s", timeout));
                self.state = NodeState::LowPower;
                Step::TxTimedOut
            }
            _ => Step::AwaitingTxDone,
        }
    }

    fn report_downlink(&mut self) -> Step {
        let downlink = self.downlink.take().filter(|d| !d.is_empty());
        if let Some(downlink) = &downlink {
            self.line(format_args!(
                "RX: {}(Length: {}, Port{})",
                HexBytes(&downlink.data),
                downlink.len(),
                downlink.port
            ));
        }
        self.state = NodeState::LowPower;
        Step::Received(downlink)
    }

    fn wait(&mut self, secs: u32) {
        let ms = secs.saturating_mul(1_000);
        match self.schedule.wait_mode {
            WaitMode::Delay => self.delay.delay_ms(ms),
            WaitMode::RtcWakeup => {
                if let Err(e) = self.gateway.rtc_sleep(secs) {
                    self.line(format_args!("WARN: RTC sleep failed: {:?}", e));
                    self.delay.delay_ms(ms);
                }
            }
        }
    }

    fn ticks_per_period(&self) -> u32 {
        (self.schedule.active_period_secs / self.schedule.tick_secs).max(1)
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        console::line(&mut self.log, args);
    }

    /// Current loop state
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Join status seen on the last iteration
    pub fn join_status(&self) -> JoinStatus {
        self.join
    }

    /// Downlink received but not reported yet
    pub fn pending_downlink(&self) -> Option<&Downlink> {
        self.downlink.as_ref()
    }

    /// Device class read on the last join
    pub fn device_class(&self) -> DeviceClass {
        self.class
    }

    /// Loop schedule
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Get module reference
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Get mutable module reference
    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    /// Get log sink reference
    pub fn log(&self) -> &L {
        &self.log
    }

    /// Get mutable log sink reference
    pub fn log_mut(&mut self) -> &mut L {
        &mut self.log
    }
}
