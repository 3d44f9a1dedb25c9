#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::blocking::{delay::DelayMs, i2c};
use lora_node::{
    config::{
        device::{DeviceClass, Param, ParamValue},
        Schedule,
    },
    gateway::{EventQueue, EventSender, NodeConfigApi, RadioEvent, RadioGateway, TxOutcome},
    node::Node,
    sensor::SharedReading,
};

/// Mock error type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockError {
    /// Generic error
    Error,
}

/// Event producer shared by the mocks standing in for SDK callbacks
pub type Events<'a> = Rc<RefCell<EventSender<'a>>>;

/// Mock vendor module
pub struct MockGateway<'a> {
    events: Events<'a>,
    pub joined: bool,
    pub class: DeviceClass,
    pub class_reads: u32,
    pub events_enabled: bool,
    pub sent: Vec<(u8, Vec<u8>)>,
    pub auto_tx_done: Option<TxOutcome>,
    pub fail_send: bool,
    pub rtc_sleeps: Vec<u32>,
}

impl<'a> MockGateway<'a> {
    /// Create a joined mock module in `class`
    pub fn new(events: Events<'a>, class: DeviceClass) -> Self {
        Self {
            events,
            joined: true,
            class,
            class_reads: 0,
            events_enabled: false,
            sent: Vec::new(),
            auto_tx_done: Some(TxOutcome::Sent),
            fail_send: false,
            rtc_sleeps: Vec::new(),
        }
    }
}

impl<'a> RadioGateway for MockGateway<'a> {
    type Error = MockError;

    fn enable_events(&mut self) -> Result<(), Self::Error> {
        self.events_enabled = true;
        Ok(())
    }

    fn join_state(&mut self) -> bool {
        self.joined
    }

    fn device_class(&mut self) -> Result<DeviceClass, Self::Error> {
        self.class_reads += 1;
        Ok(self.class)
    }

    fn send(&mut self, port: u8, payload: &[u8]) -> Result<(), Self::Error> {
        if self.fail_send {
            return Err(MockError::Error);
        }
        self.sent.push((port, payload.to_vec()));
        if let Some(outcome) = self.auto_tx_done {
            // The module may call back before send returns
            self.events.borrow_mut().tx_done(outcome);
        }
        Ok(())
    }

    fn rtc_sleep(&mut self, secs: u32) -> Result<(), Self::Error> {
        self.rtc_sleeps.push(secs);
        Ok(())
    }
}

/// What happened during the node's waits
#[derive(Default)]
pub struct Timeline {
    /// Every blocking wait, in milliseconds
    pub waits_ms: Vec<u32>,
    /// Events the module fires while the node sleeps next
    pub during_next_wait: Vec<RadioEvent>,
}

/// Mock delay that fires scripted events while "sleeping"
pub struct MockDelay<'a> {
    events: Events<'a>,
    timeline: Rc<RefCell<Timeline>>,
}

impl<'a> DelayMs<u32> for MockDelay<'a> {
    fn delay_ms(&mut self, ms: u32) {
        let mut timeline = self.timeline.borrow_mut();
        timeline.waits_ms.push(ms);
        for event in timeline.during_next_wait.drain(..) {
            self.events.borrow_mut().push(event);
        }
    }
}

/// Node wired to mocks
pub type TestNode<'a> = Node<'a, MockGateway<'a>, MockDelay<'a>, String>;

/// Test rig
pub struct Rig<'a> {
    pub node: TestNode<'a>,
    pub events: Events<'a>,
    pub timeline: Rc<RefCell<Timeline>>,
}

impl<'a> Rig<'a> {
    /// Create a node wired to mocks, joined and in `class`
    pub fn new(
        queue: &'a mut EventQueue,
        readings: &'a SharedReading,
        class: DeviceClass,
        schedule: Schedule,
    ) -> Self {
        let (producer, consumer) = queue.split();
        let events = Rc::new(RefCell::new(EventSender::new(producer)));
        let timeline = Rc::new(RefCell::new(Timeline::default()));
        let gateway = MockGateway::new(events.clone(), class);
        let delay = MockDelay {
            events: events.clone(),
            timeline: timeline.clone(),
        };
        let node = Node::new(gateway, delay, String::new(), consumer, readings, schedule).unwrap();

        Self {
            node,
            events,
            timeline,
        }
    }

    /// Count occurrences of `needle` in the log
    pub fn logged(&self, needle: &str) -> usize {
        self.node.log().matches(needle).count()
    }
}

/// Mock I2C bus
pub struct MockI2c {
    pub writes: Vec<(u8, Vec<u8>)>,
    pub reads: VecDeque<Result<Vec<u8>, MockError>>,
    pub fail_writes: bool,
}

impl MockI2c {
    /// Create a bus answering reads from `reads`, in order
    pub fn new(reads: Vec<Result<Vec<u8>, MockError>>) -> Self {
        Self {
            writes: Vec::new(),
            reads: reads.into(),
            fail_writes: false,
        }
    }
}

impl i2c::Write for MockI2c {
    type Error = MockError;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(MockError::Error);
        }
        self.writes.push((address, bytes.to_vec()));
        Ok(())
    }
}

impl i2c::Read for MockI2c {
    type Error = MockError;

    fn read(&mut self, _address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        let data = self.reads.pop_front().unwrap_or(Err(MockError::Error))?;
        buffer.copy_from_slice(&data[..buffer.len()]);
        Ok(())
    }
}

/// Delay that only records what was asked
#[derive(Default)]
pub struct RecordingDelay {
    pub waits_ms: Vec<u32>,
}

impl DelayMs<u32> for RecordingDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.waits_ms.push(ms);
    }
}

/// Mock provisioning API
#[derive(Default)]
pub struct MockConfigApi {
    pub version: Option<String>,
    pub fuse: Option<String>,
    pub params: Vec<(Param, String)>,
    pub refuse: Vec<Param>,
    pub applied: bool,
    pub started: bool,
    pub fail_apply: bool,
}

fn value(text: &str) -> ParamValue {
    let mut out = ParamValue::new();
    out.push_str(text).unwrap();
    out
}

impl NodeConfigApi for MockConfigApi {
    type Error = MockError;

    fn version(&mut self) -> Result<ParamValue, Self::Error> {
        self.version.as_deref().map(value).ok_or(MockError::Error)
    }

    fn fuse_dev_eui(&mut self) -> Result<ParamValue, Self::Error> {
        self.fuse.as_deref().map(value).ok_or(MockError::Error)
    }

    fn set_param(&mut self, param: Param, text: &str) -> Result<(), Self::Error> {
        if self.refuse.contains(&param) {
            return Err(MockError::Error);
        }
        self.params.retain(|(p, _)| *p != param);
        self.params.push((param, text.to_string()));
        Ok(())
    }

    fn get_param(&mut self, param: Param) -> Result<ParamValue, Self::Error> {
        self.params
            .iter()
            .find(|(p, _)| *p == param)
            .map(|(_, text)| value(text))
            .ok_or(MockError::Error)
    }

    fn apply(&mut self) -> Result<(), Self::Error> {
        if self.fail_apply {
            return Err(MockError::Error);
        }
        self.applied = true;
        Ok(())
    }

    fn start_lora(&mut self) -> Result<(), Self::Error> {
        self.started = true;
        Ok(())
    }
}
