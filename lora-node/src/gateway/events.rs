//! Event delivery from the vendor module callbacks
//!
//! Callbacks may run on another context than the node loop. They only ever
//! enqueue into a bounded single-producer/single-consumer queue; the loop
//! drains it at its checkpoints.

use heapless::{
    spsc::{Consumer, Producer, Queue},
    Vec,
};

/// Maximum LoRaWAN application payload
pub const MAX_DOWNLINK_LEN: usize = 242;

/// Default event queue size (one slot is kept free by the queue)
pub const EVENT_QUEUE_LEN: usize = 8;

/// Queue storage for radio events
pub type EventQueue<const N: usize = EVENT_QUEUE_LEN> = Queue<RadioEvent, N>;

/// Consumer half of the event queue, owned by the node loop
pub type EventReceiver<'a, const N: usize = EVENT_QUEUE_LEN> = Consumer<'a, RadioEvent, N>;

/// Result of an uplink reported by the module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxOutcome {
    /// Frame left the radio
    Sent,
    /// Module gave up on the frame
    Failed,
}

/// Received application data
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Downlink {
    /// LoRa port
    pub port: u8,
    /// Payload bytes
    pub data: Vec<u8, MAX_DOWNLINK_LEN>,
}

impl Downlink {
    /// Copy a downlink, truncating anything beyond [`MAX_DOWNLINK_LEN`]
    pub fn new(port: u8, data: &[u8]) -> Self {
        let len = data.len().min(MAX_DOWNLINK_LEN);
        let mut payload = Vec::new();
        // Cannot fail: length is bounded above.
        let _ = payload.extend_from_slice(&data[..len]);
        Self {
            port,
            data: payload,
        }
    }

    /// Payload length
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the downlink carried no payload (e.g. a bare ACK)
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Asynchronous notification from the module
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioEvent {
    /// Transmit-complete
    TxDone(TxOutcome),
    /// Receive-complete
    RxDone(Downlink),
}

/// Producer half of the event queue, handed to the module callback glue
pub struct EventSender<'a, const N: usize = EVENT_QUEUE_LEN> {
    producer: Producer<'a, RadioEvent, N>,
    dropped: u32,
}

impl<'a, const N: usize> EventSender<'a, N> {
    /// Wrap the producer half of an [`EventQueue`]
    pub fn new(producer: Producer<'a, RadioEvent, N>) -> Self {
        Self {
            producer,
            dropped: 0,
        }
    }

    /// Transmit-complete callback. Returns `false` if the queue was full.
    pub fn tx_done(&mut self, outcome: TxOutcome) -> bool {
        self.push(RadioEvent::TxDone(outcome))
    }

    /// Receive-complete callback. Returns `false` if the queue was full.
    pub fn rx_done(&mut self, port: u8, data: &[u8]) -> bool {
        self.push(RadioEvent::RxDone(Downlink::new(port, data)))
    }

    /// Enqueue an event
    pub fn push(&mut self, event: RadioEvent) -> bool {
        match self.producer.enqueue(event) {
            Ok(()) => true,
            Err(_) => {
                self.dropped = self.dropped.wrapping_add(1);
                false
            }
        }
    }

    /// Events lost because the loop fell behind
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downlink_is_truncated() {
        let data = [0xA5u8; MAX_DOWNLINK_LEN + 10];
        let downlink = Downlink::new(3, &data);
        assert_eq!(downlink.len(), MAX_DOWNLINK_LEN);
        assert_eq!(downlink.port, 3);
    }

    #[test]
    fn full_queue_counts_drops() {
        let mut queue: EventQueue<3> = EventQueue::new();
        let (producer, mut consumer) = queue.split();
        let mut sender = EventSender::new(producer);

        assert!(sender.tx_done(TxOutcome::Sent));
        assert!(sender.rx_done(2, &[1, 2, 3]));
        assert!(!sender.tx_done(TxOutcome::Failed));
        assert_eq!(sender.dropped(), 1);

        assert_eq!(consumer.dequeue(), Some(RadioEvent::TxDone(TxOutcome::Sent)));
        assert_eq!(
            consumer.dequeue(),
            Some(RadioEvent::RxDone(Downlink::new(2, &[1, 2, 3])))
        );
        assert_eq!(consumer.dequeue(), None);
    }
}
