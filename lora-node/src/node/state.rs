use crate::gateway::{Downlink, TxOutcome};

/// Node loop states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeState {
    /// Callbacks not registered yet
    Init,
    /// Waiting for the next uplink slot
    LowPower,
    /// Uplink due: build and send a frame
    Active,
    /// Uplink handed to the module, waiting for transmit-complete
    Transmitting,
    /// A downlink arrived and has not been reported yet
    ReceiveDone,
}

/// Network join status as last observed by the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JoinStatus {
    /// Not polled yet
    Unknown,
    /// Last poll reported not joined
    NotJoined,
    /// Last poll reported joined
    Joined,
}

/// What one loop iteration did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Not joined; waited the join backoff
    Joining,
    /// Low-power tick elapsed, uplink not due yet
    Idle,
    /// Low-power wait done, uplink due
    Activated,
    /// Wait cut short by a downlink
    Preempted,
    /// No sensor reading yet, nothing sent
    Skipped,
    /// Frame of this many bytes handed to the module
    Sent(usize),
    /// Module refused the frame
    SendFailed,
    /// Still waiting for transmit-complete
    AwaitingTxDone,
    /// Transmit-complete arrived during the wait
    TxCompleted(TxOutcome),
    /// Transmit-complete never arrived
    TxTimedOut,
    /// Downlink reported; `None` when it carried no payload
    Received(Option<Downlink>),
}
