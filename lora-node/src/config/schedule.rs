/// How the node suspends between loop checkpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitMode {
    /// Busy the MCU in a blocking delay
    Delay,
    /// Put the module to sleep and wake on its RTC
    RtcWakeup,
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Active period must be at least one second
    ZeroActivePeriod,
    /// Tick must be at least one second
    ZeroTick,
}

/// Node loop schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Seconds between two sensor uplinks
    pub active_period_secs: u32,
    /// Wake-up granularity while waiting in an always-listening class
    pub tick_secs: u32,
    /// Seconds between two join state polls while not joined
    pub join_backoff_secs: u32,
    /// LoRa port used for sensor uplinks
    pub uplink_port: u8,
    /// Give up waiting for a transmit-complete after this many seconds
    pub tx_timeout_secs: Option<u32>,
    /// Wait primitive
    pub wait_mode: WaitMode,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            active_period_secs: 10,
            tick_secs: 1,
            join_backoff_secs: 1,
            uplink_port: 1,
            tx_timeout_secs: Some(60),
            wait_mode: WaitMode::Delay,
        }
    }
}

impl Schedule {
    /// Check the schedule can drive the loop
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.active_period_secs == 0 {
            return Err(ConfigError::ZeroActivePeriod);
        }
        if self.tick_secs == 0 {
            return Err(ConfigError::ZeroTick);
        }
        Ok(())
    }
}
