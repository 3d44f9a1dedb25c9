use core::fmt::{self, Write};

use heapless::String;

/// EUI-64 (8 bytes)
pub type EUI64 = [u8; 8];
/// AES-128 key (16 bytes)
pub type AESKey = [u8; 16];
/// Device Address (4 bytes)
pub type DevAddr = [u8; 4];

/// Text value exchanged with the vendor configuration API
pub type ParamValue = String<64>;

/// LoRaWAN device class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceClass {
    /// Class A: Uplink followed by two receive windows
    A,
    /// Class B: Scheduled receive slots (beaconing)
    B,
    /// Class C: Continuously listening except when transmitting
    C,
}

impl DeviceClass {
    /// Decode the vendor class code (1 = A, 2 = B, 3 = C)
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(DeviceClass::A),
            2 => Some(DeviceClass::B),
            3 => Some(DeviceClass::C),
            _ => None,
        }
    }

    /// Vendor class code
    pub fn code(self) -> u8 {
        match self {
            DeviceClass::A => 1,
            DeviceClass::B => 2,
            DeviceClass::C => 3,
        }
    }

    /// Parse the textual class code returned by the configuration getter.
    /// Leading digits are taken, trailing garbage is ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let digits = text
            .trim()
            .bytes()
            .take_while(|b| b.is_ascii_digit())
            .try_fold(0u8, |acc, b| acc.checked_mul(10)?.checked_add(b - b'0'))?;
        Self::from_code(digits)
    }

    /// Whether the radio keeps its receive window open between uplinks
    pub fn is_always_listening(self) -> bool {
        self == DeviceClass::C
    }
}

/// Network activation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActivationMode {
    /// Activation by personalization
    Abp,
    /// Over-the-air activation
    Otaa,
}

impl ActivationMode {
    /// Vendor activation code
    pub fn code(self) -> u8 {
        match self {
            ActivationMode::Abp => 1,
            ActivationMode::Otaa => 2,
        }
    }
}

/// Configuration parameters understood by the vendor API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Param {
    /// Device EUI
    DevEui,
    /// Application EUI
    AppEui,
    /// Application key (OTAA)
    AppKey,
    /// Device address (ABP)
    DevAddr,
    /// Network session key (ABP)
    NwkSKey,
    /// Application session key (ABP)
    AppSKey,
    /// Activation mode code
    ActMode,
    /// Vendor operating mode code
    OpMode,
    /// Device class code
    Class,
    /// Data rate index
    DataRate,
    /// Channel frequency in Hz
    Frequency,
    /// Transmit power in dBm
    TxPower,
}

impl Param {
    /// Every parameter, in the order they are written during provisioning
    pub const ALL: [Param; 12] = [
        Param::DevEui,
        Param::AppEui,
        Param::AppKey,
        Param::DevAddr,
        Param::NwkSKey,
        Param::AppSKey,
        Param::ActMode,
        Param::OpMode,
        Param::Class,
        Param::DataRate,
        Param::Frequency,
        Param::TxPower,
    ];

    /// Name used in the configuration dump
    pub fn name(self) -> &'static str {
        match self {
            Param::DevEui => "DevEui",
            Param::AppEui => "AppEui",
            Param::AppKey => "AppKey",
            Param::DevAddr => "DevAddr",
            Param::NwkSKey => "NwkSKey",
            Param::AppSKey => "AppSKey",
            Param::ActMode => "DevActMode",
            Param::OpMode => "DevOpMode",
            Param::Class => "DevClass",
            Param::DataRate => "AdvwiseDataRate",
            Param::Frequency => "DevAdvwiseFreq",
            Param::TxPower => "DevAdvwiseTxPwr",
        }
    }

    /// Unit suffix appended in the configuration dump
    pub fn unit(self) -> &'static str {
        match self {
            Param::Frequency => "Hz",
            Param::TxPower => "dBm",
            _ => "",
        }
    }

    /// The AppKey is write-only on the vendor module
    pub fn is_readable(self) -> bool {
        self != Param::AppKey
    }
}

/// Identity and radio parameters written to the module at boot
#[derive(Debug, Clone)]
pub struct NodeProfile {
    /// Device EUI, read from the module fuses during provisioning
    pub dev_eui: Option<EUI64>,
    /// Application EUI
    pub app_eui: EUI64,
    /// Application key (used for OTAA)
    pub app_key: AESKey,
    /// Device address, derived from the DevEUI when not set
    pub dev_addr: Option<DevAddr>,
    /// Network session key (used for ABP)
    pub nwk_skey: AESKey,
    /// Application session key (used for ABP)
    pub app_skey: AESKey,
    /// Activation mode
    pub activation: ActivationMode,
    /// Vendor operating mode code
    pub op_mode: u8,
    /// Device class
    pub class: DeviceClass,
    /// Data rate index
    pub data_rate: u8,
    /// Channel frequency in Hz
    pub frequency: u32,
    /// Transmit power in dBm
    pub tx_power: i8,
}

const DEMO_KEY: AESKey = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x11,
];

impl Default for NodeProfile {
    fn default() -> Self {
        Self {
            dev_eui: None,
            app_eui: [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xab],
            app_key: DEMO_KEY,
            dev_addr: None,
            nwk_skey: DEMO_KEY,
            app_skey: DEMO_KEY,
            activation: ActivationMode::Otaa,
            op_mode: 1,
            class: DeviceClass::C,
            data_rate: 4,
            frequency: 923_300_000,
            tx_power: 20,
        }
    }
}

impl NodeProfile {
    /// Fill in the DevEUI and, unless already set, derive the device address
    /// from its last four bytes.
    pub fn with_dev_eui(mut self, dev_eui: EUI64) -> Self {
        self.dev_eui = Some(dev_eui);
        if self.dev_addr.is_none() {
            let mut addr = [0u8; 4];
            addr.copy_from_slice(&dev_eui[4..]);
            self.dev_addr = Some(addr);
        }
        self
    }

    /// Render a parameter in the textual form the vendor API expects.
    /// Returns `None` for the DevEUI/DevAddr before the DevEUI is known.
    pub fn render(&self, param: Param) -> Option<ParamValue> {
        let mut out = ParamValue::new();
        let written = match param {
            Param::DevEui => write_hex(&mut out, &self.dev_eui?),
            Param::AppEui => write_hex(&mut out, &self.app_eui),
            Param::AppKey => write_hex(&mut out, &self.app_key),
            Param::DevAddr => write_hex(&mut out, &self.dev_addr?),
            Param::NwkSKey => write_hex(&mut out, &self.nwk_skey),
            Param::AppSKey => write_hex(&mut out, &self.app_skey),
            Param::ActMode => write!(out, "{}", self.activation.code()),
            Param::OpMode => write!(out, "{}", self.op_mode),
            Param::Class => write!(out, "{}", self.class.code()),
            Param::DataRate => write!(out, "{}", self.data_rate),
            Param::Frequency => write!(out, "{}", self.frequency),
            Param::TxPower => write!(out, "{}", self.tx_power),
        };
        written.ok().map(|_| out)
    }
}

/// Longest hex rendering: an AES-128 key
const MAX_HEX_LEN: usize = 32;

/// Write bytes as lowercase hex without separators
pub fn write_hex<W: Write>(out: &mut W, bytes: &[u8]) -> fmt::Result {
    let mut buf = [0u8; MAX_HEX_LEN];
    let text = buf.get_mut(..bytes.len() * 2).ok_or(fmt::Error)?;
    hex::encode_to_slice(bytes, text).map_err(|_| fmt::Error)?;
    out.write_str(core::str::from_utf8(text).map_err(|_| fmt::Error)?)
}

/// Parse exactly `N` bytes of hex text (either case, surrounding whitespace ignored)
pub fn parse_hex<const N: usize>(text: &str) -> Option<[u8; N]> {
    let mut out = [0u8; N];
    hex::decode_to_slice(text.trim(), &mut out).ok()?;
    Some(out)
}
