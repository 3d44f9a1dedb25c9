//! Uplink frame encoding
//!
//! A frame is a 2-byte header followed by tag-length-value fields:
//!
//! ```text
//! [len][0x0C][0x01][0x03][sign][t_hi][t_lo][0x02][0x02][h_hi][h_lo]
//! ```
//!
//! `len` counts the bytes after the header. Magnitudes are big-endian and the
//! temperature sign byte is `0x00` for positive, `0x01` for negative values.

use heapless::Vec;

use crate::sensor::{Reading, MAX_HUMIDITY};

/// Largest frame handed to the radio
pub const MAX_FRAME_LEN: usize = 64;

/// Header length (payload length + frame type)
pub const HEADER_LEN: usize = 2;

/// Frame type for a sensor publish
pub const FRAME_TYPE_PUBLISH: u8 = 0x0C;

/// Temperature field tag
pub const TAG_TEMPERATURE: u8 = 0x01;

/// Humidity field tag
pub const TAG_HUMIDITY: u8 = 0x02;

const SIGN_POSITIVE: u8 = 0x00;
const SIGN_NEGATIVE: u8 = 0x01;

/// Encoded uplink frame
pub type Frame = Vec<u8, MAX_FRAME_LEN>;

/// Frame decoding errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Frame shorter than its header or a field
    Truncated,
    /// Header length byte disagrees with the frame size
    LengthMismatch,
    /// Frame type is not a publish
    UnknownFrameType(u8),
    /// Field has an unexpected length for its tag
    BadFieldLength(u8),
    /// Invalid temperature sign byte
    BadSign(u8),
    /// Required field missing
    MissingField(u8),
    /// Frame would exceed [`MAX_FRAME_LEN`]
    Overflow,
    /// Decoded value does not fit its field
    OutOfRange(u8),
}

/// Encode a reading. `None` yields an empty frame, meaning nothing to send.
pub fn encode(reading: Option<&Reading>) -> Frame {
    let mut frame = Frame::new();
    if let Some(reading) = reading {
        if encode_into(&mut frame, reading).is_err() {
            frame.clear();
        }
    }
    frame
}

fn encode_into(frame: &mut Frame, reading: &Reading) -> Result<(), FrameError> {
    frame
        .extend_from_slice(&[0, FRAME_TYPE_PUBLISH])
        .map_err(|_| FrameError::Overflow)?;

    let temperature = reading.temperature();
    let sign = if temperature < 0 { SIGN_NEGATIVE } else { SIGN_POSITIVE };
    let [t_hi, t_lo] = temperature.unsigned_abs().to_be_bytes();
    push_field(frame, TAG_TEMPERATURE, &[sign, t_hi, t_lo])?;
    push_field(frame, TAG_HUMIDITY, &reading.humidity().to_be_bytes())?;

    frame[0] = (frame.len() - HEADER_LEN) as u8;
    Ok(())
}

fn push_field(frame: &mut Frame, tag: u8, value: &[u8]) -> Result<(), FrameError> {
    frame
        .extend_from_slice(&[tag, value.len() as u8])
        .and_then(|_| frame.extend_from_slice(value))
        .map_err(|_| FrameError::Overflow)
}

/// Iterator over the TLV fields of a frame payload
pub struct Fields<'a> {
    payload: &'a [u8],
}

impl<'a> Iterator for Fields<'a> {
    type Item = Result<(u8, &'a [u8]), FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        let payload: &'a [u8] = self.payload;
        match payload {
            [] => None,
            [tag, len, rest @ ..] if rest.len() >= *len as usize => {
                let (value, tail) = rest.split_at(*len as usize);
                self.payload = tail;
                Some(Ok((*tag, value)))
            }
            _ => {
                self.payload = &[];
                Some(Err(FrameError::Truncated))
            }
        }
    }
}

/// Validate the header and iterate over the fields of a publish frame
pub fn fields(frame: &[u8]) -> Result<Fields<'_>, FrameError> {
    let (header, payload) = match frame {
        [len, kind, payload @ ..] => ((*len, *kind), payload),
        _ => return Err(FrameError::Truncated),
    };
    if header.0 as usize != payload.len() {
        return Err(FrameError::LengthMismatch);
    }
    if header.1 != FRAME_TYPE_PUBLISH {
        return Err(FrameError::UnknownFrameType(header.1));
    }
    Ok(Fields { payload })
}

/// Decode a publish frame back into a reading. Unknown tags are skipped.
pub fn decode(frame: &[u8]) -> Result<Reading, FrameError> {
    let mut temperature = None;
    let mut humidity = None;

    for field in fields(frame)? {
        match field? {
            (TAG_TEMPERATURE, &[sign, hi, lo]) => {
                let magnitude = u16::from_be_bytes([hi, lo]) as i32;
                let value = match sign {
                    SIGN_POSITIVE => magnitude,
                    SIGN_NEGATIVE => -magnitude,
                    other => return Err(FrameError::BadSign(other)),
                };
                let value =
                    i16::try_from(value).map_err(|_| FrameError::OutOfRange(TAG_TEMPERATURE))?;
                temperature = Some(value);
            }
            (TAG_HUMIDITY, &[hi, lo]) => {
                let value = u16::from_be_bytes([hi, lo]);
                if value > MAX_HUMIDITY {
                    return Err(FrameError::OutOfRange(TAG_HUMIDITY));
                }
                humidity = Some(value);
            }
            (tag @ (TAG_TEMPERATURE | TAG_HUMIDITY), _) => {
                return Err(FrameError::BadFieldLength(tag))
            }
            _ => {}
        }
    }

    let temperature = temperature.ok_or(FrameError::MissingField(TAG_TEMPERATURE))?;
    let humidity = humidity.ok_or(FrameError::MissingField(TAG_HUMIDITY))?;
    Ok(Reading::new(temperature, humidity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_frame_layout() {
        let frame = encode(Some(&Reading::new(2_345, 5_678)));
        assert_eq!(
            frame.as_slice(),
            &[0x09, 0x0C, 0x01, 0x03, 0x00, 0x09, 0x29, 0x02, 0x02, 0x16, 0x2E]
        );
    }

    #[test]
    fn negative_temperature_sets_sign_byte() {
        let frame = encode(Some(&Reading::new(-1_050, 0)));
        assert_eq!(&frame[2..7], &[0x01, 0x03, 0x01, 0x04, 0x1A]);
        assert_eq!(decode(&frame), Ok(Reading::new(-1_050, 0)));
    }

    #[test]
    fn no_reading_yields_empty_frame() {
        assert!(encode(None).is_empty());
    }

    #[test]
    fn round_trip_over_sensor_range() {
        let mut temperature = -4_000i16;
        while temperature <= 12_500 {
            let mut humidity = 0u16;
            while humidity <= 10_000 {
                let reading = Reading::new(temperature, humidity);
                let frame = encode(Some(&reading));
                assert_eq!(frame[0] as usize, frame.len() - HEADER_LEN);
                assert!(frame.len() <= MAX_FRAME_LEN);
                assert_eq!(decode(&frame), Ok(reading));
                humidity += 37;
            }
            temperature += 53;
        }
    }

    #[test]
    fn decode_rejects_malformed_frames() {
        assert_eq!(decode(&[]), Err(FrameError::Truncated));
        assert_eq!(decode(&[0x03, 0x0C, 0x01]), Err(FrameError::LengthMismatch));
        assert_eq!(decode(&[0x00, 0x0D]), Err(FrameError::UnknownFrameType(0x0D)));
        assert_eq!(
            decode(&[0x03, 0x0C, 0x01, 0x05, 0x00]),
            Err(FrameError::Truncated)
        );
        assert_eq!(
            decode(&[0x04, 0x0C, 0x02, 0x02, 0x00, 0x01]),
            Err(FrameError::MissingField(TAG_TEMPERATURE))
        );
        assert_eq!(
            decode(&[0x04, 0x0C, 0x01, 0x02, 0x00, 0x01]),
            Err(FrameError::BadFieldLength(TAG_TEMPERATURE))
        );
        assert_eq!(
            decode(&[0x05, 0x0C, 0x01, 0x03, 0x07, 0x00, 0x01]),
            Err(FrameError::BadSign(0x07))
        );
        assert_eq!(
            decode(&[0x09, 0x0C, 0x01, 0x03, 0x00, 0x9C, 0x40, 0x02, 0x02, 0x00, 0x00]),
            Err(FrameError::OutOfRange(TAG_TEMPERATURE))
        );
        assert_eq!(
            decode(&[0x09, 0x0C, 0x01, 0x03, 0x01, 0x80, 0x00, 0x02, 0x02, 0x00, 0x00]),
            Ok(Reading::new(i16::MIN, 0))
        );
        assert_eq!(
            decode(&[0x09, 0x0C, 0x01, 0x03, 0x00, 0x00, 0x01, 0x02, 0x02, 0x27, 0x11]),
            Err(FrameError::OutOfRange(TAG_HUMIDITY))
        );
    }

    #[test]
    fn unknown_fields_are_skipped() {
        let frame = [
            0x0C, 0x0C, 0x7F, 0x01, 0xAA, 0x01, 0x03, 0x00, 0x00, 0x64, 0x02, 0x02, 0x00, 0x32,
        ];
        assert_eq!(decode(&frame), Ok(Reading::new(100, 50)));
    }
}
