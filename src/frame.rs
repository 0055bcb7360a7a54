use core::fmt::Write;

use heapless::String;

use crate::edge::{EXPECTED_EDGES, FRAME_LEN};
use crate::error::FrameError;

/// Worst case is `"-3276.8,-3276.8"`, 15 bytes.
const ASCII_SCRATCH: usize = 16;

/// Snapshot of one capture cycle, ready for validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Raw bytes reconstructed from the data edges.
    pub bytes: [u8; FRAME_LEN],
    /// Falling edges seen during the cycle, handshake included.
    pub edges: usize,
}

impl Frame {
    /// Validates the capture and decodes it into a [`Reading`].
    ///
    /// A frame is trusted only if the full 43 edges arrived — a
    /// truncated capture would otherwise pass the checksum with an
    /// all-zero buffer — and the checksum byte matches the low 8 bits
    /// of the sum of the four data bytes. Edges beyond the 43rd never
    /// wrote bits, so a higher count is harmless.
    pub fn decode(&self) -> Result<Reading, FrameError> {
        if self.edges < EXPECTED_EDGES {
            return Err(FrameError::Incomplete);
        }

        let [hum_hi, hum_lo, temp_hi, temp_lo, checksum] = self.bytes;
        let sum = hum_hi
            .wrapping_add(hum_lo)
            .wrapping_add(temp_hi)
            .wrapping_add(temp_lo);
        if sum != checksum {
            return Err(FrameError::ChecksumMismatch);
        }

        let humidity = u16::from_be_bytes([hum_hi, hum_lo]) as i16;

        // Top bit of the temperature high byte is the sign, the
        // remaining 15 bits are the magnitude in tenths.
        let mut temperature = u16::from_be_bytes([temp_hi & 0x7F, temp_lo]) as i16;
        if temp_hi & 0x80 != 0 {
            temperature = -temperature;
        }

        Ok(Reading {
            humidity,
            temperature,
        })
    }
}

/// Reading decoded from a validated frame.
///
/// Values are stored as signed fixed-point tenths, matching the
/// sensor's one-decimal resolution.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reading {
    humidity: i16,
    temperature: i16,
}

impl Reading {
    /// Relative humidity in tenths of a percentage point.
    pub fn humidity_tenths(&self) -> i16 {
        self.humidity
    }

    /// Temperature in tenths of a degree Celsius.
    pub fn temperature_tenths(&self) -> i16 {
        self.temperature
    }

    /// Relative humidity in percent.
    pub fn humidity(&self) -> f32 {
        self.humidity as f32 / 10.0
    }

    /// Temperature in degrees Celsius.
    pub fn temperature(&self) -> f32 {
        self.temperature as f32 / 10.0
    }

    /// Formats the reading as `"<humidity>,<temperature>"` with one
    /// fractional digit each and no trailing newline, truncated to
    /// `out.len()`.
    ///
    /// Returns the number of bytes written.
    pub fn write_ascii(&self, out: &mut [u8]) -> usize {
        let mut scratch: String<ASCII_SCRATCH> = String::new();
        let _ = push_tenths(&mut scratch, self.humidity);
        let _ = scratch.push(',');
        let _ = push_tenths(&mut scratch, self.temperature);

        let n = scratch.len().min(out.len());
        out[..n].copy_from_slice(&scratch.as_bytes()[..n]);
        n
    }
}

/// Renders a tenths value as `int.frac`. The sign is emitted
/// separately so `-0.5` keeps its minus.
fn push_tenths(out: &mut String<ASCII_SCRATCH>, tenths: i16) -> core::fmt::Result {
    let sign = if tenths < 0 { "-" } else { "" };
    let mag = tenths.unsigned_abs();
    write!(out, "{}{}.{}", sign, mag / 10, mag % 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(bytes: [u8; FRAME_LEN]) -> Frame {
        Frame {
            bytes,
            edges: EXPECTED_EDGES,
        }
    }

    #[test]
    fn test_decode_humidity() {
        // Raw 602 -> 60.2 %RH
        let reading = frame([0x02, 0x5A, 0x00, 0x00, 0x5C]).decode().unwrap();
        assert_eq!(reading.humidity_tenths(), 602);
        assert_eq!(reading.humidity(), 60.2);
    }

    #[test]
    fn test_decode_positive_temperature() {
        // Raw 270 -> 27.0 C
        let reading = frame([0x00, 0x00, 0x01, 0x0E, 0x0F]).decode().unwrap();
        assert_eq!(reading.temperature_tenths(), 270);
        assert_eq!(reading.temperature(), 27.0);
    }

    #[test]
    fn test_decode_negative_temperature() {
        // Same magnitude with the sign bit set -> -27.0 C
        let reading = frame([0x00, 0x00, 0x81, 0x0E, 0x8F]).decode().unwrap();
        assert_eq!(reading.temperature_tenths(), -270);
    }

    #[test]
    fn test_rejects_bad_checksum() {
        assert_eq!(
            frame([0x02, 0x5A, 0x01, 0x0E, 0x6C]).decode(),
            Err(FrameError::ChecksumMismatch)
        );
    }

    #[test]
    fn test_rejects_truncated_capture() {
        // A handshake-only capture leaves the buffer all-zero, which
        // would pass the checksum trivially; the edge-count guard must
        // reject it first.
        let truncated = Frame {
            bytes: [0; FRAME_LEN],
            edges: 3,
        };
        assert_eq!(truncated.decode(), Err(FrameError::Incomplete));
    }

    #[test]
    fn test_accepts_extra_edges() {
        let noisy = Frame {
            bytes: [0x02, 0x5A, 0x01, 0x0E, 0x6B],
            edges: 44,
        };
        assert!(noisy.decode().is_ok());
    }

    #[test]
    fn test_write_ascii() {
        let reading = frame([0x02, 0x5A, 0x01, 0x0E, 0x6B]).decode().unwrap();

        let mut buf = [0u8; 16];
        let n = reading.write_ascii(&mut buf);
        assert_eq!(&buf[..n], b"60.2,27.0");
    }

    #[test]
    fn test_write_ascii_truncates_to_buffer() {
        let reading = frame([0x02, 0x5A, 0x01, 0x0E, 0x6B]).decode().unwrap();

        let mut buf = [0u8; 4];
        let n = reading.write_ascii(&mut buf);
        assert_eq!(n, 4);
        assert_eq!(&buf, b"60.2");
    }

    #[test]
    fn test_write_ascii_negative_fraction_keeps_sign() {
        // -0.5 C: magnitude 5 with the sign bit set.
        let reading = frame([0x00, 0x00, 0x80, 0x05, 0x85]).decode().unwrap();

        let mut buf = [0u8; 16];
        let n = reading.write_ascii(&mut buf);
        assert_eq!(&buf[..n], b"0.0,-0.5");
    }
}
