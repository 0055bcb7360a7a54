use core::cell::RefCell;

use critical_section::Mutex;

use crate::frame::Frame;

/// Number of bytes in a complete sensor frame.
pub const FRAME_LEN: usize = 5;

/// Falling edges in a complete read cycle: 3 handshake + 40 data.
pub const EXPECTED_EDGES: usize = 43;

/// First edge (1-based) that carries a data bit; earlier edges are
/// protocol handshake.
const FIRST_DATA_EDGE: usize = 4;

/// Inter-edge interval above which a data edge encodes a 1 bit. The
/// sensor transmits a 0 in roughly 76 µs and a 1 in roughly 120 µs.
const HIGH_BIT_THRESHOLD_US: u64 = 110;

/// Capability invoked on every falling transition of the sensor pin.
///
/// Implementations must be safe to call from interrupt context:
/// bounded work, no blocking, no allocation.
pub trait EdgeSink {
    /// Records a falling edge observed at `now_us`.
    fn falling_edge(&self, now_us: u64);
}

#[derive(Debug)]
struct CaptureState {
    num_edges: usize,
    last_edge_us: u64,
    bytes: [u8; FRAME_LEN],
}

impl CaptureState {
    const fn zeroed() -> Self {
        CaptureState {
            num_edges: 0,
            last_edge_us: 0,
            bytes: [0; FRAME_LEN],
        }
    }
}

/// Shared record populated by the falling-edge interrupt and drained
/// by the read path.
///
/// All access goes through a critical section: the interrupt handler
/// holds it for a handful of instructions per edge, and the process
/// context only takes it for [`reset`](EdgeCapture::reset) and
/// [`snapshot`](EdgeCapture::snapshot). Place the capture in a
/// `static` so the interrupt handler can reach it:
///
/// ```ignore
/// static CAPTURE: EdgeCapture = EdgeCapture::new();
///
/// #[interrupt]
/// fn GPIO() {
///     CAPTURE.falling_edge(timer::now_us());
/// }
/// ```
#[derive(Debug)]
pub struct EdgeCapture {
    state: Mutex<RefCell<CaptureState>>,
}

impl EdgeCapture {
    /// Creates an empty capture record.
    pub const fn new() -> Self {
        EdgeCapture {
            state: Mutex::new(RefCell::new(CaptureState::zeroed())),
        }
    }

    /// Zeroes the record ahead of the next trigger.
    ///
    /// Bytes start at zero so the edge handler only ever sets bits.
    pub fn reset(&self) {
        critical_section::with(|cs| {
            *self.state.borrow_ref_mut(cs) = CaptureState::zeroed();
        });
    }

    /// Copies the now-stable capture out for decoding.
    pub fn snapshot(&self) -> Frame {
        critical_section::with(|cs| {
            let state = self.state.borrow_ref(cs);
            Frame {
                bytes: state.bytes,
                edges: state.num_edges,
            }
        })
    }
}

impl Default for EdgeCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeSink for EdgeCapture {
    fn falling_edge(&self, now_us: u64) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            state.num_edges += 1;

            // Edges 1-3 are handshake, edges past 43 are spurious;
            // neither contributes a bit.
            if (FIRST_DATA_EDGE..=EXPECTED_EDGES).contains(&state.num_edges) {
                let diff = now_us.saturating_sub(state.last_edge_us);
                if diff > HIGH_BIT_THRESHOLD_US {
                    let i = state.num_edges - FIRST_DATA_EDGE;
                    state.bytes[i >> 3] |= 1 << (7 - (i & 0x7));
                }
            }

            state.last_edge_us = now_us;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HANDSHAKE_GAP_US: u64 = 80;
    const ZERO_GAP_US: u64 = 76;
    const ONE_GAP_US: u64 = 126;

    fn checksum(data: [u8; 4]) -> u8 {
        data.iter().fold(0u8, |sum, v| sum.wrapping_add(*v))
    }

    /// Plays the 3 handshake edges plus the 40 data edges encoding
    /// `data` and its checksum. Returns the last edge timestamp.
    fn feed_frame(capture: &EdgeCapture, start_us: u64, data: [u8; 4]) -> u64 {
        let bytes = [data[0], data[1], data[2], data[3], checksum(data)];
        let mut t = start_us;

        for _ in 0..3 {
            t += HANDSHAKE_GAP_US;
            capture.falling_edge(t);
        }

        for i in 0..40 {
            let bit = (bytes[i / 8] >> (7 - (i % 8))) & 1;
            t += if bit == 1 { ONE_GAP_US } else { ZERO_GAP_US };
            capture.falling_edge(t);
        }

        t
    }

    #[test]
    fn test_reconstructs_known_bytes() {
        let capture = EdgeCapture::new();
        feed_frame(&capture, 0, [0x02, 0x5A, 0x01, 0x0E]);

        let frame = capture.snapshot();
        assert_eq!(frame.bytes, [0x02, 0x5A, 0x01, 0x0E, 0x6B]);
        assert_eq!(frame.edges, EXPECTED_EDGES);
    }

    #[test]
    fn test_handshake_edges_carry_no_data() {
        let capture = EdgeCapture::new();
        let mut t = 0;
        for _ in 0..3 {
            t += ONE_GAP_US; // long gaps, but still no bits
            capture.falling_edge(t);
        }

        let frame = capture.snapshot();
        assert_eq!(frame.bytes, [0; FRAME_LEN]);
        assert_eq!(frame.edges, 3);
    }

    #[test]
    fn test_spurious_edges_do_not_corrupt_frame() {
        let capture = EdgeCapture::new();
        let last = feed_frame(&capture, 0, [0x02, 0x5A, 0x01, 0x0E]);

        // Extra edges after the 43rd, including a long one that would
        // set a bit if it were counted.
        capture.falling_edge(last + 50);
        capture.falling_edge(last + 50 + ONE_GAP_US);

        let frame = capture.snapshot();
        assert_eq!(frame.bytes, [0x02, 0x5A, 0x01, 0x0E, 0x6B]);
        assert_eq!(frame.edges, 45);
    }

    #[test]
    fn test_threshold_is_strictly_greater() {
        let capture = EdgeCapture::new();
        let mut t = 0;
        for _ in 0..3 {
            t += HANDSHAKE_GAP_US;
            capture.falling_edge(t);
        }

        // Exactly 110 µs stays a 0; 111 µs becomes a 1.
        t += HIGH_BIT_THRESHOLD_US;
        capture.falling_edge(t);
        t += HIGH_BIT_THRESHOLD_US + 1;
        capture.falling_edge(t);

        let frame = capture.snapshot();
        assert_eq!(frame.bytes[0], 0b0100_0000);
    }

    #[test]
    fn test_reset_clears_previous_capture() {
        let capture = EdgeCapture::new();
        feed_frame(&capture, 0, [0xFF, 0xFF, 0xFF, 0xFF]);
        capture.reset();

        let frame = capture.snapshot();
        assert_eq!(frame.bytes, [0; FRAME_LEN]);
        assert_eq!(frame.edges, 0);
    }
}
