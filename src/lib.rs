//! Interrupt-Driven DHT22 Decoder for Embedded Rust
//!
//! This crate decodes readings from the DHT22 (AM2302) temperature and
//! humidity sensor by timing the falling edges on its single data line.
//! Unlike polling drivers, the timing-critical part runs entirely in the
//! platform's falling-edge interrupt: the handler stamps each edge with a
//! monotonic clock and reconstructs the 40 data bits from the inter-edge
//! intervals, while the blocking read path only triggers the sensor,
//! sleeps through the transfer, and validates the result.
//!
//! # Features
//! - Edge capture safe to run from interrupt context (`critical-section`)
//! - Exclusive open/read/close session model with rate limiting
//! - Designed for `no_std` environments
//! - Optional logging support via `defmt`
//!
//! # Dependencies
//! This driver depends on the following `embedded-hal` traits:
//! - [`OutputPin`] for driving the trigger handshake
//! - [`DelayNs`] for the trigger pulse and the settle wait
//!
//! Edge delivery and timestamping, which `embedded-hal` does not model,
//! go through the crate's own [`EdgeSink`] and [`MonotonicClock`]
//! capabilities. Wire the platform's GPIO interrupt to a `static`
//! [`EdgeCapture`] and hand the same capture to the driver:
//!
//! ```ignore
//! static CAPTURE: EdgeCapture = EdgeCapture::new();
//! static SESSION: SessionLock = SessionLock::new();
//!
//! #[interrupt]
//! fn GPIO() {
//!     CAPTURE.falling_edge(timer::now_us());
//! }
//!
//! let mut dht = Dht22::open(pin, delay, clock, &CAPTURE, &SESSION)?;
//! let mut buf = [0u8; 16];
//! match dht.read(&mut buf)? {
//!     0 => { /* sampled less than 2 s ago, try again later */ }
//!     n => { /* buf[..n] holds e.g. b"60.2,27.0" */ }
//! }
//! ```
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` for logging support
//!
//! [`OutputPin`]: embedded_hal::digital::OutputPin
//! [`DelayNs`]: embedded_hal::delay::DelayNs

#![cfg_attr(not(test), no_std)]

pub mod clock;
pub mod dht22;
pub mod edge;
pub mod error;
pub mod frame;
pub mod session;

pub use clock::MonotonicClock;
pub use dht22::{Config, Dht22};
pub use edge::{EdgeCapture, EdgeSink};
pub use error::{DhtError, FrameError};
pub use frame::{Frame, Reading};
pub use session::SessionLock;
