use embedded_hal::{delay::DelayNs, digital::OutputPin};

use crate::clock::MonotonicClock;
use crate::edge::EdgeCapture;
use crate::error::DhtError;
use crate::frame::Reading;
use crate::session::SessionLock;

/// Timing configuration for the read cycle.
///
/// The defaults match the sensor's datasheet figures; test harnesses
/// that simulate time may override them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Width of the low trigger pulse, in microseconds.
    pub trigger_pulse_us: u32,
    /// Settle wait after the trigger, in milliseconds. Long enough
    /// for all 43 edges of one frame to arrive (a full cycle takes
    /// less than 6 ms).
    pub settle_ms: u32,
    /// Minimum interval between successful reads, in milliseconds.
    /// The sensor cannot be sampled faster than this.
    pub min_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            trigger_pulse_us: 1500,
            settle_ms: 10,
            min_interval_ms: 2000,
        }
    }
}

/// Driver for a DHT22 sensor attached to one interrupt-capable pin.
///
/// The driver only drives the trigger handshake on the pin; the data
/// edges are delivered asynchronously to the shared [`EdgeCapture`]
/// by the platform's falling-edge interrupt (see
/// [`EdgeSink`](crate::EdgeSink)).
///
/// Owning a `Dht22` is an exclusive session on the device: [`open`]
/// fails with [`DhtError::Busy`] while another instance exists for
/// the same [`SessionLock`], and dropping the driver releases it.
///
/// [`open`]: Dht22::open
pub struct Dht22<'a, PIN, DELAY, CLK> {
    pin: PIN,
    delay: DELAY,
    clock: CLK,
    capture: &'a EdgeCapture,
    session: &'a SessionLock,
    config: Config,
    last_read_us: Option<u64>,
    last_reading: Option<Reading>,
}

impl<PIN, DELAY, CLK> core::fmt::Debug for Dht22<'_, PIN, DELAY, CLK> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dht22")
            .field("config", &self.config)
            .field("last_read_us", &self.last_read_us)
            .field("last_reading", &self.last_reading)
            .finish_non_exhaustive()
    }
}

impl<'a, PIN, DELAY, CLK, E> Dht22<'a, PIN, DELAY, CLK>
where
    PIN: OutputPin<Error = E>,
    DELAY: DelayNs,
    CLK: MonotonicClock,
{
    /// Opens an exclusive session on the sensor with default timing.
    ///
    /// # Arguments
    ///
    /// * `pin` - The GPIO pin connected to the DHT22 data line, driven
    ///   open-drain so releasing it hands the line to the sensor.
    /// * `delay` - A delay provider implementing the `DelayNs` trait.
    /// * `clock` - Monotonic time source shared with the edge interrupt.
    /// * `capture` - The capture record the edge interrupt writes into.
    /// * `session` - The exclusivity guard for this device.
    ///
    /// # Errors
    ///
    /// Returns [`DhtError::Busy`] if another session is open.
    pub fn open(
        pin: PIN,
        delay: DELAY,
        clock: CLK,
        capture: &'a EdgeCapture,
        session: &'a SessionLock,
    ) -> Result<Self, DhtError<E>> {
        Self::open_with_config(pin, delay, clock, capture, session, Config::default())
    }

    /// Opens an exclusive session with explicit timing.
    pub fn open_with_config(
        pin: PIN,
        delay: DELAY,
        clock: CLK,
        capture: &'a EdgeCapture,
        session: &'a SessionLock,
        config: Config,
    ) -> Result<Self, DhtError<E>> {
        if !session.try_acquire() {
            return Err(DhtError::Busy);
        }

        Ok(Dht22 {
            pin,
            delay,
            clock,
            capture,
            session,
            config,
            last_read_us: None,
            last_reading: None,
        })
    }

    /// Performs one read cycle and formats the result into `buf`.
    ///
    /// The payload is `"<humidity>,<temperature>"` with one fractional
    /// digit each and no trailing newline, truncated to `buf.len()`;
    /// the return value is the number of bytes written. `Ok(0)` means
    /// the minimum sampling interval since the last successful read
    /// has not elapsed yet — try again later, the cached reading is
    /// still available through [`last_reading`](Dht22::last_reading).
    ///
    /// # Errors
    ///
    /// * [`DhtError::PinError`] if the trigger handshake fails; the
    ///   attempt is aborted.
    /// * [`DhtError::Frame`] if the captured frame is truncated or
    ///   fails the checksum. The cache and the rate-limit timestamp
    ///   are untouched, so the caller may retry immediately.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, DhtError<E>> {
        let now = self.clock.now_us();

        if let Some(last) = self.last_read_us {
            if now.saturating_sub(last) < self.config.min_interval_ms * 1000 {
                return Ok(0);
            }
        }

        self.capture.reset();
        self.trigger()?;

        // The edge interrupt fills the capture while we sleep.
        self.delay.delay_ms(self.config.settle_ms);

        let frame = self.capture.snapshot();
        let reading = frame.decode().map_err(DhtError::Frame)?;

        // Arm the rate limiter only after a successful decode; a
        // rejected frame must not delay the next attempt.
        self.last_read_us = Some(now);
        self.last_reading = Some(reading);

        Ok(reading.write_ascii(buf))
    }

    /// Last successfully decoded reading, if any.
    pub fn last_reading(&self) -> Option<Reading> {
        self.last_reading
    }

    /// Sends the start handshake: hold the line low, then release it
    /// back to the sensor, which answers with the edge train.
    fn trigger(&mut self) -> Result<(), DhtError<E>> {
        self.pin.set_low()?;
        self.delay.delay_us(self.config.trigger_pulse_us);
        self.pin.set_high()?;
        Ok(())
    }
}

impl<PIN, DELAY, CLK> Drop for Dht22<'_, PIN, DELAY, CLK> {
    fn drop(&mut self) {
        self.session.release();
    }
}
