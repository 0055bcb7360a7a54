/// Validation failures for a captured frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameError {
    /// Fewer falling edges arrived than a complete frame requires.
    Incomplete,
    /// Checksum byte did not match the received data.
    ChecksumMismatch,
}

/// Possible errors from the DHT22 driver.
#[derive(Debug, PartialEq, Eq)]
pub enum DhtError<E> {
    /// Another session currently holds the device.
    Busy,
    /// The captured frame failed validation.
    Frame(FrameError),
    /// Error from the GPIO pin (input/output).
    PinError(E),
}

impl<E> From<E> for DhtError<E> {
    fn from(value: E) -> Self {
        Self::PinError(value)
    }
}
