//! Byte-sink abstraction for console output.

/// A blocking, byte-at-a-time output device.
///
/// Implementors only supply [`write_byte`](Self::write_byte); string output
/// is byte-wise in order, with no newline translation.
pub trait ConsoleSink {
    /// Transmits one byte, waiting as long as the device needs.
    fn write_byte(&self, byte: u8);

    /// Transmits every byte of `s` in order.
    fn write_string(&self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    /// Transmits every byte of `bytes` in order.
    fn write_bytes(&self, bytes: &[u8]) {
        for &b in bytes {
            self.write_byte(b);
        }
    }
}

impl<T: ConsoleSink + ?Sized> ConsoleSink for &T {
    fn write_byte(&self, byte: u8) {
        (**self).write_byte(byte);
    }
}
