//! Line protocol spoken with the managing device over the serial link.
//!
//! Inbound traffic is single command bytes: `E` (enable), `D` (disable),
//! `P` (ping). Everything else is noise and dropped without a reply.
//! Outbound traffic is short newline-terminated lines: acknowledgements,
//! token reports, and the `ABANDONED` beacon.

/// A recognized command byte from the managing device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Enable,
    Disable,
    Ping,
}

/// Byte-level seam to the serial link.
///
/// `main` implements this on the UART; tests implement it on buffers.
pub trait LinkPort {
    /// Take one buffered inbound byte, or `None` if the buffer is empty.
    /// Must never block.
    fn poll_byte(&mut self) -> Option<u8>;

    /// Send one protocol line, terminated for us by the implementation.
    fn send_line(&mut self, line: &str);
}

/// One-time startup announcement, sent before the control loop begins.
pub fn announce_init<P: LinkPort>(port: &mut P) {
    port.send_line("INIT");
}

/// Drain buffered bytes until a recognized command or an empty buffer.
///
/// At most one command is honored per call; bytes buffered behind it stay
/// queued for the next loop iteration. Acknowledgement lines go out as part
/// of recognition, so they always precede any other output of the same
/// iteration.
pub fn poll_command<P: LinkPort>(port: &mut P) -> Option<Command> {
    while let Some(byte) = port.poll_byte() {
        match byte {
            b'E' => {
                port.send_line("ENABLED");
                return Some(Command::Enable);
            }
            b'D' => {
                port.send_line("DISABLED");
                return Some(Command::Disable);
            }
            b'P' => {
                port.send_line("PONG");
                return Some(Command::Ping);
            }
            other => {
                // Unrecognized bytes are protocol noise (line endings from a
                // chatty terminal, mostly). No reply.
                log::debug!("link: ignoring byte 0x{:02X}", other);
            }
        }
    }
    None
}
