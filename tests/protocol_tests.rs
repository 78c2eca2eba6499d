//! Unit tests for the managing-device line protocol.

#[path = "../src/protocol.rs"]
mod protocol;

use std::collections::VecDeque;

use protocol::{announce_init, poll_command, Command, LinkPort};

/// Buffer-backed stand-in for the UART link.
struct FakePort {
    rx: VecDeque<u8>,
    sent: Vec<String>,
}

impl FakePort {
    fn new(inbound: &[u8]) -> Self {
        Self {
            rx: inbound.iter().copied().collect(),
            sent: Vec::new(),
        }
    }
}

impl LinkPort for FakePort {
    fn poll_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn send_line(&mut self, line: &str) {
        self.sent.push(line.to_string());
    }
}

// ============================================================================
// Command recognition and acknowledgements
// ============================================================================

#[test]
fn test_enable_byte_is_recognized_and_acked() {
    let mut port = FakePort::new(b"E");
    assert_eq!(poll_command(&mut port), Some(Command::Enable));
    assert_eq!(port.sent, vec!["ENABLED"]);
}

#[test]
fn test_disable_byte_is_recognized_and_acked() {
    let mut port = FakePort::new(b"D");
    assert_eq!(poll_command(&mut port), Some(Command::Disable));
    assert_eq!(port.sent, vec!["DISABLED"]);
}

#[test]
fn test_ping_byte_is_recognized_and_acked() {
    let mut port = FakePort::new(b"P");
    assert_eq!(poll_command(&mut port), Some(Command::Ping));
    assert_eq!(port.sent, vec!["PONG"]);
}

#[test]
fn test_empty_buffer_yields_no_command() {
    let mut port = FakePort::new(b"");
    assert_eq!(poll_command(&mut port), None);
    assert!(port.sent.is_empty());
}

// ============================================================================
// Noise handling
// ============================================================================

#[test]
fn test_unrecognized_bytes_are_dropped_without_reply() {
    let mut port = FakePort::new(b"x\r\n?\x00e");
    assert_eq!(poll_command(&mut port), None);
    assert!(port.sent.is_empty());
    assert!(port.rx.is_empty());
}

#[test]
fn test_noise_before_a_command_is_skipped() {
    let mut port = FakePort::new(b"\r\n\r\nP");
    assert_eq!(poll_command(&mut port), Some(Command::Ping));
    assert_eq!(port.sent, vec!["PONG"]);
}

#[test]
fn test_lowercase_letters_are_noise() {
    // The protocol is uppercase-only; 'e' must not enable anything.
    let mut port = FakePort::new(b"edp");
    assert_eq!(poll_command(&mut port), None);
    assert!(port.sent.is_empty());
}

// ============================================================================
// One command per iteration
// ============================================================================

#[test]
fn test_at_most_one_command_per_poll() {
    let mut port = FakePort::new(b"ED");
    assert_eq!(poll_command(&mut port), Some(Command::Enable));
    // The 'D' stays buffered for the next iteration.
    assert_eq!(port.rx.len(), 1);
    assert_eq!(poll_command(&mut port), Some(Command::Disable));
    assert_eq!(poll_command(&mut port), None);
    assert_eq!(port.sent, vec!["ENABLED", "DISABLED"]);
}

#[test]
fn test_noise_between_commands_spans_iterations() {
    let mut port = FakePort::new(b"E..P");
    assert_eq!(poll_command(&mut port), Some(Command::Enable));
    assert_eq!(poll_command(&mut port), Some(Command::Ping));
    assert_eq!(port.sent, vec!["ENABLED", "PONG"]);
}

// ============================================================================
// Startup announcement
// ============================================================================

#[test]
fn test_init_announcement() {
    let mut port = FakePort::new(b"");
    announce_init(&mut port);
    assert_eq!(port.sent, vec!["INIT"]);
}
