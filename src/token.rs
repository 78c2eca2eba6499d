//! Token identifier validation and formatting.
//!
//! Tokens are iButton-style ROMs: 8 bytes where the last byte is a Dallas
//! CRC8 over the leading 7. Identifiers are trusted as presented; the CRC
//! only filters out misreads on the bus, it is not an authenticator.

use core::fmt::Write as _;

use heapless::String;

/// Bytes in a token identifier, checksum included.
pub const ID_LEN: usize = 8;

/// Raw identifier as read off the bus, checksum byte last.
pub type TokenId = [u8; ID_LEN];

/// `<` + 16 hex digits + `>`.
pub type TokenLine = String<18>;

/// One read attempt against the token bus.
///
/// `main` implements this on the bit-banged 1-Wire pin; tests implement it
/// on scripted identifiers. Checksum validation stays with the caller so a
/// misread is observable as such.
pub trait TokenBus {
    /// `None` when no token is present. A `Some` carries whatever came off
    /// the wire, checksum byte included and not yet validated.
    fn read_id(&mut self) -> Option<TokenId>;
}

/// Dallas/Maxim CRC8 (polynomial 0x8C, LSB-first), as used by the ROM
/// checksum of 1-Wire devices.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0;
    for &byte in data {
        let mut byte = byte;
        for _ in 0..8 {
            let mix = (crc ^ byte) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= 0x8C;
            }
            byte >>= 1;
        }
    }
    crc
}

/// True when the trailing checksum byte matches the leading 7 bytes.
pub fn is_valid(id: &TokenId) -> bool {
    crc8(&id[..ID_LEN - 1]) == id[ID_LEN - 1]
}

/// Format an identifier for the report line: all 8 bytes as two-digit
/// uppercase hex, no separators, wrapped in `<` and `>`.
pub fn format_id(id: &TokenId) -> TokenLine {
    let mut line = TokenLine::new();
    let _ = line.push('<');
    for &byte in id {
        // Cannot overflow: 18 bytes is exactly the formatted width.
        let _ = write!(line, "{:02X}", byte);
    }
    let _ = line.push('>');
    line
}
