//! Bit-banged 1-Wire bus for iButton-style token probes.
//!
//! Single open-drain GPIO with an external pull-up. Each call to
//! [`OneWireBus::read_id`] runs one full transaction: reset pulse, presence
//! detect, READ ROM (0x33), 64 identifier bits LSB-first. Checksum
//! validation is deliberately not done here.

use esp_hal::delay::Delay;
use esp_hal::gpio::{DriveMode, Flex, InputPin, OutputConfig, OutputPin, Pull};

use crate::token::{TokenBus, TokenId, ID_LEN};

// Standard-speed 1-Wire slot timings (microseconds)
const RESET_LOW_US: u32 = 480;
const PRESENCE_SAMPLE_US: u32 = 70;
const RESET_TAIL_US: u32 = 410;
const SLOT_START_US: u32 = 6;
const WRITE_ONE_RELEASE_US: u32 = 64;
const WRITE_ZERO_HOLD_US: u32 = 54;
const WRITE_ZERO_RELEASE_US: u32 = 10;
const READ_SAMPLE_US: u32 = 9;
const READ_TAIL_US: u32 = 55;

const READ_ROM: u8 = 0x33;

/// The probe contact, held as an open-drain pin we only ever pull low.
pub struct OneWireBus {
    pin: Flex<'static>,
    delay: Delay,
}

impl OneWireBus {
    /// Take ownership of the bus pin and configure it open-drain with the
    /// internal pull-up as a fallback for a missing external one.
    pub fn new<P>(pin: P) -> Self
    where
        P: InputPin + OutputPin + 'static,
    {
        let mut pin = Flex::new(pin);
        pin.apply_output_config(
            &OutputConfig::default()
                .with_drive_mode(DriveMode::OpenDrain)
                .with_pull(Pull::Up),
        );
        pin.set_high();
        pin.set_output_enable(true);
        pin.set_input_enable(true);

        Self {
            pin,
            delay: Delay::new(),
        }
    }

    /// Reset pulse; true when a device answered with a presence pulse.
    fn reset(&mut self) -> bool {
        self.pin.set_low();
        self.delay.delay_micros(RESET_LOW_US);
        self.pin.set_high();
        self.delay.delay_micros(PRESENCE_SAMPLE_US);
        let present = !self.pin.is_high();
        self.delay.delay_micros(RESET_TAIL_US);
        present
    }

    /// One write slot. Slot timing is interrupt-sensitive, so the whole slot
    /// runs inside a critical section.
    fn write_bit(&mut self, bit: bool) {
        critical_section::with(|_| {
            self.pin.set_low();
            if bit {
                self.delay.delay_micros(SLOT_START_US);
                self.pin.set_high();
                self.delay.delay_micros(WRITE_ONE_RELEASE_US);
            } else {
                self.delay.delay_micros(SLOT_START_US + WRITE_ZERO_HOLD_US);
                self.pin.set_high();
                self.delay.delay_micros(WRITE_ZERO_RELEASE_US);
            }
        });
    }

    /// One read slot; the device holds the line low to signal a zero.
    fn read_bit(&mut self) -> bool {
        critical_section::with(|_| {
            self.pin.set_low();
            self.delay.delay_micros(SLOT_START_US);
            self.pin.set_high();
            self.delay.delay_micros(READ_SAMPLE_US);
            let bit = self.pin.is_high();
            self.delay.delay_micros(READ_TAIL_US);
            bit
        })
    }

    fn write_byte(&mut self, byte: u8) {
        for i in 0..8 {
            self.write_bit((byte >> i) & 1 != 0);
        }
    }

    fn read_byte(&mut self) -> u8 {
        let mut byte = 0u8;
        for i in 0..8 {
            if self.read_bit() {
                byte |= 1 << i;
            }
        }
        byte
    }
}

impl TokenBus for OneWireBus {
    fn read_id(&mut self) -> Option<TokenId> {
        if !self.reset() {
            return None;
        }

        self.write_byte(READ_ROM);
        let mut id: TokenId = [0; ID_LEN];
        for byte in id.iter_mut() {
            *byte = self.read_byte();
        }
        Some(id)
    }
}
