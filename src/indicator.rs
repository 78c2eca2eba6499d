//! Two-channel status indicator.
//!
//! Green and red channels share one lens; driving both gives amber. The
//! semantic color is decided by the controller, this module only maps it
//! onto the two outputs.

use esp_hal::gpio::Output;

use crate::controller::Color;

pub struct Indicator {
    green: Output<'static>,
    red: Output<'static>,
}

impl Indicator {
    pub fn new(green: Output<'static>, red: Output<'static>) -> Self {
        Self { green, red }
    }

    pub fn show(&mut self, color: Color) {
        let (green, red) = match color {
            Color::Off => (false, false),
            Color::Green => (true, false),
            Color::Red => (false, true),
            Color::Amber => (true, true),
        };
        self.green.set_level(green.into());
        self.red.set_level(red.into());
    }
}
