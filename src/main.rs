//! Outlet Controller - ESP32 firmware for an EV charging outlet.
//!
//! A managing device enables and disables the outlet relay over a serial
//! link; presented tokens are read from a 1-Wire probe and reported back.
//! All decisions live in the `controller` state machine, which this file
//! merely wires to the hardware and drives from a free-running loop.

#![no_std]
#![no_main]

use esp_bootloader_esp_idf::esp_app_desc;
esp_app_desc!();

mod controller;
mod gate;
mod indicator;
mod onewire;
mod protocol;
mod token;

use esp_hal::{
    clock::CpuClock,
    gpio::{Level, Output, OutputConfig},
    main,
    time::{Duration, Instant},
    timer::timg::{MwdtStage, TimerGroup},
    uart::{Config as UartConfig, Uart},
    Blocking,
};
use esp_println::logger::init_logger;

use crate::controller::Controller;
use crate::indicator::Indicator;
use crate::onewire::OneWireBus;
use crate::protocol::LinkPort;

// Timing constants
const POLL_INTERVAL_MS: u32 = 5;
const WATCHDOG_FEED_MS: u64 = 10_000;

const LINK_BAUD_DEFAULT: u32 = 9600;

fn link_baud() -> u32 {
    match option_env!("OUTLET_LINK_BAUD") {
        Some(value) => value.parse().unwrap_or(LINK_BAUD_DEFAULT),
        None => LINK_BAUD_DEFAULT,
    }
}

/// Managing-device link on UART1.
struct SerialLink {
    uart: Uart<'static, Blocking>,
}

impl SerialLink {
    fn write_all(&mut self, mut bytes: &[u8]) {
        // A dead link is not an error here: the peer's silence is what the
        // abandoned watchdog exists for.
        while !bytes.is_empty() {
            match self.uart.write(bytes) {
                Ok(0) | Err(_) => break,
                Ok(n) => bytes = &bytes[n..],
            }
        }
    }
}

impl LinkPort for SerialLink {
    fn poll_byte(&mut self) -> Option<u8> {
        let mut buf = [0u8; 1];
        match self.uart.read_buffered(&mut buf) {
            Ok(n) if n > 0 => Some(buf[0]),
            _ => None,
        }
    }

    fn send_line(&mut self, line: &str) {
        self.write_all(line.as_bytes());
        self.write_all(b"\r\n");
    }
}

#[main]
fn main() -> ! {
    // Initialize logging (console UART, separate from the protocol link)
    init_logger(log::LevelFilter::Info);
    log::info!("Outlet Controller starting...");

    // Hardware init
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Hardware watchdog: if this loop ever wedges, reset the whole chip.
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let mut wdt = timg0.wdt;
    wdt.enable();
    wdt.set_timeout(MwdtStage::Stage0, Duration::from_secs(30));

    // Managing-device link (UART1, GPIO17=TX, GPIO16=RX)
    let uart = Uart::new(
        peripherals.UART1,
        UartConfig::default().with_baudrate(link_baud()),
    )
    .unwrap()
    .with_tx(peripherals.GPIO17)
    .with_rx(peripherals.GPIO16);
    let mut link = SerialLink { uart };

    // Outlet relay (GPIO25), off until the controller says otherwise
    let mut relay = Output::new(peripherals.GPIO25, Level::Low, OutputConfig::default());

    // Status indicator (GPIO32=green, GPIO33=red)
    let mut indicator = Indicator::new(
        Output::new(peripherals.GPIO32, Level::Low, OutputConfig::default()),
        Output::new(peripherals.GPIO33, Level::Low, OutputConfig::default()),
    );

    // Token probe (GPIO26, open-drain 1-Wire)
    let mut bus = OneWireBus::new(peripherals.GPIO26);

    let mut controller = Controller::new();
    let delay = esp_hal::delay::Delay::new();
    let mut last_watchdog_feed: u64 = 0;

    protocol::announce_init(&mut link);

    loop {
        let now_ms = Instant::now().duration_since_epoch().as_millis();

        // Tick values wrap at 2^32; the controller's interval arithmetic is
        // built for exactly that.
        let drive = controller.step(now_ms as u32, &mut bus, &mut link);

        relay.set_level(drive.relay_on.into());
        indicator.show(drive.color);

        // Feed watchdog to prove this loop isn't deadlocked
        if now_ms - last_watchdog_feed >= WATCHDOG_FEED_MS {
            last_watchdog_feed = now_ms;
            wdt.feed();
        }

        delay.delay_millis(POLL_INTERVAL_MS);
    }
}

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    critical_section::with(|_| {
        log::error!("PANIC: {}", info);
    });

    // Spin without feeding watchdog. The 30s timeout will trigger a full system reset.
    loop {
        core::hint::spin_loop();
    }
}
