//! Outlet authorization state machine.
//!
//! One `Controller` owns the authorization state and every timestamp in the
//! system. `step` is invoked by a free-running driver loop and runs to
//! completion with no blocking; tick progression is an input, so the whole
//! machine runs against synthetic clocks in the host tests.

use crate::gate::IntervalGate;
use crate::protocol::{self, Command, LinkPort};
use crate::token::{self, TokenBus};

// Timing constants (ticks are milliseconds)
/// Silence from the managing device longer than this forces `Abandoned`.
pub const ABANDONED_TIMEOUT: u32 = 30_000;
/// Cadence of the `ABANDONED` beacon line.
pub const ABANDONED_BEACON_INTERVAL: u32 = 5_000;
/// Minimum spacing between two successful token reads.
pub const BUTTON_INTERVAL: u32 = 3_000;
/// Blink cycle of the "waiting for token" indicator.
pub const BLINK_PERIOD: u32 = 2_000;
/// On-phase within each blink cycle.
pub const BLINK_ON: u32 = 120;

/// Authorization state of the outlet.
///
/// `Abandoned` doubles as the power-on state and the watchdog fallback; it is
/// the most restrictive state and the only one reachable without the managing
/// device saying anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No live managing device. Relay off, beaconing.
    Abandoned,
    /// Charging authorized. Relay on.
    Enabled,
    /// Managing device alive but charging not authorized. Relay off.
    Disabled,
}

/// Semantic color of the two-channel status indicator.
/// Amber is green and red driven together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Off,
    Green,
    Red,
    Amber,
}

/// What the hardware must do after one step: relay level plus indicator
/// color, both recomputed every iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drive {
    pub relay_on: bool,
    pub color: Color,
}

/// The control loop state: authorization plus the four event timestamps.
pub struct Controller {
    state: AuthState,
    /// Last word (any recognized command) from the managing device.
    contact: IntervalGate,
    /// Last successful token read; misreads do not touch it.
    token_gate: IntervalGate,
    /// Last `ABANDONED` beacon sent.
    beacon: IntervalGate,
    /// Last blink phase restart of the waiting indicator.
    blink: IntervalGate,
}

impl Controller {
    /// Power-on state: `Abandoned`, all timestamps at the startup sentinel.
    pub const fn new() -> Self {
        Self {
            state: AuthState::Abandoned,
            contact: IntervalGate::new(),
            token_gate: IntervalGate::new(),
            beacon: IntervalGate::new(),
            blink: IntervalGate::new(),
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// One control-loop iteration at tick `now`.
    ///
    /// The five sub-steps run in a fixed order; in particular watchdog expiry
    /// is evaluated *after* command ingestion so that an `Enable` arriving in
    /// the same iteration as the expiry still loses.
    pub fn step<B: TokenBus, P: LinkPort>(&mut self, now: u32, bus: &mut B, port: &mut P) -> Drive {
        // 1. Command ingestion: at most one recognized command per iteration.
        let command = protocol::poll_command(port);
        match command {
            Some(Command::Enable) => self.set_state(AuthState::Enabled),
            Some(Command::Disable) => self.set_state(AuthState::Disabled),
            Some(Command::Ping) | None => {}
        }

        // 2. Any word from the managing device (a bare ping included) proves
        //    it is alive. Expiry below is judged against the contact history
        //    *before* this refresh: a grant arriving in the same iteration
        //    the watchdog runs out still loses, and the device must repeat
        //    its command now that contact is re-established.
        let expired = self.contact.ready(now, ABANDONED_TIMEOUT);
        if command.is_some() {
            self.contact.refresh(now);
        }

        // 3. Watchdog expiry is the state of last resort and overrides
        //    whatever step 1 just set. A ping refreshes the watchdog but
        //    never exits Abandoned on its own; only an explicit E or D does.
        if expired {
            self.set_state(AuthState::Abandoned);
        }

        // 4. Token read, debounced on *successful* reads only. A checksum
        //    misread must not push back the next presentation's eligibility.
        if self.state != AuthState::Abandoned && self.token_gate.ready(now, BUTTON_INTERVAL) {
            match bus.read_id() {
                Some(id) if token::is_valid(&id) => {
                    port.send_line(token::format_id(&id).as_str());
                    self.token_gate.refresh(now);
                }
                Some(_) => log::warn!("token: checksum mismatch, read dropped"),
                None => {}
            }
        }

        // 5. Output drive. The relay level is recomputed from the state every
        //    iteration, after the expiry override, so it can never stay
        //    asserted across a transition out of Enabled.
        match self.state {
            AuthState::Enabled => Drive {
                relay_on: true,
                color: Color::Green,
            },
            AuthState::Disabled => Drive {
                relay_on: false,
                color: self.waiting_blink(now),
            },
            AuthState::Abandoned => {
                if self.beacon.fire(now, ABANDONED_BEACON_INTERVAL) {
                    port.send_line("ABANDONED");
                }
                Drive {
                    relay_on: false,
                    color: Color::Red,
                }
            }
        }
    }

    /// Short amber pulse at the start of each blink period.
    fn waiting_blink(&mut self, now: u32) -> Color {
        self.blink.fire(now, BLINK_PERIOD);
        if self.blink.elapsed(now) < BLINK_ON {
            Color::Amber
        } else {
            Color::Off
        }
    }

    fn set_state(&mut self, next: AuthState) {
        if self.state != next {
            log::info!("state: {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}
