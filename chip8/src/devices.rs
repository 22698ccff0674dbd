//! IO device interface
use crate::constants::*;

/// Hooks to provide IO devices to the virtual machine.
///
/// The scheduler calls these once per cycle. Implementations should
/// return promptly; the VM never waits on a device.
pub trait Devices {
    /// Report which keys are currently held down, as a bitset
    /// with key `0x0` in the lowest bit.
    fn poll_keys(&mut self) -> u16;

    /// Blit the display buffer to screen output.
    ///
    /// Only called after a cycle that changed the screen.
    fn draw(&mut self, display: &DisplayBuffer);

    /// Turn the sound buzzer on or off.
    fn buzz(&mut self, state: bool);

    /// Checked once per cycle. Returning `true` stops the run loop.
    fn should_quit(&mut self) -> bool {
        false
    }
}

/// Devices that do nothing, for running programs headless.
#[derive(Debug, Default)]
pub struct NullDevices;

impl Devices for NullDevices {
    fn poll_keys(&mut self) -> u16 {
        0
    }

    fn draw(&mut self, _display: &DisplayBuffer) {}

    fn buzz(&mut self, _state: bool) {}
}
