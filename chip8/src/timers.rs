//! Delay and sound timers.

/// Two 8-bit countdown registers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timers {
    /// (DT) Delay timer that counts down to 0.
    delay: u8,
    /// (ST) Sound timer that counts down to 0. When it has a non-zero value, a beep is played.
    sound: u8,
}

impl Timers {
    pub fn new() -> Self {
        Default::default()
    }

    /// Count down both timers by one, stopping at zero.
    #[inline]
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    #[inline(always)]
    pub fn delay(&self) -> u8 {
        self.delay
    }

    #[inline(always)]
    pub fn set_delay(&mut self, value: u8) {
        self.delay = value;
    }

    #[inline(always)]
    pub fn sound(&self) -> u8 {
        self.sound
    }

    #[inline(always)]
    pub fn set_sound(&mut self, value: u8) {
        self.sound = value;
    }

    /// The buzzer sounds for as long as the sound timer is counting.
    #[inline(always)]
    pub fn is_buzzing(&self) -> bool {
        self.sound > 0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_tick() {
        let mut timers = Timers::new();
        timers.set_delay(2);
        timers.set_sound(1);
        assert!(timers.is_buzzing());

        timers.tick();
        assert_eq!(timers.delay(), 1);
        assert_eq!(timers.sound(), 0);
        assert!(!timers.is_buzzing());

        timers.tick();
        timers.tick();
        assert_eq!(timers.delay(), 0);
        assert_eq!(timers.sound(), 0);
    }
}
