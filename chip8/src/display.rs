//! Monochrome framebuffer.
use std::fmt::{self, Write};

use crate::constants::*;

/// Screen buffer that sprites are drawn to.
pub struct Framebuffer {
    pixels: Box<DisplayBuffer>,
    /// Set when the contents changed since the host last took a look.
    dirty: bool,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self {
            pixels: Box::new([false; DISPLAY_BUFFER_SIZE]),
            dirty: false,
        }
    }
}

impl Framebuffer {
    pub fn new() -> Self {
        Default::default()
    }

    /// Turn every pixel off.
    pub fn clear(&mut self) {
        self.pixels.fill(false);
        self.dirty = true;
    }

    /// XOR a sprite onto the screen at the given coordinate.
    ///
    /// Each byte of `sprite` is one row, 8 pixels wide, most significant bit
    /// on the left. Pixels that fall off an edge wrap around to the opposite side.
    ///
    /// Returns `true` when any pixel was switched from on to off, which programs
    /// use for collision detection.
    pub fn draw_sprite(&mut self, x: usize, y: usize, sprite: &[u8]) -> bool {
        let mut is_erased = false;

        for (r, row) in sprite.iter().enumerate() {
            // Each row is 8 bits representing the 8 pixels of the sprite.
            for c in 0..SPRITE_WIDTH {
                let new_px = (row >> (7 - c) & 1) != 0;
                if !new_px {
                    continue;
                }

                let d = ((x + c) & DISPLAY_WIDTH_MASK)
                    + ((y + r) & DISPLAY_HEIGHT_MASK) * DISPLAY_WIDTH;
                let old_px = self.pixels[d];

                // XOR erases a pixel when both the old and new values are both 1.
                is_erased |= old_px;
                self.pixels[d] = !old_px;
            }
        }

        self.dirty = true;
        is_erased
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[(x & DISPLAY_WIDTH_MASK) + (y & DISPLAY_HEIGHT_MASK) * DISPLAY_WIDTH]
    }

    #[inline]
    pub fn as_buffer(&self) -> &DisplayBuffer {
        &self.pixels
    }

    /// Owned copy of the screen that can be handed to a renderer.
    pub fn snapshot(&self) -> Box<DisplayBuffer> {
        self.pixels.clone()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns whether the screen changed, and resets the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Render the screen as lines of `#` and `.` characters.
    pub fn dump(&self) -> Result<String, fmt::Error> {
        let mut buf = String::with_capacity((DISPLAY_WIDTH + 1) * DISPLAY_HEIGHT);

        for y in 0..DISPLAY_HEIGHT {
            for x in 0..DISPLAY_WIDTH {
                if self.pixels[x + y * DISPLAY_WIDTH] {
                    write!(buf, "#")?;
                } else {
                    write!(buf, ".")?;
                }
            }
            writeln!(buf)?;
        }

        Ok(buf)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn lit_columns(fb: &Framebuffer, y: usize) -> Vec<usize> {
        (0..DISPLAY_WIDTH).filter(|x| fb.pixel(*x, y)).collect()
    }

    #[test]
    fn test_draw_wrap_horizontal() {
        let mut fb = Framebuffer::new();
        let collision = fb.draw_sprite(60, 0, &[0xFF]);

        assert!(!collision);
        assert_eq!(lit_columns(&fb, 0), vec![0, 1, 2, 3, 60, 61, 62, 63]);
    }

    #[test]
    fn test_draw_wrap_vertical() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(0, 30, &[0x80, 0x80, 0x80, 0x80]);

        assert!(fb.pixel(0, 30));
        assert!(fb.pixel(0, 31));
        assert!(fb.pixel(0, 0));
        assert!(fb.pixel(0, 1));
        assert!(!fb.pixel(0, 2));
    }

    #[test]
    fn test_double_draw_restores() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(3, 3, &[0x18]);
        let before = fb.snapshot();

        let sprite = [0xF0, 0x90, 0x90, 0x90, 0xF0];
        assert!(!fb.draw_sprite(10, 12, &sprite));
        assert!(fb.draw_sprite(10, 12, &sprite));

        assert_eq!(fb.as_buffer(), &*before);
    }

    /// Zero bits in a sprite must not erase pixels.
    #[test]
    fn test_draw_collision() {
        let mut fb = Framebuffer::new();

        // ____####
        assert!(!fb.draw_sprite(4, 0, &[0b1111_0000]));
        // ########
        assert!(!fb.draw_sprite(0, 0, &[0b1111_0000]));
        assert_eq!(lit_columns(&fb, 0), (0..8).collect::<Vec<_>>());

        // ##______ on top flips two pixels off.
        assert!(fb.draw_sprite(0, 0, &[0b1100_0000]));
        assert_eq!(lit_columns(&fb, 0), (2..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_clear_marks_dirty() {
        let mut fb = Framebuffer::new();
        assert!(!fb.is_dirty());

        fb.draw_sprite(0, 0, &[0xFF]);
        assert!(fb.take_dirty());
        assert!(!fb.take_dirty());

        fb.clear();
        assert!(fb.take_dirty());
        assert!(fb.as_buffer().iter().all(|px| !px));
    }

    #[test]
    fn test_dump() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(0, 0, &[0b1010_0000]);

        let dump = fb.dump().unwrap();
        let first = dump.lines().next().unwrap();
        assert!(first.starts_with("#.#."));
        assert_eq!(dump.lines().count(), DISPLAY_HEIGHT);
    }
}
