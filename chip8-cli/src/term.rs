//! Terminal host devices.
use std::{
    io::{self, Stdout, Write},
    time::Duration,
};

use chip8::{constants::*, Devices, KeyMap};
use crossterm::{
    cursor,
    event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers},
    execute, queue,
    style::Print,
    terminal,
};
use log::warn;

/// Drives the machine from a raw mode terminal.
///
/// Terminals only report key presses, never releases. A pressed key is
/// reported as held for a fixed number of polls, and auto-repeat from
/// the terminal keeps it held for as long as the user holds it down.
pub struct TermDevices {
    out: Stdout,
    keymap: KeyMap<char>,
    /// Remaining polls each key stays down for.
    held: [u32; KEY_COUNT as usize],
    hold_polls: u32,
    quit: bool,
}

impl TermDevices {
    /// Puts the terminal into raw mode on an alternate screen, which is
    /// restored when dropped.
    pub fn new(hold_polls: u32) -> io::Result<Self> {
        let mut out = io::stdout();

        terminal::enable_raw_mode()?;
        execute!(
            out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All)
        )?;

        Ok(Self {
            out,
            keymap: KeyMap::qwerty(),
            held: [0; KEY_COUNT as usize],
            hold_polls: hold_polls.max(1),
            quit: false,
        })
    }

    fn read_events(&mut self) -> io::Result<()> {
        while poll(Duration::ZERO)? {
            if let Event::Key(KeyEvent { code, modifiers }) = read()? {
                match code {
                    KeyCode::Esc => self.quit = true,
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        self.quit = true
                    }
                    KeyCode::Char(c) => {
                        if let Some(keycode) = self.keymap.map_key(c) {
                            self.held[keycode.as_u8() as usize] = self.hold_polls;
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }
}

impl TermDevices {
    /// A terminal that can't be written to ends the run.
    fn check_output(&mut self, result: io::Result<()>) {
        if let Err(err) = result {
            warn!("terminal output failed: {err}");
            self.quit = true;
        }
    }
}

impl Devices for TermDevices {
    fn poll_keys(&mut self) -> u16 {
        if let Err(err) = self.read_events() {
            warn!("terminal input failed: {err}");
            self.quit = true;
        }

        let mut state = 0;
        for (key, remaining) in self.held.iter_mut().enumerate() {
            if *remaining > 0 {
                *remaining -= 1;
                state |= 1 << key;
            }
        }

        state
    }

    fn draw(&mut self, display: &DisplayBuffer) {
        let result = frame(&mut self.out, display);
        self.check_output(result);
    }

    fn buzz(&mut self, state: bool) {
        if state {
            let result = bell(&mut self.out);
            self.check_output(result);
        }
    }

    fn should_quit(&mut self) -> bool {
        self.quit
    }
}

impl Drop for TermDevices {
    fn drop(&mut self) {
        let _ = execute!(self.out, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Write the whole screen from the top left corner.
fn frame(out: &mut impl Write, display: &DisplayBuffer) -> io::Result<()> {
    queue!(out, cursor::MoveTo(0, 0), Print(render(display)))?;
    out.flush()
}

/// Ring the terminal bell.
fn bell(out: &mut impl Write) -> io::Result<()> {
    out.write_all(b"\x07")?;
    out.flush()
}

/// Render the screen as half block characters, two pixel rows per line.
///
/// Lines end in `\r\n` since raw mode doesn't return the carriage.
pub fn render(display: &DisplayBuffer) -> String {
    let mut buf = String::with_capacity((DISPLAY_WIDTH + 2) * DISPLAY_HEIGHT / 2 * 3);

    for y in (0..DISPLAY_HEIGHT).step_by(2) {
        for x in 0..DISPLAY_WIDTH {
            let top = display[x + y * DISPLAY_WIDTH];
            let bottom = display[x + (y + 1) * DISPLAY_WIDTH];
            buf.push(match (top, bottom) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            });
        }
        buf.push_str("\r\n");
    }

    buf
}

#[cfg(test)]
mod test {
    use super::*;

    /// Terminal that went away.
    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn test_output_errors() {
        let display = [false; DISPLAY_BUFFER_SIZE];

        assert!(bell(&mut Closed).is_err());
        assert!(frame(&mut Closed, &display).is_err());

        let mut out = Vec::new();
        bell(&mut out).unwrap();
        assert_eq!(out, b"\x07");

        let mut out = Vec::new();
        frame(&mut out, &display).unwrap();
        assert!(String::from_utf8(out).unwrap().ends_with(&render(&display)));
    }

    #[test]
    fn test_render() {
        let mut display = [false; DISPLAY_BUFFER_SIZE];
        display[0] = true;
        display[1 + DISPLAY_WIDTH] = true;
        display[2] = true;
        display[2 + DISPLAY_WIDTH] = true;

        let text = render(&display);
        let lines: Vec<&str> = text.split("\r\n").collect();

        assert_eq!(lines.len(), DISPLAY_HEIGHT / 2 + 1);
        assert!(lines[0].starts_with("▀▄█ "));
        assert_eq!(lines[0].chars().count(), DISPLAY_WIDTH);
        assert!(lines[1].chars().all(|c| c == ' '));
    }
}
