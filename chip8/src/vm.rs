//! Virtual machine.
use std::{fmt::Write, time::Duration};

use log::{debug, info, warn};
use rand::prelude::*;

use crate::{
    constants::*,
    cpu::{Chip8Cpu, KeyWait},
    error::{Chip8Error, Chip8Result, Fault},
    font,
    keypad::KeyCode,
    op::Op,
};

pub struct Chip8Vm {
    cpu: Chip8Cpu,
    rng: StdRng,
    /// Execution error that halted the machine.
    fault: Option<Fault>,
    conf: Chip8Conf,
}

impl Chip8Vm {
    pub fn new(conf: Chip8Conf) -> Self {
        let rng = match conf.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Chip8Vm {
            cpu: Chip8Cpu::new(),
            rng,
            fault: None,
            conf,
        }
    }

    /// Configuration that was used to instantiate the VM.
    pub fn config(&self) -> &Chip8Conf {
        &self.conf
    }

    /// Replace the built-in font.
    pub fn load_font(&mut self, fontset: &[u8]) -> Chip8Result<()> {
        self.cpu.ram.load_font(fontset)
    }

    /// Load a program and prepare the machine to run it from the start.
    ///
    /// Registers, stack, display, timers and keypad are reset. Memory
    /// outside of the program region is kept, so the font stays in place.
    pub fn load_bytecode(&mut self, bytecode: &[u8]) -> Chip8Result<()> {
        // Nothing is touched when the program doesn't fit.
        self.cpu.ram.load(bytecode)?;

        self.cpu.reset();
        self.fault = None;

        info!("loaded program of {} bytes", bytecode.len());

        Ok(())
    }

    pub fn cpu(&self) -> &Chip8Cpu {
        &self.cpu
    }

    pub fn display_buffer(&self) -> &DisplayBuffer {
        self.cpu.display.as_buffer()
    }

    /// Copy of the screen for a renderer.
    pub fn snapshot(&self) -> Box<DisplayBuffer> {
        self.cpu.display.snapshot()
    }

    /// Whether the screen changed since the last call.
    pub fn take_redraw(&mut self) -> bool {
        self.cpu.display.take_dirty()
    }

    /// The buzzer should sound while this is true.
    pub fn sound_active(&self) -> bool {
        self.cpu.timers.is_buzzing()
    }

    /// Reports the new buzzer state when it was switched on or off since the last call.
    pub fn take_buzzer_change(&mut self) -> Option<bool> {
        let buzzing = self.cpu.timers.is_buzzing();
        if buzzing != self.cpu.buzzer_state {
            self.cpu.buzzer_state = buzzing;
            Some(buzzing)
        } else {
            None
        }
    }

    /// The fault that halted execution, if any.
    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }
}

/// Control flow signal returned after each step.
#[derive(Debug, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Flow {
    Ok,
    /// Program counter has jumped to a new address.
    ///
    /// This is useful for the caller to avoid being
    /// blocked on infinite or long running loops.
    ///
    /// This is returned when the interpreter encounters:
    ///
    /// - 1nnn (`JP addr`)
    /// - 2nnn (`CALL addr`)
    /// - 00EE (`RET`)
    /// - Bnnn (`JP V0, addr`)
    Jump,
    /// The display buffer was changed.
    Draw,
    /// The sound timer was set.
    Sound,
    /// Wait for a keypress.
    ///
    /// This is triggered by the opcode `Fx0A` (`LD Vx, K`), which stops
    /// execution until a key is pressed, and loads the key value into `Vx`.
    KeyWait,
}

/// VM Configuration Parameters.
#[derive(Debug, Clone)]
pub struct Chip8Conf {
    /// Instructions executed per second. `None` runs as fast as the host allows.
    pub clock_frequency: Option<Hz>,
    /// Rate at which the delay and sound timers count down.
    pub timer_frequency: Hz,
    /// Seed for `Cxnn` (`RND Vx, byte`). Seeded from entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for Chip8Conf {
    fn default() -> Self {
        Self {
            clock_frequency: Some(Hz(CLOCK_FREQUENCY)),
            timer_frequency: Hz(DELAY_FREQUENCY),
            seed: None,
        }
    }
}

/// CPU clock frequency, in hertz (per second)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Hz(pub u64);

impl From<Hz> for Duration {
    fn from(freq: Hz) -> Self {
        if freq.0 == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(NANOS_IN_SECOND / freq.0)
        }
    }
}

/// Interpreter
impl Chip8Vm {
    /// Sets the keyboard key input state.
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        let state = self.cpu.keypad.state();
        let state = if pressed {
            state | key.mask()
        } else {
            state & !key.mask()
        };
        self.cpu.keypad.set_state(state);
    }

    /// Overwrite the keyboard state with a bitset reported by the host.
    pub fn set_keys(&mut self, state: u16) {
        self.cpu.keypad.set_state(state);
    }

    /// Clear the keyboard input state, setting all keys to up.
    pub fn clear_keys(&mut self) {
        self.cpu.keypad.clear()
    }

    /// Count down the delay and sound timers by one tick.
    pub fn tick_timers(&mut self) {
        self.cpu.timers.tick();
    }

    /// Run up to `step_count` instructions, stopping early on error.
    pub fn run_steps(&mut self, step_count: usize) -> Chip8Result<Flow> {
        let mut flow = Flow::Ok;

        for _ in 0..step_count {
            flow = self.step()?;
        }

        Ok(flow)
    }

    /// Execute a single fetch-decode-execute cycle.
    ///
    /// While the machine waits on `Fx0A` the keypad is checked for a new
    /// key press instead, and the program counter stays put.
    pub fn step(&mut self) -> Chip8Result<Flow> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone().into());
        }

        if let Some(wait) = self.cpu.key_wait.as_mut() {
            return match wait.poll(self.cpu.keypad.state()) {
                Some(key) => {
                    let vx = wait.vx;
                    self.cpu.key_wait = None;
                    self.cpu.registers.set(vx, key)?;
                    self.cpu.registers.advance_pc();
                    debug!("key wait resumed with k{key:x}");
                    Ok(Flow::Ok)
                }
                None => Ok(Flow::KeyWait),
            };
        }

        let pc = self.cpu.registers.pc();

        // Each instruction is two bytes, with the opcode identity in the first 4-bit nibble.
        let instr = match self.cpu.ram.read_word(pc as usize) {
            Ok(instr) => instr,
            Err(cause) => return Err(self.halt(pc, None, cause)),
        };

        self.cpu.registers.advance_pc();

        match Op::decode(instr).and_then(|op| {
            op_trace(pc, instr, &op);
            self.exec(op)
        }) {
            Ok(flow) => Ok(flow),
            Err(cause) => Err(self.halt(pc, Some(instr), cause)),
        }
    }

    /// Stop the machine at the failing instruction.
    #[cold]
    fn halt(&mut self, pc: Address, opcode: Option<u16>, cause: Chip8Error) -> Chip8Error {
        self.cpu.registers.set_pc(pc);

        let fault = Fault { pc, opcode, cause };
        warn!("halted: {fault}");
        self.fault = Some(fault.clone());

        fault.into()
    }

    fn exec(&mut self, op: Op) -> Chip8Result<Flow> {
        let regs = &mut self.cpu.registers;
        let mut control_flow = Flow::Ok;

        match op {
            // 00E0 (CLS)
            //
            // Clear display
            Op::ClearScreen => {
                self.cpu.display.clear();
                control_flow = Flow::Draw;
            }
            // 00EE (RET)
            //
            // Return from a subroutine.
            // Set the program counter to the value at the top of the stack.
            Op::Return => {
                let address = self.cpu.stack.pop()?;
                regs.set_pc(address);
                control_flow = Flow::Jump;
            }
            // 1nnn (JP addr)
            Op::JumpAddress { address } => {
                regs.set_pc(address);
                control_flow = Flow::Jump;
            }
            // 2nnn (CALL addr)
            //
            // The program counter already points past the call,
            // which is where the subroutine returns to.
            Op::Call { address } => {
                self.cpu.stack.push(regs.pc())?;
                regs.set_pc(address);
                control_flow = Flow::Jump;
            }
            // 3xnn (SE Vx, byte)
            Op::Skip_Eq_Byte { vx, nn } => {
                if regs.get(vx)? == nn {
                    regs.skip();
                }
            }
            // 4xnn (SNE Vx, byte)
            Op::Skip_NotEq_Byte { vx, nn } => {
                if regs.get(vx)? != nn {
                    regs.skip();
                }
            }
            // 5xy0 (SE Vx, Vy)
            Op::Skip_Eq { vx, vy } => {
                if regs.get(vx)? == regs.get(vy)? {
                    regs.skip();
                }
            }
            // 6xnn (LD Vx, byte)
            Op::Load_Byte { vx, nn } => regs.set(vx, nn)?,
            // 7xnn (ADD Vx, byte)
            //
            // Add value NN to register VX. Carry flag is not set.
            Op::Add_Byte { vx, nn } => {
                let x = regs.get(vx)?;
                regs.set(vx, x.wrapping_add(nn))?;
            }
            // 8xy0 (LD Vx, Vy)
            Op::Load_Vx_Vy { vx, vy } => regs.set(vx, regs.get(vy)?)?,
            // 8xy1 (OR Vx, Vy)
            Op::Or_Vx_Vy { vx, vy } => regs.set(vx, regs.get(vx)? | regs.get(vy)?)?,
            // 8xy2 (AND Vx, Vy)
            Op::And_Vx_Vy { vx, vy } => regs.set(vx, regs.get(vx)? & regs.get(vy)?)?,
            // 8xy3 (XOR Vx, Vy)
            Op::Xor_Vx_Vy { vx, vy } => regs.set(vx, regs.get(vx)? ^ regs.get(vy)?)?,
            // 8xy4 (ADD Vx, Vy)
            //
            // Overflow is wrapped. If overflow, set VF to 1, else 0.
            //
            // The flag is written last, so it wins when Vx is VF.
            Op::Add_Vx_Vy { vx, vy } => {
                let (result, carry) = regs.get(vx)?.overflowing_add(regs.get(vy)?);
                regs.set(vx, result)?;
                regs.set_flag(carry);
            }
            // 8xy5 (SUB Vx, Vy)
            //
            // VF is set to 0 when there is a borrow, set to 1 when there isn't.
            Op::Sub_Vx_Vy { vx, vy } => {
                let (x, y) = (regs.get(vx)?, regs.get(vy)?);
                regs.set(vx, x.wrapping_sub(y))?;
                regs.set_flag(x >= y);
            }
            // 8xy6 (SHR Vx)
            //
            // If the least-significant bit of Vx is 1, then VF is set to 1, otherwise 0.
            Op::ShiftRight { vx } => {
                let x = regs.get(vx)?;
                regs.set(vx, x >> 1)?;
                regs.set_flag(x & 1 == 1);
            }
            // 8xy7 (SUBN Vx, Vy)
            //
            // VF is set to 0 when there is a borrow, set to 1 when there isn't.
            Op::SubReverse_Vx_Vy { vx, vy } => {
                let (x, y) = (regs.get(vx)?, regs.get(vy)?);
                regs.set(vx, y.wrapping_sub(x))?;
                regs.set_flag(y >= x);
            }
            // 8xyE (SHL Vx)
            //
            // If the most-significant bit of Vx is 1, then VF is set to 1, otherwise 0.
            Op::ShiftLeft { vx } => {
                let x = regs.get(vx)?;
                regs.set(vx, x << 1)?;
                regs.set_flag(x >> 7 == 1);
            }
            // 9xy0 (SNE Vx, Vy)
            Op::Skip_NotEq { vx, vy } => {
                if regs.get(vx)? != regs.get(vy)? {
                    regs.skip();
                }
            }
            // Annn (LD I, addr)
            Op::Load_Address { address } => regs.set_index(address),
            // Bnnn (JP V0, addr)
            Op::Jump_V0 { address } => {
                regs.set_pc(address + regs.get(0)? as Address);
                control_flow = Flow::Jump;
            }
            // Cxnn (RND Vx, byte)
            //
            // Set register VX to the result of bitwise AND between a random number and NN.
            Op::Random { vx, nn } => regs.set(vx, nn & self.rng.gen::<u8>())?,
            // Dxyn (DRW Vx, Vy, nibble)
            //
            // Draw an N rows high sprite, read from memory at I, at the
            // coordinate in Vx and Vy. VF is set when a pixel was erased.
            Op::Draw { vx, vy, n } => {
                let (x, y) = (regs.get(vx)? as usize, regs.get(vy)? as usize);
                let sprite = self.cpu.ram.read_slice(regs.index() as usize, n as usize)?;
                let is_erased = self.cpu.display.draw_sprite(x, y, sprite);
                regs.set_flag(is_erased);
                control_flow = Flow::Draw;
            }
            // Ex9E (SKP Vx)
            Op::Skip_Key { vx } => {
                if self.cpu.keypad.is_pressed(regs.get(vx)? & 0xF)? {
                    regs.skip();
                }
            }
            // ExA1 (SKNP Vx)
            Op::Skip_NotKey { vx } => {
                if !self.cpu.keypad.is_pressed(regs.get(vx)? & 0xF)? {
                    regs.skip();
                }
            }
            // Fx07 (LD Vx, DT)
            Op::Load_Vx_Delay { vx } => regs.set(vx, self.cpu.timers.delay())?,
            // Fx0A (LD Vx, K)
            //
            // All execution stops until a key is pressed, then the value of that key is stored in Vx.
            Op::Load_Vx_Key { vx } => {
                // rewind the program counter to stall the machine
                regs.rewind_pc();
                self.cpu.key_wait = Some(KeyWait {
                    vx,
                    held: self.cpu.keypad.state(),
                });
                debug!("key wait into v{vx:X}");
                control_flow = Flow::KeyWait;
            }
            // Fx15 (LD DT, Vx)
            Op::Load_Delay_Vx { vx } => self.cpu.timers.set_delay(regs.get(vx)?),
            // Fx18 (LD ST, Vx)
            Op::Load_Sound_Vx { vx } => {
                self.cpu.timers.set_sound(regs.get(vx)?);
                control_flow = Flow::Sound;
            }
            // Fx1E (ADD I, Vx)
            //
            // VF is not affected.
            Op::Add_Address { vx } => {
                let addr = regs.index();
                regs.set_index(addr.wrapping_add(regs.get(vx)? as Address));
            }
            // Fx29 (LD F, Vx)
            //
            // Set I = location of sprite for digit Vx.
            Op::Load_Font { vx } => regs.set_index(font::glyph_address(regs.get(vx)?)),
            // Fx33 (LD B, Vx)
            //
            // Store the binary-coded decimal representation of Vx
            // in the memory locations I, I+1, and I+2.
            Op::Load_Bcd { vx } => {
                let x = regs.get(vx)?;
                let digits = [x / 100, x / 10 % 10, x % 10];
                self.cpu.ram.write_slice(regs.index() as usize, &digits)?;
            }
            // Fx55 (LD [I], Vx)
            //
            // Store registers V0 through Vx in memory starting at location I.
            // I is left unchanged.
            Op::Store_Registers { vx } => {
                let addr = regs.index() as usize;
                self.cpu.ram.write_slice(addr, regs.range(vx)?)?;
            }
            // Fx65 (LD Vx, [I])
            //
            // Read registers V0 through Vx from memory starting at location I.
            // I is left unchanged.
            Op::Load_Registers { vx } => {
                let data = self
                    .cpu
                    .ram
                    .read_slice(regs.index() as usize, vx as usize + 1)?;
                regs.range_mut(vx)?.copy_from_slice(data);
            }
        }

        Ok(control_flow)
    }
}

/// Troubleshooting
#[doc(hidden)]
impl Chip8Vm {
    /// Returns the program region of memory as a human readable string.
    pub fn dump_ram(&self, count: usize) -> Result<String, std::fmt::Error> {
        let ram = self.cpu.ram.as_slice();
        let mut buf = String::new();

        for i in (MEM_START..(MEM_START + count).min(MEM_SIZE - 1)).step_by(2) {
            writeln!(buf, "{:04X}: {:02X}{:02X}", i, ram[i], ram[i + 1])?;
        }

        Ok(buf)
    }

    pub fn dump_display(&self) -> Result<String, std::fmt::Error> {
        self.cpu.display.dump()
    }

    pub fn dump_keys(&self) -> Result<String, std::fmt::Error> {
        let mut buf = String::new();

        if self.cpu.keypad.any() {
            write!(buf, "keys: ")?;
            for keycode in KeyCode::ALL {
                if self.cpu.keypad.state() & keycode.mask() != 0 {
                    write!(buf, "{keycode}")?;
                }
            }
        }

        Ok(buf)
    }
}

#[cfg(feature = "op_trace")]
#[inline]
fn op_trace(pc: Address, instr: u16, op: &Op) {
    log::trace!("{:04X}: {:04X} {}", pc, instr, op);
}

#[cfg(not(feature = "op_trace"))]
#[inline]
fn op_trace(_: Address, _: u16, _: &Op) {}
