//! Constant values of the Chip-8 architecture.

/// Number of general purpose registers.
pub const REGISTER_COUNT: usize = 0x10; // 16

/// Register used for the carry, borrow and collision flags.
pub const FLAG_REGISTER: usize = 0xF;

/// The lower memory space was historically used for the interpreter itself,
/// but is now used for fonts.
pub const MEM_START: usize = 0x200; // 512
pub const MEM_SIZE: usize = 0x1000; // 4096

/// Number of bytes available to a loaded program.
pub const PROGRAM_CAPACITY: usize = MEM_SIZE - MEM_START;

/// Levels of nesting allowed in the call stack.
///
/// The original RCA 1802 implementation allocated 48 bytes
/// for up to 12 levels of nesting. Later interpreters settled on 16,
/// which is what programs in the wild expect.
pub const STACK_SIZE: usize = 0x10;

/// Location of the built-in hexadecimal font in memory.
pub const FONTSET_START: Address = 0x050;
/// Each glyph is 8 pixels wide and 5 rows high.
pub const FONTSET_HEIGHT: usize = 5;
pub const FONTSET_GLYPH_COUNT: usize = 16;
pub const FONTSET_DATA_LENGTH: usize = FONTSET_HEIGHT * FONTSET_GLYPH_COUNT;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;
pub const DISPLAY_SIZE: [usize; 2] = [DISPLAY_WIDTH, DISPLAY_HEIGHT];
pub const DISPLAY_BUFFER_SIZE: usize = DISPLAY_WIDTH * DISPLAY_HEIGHT;
pub const DISPLAY_WIDTH_MASK: usize = DISPLAY_WIDTH - 1;
pub const DISPLAY_HEIGHT_MASK: usize = DISPLAY_HEIGHT - 1;

/// Sprites are one byte wide.
pub const SPRITE_WIDTH: usize = 8;

/// Default number of instructions executed in a second.
pub const CLOCK_FREQUENCY: u64 = 700;

/// Number of clock cycles in a second that delay timers count down.
pub const DELAY_FREQUENCY: u64 = 60;

/// Upper bound on timer ticks applied after a host stall.
///
/// When the host stalls (debugger, suspended terminal) the backlog
/// beyond this is dropped instead of draining the timers in one go.
pub const MAX_TIMER_CATCHUP: u32 = 4;

/// Shortest gap between two cycles that counts as a host stall, in milliseconds.
///
/// Raised to two instruction periods for clock rates slower than this.
pub const TIMER_STALL_MILLIS: u64 = 250;

/// Number of nanoseconds in a second
#[doc(hidden)]
pub const NANOS_IN_SECOND: u64 = 1_000_000_000;

/// Number of keys on the keyboard (0x0-0xF)
pub const KEY_COUNT: u8 = 16;

/// Type for storing the 12-bit memory addresses.
pub type Address = u16;

/// Monochrome screen contents, row major.
pub type DisplayBuffer = [bool; DISPLAY_BUFFER_SIZE];
