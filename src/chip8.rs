use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

mod error;
mod font;
mod instruction;

pub use error::Chip8Error;
pub use instruction::Instruction;

use font::{FONTSET, GLYPH_SIZE};

pub const MEMORY_SIZE: usize = 4096;
pub const PROGRAM_START: u16 = 0x200; // programs start at 0x200
pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;
pub const STACK_SIZE: usize = 16;
pub const NUM_KEYS: usize = 16;

pub struct Chip8 {
    // CHIP-8 VM
    memory: [u8; MEMORY_SIZE], // system memory
    v: [u8; 16],               // registers V0-VE (VF is flag for some instructions)
    i: u16,                    // address register
    pc: u16,                   // program counter
    gfx: [u8; DISPLAY_WIDTH * DISPLAY_HEIGHT], // pixels state
    delay_timer: u8,
    sound_timer: u8, // timers count down at 60Hz
    stack: [u16; STACK_SIZE],
    sp: u16,                // stack pointer, next free slot
    key: [bool; NUM_KEYS], // hex keypad state

    // FX0A parks the machine here until set_key sees a press
    awaiting_key: bool,
    key_register: usize,

    // emulator resources
    draw_flag: bool,
    rng: StdRng,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    // A machine whose CXNN results are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let mut chip8 = Self {
            memory: [0; MEMORY_SIZE],
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            gfx: [0; DISPLAY_WIDTH * DISPLAY_HEIGHT],
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_SIZE],
            sp: 0,
            key: [false; NUM_KEYS],
            awaiting_key: false,
            key_register: 0,
            draw_flag: false,
            rng,
        };
        chip8.reset();
        chip8
    }

    // Returns the machine to power-on state. This is the only place the
    // font is written, so it must run before first use (`new` does it).
    pub fn reset(&mut self) {
        self.memory = [0; MEMORY_SIZE];
        self.v = [0; 16];
        self.i = 0;
        self.pc = PROGRAM_START;
        self.gfx = [0; DISPLAY_WIDTH * DISPLAY_HEIGHT];
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.stack = [0; STACK_SIZE];
        self.sp = 0;
        self.key = [false; NUM_KEYS];
        self.awaiting_key = false;
        self.key_register = 0;
        // blank the screen on the first frame
        self.draw_flag = true;

        // CHIP-8 systems had the interpreter in the first 512 bytes of memory
        // since we're emulating that we can just store the fontset there
        self.memory[..FONTSET.len()].copy_from_slice(&FONTSET);

        debug!("machine reset");
    }

    // Copies `program` into memory at 0x200. Memory past the end of the
    // program is left as is.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        let start = PROGRAM_START as usize;
        let max = MEMORY_SIZE - start;
        if program.len() > max {
            return Err(Chip8Error::OversizeProgram {
                size: program.len(),
                max,
            });
        }
        self.memory[start..start + program.len()].copy_from_slice(program);
        debug!("loaded {} byte program at {:#05X}", program.len(), start);
        Ok(())
    }

    pub fn draw_flag(&self) -> bool {
        self.draw_flag
    }

    pub fn clear_draw_flag(&mut self) {
        self.draw_flag = false;
    }

    // 64x32 pixels, row-major, one byte (0 or 1) per pixel
    pub fn gfx(&self) -> &[u8] {
        &self.gfx
    }

    pub fn sound_flag(&self) -> bool {
        self.sound_timer > 0
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn v(&self, x: usize) -> u8 {
        self.v[x]
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn sp(&self) -> u16 {
        self.sp
    }

    pub fn stack(&self) -> &[u16] {
        &self.stack
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn awaiting_key(&self) -> bool {
        self.awaiting_key
    }

    pub fn key_register(&self) -> usize {
        self.key_register
    }

    pub fn release_all_keys(&mut self) {
        self.key = [false; NUM_KEYS];
    }

    // Records a keypad change. Indices past 0xF are ignored. A press while
    // an FX0A is pending stores the key in its register and resumes the
    // machine; releases never do.
    pub fn set_key(&mut self, key: usize, pressed: bool) {
        if key >= NUM_KEYS {
            warn!("ignoring out of range key {}", key);
            return;
        }
        self.key[key] = pressed;

        if self.awaiting_key && pressed {
            self.v[self.key_register] = key as u8;
            self.awaiting_key = false;
            trace!("key {:X} resolved wait into V{:X}", key, self.key_register);
        }
    }

    // One 60Hz tick of the delay and sound timers.
    pub fn advance_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    // Fetches, decodes and executes one instruction. Does nothing while
    // waiting on FX0A.
    pub fn step(&mut self) -> Result<(), Chip8Error> {
        if self.awaiting_key {
            return Ok(());
        }

        let pc = self.pc as usize;
        self.check_range(pc, 2)?;
        // two-byte opcodes
        let opcode = (self.memory[pc] as u16) << 8 | self.memory[pc + 1] as u16;

        // advance before executing so jumps overwrite it and skips add to it;
        // an unknown opcode is left behind, so stepping again skips it
        self.pc += 2;
        let instruction = Instruction::decode(opcode)?;

        trace!(
            "{:04X}: {:04X} {:<16} I={:04X} V={:02X?}",
            pc,
            opcode,
            instruction.to_string(),
            self.i,
            self.v
        );

        self.execute(instruction)
    }

    // Applies an already decoded instruction. `pc` is expected to point
    // past it already, as `step` leaves it.
    pub fn execute(&mut self, instruction: Instruction) -> Result<(), Chip8Error> {
        use Instruction::*;

        match instruction {
            Cls => {
                self.gfx = [0; DISPLAY_WIDTH * DISPLAY_HEIGHT];
                self.draw_flag = true;
            }
            Ret => {
                if self.sp == 0 {
                    return Err(Chip8Error::StackUnderflow);
                }
                self.sp -= 1;
                self.pc = self.stack[self.sp as usize];
            }
            Jmp { nnn } => self.pc = nnn,
            Call { nnn } => {
                if self.sp as usize >= STACK_SIZE {
                    return Err(Chip8Error::StackOverflow);
                }
                self.stack[self.sp as usize] = self.pc;
                self.sp += 1;
                self.pc = nnn;
            }
            SkipEqByte { x, nn } => self.skip_if(self.v[x] == nn),
            SkipNeByte { x, nn } => self.skip_if(self.v[x] != nn),
            SkipEqReg { x, y } => self.skip_if(self.v[x] == self.v[y]),
            SkipNeReg { x, y } => self.skip_if(self.v[x] != self.v[y]),
            LdByte { x, nn } => self.v[x] = nn,
            // no carry
            AddByte { x, nn } => self.v[x] = self.v[x].wrapping_add(nn),
            LdReg { x, y } => self.v[x] = self.v[y],
            Or { x, y } => self.v[x] |= self.v[y],
            And { x, y } => self.v[x] &= self.v[y],
            Xor { x, y } => self.v[x] ^= self.v[y],
            // VF is written last in the ALU ops so it wins when x is F
            AddReg { x, y } => {
                let (sum, carry) = self.v[x].overflowing_add(self.v[y]);
                self.v[x] = sum;
                self.v[0xF] = carry as u8;
            }
            Sub { x, y } => {
                let no_borrow = self.v[x] >= self.v[y];
                self.v[x] = self.v[x].wrapping_sub(self.v[y]);
                self.v[0xF] = no_borrow as u8;
            }
            Shr { x } => {
                let lsb = self.v[x] & 0x1;
                self.v[x] >>= 1;
                self.v[0xF] = lsb;
            }
            SubN { x, y } => {
                let no_borrow = self.v[y] >= self.v[x];
                self.v[x] = self.v[y].wrapping_sub(self.v[x]);
                self.v[0xF] = no_borrow as u8;
            }
            Shl { x } => {
                let msb = self.v[x] >> 7;
                self.v[x] <<= 1;
                self.v[0xF] = msb;
            }
            LdI { nnn } => self.i = nnn,
            JmpV0 { nnn } => self.pc = nnn + self.v[0] as u16,
            Rnd { x, nn } => self.v[x] = nn & (self.rng.gen_range(0, 256) as u8),
            Draw { x, y, n } => self.draw(x, y, n as usize)?,
            SkipKey { x } => self.skip_if(self.key[(self.v[x] & 0xF) as usize]),
            SkipNotKey { x } => self.skip_if(!self.key[(self.v[x] & 0xF) as usize]),
            LdVxDt { x } => self.v[x] = self.delay_timer,
            WaitKey { x } => {
                // pc already points past this instruction, so execution
                // resumes at the next one once a key arrives
                self.awaiting_key = true;
                self.key_register = x;
            }
            LdDtVx { x } => self.delay_timer = self.v[x],
            LdStVx { x } => self.sound_timer = self.v[x],
            AddI { x } => self.i = self.i.wrapping_add(self.v[x] as u16),
            LdFont { x } => self.i = self.v[x] as u16 * GLYPH_SIZE,
            Bcd { x } => {
                // so 193 becomes [1, 9, 3] in memory at I
                let i = self.i as usize;
                self.check_range(i, 3)?;
                let vx = self.v[x];
                self.memory[i] = vx / 100;
                self.memory[i + 1] = (vx / 10) % 10;
                self.memory[i + 2] = vx % 10;
            }
            StoreRegs { x } => {
                // V0 to VX inclusive
                let i = self.i as usize;
                self.check_range(i, x + 1)?;
                self.memory[i..=i + x].copy_from_slice(&self.v[..=x]);
            }
            LoadRegs { x } => {
                let i = self.i as usize;
                self.check_range(i, x + 1)?;
                self.v[..=x].copy_from_slice(&self.memory[i..=i + x]);
            }
        }
        Ok(())
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.pc += 2;
        }
    }

    fn check_range(&self, start: usize, len: usize) -> Result<(), Chip8Error> {
        if start + len > MEMORY_SIZE {
            return Err(Chip8Error::MemoryOutOfBounds {
                address: start.max(MEMORY_SIZE),
            });
        }
        Ok(())
    }

    // draw a sprite at VX,VY with a width of 8 pixels and a height of N pixels
    // each row of 8 pixels is bit-coded in memory starting at I
    // sprites wrap around both screen edges rather than clipping
    fn draw(&mut self, x: usize, y: usize, height: usize) -> Result<(), Chip8Error> {
        let i = self.i as usize;
        self.check_range(i, height)?;

        let vx = self.v[x] as usize;
        let vy = self.v[y] as usize;

        let mut collision = false; // any screen pixel unset during the draw
        for row in 0..height {
            let pixel = self.memory[i + row]; // load sprite starting at I
            for p in 0..8 {
                if pixel & (0x80 >> p) != 0 {
                    let gfx_offset = DISPLAY_WIDTH * ((vy + row) % DISPLAY_HEIGHT)
                        + (vx + p) % DISPLAY_WIDTH;
                    collision |= self.gfx[gfx_offset] == 1;
                    self.gfx[gfx_offset] ^= 1;
                }
            }
        }

        self.v[0xF] = collision as u8;
        self.draw_flag = true;
        Ok(())
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}
