use super::Chip8Error;
use std::fmt;

// A decoded CHIP-8 instruction. `x` and `y` are register indices (0-F),
// `n` the low nibble, `nn` the low byte and `nnn` the 12-bit address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Cls,                              // 00E0
    Ret,                              // 00EE
    Jmp { nnn: u16 },                 // 1NNN
    Call { nnn: u16 },                // 2NNN
    SkipEqByte { x: usize, nn: u8 },  // 3XNN
    SkipNeByte { x: usize, nn: u8 },  // 4XNN
    SkipEqReg { x: usize, y: usize }, // 5XY0
    LdByte { x: usize, nn: u8 },      // 6XNN
    AddByte { x: usize, nn: u8 },     // 7XNN
    LdReg { x: usize, y: usize },     // 8XY0
    Or { x: usize, y: usize },        // 8XY1
    And { x: usize, y: usize },       // 8XY2
    Xor { x: usize, y: usize },       // 8XY3
    AddReg { x: usize, y: usize },    // 8XY4
    Sub { x: usize, y: usize },       // 8XY5
    Shr { x: usize },                 // 8XY6
    SubN { x: usize, y: usize },      // 8XY7
    Shl { x: usize },                 // 8XYE
    SkipNeReg { x: usize, y: usize }, // 9XY0
    LdI { nnn: u16 },                 // ANNN
    JmpV0 { nnn: u16 },               // BNNN
    Rnd { x: usize, nn: u8 },         // CXNN
    Draw { x: usize, y: usize, n: u8 }, // DXYN
    SkipKey { x: usize },             // EX9E
    SkipNotKey { x: usize },          // EXA1
    LdVxDt { x: usize },              // FX07
    WaitKey { x: usize },             // FX0A
    LdDtVx { x: usize },              // FX15
    LdStVx { x: usize },              // FX18
    AddI { x: usize },                // FX1E
    LdFont { x: usize },              // FX29
    Bcd { x: usize },                 // FX33
    StoreRegs { x: usize },           // FX55
    LoadRegs { x: usize },            // FX65
}

impl Instruction {
    // Decodes a big-endian instruction word. Groups 0, 8, E and F dispatch
    // a second time on the low byte or nibble; 0NNN machine calls are not
    // supported and come back as `UnknownOpcode` like any other miss.
    pub fn decode(opcode: u16) -> Result<Self, Chip8Error> {
        let x = ((opcode & 0xF00) >> 8) as usize;
        let y = ((opcode & 0xF0) >> 4) as usize;
        let n = (opcode & 0xF) as u8;
        let nn = (opcode & 0xFF) as u8;
        let nnn = opcode & 0xFFF;
        let unknown = Chip8Error::UnknownOpcode { opcode };

        let instruction = match (opcode & 0xF000) >> 12 {
            0x0 => match opcode {
                0x00E0 => Self::Cls,
                0x00EE => Self::Ret,
                _ => return Err(unknown),
            },
            0x1 => Self::Jmp { nnn },
            0x2 => Self::Call { nnn },
            0x3 => Self::SkipEqByte { x, nn },
            0x4 => Self::SkipNeByte { x, nn },
            0x5 => Self::SkipEqReg { x, y },
            0x6 => Self::LdByte { x, nn },
            0x7 => Self::AddByte { x, nn },
            0x8 => match n {
                0x0 => Self::LdReg { x, y },
                0x1 => Self::Or { x, y },
                0x2 => Self::And { x, y },
                0x3 => Self::Xor { x, y },
                0x4 => Self::AddReg { x, y },
                0x5 => Self::Sub { x, y },
                0x6 => Self::Shr { x },
                0x7 => Self::SubN { x, y },
                0xE => Self::Shl { x },
                _ => return Err(unknown),
            },
            0x9 => Self::SkipNeReg { x, y },
            0xA => Self::LdI { nnn },
            0xB => Self::JmpV0 { nnn },
            0xC => Self::Rnd { x, nn },
            0xD => Self::Draw { x, y, n },
            0xE => match nn {
                0x9E => Self::SkipKey { x },
                0xA1 => Self::SkipNotKey { x },
                _ => return Err(unknown),
            },
            0xF => match nn {
                0x07 => Self::LdVxDt { x },
                0x0A => Self::WaitKey { x },
                0x15 => Self::LdDtVx { x },
                0x18 => Self::LdStVx { x },
                0x1E => Self::AddI { x },
                0x29 => Self::LdFont { x },
                0x33 => Self::Bcd { x },
                0x55 => Self::StoreRegs { x },
                0x65 => Self::LoadRegs { x },
                _ => return Err(unknown),
            },
            _ => unreachable!("top nibble of a u16 is at most 0xF"),
        };
        Ok(instruction)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Cls => write!(f, "CLS"),
            Self::Ret => write!(f, "RET"),
            Self::Jmp { nnn } => write!(f, "JP {:#05X}", nnn),
            Self::Call { nnn } => write!(f, "CALL {:#05X}", nnn),
            Self::SkipEqByte { x, nn } => write!(f, "SE V{:X}, {:#04X}", x, nn),
            Self::SkipNeByte { x, nn } => write!(f, "SNE V{:X}, {:#04X}", x, nn),
            Self::SkipEqReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            Self::LdByte { x, nn } => write!(f, "LD V{:X}, {:#04X}", x, nn),
            Self::AddByte { x, nn } => write!(f, "ADD V{:X}, {:#04X}", x, nn),
            Self::LdReg { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Self::Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            Self::And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Self::Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            Self::AddReg { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Self::Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            Self::Shr { x } => write!(f, "SHR V{:X}", x),
            Self::SubN { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Self::Shl { x } => write!(f, "SHL V{:X}", x),
            Self::SkipNeReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            Self::LdI { nnn } => write!(f, "LD I, {:#05X}", nnn),
            Self::JmpV0 { nnn } => write!(f, "JP V0, {:#05X}", nnn),
            Self::Rnd { x, nn } => write!(f, "RND V{:X}, {:#04X}", x, nn),
            Self::Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Self::SkipKey { x } => write!(f, "SKP V{:X}", x),
            Self::SkipNotKey { x } => write!(f, "SKNP V{:X}", x),
            Self::LdVxDt { x } => write!(f, "LD V{:X}, DT", x),
            Self::WaitKey { x } => write!(f, "LD V{:X}, K", x),
            Self::LdDtVx { x } => write!(f, "LD DT, V{:X}", x),
            Self::LdStVx { x } => write!(f, "LD ST, V{:X}", x),
            Self::AddI { x } => write!(f, "ADD I, V{:X}", x),
            Self::LdFont { x } => write!(f, "LD F, V{:X}", x),
            Self::Bcd { x } => write!(f, "LD B, V{:X}", x),
            Self::StoreRegs { x } => write!(f, "LD [I], V{:X}", x),
            Self::LoadRegs { x } => write!(f, "LD V{:X}, [I]", x),
        }
    }
}
