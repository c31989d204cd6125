use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Chip8Error {
    #[error("program is too large: {size} bytes (max {max})")]
    OversizeProgram { size: usize, max: usize },

    #[error("stack overflow: call with all 16 return slots in use")]
    StackOverflow,

    #[error("stack underflow: return with an empty stack")]
    StackUnderflow,

    #[error("unknown opcode {opcode:#06X}")]
    UnknownOpcode { opcode: u16 },

    #[error("memory access out of bounds at {address:#06X}")]
    MemoryOutOfBounds { address: usize },
}
