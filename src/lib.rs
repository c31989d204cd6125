pub mod chip8;
pub mod config;
pub mod keymap;

pub use crate::chip8::{Chip8, Chip8Error, Instruction};
