use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_SPEED: u32 = 500; // instructions per second
pub const DEFAULT_SCALE: u32 = 10;
pub const MAX_SCALE: u32 = 64;
pub const TIMER_HZ: u32 = 60;

#[derive(Parser, Debug)]
#[clap(version, about = "CHIP-8 emulator")]
pub struct Config {
    /// Path to the ROM file
    #[clap(value_name = "ROM", required_unless_present = "rom-flag")]
    rom: Option<PathBuf>,

    /// Path to the ROM file, as an alternative to the positional argument
    #[clap(long = "rom", id = "rom-flag", value_name = "ROM", conflicts_with = "rom")]
    rom_flag: Option<PathBuf>,

    /// Window pixels per CHIP-8 pixel
    #[clap(long, default_value_t = DEFAULT_SCALE, value_parser = clap::value_parser!(u32).range(1..=MAX_SCALE as i64))]
    pub scale: u32,

    /// Instructions per second
    #[clap(long, default_value_t = DEFAULT_SPEED, value_parser = clap::value_parser!(u32).range(1..))]
    pub speed: u32,

    /// Seed for the CXNN random source
    #[clap(long)]
    pub seed: Option<u64>,
}

impl Config {
    pub fn rom(&self) -> Option<&PathBuf> {
        self.rom.as_ref().or_else(|| self.rom_flag.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(&["chip8", "pong.ch8"]).unwrap();
        assert_eq!(config.rom(), Some(&PathBuf::from("pong.ch8")));
        assert_eq!(config.scale, DEFAULT_SCALE);
        assert_eq!(config.speed, DEFAULT_SPEED);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn rom_flag() {
        let config =
            Config::try_parse_from(&["chip8", "--rom", "tetris.ch8", "--speed", "700", "--seed", "3"])
                .unwrap();
        assert_eq!(config.rom(), Some(&PathBuf::from("tetris.ch8")));
        assert_eq!(config.speed, 700);
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn rom_required() {
        assert!(Config::try_parse_from(&["chip8"]).is_err());
    }

    #[test]
    fn scale_limits() {
        let config = Config::try_parse_from(&["chip8", "--scale", "64", "pong.ch8"]).unwrap();
        assert_eq!(config.scale, MAX_SCALE);
        assert!(Config::try_parse_from(&["chip8", "--scale", "0", "pong.ch8"]).is_err());
        assert!(Config::try_parse_from(&["chip8", "--scale", "65", "pong.ch8"]).is_err());
    }

    #[test]
    fn zero_speed_rejected() {
        assert!(Config::try_parse_from(&["chip8", "--speed", "0", "pong.ch8"]).is_err());
    }
}
