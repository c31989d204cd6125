extern crate sdl2;

use anyhow::{Context, Result};
use chip8::chip8::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use chip8::config::{Config, TIMER_HZ};
use chip8::{keymap, Chip8};
use clap::Parser;
use log::{error, info, warn};
use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired};
use sdl2::event::Event;
use sdl2::gfx::primitives::DrawRenderer;
use sdl2::keyboard::Keycode;
use sdl2::pixels;
use sdl2::render::WindowCanvas;
use std::time::{Duration, Instant};

const TITLE: &str = "CHIP-8";
const TONE_HZ: f32 = 440.0;

// square wave beeper, on while the sound timer is nonzero
struct SquareWave {
    phase_inc: f32,
    phase: f32,
    volume: f32,
}

impl AudioCallback for SquareWave {
    type Channel = f32;

    fn callback(&mut self, out: &mut [f32]) {
        for x in out.iter_mut() {
            *x = if self.phase <= 0.5 {
                self.volume
            } else {
                -self.volume
            };
            self.phase = (self.phase + self.phase_inc) % 1.0;
        }
    }
}

fn open_beeper(sdl_ctx: &sdl2::Sdl) -> Result<AudioDevice<SquareWave>, String> {
    let audio = sdl_ctx.audio()?;
    let desired = AudioSpecDesired {
        freq: Some(44_100),
        channels: Some(1),
        samples: None,
    };
    audio.open_playback(None, &desired, |spec| SquareWave {
        phase_inc: TONE_HZ / spec.freq as f32,
        phase: 0.0,
        volume: 0.25,
    })
}

fn render(canvas: &mut WindowCanvas, gfx: &[u8], scale: i16) -> Result<(), String> {
    let black = pixels::Color::RGB(0, 0, 0);
    let white = pixels::Color::RGB(255, 255, 255);
    canvas.set_draw_color(black);
    canvas.clear();
    for (i, p) in gfx.iter().enumerate() {
        if *p == 0 {
            continue;
        }
        let i = i as i16;
        let x = (i % DISPLAY_WIDTH as i16) * scale;
        let y = (i / DISPLAY_WIDTH as i16) * scale;
        canvas.box_(x, y, x + scale - 1, y + scale - 1, white)?;
    }
    canvas.present();
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let config = Config::parse();

    let rom_path = config.rom().context("no ROM given")?;
    let rom = std::fs::read(rom_path)
        .with_context(|| format!("reading ROM {}", rom_path.display()))?;

    let mut emu = match config.seed {
        Some(seed) => Chip8::with_seed(seed),
        None => Chip8::new(),
    };
    emu.load_program(&rom).context("loading ROM into memory")?;

    let sdl_ctx = sdl2::init().map_err(anyhow::Error::msg)?;
    let video = sdl_ctx.video().map_err(anyhow::Error::msg)?;

    let scale = config.scale;
    let window = video
        .window(
            TITLE,
            DISPLAY_WIDTH as u32 * scale,
            DISPLAY_HEIGHT as u32 * scale,
        )
        .position_centered()
        .build()
        .context("creating window")?;
    let mut canvas = window.into_canvas().build().context("creating canvas")?;

    let beeper = match open_beeper(&sdl_ctx) {
        Ok(device) => Some(device),
        Err(e) => {
            warn!("no audio, continuing without sound: {}", e);
            None
        }
    };

    let mut event_pump = sdl_ctx.event_pump().map_err(anyhow::Error::msg)?;

    let cycle_interval = Duration::from_secs(1) / config.speed;
    let timer_interval = Duration::from_secs(1) / TIMER_HZ;
    let mut last_cycle = Instant::now();
    let mut last_timer = Instant::now();
    let mut paused = false;

    info!("running {} at {} Hz", rom_path.display(), config.speed);
    info!("keys: 1234 QWER ASDF ZXCV, P pauses, R resets, Esc quits");

    'main: loop {
        for e in event_pump.poll_iter() {
            match e {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'main,
                Event::KeyDown {
                    keycode: Some(Keycode::P),
                    repeat: false,
                    ..
                } => {
                    paused = !paused;
                    let title = if paused {
                        format!("{} (PAUSED)", TITLE)
                    } else {
                        TITLE.to_string()
                    };
                    canvas.window_mut().set_title(&title)?;
                }
                Event::KeyDown {
                    keycode: Some(Keycode::R),
                    repeat: false,
                    ..
                } => {
                    emu.reset();
                    emu.load_program(&rom).context("reloading ROM")?;
                    emu.release_all_keys();
                }
                Event::KeyDown {
                    keycode: Some(keycode),
                    repeat: false,
                    ..
                } => {
                    if let Some(key) = keymap::keypad_index(keycode) {
                        emu.set_key(key, true);
                    }
                }
                Event::KeyUp {
                    keycode: Some(keycode),
                    ..
                } => {
                    if let Some(key) = keymap::keypad_index(keycode) {
                        emu.set_key(key, false);
                    }
                }
                _ => {}
            }
        }

        if paused {
            if let Some(beeper) = &beeper {
                beeper.pause();
            }
            std::thread::sleep(Duration::from_millis(10));
            last_cycle = Instant::now();
            last_timer = last_cycle;
            continue;
        }

        // instructions and timers run on separate clocks
        let now = Instant::now();
        while now.duration_since(last_cycle) >= cycle_interval {
            if let Err(e) = emu.step() {
                error!("emulation error at {:#05X}: {}", emu.pc(), e);
                break 'main;
            }
            last_cycle += cycle_interval;
        }

        while now.duration_since(last_timer) >= timer_interval {
            emu.advance_timers();
            last_timer += timer_interval;
            if let Some(beeper) = &beeper {
                if emu.sound_flag() {
                    beeper.resume();
                } else {
                    beeper.pause();
                }
            }
        }

        if emu.draw_flag() {
            render(&mut canvas, emu.gfx(), scale as i16).map_err(anyhow::Error::msg)?;
            emu.clear_draw_flag();
        }

        std::thread::sleep(Duration::from_micros(100));
    }

    info!("emulator stopped");
    Ok(())
}
