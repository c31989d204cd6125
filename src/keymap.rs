use sdl2::keyboard::Keycode;

// CHIP-8 keypad    keyboard
// 1 2 3 C          1 2 3 4
// 4 5 6 D          Q W E R
// 7 8 9 E          A S D F
// A 0 B F          Z X C V

// Maps a host key to its keypad index, or None for unmapped keys.
pub fn keypad_index(keycode: Keycode) -> Option<usize> {
    let key = match keycode {
        Keycode::Num1 => 0x1,
        Keycode::Num2 => 0x2,
        Keycode::Num3 => 0x3,
        Keycode::Num4 => 0xC,
        Keycode::Q => 0x4,
        Keycode::W => 0x5,
        Keycode::E => 0x6,
        Keycode::R => 0xD,
        Keycode::A => 0x7,
        Keycode::S => 0x8,
        Keycode::D => 0x9,
        Keycode::F => 0xE,
        Keycode::Z => 0xA,
        Keycode::X => 0x0,
        Keycode::C => 0xB,
        Keycode::V => 0xF,
        _ => return None,
    };
    Some(key)
}
