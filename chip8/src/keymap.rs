use sdl2::keyboard::Keycode;

/// # Keymap
/// Chip-8 input is generated with a hexadecimal keypad.
///
/// This original layout is mapped to the left 4 alphanumeric columns.
/// ```text
/// |1|2|3|C|      |1|2|3|4|
/// |4|5|6|D|  ->  |Q|W|E|R|
/// |7|8|9|E|  ->  |A|S|D|F|
/// |A|0|B|F|      |Z|X|C|V|
/// ```
const KEYPAD: [Keycode; 16] = [
    Keycode::X,    // 0
    Keycode::Num1, // 1
    Keycode::Num2, // 2
    Keycode::Num3, // 3
    Keycode::Q,    // 4
    Keycode::W,    // 5
    Keycode::E,    // 6
    Keycode::A,    // 7
    Keycode::S,    // 8
    Keycode::D,    // 9
    Keycode::Z,    // A
    Keycode::C,    // B
    Keycode::Num4, // C
    Keycode::R,    // D
    Keycode::F,    // E
    Keycode::V,    // F
];

/// The keypad key a host key stands for, if any
pub fn keymap(key: Keycode) -> Option<u8> {
    KEYPAD.iter().position(|&k| k == key).map(|k| k as u8)
}
