pub mod device {
    use std::collections::VecDeque;
    use std::time::Duration;

    pub const DISPLAY_WIDTH: usize = 64;
    pub const DISPLAY_HEIGHT: usize = 32;

    /// Minimal display surface required by the core interpreter.
    pub trait DisplayDevice {
        fn clear_screen(&mut self);

        /// XOR an 8-pixel-wide sprite onto the screen with its top-left
        /// corner at (x, y); one row per byte. Coordinates wrap around the
        /// screen edges. Returns true if any set sprite pixel landed on a
        /// pixel that was already on.
        fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool;
    }

    /// Hexadecimal keypad. Keys are reported as 0..=15.
    pub trait Keypad {
        /// Wait at most `timeout` for a key.
        fn poll(&mut self, timeout: Duration) -> Option<u8>;

        /// Wait until a key is pressed. `None` means the input source went
        /// away (window closed, script exhausted) and no key will come.
        fn block_until_pressed(&mut self) -> Option<u8>;
    }

    /// A screen and a keypad in one value, which is what the interpreter owns.
    pub trait Peripherals: DisplayDevice + Keypad {}

    impl<T: DisplayDevice + Keypad> Peripherals for T {}

    /// Monochrome 64x32 pixel grid.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Framebuffer {
        cells: Vec<bool>,
    }

    impl Default for Framebuffer {
        fn default() -> Framebuffer {
            Framebuffer {
                cells: vec![false; DISPLAY_WIDTH * DISPLAY_HEIGHT],
            }
        }
    }

    impl Framebuffer {
        pub fn new() -> Framebuffer {
            Framebuffer::default()
        }

        pub fn pixel(&self, x: usize, y: usize) -> bool {
            self.cells[(y % DISPLAY_HEIGHT) * DISPLAY_WIDTH + (x % DISPLAY_WIDTH)]
        }

        pub fn cells(&self) -> &[bool] {
            &self.cells
        }

        pub fn lit_count(&self) -> usize {
            self.cells.iter().filter(|&&on| on).count()
        }
    }

    impl DisplayDevice for Framebuffer {
        fn clear_screen(&mut self) {
            self.cells.iter_mut().for_each(|c| *c = false);
        }

        fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
            let mut collision = false;

            for (row, byte) in sprite.iter().enumerate() {
                for bit in 0..8 {
                    let px = (x as usize + bit) % DISPLAY_WIDTH;
                    let py = (y as usize + row) % DISPLAY_HEIGHT;
                    let pos = py * DISPLAY_WIDTH + px;

                    let sprite_pixel = (byte >> (7 - bit)) & 1 == 1;
                    // checked before the xor so a pixel turned off still counts.
                    if sprite_pixel && self.cells[pos] {
                        collision = true;
                    }
                    self.cells[pos] ^= sprite_pixel;
                }
            }

            collision
        }
    }

    /// Keypad fed from a queue. Used for headless runs and tests.
    #[derive(Clone, Debug, Default)]
    pub struct ScriptedKeypad {
        keys: VecDeque<u8>,
    }

    impl ScriptedKeypad {
        pub fn new() -> ScriptedKeypad {
            ScriptedKeypad::default()
        }

        pub fn with_keys(keys: &[u8]) -> ScriptedKeypad {
            let mut keypad = ScriptedKeypad::new();
            keys.iter().for_each(|k| keypad.push_key(*k));
            keypad
        }

        pub fn push_key(&mut self, key: u8) {
            self.keys.push_back(key & 0xF);
        }

        pub fn pending(&self) -> usize {
            self.keys.len()
        }
    }

    impl Keypad for ScriptedKeypad {
        fn poll(&mut self, _timeout: Duration) -> Option<u8> {
            self.keys.pop_front()
        }

        fn block_until_pressed(&mut self) -> Option<u8> {
            self.keys.pop_front()
        }
    }

    /// Framebuffer plus scripted keys; runs programs without a window.
    #[derive(Clone, Debug, Default)]
    pub struct Headless {
        pub screen: Framebuffer,
        pub keys: ScriptedKeypad,
    }

    impl Headless {
        pub fn new() -> Headless {
            Headless::default()
        }
    }

    impl DisplayDevice for Headless {
        fn clear_screen(&mut self) {
            self.screen.clear_screen();
        }

        fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
            self.screen.draw_sprite(x, y, sprite)
        }
    }

    impl Keypad for Headless {
        fn poll(&mut self, timeout: Duration) -> Option<u8> {
            self.keys.poll(timeout)
        }

        fn block_until_pressed(&mut self) -> Option<u8> {
            self.keys.block_until_pressed()
        }
    }
}
