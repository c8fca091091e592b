pub mod display {
    use std::env;
    use std::thread;
    use std::time::{Duration, Instant};

    use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};

    use chip8_core::device::device::{
        DISPLAY_HEIGHT, DISPLAY_WIDTH, DisplayDevice, Framebuffer, Keypad, ScriptedKeypad,
    };

    const WHITE: u32 = 0xFFFFFF;
    const BLACK: u32 = 0x000000;

    /// Set to anything but "0" to run without opening a window.
    pub const HEADLESS_ENV: &str = "CHIP8_HEADLESS";

    const KEY_SLEEP: Duration = Duration::from_millis(1);

    /// Physical key -> hex keypad value. 0-9 and A-F map to themselves.
    fn hex_key(key: Key) -> Option<u8> {
        let value = match key {
            Key::Key0 | Key::NumPad0 => 0x0,
            Key::Key1 | Key::NumPad1 => 0x1,
            Key::Key2 | Key::NumPad2 => 0x2,
            Key::Key3 | Key::NumPad3 => 0x3,
            Key::Key4 | Key::NumPad4 => 0x4,
            Key::Key5 | Key::NumPad5 => 0x5,
            Key::Key6 | Key::NumPad6 => 0x6,
            Key::Key7 | Key::NumPad7 => 0x7,
            Key::Key8 | Key::NumPad8 => 0x8,
            Key::Key9 | Key::NumPad9 => 0x9,
            Key::A => 0xA,
            Key::B => 0xB,
            Key::C => 0xC,
            Key::D => 0xD,
            Key::E => 0xE,
            Key::F => 0xF,
            _ => return None,
        };
        Some(value)
    }

    pub fn scale_from_factor(factor: u8) -> Option<Scale> {
        match factor {
            1 => Some(Scale::X1),
            2 => Some(Scale::X2),
            4 => Some(Scale::X4),
            8 => Some(Scale::X8),
            16 => Some(Scale::X16),
            32 => Some(Scale::X32),
            _ => None,
        }
    }

    pub fn headless_from_env() -> bool {
        env::var(HEADLESS_ENV).is_ok_and(|v| v != "0")
    }

    /// Window-backed screen and keypad. Without a window (headless) the
    /// framebuffer still composites sprites and keys come from `keys`.
    pub struct DisplayWindow {
        window: Option<Window>,
        pub screen: Framebuffer,
        pub keys: ScriptedKeypad,
        pub buf: Vec<u32>,
    }

    impl DisplayWindow {
        pub fn new(scale: Scale) -> Result<DisplayWindow, minifb::Error> {
            let window = Window::new(
                "Chip8",
                DISPLAY_WIDTH,
                DISPLAY_HEIGHT,
                WindowOptions {
                    scale,
                    ..WindowOptions::default()
                },
            )?;

            let mut display = DisplayWindow::headless();
            display.window = Some(window);
            display.present();
            Ok(display)
        }

        pub fn headless() -> DisplayWindow {
            DisplayWindow {
                window: None,
                screen: Framebuffer::new(),
                keys: ScriptedKeypad::new(),
                buf: vec![BLACK; DISPLAY_WIDTH * DISPLAY_HEIGHT],
            }
        }

        pub fn is_headless(&self) -> bool {
            self.window.is_none()
        }

        /// False once the window is closed or Escape is held.
        pub fn is_open(&self) -> bool {
            match &self.window {
                Some(window) => window.is_open() && !window.is_key_down(Key::Escape),
                None => true,
            }
        }

        /// Pump window events without redrawing.
        pub fn pump(&mut self) -> bool {
            if let Some(window) = self.window.as_mut() {
                window.update();
            }
            self.is_open()
        }

        fn present(&mut self) {
            for (px, on) in self.buf.iter_mut().zip(self.screen.cells()) {
                *px = if *on { WHITE } else { BLACK };
            }

            if let Some(window) = self.window.as_mut() {
                if let Err(err) = window.update_with_buffer(&self.buf, DISPLAY_WIDTH, DISPLAY_HEIGHT) {
                    tracing::warn!("failed to present frame: {err}");
                }
            }
        }

        fn held_hex_key(&self) -> Option<u8> {
            let window = self.window.as_ref()?;
            window.get_keys().into_iter().find_map(hex_key)
        }

        fn pressed_hex_key(&self) -> Option<u8> {
            let window = self.window.as_ref()?;
            window
                .get_keys_pressed(KeyRepeat::No)
                .into_iter()
                .find_map(hex_key)
        }
    }

    impl DisplayDevice for DisplayWindow {
        fn clear_screen(&mut self) {
            self.screen.clear_screen();
            self.present();
        }

        fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
            let collision = self.screen.draw_sprite(x, y, sprite);
            self.present();
            collision
        }
    }

    impl Keypad for DisplayWindow {
        fn poll(&mut self, timeout: Duration) -> Option<u8> {
            if self.is_headless() {
                return self.keys.poll(timeout);
            }

            let deadline = Instant::now() + timeout;
            loop {
                if !self.pump() {
                    return None;
                }
                if let Some(key) = self.held_hex_key() {
                    return Some(key);
                }
                if Instant::now() >= deadline {
                    return None;
                }
                thread::sleep(KEY_SLEEP);
            }
        }

        fn block_until_pressed(&mut self) -> Option<u8> {
            if self.is_headless() {
                return self.keys.block_until_pressed();
            }

            loop {
                // closing the window is the only way out of a blocking read.
                if !self.pump() {
                    return None;
                }
                if let Some(key) = self.pressed_hex_key() {
                    return Some(key);
                }
                thread::sleep(KEY_SLEEP);
            }
        }
    }
}
