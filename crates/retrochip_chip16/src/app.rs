use std::collections::HashMap;

use lazy_static::lazy_static;
use retrochip_common::{App, Key};

use crate::emulator::{Emulator, NUM_CONTROLLERS};
use crate::input::{Button, NUM_BUTTONS};
use crate::{SCREEN_HEIGHT, SCREEN_SCALE, SCREEN_WIDTH, STEPS_PER_FRAME};

lazy_static! {
    /// Host keys to (controller, button): arrows, right shift, return, Z
    /// and X drive controller 1; WASD, F, G, N and M drive controller 2.
    static ref KEYMAP: HashMap<Key, (usize, Button)> = HashMap::from([
        (Key::Up, (0, Button::Up)),
        (Key::Down, (0, Button::Down)),
        (Key::Left, (0, Button::Left)),
        (Key::Right, (0, Button::Right)),
        (Key::RShift, (0, Button::Select)),
        (Key::Return, (0, Button::Start)),
        (Key::Z, (0, Button::A)),
        (Key::X, (0, Button::B)),
        (Key::W, (1, Button::Up)),
        (Key::S, (1, Button::Down)),
        (Key::A, (1, Button::Left)),
        (Key::D, (1, Button::Right)),
        (Key::F, (1, Button::Select)),
        (Key::G, (1, Button::Start)),
        (Key::N, (1, Button::A)),
        (Key::M, (1, Button::B)),
    ]);
}

#[derive(Default)]
pub struct EmulatorApp {
    should_exit: bool,
    buttons: [[bool; NUM_BUTTONS]; NUM_CONTROLLERS],
    pub emulator: Emulator,
}

impl App for EmulatorApp {
    fn init(&mut self) {
        log::info!("Chip16 init");
    }

    fn update(&mut self, screen_state: &mut [u8]) {
        for (controller, buttons) in self.buttons.iter().enumerate() {
            self.emulator.set_input_state(controller, buttons);
        }
        for _ in 0..STEPS_PER_FRAME {
            self.emulator.step();
        }
        self.emulator.render_into(screen_state);
        self.emulator.set_vblank(false);
    }

    fn handle_key_event(&mut self, key: Key, is_down: bool) {
        if key == Key::Escape {
            if is_down {
                self.should_exit = true;
            }
            return;
        }
        if let Some(&(controller, button)) = KEYMAP.get(&key) {
            self.buttons[controller][button as usize] = is_down;
        }
    }

    fn should_exit(&self) -> bool {
        self.should_exit
    }

    fn exit(&mut self) {
        log::info!("Chip16 exit");
    }

    fn width(&self) -> u32 {
        SCREEN_WIDTH as u32
    }

    fn height(&self) -> u32 {
        SCREEN_HEIGHT as u32
    }

    fn scale(&self) -> u32 {
        SCREEN_SCALE
    }

    fn title(&self) -> String {
        "RetroChip Chip16".to_string()
    }
}
