use anyhow::Result;
use sdl2::event::Event;
use sdl2::pixels::PixelFormatEnum;
use typed_builder::TypedBuilder;

use retrochip_common::{App, Key};
pub use sdl2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    RGB24,
}

#[derive(TypedBuilder)]
pub struct SdlInitInfo {
    pub width: u32,
    pub height: u32,
    pub scale: u32,
    pub title: String,
    #[builder(default = PixelFormat::RGB24)]
    pub pixel_format: PixelFormat,
}

pub struct SdlContext;

impl SdlContext {
    pub fn run(sdl_init_info: SdlInitInfo, mut app: impl App) -> Result<()> {
        let SdlInitInfo {
            width,
            height,
            scale,
            title,
            pixel_format,
        } = sdl_init_info;
        let sdl_context = sdl2::init().unwrap();
        let video_subsystem = sdl_context.video().unwrap();
        let window = video_subsystem
            .window(&title, width * scale, height * scale)
            .position_centered()
            .build()?;
        let mut canvas = window.into_canvas().present_vsync().build()?;
        canvas.set_scale(scale as f32, scale as f32).unwrap();
        let creator = canvas.texture_creator();
        let mut texture = creator
            .create_texture_target(map_pixel_format(pixel_format), width, height)
            .unwrap();
        log::debug!("sdl2 context initialized: {}x{} scale {}", width, height, scale);

        let color_size = map_pixel_format_size(pixel_format);
        let mut screen_state = vec![0u8; (width * color_size * height) as usize];
        let mut event_pump = sdl_context.event_pump().unwrap();
        app.init();
        loop {
            if app.should_exit() {
                app.exit();
                break;
            }

            while let Some(event) = event_pump.poll_event() {
                match event {
                    Event::Quit { .. } => {
                        app.exit();
                        return Ok(());
                    }
                    Event::KeyDown {
                        keycode: Some(keycode),
                        ..
                    } => {
                        let key = map_keycode(keycode);
                        app.handle_key_event(key, true);
                    }
                    Event::KeyUp {
                        keycode: Some(keycode),
                        ..
                    } => {
                        let key = map_keycode(keycode);
                        app.handle_key_event(key, false);
                    }
                    _ => {}
                }
            }

            app.update(&mut screen_state);

            texture
                .update(None, &screen_state, (width * color_size) as usize)
                .unwrap();
            canvas.copy(&texture, None, None).unwrap();
            canvas.present();
        }

        Ok(())
    }
}

pub fn map_pixel_format(pixel_format: PixelFormat) -> PixelFormatEnum {
    match pixel_format {
        PixelFormat::RGB24 => PixelFormatEnum::RGB24,
    }
}

pub fn map_pixel_format_size(pixel_format: PixelFormat) -> u32 {
    match pixel_format {
        PixelFormat::RGB24 => 3,
    }
}

pub fn map_keycode(keycode: sdl2::keyboard::Keycode) -> Key {
    match keycode {
        sdl2::keyboard::Keycode::Up => Key::Up,
        sdl2::keyboard::Keycode::Down => Key::Down,
        sdl2::keyboard::Keycode::Left => Key::Left,
        sdl2::keyboard::Keycode::Right => Key::Right,
        sdl2::keyboard::Keycode::RShift => Key::RShift,
        sdl2::keyboard::Keycode::Return => Key::Return,
        sdl2::keyboard::Keycode::Z => Key::Z,
        sdl2::keyboard::Keycode::X => Key::X,
        sdl2::keyboard::Keycode::W => Key::W,
        sdl2::keyboard::Keycode::A => Key::A,
        sdl2::keyboard::Keycode::S => Key::S,
        sdl2::keyboard::Keycode::D => Key::D,
        sdl2::keyboard::Keycode::F => Key::F,
        sdl2::keyboard::Keycode::G => Key::G,
        sdl2::keyboard::Keycode::N => Key::N,
        sdl2::keyboard::Keycode::M => Key::M,
        sdl2::keyboard::Keycode::Escape => Key::Escape,
        _ => Key::None,
    }
}
