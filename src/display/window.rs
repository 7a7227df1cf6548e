//! SDL2 window host: uploads the pixel buffer and reads the keyboard

use sdl2::event::Event;
use sdl2::keyboard::{Keycode, Scancode};
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

use super::PixelBuffer;
use crate::error::DisplayError;
use crate::input::Button;

/// Keys held for each button; several keys share one button
const BUTTON_KEYS: [(Scancode, Button); 10] = [
    (Scancode::Left, Button::Left),
    (Scancode::Right, Button::Right),
    (Scancode::Up, Button::Up),
    (Scancode::Down, Button::Down),
    (Scancode::Z, Button::O),
    (Scancode::C, Button::O),
    (Scancode::N, Button::O),
    (Scancode::X, Button::X),
    (Scancode::V, Button::X),
    (Scancode::M, Button::X),
];

pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    width: u32,
    height: u32,
}

/// Streaming texture the size of the virtual screen
pub struct RenderTarget<'a> {
    texture: Texture<'a>,
    width: u32,
    height: u32,
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Quit,
    KeyDown(Keycode),
    KeyUp(Keycode),
}

impl Display {
    /// Create a window of `width` x `height` real pixels
    pub fn with_options(
        title: &str,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<(Self, TextureCreator<WindowContext>), DisplayError> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .build()
            .map_err(|e| DisplayError::Sdl(e.to_string()))?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder
            .build()
            .map_err(|e| DisplayError::Sdl(e.to_string()))?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump()?;

        Ok((
            Self {
                canvas,
                event_pump,
                width,
                height,
            },
            texture_creator,
        ))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Upload the buffer if it changed and stretch it over the window.
    /// Returns whether anything was uploaded.
    pub fn present(
        &mut self,
        target: &mut RenderTarget,
        buffer: &mut PixelBuffer,
    ) -> Result<bool, DisplayError> {
        if !buffer.is_dirty() {
            return Ok(false);
        }
        if buffer.width() != target.width || buffer.height() != target.height {
            return Err(DisplayError::Sdl(format!(
                "render target is {}x{} but screen is {}x{}",
                target.width,
                target.height,
                buffer.width(),
                buffer.height()
            )));
        }
        target
            .texture
            .update(None, buffer.as_bytes(), (buffer.width() * 4) as usize)
            .map_err(|e| DisplayError::Sdl(e.to_string()))?;

        self.canvas.copy(&target.texture, None, None)?;
        self.canvas.present();
        buffer.clear_dirty();
        Ok(true)
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => events.push(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(k), ..
                } => events.push(InputEvent::KeyDown(k)),
                Event::KeyUp {
                    keycode: Some(k), ..
                } => events.push(InputEvent::KeyUp(k)),
                _ => {},
            }
        }

        events
    }

    /// Buttons held right now, from the keyboard state
    pub fn pressed_buttons(&self) -> Vec<Button> {
        let keyboard = self.event_pump.keyboard_state();
        let mut pressed = Vec::with_capacity(6);
        for (scancode, button) in BUTTON_KEYS {
            if keyboard.is_scancode_pressed(scancode) && !pressed.contains(&button) {
                pressed.push(button);
            }
        }
        pressed
    }
}

impl<'a> RenderTarget<'a> {
    pub fn with_size(
        texture_creator: &'a TextureCreator<WindowContext>,
        width: u32,
        height: u32,
    ) -> Result<Self, DisplayError> {
        // ABGR8888 is R,G,B,A in memory on little-endian hosts
        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::ABGR8888, width, height)
            .map_err(|e| DisplayError::Sdl(e.to_string()))?;
        Ok(Self {
            texture,
            width,
            height,
        })
    }
}
