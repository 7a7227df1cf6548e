//! Cartridge contract and the frame driver

use tracing::info;

use crate::input::{Button, Buttons};
use crate::render_state::RenderState;

/// A game: one `init`, then `update` + `draw` every frame
pub trait Cartridge {
    /// Called once before the first frame
    fn init(&mut self, gfx: &mut RenderState);

    /// Game logic; the place to move the follow camera target
    fn update(&mut self, gfx: &mut RenderState, input: &Buttons);

    /// Issue draw calls for this frame
    fn draw(&mut self, gfx: &mut RenderState);

    /// Cartridge name for UI/debugging
    fn name(&self) -> &str;
}

/// Drives a cartridge through the per-frame phases
pub struct Runner {
    gfx: RenderState,
    input: Buttons,
    frame: u64,
}

impl Runner {
    pub fn new(gfx: RenderState) -> Self {
        Self {
            gfx,
            input: Buttons::new(),
            frame: 0,
        }
    }

    pub fn start(&mut self, cart: &mut dyn Cartridge) {
        info!(cartridge = cart.name(), "starting cartridge");
        cart.init(&mut self.gfx);
        // Anything drawn during init lands before the first frame
        self.gfx.end_frame();
    }

    /// One frame: input, update, camera follow, draw, flush
    pub fn step(&mut self, cart: &mut dyn Cartridge, pressed: &[Button]) {
        self.input.update(pressed);
        cart.update(&mut self.gfx, &self.input);
        self.gfx.begin_frame();
        cart.draw(&mut self.gfx);
        self.gfx.end_frame();
        self.frame += 1;
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn gfx(&self) -> &RenderState {
        &self.gfx
    }

    pub fn gfx_mut(&mut self) -> &mut RenderState {
        &mut self.gfx
    }

    pub fn input(&self) -> &Buttons {
        &self.input
    }
}
