//! Built-in demo: a small side-scrolling level with a follow camera

use picocam::camera::CameraOptions;
use picocam::sprite::{SPRITE_SIZE, SPRITES_PER_ROW};
use picocam::{Button, Buttons, Cartridge, RenderState};
use tracing::{info, warn};

const GROUND: u8 = 1;
const BRICK: u8 = 2;
const PLAYER: usize = 3;

/// Level width in cells; the camera clamps to it
const LEVEL_W: i32 = 64;
const LEVEL_H: i32 = 16;

/// Flag bit marking solid tiles
const SOLID: u8 = 0b1;

const SPEED: f32 = 1.5;

pub struct Demo {
    x: f32,
    y: f32,
    hue: u8,
    horizontal_only: bool,
    fps: u32,
}

impl Demo {
    pub fn new() -> Self {
        Self {
            x: 16.0,
            y: 64.0,
            hue: 8,
            horizontal_only: false,
            fps: 0,
        }
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.fps = fps;
    }

    fn camera_options(&self) -> CameraOptions {
        let cell = SPRITE_SIZE as f32;
        CameraOptions {
            lerp: 0.2,
            dead_zone_w: 12.0,
            dead_zone_h: 8.0,
            look_ahead_x: 10.0,
            look_ahead_y: 0.0,
            horizontal_only: self.horizontal_only,
            clamp_to_map: true,
            map_width: LEVEL_W as f32 * cell,
            map_height: LEVEL_H as f32 * cell,
        }
    }

    /// Paint the player sprite in the current colour
    fn paint_player(&self, gfx: &mut RenderState) {
        let (sx, sy) = sheet_origin(PLAYER);
        for y in 1..7 {
            for x in 2..6 {
                gfx.sset(sx + x, sy + y, self.hue);
            }
        }
        // Eyes
        gfx.sset(sx + 3, sy + 2, 7);
        gfx.sset(sx + 5, sy + 2, 7);
    }
}

fn sheet_origin(id: usize) -> (i32, i32) {
    let id = id as u32;
    (
        ((id % SPRITES_PER_ROW) * SPRITE_SIZE) as i32,
        ((id / SPRITES_PER_ROW) * SPRITE_SIZE) as i32,
    )
}

impl Cartridge for Demo {
    fn init(&mut self, gfx: &mut RenderState) {
        // Tiles: grassy ground and bricks
        let (gx, gy) = sheet_origin(GROUND as usize);
        let (bx, by) = sheet_origin(BRICK as usize);
        for y in 0..8 {
            for x in 0..8 {
                gfx.sset(gx + x, gy + y, if y < 2 { 11 } else { 4 });
                let mortar = y % 4 == 3 || (x + if y < 4 { 0 } else { 4 }) % 8 == 0;
                gfx.sset(bx + x, by + y, if mortar { 5 } else { 9 });
            }
        }
        gfx.fset(GROUND as usize, None, SOLID);
        gfx.fset(BRICK as usize, None, SOLID);
        self.paint_player(gfx);

        for x in 0..LEVEL_W {
            gfx.mset(x, LEVEL_H - 1, GROUND);
            gfx.mset(x, LEVEL_H - 2, GROUND);
            if x % 9 == 4 {
                gfx.mset(x, LEVEL_H - 5, BRICK);
                gfx.mset(x + 1, LEVEL_H - 5, BRICK);
            }
        }

        if let Err(err) = gfx.set_camera_options(self.camera_options()) {
            warn!(%err, "demo camera options");
        }
        gfx.center_camera_on(self.x, self.y);
    }

    fn update(&mut self, gfx: &mut RenderState, input: &Buttons) {
        let cell = SPRITE_SIZE as f32;
        if input.btn(Button::Left) {
            self.x -= SPEED;
        }
        if input.btn(Button::Right) {
            self.x += SPEED;
        }
        if input.btn(Button::Up) {
            self.y -= SPEED;
        }
        if input.btn(Button::Down) {
            self.y += SPEED;
        }
        self.x = self.x.clamp(0.0, (LEVEL_W as f32 - 1.0) * cell);
        self.y = self.y.clamp(0.0, (LEVEL_H as f32 - 3.0) * cell);

        if input.btnp(Button::O) {
            self.hue = if self.hue >= 15 { 8 } else { self.hue + 1 };
            self.paint_player(gfx);
        }
        if input.btnp(Button::X) {
            self.horizontal_only = !self.horizontal_only;
            info!(horizontal_only = self.horizontal_only, "camera follow mode");
            if let Err(err) = gfx.set_camera_options(self.camera_options()) {
                warn!(%err, "demo camera options");
            }
        }

        let half = cell / 2.0;
        gfx.center_camera_on(self.x + half, self.y + half);
    }

    fn draw(&mut self, gfx: &mut RenderState) {
        gfx.cls(Some(12));

        // Only the cells around the view
        let (ox, oy) = gfx.camera_offset();
        let step = SPRITE_SIZE as i32;
        let cel_x = ox as i32 / step;
        let cel_y = oy as i32 / step;
        let cells_w = gfx.width() as i32 / step + 2;
        let cells_h = gfx.height() as i32 / step + 2;
        gfx.map(cel_x, cel_y, cel_x * step, cel_y * step, cells_w, cells_h, SOLID);

        gfx.spr(PLAYER, self.x as i32, self.y as i32, 1, 1, false, false);

        // HUD locked to the screen
        gfx.camera_reset();
        gfx.rectfill(0, 0, gfx.width() as i32 - 1, 6, Some(0));
        let end = gfx.print("Z:COLOUR X:AXIS", 1, 1, Some(7));
        let mode = if self.horizontal_only { "H" } else { "HV" };
        gfx.print(mode, end + 4, 1, Some(10));
        if self.fps > 0 {
            let text = format!("{}", self.fps);
            let x = gfx.width() as i32 - picocam::display::text_width(&text) as i32 - 1;
            gfx.print(&text, x, 1, Some(6));
        }
    }

    fn name(&self) -> &str {
        "demo"
    }
}
