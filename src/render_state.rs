//! Cartridge-facing drawing state.
//!
//! `RenderState` owns the screen, the sprite bank, the map, the camera and
//! the three cache layers. Primitives only append to the draw list; the
//! flush phase resolves camera offsets and rasterizes into the pixel buffer.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::cache::{ScreenPixelCache, SpriteModificationQueue, SpritePixelCache};
use crate::camera::{Camera, CameraOptions, FollowState};
use crate::display::font;
use crate::display::PixelBuffer;
use crate::config::MAX_SCREEN_EDGE;
use crate::draw::{DrawCommand, DrawList, QueuedCommand};
use crate::error::CameraConfigError;
use crate::map::TileMap;
use crate::palette::{self, DrawPalette, Rgba};
use crate::sprite::{SpriteBank, SPRITE_SIZE, SPRITES_PER_ROW, SPRITE_COUNT};

const DEFAULT_DRAW_COLOR: u8 = 6;

pub struct RenderState {
    buffer: PixelBuffer,
    screen_cache: Arc<ScreenPixelCache>,
    sprite_cache: Arc<SpritePixelCache>,
    sprite_queue: Arc<SpriteModificationQueue>,
    sprites: SpriteBank,
    map: TileMap,
    camera: Camera,
    /// Follow state at the start of the frame
    follow_snapshot: Option<FollowState>,
    /// Last explicit camera call of the frame pinned to the origin
    hud_pinned: bool,
    draw_list: DrawList,
    scratch: Vec<QueuedCommand>,
    palette: DrawPalette,
    draw_color: u8,
}

impl RenderState {
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = screen_size(width, height);
        Self {
            buffer: PixelBuffer::with_size(width, height),
            screen_cache: Arc::new(ScreenPixelCache::new(width, height)),
            sprite_cache: Arc::new(SpritePixelCache::with_capacity(SPRITE_COUNT)),
            sprite_queue: Arc::new(SpriteModificationQueue::new()),
            sprites: SpriteBank::new(),
            map: TileMap::new(),
            camera: Camera::new(width, height),
            follow_snapshot: None,
            hud_pinned: false,
            draw_list: DrawList::new(),
            scratch: Vec::with_capacity(256),
            palette: DrawPalette::new(),
            draw_color: DEFAULT_DRAW_COLOR,
        }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Change the virtual screen size. Buffer, screen cache and camera move
    /// together; pending commands rasterize into the new buffer.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = screen_size(width, height);
        self.buffer.resize(width, height);
        self.screen_cache.init(width, height);
        self.camera.set_screen_size(width, height);
        debug!(width, height, "screen resized");
    }

    pub fn pixel_buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn pixel_buffer_mut(&mut self) -> &mut PixelBuffer {
        &mut self.buffer
    }

    pub fn screen_cache(&self) -> Arc<ScreenPixelCache> {
        Arc::clone(&self.screen_cache)
    }

    pub fn sprite_cache(&self) -> Arc<SpritePixelCache> {
        Arc::clone(&self.sprite_cache)
    }

    pub fn sprite_queue(&self) -> Arc<SpriteModificationQueue> {
        Arc::clone(&self.sprite_queue)
    }

    pub fn sprites(&self) -> &SpriteBank {
        &self.sprites
    }

    pub fn pending_commands(&self) -> usize {
        self.draw_list.len()
    }

    // ---------------------------------------------------------------
    // Frame phases
    // ---------------------------------------------------------------

    /// Advance the follow camera and open a deferred frame
    pub fn begin_frame(&mut self) {
        self.camera.update();
        self.follow_snapshot = self.camera.follow_state();
        self.hud_pinned = false;
        self.draw_list.begin_frame();
    }

    /// Flush the frame. A following camera whose frame ended on `camera()`
    /// (a HUD drawn at the origin) resumes following from where it was, so
    /// the next update continues smoothing. Options and any other pin stay.
    pub fn end_frame(&mut self) {
        self.flush();
        if let Some(state) = self.follow_snapshot.take() {
            if self.hud_pinned {
                self.camera.resume_follow(state);
            }
        }
        self.hud_pinned = false;
    }

    /// Rasterize every pending command into the pixel buffer
    pub fn flush(&mut self) {
        if self.draw_list.is_empty() {
            return;
        }
        let flush_offset = self.camera.pixel_offset();
        self.draw_list.take(&mut self.scratch);

        let mut raster = Rasterizer {
            buffer: &mut self.buffer,
            sprites: &mut self.sprites,
            map: &self.map,
            sprite_cache: &self.sprite_cache,
            sprite_queue: &self.sprite_queue,
        };
        for queued in &self.scratch {
            raster.draw(&queued.command, queued.resolve(flush_offset));
        }
        trace!(commands = self.scratch.len(), ?flush_offset, "draw list flushed");

        self.scratch.clear();
        self.screen_cache.invalidate();
    }

    fn push(&mut self, command: DrawCommand) {
        self.draw_list.push(command, self.camera.pixel_offset());
        self.screen_cache.invalidate();
    }

    /// Explicit colour also becomes the pen colour; result is remapped
    fn pen(&mut self, color: Option<u8>) -> u8 {
        if let Some(c) = color {
            self.draw_color = c & 0x0f;
        }
        self.palette.map(self.draw_color)
    }

    // ---------------------------------------------------------------
    // Primitives
    // ---------------------------------------------------------------

    pub fn cls(&mut self, color: Option<u8>) {
        let color = color.unwrap_or(0) & 0x0f;
        self.push(DrawCommand::Clear { color });
    }

    pub fn pset(&mut self, x: i32, y: i32, color: Option<u8>) {
        let color = self.pen(color);
        self.push(DrawCommand::Pixel { x, y, color });
    }

    /// Palette index at world position (x, y); 0 off screen.
    /// Sees everything drawn so far this frame.
    pub fn pget(&mut self, x: i32, y: i32) -> u8 {
        self.pget_rgba(x, y).map_or(0, palette::index_of)
    }

    pub fn pget_rgba(&mut self, x: i32, y: i32) -> Option<Rgba> {
        self.flush();
        if !self.screen_cache.is_valid() {
            self.screen_cache
                .rebuild(self.buffer.width(), self.buffer.height(), self.buffer.as_bytes());
        }
        let (ox, oy) = self.camera.pixel_offset();
        self.screen_cache.pixel(x - ox, y - oy)
    }

    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Option<u8>) {
        let color = self.pen(color);
        self.push(DrawCommand::Line { x0, y0, x1, y1, color });
    }

    pub fn rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Option<u8>) {
        let color = self.pen(color);
        self.push(DrawCommand::Rect { x0, y0, x1, y1, color, fill: false });
    }

    pub fn rectfill(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Option<u8>) {
        let color = self.pen(color);
        self.push(DrawCommand::Rect { x0, y0, x1, y1, color, fill: true });
    }

    pub fn circ(&mut self, x: i32, y: i32, radius: i32, color: Option<u8>) {
        let color = self.pen(color);
        self.push(DrawCommand::Circle { x, y, radius, color, fill: false });
    }

    pub fn circfill(&mut self, x: i32, y: i32, radius: i32, color: Option<u8>) {
        let color = self.pen(color);
        self.push(DrawCommand::Circle { x, y, radius, color, fill: true });
    }

    /// Draw text in the 3x5 font. Returns the world x after the last glyph.
    pub fn print(&mut self, text: &str, x: i32, y: i32, color: Option<u8>) -> i32 {
        let color = self.pen(color);
        self.push(DrawCommand::Text { text: text.to_string(), x, y, color });
        let last_line = text.rsplit('\n').next().unwrap_or("");
        x + font::text_width(last_line) as i32
    }

    pub fn color(&mut self, color: u8) {
        self.draw_color = color & 0x0f;
    }

    pub fn pal(&mut self, from: u8, to: u8) {
        self.palette.set(from, to);
    }

    pub fn pal_reset(&mut self) {
        self.palette.reset_remap();
    }

    pub fn palt(&mut self, color: u8, transparent: bool) {
        self.palette.set_transparent(color, transparent);
    }

    pub fn palt_reset(&mut self) {
        self.palette.reset_transparency();
    }

    // ---------------------------------------------------------------
    // Sprites and map
    // ---------------------------------------------------------------

    /// Draw `w` x `h` sprite cells starting at sprite `n`
    #[allow(clippy::too_many_arguments)]
    pub fn spr(&mut self, n: usize, x: i32, y: i32, w: u32, h: u32, flip_x: bool, flip_y: bool) {
        if n >= SPRITE_COUNT || w == 0 || h == 0 {
            return;
        }
        let palette = self.palette;
        self.push(DrawCommand::Sprite { id: n, x, y, w, h, flip_x, flip_y, palette });
    }

    /// Stretch the sheet rectangle (sx, sy, sw, sh) onto (dx, dy, dw, dh)
    #[allow(clippy::too_many_arguments)]
    pub fn sspr(&mut self, sx: i32, sy: i32, sw: i32, sh: i32, dx: i32, dy: i32, dw: i32, dh: i32) {
        if sw <= 0 || sh <= 0 || dw <= 0 || dh <= 0 {
            return;
        }
        let palette = self.palette;
        self.push(DrawCommand::SpriteStretch { sx, sy, sw, sh, dx, dy, dw, dh, palette });
    }

    /// Palette index of a spritesheet pixel, pending writes included
    pub fn sget(&mut self, x: i32, y: i32) -> u8 {
        let Some((id, lx, ly)) = SpriteBank::locate(x, y) else {
            return 0;
        };
        sprite_bytes(&mut self.sprites, &self.sprite_cache, &self.sprite_queue, id, |bytes, w, _| {
            pixel_index(bytes, w, lx, ly)
        })
        .unwrap_or(0)
    }

    /// Queue a spritesheet pixel write; it lands before the sprite is next
    /// read or drawn
    pub fn sset(&mut self, x: i32, y: i32, color: u8) {
        let Some((id, lx, ly)) = SpriteBank::locate(x, y) else {
            return;
        };
        let Some(handle) = self.sprites.handle(id) else {
            return;
        };
        self.sprite_queue.enqueue(handle, lx, ly, palette::rgba(color));
        self.sprite_cache.invalidate(id);
    }

    pub fn fget(&self, n: usize, bit: Option<u8>) -> u8 {
        self.sprites.flag(n, bit)
    }

    pub fn fset(&mut self, n: usize, bit: Option<u8>, value: u8) {
        self.sprites.set_flag(n, bit, value);
    }

    pub fn mget(&self, x: i32, y: i32) -> u8 {
        self.map.get(x, y)
    }

    pub fn mset(&mut self, x: i32, y: i32, sprite: u8) {
        self.map.set(x, y, sprite);
    }

    pub fn load_map(&mut self, cells: &[u8]) {
        self.map.load(cells);
    }

    /// Draw a block of map cells at world (sx, sy). A non-zero `layer` only
    /// draws cells whose sprite flags share a bit with it.
    #[allow(clippy::too_many_arguments)]
    pub fn map(
        &mut self,
        cel_x: i32,
        cel_y: i32,
        sx: i32,
        sy: i32,
        cel_w: i32,
        cel_h: i32,
        layer: u8,
    ) {
        if cel_w <= 0 || cel_h <= 0 {
            return;
        }
        let palette = self.palette;
        self.push(DrawCommand::Map { cel_x, cel_y, sx, sy, cel_w, cel_h, layer, palette });
    }

    /// Replace the whole spritesheet from 128x128 RGBA bytes. Pending writes
    /// against the old images are dropped.
    pub fn reload_spritesheet(&mut self, rgba: &[u8]) -> bool {
        // Commands already issued draw with the old sheet
        self.flush();
        if !self.sprites.load_sheet(rgba) {
            return false;
        }
        self.sprite_queue.clear();
        self.sprite_cache.clear_all();
        debug!("spritesheet reloaded");
        true
    }

    // ---------------------------------------------------------------
    // Camera
    // ---------------------------------------------------------------

    /// Set the offset directly, cancelling any follow target.
    ///
    /// Draws issued earlier in the frame are pinned here: to the followed
    /// offset when the camera was following, otherwise to the new offset.
    pub fn camera(&mut self, x: i32, y: i32) {
        let followed = self.camera.is_following().then(|| self.camera.pixel_offset());
        self.camera.direct_set(x as f32, y as f32);
        let anchor = followed.unwrap_or_else(|| self.camera.pixel_offset());
        self.draw_list.anchor_pending(anchor);
        // `camera()` after following is the HUD idiom; any other pin sticks
        self.hud_pinned = x == 0 && y == 0;
    }

    pub fn camera_reset(&mut self) {
        self.camera(0, 0);
    }

    pub fn set_camera_options(&mut self, options: CameraOptions) -> Result<(), CameraConfigError> {
        self.camera.set_options(options)
    }

    pub fn set_camera_target(&mut self, x: f32, y: f32) {
        self.camera.set_target(x, y);
    }

    pub fn center_camera_on(&mut self, x: f32, y: f32) {
        self.camera.center_on(x, y);
    }

    pub fn camera_offset(&self) -> (f32, f32) {
        self.camera.offset()
    }

    pub fn camera_state(&self) -> &Camera {
        &self.camera
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new(crate::display::DEFAULT_WIDTH, crate::display::DEFAULT_HEIGHT)
    }
}

/// Screen size limited to 1..=MAX_SCREEN_EDGE per edge
fn screen_size(width: u32, height: u32) -> (u32, u32) {
    let clamped = (
        width.clamp(1, MAX_SCREEN_EDGE),
        height.clamp(1, MAX_SCREEN_EDGE),
    );
    if clamped != (width, height) {
        warn!(width, height, max = MAX_SCREEN_EDGE, "screen size clamped");
    }
    clamped
}

/// Bring a sprite's cached bytes up to date and visit them.
///
/// Pending queued writes are applied to the image first and the cache entry
/// is dropped, so the fill reads the image after the batch landed.
fn sprite_bytes<R>(
    sprites: &mut SpriteBank,
    cache: &SpritePixelCache,
    queue: &SpriteModificationQueue,
    id: usize,
    visit: impl FnOnce(&[u8], u32, u32) -> R,
) -> Option<R> {
    let handle = sprites.handle(id)?;
    let image = sprites.image_mut(id)?;
    if queue.has_pending(handle) && queue.flush(handle, image) > 0 {
        cache.invalidate(id);
    }
    let (w, h) = (image.width(), image.height());
    cache.with_pixels(id, w, h, |dest| image.read_into(dest), |bytes| visit(bytes, w, h))
}

#[inline]
fn pixel_index(bytes: &[u8], width: u32, x: u32, y: u32) -> u8 {
    let i = ((y * width + x) * 4) as usize;
    match bytes.get(i..i + 4) {
        Some(px) => palette::index_of([px[0], px[1], px[2], px[3]]),
        None => 0,
    }
}

/// Borrowed view of the state the flush phase writes through
struct Rasterizer<'a> {
    buffer: &'a mut PixelBuffer,
    sprites: &'a mut SpriteBank,
    map: &'a TileMap,
    sprite_cache: &'a SpritePixelCache,
    sprite_queue: &'a SpriteModificationQueue,
}

impl Rasterizer<'_> {
    fn draw(&mut self, command: &DrawCommand, (ox, oy): (i32, i32)) {
        match *command {
            DrawCommand::Clear { color } => self.buffer.clear(palette::rgba(color)),
            DrawCommand::Pixel { x, y, color } => {
                self.buffer.set_pixel(x - ox, y - oy, palette::rgba(color));
            },
            DrawCommand::Line { x0, y0, x1, y1, color } => {
                self.buffer
                    .line(x0 - ox, y0 - oy, x1 - ox, y1 - oy, palette::rgba(color));
            },
            DrawCommand::Rect { x0, y0, x1, y1, color, fill } => {
                let c = palette::rgba(color);
                if fill {
                    self.buffer.fill_rect(x0 - ox, y0 - oy, x1 - ox, y1 - oy, c);
                } else {
                    self.buffer.rect(x0 - ox, y0 - oy, x1 - ox, y1 - oy, c);
                }
            },
            DrawCommand::Circle { x, y, radius, color, fill } => {
                let c = palette::rgba(color);
                if fill {
                    self.buffer.fill_circle(x - ox, y - oy, radius, c);
                } else {
                    self.buffer.draw_circle(x - ox, y - oy, radius, c);
                }
            },
            DrawCommand::Sprite { id, x, y, w, h, flip_x, flip_y, palette } => {
                let step = SPRITE_SIZE as i32;
                for cy in 0..h {
                    for cx in 0..w {
                        let cell = id + (cy * SPRITES_PER_ROW + cx) as usize;
                        if cell >= SPRITE_COUNT {
                            continue;
                        }
                        // Flipping mirrors the cell layout as well as each cell
                        let col = (if flip_x { w - 1 - cx } else { cx }) as i32;
                        let row = (if flip_y { h - 1 - cy } else { cy }) as i32;
                        self.sprite_cell(
                            cell,
                            x - ox + col * step,
                            y - oy + row * step,
                            flip_x,
                            flip_y,
                            &palette,
                        );
                    }
                }
            },
            DrawCommand::SpriteStretch { sx, sy, sw, sh, dx, dy, dw, dh, palette } => {
                for py in 0..dh {
                    let src_y = sy + (py * sh / dh).min(sh - 1);
                    for px in 0..dw {
                        let src_x = sx + (px * sw / dw).min(sw - 1);
                        let Some(c) = self.sheet_color(src_x, src_y) else {
                            continue;
                        };
                        if palette.is_transparent(c) {
                            continue;
                        }
                        self.buffer.set_pixel(
                            dx - ox + px,
                            dy - oy + py,
                            palette::rgba(palette.map(c)),
                        );
                    }
                }
            },
            DrawCommand::Map { cel_x, cel_y, sx, sy, cel_w, cel_h, layer, palette } => {
                let step = SPRITE_SIZE as i32;
                for cy in 0..cel_h {
                    for cx in 0..cel_w {
                        let id = self.map.get(cel_x + cx, cel_y + cy) as usize;
                        if id == 0 {
                            continue;
                        }
                        if layer != 0 && self.sprites.flag(id, None) & layer == 0 {
                            continue;
                        }
                        self.sprite_cell(
                            id,
                            sx - ox + cx * step,
                            sy - oy + cy * step,
                            false,
                            false,
                            &palette,
                        );
                    }
                }
            },
            DrawCommand::Text { ref text, x, y, color } => {
                font::draw_text(self.buffer, x - ox, y - oy, text, palette::rgba(color));
            },
        }
    }

    /// One sprite at screen position (x, y)
    fn sprite_cell(
        &mut self,
        id: usize,
        x: i32,
        y: i32,
        flip_x: bool,
        flip_y: bool,
        palette: &DrawPalette,
    ) {
        let buffer = &mut *self.buffer;
        sprite_bytes(self.sprites, self.sprite_cache, self.sprite_queue, id, |bytes, w, h| {
            for ly in 0..h {
                let src_y = if flip_y { h - 1 - ly } else { ly };
                for lx in 0..w {
                    let src_x = if flip_x { w - 1 - lx } else { lx };
                    let c = pixel_index(bytes, w, src_x, src_y);
                    // Transparency is decided on the colour before remapping
                    if palette.is_transparent(c) {
                        continue;
                    }
                    buffer.set_pixel(x + lx as i32, y + ly as i32, palette::rgba(palette.map(c)));
                }
            }
        });
    }

    fn sheet_color(&mut self, x: i32, y: i32) -> Option<u8> {
        let (id, lx, ly) = SpriteBank::locate(x, y)?;
        sprite_bytes(self.sprites, self.sprite_cache, self.sprite_queue, id, |bytes, w, _| {
            pixel_index(bytes, w, lx, ly)
        })
    }
}
