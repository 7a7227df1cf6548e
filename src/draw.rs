//! Two-phase drawing: primitives append commands, a flush rasterizes them.
//!
//! A frame starts deferred: commands carry no offset and pick up whatever
//! the camera offset is at flush time. An explicit camera call pins every
//! still-deferred command to an offset chosen by the caller and switches the
//! frame to anchored, where each later command captures the offset active
//! when it was issued. Groups of draws separated by `camera()` calls keep
//! their own offsets within one frame.

use crate::palette::DrawPalette;

/// One queued drawing operation. Colours are palette indices already
/// passed through the draw palette.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        color: u8,
    },
    Pixel {
        x: i32,
        y: i32,
        color: u8,
    },
    Line {
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        color: u8,
    },
    Rect {
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        color: u8,
        fill: bool,
    },
    Circle {
        x: i32,
        y: i32,
        radius: i32,
        color: u8,
        fill: bool,
    },
    /// `spr`: `w` x `h` cells of 8x8 starting at sprite `id`
    Sprite {
        id: usize,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        flip_x: bool,
        flip_y: bool,
        palette: DrawPalette,
    },
    /// `sspr`: stretch a spritesheet rectangle onto a screen rectangle
    SpriteStretch {
        sx: i32,
        sy: i32,
        sw: i32,
        sh: i32,
        dx: i32,
        dy: i32,
        dw: i32,
        dh: i32,
        palette: DrawPalette,
    },
    /// `map`: draw a block of map cells; `layer` filters by sprite flags
    Map {
        cel_x: i32,
        cel_y: i32,
        sx: i32,
        sy: i32,
        cel_w: i32,
        cel_h: i32,
        layer: u8,
        palette: DrawPalette,
    },
    Text {
        text: String,
        x: i32,
        y: i32,
        color: u8,
    },
}

impl DrawCommand {
    /// Whether the camera offset applies to this command
    pub fn uses_camera(&self) -> bool {
        !matches!(self, Self::Clear { .. })
    }
}

/// Offset resolution state of the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameMode {
    Deferred,
    Anchored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueuedCommand {
    pub command: DrawCommand,
    /// Offset captured at issue time; None resolves at flush
    pub anchor: Option<(i32, i32)>,
}

impl QueuedCommand {
    /// Offset to rasterize with, given the camera offset at flush time
    pub fn resolve(&self, flush_offset: (i32, i32)) -> (i32, i32) {
        if !self.command.uses_camera() {
            return (0, 0);
        }
        self.anchor.unwrap_or(flush_offset)
    }
}

pub struct DrawList {
    commands: Vec<QueuedCommand>,
    mode: FrameMode,
}

impl DrawList {
    pub fn new() -> Self {
        Self {
            commands: Vec::with_capacity(256),
            mode: FrameMode::Deferred,
        }
    }

    pub fn push(&mut self, command: DrawCommand, offset: (i32, i32)) {
        let anchor = match self.mode {
            FrameMode::Deferred => None,
            FrameMode::Anchored => Some(offset),
        };
        self.commands.push(QueuedCommand { command, anchor });
    }

    /// An explicit camera call happened: pin deferred commands to `offset`
    pub fn anchor_pending(&mut self, offset: (i32, i32)) {
        for queued in &mut self.commands {
            if queued.anchor.is_none() {
                queued.anchor = Some(offset);
            }
        }
        self.mode = FrameMode::Anchored;
    }

    /// Start a new frame in deferred mode
    pub fn begin_frame(&mut self) {
        self.mode = FrameMode::Deferred;
    }

    pub fn mode(&self) -> FrameMode {
        self.mode
    }

    /// Take every queued command, keeping the allocation for the next frame
    pub fn take(&mut self, into: &mut Vec<QueuedCommand>) {
        into.clear();
        into.append(&mut self.commands);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[QueuedCommand] {
        &self.commands
    }
}

impl Default for DrawList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(x: i32) -> DrawCommand {
        DrawCommand::Pixel { x, y: 0, color: 7 }
    }

    #[test]
    fn test_deferred_commands_resolve_at_flush() {
        let mut list = DrawList::new();
        list.push(dot(1), (0, 0));
        assert_eq!(list.commands()[0].anchor, None);
        assert_eq!(list.commands()[0].resolve((63, 63)), (63, 63));
    }

    #[test]
    fn test_anchored_after_camera_call() {
        let mut list = DrawList::new();
        list.anchor_pending((0, 0));
        list.push(dot(1), (0, 0));
        list.push(dot(2), (63, 63));
        assert_eq!(list.mode(), FrameMode::Anchored);
        assert_eq!(list.commands()[0].resolve((63, 63)), (0, 0));
        assert_eq!(list.commands()[1].resolve((0, 0)), (63, 63));
    }

    #[test]
    fn test_clear_ignores_camera() {
        let mut list = DrawList::new();
        list.anchor_pending((10, 10));
        list.push(DrawCommand::Clear { color: 0 }, (10, 10));
        assert_eq!(list.commands()[0].resolve((20, 20)), (0, 0));
    }

    #[test]
    fn test_anchor_pending_pins_only_deferred() {
        let mut list = DrawList::new();
        list.push(dot(1), (0, 0));
        list.anchor_pending((50, 0));
        list.push(dot(2), (63, 63));
        list.anchor_pending((0, 0));
        assert_eq!(list.commands()[0].resolve((9, 9)), (50, 0));
        assert_eq!(list.commands()[1].resolve((9, 9)), (63, 63));
    }

    #[test]
    fn test_begin_frame_returns_to_deferred() {
        let mut list = DrawList::new();
        list.anchor_pending((0, 0));
        list.begin_frame();
        assert_eq!(list.mode(), FrameMode::Deferred);
    }

    #[test]
    fn test_take_moves_everything() {
        let mut list = DrawList::new();
        list.push(dot(1), (0, 0));
        list.push(dot(2), (0, 0));
        let mut scratch = Vec::new();
        list.take(&mut scratch);
        assert!(list.is_empty());
        assert_eq!(scratch.len(), 2);
        assert_eq!(scratch[1].command, dot(2));
    }
}
