//! The six PICO-8 buttons with edge detection

/// Button ids in PICO-8 order (`btn(0)` is Left)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Left,
    Right,
    Up,
    Down,
    O,
    X,
}

impl Button {
    pub const ALL: [Button; 6] = [
        Button::Left,
        Button::Right,
        Button::Up,
        Button::Down,
        Button::O,
        Button::X,
    ];

    #[inline]
    fn bit(self) -> u8 {
        1 << self as u8
    }

    /// PICO-8 numeric id
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

/// Current and previous frame button state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Buttons {
    current: u8,
    previous: u8,
}

impl Buttons {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame with the buttons held right now
    pub fn update(&mut self, pressed: &[Button]) {
        self.previous = self.current;
        self.current = pressed.iter().fold(0, |mask, b| mask | b.bit());
    }

    /// Held this frame
    pub fn btn(&self, button: Button) -> bool {
        self.current & button.bit() != 0
    }

    /// Went down this frame
    pub fn btnp(&self, button: Button) -> bool {
        self.btn(button) && self.previous & button.bit() == 0
    }

    pub fn any(&self) -> bool {
        self.current != 0
    }

    /// Bitmask in PICO-8 order, as `btn()` with no argument returns
    pub fn mask(&self) -> u8 {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_btn_tracks_held_buttons() {
        let mut input = Buttons::new();
        input.update(&[Button::Left, Button::X]);
        assert!(input.btn(Button::Left));
        assert!(input.btn(Button::X));
        assert!(!input.btn(Button::Right));
        assert_eq!(input.mask(), 0b10_0001);
    }

    #[test]
    fn test_btnp_only_on_press_edge() {
        let mut input = Buttons::new();
        input.update(&[Button::O]);
        assert!(input.btnp(Button::O));
        input.update(&[Button::O]);
        assert!(input.btn(Button::O));
        assert!(!input.btnp(Button::O));
        input.update(&[]);
        assert!(!input.any());
        input.update(&[Button::O]);
        assert!(input.btnp(Button::O));
    }

    #[test]
    fn test_from_index() {
        assert_eq!(Button::from_index(0), Some(Button::Left));
        assert_eq!(Button::from_index(5), Some(Button::X));
        assert_eq!(Button::from_index(6), None);
    }
}
