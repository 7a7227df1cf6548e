mod buttons;

pub use buttons::{Button, Buttons};
