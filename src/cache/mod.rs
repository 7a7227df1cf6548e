//! Cache layers that keep pixel reads and sprite writes off the backend

mod queue;
mod screen;
mod sprite;

pub use queue::SpriteModificationQueue;
pub use screen::{ScreenCacheStats, ScreenPixelCache};
pub use sprite::{SpriteCacheStats, SpritePixelCache, DEFAULT_SPRITE_SLOTS};
