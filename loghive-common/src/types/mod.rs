mod color;
mod secret;

pub use color::ColorPair;
pub use secret::Secret;
