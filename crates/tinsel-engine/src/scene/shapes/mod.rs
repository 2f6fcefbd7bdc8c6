pub(crate) mod circle;
pub(crate) mod text;

pub use circle::CircleCmd;
pub use text::TextCmd;
