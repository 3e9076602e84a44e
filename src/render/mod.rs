mod core;
mod width;

pub use self::core::TextPreview;
pub use width::{clip_to_width, display_width, strip_ansi};
