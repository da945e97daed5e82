pub mod render;

pub use render::{RenderNames, render_document};
