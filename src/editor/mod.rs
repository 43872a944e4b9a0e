mod document;
mod offsets;
mod overlay;
mod patch;
mod tracker;

pub use document::*;
pub use offsets::*;
pub use overlay::*;
pub use patch::*;
pub use tracker::*;
