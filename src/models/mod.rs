mod assistant;
mod chapter;
mod character;
mod foreshadowing;
mod item;
mod location;
mod outline;
mod project;
mod writing_style;
mod worldview;

pub use assistant::*;
pub use chapter::*;
pub use character::*;
pub use foreshadowing::*;
pub use item::*;
pub use location::*;
pub use outline::*;
pub use project::*;
pub use writing_style::*;
pub use worldview::*;
