//! Per-entity list/form controllers over the REST backend.
//!
//! Each screen owns its fetched list and a busy flag; a failed call surfaces
//! a transient notice and leaves the previous state untouched. Required-field
//! validation fails before any network call is issued.

mod chapters;
mod characters;
mod foreshadowing;
mod items;
mod locations;
mod outline;
mod projects;
mod worldview;
mod writing_style;

pub use chapters::*;
pub use characters::*;
pub use foreshadowing::*;
pub use items::*;
pub use locations::*;
pub use outline::*;
pub use projects::*;
pub use worldview::*;
pub use writing_style::*;
