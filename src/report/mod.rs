//! Loading and presenting uptime reports.

mod html;
mod snapshot;
mod text;

pub use html::*;
pub use snapshot::*;
pub use text::*;
