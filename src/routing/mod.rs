//! The routing tree: URL decomposition, matchers, handlers and routers.

mod handler;
mod info;
mod matcher;
mod router;

pub use handler::*;
pub use info::*;
pub use matcher::*;
pub use router::*;
