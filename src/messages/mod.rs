//! The request and response values passed through the router tree.

mod request;
mod response;

pub use request::*;
pub use response::*;
