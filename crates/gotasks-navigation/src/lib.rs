//! gotasks Navigation
//!
//! Views are addressed by URL fragment and modelled as an enum instead of a
//! string-keyed dispatch table.

mod error;
mod route;
mod router;

pub use error::NavigationError;
pub use route::Route;
pub use router::Router;

pub type Result<T> = std::result::Result<T, NavigationError>;
