pub mod classify;
pub mod construct;
pub mod dump;
pub mod introspect;

pub use classify::*;
pub use construct::*;
pub use dump::*;
// Introspection functions are re-exported by name from the crate root
