pub mod common;
pub mod document;
pub mod instance;
pub mod links;
pub mod request;
pub mod resource;

pub use common::*;
pub use document::*;
pub use instance::*;
pub use links::*;
pub use request::*;
pub use resource::*;
