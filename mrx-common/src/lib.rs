pub mod api;
pub mod consts;
pub mod types;

pub use api::ApiOp;
