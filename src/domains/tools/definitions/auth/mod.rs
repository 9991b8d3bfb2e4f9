//! Authentication tools.

pub mod login;

pub use login::{LoginParams, LoginTool};
