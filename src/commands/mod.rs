pub mod common;
pub mod delete;
pub mod list;
pub mod state;
pub mod step;
pub mod use_cmd;
