pub mod atomic;
pub mod locking;

pub use atomic::{create_readonly, write_atomic, TEMP_PREFIX};
pub use locking::LockGuard;
