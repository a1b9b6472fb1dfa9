pub mod clock;
pub mod fs_atomic;
pub mod logging;
