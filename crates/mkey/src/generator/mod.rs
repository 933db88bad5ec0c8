mod lock;

pub use lock::*;
