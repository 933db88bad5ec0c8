mod codec;
#[allow(clippy::module_inception)]
mod id;

pub use id::*;
