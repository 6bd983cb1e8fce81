pub mod apk;
pub mod tools;
pub mod util;

pub use apk::*;
pub use tools::*;
pub use util::*;
