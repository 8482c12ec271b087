
pub use self::fat::*;
