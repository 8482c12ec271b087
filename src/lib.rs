#![doc = include_str!("../README.md")]

pub mod cpu;
mod error;
mod fat;
mod io;
#[cfg(test)]
pub mod test;

pub use self::error::*;
pub use self::fat::*;
pub use self::io::BigEndianRead;
