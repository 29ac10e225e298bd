mod interface;
mod lock;
mod sequence;
#[cfg(test)]
mod tests;

pub use interface::*;
pub use lock::*;
pub use sequence::*;
