#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
#[cfg(feature = "std")]
mod generator;
mod hex;
mod id;
#[cfg(feature = "std")]
mod mutex;
#[cfg(feature = "serde")]
mod serde;
mod time;

pub use crate::error::*;
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
#[cfg(feature = "std")]
pub use crate::generator::*;
pub use crate::id::*;
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
#[cfg(feature = "serde")]
pub use crate::serde::as_raw;
pub use crate::time::*;
