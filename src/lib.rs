#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]
#![deny(unused_must_use)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod context;
pub mod error;
pub mod inject;
pub mod provide;
pub mod registry;
pub mod resolve;

pub use context::Context;
pub use inject::{AnyTarget, Bind, Injectable};
pub use provide::{IntoRegistrations, Provide};
pub use resolve::{Dependencies, Dependency};
#[cfg(feature = "macros")]
pub use wireup_macros::Bind;
