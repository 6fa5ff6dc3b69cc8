#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

//! Run JavaScript from Rust without committing to one engine.
//!
//! A [`Runtime`] is either an external interpreter driven through a
//! generated runner script ([`ExternalRuntime`]) or an in-process engine
//! behind the [`embedded::Engine`] contract. Both hand out [`Context`]s that
//! evaluate source and return plain [`serde_json::Value`] data, and both
//! report failures as a normalized [`Error`].
//!
//! ```no_run
//! let runtime = execjs_core::runtimes::autodetect()?;
//! execjs_core::set_runtime(runtime)?;
//! let value = execjs_core::eval("1 + 1")?;
//! assert_eq!(value, serde_json::json!(2));
//! # Ok::<(), execjs_core::Error>(())
//! ```

pub mod active;
pub mod assemble;
pub mod config;
pub mod descriptor;
pub mod embedded;
pub mod error;
pub mod external;
pub mod family;
pub mod locate;
pub mod normalize;
pub mod runtime;
pub mod runtimes;
pub mod shell;
pub mod trace;

#[cfg(test)]
mod testing;

pub use active::{compile, eval, exec, runtime, set_runtime};
pub use config::Config;
pub use descriptor::{Probe, Runner, RuntimeSpec};
pub use error::{Error, ErrorKind, Result};
pub use external::ExternalRuntime;
pub use family::EngineFamily;
pub use runtime::{Context, Runtime};
pub use trace::Frame;

pub use execjs_util::TextEncoding;
pub use serde_json::Value;
