//! stagepack-lib: packaging-stage pipeline
//!
//! This crate turns staged build output into distributable artifacts:
//! - `context`: typed key-value store shared by all targets of a run
//! - `layout`: delete-then-recreate directory copies and combined layouts
//! - `archive`: zip or tar.gz archives, chosen by host platform
//! - `pipeline`: the ordered targets and the runner that drives them

pub mod archive;
pub mod config;
pub mod consts;
pub mod context;
pub mod execute;
pub mod layout;
pub mod pipeline;
pub mod platform;
pub mod util;
pub mod version;
