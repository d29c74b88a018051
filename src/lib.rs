//! Object-graph behaviors: hierarchical aggregates, responsibility chains
//! and prototype registries, with a narrating demo CLI on top.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
