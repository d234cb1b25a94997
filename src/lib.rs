#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod capability;
pub mod config;
pub mod form;
pub mod logging;
pub mod model;
pub mod sink;
pub mod tui;
