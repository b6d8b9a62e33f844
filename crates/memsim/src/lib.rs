//! Interactive front end for the `memsim-core` allocation engine.
//!
//! [`shell::Shell`] reads commands line by line, runs them against an
//! [`memsim_core::Engine`] and writes the results to any [`std::io::Write`].

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod command;
pub mod log;
pub mod shell;
