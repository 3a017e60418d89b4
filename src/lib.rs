//! scanwrap: a command-line front-end for the NAPS2 console scanner
//!
//! The library half drives one scan: it probes the engine, resolves a device,
//! builds and runs the engine command, and judges the run by the files it
//! left behind. The binary wires it to arguments, configuration and logging.

pub mod app;
pub mod cli;
pub mod config;
pub mod display;
pub mod engine;
pub mod logging;
pub mod output;
pub mod scan;
