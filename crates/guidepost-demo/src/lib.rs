#![forbid(unsafe_code)]

//! Guidepost demo: sample tours over a headless data explorer.

pub mod cli;
pub mod tours;
