#![deny(warnings)]

pub mod analysis;
pub mod config;
pub mod decode;
pub mod emotion;
