#![allow(dead_code)]

mod fixture_runner;

pub use fixture_runner::*;
