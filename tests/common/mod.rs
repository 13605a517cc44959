#![allow(dead_code)]

use channeler::config::Config;
use std::{thread, time::Duration};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output of the crate to the test harness, filtered by
/// `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("no {0} left in stock")]
    OutOfStock(String),
}

/// Graph whose tasks fetch fruits by name.
#[derive(Debug)]
pub struct Fruits;

impl Config for Fruits {
    type Output = String;
    type Error = FetchError;
}

/// Graph of plain numbers, failing with a message.
#[derive(Debug)]
pub struct Numbers;

impl Config for Numbers {
    type Output = u64;
    type Error = String;
}

/// Blocks the current thread for `units` times `unit`.
pub fn work(units: u32, unit: Duration) {
    thread::sleep(unit * units);
}
