#![allow(dead_code)]

use std::time::{Duration, Instant};

/// Installs a test-writer subscriber once per test binary. `RUST_LOG=trace`
/// shows every overrun the readers detect.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A record large enough to span several words, with every payload word
/// derived from the tag so that a torn copy is detectable.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tagged {
    pub producer: u32,
    pub index: u32,
    pub body: [u64; 7],
}

fn mix(producer: u32, index: u32) -> u64 {
    ((producer as u64) << 32 | index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

impl Tagged {
    pub fn new(producer: u32, index: u32) -> Self {
        let w = mix(producer, index);
        Self {
            producer,
            index,
            body: [w, w ^ 1, w ^ 2, w ^ 3, w ^ 4, w ^ 5, w ^ 6],
        }
    }

    pub fn is_intact(&self) -> bool {
        let w = mix(self.producer, self.index);
        self.body
            .iter()
            .enumerate()
            .all(|(i, &word)| word == w ^ i as u64)
    }
}

/// Panics once the deadline has passed, so a stuck reader fails the test
/// instead of hanging it.
pub struct Deadline(Instant);

impl Deadline {
    pub fn after(secs: u64) -> Self {
        Self(Instant::now() + Duration::from_secs(secs))
    }

    pub fn check(&self, what: &str) {
        assert!(Instant::now() < self.0, "timed out: {what}");
    }
}
