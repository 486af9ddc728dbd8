//! A polling delay. It burns CPU cycles in an empty loop, so never use it
//! under a preemptive scheduler, and don't expect it to be accurate: the
//! iteration count is calibrated by instruction speed and nothing else.

use core::hint::black_box;

/// Number of empty loop iterations that take roughly a millisecond.
pub const ITERATIONS_PER_MS: u32 = 1000;

/// Blocks for approximately `count` milliseconds.
pub fn delay_ms(count: u32) {
    spin(count, ITERATIONS_PER_MS, |i| {
        black_box(i);
    });
}

fn spin(count: u32, iterations_per_ms: u32, mut body: impl FnMut(u32)) {
    for _ in 0..count {
        for i in 0..iterations_per_ms {
            body(i);
        }
    }
}
