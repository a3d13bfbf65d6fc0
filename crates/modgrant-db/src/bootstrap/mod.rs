//! One-time bootstrap fixtures.

mod seed;

pub use seed::seed_demo_data;
