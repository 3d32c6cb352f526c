//! Testing utilities for lenscaps
//!
//! Provides device profiles based on camera stacks seen in the field, so the
//! capability engine can be exercised offline without a phone.

pub mod fixtures;

pub use fixtures::{
    broken_hal,
    legacy_only_device,
    platform,
    samsung_underreporter,
    single_back_lens,
    triple_back_array,
};
