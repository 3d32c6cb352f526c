//! Runtime invariant recording for capability contracts
//!
//! Capability stages call [`assert_invariant!`] on the guarantees they hand to
//! the settings screen (non-empty lens lists, area-sorted resolutions,
//! ascending frame rates). Every checked invariant is recorded per thread so
//! contract tests can prove a code path actually verified it.
//!
//! A violation panics in debug builds. Release builds log it at `error` and
//! carry on, because a bad option list must never take the host app down.
//!
//! ```rust,ignore
//! use lenscaps::invariant_ppt::*;
//!
//! assert_invariant!(!lenses.is_empty(), "Lens list is never empty", "lenses");
//!
//! #[test]
//! fn contract_lenses() {
//!     contract_test("lenses", &["Lens list is never empty"]);
//! }
//! ```

use std::cell::RefCell;
use std::collections::HashSet;
use std::thread_local;

thread_local! {
    static CHECKED: RefCell<HashSet<String>> = RefCell::new(HashSet::new());
}

/// Check an invariant and record that it was checked.
#[macro_export]
macro_rules! assert_invariant {
    ($condition:expr, $message:expr) => {
        $crate::invariant_ppt::__check_invariant($condition, $message, None)
    };
    ($condition:expr, $message:expr, $context:expr) => {
        $crate::invariant_ppt::__check_invariant($condition, $message, Some($context))
    };
}

#[doc(hidden)]
pub fn __check_invariant(condition: bool, message: &str, context: Option<&str>) -> bool {
    CHECKED.with(|checked| {
        checked.borrow_mut().insert(message.to_string());
    });

    if !condition {
        let ctx = context.unwrap_or("unknown");
        log::error!("INVARIANT VIOLATION [{}]: {}", ctx, message);
        if cfg!(debug_assertions) {
            panic!("INVARIANT VIOLATION [{}]: {}", ctx, message);
        }
    }
    condition
}

/// Panic unless every listed invariant was checked on this thread.
pub fn contract_test(test_name: &str, required_invariants: &[&str]) {
    let checked = CHECKED.with(|checked| checked.borrow().clone());

    let missing: Vec<&str> = required_invariants
        .iter()
        .copied()
        .filter(|inv| !checked.contains(*inv))
        .collect();

    if !missing.is_empty() {
        panic!(
            "CONTRACT FAILURE [{}]: invariants never checked:\n  - {}",
            test_name,
            missing.join("\n  - ")
        );
    }
}

/// Forget everything recorded on this thread.
pub fn clear_invariant_log() {
    CHECKED.with(|checked| checked.borrow_mut().clear());
}
