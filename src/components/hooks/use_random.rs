use std::sync::atomic::{AtomicUsize, Ordering};

const PREFIX: &str = "docvault"; // Must NOT contain "/" or "-"

static COUNTER: AtomicUsize = AtomicUsize::new(1);

/// Unique DOM id for `aria-*` wiring, e.g. `dialog_title_docvault_3`.
pub fn use_random_id_for(element: &str) -> String {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{element}_{PREFIX}_{n}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_per_call() {
        let a = use_random_id_for("dialog");
        let b = use_random_id_for("dialog");
        assert_ne!(a, b);
        assert!(a.starts_with("dialog_docvault_"));
    }
}
