use std::sync::{Mutex, MutexGuard};

use tracing::warn;

/// Lock a registry mutex, recovering the guard if a previous holder panicked.
pub(crate) fn mutex_lock<'a, T>(
    lock: &'a Mutex<T>,
    target: &'static str,
    op: &'static str,
) -> MutexGuard<'a, T> {
    match lock.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(
                op,
                target_module = target,
                lock_kind = "mutex.lock",
                result = "poisoned_recovered",
                "Recovered from poisoned cache lock"
            );
            poisoned.into_inner()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    #[test]
    fn recovers_poisoned_mutex() {
        let lock = Mutex::new(1_u32);

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = lock.lock().expect("fresh lock");
            panic!("poison the lock");
        }));

        assert!(lock.is_poisoned());
        let mut guard = mutex_lock(&lock, "cache::lock", "test");
        *guard += 1;
        assert_eq!(*guard, 2);
    }
}
