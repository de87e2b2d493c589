use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared "request in flight" flag
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag(Arc<AtomicBool>);

impl LoadingFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Raise the flag until the returned guard is dropped
    pub fn begin(&self) -> LoadingGuard {
        self.0.store(true, Ordering::SeqCst);
        LoadingGuard(Arc::clone(&self.0))
    }
}

/// Clears the loading flag when dropped, whatever the exit path
#[derive(Debug)]
#[must_use = "the loading flag clears as soon as the guard is dropped"]
pub struct LoadingGuard(Arc<AtomicBool>);

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_clears_on_drop() {
        let flag = LoadingFlag::default();
        assert!(!flag.is_set());

        let guard = flag.begin();
        assert!(flag.is_set());
        assert!(flag.clone().is_set());

        drop(guard);
        assert!(!flag.is_set());
    }

    #[test]
    fn test_guard_clears_on_early_return() {
        fn failing(flag: &LoadingFlag) -> Result<(), &'static str> {
            let _guard = flag.begin();
            let outcome: Result<(), &'static str> = Err("fallo");
            outcome?;
            Ok(())
        }

        let flag = LoadingFlag::default();
        assert!(failing(&flag).is_err());
        assert!(!flag.is_set());
    }
}
