//! ErrorLog - shared failure accumulator
//!
//! Every concurrent activity in the sender (the tick-driven builder and each
//! delivery task) appends here instead of propagating up its own stack, so
//! that no single failure halts delivery to unrelated satellites. The log is
//! drained exactly once, after shutdown.

use std::sync::Mutex;

use tracing::warn;

use contracts::ContractError;

/// Mutex-guarded, append-only error accumulator.
#[derive(Debug, Default)]
pub struct ErrorLog {
    errors: Mutex<Vec<ContractError>>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one error under the lock.
    pub fn record(&self, error: ContractError) {
        warn!(error = %error, "delivery error recorded");
        self.errors.lock().unwrap().push(error);
    }

    /// Number of errors accumulated so far.
    pub fn len(&self) -> usize {
        self.errors.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take everything accumulated, in append order.
    ///
    /// Locks even though the sender only drains after producers were told to
    /// stop; a late append from a still-running task is then simply lost,
    /// which the shutdown contract documents.
    pub fn drain(&self) -> Vec<ContractError> {
        std::mem::take(&mut *self.errors.lock().unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_drain_preserves_order() {
        let log = ErrorLog::new();
        log.record(ContractError::Other("first".to_string()));
        log.record(ContractError::Other("second".to_string()));
        assert_eq!(log.len(), 2);

        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].to_string(), "first");
        assert_eq!(drained[1].to_string(), "second");
        assert!(log.is_empty());
    }

    #[test]
    fn test_concurrent_appends() {
        use std::sync::Arc;

        let log = Arc::new(ErrorLog::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for j in 0..100 {
                        log.record(ContractError::Other(format!("{i}-{j}")));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(log.drain().len(), 800);
    }
}
