//! Observer trait for session lifecycle events.
//!
//! Attach an [`Arc<dyn SessionObserver>`] to a
//! [`crate::session::SessionController`] to be told when the phase changes
//! and when a conversion starts or finishes. A terminal spinner, a log sink
//! or a UI binding can all hang off these hooks without the controller
//! knowing anything about them.
//!
//! # Example
//!
//! ```rust
//! use file2json::{Phase, SessionObserver};
//! use std::sync::{Arc, Mutex};
//!
//! struct Recorder(Mutex<Vec<Phase>>);
//!
//! impl SessionObserver for Recorder {
//!     fn on_phase_change(&self, _from: Phase, to: Phase) {
//!         self.0.lock().unwrap().push(to);
//!     }
//! }
//!
//! let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
//! let _observer: Arc<dyn SessionObserver> = recorder;
//! ```

use crate::client::ConversionOutcome;
use crate::selection::SelectedFile;
use crate::session::Phase;
use std::sync::Arc;

/// Called by the session controller as the lifecycle advances.
///
/// All methods have default no-op implementations so implementors only
/// override what they care about.
pub trait SessionObserver: Send + Sync {
    /// Called after every transition that changed the phase.
    fn on_phase_change(&self, from: Phase, to: Phase) {
        let _ = (from, to);
    }

    /// Called just before the upload request is issued.
    fn on_conversion_start(&self, file: &SelectedFile) {
        let _ = file;
    }

    /// Called once the single attempt has produced its outcome.
    fn on_conversion_complete(&self, file: &SelectedFile, outcome: &ConversionOutcome) {
        let _ = (file, outcome);
    }
}

/// A no-op observer, the default when none is attached.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// Convenience alias for the type stored by the controller.
pub type ObserverHandle = Arc<dyn SessionObserver>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        phases: AtomicUsize,
        starts: AtomicUsize,
        completes: AtomicUsize,
    }

    impl SessionObserver for Counting {
        fn on_phase_change(&self, _from: Phase, _to: Phase) {
            self.phases.fetch_add(1, Ordering::SeqCst);
        }

        fn on_conversion_start(&self, _file: &SelectedFile) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_conversion_complete(&self, _file: &SelectedFile, _outcome: &ConversionOutcome) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_observer_does_not_panic() {
        let file = SelectedFile::from_bytes("a.txt", b"x".to_vec());
        let outcome = ConversionOutcome::Failure {
            message: "m".into(),
            error_detail: None,
        };
        let obs: ObserverHandle = Arc::new(NoopObserver);
        obs.on_phase_change(Phase::Empty, Phase::Selected);
        obs.on_conversion_start(&file);
        obs.on_conversion_complete(&file, &outcome);
    }

    #[test]
    fn counting_observer_receives_events() {
        let file = SelectedFile::from_bytes("a.txt", b"x".to_vec());
        let c = Counting {
            phases: AtomicUsize::new(0),
            starts: AtomicUsize::new(0),
            completes: AtomicUsize::new(0),
        };
        c.on_phase_change(Phase::Selected, Phase::Converting);
        c.on_conversion_start(&file);
        c.on_conversion_complete(
            &file,
            &ConversionOutcome::Success {
                message: "ok".into(),
                payload: serde_json::Value::Null,
            },
        );
        assert_eq!(c.phases.load(Ordering::SeqCst), 1);
        assert_eq!(c.starts.load(Ordering::SeqCst), 1);
        assert_eq!(c.completes.load(Ordering::SeqCst), 1);
    }
}
