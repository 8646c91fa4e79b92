use std::sync::Arc;

use tracing::trace;

/// Callback invoked with an integer upload percentage (0–100).
pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;

/// Forwards progress to a callback while keeping it monotonic.
///
/// Values above 100 are clamped. A value equal to or below the last
/// reported one is dropped, so after the initial report the callback
/// only ever sees strictly increasing percentages.
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    last: Option<u8>,
}

impl ProgressReporter {
    /// Creates a reporter; `None` makes every report a no-op.
    pub fn new(callback: Option<ProgressCallback>) -> Self {
        Self {
            callback,
            last: None,
        }
    }

    /// Reports `percent`, unless it would move progress backwards.
    pub fn report(&mut self, percent: u8) {
        let percent = percent.min(100);
        if let Some(last) = self.last
            && percent <= last
        {
            return;
        }
        self.last = Some(percent);
        trace!(percent, "progress");
        if let Some(cb) = &self.callback {
            cb(percent);
        }
    }

    /// Last percentage passed to the callback.
    pub fn last(&self) -> Option<u8> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording() -> (ProgressCallback, Arc<Mutex<Vec<u8>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let cb: ProgressCallback = Arc::new(move |p| s.lock().unwrap().push(p));
        (cb, seen)
    }

    #[test]
    fn forwards_increasing_values() {
        let (cb, seen) = recording();
        let mut reporter = ProgressReporter::new(Some(cb));
        reporter.report(0);
        reporter.report(33);
        reporter.report(67);
        reporter.report(100);
        assert_eq!(*seen.lock().unwrap(), vec![0, 33, 67, 100]);
        assert_eq!(reporter.last(), Some(100));
    }

    #[test]
    fn drops_repeats_and_regressions() {
        let (cb, seen) = recording();
        let mut reporter = ProgressReporter::new(Some(cb));
        reporter.report(0);
        reporter.report(0);
        reporter.report(50);
        reporter.report(40);
        reporter.report(100);
        reporter.report(100);
        assert_eq!(*seen.lock().unwrap(), vec![0, 50, 100]);
    }

    #[test]
    fn clamps_above_hundred() {
        let (cb, seen) = recording();
        let mut reporter = ProgressReporter::new(Some(cb));
        reporter.report(250);
        assert_eq!(*seen.lock().unwrap(), vec![100]);
    }

    #[test]
    fn no_callback_still_tracks_last() {
        let mut reporter = ProgressReporter::new(None);
        assert_eq!(reporter.last(), None);
        reporter.report(10);
        assert_eq!(reporter.last(), Some(10));
    }
}
