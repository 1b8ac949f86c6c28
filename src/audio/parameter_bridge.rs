use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::audio::chain_settings::ChainSettings;

/// Anything the processor and the analyzer can take a parameter snapshot from.
///
/// Implementations must not allocate or lock, `chain_settings` is called once per audio block.
pub trait ParameterSource {
    /// Current filter parameters, clamped to their declared ranges
    fn chain_settings(&self) -> ChainSettings;

    /// Whether the spectrum traces should be drawn
    fn analyzer_enabled(&self) -> bool;
}

/// Plain settings can act as a source directly, the analyzer is always on for them
impl ParameterSource for ChainSettings {
    fn chain_settings(&self) -> ChainSettings {
        self.clamped()
    }

    fn analyzer_enabled(&self) -> bool {
        true
    }
}

/// Audio thread side of the parameter handoff.
///
/// Changes are detected by comparing snapshots by value. Automation can move a parameter every
/// block, so the GUI's [`ChangeFlag`] is never consulted here.
#[derive(Debug, Default)]
pub struct ParameterBridge {
    last_seen: Option<ChainSettings>,
}

impl ParameterBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next [`poll`](Self::poll) report the snapshot even if nothing changed
    pub fn force_rebuild(&mut self) {
        self.last_seen = None;
    }

    /// Take a snapshot and return it when coefficients need to be redesigned
    pub fn poll<S: ParameterSource + ?Sized>(&mut self, source: &S) -> Option<ChainSettings> {
        let settings = source.chain_settings();
        if self.last_seen == Some(settings) {
            return None;
        }

        self.last_seen = Some(settings);
        Some(settings)
    }

    pub fn last_seen(&self) -> Option<&ChainSettings> {
        self.last_seen.as_ref()
    }
}

/// The `parametersChanged` signal from the parameter callbacks to the editor.
///
/// Cloning gives another handle to the same flag.
#[derive(Debug, Clone)]
pub struct ChangeFlag(Arc<AtomicBool>);

impl Default for ChangeFlag {
    /// Starts raised so the first GUI tick syncs its chain
    fn default() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }
}

impl ChangeFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns `true` once per raise. Clears the flag with a compare-and-swap so a raise that lands
    /// between two ticks is never lost.
    pub fn take(&self) -> bool {
        self.0
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingSource {
        settings: Cell<ChainSettings>,
        reads: Cell<usize>,
    }

    impl ParameterSource for CountingSource {
        fn chain_settings(&self) -> ChainSettings {
            self.reads.set(self.reads.get() + 1);
            self.settings.get()
        }

        fn analyzer_enabled(&self) -> bool {
            false
        }
    }

    #[test]
    fn poll_reports_only_changes() {
        let source = CountingSource {
            settings: Cell::new(ChainSettings::default()),
            reads: Cell::new(0),
        };
        let mut bridge = ParameterBridge::new();

        assert_eq!(bridge.poll(&source), Some(ChainSettings::default()));
        assert_eq!(bridge.poll(&source), None);

        let moved = ChainSettings {
            peak_freq: 1200.0,
            ..ChainSettings::default()
        };
        source.settings.set(moved);
        assert_eq!(bridge.poll(&source), Some(moved));
        assert_eq!(bridge.poll(&source), None);
        assert_eq!(source.reads.get(), 4);
    }

    #[test]
    fn forced_rebuild_repeats_the_snapshot() {
        let settings = ChainSettings::default();
        let mut bridge = ParameterBridge::new();
        bridge.poll(&settings);
        assert_eq!(bridge.poll(&settings), None);

        bridge.force_rebuild();
        assert_eq!(bridge.poll(&settings), Some(settings));
        assert_eq!(bridge.last_seen(), Some(&settings));
    }

    #[test]
    fn change_flag_is_taken_once() {
        let flag = ChangeFlag::new();
        let callback_handle = flag.clone();

        // Raised from construction
        assert!(flag.take());
        assert!(!flag.take());

        callback_handle.raise();
        callback_handle.raise();
        assert!(flag.is_raised());
        assert!(flag.take());
        assert!(!flag.take());
    }
}
