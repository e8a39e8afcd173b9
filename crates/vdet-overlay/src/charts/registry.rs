//! Chart instance lifecycle.
//!
//! Each [`ChartKind`] moves through `Uninitialized -> Built -> Disposed`.
//! Rebuilding a built chart disposes the old instance before the new one
//! is created, so there is never more than one live instance per kind.
//! After [`ChartRegistry::teardown`] every slot is `Disposed` and further
//! rebuilds are refused.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{ChartKind, ChartSpec};
use crate::scheduler::{CallbackHandle, CallbackRegistry, FrameScheduler};

/// A chart library able to create and destroy chart instances.
pub trait ChartBackend {
    /// Live chart instance.
    type Handle;

    /// Create a chart; `None` if the host could not provide a drawing context.
    fn create(&mut self, spec: &ChartSpec) -> Option<Self::Handle>;

    /// Release an instance and its drawing resources.
    fn dispose(&mut self, handle: Self::Handle);

    /// Repaint an instance.
    fn redraw(&mut self, _handle: &Self::Handle) {}
}

/// Lifecycle state of one chart kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartState {
    Uninitialized,
    Built,
    Disposed,
}

/// Result of [`ChartRegistry::rebuild`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    /// First instance of this kind
    Created,
    /// The previous instance was disposed and a new one created
    Replaced,
    /// The backend could not create the chart; the slot is uninitialized
    Failed,
    /// The registry has been torn down
    Refused,
}

impl RebuildOutcome {
    pub fn is_built(&self) -> bool {
        matches!(self, RebuildOutcome::Created | RebuildOutcome::Replaced)
    }
}

enum Slot<H> {
    Uninitialized,
    Built(H),
    Disposed,
}

impl<H> Slot<H> {
    fn state(&self) -> ChartState {
        match self {
            Slot::Uninitialized => ChartState::Uninitialized,
            Slot::Built(_) => ChartState::Built,
            Slot::Disposed => ChartState::Disposed,
        }
    }
}

/// Owns the live chart instances of one analytics view.
pub struct ChartRegistry<B: ChartBackend> {
    backend: B,
    slots: [Slot<B::Handle>; 3],
    redraws: CallbackRegistry,
    redraw_targets: BTreeMap<CallbackHandle, ChartKind>,
    torn_down: bool,
}

impl<B: ChartBackend> ChartRegistry<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            slots: [Slot::Uninitialized, Slot::Uninitialized, Slot::Uninitialized],
            redraws: CallbackRegistry::new(),
            redraw_targets: BTreeMap::new(),
            torn_down: false,
        }
    }

    pub fn state(&self, kind: ChartKind) -> ChartState {
        self.slots[kind.index()].state()
    }

    /// Number of charts currently built.
    pub fn live_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Built(_)))
            .count()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Replace the chart of `spec.kind`.
    ///
    /// Any existing instance is disposed before the new one is created.
    pub fn rebuild(&mut self, spec: &ChartSpec) -> RebuildOutcome {
        let kind = spec.kind;
        if self.torn_down {
            warn!(kind = %kind, "Chart rebuild refused after teardown");
            return RebuildOutcome::Refused;
        }

        let replaced = self.release(kind);
        let outcome = match self.backend.create(spec) {
            Some(handle) => {
                self.slots[kind.index()] = Slot::Built(handle);
                crate::metrics::record_chart_rebuild(kind);
                if replaced {
                    RebuildOutcome::Replaced
                } else {
                    RebuildOutcome::Created
                }
            }
            None => {
                warn!(kind = %kind, "Chart backend could not create chart");
                RebuildOutcome::Failed
            }
        };

        crate::metrics::set_live_charts(self.live_count());
        debug!(kind = %kind, outcome = ?outcome, labels = spec.labels.len(), "Chart rebuilt");
        outcome
    }

    /// Dispose the chart of `kind`, leaving the slot uninitialized.
    ///
    /// Used when a new dataset has nothing to show for that chart.
    pub fn clear(&mut self, kind: ChartKind) -> bool {
        if self.torn_down {
            return false;
        }
        let released = self.release(kind);
        if released {
            crate::metrics::set_live_charts(self.live_count());
        }
        released
    }

    /// Schedule a repaint of `kind`. Returns `None` if the chart is not built.
    pub fn request_redraw(
        &mut self,
        kind: ChartKind,
        scheduler: &mut dyn FrameScheduler,
    ) -> Option<CallbackHandle> {
        if self.torn_down || self.state(kind) != ChartState::Built {
            return None;
        }
        let handle = self.redraws.request(scheduler);
        self.redraw_targets.insert(handle, kind);
        Some(handle)
    }

    /// Run a scheduled repaint. Returns false for unknown or cancelled handles.
    pub fn run_redraw(&mut self, handle: CallbackHandle) -> bool {
        let Some(kind) = self.redraw_targets.remove(&handle) else {
            return false;
        };
        if !self.redraws.complete(handle) {
            return false;
        }
        match &self.slots[kind.index()] {
            Slot::Built(chart) => {
                self.backend.redraw(chart);
                true
            }
            _ => false,
        }
    }

    /// Scheduled repaints that have not run yet.
    pub fn pending_redraws(&self) -> usize {
        self.redraws.pending_count()
    }

    /// Dispose every instance and cancel every pending repaint.
    ///
    /// Returns the number of instances disposed. Calling it again is a no-op.
    pub fn teardown(&mut self, scheduler: &mut dyn FrameScheduler) -> usize {
        if self.torn_down {
            return 0;
        }

        let cancelled = self.redraws.cancel_all(scheduler);
        self.redraw_targets.clear();
        crate::metrics::record_redraws_cancelled(cancelled);

        let mut disposed = 0;
        for slot in self.slots.iter_mut() {
            if let Slot::Built(handle) = std::mem::replace(slot, Slot::Disposed) {
                self.backend.dispose(handle);
                disposed += 1;
            }
        }
        self.torn_down = true;
        crate::metrics::set_live_charts(0);

        info!(disposed, cancelled, "Chart registry torn down");
        disposed
    }

    fn release(&mut self, kind: ChartKind) -> bool {
        let slot = &mut self.slots[kind.index()];
        match std::mem::replace(slot, Slot::Uninitialized) {
            Slot::Built(handle) => {
                self.backend.dispose(handle);
                true
            }
            _ => false,
        }
    }
}

impl<B: ChartBackend> fmt::Debug for ChartRegistry<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartRegistry")
            .field("bar", &self.state(ChartKind::Bar))
            .field("pie", &self.state(ChartKind::Pie))
            .field("timeline", &self.state(ChartKind::Timeline))
            .field("pending_redraws", &self.redraws.pending_count())
            .field("torn_down", &self.torn_down)
            .finish()
    }
}

/// Handle issued by [`RecordingChartBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordedChartId(pub u64);

/// In-memory chart backend that keeps the specs of live charts.
#[derive(Debug, Default)]
pub struct RecordingChartBackend {
    next_id: u64,
    live: BTreeMap<RecordedChartId, ChartSpec>,
    unavailable: BTreeSet<ChartKind>,
    created: u64,
    disposed: u64,
    redraws: u64,
}

impl RecordingChartBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `create` fail for `kind`, as when its canvas is not mounted.
    pub fn set_unavailable(&mut self, kind: ChartKind, unavailable: bool) {
        if unavailable {
            self.unavailable.insert(kind);
        } else {
            self.unavailable.remove(&kind);
        }
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Live instances of `kind`.
    pub fn live_of_kind(&self, kind: ChartKind) -> usize {
        self.live.values().filter(|spec| spec.kind == kind).count()
    }

    /// Spec of the live chart of `kind`, if any.
    pub fn live_spec(&self, kind: ChartKind) -> Option<&ChartSpec> {
        self.live.values().find(|spec| spec.kind == kind)
    }

    pub fn created_count(&self) -> u64 {
        self.created
    }

    pub fn disposed_count(&self) -> u64 {
        self.disposed
    }

    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }
}

impl ChartBackend for RecordingChartBackend {
    type Handle = RecordedChartId;

    fn create(&mut self, spec: &ChartSpec) -> Option<RecordedChartId> {
        if self.unavailable.contains(&spec.kind) {
            return None;
        }
        self.next_id += 1;
        let id = RecordedChartId(self.next_id);
        self.live.insert(id, spec.clone());
        self.created += 1;
        Some(id)
    }

    fn dispose(&mut self, handle: RecordedChartId) {
        if self.live.remove(&handle).is_some() {
            self.disposed += 1;
        }
    }

    fn redraw(&mut self, _handle: &RecordedChartId) {
        self.redraws += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::time_histogram;
    use crate::charts::{bar_chart_spec, pie_chart_spec, timeline_chart_spec, ClassSeries};
    use crate::scheduler::ManualScheduler;
    use vdet_models::DetectionSummary;

    fn summary(class_name: &str, count: u64) -> DetectionSummary {
        let mut summary = DetectionSummary::default();
        summary.by_class.insert(class_name.to_string(), count);
        summary.total = count;
        summary.unique_classes = 1;
        summary
    }

    fn bar_spec(count: u64) -> ChartSpec {
        bar_chart_spec(&ClassSeries::from_summary(&summary("car", count)))
    }

    #[test]
    fn test_rebuild_twice_leaves_one_live_instance() {
        let mut registry = ChartRegistry::new(RecordingChartBackend::new());
        assert_eq!(registry.state(ChartKind::Bar), ChartState::Uninitialized);

        assert_eq!(registry.rebuild(&bar_spec(1)), RebuildOutcome::Created);
        assert_eq!(registry.rebuild(&bar_spec(2)), RebuildOutcome::Replaced);

        assert_eq!(registry.state(ChartKind::Bar), ChartState::Built);
        assert_eq!(registry.live_count(), 1);
        let backend = registry.backend();
        assert_eq!(backend.live_of_kind(ChartKind::Bar), 1);
        assert_eq!(backend.created_count(), 2);
        assert_eq!(backend.disposed_count(), 1);
        assert_eq!(backend.live_spec(ChartKind::Bar).unwrap().values(), &[2]);
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut registry = ChartRegistry::new(RecordingChartBackend::new());
        let series = ClassSeries::from_summary(&summary("dog", 2));
        registry.rebuild(&bar_chart_spec(&series));
        registry.rebuild(&pie_chart_spec(&series));
        registry.rebuild(&timeline_chart_spec(&time_histogram(&[], 10.0, 5.0)));
        assert_eq!(registry.live_count(), 3);

        assert!(registry.clear(ChartKind::Pie));
        assert_eq!(registry.state(ChartKind::Pie), ChartState::Uninitialized);
        assert!(!registry.clear(ChartKind::Pie));
        assert_eq!(registry.backend().live_count(), 2);
    }

    #[test]
    fn test_failed_create_leaves_slot_uninitialized() {
        let mut backend = RecordingChartBackend::new();
        backend.set_unavailable(ChartKind::Bar, true);
        let mut registry = ChartRegistry::new(backend);

        assert_eq!(registry.rebuild(&bar_spec(1)), RebuildOutcome::Failed);
        assert_eq!(registry.state(ChartKind::Bar), ChartState::Uninitialized);

        registry.backend_mut().set_unavailable(ChartKind::Bar, false);
        assert_eq!(registry.rebuild(&bar_spec(1)), RebuildOutcome::Created);
    }

    #[test]
    fn test_teardown_disposes_and_cancels() {
        let mut scheduler = ManualScheduler::new();
        let mut registry = ChartRegistry::new(RecordingChartBackend::new());
        registry.rebuild(&bar_spec(1));
        let handle = registry
            .request_redraw(ChartKind::Bar, &mut scheduler)
            .unwrap();
        assert!(registry.request_redraw(ChartKind::Pie, &mut scheduler).is_none());
        assert_eq!(registry.pending_redraws(), 1);

        assert_eq!(registry.teardown(&mut scheduler), 1);
        assert_eq!(scheduler.cancelled(), &[handle]);
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.backend().live_count(), 0);
        for kind in ChartKind::ALL {
            assert_eq!(registry.state(kind), ChartState::Disposed);
        }

        assert!(!registry.run_redraw(handle));
        assert_eq!(registry.rebuild(&bar_spec(3)), RebuildOutcome::Refused);
        assert_eq!(registry.teardown(&mut scheduler), 0);
    }

    #[test]
    fn test_redraw_runs_once() {
        let mut scheduler = ManualScheduler::new();
        let mut registry = ChartRegistry::new(RecordingChartBackend::new());
        registry.rebuild(&bar_spec(1));
        registry.request_redraw(ChartKind::Bar, &mut scheduler);

        for handle in scheduler.drain() {
            assert!(registry.run_redraw(handle));
            assert!(!registry.run_redraw(handle));
        }
        assert_eq!(registry.backend().redraw_count(), 1);
        assert_eq!(registry.pending_redraws(), 0);
    }
}
