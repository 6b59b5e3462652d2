//! Charge tracker - the engine facade.
//!
//! Owns the catalog, the session context, the reconciler and the optional
//! persistence adapter, and runs each tick through the [`TickSchedule`].
//! Ingestion never fails: anomalies are recorded as diagnostics and leave
//! states untouched.

mod phases;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{info, warn};

use item_rules::{
    Catalog, ChargeState, ItemId, ItemLookup, KindId, KindShape, Tick, TimedSignal,
    TrackedItemKind,
};

use crate::config::TrackerConfig;
use crate::context::{DiagnosticKind, Diagnostics, SessionContext};
use crate::dialog::DialogTracker;
use crate::error::TrackerError;
use crate::persistence::{KeyValueStore, PersistenceAdapter, StoreError};
use crate::reconciler::{Reconciler, Residuals};
use crate::scheduler::{DeferralQueue, TickBuffer, TickSchedule};

/// Builder for [`ChargeTracker`].
pub struct ChargeTrackerBuilder {
    catalog: Catalog,
    items: Arc<dyn ItemLookup>,
    config: TrackerConfig,
    schedule: TickSchedule,
    store: Option<Arc<dyn KeyValueStore>>,
}

impl ChargeTrackerBuilder {
    pub fn with_config(mut self, config: TrackerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_schedule(mut self, schedule: TickSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Persist states to `store`. Building then needs a tokio runtime.
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the tracker, loading persisted states when a store is set.
    pub fn build(self) -> Result<ChargeTracker, TrackerError> {
        let catalog = self.catalog.without(&self.config.disabled_kinds);
        let persistence = match self.store {
            Some(store) => Some(PersistenceAdapter::new(
                store,
                self.config.storage_group.clone(),
            )?),
            None => None,
        };

        let mut tracker = ChargeTracker {
            context: SessionContext::new(self.config.lookback_ticks, self.config.max_diagnostics),
            catalog,
            items: self.items,
            config: self.config,
            schedule: self.schedule,
            reconciler: Reconciler::new(),
            dialog: DialogTracker::new(),
            deferred: DeferralQueue::new(),
            buffer: TickBuffer::new(),
            persistence,
        };
        tracker.load_states();
        Ok(tracker)
    }
}

/// Infers hidden charges and container contents from observed signals.
pub struct ChargeTracker {
    catalog: Catalog,
    items: Arc<dyn ItemLookup>,
    config: TrackerConfig,
    schedule: TickSchedule,
    context: SessionContext,
    reconciler: Reconciler,
    dialog: DialogTracker,
    deferred: DeferralQueue,
    buffer: TickBuffer,
    persistence: Option<PersistenceAdapter>,
}

impl ChargeTracker {
    /// Start building a tracker over a catalog and an item lookup.
    pub fn builder(catalog: Catalog, items: impl ItemLookup + 'static) -> ChargeTrackerBuilder {
        ChargeTrackerBuilder {
            catalog,
            items: Arc::new(items),
            config: TrackerConfig::default(),
            schedule: TickSchedule::default(),
            store: None,
        }
    }

    /// A tracker over the built-in families, without persistence.
    pub fn with_builtin_catalog() -> Result<Self, TrackerError> {
        Self::builder(Catalog::builtin()?, Catalog::builtin_items()).build()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// The last tick processed.
    pub fn tick(&self) -> Tick {
        self.context.tick()
    }

    // ------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------

    /// Buffer a signal. A signal from a later tick completes the buffered
    /// tick, which is processed first.
    pub fn ingest(&mut self, signal: TimedSignal) {
        if let Some((tick, signals)) = self.buffer.push(signal) {
            self.process_tick(tick, signals);
        }
    }

    /// Process whatever tick is buffered.
    pub fn end_tick(&mut self) {
        if let Some((tick, signals)) = self.buffer.take() {
            self.process_tick(tick, signals);
        }
    }

    /// Process one complete tick. Ticks with no signals still need
    /// processing for lookback pruning and animation cadence.
    pub fn process_tick(&mut self, tick: Tick, mut signals: Vec<TimedSignal>) {
        signals.sort_by_key(|signal| signal.seq);
        self.context.begin_tick(tick);

        for phase in self.schedule.phases().to_vec() {
            self.run_phase(phase, tick, &signals);
        }
    }

    // ------------------------------------------------------------------
    // Profiles and persistence
    // ------------------------------------------------------------------

    /// Switch to another profile's store.
    ///
    /// Session bookkeeping is dropped and every family is reloaded; families
    /// with nothing stored start UNKNOWN.
    pub fn load_profile(&mut self, store: Arc<dyn KeyValueStore>) -> Result<(), TrackerError> {
        self.persistence = Some(PersistenceAdapter::new(
            store,
            self.config.storage_group.clone(),
        )?);
        self.context.reset();
        self.dialog.reset();
        self.deferred.drain();
        self.buffer = TickBuffer::new();
        self.reconciler.clear();
        self.load_states();
        Ok(())
    }

    /// Wait for queued state writes to reach the store.
    pub async fn flush(&self) -> Result<(), TrackerError> {
        if let Some(persistence) = &self.persistence {
            persistence.flush().await?;
        }
        Ok(())
    }

    fn load_states(&mut self) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        let tick = self.context.tick();
        let mut loaded = 0;

        for kind in self.catalog.kinds() {
            let key = kind.state_key();
            let state = match persistence.load::<ChargeState>(&key) {
                Ok(Some(state)) if shape_fits(kind, &state) => {
                    let (state, repaired) = within_bounds(kind, state);
                    if repaired {
                        self.context.diagnostics.record(
                            tick,
                            DiagnosticKind::MalformedState,
                            format!("stored state for {key} was out of bounds, loaded as {state:?}"),
                            vec![kind.id.clone()],
                        );
                    }
                    loaded += 1;
                    state
                }
                Ok(Some(state)) => {
                    self.context.diagnostics.record(
                        tick,
                        DiagnosticKind::MalformedState,
                        format!("stored state for {key} has the wrong shape: {state:?}"),
                        vec![kind.id.clone()],
                    );
                    ChargeState::Unknown
                }
                Ok(None) => ChargeState::Unknown,
                Err(e) => {
                    record_load_failure(&mut self.context.diagnostics, tick, kind, &key, e);
                    ChargeState::Unknown
                }
            };

            let residuals = match kind.residual_key() {
                Some(key) => match persistence.load::<Residuals>(&key) {
                    Ok(residuals) => residuals.unwrap_or_default(),
                    Err(e) => {
                        record_load_failure(&mut self.context.diagnostics, tick, kind, &key, e);
                        Residuals::default()
                    }
                },
                None => Residuals::default(),
            };

            self.reconciler.restore(&kind.id, state, residuals);
        }

        info!(
            group = persistence.group(),
            kinds = self.catalog.len(),
            loaded,
            "profile loaded"
        );
    }

    fn save_dirty(&mut self) {
        let dirty = self.reconciler.take_dirty();
        let Some(persistence) = &self.persistence else {
            return;
        };
        for id in dirty {
            let Some(kind) = self.catalog.kind(&id) else {
                continue;
            };
            if let Err(e) = persistence.save(&kind.state_key(), self.reconciler.state(&id)) {
                warn!(kind = %id, error = %e, "failed to queue state write");
            }
            if let Some(key) = kind.residual_key() {
                if let Err(e) = persistence.save(&key, &self.reconciler.residuals(&id)) {
                    warn!(kind = %id, error = %e, "failed to queue residual write");
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Whether any family tracks this item id.
    pub fn is_tracked(&self, item: ItemId) -> bool {
        self.catalog.kind_for_item(item).is_some()
    }

    /// Whether the item's family has a known state. `false` means the user
    /// should check the item.
    pub fn has_known_state(&self, item: ItemId) -> bool {
        self.catalog
            .kind_for_item(item)
            .is_some_and(|kind| self.reconciler.state(&kind.id).is_known())
    }

    /// Quantities held by the item's family.
    ///
    /// Containers return their contents. Counters return one entry per
    /// rechargeable component (`charges * per_charge`), or one entry per
    /// charged variant when they have no components. Unknown states and
    /// untracked items return an empty mapping.
    pub fn get_quantities(&self, item: ItemId) -> BTreeMap<ItemId, i64> {
        let Some(kind) = self.catalog.kind_for_item(item) else {
            return BTreeMap::new();
        };
        match self.reconciler.state(&kind.id) {
            ChargeState::Unknown => BTreeMap::new(),
            ChargeState::Contents(contents) => contents.clone(),
            ChargeState::Charges(charges) if kind.components.is_empty() => kind
                .charged
                .iter()
                .map(|variant| (*variant, *charges))
                .collect(),
            ChargeState::Charges(charges) => kind
                .components
                .iter()
                .map(|component| (component.item, charges.saturating_mul(component.per_charge)))
                .collect(),
        }
    }

    /// Display names of worn or carried families whose state is unknown.
    pub fn items_needing_calibration(&self) -> BTreeSet<String> {
        self.catalog
            .kinds()
            .iter()
            .filter(|kind| self.context.presence.kind_present(kind))
            .filter(|kind| !self.reconciler.state(&kind.id).is_known())
            .map(|kind| kind.display_name.clone())
            .collect()
    }

    /// State of a family by id.
    pub fn charge_state(&self, kind: &str) -> Result<&ChargeState, TrackerError> {
        let id = KindId::new(kind);
        if self.catalog.kind(&id).is_none() {
            return Err(TrackerError::UnknownKind(kind.to_string()));
        }
        Ok(self.reconciler.state(&id))
    }

    /// Families at or below their depletion threshold.
    ///
    /// Dual-resource families compare their primary resource.
    pub fn low_charge_kinds(&self) -> Vec<KindId> {
        self.catalog
            .kinds()
            .iter()
            .filter(|kind| {
                let threshold = self.config.low_threshold(kind.id.as_str(), kind.low_threshold);
                let state = self.reconciler.state(&kind.id);
                let remaining = match (&kind.shape, state) {
                    (KindShape::Counter, ChargeState::Charges(charges)) => *charges,
                    (KindShape::DualResource(resource), ChargeState::Contents(_)) => {
                        state.quantity_of(resource.primary)
                    }
                    _ => return false,
                };
                remaining <= threshold
            })
            .map(|kind| kind.id.clone())
            .collect()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.context.diagnostics
    }
}

fn shape_fits(kind: &TrackedItemKind, state: &ChargeState) -> bool {
    match state {
        ChargeState::Unknown => true,
        ChargeState::Charges(_) => !kind.holds_contents(),
        ChargeState::Contents(_) => kind.holds_contents(),
    }
}

/// Bring a loaded state back inside its family's bounds.
///
/// Counters are clamped into `[0, capacity]`; container entries are capped
/// per sub-item and dropped when not positive. The flag reports whether
/// anything changed.
fn within_bounds(kind: &TrackedItemKind, state: ChargeState) -> (ChargeState, bool) {
    match state {
        ChargeState::Charges(value) => {
            let clamped = kind.bounds().clamp(value);
            (ChargeState::Charges(clamped), clamped != value)
        }
        ChargeState::Contents(contents) => {
            let mut repaired = false;
            let kept: BTreeMap<ItemId, i64> = contents
                .into_iter()
                .filter_map(|(item, quantity)| {
                    let capped = kind
                        .capacity_for(item)
                        .map_or(quantity, |capacity| quantity.min(capacity));
                    if capped != quantity || capped <= 0 {
                        repaired = true;
                    }
                    (capped > 0).then_some((item, capped))
                })
                .collect();
            (ChargeState::Contents(kept), repaired)
        }
        ChargeState::Unknown => (ChargeState::Unknown, false),
    }
}

fn record_load_failure(
    diagnostics: &mut Diagnostics,
    tick: Tick,
    kind: &TrackedItemKind,
    key: &str,
    error: StoreError,
) {
    match error {
        StoreError::Serialization(reason) => diagnostics.record(
            tick,
            DiagnosticKind::MalformedState,
            format!("stored value for {key} is unreadable: {reason}"),
            vec![kind.id.clone()],
        ),
        other => warn!(kind = %kind.id, %key, error = %other, "failed to load state"),
    }
}
