//! Per-phase signal processing.
//!
//! Message and dialog effects go through target resolution; animation,
//! hitsplat and container-diff rules apply to every family whose presence
//! requirement holds.

use std::collections::BTreeSet;

use tracing::debug;

use item_rules::{
    ApplyOutcome, ChatMessage, ContainerId, ContainerSnapshot, Effect, Hitsplat, KindId,
    MenuAction, Phase, Signal, SkipReason, Tick, TimedSignal, TrackedItemKind,
};

use super::ChargeTracker;
use crate::context::{DiagnosticKind, InteractionKind};
use crate::dialog::{DialogEvent, Selection};
use crate::matcher::{AnimationHit, Candidate, Matches, RuleMatcher};
use crate::reconciler::{ApplyEnv, Resolution, Resolver};
use crate::scheduler::PendingEffect;

/// Usage effect for animation and hitsplat rules.
fn usage(kind: &TrackedItemKind, amount: i64) -> Effect {
    if kind.dual().is_some() {
        Effect::Consume { uses: amount }
    } else {
        Effect::Decrease(amount)
    }
}

fn is_presence_container(container: ContainerId) -> bool {
    matches!(container, ContainerId::Equipment | ContainerId::Inventory)
}

impl ChargeTracker {
    pub(super) fn run_phase(&mut self, phase: Phase, tick: Tick, signals: &[TimedSignal]) {
        let in_phase = move || signals.iter().filter(move |s| s.signal.phase() == phase);

        match phase {
            Phase::Input => {
                for signal in in_phase() {
                    if let Signal::Menu(action) = &signal.signal {
                        self.on_menu(action, tick);
                    }
                }
            }
            Phase::Chat => {
                for signal in in_phase() {
                    if let Signal::Chat(message) = &signal.signal {
                        self.on_chat(message, tick);
                    }
                }
            }
            Phase::Dialog => {
                // Selections apply to the dialog that was on screen
                for signal in in_phase() {
                    if let Signal::DialogScript { script } = &signal.signal {
                        let selection = Selection::Script(script.clone());
                        if let Some(event) = self.dialog.select(selection, tick) {
                            self.on_dialog_event(event, tick);
                        }
                    }
                }
                for signal in in_phase() {
                    if let Signal::Dialog(widgets) = &signal.signal {
                        if let Some(event) = self.dialog.observe(widgets) {
                            self.on_dialog_event(event, tick);
                        }
                    }
                }
            }
            Phase::Animation => {
                let mut changed = false;
                for signal in in_phase() {
                    if let Signal::Animation { animation } = signal.signal {
                        if self.context.set_animation(animation, tick) {
                            changed = true;
                            self.on_animation_start(animation, tick);
                        }
                    }
                }
                if !changed {
                    self.on_animation_cadence(tick);
                }
            }
            Phase::DeferredFlush => {
                for signal in signals {
                    if let Signal::Container(snapshot) = &signal.signal {
                        self.context.presence.update(snapshot);
                    }
                }
                self.flush_deferred(tick);
            }
            Phase::Container => {
                for signal in in_phase() {
                    if let Signal::Container(snapshot) = &signal.signal {
                        self.on_container(snapshot.clone(), tick);
                    }
                }
            }
            Phase::Combat => {
                for signal in in_phase() {
                    if let Signal::Hitsplat(hitsplat) = &signal.signal {
                        self.on_hitsplat(hitsplat, tick);
                    }
                }
            }
            Phase::TickEnd => self.save_dirty(),
        }
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    fn on_menu(&mut self, action: &MenuAction, tick: Tick) {
        if let Some(widget) = action.widget {
            if let Some(event) = self.dialog.select(Selection::Widget(widget), tick) {
                self.on_dialog_event(event, tick);
            }
            return;
        }

        for item in [action.item, action.target_item].into_iter().flatten() {
            let Some(kind) = self.catalog.kind_for_item(item) else {
                continue;
            };
            let interaction = if action.option_is("Check") {
                InteractionKind::Check
            } else if action.target_item.is_some() && action.option_is("Use") {
                InteractionKind::UseOn
            } else if let Some(rule) = kind
                .rules
                .container
                .iter()
                .find(|rule| action.option_is(&rule.menu_option))
            {
                InteractionKind::Option(rule.menu_option.clone())
            } else {
                continue;
            };
            debug!(kind = %kind.id, ?interaction, tick, "interaction recorded");
            self.context
                .interactions
                .record(kind.id.clone(), interaction, tick);
        }
    }

    // ------------------------------------------------------------------
    // Chat and dialog
    // ------------------------------------------------------------------

    fn on_chat(&mut self, message: &ChatMessage, tick: Tick) {
        let matches = RuleMatcher::new(&self.catalog, &*self.items).chat(message);
        self.record_failures(&matches, &message.text, tick);
        if matches.candidates.is_empty() {
            return;
        }

        if matches.is_deferred() {
            debug!(tick, kinds = ?matches.kinds(), text = %message.text, "effect deferred");
            self.deferred.push(PendingEffect {
                tick,
                candidates: matches.candidates,
                origin: message.text.clone(),
            });
        } else {
            self.resolve_and_apply(&matches.candidates, &message.text, tick);
        }
    }

    fn on_dialog_event(&mut self, event: DialogEvent, tick: Tick) {
        let origin = match &event {
            DialogEvent::StateChanged(state) => state.text().to_string(),
            DialogEvent::OptionSelected { state, choice } => match choice {
                Some(choice) => format!("{} -> {choice}", state.text()),
                None => state.text().to_string(),
            },
        };
        let matches = RuleMatcher::new(&self.catalog, &*self.items).dialog(&event);
        self.record_failures(&matches, &origin, tick);
        self.resolve_and_apply(&matches.candidates, &origin, tick);
    }

    fn record_failures(&mut self, matches: &Matches, origin: &str, tick: Tick) {
        for (kind, error) in &matches.failures {
            self.context.diagnostics.record(
                tick,
                DiagnosticKind::InstantiateFailed,
                format!("`{origin}`: {error}"),
                vec![kind.clone()],
            );
        }
    }

    fn flush_deferred(&mut self, tick: Tick) {
        for pending in self.deferred.drain() {
            self.resolve_and_apply(&pending.candidates, &pending.origin, tick);
        }
    }

    /// Resolve the target among `candidates` and apply its effect.
    fn resolve_and_apply(&mut self, candidates: &[Candidate], origin: &str, tick: Tick) {
        if candidates.is_empty() {
            return;
        }
        let resolution = Resolver {
            catalog: &self.catalog,
            items: &*self.items,
            interactions: &self.context.interactions,
            presence: &self.context.presence,
        }
        .resolve(candidates, tick);

        match resolution {
            Resolution::Target(index) => {
                let candidate = &candidates[index];
                self.apply(&candidate.kind, candidate.effect.clone(), tick);
                self.context.interactions.consume(&candidate.kind);
            }
            Resolution::Ambiguous(kinds) => self.context.diagnostics.record(
                tick,
                DiagnosticKind::Ambiguous,
                format!("dropped `{origin}`: more than one eligible item"),
                kinds,
            ),
            Resolution::Unresolvable(kinds) => self.context.diagnostics.record(
                tick,
                DiagnosticKind::Unresolvable,
                format!("dropped `{origin}`: no eligible item"),
                kinds,
            ),
        }
    }

    // ------------------------------------------------------------------
    // Animation
    // ------------------------------------------------------------------

    fn on_animation_start(&mut self, animation: i32, tick: Tick) {
        let hits = RuleMatcher::new(&self.catalog, &*self.items).animation(animation);
        for hit in hits {
            self.fire_animation(hit, tick);
        }
    }

    fn on_animation_cadence(&mut self, tick: Tick) {
        let Some(active) = self.context.animation() else {
            return;
        };
        let hits = RuleMatcher::new(&self.catalog, &*self.items).animation(active.id);
        for hit in hits {
            let Some(cadence) = hit.rule.cadence else {
                continue;
            };
            if self.reconciler.cadence_due(&hit.kind, cadence, tick) {
                self.fire_animation(hit, tick);
            }
        }
    }

    fn fire_animation(&mut self, hit: AnimationHit, tick: Tick) {
        let Some(kind) = self.catalog.kind(&hit.kind) else {
            return;
        };
        if !self.context.presence.satisfies(kind, hit.rule.requires) {
            return;
        }
        let effect = usage(kind, hit.rule.delta);
        self.apply(&hit.kind, effect, tick);
        self.reconciler.mark_fired(&hit.kind, tick);
    }

    // ------------------------------------------------------------------
    // Containers
    // ------------------------------------------------------------------

    fn on_container(&mut self, snapshot: ContainerSnapshot, tick: Tick) {
        let container = snapshot.container;
        let after = snapshot.totals();
        self.context.presence.update(&snapshot);
        let before = self.context.replace_snapshot(snapshot).map(|s| s.totals());

        if let Some(before) = before {
            let rules = RuleMatcher::new(&self.catalog, &*self.items).container_rules(container);
            let mut handled: BTreeSet<KindId> = BTreeSet::new();
            for (kind, rule) in rules {
                if handled.contains(&kind) {
                    continue;
                }
                if !self
                    .context
                    .interactions
                    .take_option(&kind, &rule.menu_option, tick)
                {
                    continue;
                }
                let effect = Effect::Transfer {
                    direction: rule.direction,
                    before: before.clone(),
                    after: after.clone(),
                };
                self.apply(&kind, effect, tick);
                handled.insert(kind);
            }
        }

        if is_presence_container(container) {
            self.infer_uncharged(tick);
        }
    }

    /// A family seen only as an uncharged variant holds nothing.
    fn infer_uncharged(&mut self, tick: Tick) {
        let presence = &self.context.presence;
        let empty: Vec<(KindId, Effect)> = self
            .catalog
            .kinds()
            .iter()
            .filter(|kind| {
                let seen = |items: &[item_rules::ItemId]| {
                    items
                        .iter()
                        .any(|item| presence.is_worn(*item) || presence.is_carried(*item))
                };
                seen(&kind.uncharged) && !seen(&kind.charged)
            })
            .filter_map(|kind| {
                let effect = if kind.holds_contents() {
                    Effect::Clear
                } else if kind.zero_is_known {
                    Effect::Set(0)
                } else {
                    return None;
                };
                Some((kind.id.clone(), effect))
            })
            .collect();

        for (kind, effect) in empty {
            self.apply(&kind, effect, tick);
        }
    }

    // ------------------------------------------------------------------
    // Combat
    // ------------------------------------------------------------------

    fn on_hitsplat(&mut self, hitsplat: &Hitsplat, tick: Tick) {
        let hits = RuleMatcher::new(&self.catalog, &*self.items).hitsplat(hitsplat);
        for hit in hits {
            let Some(kind) = self.catalog.kind(&hit.kind) else {
                continue;
            };
            if !self.context.presence.satisfies(kind, hit.rule.requires) {
                continue;
            }
            if !self
                .reconciler
                .cooldown_elapsed(&hit.kind, hit.rule.cooldown_ticks, tick)
            {
                continue;
            }
            let effect = usage(kind, hit.rule.decrement);
            self.apply(&hit.kind, effect, tick);
            self.reconciler.mark_loss(&hit.kind, tick);
        }
    }

    // ------------------------------------------------------------------
    // Application
    // ------------------------------------------------------------------

    fn apply(&mut self, id: &KindId, effect: Effect, tick: Tick) -> Option<ApplyOutcome> {
        let kind = self.catalog.kind(id)?;
        let env = ApplyEnv {
            items: &*self.items,
            tick,
            lookback: self.config.lookback_ticks,
            dart_consumption: self.config.dart_retention.consumed_per_use(),
        };
        let outcome = self.reconciler.apply(kind, effect, &env);
        if outcome == ApplyOutcome::Skipped(SkipReason::NothingToAmend) {
            self.context.diagnostics.record(
                tick,
                DiagnosticKind::NothingToAmend,
                "no recent effect to amend",
                vec![id.clone()],
            );
        }
        Some(outcome)
    }
}
