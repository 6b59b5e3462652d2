//! Tick scheduler - the explicit per-tick processing order.
//!
//! The host delivers signals in a fixed order, and several families rely on
//! it to decide which of two near-simultaneous signals is authoritative.
//! Instead of depending on subscription order, the order is a value:
//!
//! `Input -> Chat -> Dialog -> Animation -> DeferredFlush -> Container ->
//! Combat -> TickEnd`
//!
//! The flush runs after message and animation effects and before
//! container-diff rules, so animation results are visible to diffs of the
//! same tick.

mod deferral;

pub use deferral::*;

use item_rules::{Phase, Tick, TimedSignal};
use tracing::warn;

use crate::error::TrackerError;

/// Ordered processing phases for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSchedule {
    phases: Vec<Phase>,
}

impl Default for TickSchedule {
    fn default() -> Self {
        Self {
            phases: vec![
                Phase::Input,
                Phase::Chat,
                Phase::Dialog,
                Phase::Animation,
                Phase::DeferredFlush,
                Phase::Container,
                Phase::Combat,
                Phase::TickEnd,
            ],
        }
    }
}

impl TickSchedule {
    /// Validate a custom order.
    ///
    /// Every phase must appear exactly once, the deferred flush must follow
    /// chat, dialog and animation and precede container diffs, and tick end
    /// must come last.
    pub fn new(phases: Vec<Phase>) -> Result<Self, TrackerError> {
        let position = |phase: Phase| phases.iter().position(|p| *p == phase);

        for phase in TickSchedule::default().phases {
            let count = phases.iter().filter(|p| **p == phase).count();
            if count != 1 {
                return Err(TrackerError::InvalidSchedule(format!(
                    "{phase:?} appears {count} times"
                )));
            }
        }
        if phases.len() != TickSchedule::default().phases.len() {
            return Err(TrackerError::InvalidSchedule("unexpected phases".to_string()));
        }

        let flush = position(Phase::DeferredFlush);
        for earlier in [Phase::Chat, Phase::Dialog, Phase::Animation] {
            if position(earlier) > flush {
                return Err(TrackerError::InvalidSchedule(format!(
                    "{earlier:?} must run before the deferred flush"
                )));
            }
        }
        if position(Phase::Container) < flush {
            return Err(TrackerError::InvalidSchedule(
                "container diffs must run after the deferred flush".to_string(),
            ));
        }
        if phases.last() != Some(&Phase::TickEnd) {
            return Err(TrackerError::InvalidSchedule(
                "tick end must be the last phase".to_string(),
            ));
        }

        Ok(Self { phases })
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }
}

/// Collects signals until their tick is complete.
#[derive(Debug, Clone, Default)]
pub struct TickBuffer {
    tick: Option<Tick>,
    signals: Vec<TimedSignal>,
}

impl TickBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tick currently being collected.
    pub fn tick(&self) -> Option<Tick> {
        self.tick
    }

    /// Add a signal. When it belongs to a later tick, the completed tick is
    /// returned for processing first.
    ///
    /// A signal stamped with an earlier tick than the one being collected
    /// is folded into the current tick.
    pub fn push(&mut self, signal: TimedSignal) -> Option<(Tick, Vec<TimedSignal>)> {
        match self.tick {
            Some(current) if signal.tick > current => {
                let completed = self.take();
                self.tick = Some(signal.tick);
                self.signals.push(signal);
                completed
            }
            Some(current) => {
                if signal.tick < current {
                    warn!(tick = signal.tick, current, "late signal folded into current tick");
                }
                self.signals.push(signal);
                None
            }
            None => {
                self.tick = Some(signal.tick);
                self.signals.push(signal);
                None
            }
        }
    }

    /// Take the buffered tick, ordered by sequence number.
    pub fn take(&mut self) -> Option<(Tick, Vec<TimedSignal>)> {
        let tick = self.tick.take()?;
        let mut signals = std::mem::take(&mut self.signals);
        signals.sort_by_key(|signal| signal.seq);
        Some((tick, signals))
    }

    pub fn is_empty(&self) -> bool {
        self.tick.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use item_rules::{ChatMessage, Signal};

    fn chat(tick: Tick, seq: u32) -> TimedSignal {
        TimedSignal::new(tick, seq, Signal::Chat(ChatMessage::game("hi")))
    }

    #[test]
    fn test_default_schedule_is_valid() {
        let schedule = TickSchedule::default();
        assert_eq!(
            TickSchedule::new(schedule.phases().to_vec()).unwrap(),
            schedule
        );
    }

    #[test]
    fn test_flush_after_container_is_rejected() {
        let phases = vec![
            Phase::Input,
            Phase::Chat,
            Phase::Dialog,
            Phase::Animation,
            Phase::Container,
            Phase::DeferredFlush,
            Phase::Combat,
            Phase::TickEnd,
        ];
        assert!(matches!(
            TickSchedule::new(phases),
            Err(TrackerError::InvalidSchedule(_))
        ));
    }

    #[test]
    fn test_animation_after_flush_is_rejected() {
        let phases = vec![
            Phase::Input,
            Phase::Chat,
            Phase::Dialog,
            Phase::DeferredFlush,
            Phase::Animation,
            Phase::Container,
            Phase::Combat,
            Phase::TickEnd,
        ];
        assert!(TickSchedule::new(phases).is_err());
    }

    #[test]
    fn test_missing_or_duplicate_phase_is_rejected() {
        let mut phases = TickSchedule::default().phases().to_vec();
        phases.retain(|p| *p != Phase::Combat);
        assert!(TickSchedule::new(phases.clone()).is_err());

        phases.insert(0, Phase::Chat);
        assert!(TickSchedule::new(phases).is_err());
    }

    #[test]
    fn test_combat_may_move_before_tick_end_only() {
        let phases = vec![
            Phase::Combat,
            Phase::Input,
            Phase::Chat,
            Phase::Dialog,
            Phase::Animation,
            Phase::DeferredFlush,
            Phase::Container,
            Phase::TickEnd,
        ];
        assert!(TickSchedule::new(phases).is_ok());
    }

    #[test]
    fn test_buffer_completes_on_next_tick() {
        let mut buffer = TickBuffer::new();
        assert!(buffer.push(chat(1, 1)).is_none());
        assert!(buffer.push(chat(1, 0)).is_none());

        let (tick, signals) = buffer.push(chat(2, 0)).unwrap();
        assert_eq!(tick, 1);
        assert_eq!(signals.iter().map(|s| s.seq).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(buffer.tick(), Some(2));

        // Late signal joins the open tick
        assert!(buffer.push(chat(1, 5)).is_none());
        let (tick, signals) = buffer.take().unwrap();
        assert_eq!(tick, 2);
        assert_eq!(signals.len(), 2);
        assert!(buffer.is_empty());
    }
}
