//! Target resolution - deciding which family a matched signal is about.

use item_rules::{Catalog, ItemLookup, KindId, Tick};

use crate::context::{InteractionLog, Presence};
use crate::matcher::Candidate;

/// Which candidate a signal applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Index into the candidate list.
    Target(usize),
    /// Several candidates remained eligible.
    Ambiguous(Vec<KindId>),
    /// No candidate was eligible.
    Unresolvable(Vec<KindId>),
}

/// Resolves candidates against the session context.
pub struct Resolver<'a> {
    pub catalog: &'a Catalog,
    pub items: &'a dyn ItemLookup,
    pub interactions: &'a InteractionLog,
    pub presence: &'a Presence,
}

impl Resolver<'_> {
    /// Pick the single candidate a signal is about.
    ///
    /// 1. When the text names an item, candidates that answer to the name
    ///    are preferred over the rest
    /// 2. A candidate with a check or use-on interaction in the lookback
    ///    window wins if it is the only one
    /// 3. Otherwise a candidate whose presence requirement holds wins if it
    ///    is the only one
    ///
    /// Anything else is dropped by the caller.
    pub fn resolve(&self, candidates: &[Candidate], now: Tick) -> Resolution {
        let mut pool: Vec<usize> = (0..candidates.len()).collect();

        if let Some(name) = candidates.iter().find_map(|c| c.named_item.as_deref()) {
            let named: Vec<usize> = pool
                .iter()
                .copied()
                .filter(|i| {
                    self.catalog
                        .kind(&candidates[*i].kind)
                        .is_some_and(|kind| kind.answers_to(name, self.items))
                })
                .collect();
            if !named.is_empty() {
                pool = named;
            }
        }

        let kinds: Vec<KindId> = pool.iter().map(|i| candidates[*i].kind.clone()).collect();

        // Step 1: recent interaction
        let recent = self.interactions.recent_targets(&kinds, now);
        if let [only] = recent.as_slice() {
            if let Some(index) = pool.iter().copied().find(|i| &candidates[*i].kind == only) {
                return Resolution::Target(index);
            }
        }

        // Step 2: presence
        let eligible: Vec<usize> = pool
            .iter()
            .copied()
            .filter(|i| {
                let candidate = &candidates[*i];
                self.catalog
                    .kind(&candidate.kind)
                    .is_some_and(|kind| self.presence.satisfies(kind, candidate.requires))
            })
            .collect();

        match eligible.as_slice() {
            [only] => Resolution::Target(*only),
            [] => Resolution::Unresolvable(kinds),
            many => Resolution::Ambiguous(
                many.iter().map(|i| candidates[*i].kind.clone()).collect(),
            ),
        }
    }
}
