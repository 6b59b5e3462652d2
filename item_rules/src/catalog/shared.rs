use crate::rules::{EffectTemplate, MessageRule, Quantity, RuleError, SharedRulePool};

/// Generic charge wording reused by several weapon families.
pub fn builtin_shared_rules() -> Result<SharedRulePool, RuleError> {
    Ok(SharedRulePool::new()
        .with_rule(
            "charges_left",
            MessageRule::check(
                r"^(?:Your (?P<item>.+?) )?(?:has|have) (?P<charges>one|[\d,]+) charges? (?:left|remaining)\.?$",
                EffectTemplate::Set(Quantity::captured("charges")),
            )?
            .naming("item")
            .present(),
        )
        .with_rule(
            "no_charges",
            MessageRule::check(
                r"^(?:Your (?P<item>.+?) )?(?:has|have) no charges(?: left)?\.?$",
                EffectTemplate::Set(Quantity::Fixed(0)),
            )?
            .naming("item")
            .present(),
        )
        .with_rule(
            "ran_out",
            MessageRule::update(
                r"^(?:Your (?P<item>.+?) )?(?:has|have) run out of charges\.?$",
                EffectTemplate::Set(Quantity::Fixed(0)),
            )?
            .naming("item")
            .worn()
            .deferred(),
        ))
}
