use crate::items::{ItemFilter, TrackedItemKind};
use crate::rules::{
    ContainerDiffRule, EffectTemplate, MessageRule, NameSource, Quantity, RuleError,
};

/// Capacity-limited containers.
pub(super) fn builtin_containers() -> Result<Vec<TrackedItemKind>, RuleError> {
    Ok(vec![herb_sack()?, log_basket()?])
}

fn herb_sack() -> Result<TrackedItemKind, RuleError> {
    Ok(TrackedItemKind::container(
        "herb_sack",
        "Herb sack",
        ItemFilter::NamePrefix("Grimy ".to_string()),
    )
    .with_variants([13226, 24478], [])
    .with_capacity(30)
    .with_message_rule(MessageRule::check(
        r"^The herb sack is empty\.?$",
        EffectTemplate::Clear,
    )?)
    .with_message_rule(MessageRule::check(
        r"^You look in your herb sack and see:$",
        EffectTemplate::Clear,
    )?)
    .with_message_rule(MessageRule::check(
        r"^(?:The herb sack )?contains:? (?P<list>.+?)\.?$",
        EffectTemplate::ReplaceListed {
            group: "list".to_string(),
        },
    )?)
    .with_message_rule(MessageRule::check(
        r"^(?P<quantity>one|[\d,]+) x (?P<item>Grimy .+)$",
        EffectTemplate::AddItem {
            item: NameSource::captured("item"),
            quantity: Quantity::captured("quantity"),
        },
    )?)
    .with_message_rule(MessageRule::update(
        r"^You (?:put|place) the (?P<item>Grimy .+?) (?:in|into) your herb sack\.?$",
        EffectTemplate::AddItem {
            item: NameSource::captured("item"),
            quantity: Quantity::Fixed(1),
        },
    )?)
    .with_diff_rule(ContainerDiffRule::fill("Fill"))
    .with_diff_rule(ContainerDiffRule::empty("Empty")))
}

fn log_basket() -> Result<TrackedItemKind, RuleError> {
    Ok(TrackedItemKind::container(
        "log_basket",
        "Log basket",
        ItemFilter::NameSuffix("logs".to_string()),
    )
    .with_variants([28142, 28145], [])
    .with_capacity(28)
    .with_message_rule(MessageRule::check(
        r"^The log basket is empty\.?$",
        EffectTemplate::Clear,
    )?)
    .with_message_rule(MessageRule::check(
        r"^The basket contains:? (?P<list>.+?)\.?$",
        EffectTemplate::ReplaceListed {
            group: "list".to_string(),
        },
    )?)
    .with_message_rule(MessageRule::update(
        r"^You get some (?P<item>.*logs) and put them in your log basket\.?$",
        EffectTemplate::AddItem {
            item: NameSource::captured("item"),
            quantity: Quantity::Fixed(1),
        },
    )?)
    .with_message_rule(MessageRule::update(
        r"^The nature offerings enabled you to chop an extra log\.?$",
        EffectTemplate::Amend(Quantity::Fixed(1)),
    )?)
    .with_diff_rule(ContainerDiffRule::fill("Fill"))
    .with_diff_rule(ContainerDiffRule::empty("Empty")))
}
