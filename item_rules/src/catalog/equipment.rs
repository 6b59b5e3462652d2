use crate::dialog::DialogKind;
use crate::items::{DualResource, ItemFilter, ItemId, TrackedItemKind};
use crate::rules::{
    AnimationRule, DialogRule, EffectTemplate, HitsplatRule, MessageRule, NameSource, Quantity,
    RuleError,
};
use crate::signals::HitsplatTarget;

const ZULRAHS_SCALES: i32 = 12934;
const MAGIC_CAST: i32 = 1167;

/// Charge-consuming weapons and armour.
pub(super) fn builtin_equipment() -> Result<Vec<TrackedItemKind>, RuleError> {
    Ok(vec![
        trident_of_the_seas()?,
        sanguinesti_staff()?,
        toxic_blowpipe()?,
        crystal_helm()?,
        bracelet_of_slaughter()?,
        explorers_ring()?,
    ])
}

fn trident_of_the_seas() -> Result<TrackedItemKind, RuleError> {
    Ok(
        TrackedItemKind::counter("trident_of_the_seas", "Trident of the seas")
            .with_alias("trident")
            .with_variants([11907, 11905], [11908])
            .with_capacity(2500)
            .with_low_threshold(100)
            .with_component(560, 1)
            .with_component(562, 1)
            .with_component(554, 5)
            .with_component(995, 10)
            .with_shared("charges_left")
            .with_shared("no_charges")
            .with_shared("ran_out")
            .with_dialog_rule(DialogRule::on_option(
                DialogKind::Input,
                r"^How many charges would you like to add\?",
                r"^(?P<charges>[\d,]+)$",
                EffectTemplate::Increase(Quantity::captured("charges")),
            )?)
            .with_dialog_rule(DialogRule::on_option(
                DialogKind::Options,
                r"^Really uncharge the trident\?",
                r"^Yes",
                EffectTemplate::Set(Quantity::Fixed(0)),
            )?)
            .with_animation_rule(AnimationRule::new([MAGIC_CAST], 1)),
    )
}

fn sanguinesti_staff() -> Result<TrackedItemKind, RuleError> {
    Ok(
        TrackedItemKind::counter("sanguinesti_staff", "Sanguinesti staff")
            .with_alias("staff")
            .with_variants([22323], [22481])
            .with_capacity(20000)
            .with_low_threshold(200)
            .with_component(565, 3)
            .with_shared("charges_left")
            .with_shared("no_charges")
            .with_shared("ran_out")
            .with_dialog_rule(DialogRule::on_option(
                DialogKind::Input,
                r"^How many charges do you want to apply\?",
                r"^(?P<charges>[\d,]+)$",
                EffectTemplate::Increase(Quantity::captured("charges")),
            )?)
            .with_dialog_rule(DialogRule::on_option(
                DialogKind::Options,
                r"^Uncharge all the charges from your staff\?",
                r"^Yes",
                EffectTemplate::Set(Quantity::Fixed(0)),
            )?)
            .with_animation_rule(AnimationRule::new([MAGIC_CAST], 1)),
    )
}

fn toxic_blowpipe() -> Result<TrackedItemKind, RuleError> {
    let scales = NameSource::Fixed(ItemId(ZULRAHS_SCALES));
    Ok(TrackedItemKind::dual_resource(
        "toxic_blowpipe",
        "Toxic blowpipe",
        DualResource {
            primary: ItemId(ZULRAHS_SCALES),
            primary_per_use: 2.0 / 3.0,
            primary_capacity: 16383,
            secondary: ItemFilter::NameSuffix(" dart".to_string()),
            secondary_capacity: 16383,
        },
    )
    .with_alias("blowpipe")
    .with_variants([12926], [12924])
    .with_low_threshold(100)
    .with_message_rule(MessageRule::check(
        r"^Darts: (?P<dart>.+?) x (?P<darts>[\d,]+)\. Scales: (?P<scales>[\d,]+) \([\d.]+%\)\.?$",
        EffectTemplate::ReplaceContents(vec![
            (NameSource::captured("dart"), Quantity::captured("darts")),
            (scales.clone(), Quantity::captured("scales")),
        ]),
    )?)
    .with_message_rule(MessageRule::check(
        r"^Darts: None\. Scales: (?P<scales>[\d,]+) \([\d.]+%\)\.?$",
        EffectTemplate::ReplaceContents(vec![(scales.clone(), Quantity::captured("scales"))]),
    )?)
    .with_dialog_rule(DialogRule::on_option(
        DialogKind::Input,
        r"^How many scales would you like to use\?",
        r"^(?P<scales>[\d,]+)$",
        EffectTemplate::AddItem {
            item: scales.clone(),
            quantity: Quantity::captured("scales"),
        },
    )?)
    .with_dialog_rule(DialogRule::on_option(
        DialogKind::Options,
        r"^Really uncharge the blowpipe\?",
        r"^Yes",
        EffectTemplate::RemoveItem {
            item: scales,
            quantity: None,
        },
    )?)
    .with_animation_rule(AnimationRule::new([5061, 10656], 1).with_cadence(2)))
}

fn crystal_helm() -> Result<TrackedItemKind, RuleError> {
    Ok(TrackedItemKind::counter("crystal_helm", "Crystal helm")
        .with_variants([23971], [23973])
        .with_capacity(20000)
        .with_low_threshold(500)
        .with_message_rule(MessageRule::check(
            r"^Your crystal helm has (?P<charges>one|[\d,]+) charges? remaining\.?$",
            EffectTemplate::Set(Quantity::captured("charges")),
        )?)
        .with_hitsplat_rule(HitsplatRule::new(HitsplatTarget::SelfActor, 100, 1)))
}

fn bracelet_of_slaughter() -> Result<TrackedItemKind, RuleError> {
    Ok(
        TrackedItemKind::counter("bracelet_of_slaughter", "Bracelet of slaughter")
            .with_variants([21183], [])
            .with_capacity(30)
            .with_low_threshold(3)
            .zero_is_unknown()
            .with_message_rule(MessageRule::check(
                r"^Your bracelet of slaughter has (?P<charges>one|[\d,]+) charges? left\.?$",
                EffectTemplate::Set(Quantity::captured("charges")),
            )?)
            .with_message_rule(MessageRule::update(
                r"^Your bracelet of slaughter prevents your slayer count from decreasing\. It has (?P<charges>one|[\d,]+) charges? left\.?$",
                EffectTemplate::Set(Quantity::captured("charges")),
            )?)
            .with_message_rule(MessageRule::update(
                r"^Your bracelet of slaughter prevents your slayer count from decreasing\. It then crumbles to dust\.?$",
                EffectTemplate::Set(Quantity::Fixed(0)),
            )?),
    )
}

fn explorers_ring() -> Result<TrackedItemKind, RuleError> {
    Ok(TrackedItemKind::counter("explorers_ring", "Explorer's ring")
        .with_variants([13128], [])
        .with_capacity(30)
        .with_message_rule(MessageRule::check(
            r"^You have (?P<charges>one|[\d,]+) alchemy casts? left for today\.?$",
            EffectTemplate::Set(Quantity::captured("charges")),
        )?)
        .with_message_rule(MessageRule::update(
            r"^Your Explorer's ring's alchemy charges have been restored for the day\.?$",
            EffectTemplate::Reset,
        )?))
}
