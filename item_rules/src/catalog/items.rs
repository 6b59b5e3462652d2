use crate::items::ItemDirectory;

/// Names for every item the built-in families mention.
pub fn builtin_items() -> ItemDirectory {
    ItemDirectory::new()
        // Runes and currency
        .with_item(554, "Fire rune", true, true)
        .with_item(560, "Death rune", true, true)
        .with_item(562, "Chaos rune", true, true)
        .with_item(565, "Blood rune", true, true)
        .with_item(995, "Coins", true, true)
        // Trident of the seas
        .with_item(11905, "Trident of the seas (full)", false, true)
        .with_item(11907, "Trident of the seas", false, true)
        .with_item(11908, "Uncharged trident", false, true)
        // Sanguinesti staff
        .with_item(22323, "Sanguinesti staff", false, false)
        .with_item(22481, "Sanguinesti staff (uncharged)", false, true)
        // Toxic blowpipe
        .with_item(12924, "Toxic blowpipe (empty)", false, true)
        .with_item(12926, "Toxic blowpipe", false, false)
        .with_item(12934, "Zulrah's scales", true, true)
        .with_item(806, "Bronze dart", true, true)
        .with_item(807, "Iron dart", true, true)
        .with_item(808, "Steel dart", true, true)
        .with_item(3093, "Black dart", true, true)
        .with_item(809, "Mithril dart", true, true)
        .with_item(810, "Adamant dart", true, true)
        .with_item(811, "Rune dart", true, true)
        .with_item(25849, "Amethyst dart", true, true)
        .with_item(11230, "Dragon dart", true, true)
        // Crystal armour
        .with_item(23971, "Crystal helm", false, false)
        .with_item(23973, "Crystal helm (inactive)", false, false)
        // Jewellery
        .with_item(21183, "Bracelet of slaughter", false, true)
        .with_item(13128, "Explorer's ring 4", false, false)
        // Herb sack and herbs
        .with_item(13226, "Herb sack", false, true)
        .with_item(24478, "Open herb sack", false, true)
        .with_item(199, "Grimy guam leaf", false, true)
        .with_item(201, "Grimy marrentill", false, true)
        .with_item(203, "Grimy tarromin", false, true)
        .with_item(205, "Grimy harralander", false, true)
        .with_item(207, "Grimy ranarr weed", false, true)
        .with_item(209, "Grimy irit leaf", false, true)
        .with_item(211, "Grimy avantoe", false, true)
        .with_item(213, "Grimy kwuarm", false, true)
        .with_item(215, "Grimy cadantine", false, true)
        .with_item(217, "Grimy dwarf weed", false, true)
        .with_item(219, "Grimy torstol", false, true)
        .with_item(2485, "Grimy lantadyme", false, true)
        .with_item(3049, "Grimy toadflax", false, true)
        .with_item(3051, "Grimy snapdragon", false, true)
        // Log basket and logs
        .with_item(28142, "Log basket", false, false)
        .with_item(28145, "Open log basket", false, false)
        .with_item(1511, "Logs", false, true)
        .with_item(1521, "Oak logs", false, true)
        .with_item(1519, "Willow logs", false, true)
        .with_item(6333, "Teak logs", false, true)
        .with_item(1517, "Maple logs", false, true)
        .with_item(6332, "Mahogany logs", false, true)
        .with_item(1515, "Yew logs", false, true)
        .with_item(1513, "Magic logs", false, true)
        .with_item(19669, "Redwood logs", false, true)
}
