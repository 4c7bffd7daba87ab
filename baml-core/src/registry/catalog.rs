//! Shipped mod catalog.
//!
//! Order matters: discovery probes and batch execution follow these lists
//! top to bottom, and some mods rely on earlier entries having run first.

/// Data-layer mods. Always-on support scripts other mods read from.
pub const DATABASE_MODS: &[&str] = &[
    "inventory-tooltips.js",
    "creature-database.js",
    "equipment-database.js",
];

/// Official gameplay mods. Opt-in unless allowlisted in [`DEFAULT_ENABLED`].
pub const OFFICIAL_MODS: &[&str] = &[
    "Bestiary_Automator.js",
    "Board Analyzer.js",
    "Custom_Display.js",
    "Hero_Editor.js",
    "Highscore_Improvements.js",
    "Item_tier_list.js",
    "Monster_tier_list.js",
    "Setup_Manager.js",
    "Team_Copier.js",
    "TickTracker.js",
    "Turbo Mode.js",
];

/// Super mods. Opt-out: enabled by default for everyone.
pub const SUPER_MODS: &[&str] = &[
    "Autoseller.js",
    "Autoscroller.js",
    "Cauldron_Upgrade.js",
    "Cyclopedia.js",
    "DashboardButton.js",
    "Dice_Roller.js",
    "Hunt Analyzer.js",
    "Playercount.js",
    "Welcome.js",
];

/// Official mods enabled out of the box. Full category-prefixed paths.
pub const DEFAULT_ENABLED: &[&str] = &[
    "Official Mods/TickTracker.js",
    "Official Mods/Turbo Mode.js",
];

/// Mods kept out of user-facing listings (still loaded and run).
pub const HIDDEN_MODS: &[&str] = &["Welcome.js", "DashboardButton.js"];
