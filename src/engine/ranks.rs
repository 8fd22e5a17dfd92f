//! Rank tier tables: per-faction level thresholds mapped to tier labels.

use serde::{Deserialize, Serialize};

use crate::domain::Faction;

/// Rank label, also the configuration key of the platform role it grants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierLabel(pub String);

impl TierLabel {
    pub fn new(label: impl Into<String>) -> Self {
        TierLabel(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TierLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ascending `(min_level, label)` thresholds for one faction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierTable {
    thresholds: Vec<(u32, TierLabel)>,
}

impl TierTable {
    /// Build a table; entries are sorted by threshold.
    pub fn new<I, L>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u32, L)>,
        L: Into<String>,
    {
        let mut thresholds: Vec<(u32, TierLabel)> = entries
            .into_iter()
            .map(|(level, label)| (level, TierLabel::new(label)))
            .collect();
        thresholds.sort_by_key(|(level, _)| *level);
        Self { thresholds }
    }

    /// Label of the highest threshold `<= level`.
    pub fn tier_for(&self, level: u32) -> Option<&TierLabel> {
        self.thresholds
            .iter()
            .take_while(|(min_level, _)| *min_level <= level)
            .last()
            .map(|(_, label)| label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &TierLabel> {
        self.thresholds.iter().map(|(_, label)| label)
    }
}

/// Both faction tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankTable {
    pub hero: TierTable,
    pub monster: TierTable,
}

impl RankTable {
    pub fn table(&self, faction: Faction) -> &TierTable {
        match faction {
            Faction::Hero => &self.hero,
            Faction::Monster => &self.monster,
        }
    }

    /// Tier earned at `level`; `None` without a faction or below every threshold.
    pub fn derive_tier(&self, faction: Option<Faction>, level: u32) -> Option<&TierLabel> {
        faction.and_then(|f| self.table(f).tier_for(level))
    }

    /// Every rank label across both factions.
    pub fn all_labels(&self) -> impl Iterator<Item = &TierLabel> {
        self.hero.labels().chain(self.monster.labels())
    }
}

impl Default for RankTable {
    fn default() -> Self {
        Self {
            hero: TierTable::new([(1, "HERO_C"), (5, "HERO_B"), (10, "HERO_A"), (15, "HERO_S")]),
            monster: TierTable::new([
                (1, "M_TIGER_LOW"),
                (3, "M_TIGER_MID"),
                (5, "M_TIGER_HIGH"),
                (7, "M_DEMON_LOW"),
                (9, "M_DEMON_MID"),
                (11, "M_DEMON_HIGH"),
                (13, "M_DRAGON_LOW"),
                (15, "M_DRAGON_MID"),
                (17, "M_DRAGON_HIGH"),
                (20, "M_GOD"),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(ranks: &RankTable, faction: Option<Faction>, level: u32) -> Option<&str> {
        ranks.derive_tier(faction, level).map(|l| l.as_str())
    }

    #[test]
    fn test_hero_boundaries() {
        let ranks = RankTable::default();
        assert_eq!(label(&ranks, Some(Faction::Hero), 0), None);
        assert_eq!(label(&ranks, Some(Faction::Hero), 1), Some("HERO_C"));
        assert_eq!(label(&ranks, Some(Faction::Hero), 4), Some("HERO_C"));
        assert_eq!(label(&ranks, Some(Faction::Hero), 5), Some("HERO_B"));
        assert_eq!(label(&ranks, Some(Faction::Hero), 14), Some("HERO_A"));
        assert_eq!(label(&ranks, Some(Faction::Hero), 99), Some("HERO_S"));
    }

    #[test]
    fn test_monster_top_tier() {
        let ranks = RankTable::default();
        assert_eq!(label(&ranks, Some(Faction::Monster), 19), Some("M_DRAGON_HIGH"));
        assert_eq!(label(&ranks, Some(Faction::Monster), 20), Some("M_GOD"));
    }

    #[test]
    fn test_no_faction_has_no_tier() {
        let ranks = RankTable::default();
        assert_eq!(label(&ranks, None, 50), None);
    }

    #[test]
    fn test_unsorted_entries_are_sorted() {
        let table = TierTable::new([(10, "HIGH"), (1, "LOW")]);
        assert_eq!(table.tier_for(5).map(|l| l.as_str()), Some("LOW"));
        assert_eq!(table.tier_for(10).map(|l| l.as_str()), Some("HIGH"));
    }

    #[test]
    fn test_all_labels_covers_both_factions() {
        assert_eq!(RankTable::default().all_labels().count(), 14);
    }
}
