// Filtered, sorted views of the catalog
use crate::{
    catalog::QuestRepository,
    eligibility::{EligibilityEngine, QuestStatus},
    models::Quest,
    progress::ProgressStore,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which slice of the catalog to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Everything not yet completed
    #[default]
    Active,
    Kappa,
    Lightkeeper,
    ShowAll,
}

impl FilterMode {
    pub fn label(&self) -> &'static str {
        match self {
            FilterMode::Active => "Active",
            FilterMode::Kappa => "Kappa",
            FilterMode::Lightkeeper => "Lightkeeper",
            FilterMode::ShowAll => "Show All",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            FilterMode::Active => FilterMode::Kappa,
            FilterMode::Kappa => FilterMode::Lightkeeper,
            FilterMode::Lightkeeper => FilterMode::ShowAll,
            FilterMode::ShowAll => FilterMode::Active,
        }
    }
}

impl FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "active" => Ok(FilterMode::Active),
            "kappa" => Ok(FilterMode::Kappa),
            "lightkeeper" | "lk" => Ok(FilterMode::Lightkeeper),
            "all" | "showall" => Ok(FilterMode::ShowAll),
            _ => Err(format!(
                "unknown filter mode '{}' (expected active, kappa, lightkeeper or all)",
                s
            )),
        }
    }
}

/// Whether the Kappa/Lightkeeper modes still list completed quests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackPolicy {
    #[default]
    IncludeCompleted,
    HideCompleted,
}

/// How results are ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// As the catalog lists them
    Catalog,
    /// Available first, then locked, then completed; catalog order within each
    #[default]
    Priority,
}

impl SortOrder {
    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Catalog => "Catalog",
            SortOrder::Priority => "Priority",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            SortOrder::Catalog => SortOrder::Priority,
            SortOrder::Priority => SortOrder::Catalog,
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "catalog" => Ok(SortOrder::Catalog),
            "priority" => Ok(SortOrder::Priority),
            _ => Err(format!("unknown sort order '{}' (expected catalog or priority)", s)),
        }
    }
}

/// Trader selection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TraderFilter {
    #[default]
    All,
    Named(String),
}

impl TraderFilter {
    pub fn matches(&self, trader: &str) -> bool {
        match self {
            TraderFilter::All => true,
            TraderFilter::Named(name) => name == trader,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TraderFilter::All => "All",
            TraderFilter::Named(name) => name,
        }
    }
}

impl From<&str> for TraderFilter {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case("all") {
            TraderFilter::All
        } else {
            TraderFilter::Named(s.to_string())
        }
    }
}

/// Everything that decides what `list_quests` returns
#[derive(Debug, Clone, Default)]
pub struct QueryCriteria {
    pub search: String,
    pub trader: TraderFilter,
    pub mode: FilterMode,
    pub track_policy: TrackPolicy,
    pub order: SortOrder,
}

impl QueryCriteria {
    /// Search, trader and mode predicates, all of which must hold
    pub fn matches(&self, quest: &Quest, completed: bool) -> bool {
        self.matches_search(quest)
            && self.trader.matches(quest.trader_name())
            && self.matches_mode(quest, completed)
    }

    fn matches_search(&self, quest: &Quest) -> bool {
        self.search.is_empty() || quest.name.to_lowercase().contains(&self.search.to_lowercase())
    }

    fn matches_mode(&self, quest: &Quest, completed: bool) -> bool {
        let hide_done = self.track_policy == TrackPolicy::HideCompleted;
        match self.mode {
            FilterMode::Active => !completed,
            FilterMode::Kappa => quest.kappa_required && !(hide_done && completed),
            FilterMode::Lightkeeper => quest.lightkeeper_required && !(hide_done && completed),
            FilterMode::ShowAll => true,
        }
    }
}

/// Sort weight for the priority order
pub fn priority_tier(status: QuestStatus) -> u8 {
    match status {
        QuestStatus::Available => 0,
        QuestStatus::Locked => 1,
        QuestStatus::Completed => 2,
    }
}

/// The quests to show for the given criteria, in display order
pub fn list_quests<'a>(
    catalog: &'a QuestRepository,
    engine: &EligibilityEngine<'_>,
    progress: &ProgressStore,
    criteria: &QueryCriteria,
) -> Vec<&'a Quest> {
    let matching = catalog
        .quests()
        .iter()
        .filter(|q| criteria.matches(q, progress.is_completed(&q.id)));

    match criteria.order {
        SortOrder::Catalog => matching.collect(),
        SortOrder::Priority => {
            let mut tiered: Vec<(u8, &'a Quest)> = matching
                .map(|q| (priority_tier(engine.status(q, progress)), q))
                .collect();
            // sort_by_key is stable, so catalog order survives within a tier
            tiered.sort_by_key(|(tier, _)| *tier);
            tiered.into_iter().map(|(_, q)| q).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskRef, TaskRequirement, Trader};

    fn quest(id: &str, trader: &str, kappa: bool, lk: bool, requires: &[&str]) -> Quest {
        Quest {
            id: id.to_string(),
            name: format!("Quest {}", id.to_uppercase()),
            trader: Trader {
                name: trader.to_string(),
            },
            min_player_level: 1,
            kappa_required: kappa,
            lightkeeper_required: lk,
            wiki_link: None,
            experience: None,
            task_requirements: requires
                .iter()
                .map(|r| TaskRequirement {
                    status: Vec::new(),
                    task: TaskRef {
                        name: r.to_string(),
                    },
                })
                .collect(),
            objectives: Vec::new(),
            finish_rewards: None,
        }
    }

    fn catalog() -> QuestRepository {
        QuestRepository::from_quests(vec![
            quest("a", "Prapor", true, false, &[]),
            quest("b", "Prapor", true, true, &["Quest A"]),
            quest("c", "Skier", false, true, &[]),
            quest("d", "Skier", true, false, &["Quest C"]),
            quest("e", "Therapist", false, false, &[]),
        ])
    }

    fn ids(quests: &[&Quest]) -> Vec<String> {
        quests.iter().map(|q| q.id.clone()).collect()
    }

    fn run(catalog: &QuestRepository, progress: &ProgressStore, criteria: &QueryCriteria) -> Vec<String> {
        let engine = EligibilityEngine::without_gates(catalog);
        ids(&list_quests(catalog, &engine, progress, criteria))
    }

    #[test]
    fn test_active_hides_completed() {
        let catalog = catalog();
        let progress = ProgressStore::from_parts(vec!["a".to_string()], Vec::new());
        let criteria = QueryCriteria {
            order: SortOrder::Catalog,
            ..Default::default()
        };

        assert_eq!(run(&catalog, &progress, &criteria), vec!["b", "c", "d", "e"]);
    }

    #[test]
    fn test_track_policy_decides_completed_in_kappa_mode() {
        let catalog = catalog();
        let progress = ProgressStore::from_parts(vec!["a".to_string()], Vec::new());

        let mut criteria = QueryCriteria {
            mode: FilterMode::Kappa,
            order: SortOrder::Catalog,
            ..Default::default()
        };
        assert_eq!(run(&catalog, &progress, &criteria), vec!["a", "b", "d"]);

        criteria.track_policy = TrackPolicy::HideCompleted;
        assert_eq!(run(&catalog, &progress, &criteria), vec!["b", "d"]);

        criteria.mode = FilterMode::Lightkeeper;
        assert_eq!(run(&catalog, &progress, &criteria), vec!["b", "c"]);
    }

    #[test]
    fn test_predicates_combine_with_and() {
        let catalog = catalog();
        let progress = ProgressStore::new();
        let criteria = QueryCriteria {
            search: "quest".to_string(),
            trader: TraderFilter::from("Skier"),
            mode: FilterMode::Kappa,
            order: SortOrder::Catalog,
            ..Default::default()
        };

        assert_eq!(run(&catalog, &progress, &criteria), vec!["d"]);

        // Every result satisfies all three predicates at once
        let engine = EligibilityEngine::without_gates(&catalog);
        for q in list_quests(&catalog, &engine, &progress, &criteria) {
            assert!(q.name.to_lowercase().contains("quest"));
            assert_eq!(q.trader_name(), "Skier");
            assert!(q.kappa_required);
        }
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let catalog = catalog();
        let criteria = QueryCriteria {
            search: "uEsT e".to_string(),
            mode: FilterMode::ShowAll,
            ..Default::default()
        };
        assert_eq!(run(&catalog, &ProgressStore::new(), &criteria), vec!["e"]);
    }

    #[test]
    fn test_whitespace_in_search_is_matched_literally() {
        let catalog = QuestRepository::from_quests(vec![
            Quest {
                name: "Debut".to_string(),
                ..quest("1", "Prapor", false, false, &[])
            },
            Quest {
                name: "Search Mission".to_string(),
                ..quest("2", "Prapor", false, false, &[])
            },
        ]);
        let mut criteria = QueryCriteria {
            search: " ".to_string(),
            mode: FilterMode::ShowAll,
            order: SortOrder::Catalog,
            ..Default::default()
        };
        assert_eq!(run(&catalog, &ProgressStore::new(), &criteria), vec!["2"]);

        criteria.search = "debut ".to_string();
        assert!(run(&catalog, &ProgressStore::new(), &criteria).is_empty());

        criteria.search.clear();
        assert_eq!(run(&catalog, &ProgressStore::new(), &criteria), vec!["1", "2"]);
    }

    #[test]
    fn test_priority_order_tiers_and_stability() {
        let catalog = catalog();
        // a done -> b available; c not done -> d locked
        let progress = ProgressStore::from_parts(vec!["a".to_string()], Vec::new());
        let criteria = QueryCriteria {
            mode: FilterMode::ShowAll,
            order: SortOrder::Priority,
            ..Default::default()
        };

        let first = run(&catalog, &progress, &criteria);
        assert_eq!(first, vec!["b", "c", "e", "d", "a"]);

        // Same input, same output
        assert_eq!(run(&catalog, &progress, &criteria), first);
    }

    #[test]
    fn test_filter_mode_parse_and_cycle() {
        assert_eq!("Show All".parse::<FilterMode>().unwrap(), FilterMode::ShowAll);
        assert_eq!("all".parse::<FilterMode>().unwrap(), FilterMode::ShowAll);
        assert_eq!("LIGHTKEEPER".parse::<FilterMode>().unwrap(), FilterMode::Lightkeeper);
        assert!("done".parse::<FilterMode>().is_err());

        let mut seen = vec![FilterMode::Active];
        let mut mode = FilterMode::Active.next();
        while mode != FilterMode::Active {
            seen.push(mode);
            mode = mode.next();
        }
        assert_eq!(
            seen,
            vec![
                FilterMode::Active,
                FilterMode::Kappa,
                FilterMode::Lightkeeper,
                FilterMode::ShowAll
            ]
        );
    }

    #[test]
    fn test_trader_filter_from_str() {
        assert_eq!(TraderFilter::from("All"), TraderFilter::All);
        assert_eq!(
            TraderFilter::from("BTR Driver"),
            TraderFilter::Named("BTR Driver".to_string())
        );
        assert!(TraderFilter::All.matches("anyone"));
        assert!(!TraderFilter::from("Prapor").matches("Skier"));
    }
}
