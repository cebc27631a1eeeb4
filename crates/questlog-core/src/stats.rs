// Completion counts and percentages
use crate::{
    catalog::QuestRepository,
    constants::COLLECTOR_ITEMS,
    eligibility::{EligibilityEngine, QuestStatus},
    models::Quest,
    progress::ProgressStore,
};
use serde::Serialize;

/// Completed / total, with a rounded percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Stat {
    pub count: usize,
    pub total: usize,
    pub pct: u8,
}

impl Stat {
    /// An empty subset gives 0%, not a division by zero
    pub fn from_counts(count: usize, total: usize) -> Self {
        if total == 0 {
            return Self::default();
        }

        let count = count.min(total);
        // round half up: floor(count / total * 100 + 0.5)
        let pct = (count * 200 + total) / (total * 2);
        Self {
            count,
            total,
            pct: pct as u8,
        }
    }

    fn over<'a>(quests: impl Iterator<Item = &'a Quest>, progress: &ProgressStore) -> Self {
        let (count, total) = quests.fold((0, 0), |(count, total), q| {
            (count + usize::from(progress.is_completed(&q.id)), total + 1)
        });
        Self::from_counts(count, total)
    }
}

/// The three progress bars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Stats {
    pub overall: Stat,
    pub kappa: Stat,
    pub lightkeeper: Stat,
}

pub fn compute_stats(catalog: &QuestRepository, progress: &ProgressStore) -> Stats {
    let quests = catalog.quests();
    Stats {
        overall: Stat::over(quests.iter(), progress),
        kappa: Stat::over(quests.iter().filter(|q| q.kappa_required), progress),
        lightkeeper: Stat::over(quests.iter().filter(|q| q.lightkeeper_required), progress),
    }
}

/// How one trader's quests split up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TraderBreakdown {
    pub total: usize,
    pub completed: usize,
    pub unlocked: usize,
    pub locked: usize,
}

pub fn trader_breakdown(
    catalog: &QuestRepository,
    engine: &EligibilityEngine<'_>,
    progress: &ProgressStore,
    trader: &str,
) -> TraderBreakdown {
    let mut breakdown = TraderBreakdown::default();

    for quest in catalog.quests().iter().filter(|q| q.trader_name() == trader) {
        breakdown.total += 1;
        match engine.status(quest, progress) {
            QuestStatus::Completed => breakdown.completed += 1,
            QuestStatus::Available => breakdown.unlocked += 1,
            QuestStatus::Locked => breakdown.locked += 1,
        }
    }

    breakdown
}

/// Found collector items out of the known list. Unknown names don't count.
pub fn collector_stat(progress: &ProgressStore) -> Stat {
    let found = COLLECTOR_ITEMS
        .iter()
        .filter(|item| progress.is_found(item))
        .count();
    Stat::from_counts(found, COLLECTOR_ITEMS.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskRef, TaskRequirement, Trader};

    fn quest(id: &str, trader: &str, kappa: bool, lk: bool) -> Quest {
        Quest {
            id: id.to_string(),
            name: id.to_string(),
            trader: Trader {
                name: trader.to_string(),
            },
            min_player_level: 1,
            kappa_required: kappa,
            lightkeeper_required: lk,
            wiki_link: None,
            experience: None,
            task_requirements: Vec::new(),
            objectives: Vec::new(),
            finish_rewards: None,
        }
    }

    #[test]
    fn test_kappa_two_of_three() {
        let quests: Vec<Quest> = (0..10)
            .map(|i| quest(&format!("q{}", i), "Prapor", i < 3, false))
            .collect();
        let catalog = QuestRepository::from_quests(quests);
        let progress = ProgressStore::from_parts(vec!["q0".to_string(), "q1".to_string()], Vec::new());

        let stats = compute_stats(&catalog, &progress);
        assert_eq!(stats.kappa, Stat { count: 2, total: 3, pct: 67 });
        assert_eq!(stats.overall, Stat { count: 2, total: 10, pct: 20 });
        assert_eq!(stats.lightkeeper, Stat::default());
    }

    #[test]
    fn test_empty_catalog_is_all_zero() {
        let stats = compute_stats(&QuestRepository::default(), &ProgressStore::new());
        assert_eq!(stats.overall, Stat { count: 0, total: 0, pct: 0 });
    }

    #[test]
    fn test_rounding_is_half_up() {
        assert_eq!(Stat::from_counts(1, 8).pct, 13); // 12.5
        assert_eq!(Stat::from_counts(1, 200).pct, 1); // 0.5
        assert_eq!(Stat::from_counts(1, 3).pct, 33);
        assert_eq!(Stat::from_counts(3, 3).pct, 100);
    }

    #[test]
    fn test_pct_bounds_hold_for_every_count() {
        for total in 1..=50 {
            for count in 0..=total {
                let stat = Stat::from_counts(count, total);
                assert!(stat.pct <= 100);
                assert!(stat.count <= stat.total);
            }
        }
    }

    #[test]
    fn test_completed_ids_outside_catalog_ignored() {
        let catalog = QuestRepository::from_quests(vec![quest("a", "Prapor", false, false)]);
        let progress = ProgressStore::from_parts(vec!["ghost".to_string()], Vec::new());
        assert_eq!(compute_stats(&catalog, &progress).overall.count, 0);
    }

    #[test]
    fn test_trader_breakdown_adds_up() {
        let mut b = quest("b", "Skier", false, false);
        b.task_requirements.push(TaskRequirement {
            status: Vec::new(),
            task: TaskRef {
                name: "a".to_string(),
            },
        });
        let catalog = QuestRepository::from_quests(vec![
            quest("a", "Skier", false, false),
            b,
            quest("c", "Skier", false, false),
            quest("d", "Prapor", false, false),
        ]);
        let engine = EligibilityEngine::without_gates(&catalog);
        let progress = ProgressStore::from_parts(vec!["c".to_string()], Vec::new());

        let skier = trader_breakdown(&catalog, &engine, &progress, "Skier");
        assert_eq!(
            skier,
            TraderBreakdown {
                total: 3,
                completed: 1,
                unlocked: 1,
                locked: 1
            }
        );
        assert_eq!(skier.total, skier.completed + skier.unlocked + skier.locked);
    }

    #[test]
    fn test_collector_stat_counts_known_items_only() {
        let progress = ProgressStore::from_parts(
            Vec::new(),
            vec!["Golden egg".to_string(), "Not a collector item".to_string()],
        );
        let stat = collector_stat(&progress);
        assert_eq!(stat.count, 1);
        assert_eq!(stat.total, COLLECTOR_ITEMS.len());
    }
}
