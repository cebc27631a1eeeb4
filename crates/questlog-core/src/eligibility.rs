// Which quests can be picked up right now
use crate::{catalog::QuestRepository, models::Quest, progress::ProgressStore};
use serde::{Deserialize, Serialize};

/// An extra dependency that isn't in the catalog's requirement list
///
/// `quest` stays locked until `requires` is completed. Unlike catalog
/// requirements this fails closed: if `requires` isn't in the catalog,
/// the gated quest is locked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GateRule {
    pub quest: String,
    pub requires: String,
}

impl GateRule {
    pub fn new(quest: impl Into<String>, requires: impl Into<String>) -> Self {
        Self {
            quest: quest.into(),
            requires: requires.into(),
        }
    }
}

/// Where a quest stands for the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestStatus {
    Completed,
    /// Not done, prerequisites met
    Available,
    /// Not done, something still blocking
    Locked,
}

impl QuestStatus {
    pub fn label(&self) -> &'static str {
        match self {
            QuestStatus::Completed => "Completed",
            QuestStatus::Available => "Available",
            QuestStatus::Locked => "Locked",
        }
    }
}

/// Availability checks against one catalog
///
/// Holds no state of its own, so it's cheap to build per query. Progress
/// is passed in on every call.
pub struct EligibilityEngine<'a> {
    catalog: &'a QuestRepository,
    gates: &'a [GateRule],
}

impl<'a> EligibilityEngine<'a> {
    pub fn new(catalog: &'a QuestRepository, gates: &'a [GateRule]) -> Self {
        Self { catalog, gates }
    }

    /// Catalog requirements only, no gates
    pub fn without_gates(catalog: &'a QuestRepository) -> Self {
        Self { catalog, gates: &[] }
    }

    /// Are this quest's prerequisites met?
    ///
    /// Gates are checked first. After that every requirement has to name a
    /// completed quest; names the catalog doesn't know don't block.
    pub fn is_available(&self, quest: &Quest, progress: &ProgressStore) -> bool {
        if !self.gates_open(quest, progress) {
            return false;
        }

        quest
            .requirement_names()
            .all(|name| self.requirement_met(name, progress))
    }

    pub fn status(&self, quest: &Quest, progress: &ProgressStore) -> QuestStatus {
        if progress.is_completed(&quest.id) {
            QuestStatus::Completed
        } else if self.is_available(quest, progress) {
            QuestStatus::Available
        } else {
            QuestStatus::Locked
        }
    }

    /// Names of whatever is still blocking the quest, gates first
    pub fn unmet_requirements(&self, quest: &Quest, progress: &ProgressStore) -> Vec<String> {
        let mut unmet: Vec<String> = self
            .gates_for(quest)
            .filter(|gate| !self.gate_satisfied(gate, progress))
            .map(|gate| gate.requires.clone())
            .collect();

        for name in quest.requirement_names() {
            if !self.requirement_met(name, progress) && !unmet.iter().any(|u| u == name) {
                unmet.push(name.to_string());
            }
        }

        unmet
    }

    fn gates_for<'q>(&'q self, quest: &'q Quest) -> impl Iterator<Item = &'a GateRule> + 'q {
        self.gates.iter().filter(move |gate| gate.quest == quest.name)
    }

    fn gates_open(&self, quest: &Quest, progress: &ProgressStore) -> bool {
        self.gates_for(quest)
            .all(|gate| self.gate_satisfied(gate, progress))
    }

    fn gate_satisfied(&self, gate: &GateRule, progress: &ProgressStore) -> bool {
        self.catalog
            .id_for_name(&gate.requires)
            .map(|id| progress.is_completed(id))
            .unwrap_or(false)
    }

    fn requirement_met(&self, name: &str, progress: &ProgressStore) -> bool {
        match self.catalog.id_for_name(name) {
            Some(id) => progress.is_completed(id),
            None => true, // unknown name, don't lock content over a data gap
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskRef, TaskRequirement, Trader};

    fn quest(id: &str, name: &str, requires: &[&str]) -> Quest {
        Quest {
            id: id.to_string(),
            name: name.to_string(),
            trader: Trader {
                name: "Prapor".to_string(),
            },
            min_player_level: 1,
            kappa_required: false,
            lightkeeper_required: false,
            wiki_link: None,
            experience: None,
            task_requirements: requires
                .iter()
                .map(|r| TaskRequirement {
                    status: vec!["complete".to_string()],
                    task: TaskRef {
                        name: r.to_string(),
                    },
                })
                .collect(),
            objectives: Vec::new(),
            finish_rewards: None,
        }
    }

    fn abc_catalog() -> QuestRepository {
        QuestRepository::from_quests(vec![
            quest("a", "A", &[]),
            quest("b", "B", &["A"]),
            quest("c", "C", &["Ghost"]),
        ])
    }

    #[test]
    fn test_abc_scenario() {
        let catalog = abc_catalog();
        let engine = EligibilityEngine::without_gates(&catalog);
        let mut progress = ProgressStore::new();

        let [a, b, c] = [&catalog.quests()[0], &catalog.quests()[1], &catalog.quests()[2]];
        assert!(engine.is_available(a, &progress));
        assert!(!engine.is_available(b, &progress));
        assert!(engine.is_available(c, &progress));

        progress.toggle_quest_completed("a");
        assert!(engine.is_available(b, &progress));
    }

    #[test]
    fn test_unresolvable_requirement_never_blocks() {
        let catalog = QuestRepository::from_quests(vec![
            quest("a", "A", &[]),
            quest("x", "X", &["Ghost", "A"]),
        ]);
        let engine = EligibilityEngine::without_gates(&catalog);
        let mut progress = ProgressStore::new();
        let x = catalog.get("x").unwrap();

        assert!(!engine.is_available(x, &progress));
        progress.toggle_quest_completed("a");
        assert!(engine.is_available(x, &progress));
    }

    #[test]
    fn test_all_requirements_needed() {
        let catalog = QuestRepository::from_quests(vec![
            quest("a", "A", &[]),
            quest("b", "B", &[]),
            quest("c", "C", &["A", "B"]),
        ]);
        let engine = EligibilityEngine::without_gates(&catalog);
        let c = catalog.get("c").unwrap();

        for (done, expected) in [
            (vec![], false),
            (vec!["a"], false),
            (vec!["b"], false),
            (vec!["a", "b"], true),
        ] {
            let progress =
                ProgressStore::from_parts(done.iter().map(|s| s.to_string()), Vec::new());
            assert_eq!(engine.is_available(c, &progress), expected, "done = {:?}", done);
        }
    }

    #[test]
    fn test_status_tristate() {
        let catalog = abc_catalog();
        let engine = EligibilityEngine::without_gates(&catalog);
        let progress = ProgressStore::from_parts(vec!["b".to_string()], Vec::new());

        // B is done even though A isn't; completion wins
        assert_eq!(engine.status(catalog.get("b").unwrap(), &progress), QuestStatus::Completed);
        assert_eq!(engine.status(catalog.get("a").unwrap(), &progress), QuestStatus::Available);

        let empty = ProgressStore::new();
        assert_eq!(engine.status(catalog.get("b").unwrap(), &empty), QuestStatus::Locked);
    }

    #[test]
    fn test_gate_blocks_until_required_quest_done() {
        let catalog = QuestRepository::from_quests(vec![
            quest("col", "Collector", &[]),
            quest("nb", "New Beginnings", &[]),
        ]);
        let gates = vec![GateRule::new("New Beginnings", "Collector")];
        let engine = EligibilityEngine::new(&catalog, &gates);
        let nb = catalog.get("nb").unwrap();

        let mut progress = ProgressStore::new();
        assert!(!engine.is_available(nb, &progress));
        assert_eq!(engine.unmet_requirements(nb, &progress), vec!["Collector"]);

        progress.toggle_quest_completed("col");
        assert!(engine.is_available(nb, &progress));
        assert!(engine.unmet_requirements(nb, &progress).is_empty());
    }

    #[test]
    fn test_gate_fails_closed_when_target_unknown() {
        let catalog = QuestRepository::from_quests(vec![quest("nb", "New Beginnings", &[])]);
        let gates = vec![GateRule::new("New Beginnings", "Collector")];
        let engine = EligibilityEngine::new(&catalog, &gates);

        assert!(!engine.is_available(catalog.get("nb").unwrap(), &ProgressStore::new()));
    }

    #[test]
    fn test_unmet_lists_only_resolvable_blockers() {
        let catalog = QuestRepository::from_quests(vec![
            quest("a", "A", &[]),
            quest("b", "B", &[]),
            quest("c", "C", &["A", "Ghost", "B"]),
        ]);
        let engine = EligibilityEngine::without_gates(&catalog);
        let progress = ProgressStore::from_parts(vec!["b".to_string()], Vec::new());

        assert_eq!(
            engine.unmet_requirements(catalog.get("c").unwrap(), &progress),
            vec!["A"]
        );
    }
}
