use serde::{Deserialize, Serialize};

/// A quest as it appears in the catalog document
///
/// Field names follow the upstream JSON (camelCase). `id`, `name`,
/// `trader`, `minPlayerLevel` and both track flags are required; a record
/// without them never makes it into a repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: String,
    pub name: String,
    pub trader: Trader,
    pub min_player_level: u32,
    pub kappa_required: bool,
    pub lightkeeper_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<u32>,
    /// Prerequisites, by quest *name*. Missing in the JSON means none.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub task_requirements: Vec<TaskRequirement>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub objectives: Vec<Objective>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_rewards: Option<FinishRewards>,
}

impl Quest {
    pub fn trader_name(&self) -> &str {
        &self.trader.name
    }

    /// Names of the prerequisite quests, in catalog order
    pub fn requirement_names(&self) -> impl Iterator<Item = &str> {
        self.task_requirements.iter().map(|r| r.task.name.as_str())
    }

    pub fn has_requirements(&self) -> bool {
        !self.task_requirements.is_empty()
    }

    /// Reward items, empty when the catalog has none listed
    pub fn reward_items(&self) -> &[RewardItem] {
        self.finish_rewards
            .as_ref()
            .map(|r| r.items.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Trader {
    pub name: String,
}

/// One prerequisite reference
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskRequirement {
    /// Required statuses upstream ("complete", "active", ...). Informational.
    #[serde(default)]
    pub status: Vec<String>,
    pub task: TaskRef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskRef {
    pub name: String,
}

/// A sub-goal of a quest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub found_in_raid: Option<bool>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub maps: Vec<MapRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MapRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FinishRewards {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<RewardItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RewardItem {
    pub count: u32,
    pub item: ItemRef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemRef {
    pub name: String,
}

/// Upstream data sometimes has `null` where a list belongs
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
