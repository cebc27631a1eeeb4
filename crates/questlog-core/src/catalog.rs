// Quest repository: the immutable catalog plus the name -> id index
use crate::{constants::TRADERS, models::Quest, Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Somewhere the catalog document can be read from
///
/// Returns the raw document; `QuestRepository` does the parsing so every
/// source gets the same validation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self) -> Result<String>;

    /// Human-readable origin, for logs and the error screen
    fn describe(&self) -> String;
}

/// Where the catalog lives, as given in config or on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLocation {
    Url(String),
    Path(PathBuf),
}

impl CatalogLocation {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            CatalogLocation::Url(trimmed.to_string())
        } else {
            CatalogLocation::Path(PathBuf::from(trimmed))
        }
    }

    /// Build the matching source
    pub fn into_source(self, timeout: Duration) -> Result<Box<dyn CatalogSource>> {
        match self {
            CatalogLocation::Url(url) => Ok(Box::new(
                crate::providers::HttpCatalogSource::new(url, timeout)?,
            )),
            CatalogLocation::Path(path) => {
                Ok(Box::new(crate::providers::FileCatalogSource::new(path)))
            }
        }
    }
}

/// Maps quest names to ids, used only to resolve prerequisites
#[derive(Debug, Clone, Default)]
struct NameIndex {
    map: HashMap<String, String>,
}

impl NameIndex {
    /// Later records win on duplicate names, same as building a plain map
    /// in catalog order would
    fn build(quests: &[Quest]) -> Self {
        let mut map = HashMap::with_capacity(quests.len());
        for quest in quests {
            if let Some(previous) = map.insert(quest.name.clone(), quest.id.clone()) {
                warn!(
                    "Duplicate quest name {:?}: {} replaces {} in the name index",
                    quest.name, quest.id, previous
                );
            }
        }
        Self { map }
    }

    fn resolve(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

}

/// A record that didn't make it into the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarantinedRecord {
    /// Position in the source array
    pub index: usize,
    pub id: Option<String>,
    pub reason: String,
}

/// What happened while loading a catalog
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub accepted: usize,
    pub quarantined: Vec<QuarantinedRecord>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.quarantined.is_empty()
    }
}

/// The immutable quest catalog
#[derive(Debug, Clone, Default)]
pub struct QuestRepository {
    quests: Vec<Quest>,
    by_id: HashMap<String, usize>,
    names: NameIndex,
}

impl QuestRepository {
    /// Build from already-validated quests. Duplicate ids keep the first record.
    pub fn from_quests(quests: Vec<Quest>) -> Self {
        let mut seen = HashSet::new();
        let quests: Vec<Quest> = quests
            .into_iter()
            .filter(|q| seen.insert(q.id.clone()))
            .collect();

        let by_id = quests
            .iter()
            .enumerate()
            .map(|(i, q)| (q.id.clone(), i))
            .collect();
        let names = NameIndex::build(&quests);

        Self {
            quests,
            by_id,
            names,
        }
    }

    /// Read and validate the whole catalog from a source
    pub async fn load(source: &dyn CatalogSource) -> Result<(Self, LoadReport)> {
        info!("Loading quest catalog from {}", source.describe());
        let document = source.fetch().await?;
        Self::parse(&document)
    }

    /// Like `load`, but gives up after `timeout`
    pub async fn load_with_timeout(
        source: &dyn CatalogSource,
        timeout: Duration,
    ) -> Result<(Self, LoadReport)> {
        tokio::time::timeout(timeout, Self::load(source))
            .await
            .map_err(|_| Error::Timeout(timeout.as_secs()))?
    }

    /// Parse a catalog document: a JSON array of quest records
    ///
    /// The array itself must parse or the whole load fails. Individual
    /// records that don't fit the schema are quarantined and reported.
    pub fn parse(document: &str) -> Result<(Self, LoadReport)> {
        let records: Vec<serde_json::Value> = serde_json::from_str(document)
            .map_err(|e| Error::InvalidCatalog(format!("expected a JSON array of quests: {}", e)))?;

        let mut report = LoadReport::default();
        let mut seen_ids = HashSet::new();
        let mut quests = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            let raw_id = record
                .get("id")
                .and_then(|v| v.as_str())
                .map(str::to_string);

            match validate_record(record) {
                Ok(quest) => {
                    if !seen_ids.insert(quest.id.clone()) {
                        report.quarantined.push(QuarantinedRecord {
                            index,
                            id: Some(quest.id),
                            reason: "duplicate id".to_string(),
                        });
                        continue;
                    }
                    quests.push(quest);
                }
                Err(reason) => report.quarantined.push(QuarantinedRecord {
                    index,
                    id: raw_id,
                    reason,
                }),
            }
        }

        for q in &report.quarantined {
            warn!(
                "Quarantined catalog record #{} ({}): {}",
                q.index,
                q.id.as_deref().unwrap_or("no id"),
                q.reason
            );
        }

        report.accepted = quests.len();
        info!(
            "Catalog ready: {} quests, {} quarantined",
            report.accepted,
            report.quarantined.len()
        );

        Ok((Self::from_quests(quests), report))
    }

    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    pub fn get(&self, id: &str) -> Option<&Quest> {
        self.by_id.get(id).map(|&i| &self.quests[i])
    }

    pub fn id_for_name(&self, name: &str) -> Option<&str> {
        self.names.resolve(name)
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }

    /// Distinct trader names in sidebar order. Traders missing from
    /// `TRADERS` go last, in order of first appearance.
    pub fn traders(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut traders: Vec<&str> = self
            .quests
            .iter()
            .map(Quest::trader_name)
            .filter(|name| seen.insert(*name))
            .collect();
        traders.sort_by_key(|name| {
            TRADERS
                .iter()
                .position(|known| known == name)
                .unwrap_or(TRADERS.len())
        });
        traders
    }
}

fn validate_record(record: serde_json::Value) -> std::result::Result<Quest, String> {
    let mut quest: Quest = serde_json::from_value(record).map_err(|e| e.to_string())?;

    if quest.id.trim().is_empty() {
        return Err("empty id".to_string());
    }
    if quest.name.trim().is_empty() {
        return Err("empty name".to_string());
    }
    if quest.min_player_level == 0 {
        debug!("Quest {} has minPlayerLevel 0, treating as 1", quest.id);
        quest.min_player_level = 1;
    }

    Ok(quest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str) -> String {
        format!(
            r#"{{"id":"{}","name":"{}","trader":{{"name":"Prapor"}},"minPlayerLevel":1,
                "kappaRequired":false,"lightkeeperRequired":false}}"#,
            id, name
        )
    }

    #[test]
    fn test_parse_keeps_catalog_order() {
        let doc = format!("[{},{},{}]", record("1", "A"), record("2", "B"), record("3", "C"));
        let (repo, report) = QuestRepository::parse(&doc).unwrap();

        let ids: Vec<&str> = repo.quests().iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(report.accepted, 3);
        assert!(report.is_clean());
        assert_eq!(repo.id_for_name("B"), Some("2"));
        assert_eq!(repo.get("3").map(|q| q.name.as_str()), Some("C"));
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let err = QuestRepository::parse(r#"{"quests": []}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidCatalog(_)));

        assert!(QuestRepository::parse("{not json").is_err());
    }

    #[test]
    fn test_parse_quarantines_bad_records() {
        let doc = format!(
            r#"[{}, {{"id":"broken","name":"No trader","minPlayerLevel":1}}, {}, {}, 42]"#,
            record("1", "A"),
            record("", "Empty id"),
            record("1", "Dup of A"),
        );
        let (repo, report) = QuestRepository::parse(&doc).unwrap();

        assert_eq!(repo.len(), 1);
        assert_eq!(report.accepted, 1);
        assert_eq!(report.quarantined.len(), 4);
        assert_eq!(report.quarantined[0].id.as_deref(), Some("broken"));
        assert_eq!(report.quarantined[2].reason, "duplicate id");
        assert_eq!(report.quarantined[3].id, None);
    }

    #[test]
    fn test_level_zero_is_clamped() {
        let doc = r#"[{"id":"1","name":"A","trader":{"name":"Fence"},"minPlayerLevel":0,
            "kappaRequired":false,"lightkeeperRequired":false}]"#;
        let (repo, _) = QuestRepository::parse(doc).unwrap();
        assert_eq!(repo.quests()[0].min_player_level, 1);
    }

    #[test]
    fn test_name_index_last_wins() {
        let doc = format!("[{},{}]", record("1", "Same"), record("2", "Same"));
        let (repo, _) = QuestRepository::parse(&doc).unwrap();
        assert_eq!(repo.id_for_name("Same"), Some("2"));
        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn test_traders_in_sidebar_order() {
        let doc = r#"[
            {"id":"1","name":"A","trader":{"name":"Skier"},"minPlayerLevel":1,"kappaRequired":false,"lightkeeperRequired":false},
            {"id":"2","name":"B","trader":{"name":"Arena Host"},"minPlayerLevel":1,"kappaRequired":false,"lightkeeperRequired":false},
            {"id":"3","name":"C","trader":{"name":"Prapor"},"minPlayerLevel":1,"kappaRequired":false,"lightkeeperRequired":false},
            {"id":"4","name":"D","trader":{"name":"Skier"},"minPlayerLevel":1,"kappaRequired":false,"lightkeeperRequired":false}
        ]"#;
        let (repo, _) = QuestRepository::parse(doc).unwrap();
        assert_eq!(repo.traders(), vec!["Prapor", "Skier", "Arena Host"]);
    }

    #[test]
    fn test_location_parse() {
        assert_eq!(
            CatalogLocation::parse("https://example.com/q.json"),
            CatalogLocation::Url("https://example.com/q.json".to_string())
        );
        assert_eq!(
            CatalogLocation::parse("./quests_updated.json"),
            CatalogLocation::Path(PathBuf::from("./quests_updated.json"))
        );
    }

    #[tokio::test]
    async fn test_load_from_source() {
        let doc = format!("[{}]", record("1", "A"));
        let mut source = MockCatalogSource::new();
        source.expect_describe().return_const("mock".to_string());
        source.expect_fetch().times(1).returning(move || Ok(doc.clone()));

        let (repo, report) = QuestRepository::load(&source).await.unwrap();
        assert_eq!(repo.len(), 1);
        assert_eq!(report.accepted, 1);
    }

    #[tokio::test]
    async fn test_load_failure_is_an_error_not_a_panic() {
        let mut source = MockCatalogSource::new();
        source.expect_describe().return_const("mock".to_string());
        source
            .expect_fetch()
            .returning(|| Err(Error::CatalogLoad("Status 404".to_string())));

        let err = QuestRepository::load(&source).await.unwrap_err();
        assert!(matches!(err, Error::CatalogLoad(_)));
    }

    struct SlowSource(Duration);

    #[async_trait]
    impl CatalogSource for SlowSource {
        async fn fetch(&self) -> Result<String> {
            tokio::time::sleep(self.0).await;
            Ok("[]".to_string())
        }

        fn describe(&self) -> String {
            "slow".to_string()
        }
    }

    #[tokio::test]
    async fn test_slow_source_times_out() {
        let source = SlowSource(Duration::from_millis(500));
        let err = QuestRepository::load_with_timeout(&source, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
    }

    #[tokio::test]
    async fn test_source_within_timeout_loads() {
        let source = SlowSource(Duration::from_millis(5));
        let (repo, _) = QuestRepository::load_with_timeout(&source, Duration::from_secs(5))
            .await
            .unwrap();
        assert!(repo.is_empty());
    }
}
