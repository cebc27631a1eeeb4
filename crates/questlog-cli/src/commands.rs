// Headless subcommands: same engine as the TUI, printed to stdout
use anyhow::bail;
use questlog_core::{
    collector_stat, compute_stats,
    constants::COLLECTOR_ITEMS,
    list_quests, trader_breakdown, CatalogLocation, Config, EligibilityEngine, GateRule,
    ProgressTracker, QueryCriteria, Quest, QuestRepository, QuestStatus, Stat, Stats,
    TraderBreakdown,
};
use serde::Serialize;
use tracing::warn;

/// A loaded catalog plus the player's progress
pub struct Session {
    repo: QuestRepository,
    tracker: ProgressTracker,
    gates: Vec<GateRule>,
    defaults: QueryCriteria,
}

impl Session {
    pub async fn open(config: &Config, tracker: ProgressTracker) -> anyhow::Result<Self> {
        let source =
            CatalogLocation::parse(&config.catalog.source).into_source(config.catalog_timeout())?;
        let (repo, report) =
            QuestRepository::load_with_timeout(source.as_ref(), config.catalog_timeout()).await?;
        if !report.is_clean() {
            warn!("{} catalog records skipped", report.quarantined.len());
        }

        Self::new(repo, tracker, config)
    }

    /// Persistence is armed here, after the catalog is in
    pub fn new(
        repo: QuestRepository,
        mut tracker: ProgressTracker,
        config: &Config,
    ) -> anyhow::Result<Self> {
        tracker.arm()?;
        Ok(Self {
            repo,
            tracker,
            gates: config.eligibility.gates.clone(),
            defaults: QueryCriteria {
                mode: config.filters.default_mode,
                track_policy: config.filters.track_policy,
                order: config.filters.sort,
                ..Default::default()
            },
        })
    }

    pub fn default_criteria(&self) -> QueryCriteria {
        self.defaults.clone()
    }

    fn engine(&self) -> EligibilityEngine<'_> {
        EligibilityEngine::new(&self.repo, &self.gates)
    }

    /// Look a quest up by id first, then by exact name
    fn resolve(&self, key: &str) -> Option<&Quest> {
        self.repo
            .get(key)
            .or_else(|| self.repo.id_for_name(key).and_then(|id| self.repo.get(id)))
    }
}

#[derive(Serialize)]
struct ListedQuest<'a> {
    id: &'a str,
    name: &'a str,
    trader: &'a str,
    status: &'static str,
    kappa_required: bool,
    lightkeeper_required: bool,
}

pub fn render_list(session: &Session, criteria: &QueryCriteria, json: bool) -> anyhow::Result<String> {
    let engine = session.engine();
    let progress = session.tracker.progress();
    let quests = list_quests(&session.repo, &engine, progress, criteria);

    if json {
        let rows: Vec<ListedQuest> = quests
            .iter()
            .map(|q| ListedQuest {
                id: &q.id,
                name: &q.name,
                trader: q.trader_name(),
                status: engine.status(q, progress).label(),
                kappa_required: q.kappa_required,
                lightkeeper_required: q.lightkeeper_required,
            })
            .collect();
        return Ok(serde_json::to_string_pretty(&rows)?);
    }

    let mut out = String::new();
    for quest in &quests {
        let marker = match engine.status(quest, progress) {
            QuestStatus::Completed => "[x]",
            QuestStatus::Available => "[ ]",
            QuestStatus::Locked => "[-]",
        };
        out.push_str(&format!(
            "{} {:<40} {:<12} {}\n",
            marker,
            quest.name,
            quest.trader_name(),
            quest.id
        ));
    }
    out.push_str(&format!("{} quests\n", quests.len()));
    Ok(out)
}

pub fn list(session: &Session, criteria: &QueryCriteria, json: bool) -> anyhow::Result<()> {
    print!("{}", render_list(session, criteria, json)?);
    Ok(())
}

#[derive(Serialize)]
struct StatsReport<'a> {
    #[serde(flatten)]
    stats: Stats,
    collector: Stat,
    traders: Vec<(&'a str, TraderBreakdown)>,
}

pub fn render_stats(session: &Session, json: bool) -> anyhow::Result<String> {
    let progress = session.tracker.progress();
    let engine = session.engine();
    let report = StatsReport {
        stats: compute_stats(&session.repo, progress),
        collector: collector_stat(progress),
        traders: session
            .repo
            .traders()
            .into_iter()
            .map(|t| (t, trader_breakdown(&session.repo, &engine, progress, t)))
            .collect(),
    };

    if json {
        return Ok(serde_json::to_string_pretty(&report)?);
    }

    let line = |label: &str, stat: Stat| {
        format!("{:<12} {:>4}/{:<4} {:>3}%\n", label, stat.count, stat.total, stat.pct)
    };

    let mut out = String::new();
    out.push_str(&line("Overall", report.stats.overall));
    out.push_str(&line("Kappa", report.stats.kappa));
    out.push_str(&line("Lightkeeper", report.stats.lightkeeper));
    out.push_str(&line("Collector", report.collector));
    out.push('\n');
    for (trader, b) in &report.traders {
        out.push_str(&format!(
            "{:<12} {:>3} total  {:>3} done  {:>3} open  {:>3} locked\n",
            trader, b.total, b.completed, b.unlocked, b.locked
        ));
    }
    Ok(out)
}

pub fn stats(session: &Session, json: bool) -> anyhow::Result<()> {
    print!("{}", render_stats(session, json)?);
    Ok(())
}

/// Returns whether the quest is now completed
pub fn toggle_quest(session: &mut Session, key: &str) -> anyhow::Result<(String, bool)> {
    let Some(quest) = session.resolve(key) else {
        bail!("No quest with id or name '{}'", key);
    };
    let (id, name) = (quest.id.clone(), quest.name.clone());

    let engine = session.engine();
    if engine.status(quest, session.tracker.progress()) == QuestStatus::Locked {
        let unmet = engine.unmet_requirements(quest, session.tracker.progress());
        bail!("{} is locked: needs {}", name, unmet.join(", "));
    }

    let done = session.tracker.toggle_quest_completed(&id)?;
    Ok((name, done))
}

pub fn toggle(session: &mut Session, key: &str) -> anyhow::Result<()> {
    let (name, done) = toggle_quest(session, key)?;
    if done {
        println!("Completed {}", name);
    } else {
        println!("Reopened {}", name);
    }
    Ok(())
}

/// Case-insensitive match against the known collector items
pub fn find_item(session: &mut Session, item: &str) -> anyhow::Result<(&'static str, bool)> {
    let Some(known) = COLLECTOR_ITEMS
        .iter()
        .find(|known| known.eq_ignore_ascii_case(item.trim()))
    else {
        bail!("'{}' is not a collector item", item);
    };

    let found = session.tracker.toggle_collector_item_found(known)?;
    Ok((*known, found))
}

pub fn find(session: &mut Session, item: &str) -> anyhow::Result<()> {
    let (name, found) = find_item(session, item)?;
    let stat = collector_stat(session.tracker.progress());
    println!(
        "{} {} ({}/{})",
        name,
        if found { "found" } else { "unmarked" },
        stat.count,
        stat.total
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use questlog_cache::{KeyValueStore, MemoryStore};
    use questlog_core::constants::{PROGRESS_KEY, STASH_KEY};
    use questlog_core::FilterMode;

    const CATALOG: &str = r#"[
        {"id":"col","name":"Collector","trader":{"name":"Fence"},"minPlayerLevel":1,
         "kappaRequired":true,"lightkeeperRequired":false},
        {"id":"nb","name":"New Beginnings","trader":{"name":"Fence"},"minPlayerLevel":1,
         "kappaRequired":false,"lightkeeperRequired":false},
        {"id":"deb","name":"Debut","trader":{"name":"Prapor"},"minPlayerLevel":1,
         "kappaRequired":true,"lightkeeperRequired":false}
    ]"#;

    fn session(store: &MemoryStore) -> Session {
        let (repo, _) = QuestRepository::parse(CATALOG).unwrap();
        let tracker = ProgressTracker::load(Box::new(store.clone()));
        Session::new(repo, tracker, &Config::default()).unwrap()
    }

    #[test]
    fn test_gated_quest_refuses_toggle_until_collector_done() {
        let store = MemoryStore::new();
        let mut session = session(&store);

        let err = toggle_quest(&mut session, "New Beginnings").unwrap_err();
        assert!(err.to_string().contains("Collector"));

        assert_eq!(toggle_quest(&mut session, "col").unwrap(), ("Collector".to_string(), true));
        assert_eq!(
            toggle_quest(&mut session, "nb").unwrap(),
            ("New Beginnings".to_string(), true)
        );

        let saved = store.get(PROGRESS_KEY).unwrap().unwrap();
        assert_eq!(saved, r#"["col","nb"]"#);
    }

    #[test]
    fn test_unknown_quest_is_an_error() {
        let mut session = session(&MemoryStore::new());
        assert!(toggle_quest(&mut session, "nope").is_err());
    }

    #[test]
    fn test_find_matches_item_names_loosely() {
        let store = MemoryStore::new();
        let mut session = session(&store);

        let (name, found) = find_item(&mut session, "  golden EGG ").unwrap();
        assert_eq!(name, "Golden egg");
        assert!(found);
        assert_eq!(store.get(STASH_KEY).unwrap().as_deref(), Some(r#"["Golden egg"]"#));

        assert!(find_item(&mut session, "Rusty bolt").is_err());
    }

    #[test]
    fn test_list_text_and_json() {
        let session = session(&MemoryStore::new());
        let mut criteria = session.default_criteria();
        criteria.mode = FilterMode::ShowAll;

        let text = render_list(&session, &criteria, false).unwrap();
        assert!(text.contains("[-] New Beginnings"));
        assert!(text.ends_with("3 quests\n"));

        let json = render_list(&session, &criteria, true).unwrap();
        let rows: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(rows.len(), 3);
        // Locked quests sort after available ones
        assert_eq!(rows[2]["id"], "nb");
        assert_eq!(rows[2]["status"], "Locked");
    }

    #[test]
    fn test_stats_json_shape() {
        let mut session = session(&MemoryStore::new());
        toggle_quest(&mut session, "deb").unwrap();

        let json = render_stats(&session, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["kappa"]["pct"], 50);
        assert_eq!(value["overall"]["count"], 1);
        let traders = value["traders"].as_array().unwrap();
        assert_eq!(traders.len(), 2);
        // Sidebar order, not catalog order
        assert_eq!(traders[0][0], "Prapor");
        assert_eq!(traders[1][0], "Fence");
    }
}
