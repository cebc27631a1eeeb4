// TUI application state and event handling
use questlog_core::{
    catalog::LoadReport,
    collector_stat, compute_stats,
    constants::COLLECTOR_ITEMS,
    list_quests, trader_breakdown, Config, EligibilityEngine, GateRule, ProgressTracker,
    QueryCriteria, Quest, QuestRepository, QuestStatus, Stat, Stats, TraderBreakdown,
    TraderFilter,
};
use ratatui::widgets::ListState;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,       // Navigating the list
    Searching,    // Typing in search box
    Reporting,    // Writing a bug report
    ConfirmReset, // Wipe safeguard is up
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Quests,
    Stash,
}

/// Catalog lifecycle for the session
#[derive(Debug)]
pub enum CatalogState {
    Loading,
    Ready(QuestRepository),
    Failed(String),
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub view: View,
    pub catalog: CatalogState,
    pub criteria: QueryCriteria,
    pub selected_index: usize,
    pub list_state: ListState,
    pub stash_index: usize,
    pub stash_state: ListState,
    pub report_input: String,
    pub status_message: Option<String>,
    pub error_message: Option<String>,
    tracker: ProgressTracker,
    gates: Vec<GateRule>,
    reporting_enabled: bool,
    report_pending: bool,
    // 0 is "All", then trader_options() in order
    trader_cursor: usize,
    // Ids of the quests on screen, in display order
    visible: Vec<String>,
    view_revision: Option<u64>,
    view_dirty: bool,
    rebuilds: u64,
}

impl App {
    pub fn new(tracker: ProgressTracker, config: &Config) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        let mut stash_state = ListState::default();
        stash_state.select(Some(0));

        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            view: View::Quests,
            catalog: CatalogState::Loading,
            criteria: QueryCriteria {
                mode: config.filters.default_mode,
                track_policy: config.filters.track_policy,
                order: config.filters.sort,
                ..Default::default()
            },
            selected_index: 0,
            list_state,
            stash_index: 0,
            stash_state,
            report_input: String::new(),
            status_message: None,
            error_message: None,
            tracker,
            gates: config.eligibility.gates.clone(),
            reporting_enabled: config.report.webhook_url.is_some(),
            report_pending: false,
            trader_cursor: 0,
            visible: Vec::new(),
            view_revision: None,
            view_dirty: true,
            rebuilds: 0,
        }
    }

    pub fn begin_loading(&mut self) {
        self.catalog = CatalogState::Loading;
        self.error_message = None;
    }

    /// Take the result of a catalog load. Persistence only switches on
    /// once a catalog is actually here.
    pub fn catalog_loaded(&mut self, result: questlog_core::Result<(QuestRepository, LoadReport)>) {
        match result {
            Ok((repo, report)) => {
                if !report.is_clean() {
                    self.status_message = Some(format!(
                        "{} catalog records skipped as malformed",
                        report.quarantined.len()
                    ));
                }
                info!("Catalog loaded with {} quests", repo.len());
                self.catalog = CatalogState::Ready(repo);

                if let Err(e) = self.tracker.arm() {
                    warn!("Could not write progress: {}", e);
                    self.error_message = Some(format!("Failed to save progress: {}", e));
                }

                self.view_dirty = true;
                self.refresh_view();
            }
            Err(e) => {
                warn!("Catalog load failed: {}", e);
                self.catalog = CatalogState::Failed(e.to_string());
            }
        }
    }

    pub fn repository(&self) -> Option<&QuestRepository> {
        match &self.catalog {
            CatalogState::Ready(repo) => Some(repo),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.catalog, CatalogState::Loading)
    }

    pub fn load_error(&self) -> Option<&str> {
        match &self.catalog {
            CatalogState::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn engine(&self) -> Option<EligibilityEngine<'_>> {
        self.repository()
            .map(|repo| EligibilityEngine::new(repo, &self.gates))
    }

    pub fn reporting_enabled(&self) -> bool {
        self.reporting_enabled
    }

    /// Rebuild the visible list if the criteria or the progress moved on
    pub fn refresh_view(&mut self) {
        let revision = self.tracker.progress().revision();
        if !self.view_dirty && self.view_revision == Some(revision) {
            return;
        }

        let ids: Vec<String> = match self.repository() {
            Some(repo) => {
                let engine = EligibilityEngine::new(repo, &self.gates);
                list_quests(repo, &engine, self.tracker.progress(), &self.criteria)
                    .into_iter()
                    .map(|q| q.id.clone())
                    .collect()
            }
            None => Vec::new(),
        };

        self.visible = ids;
        self.view_revision = Some(revision);
        self.view_dirty = false;
        self.rebuilds += 1;

        if self.selected_index >= self.visible.len() {
            self.selected_index = self.visible.len().saturating_sub(1);
        }
        self.list_state.select(Some(self.selected_index));
    }

    /// How many times the list was rebuilt; lets tests see the invalidation
    pub fn view_rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn visible_quests(&self) -> Vec<&Quest> {
        match self.repository() {
            Some(repo) => self.visible.iter().filter_map(|id| repo.get(id)).collect(),
            None => Vec::new(),
        }
    }

    pub fn selected_quest(&self) -> Option<&Quest> {
        let id = self.visible.get(self.selected_index)?;
        self.repository()?.get(id)
    }

    pub fn quest_status(&self, quest: &Quest) -> QuestStatus {
        match self.engine() {
            Some(engine) => engine.status(quest, self.tracker.progress()),
            None => QuestStatus::Locked,
        }
    }

    pub fn unmet_requirements(&self, quest: &Quest) -> Vec<String> {
        self.engine()
            .map(|engine| engine.unmet_requirements(quest, self.tracker.progress()))
            .unwrap_or_default()
    }

    /// Flip the selected quest. Locked quests can't be ticked off from here.
    pub fn toggle_selected_quest(&mut self) {
        let Some((id, name, status, unmet)) = self.selected_quest().map(|q| {
            (
                q.id.clone(),
                q.name.clone(),
                self.quest_status(q),
                self.unmet_requirements(q),
            )
        }) else {
            return;
        };

        if status == QuestStatus::Locked {
            self.status_message = Some(format!("{} is locked: needs {}", name, unmet.join(", ")));
            return;
        }

        match self.tracker.toggle_quest_completed(&id) {
            Ok(true) => self.status_message = Some(format!("Completed {}", name)),
            Ok(false) => self.status_message = Some(format!("Reopened {}", name)),
            Err(e) => self.error_message = Some(format!("Failed to save progress: {}", e)),
        }
        self.refresh_view();
    }

    pub fn selected_item(&self) -> Option<&'static str> {
        COLLECTOR_ITEMS.get(self.stash_index).copied()
    }

    pub fn is_item_found(&self, item: &str) -> bool {
        self.tracker.progress().is_found(item)
    }

    pub fn toggle_selected_item(&mut self) {
        let Some(item) = self.selected_item() else {
            return;
        };

        if let Err(e) = self.tracker.toggle_collector_item_found(item) {
            self.error_message = Some(format!("Failed to save progress: {}", e));
        }
    }

    pub fn next(&mut self) {
        match self.view {
            View::Quests => {
                if !self.visible.is_empty() {
                    self.selected_index = (self.selected_index + 1).min(self.visible.len() - 1);
                    self.list_state.select(Some(self.selected_index));
                }
            }
            View::Stash => {
                self.stash_index = (self.stash_index + 1).min(COLLECTOR_ITEMS.len() - 1);
                self.stash_state.select(Some(self.stash_index));
            }
        }
    }

    pub fn previous(&mut self) {
        match self.view {
            View::Quests => {
                self.selected_index = self.selected_index.saturating_sub(1);
                self.list_state.select(Some(self.selected_index));
            }
            View::Stash => {
                self.stash_index = self.stash_index.saturating_sub(1);
                self.stash_state.select(Some(self.stash_index));
            }
        }
    }

    pub fn toggle_view(&mut self) {
        self.view = match self.view {
            View::Quests => View::Stash,
            View::Stash => View::Quests,
        };
    }

    /// Traders that actually have quests, in sidebar order
    pub fn trader_options(&self) -> Vec<&str> {
        self.repository()
            .map(QuestRepository::traders)
            .unwrap_or_default()
    }

    pub fn cycle_trader(&mut self, forward: bool) {
        let traders: Vec<String> = self
            .trader_options()
            .into_iter()
            .map(str::to_string)
            .collect();
        let options = traders.len() + 1;
        self.trader_cursor = if forward {
            (self.trader_cursor + 1) % options
        } else {
            (self.trader_cursor + options - 1) % options
        };

        self.criteria.trader = match self.trader_cursor {
            0 => TraderFilter::All,
            i => TraderFilter::Named(traders[i - 1].clone()),
        };
        self.view = View::Quests;
        self.mark_dirty();
    }

    pub fn cycle_mode(&mut self) {
        self.criteria.mode = self.criteria.mode.next();
        self.mark_dirty();
    }

    pub fn cycle_sort(&mut self) {
        self.criteria.order = self.criteria.order.next();
        self.mark_dirty();
    }

    pub fn push_search_char(&mut self, c: char) {
        self.criteria.search.push(c);
        self.mark_dirty();
    }

    pub fn pop_search_char(&mut self) {
        self.criteria.search.pop();
        self.mark_dirty();
    }

    fn mark_dirty(&mut self) {
        self.view_dirty = true;
        self.selected_index = 0;
        self.refresh_view();
    }

    pub fn enter_search_mode(&mut self) {
        self.input_mode = InputMode::Searching;
        self.view = View::Quests;
    }

    pub fn enter_normal_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// First step of the wipe; nothing happens until confirmed
    pub fn request_reset(&mut self) {
        self.input_mode = InputMode::ConfirmReset;
    }

    pub fn confirm_reset(&mut self) {
        if self.input_mode != InputMode::ConfirmReset {
            return;
        }

        match self.tracker.reset_all() {
            Ok(()) => self.status_message = Some("Progress wiped".to_string()),
            Err(e) => self.error_message = Some(format!("Failed to wipe progress: {}", e)),
        }
        self.input_mode = InputMode::Normal;
        self.refresh_view();
    }

    pub fn cancel_reset(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn enter_report_mode(&mut self) {
        if self.report_pending {
            self.status_message = Some("Still sending the last report".to_string());
        } else if self.reporting_enabled {
            self.input_mode = InputMode::Reporting;
        } else {
            self.status_message =
                Some("Bug reports are off: set report.webhook_url in config".to_string());
        }
    }

    /// Hand back the report text to send. Blank input keeps the box open.
    pub fn submit_report(&mut self) -> Option<String> {
        let text = self.report_input.trim().to_string();
        if text.is_empty() {
            return None;
        }

        self.report_input.clear();
        self.input_mode = InputMode::Normal;
        Some(text)
    }

    /// The report POST runs on its own task until `report_finished`
    pub fn report_started(&mut self) {
        self.report_pending = true;
        self.error_message = None;
        self.status_message = Some("Sending report...".to_string());
    }

    pub fn is_report_pending(&self) -> bool {
        self.report_pending
    }

    pub fn report_finished(&mut self, result: Result<(), String>) {
        self.report_pending = false;
        match result {
            Ok(()) => self.status_message = Some("Report sent, thanks".to_string()),
            Err(e) => self.error_message = Some(format!("Report failed to send: {}", e)),
        }
    }

    pub fn cancel_report(&mut self) {
        self.report_input.clear();
        self.input_mode = InputMode::Normal;
    }

    pub fn clear_messages(&mut self) {
        self.status_message = self
            .report_pending
            .then(|| "Sending report...".to_string());
        self.error_message = None;
    }

    pub fn selected_wiki_link(&self) -> Option<String> {
        self.selected_quest().and_then(|q| q.wiki_link.clone())
    }

    pub fn stats(&self) -> Stats {
        match self.repository() {
            Some(repo) => compute_stats(repo, self.tracker.progress()),
            None => Stats::default(),
        }
    }

    pub fn collector_stat(&self) -> Stat {
        collector_stat(self.tracker.progress())
    }

    /// Breakdown for the selected trader; None when showing all traders
    pub fn trader_breakdown(&self) -> Option<TraderBreakdown> {
        let TraderFilter::Named(trader) = &self.criteria.trader else {
            return None;
        };
        let repo = self.repository()?;
        let engine = EligibilityEngine::new(repo, &self.gates);
        Some(trader_breakdown(repo, &engine, self.tracker.progress(), trader))
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}
