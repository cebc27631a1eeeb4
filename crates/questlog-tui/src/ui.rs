// UI rendering logic
use crate::{App, InputMode, View};
use questlog_core::{constants::COLLECTOR_ITEMS, Quest, QuestStatus, Stat};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Search input
            Constraint::Length(3), // Progress gauges
            Constraint::Min(5),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_search_input(frame, app, chunks[1]);
    render_gauges(frame, app, chunks[2]);

    if app.is_loading() {
        render_loading(frame, chunks[3]);
    } else if let Some(error) = app.load_error() {
        render_load_failed(frame, error, chunks[3]);
    } else {
        // Adaptive split: narrow terminals give the list more room
        let (list_pct, detail_pct) = if frame.area().width < 100 {
            (50, 50)
        } else {
            (45, 55)
        };

        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(list_pct),
                Constraint::Percentage(detail_pct),
            ])
            .split(chunks[3]);

        match app.view {
            View::Quests => {
                render_quest_list(frame, app, content_chunks[0]);
                render_quest_details(frame, app, content_chunks[1]);
            }
            View::Stash => {
                render_stash_list(frame, app, content_chunks[0]);
                render_stash_summary(frame, app, content_chunks[1]);
            }
        }
    }

    let screen = frame.area();
    match app.input_mode {
        InputMode::ConfirmReset => render_reset_popup(frame, screen),
        InputMode::Reporting => render_report_popup(frame, app, screen),
        InputMode::Normal | InputMode::Searching => {}
    }

    render_status_bar(frame, app, chunks[4]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(area);

    let logo = Paragraph::new(Line::from(vec![Span::styled(
        "QuestLog",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(logo, header_chunks[0]);

    let mut spans = vec![
        Span::styled("Mode: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            app.criteria.mode.label(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("Trader: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.criteria.trader.label(), Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled("Sort: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.criteria.order.label(), Style::default().fg(Color::Cyan)),
    ];

    if let Some(breakdown) = app.trader_breakdown() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!(
                "{} done / {} open / {} locked",
                breakdown.completed, breakdown.unlocked, breakdown.locked
            ),
            Style::default().fg(Color::Gray),
        ));
    }

    let filters = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(filters, header_chunks[1]);
}

fn render_search_input(frame: &mut Frame, app: &App, area: Rect) {
    let input_style = match app.input_mode {
        InputMode::Searching => Style::default().fg(Color::Yellow),
        _ => Style::default(),
    };

    let input = Paragraph::new(app.criteria.search.as_str())
        .style(input_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Search (/ to type, ESC to go back)")
                .border_style(input_style),
        );

    frame.render_widget(input, area);

    if app.input_mode == InputMode::Searching {
        frame.set_cursor_position((
            area.x + app.criteria.search.chars().count() as u16 + 1,
            area.y + 1,
        ));
    }
}

fn render_gauges(frame: &mut Frame, app: &App, area: Rect) {
    let stats = app.stats();
    let gauge_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let gauges = [
        ("Overall", stats.overall, Color::Green),
        ("Kappa", stats.kappa, Color::Yellow),
        ("Lightkeeper", stats.lightkeeper, Color::Cyan),
        ("Collector", app.collector_stat(), Color::Magenta),
    ];

    for ((title, stat, color), chunk) in gauges.into_iter().zip(gauge_chunks.iter()) {
        frame.render_widget(stat_gauge(title, stat, color), *chunk);
    }
}

fn stat_gauge(title: &str, stat: Stat, color: Color) -> Gauge<'_> {
    Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .gauge_style(Style::default().fg(color).bg(Color::Black))
        .percent(u16::from(stat.pct))
        .label(format!("{}/{} ({}%)", stat.count, stat.total, stat.pct))
}

fn render_loading(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            "Loading quest catalog...",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )]),
    ];

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" Quests "))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_load_failed(frame: &mut Frame, error: &str, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            "Couldn't load the quest catalog",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(Span::styled(error, Style::default().fg(Color::Gray))),
        Line::from(""),
        Line::from(Span::styled(
            "r: retry | q: quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" Quests "))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn status_style(status: QuestStatus) -> (Color, &'static str) {
    match status {
        QuestStatus::Completed => (Color::DarkGray, "[x]"),
        QuestStatus::Available => (Color::Green, "[ ]"),
        QuestStatus::Locked => (Color::Red, "[-]"),
    }
}

fn render_quest_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let visible = app.visible_quests();
    let title = format!(" Quests ({}) ", visible.len());

    let items: Vec<ListItem> = visible
        .iter()
        .map(|quest| {
            let (color, marker) = status_style(app.quest_status(quest));
            let mut spans = vec![
                Span::styled(format!("{} ", marker), Style::default().fg(color)),
                Span::styled(quest.name.clone(), Style::default().fg(color)),
                Span::styled(
                    format!("  {}", quest.trader_name()),
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            if quest.kappa_required {
                spans.push(Span::styled(" K", Style::default().fg(Color::Yellow)));
            }
            if quest.lightkeeper_required {
                spans.push(Span::styled(" LK", Style::default().fg(Color::Cyan)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let empty = items.is_empty();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    if empty {
        let paragraph = Paragraph::new("No quests match the current filters")
            .block(Block::default().borders(Borders::ALL).title(" Quests (0) "))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
        return;
    }

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_quest_details(frame: &mut Frame, app: &App, area: Rect) {
    let Some(quest) = app.selected_quest() else {
        let paragraph = Paragraph::new("Nothing selected")
            .block(Block::default().borders(Borders::ALL).title(" Details "));
        frame.render_widget(paragraph, area);
        return;
    };

    let paragraph = Paragraph::new(quest_detail_lines(app, quest))
        .block(Block::default().borders(Borders::ALL).title(" Details "))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn quest_detail_lines<'a>(app: &App, quest: &'a Quest) -> Vec<Line<'a>> {
    let status = app.quest_status(quest);
    let (color, _) = status_style(status);
    let label = Style::default().fg(Color::DarkGray);

    let mut lines = vec![
        Line::from(Span::styled(
            quest.name.as_str(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Trader: ", label),
            Span::raw(quest.trader_name()),
            Span::styled("  Level: ", label),
            Span::raw(quest.min_player_level.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Status: ", label),
            Span::styled(status.label(), Style::default().fg(color)),
        ]),
    ];

    let mut tags = Vec::new();
    if quest.kappa_required {
        tags.push(Span::styled("Kappa ", Style::default().fg(Color::Yellow)));
    }
    if quest.lightkeeper_required {
        tags.push(Span::styled("Lightkeeper ", Style::default().fg(Color::Cyan)));
    }
    if let Some(xp) = quest.experience {
        tags.push(Span::styled(format!("{} XP", xp), Style::default().fg(Color::Green)));
    }
    if !tags.is_empty() {
        lines.push(Line::from(tags));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Requires", label)));
    if quest.has_requirements() {
        let unmet = app.unmet_requirements(quest);
        for name in quest.requirement_names() {
            let (mark, color) = if unmet.iter().any(|u| u == name) {
                ("  x ", Color::Red)
            } else {
                ("  v ", Color::Green)
            };
            lines.push(Line::from(vec![
                Span::styled(mark, Style::default().fg(color)),
                Span::raw(name.to_string()),
            ]));
        }
        // Gates show up in unmet without being in the requirement list
        for name in unmet
            .iter()
            .filter(|u| !quest.requirement_names().any(|r| r == u.as_str()))
        {
            lines.push(Line::from(vec![
                Span::styled("  x ", Style::default().fg(Color::Red)),
                Span::raw(name.clone()),
            ]));
        }
    } else {
        lines.push(Line::from(Span::raw("  nothing")));
    }

    if !quest.objectives.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Objectives", label)));
        for objective in &quest.objectives {
            let mut text = format!("  - {}", objective.description);
            if objective.found_in_raid == Some(true) {
                text.push_str(" (FiR)");
            }
            lines.push(Line::from(text));
        }
    }

    if !quest.reward_items().is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Rewards", label)));
        for reward in quest.reward_items() {
            lines.push(Line::from(format!("  {} x{}", reward.item.name, reward.count)));
        }
    }

    if let Some(link) = &quest.wiki_link {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Wiki: ", label),
            Span::styled(link.as_str(), Style::default().fg(Color::Blue)),
        ]));
    }

    lines
}

fn render_stash_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let items: Vec<ListItem> = COLLECTOR_ITEMS
        .iter()
        .map(|item| {
            let (marker, color) = if app.is_item_found(item) {
                ("[x] ", Color::Green)
            } else {
                ("[ ] ", Color::Gray)
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(color)),
                Span::styled(*item, Style::default().fg(color)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Collector Stash "),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.stash_state);
}

fn render_stash_summary(frame: &mut Frame, app: &App, area: Rect) {
    let stat = app.collector_stat();
    let remaining = stat.total - stat.count;

    let text = vec![
        Line::from(Span::styled(
            "Collector items",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("Found: {} of {}", stat.count, stat.total)),
        Line::from(format!("Still missing: {}", remaining)),
        Line::from(""),
        Line::from(Span::styled(
            "space: mark found | TAB: back to quests",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" Stash "))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_reset_popup(frame: &mut Frame, area: Rect) {
    let popup = centered_rect(50, 7, area);
    frame.render_widget(Clear, popup);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Wipe all quest and stash progress?",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from("This can't be undone."),
        Line::from(""),
        Line::from(Span::styled("y: wipe | n: cancel", Style::default().fg(Color::DarkGray))),
    ];

    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Reset ")
                .border_style(Style::default().fg(Color::Red)),
        );
    frame.render_widget(paragraph, popup);
}

fn render_report_popup(frame: &mut Frame, app: &App, area: Rect) {
    let popup = centered_rect(70, 8, area);
    frame.render_widget(Clear, popup);

    let text = vec![
        Line::from(Span::styled(
            "Describe what went wrong:",
            Style::default().fg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw(app.report_input.as_str()),
            Span::styled("_", Style::default().fg(Color::Yellow)),
        ]),
    ];

    let paragraph = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Bug Report (ENTER: send, ESC: cancel) ")
                .border_style(Style::default().fg(Color::Yellow)),
        );
    frame.render_widget(paragraph, popup);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = if let Some(error) = &app.error_message {
        Span::styled(error.as_str(), Style::default().fg(Color::Red))
    } else if let Some(message) = &app.status_message {
        Span::styled(message.as_str(), Style::default().fg(Color::Green))
    } else {
        match app.input_mode {
            InputMode::Searching => Span::styled(
                "SEARCH | type to filter | ENTER/ESC: done",
                Style::default().fg(Color::Yellow),
            ),
            InputMode::ConfirmReset => {
                Span::styled("RESET | y: confirm | n: cancel", Style::default().fg(Color::Red))
            }
            InputMode::Reporting => Span::styled(
                "REPORT | ENTER: send | ESC: cancel",
                Style::default().fg(Color::Yellow),
            ),
            InputMode::Normal => match app.view {
                View::Quests => Span::raw(
                    "j/k: navigate | space: toggle | /: search | t/T: trader | m: mode | s: sort | TAB: stash | ENTER: wiki | R: reset | !: report | q: quit",
                ),
                View::Stash => Span::raw("j/k: navigate | space: found | TAB: quests | q: quit"),
            },
        }
    };

    let paragraph = Paragraph::new(Line::from(status));
    frame.render_widget(paragraph, area);
}
