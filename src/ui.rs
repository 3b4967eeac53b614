use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use village_nird::badges::{self, BadgeId};

use crate::app::{App, GameState, Journey, MenuOption};

pub fn draw_ui(f: &mut Frame, app: &App) {
    match app.state {
        GameState::TitleScreen => draw_title_screen(f, app),
        GameState::Badges => draw_badges(f, app),
        _ => draw_game(f, app),
    }

    if let Some(id) = app.session.achievements().recent_badge() {
        draw_badge_popup(f, id);
    }
}

fn draw_game(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(10),
        ])
        .split(f.area());

    draw_status_bar(f, app, chunks[0]);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    let (title, story, options) = screen_text(app);

    let narrative = Paragraph::new(story)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::White));
    f.render_widget(narrative, main_chunks[0]);

    let items: Vec<ListItem> = options.into_iter().map(ListItem::new).collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Your Choice [↑/↓ select | ENTER confirm | Esc menu] "),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("➤ ");
    let mut list_state = ListState::default();
    if app.option_count() > 0 {
        list_state.select(Some(app.cursor));
    }
    f.render_stateful_widget(list, main_chunks[1], &mut list_state);

    let (message_style, message_title) = match app.state {
        GameState::Feedback => (app.message_style, " The Village Speaks "),
        GameState::Summary => (
            Style::default().fg(Color::Black).bg(Color::Green),
            " JOURNEY COMPLETE! ",
        ),
        _ => (app.message_style, " Village Whispers "),
    };
    let message = Paragraph::new(app.message.as_str())
        .block(Block::default().borders(Borders::ALL).title(message_title))
        .wrap(Wrap { trim: false })
        .style(message_style)
        .scroll((app.message_scroll, 0));
    f.render_widget(message, chunks[2]);
}

// (panel title, story text, selectable options)
fn screen_text(app: &App) -> (String, String, Vec<String>) {
    match app.state {
        GameState::Teaser => {
            let teaser = match app.journey {
                Journey::Track(village_nird::Track::Parent) => &app.content.parent.teaser,
                _ => &app.content.student.teaser,
            };
            (
                " The Opening Question ".to_string(),
                teaser.question.clone(),
                teaser.choices.iter().map(|c| c.label.clone()).collect(),
            )
        }
        GameState::Quiz => match app.content.quiz.questions.get(app.quiz_index) {
            Some(question) => (
                format!(
                    " {} ({}/{}) ",
                    app.content.quiz.title,
                    app.quiz_index + 1,
                    app.content.quiz.questions.len()
                ),
                question.prompt.clone(),
                question.options.clone(),
            ),
            None => (" Quiz ".to_string(), String::new(), Vec::new()),
        },
        GameState::Playing => match app.scenario() {
            Some(scenario) => {
                let pillar = scenario
                    .meta
                    .pillar
                    .as_ref()
                    .map(|p| format!("\n\nPillar: {p}"))
                    .unwrap_or_default();
                (
                    format!(" {} ", scenario.meta.title),
                    format!("{}{}", scenario.narrative.intro.trim(), pillar),
                    scenario.choices.iter().map(|c| c.label.clone()).collect(),
                )
            }
            None => (" The Village ".to_string(), String::new(), Vec::new()),
        },
        _ => (" The Village ".to_string(), String::new(), Vec::new()),
    }
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let achievements = app.session.achievements();
    let where_label = match app.state {
        GameState::Quiz => " NIRD quiz ".to_string(),
        _ => format!(
            " {} {}/{} ",
            app.journey.label(),
            (app.current + 1).min(app.scenarios().len()),
            app.scenarios().len()
        ),
    };

    let mut spans = vec![
        Span::styled(
            " VILLAGE NIRD ",
            Style::default().fg(Color::Black).bg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(where_label, Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(
            format!(" XP: {} ", achievements.total_xp()),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("  "),
        Span::styled(
            format!(
                " Badges: {}/{} ",
                achievements.unlocked_badges().len(),
                BadgeId::ALL.len()
            ),
            Style::default().fg(Color::Magenta),
        ),
    ];

    if app.journey == Journey::Village {
        let points = app.session.student().points();
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!(
                " €{} 🛡{} 🌿{} ",
                points.money, points.protection, points.environment
            ),
            Style::default().fg(Color::White).bg(Color::DarkGray),
        ));
    }

    let status =
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(status, area);
}

fn draw_badges(f: &mut Frame, app: &App) {
    let achievements = app.session.achievements();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(4)])
        .split(f.area());

    let items: Vec<ListItem> = badges::all()
        .iter()
        .map(|badge| {
            let unlocked = achievements.has_badge(badge.id);
            let style = if unlocked {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" {} {:<18}", if unlocked { badge.icon } else { "🔒" }, badge.title),
                    style.add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("{:>4} XP  ", badge.xp), style),
                Span::styled(badge.description, style),
            ]))
        })
        .collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Badge Collection [any key to return] "),
    );
    f.render_widget(list, chunks[0]);

    let (have, need) = achievements.capstone_progress();
    let footer = Paragraph::new(format!(
        "Total XP: {}    Village Hero progress: {}/{}",
        achievements.total_xp(),
        have,
        need
    ))
    .block(Block::default().borders(Borders::ALL))
    .style(Style::default().fg(Color::Yellow));
    f.render_widget(footer, chunks[1]);
}

fn draw_badge_popup(f: &mut Frame, id: BadgeId) {
    let badge = id.badge();
    let area = centered(f.area(), 50, 7);
    let text = format!(
        "{}  {}  (+{} XP)\n\n{}",
        badge.icon, badge.title, badge.xp, badge.description
    );
    let popup = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" BADGE UNLOCKED! [any key] "),
        )
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Black).bg(Color::Yellow));
    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn draw_title_screen(f: &mut Frame, app: &App) {
    let area = f.area();

    let title_art = r#"
    ╔═══════════════════════════════════════════════════════════╗
    ║                                                           ║
    ║            ███╗   ██╗██╗██████╗ ██████╗                   ║
    ║            ████╗  ██║██║██╔══██╗██╔══██╗                  ║
    ║            ██╔██╗ ██║██║██████╔╝██║  ██║                  ║
    ║            ██║╚██╗██║██║██╔══██╗██║  ██║                  ║
    ║            ██║ ╚████║██║██║  ██║██████╔╝                  ║
    ║            ╚═╝  ╚═══╝╚═╝╚═╝  ╚═╝╚═════╝                   ║
    ║                                                           ║
    ║          "The village that said no to Big Tech"           ║
    ║                                                           ║
    ╚═══════════════════════════════════════════════════════════╝
"#;

    let mut constraints = vec![Constraint::Length(15)];
    constraints.extend(MenuOption::ALL.iter().map(|_| Constraint::Length(1)));
    constraints.push(Constraint::Length(2));
    constraints.push(Constraint::Min(1));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let title = Paragraph::new(title_art)
        .style(Style::default().fg(Color::Green))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    for (i, option) in MenuOption::ALL.iter().enumerate() {
        let style = if *option == app.menu_selection {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let item = Paragraph::new(format!("  {}  ", option.label()))
            .style(style)
            .alignment(Alignment::Center);
        f.render_widget(item, chunks[1 + i]);
    }

    let footer_index = 1 + MenuOption::ALL.len();
    let note = Paragraph::new(app.message.as_str())
        .style(app.message_style)
        .alignment(Alignment::Center);
    f.render_widget(note, chunks[footer_index]);

    let help = Paragraph::new("↑/↓ to select  •  ENTER to confirm  •  q to quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[footer_index + 1]);
}
