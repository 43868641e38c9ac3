use super::app::{App, Screen, View};
use super::editor::{Editor, Field};
use super::list::ListView;
use super::login::{LoginField, LoginForm, LoginMode};
use super::notice::{Level, Notice};
use crate::catalog::{display_image, CatalogEntity, Status};
use crate::config::Settings;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn draw(f: &mut Frame, app: &mut App) {
    if app.screen == Screen::Login {
        draw_login(f, &app.login, app.is_demo());
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Status bar
        ])
        .split(f.area());

    draw_tabs(f, app, chunks[0]);
    draw_main(f, app, chunks[1]);
    draw_status_bar(f, app, chunks[2]);
}

fn draw_login(f: &mut Frame, form: &LoginForm, demo: bool) {
    let area = centered_rect(50, 14, f.area());
    f.render_widget(Clear, area);

    let title = if demo {
        format!(" {} (demo: any credentials) ", form.mode.title())
    } else {
        format!(" {} ", form.mode.title())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Username
            Constraint::Length(3), // Password
            Constraint::Length(2), // Message
            Constraint::Min(0),    // Hints
        ])
        .margin(1)
        .split(inner);

    let masked = form.masked_password();
    let inputs = [
        ("Username", form.username.as_str(), LoginField::Username),
        ("Password", masked.as_str(), LoginField::Password),
    ];
    for (i, (label, value, field)) in inputs.iter().enumerate() {
        let focused = form.field == *field;
        let border = if focused { Color::Yellow } else { Color::DarkGray };
        let cursor = if focused && !form.is_busy() { "█" } else { "" };
        let input = Paragraph::new(format!("{}{}", value, cursor)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(format!(" {} ", label)),
        );
        f.render_widget(input, chunks[i]);
    }

    let message = if form.is_busy() {
        Span::styled("Please wait...", Style::default().fg(Color::Yellow))
    } else if let Some(error) = &form.error {
        Span::styled(error.as_str(), Style::default().fg(Color::Red))
    } else if let Some(info) = &form.info {
        Span::styled(info.as_str(), Style::default().fg(Color::Green))
    } else {
        Span::raw("")
    };
    f.render_widget(Paragraph::new(Line::from(message)), chunks[2]);

    let other = match form.mode {
        LoginMode::Login => "F2:Register",
        LoginMode::Register => "F2:Back to login",
    };
    let hints = Paragraph::new(Line::from(Span::styled(
        format!("Enter:Submit  Tab:Field  {}  Esc:Quit", other),
        Style::default().fg(Color::Cyan),
    )));
    f.render_widget(hints, chunks[3]);
}

fn draw_tabs(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::all()
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let num = format!("[{}] ", i + 1);
            let style = if *v == app.current_view {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(vec![
                Span::styled(num, Style::default().fg(Color::DarkGray)),
                Span::styled(v.title(), style),
            ])
        })
        .collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Catalog Admin  [←/→ or 1-4 to switch tabs] "),
        )
        .highlight_style(Style::default().fg(Color::Yellow))
        .select(
            View::all()
                .iter()
                .position(|v| *v == app.current_view)
                .unwrap_or(0),
        );

    f.render_widget(tabs, area);
}

fn draw_main(f: &mut Frame, app: &mut App, area: Rect) {
    let settings = app.settings().clone();
    let view = app.current_view;
    let demo = app.is_demo();
    let Some(ws) = app.workspace.as_mut() else {
        return;
    };
    match view {
        View::Home => draw_home(f, &settings, demo, area),
        View::Categories => draw_list(f, &mut ws.categories, &settings, area),
        View::Subcategories => draw_list(f, &mut ws.subcategories, &settings, area),
        View::Products => draw_list(f, &mut ws.products, &settings, area),
    }
}

fn draw_home(f: &mut Frame, settings: &Settings, demo: bool, area: Rect) {
    let source = if demo {
        "in-process demo store".to_string()
    } else {
        settings.server.clone()
    };
    let text = vec![
        Line::from(Span::styled(
            "Welcome to the catalog admin",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Store: ", Style::default().fg(Color::DarkGray)),
            Span::raw(source),
        ]),
        Line::from(""),
        Line::from("Pick a tab to manage categories, subcategories or products."),
        Line::from("In a list: a add, e edit, d delete, / search, r reload."),
        Line::from("Press L to log out."),
    ];
    let home = Paragraph::new(text).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Home "),
    );
    f.render_widget(home, area);
}

fn draw_list<E: CatalogEntity>(
    f: &mut Frame,
    view: &mut ListView<E>,
    settings: &Settings,
    area: Rect,
) {
    let confirm_height = if view.pending_delete().is_some() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),              // Search
            Constraint::Min(0),                 // Table
            Constraint::Length(confirm_height), // Delete confirmation
        ])
        .split(area);

    draw_search(f, view, chunks[0]);

    let mut header = vec!["#", "Name"];
    header.extend_from_slice(E::extra_columns());
    header.extend_from_slice(&["Image", "Status"]);

    let mut widths = vec![Constraint::Length(4), Constraint::Min(16)];
    widths.extend(E::extra_columns().iter().map(|_| Constraint::Min(10)));
    widths.extend([Constraint::Min(20), Constraint::Length(9)]);

    let image_width = 36;
    let visible = view.visible();
    let total = visible.len();
    let rows: Vec<Row> = visible
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut cells = vec![
                Cell::from((i + 1).to_string()).style(Style::default().fg(Color::DarkGray)),
                Cell::from(e.name().to_string()),
            ];
            cells.extend(e.extra_cells().into_iter().map(Cell::from));
            let image = display_image(e.image(), &settings.server, &settings.placeholder_image);
            cells.push(
                Cell::from(truncate(&image, image_width)).style(Style::default().fg(Color::Cyan)),
            );
            let status_color = match e.status() {
                Status::Active => Color::Green,
                Status::Inactive => Color::Red,
            };
            cells.push(Cell::from(e.status().as_str()).style(Style::default().fg(status_color)));
            Row::new(cells)
        })
        .collect();

    let selected = view.table_state.selected().map_or(0, |i| i + 1).min(total);
    let title = if view.is_loading() {
        format!(" {} (loading...) ", E::KIND.label())
    } else {
        format!(" {} ({}/{}) ", E::KIND.label(), selected, total)
    };
    let table = Table::new(rows, widths)
        .header(
            Row::new(header).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(title),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");
    f.render_stateful_widget(table, chunks[1], &mut view.table_state);

    if let Some(pending) = view.pending_delete() {
        let line = Line::from(vec![
            Span::styled(
                format!("Delete {} \"{}\"? ", E::KIND.path(), pending.name),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled("y:Yes  n:No", Style::default().fg(Color::Cyan)),
        ]);
        let confirm = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
        f.render_widget(confirm, chunks[2]);
    }

    if let Some(editor) = view.editor() {
        draw_editor(f, editor, settings, area);
    }
}

fn draw_search<E: CatalogEntity>(f: &mut Frame, view: &ListView<E>, area: Rect) {
    let (text, style) = if view.is_searching() {
        (
            format!("{}█", view.search()),
            Style::default().fg(Color::White),
        )
    } else if view.search().is_empty() {
        (
            "(press / to search by name)".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (view.search().to_string(), Style::default().fg(Color::Gray))
    };
    let border = if view.is_searching() {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let search = Paragraph::new(Span::styled(text, style)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" Search "),
    );
    f.render_widget(search, area);
}

fn draw_editor(f: &mut Frame, editor: &Editor, settings: &Settings, area: Rect) {
    let fields = editor.fields();
    let height = (fields.len() as u16) * 3 + 6;
    let popup = centered_rect(60, height, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(format!(" {} ", editor.title()));
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let mut constraints: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Length(1)); // Current image
    constraints.push(Constraint::Min(0)); // Message and hints
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, field) in fields.iter().enumerate() {
        let focused = editor.focused() == *field;
        let error = editor.field_error(*field);
        let border = match (error, focused) {
            (Some(_), _) => Color::Red,
            (None, true) => Color::Yellow,
            (None, false) => Color::DarkGray,
        };
        let value = editor.value(*field);
        let shown = if field.is_text() {
            let cursor = if focused { "█" } else { "" };
            format!("{}{}", value, cursor)
        } else {
            let options = match field {
                Field::Category => editor.categories().len(),
                Field::Subcategory => editor.subcategories().len(),
                _ => 2,
            };
            if value.is_empty() {
                format!("◀ (choose, {} options) ▶", options)
            } else {
                format!("◀ {} ▶", value)
            }
        };
        let title = match error {
            Some(message) => format!(" {}: {} ", field.label(), message),
            None => format!(" {} ", field.label()),
        };
        let input = Paragraph::new(shown).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(title),
        );
        f.render_widget(input, chunks[i]);
    }

    let current = match editor.current_image() {
        Some(image) => format!(
            "Current image: {}",
            display_image(Some(image), &settings.server, &settings.placeholder_image)
        ),
        None => "Current image: none".to_string(),
    };
    let width = chunks[fields.len()].width as usize;
    f.render_widget(
        Paragraph::new(Span::styled(
            truncate(&current, width),
            Style::default().fg(Color::DarkGray),
        )),
        chunks[fields.len()],
    );

    let footer = if editor.is_saving() {
        Line::from(Span::styled("Saving...", Style::default().fg(Color::Yellow)))
    } else if let Some(error) = editor.error() {
        Line::from(Span::styled(error, Style::default().fg(Color::Red)))
    } else {
        Line::from(Span::styled(
            "Tab/↑↓:Field  ←/→/Space:Choose  Enter:Save  Esc:Cancel",
            Style::default().fg(Color::Cyan),
        ))
    };
    f.render_widget(
        Paragraph::new(footer).wrap(Wrap { trim: true }),
        chunks[fields.len() + 1],
    );
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let help_text = match app.workspace.as_ref() {
        Some(ws) => match app.current_view {
            View::Home => " ←/→:Tabs  L:Logout  q:Quit ".to_string(),
            View::Categories => list_help(&ws.categories),
            View::Subcategories => list_help(&ws.subcategories),
            View::Products => list_help(&ws.products),
        },
        None => String::new(),
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let help = Paragraph::new(Line::from(Span::styled(
        help_text,
        Style::default().fg(Color::Cyan),
    )))
    .block(Block::default().borders(Borders::ALL).title(" Keys "));
    f.render_widget(help, chunks[0]);

    let width = chunks[1].width.saturating_sub(2) as usize;
    let notice = Paragraph::new(notice_line(app.notice(), width))
        .block(Block::default().borders(Borders::ALL).title(" Notice "));
    f.render_widget(notice, chunks[1]);
}

fn list_help<E: CatalogEntity>(view: &ListView<E>) -> String {
    if view.editor().is_some() {
        " Enter:Save  Esc:Cancel ".to_string()
    } else if view.pending_delete().is_some() {
        " y:Confirm delete  n:Keep ".to_string()
    } else if view.is_searching() {
        " Type to filter  Enter:Done  Esc:Clear ".to_string()
    } else {
        " ↑/↓:Select  a:Add  e:Edit  d:Delete  /:Search  r:Reload  q:Quit ".to_string()
    }
}

fn notice_line(notice: Option<&Notice>, width: usize) -> Line<'static> {
    let Some(notice) = notice else {
        return Line::from("");
    };
    let color = match notice.level {
        Level::Info => Color::Green,
        Level::Error => Color::Red,
    };
    let stamp = format!("{} ", notice.stamp());
    let room = width.saturating_sub(stamp.width());
    Line::from(vec![
        Span::styled(stamp, Style::default().fg(Color::DarkGray)),
        Span::styled(truncate(&notice.message, room), Style::default().fg(color)),
    ])
}

/// Cut `text` to at most `max` terminal columns, marking the cut with an
/// ellipsis.
fn truncate(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height.min(area.height)),
            Constraint::Min(0),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_display_width() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefgh", 5), "abcd…");
        // Wide characters take two columns each.
        assert_eq!(truncate("日本語テキスト", 5), "日本…");
    }
}
