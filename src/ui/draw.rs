use anyhow::Result;
use ratatui::backend::Backend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::line::NORMAL as LINE;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use ratatui::{Frame, Terminal};

use crate::config::{RgbColor, ViewMode};
use crate::contact::Contact;
use crate::store::LoadState;

use super::app::App;

const SEARCH_HELP_INPUT: &str = "Type to filter  Up/Down: move  Enter: open  Esc: results";
const DETAIL_HELP: &str = "j/k: nav  y/Space: copy  q/Esc: close";
const HELP_MODAL_FOOTER: &str = "j/k: scroll  Esc/q: close";

const TILE_WIDTH: u16 = 34;
const TILE_HEIGHT: u16 = 5;

pub fn render<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    terminal.draw(|frame| draw_frame(frame, app))?;
    Ok(())
}

fn draw_frame(frame: &mut Frame<'_>, app: &mut App) {
    let size = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(size);

    draw_header(frame, layout[0], app);
    draw_search(frame, layout[1], app);
    draw_filters(frame, layout[2], app);
    draw_body(frame, layout[3], app);
    draw_footer(frame, layout[4], app);
    draw_detail_modal(frame, size, app);
    draw_help_modal(frame, size, app);
}

fn draw_header(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let header_style = header_text_style(app);
    let mut spans: Vec<Span> = vec![Span::styled(
        format!(" {} ", app.source_description()),
        header_style.add_modifier(Modifier::BOLD),
    )];

    for (label, count) in app.stats.entries() {
        spans.push(Span::styled(LINE.vertical, separator_style(app)));
        spans.push(Span::raw(format!(" {}: {} ", label, count)));
    }

    spans.push(Span::styled(LINE.vertical, separator_style(app)));
    spans.push(Span::styled(format!(" {} ", app.view.title()), header_style));

    if app.is_loading() {
        spans.push(Span::styled(
            " LOADING ",
            selection_style(app).add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_search(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let style = if app.search_focused {
        header_text_style(app)
    } else {
        border_style(app, false)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(Span::styled(" SEARCH ", header_text_style(app)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width.max(1) as usize;
    let scroll = app.search_input.visual_scroll(width);
    let paragraph = if app.search_input.value().is_empty() && !app.search_focused {
        Paragraph::new(Span::styled(
            "press / to search",
            Style::default().add_modifier(Modifier::DIM),
        ))
    } else {
        Paragraph::new(app.search_input.value()).scroll((0, scroll as u16))
    };
    frame.render_widget(paragraph, inner);

    if app.search_focused && app.detail_modal.is_none() && app.help_modal.is_none() {
        let cursor = app.search_input.visual_cursor().saturating_sub(scroll) as u16;
        frame.set_cursor_position((inner.x + cursor.min(inner.width), inner.y));
    }
}

fn draw_filters(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let line = if app.filter.has_no_filters() {
        Line::from(Span::styled(
            " No filters",
            Style::default().add_modifier(Modifier::DIM),
        ))
    } else {
        let mut spans = vec![Span::styled(" Filters: ", header_text_style(app))];
        for (idx, (label, value)) in app.filter.active().into_iter().enumerate() {
            if idx > 0 {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(
                format!("{}={}", label, value),
                selection_style(app),
            ));
        }
        Line::from(spans)
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_body(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    if app.visible.is_empty() {
        let message = match app.load_state() {
            LoadState::Loading | LoadState::Idle if app.contacts.is_empty() => "Loading contacts",
            LoadState::Error(_) if app.contacts.is_empty() => "Could not load contacts",
            _ => "No companies match",
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(app, false));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        render_centered_words(frame, inner, message);
        return;
    }

    match app.view {
        ViewMode::Grid => draw_grid(frame, area, app),
        ViewMode::List => draw_list(frame, area, app),
    }
}

fn draw_grid(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let columns = (area.width / TILE_WIDTH).max(1) as usize;
    let rows_on_screen = (area.height / TILE_HEIGHT).max(1) as usize;
    app.grid_columns = columns;
    app.page_size = rows_on_screen;

    // Keep the selected tile's row on screen.
    let selected_row = app.selected / columns;
    if selected_row < app.grid_scroll {
        app.grid_scroll = selected_row;
    } else if selected_row >= app.grid_scroll + rows_on_screen {
        app.grid_scroll = selected_row + 1 - rows_on_screen;
    }

    let tile_width = area.width / columns as u16;
    let first = app.grid_scroll * columns;
    let last = (first + columns * rows_on_screen).min(app.visible.len());

    for position in first..last {
        let Some(contact) = app.visible.get(position).and_then(|&i| app.contacts.get(i)) else {
            continue;
        };
        let offset = position - first;
        let row = (offset / columns) as u16;
        let col = (offset % columns) as u16;
        let tile = Rect {
            x: area.x + col * tile_width,
            y: area.y + row * TILE_HEIGHT,
            width: tile_width,
            height: TILE_HEIGHT.min(area.height.saturating_sub(row * TILE_HEIGHT)),
        };
        draw_tile(frame, tile, app, contact, position == app.selected);
    }
}

fn draw_tile(frame: &mut Frame<'_>, area: Rect, app: &App, contact: &Contact, selected: bool) {
    let style = if selected {
        selection_style(app)
    } else {
        border_style(app, false)
    };
    let block = Block::default().borders(Borders::ALL).border_style(style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let name_style = if selected {
        selection_style(app).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let lines = vec![
        Line::from(Span::styled(contact.company_name.clone(), name_style)),
        Line::from(contact.locality()),
        Line::from(Span::styled(districts_line(contact), header_text_style(app))),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn districts_line(contact: &Contact) -> String {
    let mut parts = Vec::new();
    if !contact.tx_house_district.is_empty() {
        parts.push(format!("HD {}", contact.tx_house_district));
    }
    if !contact.tx_senate_district.is_empty() {
        parts.push(format!("SD {}", contact.tx_senate_district));
    }
    parts.join("  ")
}

fn draw_list(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    // borders (2) + header (1)
    app.page_size = area.height.saturating_sub(3).max(1) as usize;

    let header = Row::new(["Company", "City", "State", "House", "Senate", "List"])
        .style(header_text_style(app).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .visible_contacts()
        .map(|contact| {
            Row::new(vec![
                Cell::from(contact.company_name.clone()),
                Cell::from(contact.city.clone()),
                Cell::from(contact.state.clone()),
                Cell::from(contact.tx_house_district.clone()),
                Cell::from(contact.tx_senate_district.clone()),
                Cell::from(contact.list_name.clone()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Percentage(34),
        Constraint::Percentage(16),
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Min(8),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(app, true)),
        )
        .highlight_style(selection_style(app));

    let mut state = app.table_state.clone();
    state.select(Some(app.selected));
    frame.render_stateful_widget(table, area, &mut state);
    app.table_state = state;
}

fn draw_footer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let colors = app.ui_colors();
    let mut style = Style::default()
        .fg(color(colors.status_fg))
        .bg(color(colors.status_bg));

    let counts = format!(
        "Showing {} of {} companies",
        app.visible.len(),
        app.contacts.len()
    );

    let message = if app.detail_modal.is_some() {
        DETAIL_HELP.to_string()
    } else if app.search_focused {
        format!("{}  {}", counts, SEARCH_HELP_INPUT)
    } else if let Some(error) = app.load_error() {
        style = style.fg(color(colors.error_fg));
        format!("{}  {}", counts, error)
    } else {
        match &app.status {
            Some(status) => format!("{}  {}", counts, status),
            None => counts,
        }
    };

    let background = Block::default().style(Style::default().bg(color(colors.status_bg)));
    frame.render_widget(background, area);

    frame.render_widget(Paragraph::new(message).style(style), area);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn section_header(title: &str, content_width: usize) -> String {
    let header_text = format!(" {} ", title);
    let padding_total = content_width.saturating_sub(header_text.len());
    let left_pad = padding_total / 2;
    let right_pad = padding_total - left_pad;
    format!(
        "{}{}{}",
        LINE.horizontal.repeat(left_pad),
        header_text,
        LINE.horizontal.repeat(right_pad)
    )
}

fn draw_detail_modal(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let (Some(modal), Some(contact)) = (app.detail_modal.as_ref(), app.detail_contact()) else {
        return;
    };

    let width = area.width.saturating_mul(2).saturating_div(3).max(40).min(area.width);
    let height = area.height.saturating_mul(4).saturating_div(5).max(10).min(area.height);
    let modal_area = centered_rect(area, width, height);
    frame.render_widget(Clear, modal_area);

    let header_style = header_text_style(app);
    let content_width = width.saturating_sub(2) as usize;
    let label_width = 18usize;

    let mut lines: Vec<Line> = Vec::new();
    let mut selected_line = 0usize;
    let mut field_index = 0usize;
    for (section_idx, section) in modal.sections.iter().enumerate() {
        if section_idx > 0 {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            section_header(section.title, content_width),
            header_style,
        )));
        for field in &section.fields {
            let selected = field_index == modal.field_index;
            if selected {
                selected_line = lines.len();
            }
            let value_style = if selected {
                selection_style(app)
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{:<width$}", field.label, width = label_width), header_style),
                Span::styled(field.value.clone(), value_style),
            ]));
            field_index += 1;
        }
    }

    // borders (2)
    let viewport = height.saturating_sub(2) as usize;
    let scroll = (selected_line + 1).saturating_sub(viewport);

    let title = Line::from(Span::styled(
        format!(" {} ", contact.company_name),
        header_style.add_modifier(Modifier::BOLD),
    ));
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, true))
        .title(title)
        .title_bottom(Line::from(Span::styled(format!(" {} ", DETAIL_HELP), header_style)))
        .title_alignment(Alignment::Center);

    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let visible: Vec<Line> = lines.into_iter().skip(scroll).take(viewport).collect();
    frame.render_widget(Paragraph::new(visible), inner);
}

fn draw_help_modal(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    if app.help_modal.is_none() {
        return;
    }

    let width = area.width.saturating_mul(2).saturating_div(3).max(40).min(area.width);
    let height = area.height.saturating_mul(4).saturating_div(5).max(10).min(area.height);
    let modal_area = centered_rect(area, width, height);

    frame.render_widget(Clear, modal_area);

    let header_style = header_text_style(app);
    let border_s = border_style(app, true);

    let sections = app.help_entries();
    let mut lines: Vec<Line> = Vec::new();

    let content_width = width.saturating_sub(4) as usize;
    let action_width = 20usize;

    for (section_idx, section) in sections.iter().enumerate() {
        lines.push(Line::from(Span::styled(
            section_header(section.title, content_width),
            header_style,
        )));

        for entry in &section.entries {
            lines.push(Line::from(vec![
                Span::raw(format!("{:<width$}", entry.action, width = action_width)),
                Span::styled(entry.keys.clone(), header_style),
            ]));
        }

        if section_idx + 1 < sections.len() {
            lines.push(Line::from(""));
        }
    }

    let total_lines = lines.len();
    // borders (2) + footer line (1)
    let inner_height = height.saturating_sub(3) as usize;

    let Some(modal) = app.help_modal.as_mut() else {
        return;
    };
    modal.total_lines = total_lines;
    modal.viewport_height = inner_height;

    let max_scroll = modal.total_lines.saturating_sub(modal.viewport_height);
    if modal.scroll > max_scroll {
        modal.scroll = max_scroll;
    }

    let scroll = modal.scroll;
    let scroll_indicator = match (modal.can_scroll_up(), modal.can_scroll_down()) {
        (true, true) => "▲▼",
        (true, false) => "▲ ",
        (false, true) => " ▼",
        (false, false) => "  ",
    };

    let visible_lines: Vec<Line> = lines.into_iter().skip(scroll).take(inner_height).collect();

    let title = Line::from(vec![
        Span::styled(" HELP ", header_style),
        Span::styled(scroll_indicator, header_style),
    ]);
    let footer = Line::from(Span::styled(
        format!(" {} ", HELP_MODAL_FOOTER),
        header_style,
    ));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_s)
        .title(title)
        .title_bottom(footer)
        .title_alignment(Alignment::Center);

    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);
    frame.render_widget(Paragraph::new(visible_lines), inner);
}

fn selection_style(app: &App) -> Style {
    let colors = app.ui_colors();
    Style::default()
        .fg(color(colors.selection_fg))
        .bg(color(colors.selection_bg))
}

fn border_style(app: &App, active: bool) -> Style {
    let colors = app.ui_colors();
    let style = Style::default().fg(color(colors.border));
    if active {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

fn header_text_style(app: &App) -> Style {
    let colors = app.ui_colors();
    Style::default().fg(color(colors.separator))
}

fn separator_style(app: &App) -> Style {
    let colors = app.ui_colors();
    Style::default().fg(color(colors.separator))
}

fn render_centered_words(frame: &mut Frame<'_>, area: Rect, text: &str) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let height = 1;
    let target = Rect {
        x: area.x,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width: area.width,
        height,
    };

    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), target);
}

fn color(rgb: RgbColor) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::remote::{FetchError, SheetSource};
    use ratatui::backend::TestBackend;
    use std::sync::Arc;

    struct EmptySource;

    impl SheetSource for EmptySource {
        fn fetch(&self) -> Result<String, FetchError> {
            Ok(String::new())
        }

        fn describe(&self) -> String {
            "empty".to_string()
        }
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn empty_app_renders_counts() {
        let config = config::from_toml("", None).unwrap();
        let mut app = App::new(&config, Arc::new(EmptySource));
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        render(&mut terminal, &mut app).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Showing 0 of 0 companies"));
        assert!(text.contains("SEARCH"));
    }

    #[test]
    fn districts_line_skips_missing_parts() {
        let contact = Contact {
            tx_senate_district: "14".into(),
            ..Contact::default()
        };
        assert_eq!(districts_line(&contact), "SD 14");
    }
}
