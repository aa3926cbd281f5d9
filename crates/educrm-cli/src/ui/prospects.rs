//! Prospects view — filterable list on the left, detail and history on the
//! right.

use educrm_core::prospect::Prospect;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use super::stage_color;
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  // Split into left list pane (35%) and right detail pane (65%).
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
    .split(area);

  draw_list(f, cols[0], app);

  let selected = app.selected.and_then(|id| app.cache.prospect(id));
  match selected {
    Some(p) => draw_detail(f, cols[1], app, p),
    None => draw_empty_detail(f, cols[1]),
  }
}

fn status_style(p: &Prospect) -> Style {
  let color = p.status.stage().map_or(Color::DarkGray, stage_color);
  Style::default().fg(color)
}

// ─── List ─────────────────────────────────────────────────────────────────────

fn draw_list(f: &mut Frame, area: Rect, app: &App) {
  let filtered = app.filtered_prospects();
  let total = app.cache.prospects().len();

  // Title with count.
  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" Prospects ({}/{}) ", filtered.len(), total)
  } else {
    format!(" Prospects ({total}) ")
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let items: Vec<ListItem> = filtered
    .iter()
    .map(|p| {
      ListItem::new(Line::from(vec![
        Span::styled("● ", status_style(p)),
        Span::raw(p.student_name.clone()),
        Span::styled(format!("  {}", p.grade), Style::default().fg(Color::DarkGray)),
      ]))
    })
    .collect();

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // If filter is active or set, show a filter bar at the bottom of the inner area.
  if (app.filter_active || !app.filter.is_empty()) && inner_area.height > 2 {
    let filter_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height = inner_area.height.saturating_sub(1);

    let filter_text = if app.filter_active {
      format!("/{}_", app.filter)
    } else {
      format!("/{}", app.filter)
    };
    f.render_widget(
      Paragraph::new(filter_text).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  // Scrollable list with cursor tracking.
  let mut state = ListState::default();
  state.select(if filtered.is_empty() {
    None
  } else {
    Some(app.list_cursor)
  });

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner_area,
    &mut state,
  );
}

// ─── Detail ───────────────────────────────────────────────────────────────────

fn draw_empty_detail(f: &mut Frame, area: Rect) {
  let block = Block::default()
    .title(" Detail ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(
    Paragraph::new("Select a prospect and press Enter.")
      .style(Style::default().fg(Color::DarkGray)),
    inner,
  );
}

fn field<'a>(label: &'a str, value: String) -> Line<'a> {
  Line::from(vec![
    Span::styled(
      format!("{label:<14}"),
      Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ),
    Span::raw(value),
  ])
}

fn draw_detail(f: &mut Frame, area: Rect, app: &App, p: &Prospect) {
  let block = Block::default()
    .title(format!(" {} ", p.student_name))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let mut lines = vec![
    Line::from(vec![
      Span::styled(
        format!("{:<14}", "status"),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
      ),
      Span::styled(p.status.to_string(), status_style(p).add_modifier(Modifier::BOLD)),
    ]),
    field("grade", p.grade.clone()),
    field("parent", p.parent_name.clone()),
    field("phone", p.phone.clone()),
    field("email", p.email.clone()),
    field("created", p.created_at.format("%Y-%m-%d %H:%M").to_string()),
    field(
      "last contact",
      p.last_contact_date
        .map_or_else(|| "never".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string()),
    ),
  ];

  if let Some(observation) = &p.observation {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
      observation.clone(),
      Style::default().fg(Color::Yellow),
    )));
  }

  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(
    "History",
    Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
  )));

  if app.history.is_empty() {
    lines.push(Line::from(Span::styled(
      "No status changes yet.",
      Style::default().fg(Color::DarkGray),
    )));
  }
  for entry in &app.history {
    let from = entry
      .previous_status
      .as_ref()
      .map_or("—", |s| s.as_str())
      .to_string();
    lines.push(Line::from(vec![
      Span::styled(
        entry.changed_at.format("%Y-%m-%d %H:%M  ").to_string(),
        Style::default().fg(Color::DarkGray),
      ),
      Span::raw(format!("{from} → ")),
      Span::styled(
        entry.new_status.to_string(),
        Style::default().fg(entry.new_status.stage().map_or(Color::DarkGray, stage_color)),
      ),
    ]));
  }

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
