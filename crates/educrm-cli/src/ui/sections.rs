//! Sections view — capacity table coloured by risk tier.

use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Modifier, Style},
  widgets::{Block, Borders, Cell, Row, Table, TableState},
};

use super::risk_color;
use crate::{app::App, client::SectionRow};

fn row(s: &SectionRow) -> Row<'static> {
  let sec = &s.section;
  let period = sec.period.map_or("", |p| p.label());

  let (available, occupancy, style) = match s.capacity {
    Some(c) => (
      c.available.to_string(),
      format!("{}%", c.occupancy_percent),
      Style::default().fg(risk_color(c.risk_tier)),
    ),
    // Zero seats: occupancy is undefined.
    None => ("—".to_string(), "n/a".to_string(), Style::default().fg(Color::DarkGray)),
  };

  Row::new(vec![
    Cell::from(sec.series.clone()),
    Cell::from(sec.label.clone()),
    Cell::from(period),
    Cell::from(sec.enrolled_count.to_string()),
    Cell::from(sec.total_seats.to_string()),
    Cell::from(available),
    Cell::from(occupancy).style(style.add_modifier(Modifier::BOLD)),
  ])
  .style(style)
}

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let sections = app.cache.sections();
  let rows: Vec<Row> = sections.iter().map(row).collect();

  let header = Row::new(vec![
    "Series", "Section", "Period", "Enrolled", "Seats", "Free", "Occupancy",
  ])
  .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

  let table = Table::new(
    rows,
    [
      Constraint::Length(10),
      Constraint::Length(8),
      Constraint::Length(7),
      Constraint::Length(9),
      Constraint::Length(6),
      Constraint::Length(6),
      Constraint::Length(10),
    ],
  )
  .header(header)
  .block(
    Block::default()
      .title(format!(" Sections ({}) ", sections.len()))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::DarkGray)),
  )
  .row_highlight_style(Style::default().bg(Color::Blue).fg(Color::White));

  let mut state = TableState::default();
  if !sections.is_empty() {
    state.select(Some(app.section_cursor));
  }
  f.render_stateful_widget(table, area, &mut state);
}
