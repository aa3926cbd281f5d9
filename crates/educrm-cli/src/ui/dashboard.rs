//! Dashboard view — headline counts per stage and seat pressure.

use educrm_core::section::RiskTier;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use super::{risk_color, stage_color};
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(4), Constraint::Min(0)])
    .split(area);

  draw_cards(f, rows[0], app);
  draw_seats(f, rows[1], app);
}

fn draw_cards(f: &mut Frame, area: Rect, app: &App) {
  let summary = app.cache.summary();
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Ratio(1, 6); 6])
    .split(area);

  card(f, cols[0], "Total", summary.total, Color::White);
  for (i, (stage, count)) in summary.by_stage.iter().enumerate() {
    card(f, cols[i + 1], stage.label(), *count, stage_color(*stage));
  }
}

fn card(f: &mut Frame, area: Rect, title: &str, value: usize, accent: Color) {
  let block = Block::default()
    .title(format!(" {title} "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(accent));
  let value = Paragraph::new(Line::from(Span::styled(
    value.to_string(),
    Style::default().fg(accent).add_modifier(Modifier::BOLD),
  )))
  .block(block);
  f.render_widget(value, area);
}

fn draw_seats(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(" Seats ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let sections = app.cache.sections();
  let mut lines = Vec::new();

  for tier in [RiskTier::Critical, RiskTier::Warning, RiskTier::Normal] {
    let count = sections
      .iter()
      .filter(|s| s.capacity.is_some_and(|c| c.risk_tier == tier))
      .count();
    lines.push(Line::from(vec![
      Span::styled(
        format!("{:<10}", format!("{tier:?}").to_lowercase()),
        Style::default().fg(risk_color(tier)),
      ),
      Span::raw(format!("{count} sections")),
    ]));
  }

  let over: Vec<_> = sections
    .iter()
    .filter(|s| s.capacity.is_some_and(|c| c.is_over_capacity()))
    .map(|s| format!("{} ({}/{})", s.section.label, s.section.enrolled_count, s.section.total_seats))
    .collect();
  if !over.is_empty() {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
      format!("Over capacity: {}", over.join(", ")),
      Style::default().fg(Color::Red),
    )));
  }

  f.render_widget(Paragraph::new(lines).block(block), area);
}
