//! Funnel view — one column per stage, kanban style.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState},
};

use super::stage_color;
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let columns = app.cache.columns();
  let areas = Layout::default()
    .direction(Direction::Horizontal)
    .constraints(vec![Constraint::Ratio(1, columns.len().max(1) as u32); columns.len()])
    .split(area);

  for (i, (column, col_area)) in columns.iter().zip(areas.iter()).enumerate() {
    let focused = i == app.funnel_column;
    let accent = stage_color(column.stage);

    let block = Block::default()
      .title(Line::from(vec![
        Span::styled(
          format!(" {} ", column.stage.label()),
          Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("{} ", column.count), Style::default().fg(Color::Gray)),
      ]))
      .borders(Borders::ALL)
      .border_style(if focused {
        Style::default().fg(accent)
      } else {
        Style::default().fg(Color::DarkGray)
      });

    let items: Vec<ListItem> = column
      .prospects
      .iter()
      .map(|p| {
        ListItem::new(vec![
          Line::from(Span::styled(
            p.student_name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
          )),
          Line::from(Span::styled(
            format!("{} · {}", p.parent_name, p.phone),
            Style::default().fg(Color::DarkGray),
          )),
        ])
      })
      .collect();

    let mut state = ListState::default();
    if focused && !column.prospects.is_empty() {
      state.select(Some(app.funnel_row));
    }

    f.render_stateful_widget(
      List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White)),
      *col_area,
      &mut state,
    );
  }
}
