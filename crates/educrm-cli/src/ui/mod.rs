//! TUI rendering — orchestrates all panes.

pub mod dashboard;
pub mod funnel;
pub mod prospects;
pub mod sections;

use chrono::Local;
use educrm_core::{section::RiskTier, stage::Stage};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, View};

// ─── Palette ──────────────────────────────────────────────────────────────────

/// Accent colour per pipeline stage, used by every view.
pub fn stage_color(stage: Stage) -> Color {
  match stage {
    Stage::Lead => Color::Cyan,
    Stage::FirstContact => Color::Yellow,
    Stage::Replied => Color::Magenta,
    Stage::VisitScheduled => Color::Green,
    Stage::Negotiating => Color::Red,
  }
}

pub fn risk_color(tier: RiskTier) -> Color {
  match tier {
    RiskTier::Normal => Color::Green,
    RiskTier::Warning => Color::Yellow,
    RiskTier::Critical => Color::Red,
  }
}

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  match app.view {
    View::Dashboard => dashboard::draw(f, rows[1], app),
    View::Funnel => funnel::draw(f, rows[1], app),
    View::Prospects => prospects::draw(f, rows[1], app),
    View::Sections => sections::draw(f, rows[1], app),
  }
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let mut spans = vec![Span::styled(
    " educrm ",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  )];

  for (i, view) in View::ALL.iter().enumerate() {
    let style = if *view == app.view {
      Style::default().fg(Color::Black).bg(Color::Cyan)
    } else {
      Style::default().fg(Color::Gray)
    };
    spans.push(Span::styled(format!(" {} {} ", i + 1, view.title()), style));
  }

  let loaded = match app.cache.loaded_at() {
    Some(t) if app.cache.is_stale() => format!("stale since {} ", t.format("%H:%M:%S")),
    Some(t) => format!("updated {} ", t.format("%H:%M:%S")),
    None => format!("{} ", Local::now().format("%Y-%m-%d")),
  };

  // Simple left-right header: pad the middle.
  let left_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
  let pad = (area.width as usize)
    .saturating_sub(left_width)
    .saturating_sub(loaded.chars().count());
  spans.push(Span::raw(" ".repeat(pad)));
  spans.push(Span::styled(loaded, Style::default().fg(Color::Gray)));

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match app.view {
    View::Prospects if app.filter_active => (
      "SEARCH",
      "Type to filter  Esc cancel  Enter keep",
    ),
    View::Dashboard => ("DASHBOARD", "1-4/Tab switch view  r refresh  q quit"),
    View::Funnel => (
      "FUNNEL",
      "←→/hl column  ↑↓/jk move  < > change stage  Enter detail  q quit",
    ),
    View::Prospects => (
      "PROSPECTS",
      "↑↓/jk navigate  / search  Enter detail  < > change stage  Esc close  q quit",
    ),
    View::Sections => ("SECTIONS", "↑↓/jk navigate  r refresh  q quit"),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::DarkGray),
  );

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

#[cfg(test)]
pub(crate) mod tests {
  use ratatui::{Terminal, backend::TestBackend};

  use super::*;

  /// Render one frame and return its text, row by row.
  pub(crate) fn render(app: &App, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|f| draw(f, app)).unwrap();
    let buffer = terminal.backend().buffer();
    (0..height)
      .map(|y| {
        (0..width)
          .map(|x| buffer[(x, y)].symbol().to_string())
          .collect::<String>()
      })
      .collect::<Vec<_>>()
      .join("\n")
  }

  #[test]
  fn every_stage_has_a_distinct_colour() {
    let mut colours: Vec<_> = Stage::all().map(stage_color).collect();
    colours.dedup();
    assert_eq!(colours.len(), 5);
  }
}
