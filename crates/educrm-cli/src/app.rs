//! Application state machine and event dispatcher.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use educrm_core::{history::StatusHistoryEntry, prospect::Prospect, stage::Stage};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use uuid::Uuid;

use crate::{
  cache::Cache,
  client::{ApiClient, StatusUpdate},
};

// ─── View ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
  Dashboard,
  Funnel,
  Prospects,
  Sections,
}

impl View {
  pub const ALL: [View; 4] =
    [View::Dashboard, View::Funnel, View::Prospects, View::Sections];

  pub fn title(self) -> &'static str {
    match self {
      View::Dashboard => "Dashboard",
      View::Funnel => "Funnel",
      View::Prospects => "Prospects",
      View::Sections => "Sections",
    }
  }

  fn from_digit(c: char) -> Option<Self> {
    let idx = c.to_digit(10)?.checked_sub(1)?;
    Self::ALL.get(idx as usize).copied()
  }

  fn next(self) -> Self {
    let idx = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
    Self::ALL[(idx + 1) % Self::ALL.len()]
  }
}

/// Direction of a one-stage move in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
  Forward,
  Back,
}

impl Step {
  fn apply(self, stage: Stage) -> Option<Stage> {
    match self {
      Step::Forward => stage.next(),
      Step::Back => stage.previous(),
    }
  }

  fn boundary(self) -> &'static str {
    match self {
      Step::Forward => "end",
      Step::Back => "start",
    }
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Active tab.
  pub view: View,

  /// Prospects and sections as last fetched from the server.
  pub cache: Cache,

  /// Current fuzzy-filter string for the prospect list.
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  /// Cursor position within the *filtered* prospect list.
  pub list_cursor: usize,

  /// Funnel cursor: stage column, then row within it.
  pub funnel_column: usize,
  pub funnel_row:    usize,

  /// Cursor in the sections table.
  pub section_cursor: usize,

  /// Prospect shown in the detail pane.
  pub selected: Option<Uuid>,

  /// History of the selected prospect, newest first.
  pub history: Vec<StatusHistoryEntry>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Shared HTTP client.
  pub client: Arc<ApiClient>,
}

impl App {
  pub fn new(client: ApiClient) -> Self {
    Self {
      view: View::Dashboard,
      cache: Cache::default(),
      filter: String::new(),
      filter_active: false,
      list_cursor: 0,
      funnel_column: 0,
      funnel_row: 0,
      section_cursor: 0,
      selected: None,
      history: Vec::new(),
      status_msg: String::new(),
      client: Arc::new(client),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Re-fetch everything and reload the detail pane's history.
  pub async fn refresh(&mut self) -> anyhow::Result<()> {
    self.status_msg = "Loading…".into();
    if let Err(e) = self.cache.refresh(&self.client).await {
      self.status_msg = format!("Error: {e}");
      return Err(e);
    }
    self.status_msg.clear();
    self.clamp_cursors();

    if let Some(id) = self.selected {
      if self.cache.prospect(id).is_some() {
        self.load_history(id).await;
      } else {
        self.close_detail();
      }
    }
    Ok(())
  }

  async fn load_history(&mut self, id: Uuid) {
    match self.client.list_history(id).await {
      Ok(history) => self.history = history,
      Err(e) => {
        self.history.clear();
        self.status_msg = format!("Error: {e}");
      }
    }
  }

  fn clamp_cursors(&mut self) {
    let prospects = self.filtered_prospects().len();
    self.list_cursor = self.list_cursor.min(prospects.saturating_sub(1));

    let rows = self.funnel_column_len();
    self.funnel_row = self.funnel_row.min(rows.saturating_sub(1));

    let sections = self.cache.sections().len();
    self.section_cursor = self.section_cursor.min(sections.saturating_sub(1));
  }

  // ── Selections ────────────────────────────────────────────────────────────

  /// Prospects matching the current filter, newest first.
  pub fn filtered_prospects(&self) -> Vec<&Prospect> {
    let prospects = self.cache.prospects();
    if self.filter.is_empty() {
      return prospects.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    prospects
      .iter()
      .filter(|p| {
        let haystack =
          format!("{} {} {} {}", p.student_name, p.parent_name, p.grade, p.status);
        matcher.fuzzy_match(&haystack, &self.filter).is_some()
      })
      .collect()
  }

  /// The prospect under the list cursor in the filtered view, if any.
  pub fn cursor_prospect(&self) -> Option<&Prospect> {
    self.filtered_prospects().get(self.list_cursor).copied()
  }

  fn funnel_column_len(&self) -> usize {
    self
      .cache
      .columns()
      .get(self.funnel_column)
      .map_or(0, |c| c.count)
  }

  /// The prospect under the funnel cursor, if any.
  pub fn funnel_prospect(&self) -> Option<&Prospect> {
    self
      .cache
      .columns()
      .get(self.funnel_column)?
      .prospects
      .get(self.funnel_row)
      .copied()
  }

  /// The prospect a stage move applies to in the current view.
  fn move_target(&self) -> Option<Uuid> {
    match self.view {
      View::Funnel => self.funnel_prospect().map(|p| p.id),
      View::Prospects => self.selected.or_else(|| self.cursor_prospect().map(|p| p.id)),
      View::Dashboard | View::Sections => None,
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    // Filter input mode: all printable keys go into the filter string.
    if self.filter_active {
      self.handle_filter_key(key);
      return Ok(true);
    }

    match key.code {
      KeyCode::Char('q') => return Ok(false),
      KeyCode::Char(c @ '1'..='4') => {
        if let Some(view) = View::from_digit(c) {
          self.view = view;
        }
      }
      KeyCode::Tab => self.view = self.view.next(),
      KeyCode::Char('r') => {
        self.cache.invalidate();
        // Failure is already reported in the status bar.
        let _ = self.refresh().await;
      }
      KeyCode::Char('>') => self.move_stage(Step::Forward).await,
      KeyCode::Char('<') => self.move_stage(Step::Back).await,
      _ => match self.view {
        View::Dashboard => {}
        View::Funnel => self.handle_funnel_key(key).await,
        View::Prospects => self.handle_prospects_key(key).await,
        View::Sections => self.handle_sections_key(key),
      },
    }
    Ok(true)
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
      }
      KeyCode::Enter => self.filter_active = false,
      KeyCode::Backspace => {
        self.filter.pop();
      }
      KeyCode::Char(c) => self.filter.push(c),
      _ => {}
    }
    self.list_cursor = 0;
  }

  async fn handle_prospects_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.filtered_prospects().len();
        if self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(id) = self.cursor_prospect().map(|p| p.id) {
          self.open_detail(id).await;
        }
      }
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => self.close_detail(),
      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.list_cursor = 0;
      }
      _ => {}
    }
  }

  async fn handle_funnel_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Right | KeyCode::Char('l') => {
        if self.funnel_column + 1 < Stage::all().count() {
          self.funnel_column += 1;
          self.funnel_row = 0;
        }
      }
      KeyCode::Left | KeyCode::Char('h') => {
        self.funnel_column = self.funnel_column.saturating_sub(1);
        self.funnel_row = 0;
      }
      KeyCode::Down | KeyCode::Char('j') => {
        if self.funnel_row + 1 < self.funnel_column_len() {
          self.funnel_row += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.funnel_row = self.funnel_row.saturating_sub(1);
      }
      // Jump to the prospect's detail in the Prospects view.
      KeyCode::Enter => {
        if let Some(id) = self.funnel_prospect().map(|p| p.id) {
          self.filter.clear();
          self.list_cursor = self
            .filtered_prospects()
            .iter()
            .position(|p| p.id == id)
            .unwrap_or(0);
          self.view = View::Prospects;
          self.open_detail(id).await;
        }
      }
      _ => {}
    }
  }

  fn handle_sections_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        if self.section_cursor + 1 < self.cache.sections().len() {
          self.section_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.section_cursor = self.section_cursor.saturating_sub(1);
      }
      _ => {}
    }
  }

  async fn open_detail(&mut self, id: Uuid) {
    self.selected = Some(id);
    self.load_history(id).await;
  }

  fn close_detail(&mut self) {
    self.selected = None;
    self.history.clear();
  }

  // ── Stage moves ───────────────────────────────────────────────────────────

  /// Move the targeted prospect one stage along, guarded by its cached ETag.
  async fn move_stage(&mut self, step: Step) {
    let Some(id) = self.move_target() else {
      self.status_msg = "No prospect selected.".into();
      return;
    };
    let Some(prospect) = self.cache.prospect(id) else { return };
    let name = prospect.student_name.clone();

    // A prospect with an unrecognised status re-enters at the first stage.
    let target = match prospect.status.stage() {
      Some(stage) => step.apply(stage),
      None => Some(Stage::INITIAL),
    };
    let Some(target) = target else {
      self.status_msg =
        format!("{name} is already at the {} of the pipeline.", step.boundary());
      return;
    };

    let etag = self.cache.etag(id);
    match self.client.change_status(id, target, etag.as_deref()).await {
      Ok(StatusUpdate::Applied(p)) => {
        self.status_msg = format!("{} → {}", p.student_name, p.status);
        if self.view == View::Funnel {
          self.funnel_column = Stage::all().position(|s| s == target).unwrap_or(0);
          self.funnel_row = 0;
        }
      }
      Ok(StatusUpdate::Stale) => {
        self.status_msg =
          format!("{name} was changed elsewhere; view reloaded, try again.");
      }
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        return;
      }
    }

    self.cache.invalidate();
    let message = std::mem::take(&mut self.status_msg);
    if self.refresh().await.is_ok() {
      self.status_msg = message;
    }
  }
}
