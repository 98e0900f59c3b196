use std::io::{stdout, Write};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::TableState;
use ratatui::Terminal;
use tracing::{debug, info};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

use crate::config::{CommandExec, Config, UiColors, ViewMode};
use crate::contact::Contact;
use crate::filter::{self, FilterEngine, FilterOptions, FilterState};
use crate::remote::SheetSource;
use crate::stats::Stats;
use crate::store::{self, ContactStore, LoadError, LoadState, LoadTicket};

use super::detail::{self, DetailSection};
use super::draw;

type LoadMessage = (LoadTicket, Result<Vec<Contact>, LoadError>);

/// Contact detail overlay.
#[derive(Debug, Clone)]
pub struct DetailModal {
    pub contact_index: usize,
    pub sections: Vec<DetailSection>,
    pub field_index: usize,
}

impl DetailModal {
    fn new(contact_index: usize, contact: &Contact) -> Self {
        Self {
            contact_index,
            sections: detail::sections(contact),
            field_index: 0,
        }
    }

    pub fn field_count(&self) -> usize {
        self.sections.iter().map(|s| s.fields.len()).sum()
    }

    fn advance(&mut self, delta: isize) {
        let count = self.field_count();
        if count == 0 {
            return;
        }
        let current = self.field_index as isize;
        self.field_index = (current + delta).rem_euclid(count as isize) as usize;
    }

    fn current_value(&self) -> Option<&str> {
        detail::flatten(&self.sections)
            .get(self.field_index)
            .map(|field| field.value.as_str())
    }
}

/// Help modal state with scroll support
#[derive(Debug, Clone, Default)]
pub struct HelpModal {
    pub scroll: usize,
    pub total_lines: usize,
    pub viewport_height: usize,
}

impl HelpModal {
    pub fn can_scroll_up(&self) -> bool {
        self.scroll > 0
    }

    pub fn can_scroll_down(&self) -> bool {
        self.scroll + self.viewport_height < self.total_lines
    }

    fn scroll_by(&mut self, delta: isize) {
        let max_scroll = self.total_lines.saturating_sub(self.viewport_height);
        let next = (self.scroll as isize + delta).clamp(0, max_scroll as isize);
        self.scroll = next as usize;
    }
}

pub struct HelpEntry {
    pub action: &'static str,
    pub keys: String,
}

pub struct HelpSection {
    pub title: &'static str,
    pub entries: Vec<HelpEntry>,
}

pub struct App<'a> {
    config: &'a Config,
    source: Arc<dyn SheetSource>,
    store: ContactStore,
    engine: FilterEngine,
    loads_tx: Sender<LoadMessage>,
    loads_rx: Receiver<LoadMessage>,

    /// Snapshot of the store's collection used for the current render.
    pub contacts: Arc<[Contact]>,
    pub filter: FilterState,
    pub options: FilterOptions,
    pub stats: Stats,
    /// Indices into `contacts` that pass the filter, in order.
    pub visible: Vec<usize>,
    pub selected: usize,

    pub search_input: Input,
    pub search_focused: bool,
    pub view: ViewMode,
    pub table_state: TableState,
    /// First grid row on screen; maintained by the renderer.
    pub grid_scroll: usize,
    /// Tiles per grid row and rows per page; maintained by the renderer.
    pub grid_columns: usize,
    pub page_size: usize,

    pub detail_modal: Option<DetailModal>,
    pub help_modal: Option<HelpModal>,
    pub status: Option<String>,
}

impl<'a> App<'a> {
    pub fn new(config: &'a Config, source: Arc<dyn SheetSource>) -> Self {
        let (loads_tx, loads_rx) = mpsc::channel();
        Self {
            config,
            source,
            store: ContactStore::new(),
            engine: FilterEngine::new(config.search_fields.clone()),
            loads_tx,
            loads_rx,
            contacts: Arc::from(Vec::new()),
            filter: FilterState::default(),
            options: FilterOptions::default(),
            stats: Stats::default(),
            visible: Vec::new(),
            selected: 0,
            search_input: Input::default(),
            search_focused: false,
            view: config.ui.default_view,
            table_state: TableState::default(),
            grid_scroll: 0,
            grid_columns: 1,
            page_size: 10,
            detail_modal: None,
            help_modal: None,
            status: None,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        self.start_load();
        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop<B>(&mut self, terminal: &mut Terminal<B>) -> Result<()>
    where
        B: ratatui::backend::Backend,
    {
        loop {
            self.drain_loads();
            draw::render(terminal, self)?;

            if event::poll(Duration::from_millis(100))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if self.handle_key(key)? {
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Kick off a fetch on a worker thread; the result is settled on the UI
    /// thread by `drain_loads`.
    pub fn start_load(&mut self) {
        let ticket = self.store.begin_load();
        let source = Arc::clone(&self.source);
        let options = self.config.mapping.clone();
        let tx = self.loads_tx.clone();
        info!(source = %source.describe(), "refresh requested");
        thread::spawn(move || {
            let result = store::fetch_contacts(source.as_ref(), &options);
            // The receiver is gone only when the app is shutting down.
            let _ = tx.send((ticket, result));
        });
        self.set_status("Loading...");
    }

    fn drain_loads(&mut self) {
        loop {
            match self.loads_rx.try_recv() {
                Ok((ticket, result)) => {
                    let failure = result.as_ref().err().map(|err| err.to_string());
                    if !self.store.settle(ticket, result) {
                        continue;
                    }
                    self.sync_from_store();
                    // A newer load is still running, so the store reports
                    // Loading; keep the failure visible until it settles.
                    if let (Some(message), true) = (failure, self.store.is_loading()) {
                        self.set_status(message);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn sync_from_store(&mut self) {
        let contacts = self.store.contacts();
        if !Arc::ptr_eq(&contacts, &self.contacts) {
            self.contacts = contacts;
            self.options = FilterOptions::from_contacts(&self.contacts);
            self.stats = Stats::from_contacts(&self.contacts);
            self.detail_modal = None;
            self.recompute_visible();
        }

        match self.store.state() {
            LoadState::Ready => {
                self.set_status(format!("Loaded {} companies", self.contacts.len()));
            }
            LoadState::Error(message) => {
                let message = message.clone();
                self.set_status(message);
            }
            LoadState::Loading | LoadState::Idle => {}
        }
    }

    pub fn load_state(&self) -> &LoadState {
        self.store.state()
    }

    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.store.error()
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    /// Replace the filter wholesale and recompute the visible set.
    fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
        self.recompute_visible();
    }

    fn recompute_visible(&mut self) {
        let selected_id = self.selected_contact().map(|c| c.id.clone());
        self.visible = self.engine.matching_indices(&self.contacts, &self.filter);
        self.selected = selected_id
            .and_then(|id| {
                self.visible
                    .iter()
                    .position(|&idx| self.contacts[idx].id == id)
            })
            .unwrap_or(0);
        self.clamp_selection();
        debug!(
            visible = self.visible.len(),
            total = self.contacts.len(),
            "filter applied"
        );
    }

    fn clamp_selection(&mut self) {
        if self.visible.is_empty() {
            self.selected = 0;
            self.table_state.select(None);
        } else {
            self.selected = self.selected.min(self.visible.len() - 1);
            self.table_state.select(Some(self.selected));
        }
    }

    pub fn selected_contact(&self) -> Option<&Contact> {
        self.visible
            .get(self.selected)
            .and_then(|&idx| self.contacts.get(idx))
    }

    pub fn visible_contacts(&self) -> impl Iterator<Item = &Contact> {
        self.visible.iter().filter_map(|&idx| self.contacts.get(idx))
    }

    fn cycle_categorical(&mut self, which: Categorical) {
        let mut next = self.filter.clone();
        let (label, value) = match which {
            Categorical::HouseDistrict => {
                next.house_district = filter::cycle_option(
                    next.house_district.as_deref(),
                    &self.options.house_districts,
                    true,
                );
                ("House District", next.house_district.clone())
            }
            Categorical::SenateDistrict => {
                next.senate_district = filter::cycle_option(
                    next.senate_district.as_deref(),
                    &self.options.senate_districts,
                    true,
                );
                ("Senate District", next.senate_district.clone())
            }
            Categorical::City => {
                next.city = filter::cycle_option(next.city.as_deref(), &self.options.cities, true);
                ("City", next.city.clone())
            }
            Categorical::State => {
                next.state =
                    filter::cycle_option(next.state.as_deref(), &self.options.states, true);
                ("State", next.state.clone())
            }
            Categorical::ListName => {
                next.list_name =
                    filter::cycle_option(next.list_name.as_deref(), &self.options.list_names, true);
                ("List", next.list_name.clone())
            }
        };
        self.set_filter(next);
        self.set_status(format!("{}: {}", label, value.as_deref().unwrap_or("All")));
    }

    fn cycle_platform(&mut self, which: Platform) {
        let mut next = self.filter.clone();
        let (label, value) = match which {
            Platform::LinkedIn => {
                next.has_linkedin = filter::cycle_tri_state(next.has_linkedin);
                ("LinkedIn", next.has_linkedin)
            }
            Platform::Website => {
                next.has_website = filter::cycle_tri_state(next.has_website);
                ("Website", next.has_website)
            }
            Platform::Twitter => {
                next.has_twitter = filter::cycle_tri_state(next.has_twitter);
                ("Twitter", next.has_twitter)
            }
        };
        self.set_filter(next);
        let shown = match value {
            None => "any",
            Some(true) => "yes",
            Some(false) => "no",
        };
        self.set_status(format!("{}: {}", label, shown));
    }

    fn clear_filters(&mut self) {
        self.search_input.reset();
        self.set_filter(FilterState::default());
        self.set_status("Filters cleared");
    }

    // =========================================================================
    // Key handling
    // =========================================================================

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        // Ctrl+C always quits (hardcoded for safety)
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            return Ok(true);
        }

        if self.help_modal.is_some() {
            self.handle_help_modal_key(key);
            return Ok(false);
        }

        if self.detail_modal.is_some() {
            self.handle_detail_modal_key(key)?;
            return Ok(false);
        }

        if self.search_focused {
            self.handle_search_key(key);
            return Ok(false);
        }

        self.handle_results_key(key)
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let config = self.config;
        let input_keys = &config.keys.search_input;

        if self.key_matches_any(&key, &input_keys.cancel) {
            self.search_focused = false;
            return;
        }

        if self.key_matches_any(&key, &input_keys.confirm) {
            self.search_focused = false;
            self.open_detail();
            return;
        }

        if self.key_matches_any(&key, &input_keys.next) {
            self.move_selection(1);
            return;
        }
        if self.key_matches_any(&key, &input_keys.prev) {
            self.move_selection(-1);
            return;
        }

        if let Some(change) = self.search_input.handle_event(&Event::Key(key)) {
            if change.value {
                let next = FilterState {
                    search: self.search_input.value().to_string(),
                    ..self.filter.clone()
                };
                self.set_filter(next);
            }
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) -> Result<bool> {
        let config = self.config;
        let global = &config.keys.global;
        let results = &config.keys.results;

        if self.key_matches_any(&key, &global.quit) {
            return Ok(true);
        }
        if self.key_matches_any(&key, &global.search) {
            self.search_focused = true;
            return Ok(false);
        }
        if self.key_matches_any(&key, &global.help) {
            self.help_modal = Some(HelpModal::default());
            return Ok(false);
        }
        if self.key_matches_any(&key, &global.refresh) {
            self.start_load();
            return Ok(false);
        }
        if self.key_matches_any(&key, &global.toggle_view) {
            self.view = self.view.toggled();
            self.set_status(format!("View: {}", self.view.title()));
            return Ok(false);
        }
        if self.key_matches_any(&key, &global.clear_filters) {
            self.clear_filters();
            return Ok(false);
        }

        let row_step = match self.view {
            ViewMode::Grid => self.grid_columns.max(1) as isize,
            ViewMode::List => 1,
        };
        let page_step = match self.view {
            ViewMode::Grid => (self.grid_columns.max(1) * self.page_size.max(1)) as isize,
            ViewMode::List => self.page_size.max(1) as isize,
        };

        if self.key_matches_any(&key, &results.next) {
            self.move_selection(row_step);
        } else if self.key_matches_any(&key, &results.prev) {
            self.move_selection(-row_step);
        } else if self.key_matches_any(&key, &results.right) {
            self.move_selection(1);
        } else if self.key_matches_any(&key, &results.left) {
            self.move_selection(-1);
        } else if self.key_matches_any(&key, &results.page_down) {
            self.move_selection(page_step);
        } else if self.key_matches_any(&key, &results.page_up) {
            self.move_selection(-page_step);
        } else if self.key_matches_any(&key, &results.open) {
            self.open_detail();
        } else if self.key_matches_any(&key, &results.house_district) {
            self.cycle_categorical(Categorical::HouseDistrict);
        } else if self.key_matches_any(&key, &results.senate_district) {
            self.cycle_categorical(Categorical::SenateDistrict);
        } else if self.key_matches_any(&key, &results.city) {
            self.cycle_categorical(Categorical::City);
        } else if self.key_matches_any(&key, &results.state) {
            self.cycle_categorical(Categorical::State);
        } else if self.key_matches_any(&key, &results.list_name) {
            self.cycle_categorical(Categorical::ListName);
        } else if self.key_matches_any(&key, &results.linkedin) {
            self.cycle_platform(Platform::LinkedIn);
        } else if self.key_matches_any(&key, &results.website) {
            self.cycle_platform(Platform::Website);
        } else if self.key_matches_any(&key, &results.twitter) {
            self.cycle_platform(Platform::Twitter);
        }

        Ok(false)
    }

    fn handle_detail_modal_key(&mut self, key: KeyEvent) -> Result<()> {
        let config = self.config;
        let modal_keys = &config.keys.modal;

        if self.key_matches_any(&key, &modal_keys.cancel) {
            self.detail_modal = None;
            return Ok(());
        }
        if self.key_matches_any(&key, &modal_keys.next) {
            if let Some(modal) = self.detail_modal.as_mut() {
                modal.advance(1);
            }
            return Ok(());
        }
        if self.key_matches_any(&key, &modal_keys.prev) {
            if let Some(modal) = self.detail_modal.as_mut() {
                modal.advance(-1);
            }
            return Ok(());
        }
        if self.key_matches_any(&key, &modal_keys.copy) {
            let value = self
                .detail_modal
                .as_ref()
                .and_then(|modal| modal.current_value())
                .map(str::to_string);
            match value {
                Some(value) => self.copy_value_to_clipboard(&value)?,
                None => self.set_status("Nothing to copy"),
            }
        }
        Ok(())
    }

    fn handle_help_modal_key(&mut self, key: KeyEvent) {
        let config = self.config;
        let modal_keys = &config.keys.modal;
        let help_keys = &config.keys.global.help;

        if self.key_matches_any(&key, &modal_keys.cancel) || self.key_matches_any(&key, help_keys)
        {
            self.help_modal = None;
            return;
        }

        let delta = if self.key_matches_any(&key, &modal_keys.next) {
            1
        } else if self.key_matches_any(&key, &modal_keys.prev) {
            -1
        } else {
            return;
        };
        if let Some(modal) = self.help_modal.as_mut() {
            modal.scroll_by(delta);
        }
    }

    fn move_selection(&mut self, delta: isize) {
        if self.visible.is_empty() {
            return;
        }
        let last = self.visible.len() as isize - 1;
        let next = (self.selected as isize + delta).clamp(0, last);
        self.selected = next as usize;
        self.table_state.select(Some(self.selected));
    }

    fn open_detail(&mut self) {
        let Some(&index) = self.visible.get(self.selected) else {
            self.set_status("No contact selected");
            return;
        };
        let contact = &self.contacts[index];
        self.detail_modal = Some(DetailModal::new(index, contact));
    }

    pub fn detail_contact(&self) -> Option<&Contact> {
        self.detail_modal
            .as_ref()
            .and_then(|modal| self.contacts.get(modal.contact_index))
    }

    /// Check if the key event matches any of the given bindings
    fn key_matches_any(&self, event: &KeyEvent, bindings: &[String]) -> bool {
        bindings.iter().any(|b| key_matches_single(event, b))
    }

    // =========================================================================
    // Clipboard
    // =========================================================================

    fn copy_value_to_clipboard(&mut self, value: &str) -> Result<()> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.set_status("Nothing to copy");
            return Ok(());
        }

        if let Some(command) = self.config.commands.copy.clone() {
            match run_copy_command(&command, trimmed) {
                Ok(_) => self.set_status("Field copied!"),
                Err(err) => self.set_status(format!("Copy failed: {}", err)),
            }
        } else {
            self.set_status("Copy command not configured");
        }

        Ok(())
    }

    fn set_status<S: Into<String>>(&mut self, message: S) {
        self.status = Some(message.into());
    }

    pub fn ui_colors(&self) -> &UiColors {
        &self.config.ui.colors
    }

    // =========================================================================
    // Help Modal
    // =========================================================================

    /// Generate help content from current keybindings configuration
    pub fn help_entries(&self) -> Vec<HelpSection> {
        let keys = &self.config.keys;
        let entry = |action: &'static str, bindings: &[String]| HelpEntry {
            action,
            keys: bindings.join(", "),
        };

        vec![
            HelpSection {
                title: "Global",
                entries: vec![
                    entry("Quit", &keys.global.quit),
                    entry("Search", &keys.global.search),
                    entry("Help", &keys.global.help),
                    entry("Refresh", &keys.global.refresh),
                    entry("Grid/list view", &keys.global.toggle_view),
                    entry("Clear filters", &keys.global.clear_filters),
                ],
            },
            HelpSection {
                title: "Results",
                entries: vec![
                    entry("Next / down", &keys.results.next),
                    entry("Previous / up", &keys.results.prev),
                    entry("Left", &keys.results.left),
                    entry("Right", &keys.results.right),
                    entry("Page down", &keys.results.page_down),
                    entry("Page up", &keys.results.page_up),
                    entry("Open details", &keys.results.open),
                ],
            },
            HelpSection {
                title: "Filters",
                entries: vec![
                    entry("House district", &keys.results.house_district),
                    entry("Senate district", &keys.results.senate_district),
                    entry("City", &keys.results.city),
                    entry("State", &keys.results.state),
                    entry("List", &keys.results.list_name),
                    entry("Has LinkedIn", &keys.results.linkedin),
                    entry("Has website", &keys.results.website),
                    entry("Has Twitter", &keys.results.twitter),
                ],
            },
            HelpSection {
                title: "Search Input",
                entries: vec![
                    entry("Leave search", &keys.search_input.cancel),
                    entry("Open selected", &keys.search_input.confirm),
                    entry("Next result", &keys.search_input.next),
                    entry("Previous result", &keys.search_input.prev),
                ],
            },
            HelpSection {
                title: "Details",
                entries: vec![
                    entry("Close", &keys.modal.cancel),
                    entry("Next field", &keys.modal.next),
                    entry("Previous field", &keys.modal.prev),
                    entry("Copy field", &keys.modal.copy),
                ],
            },
        ]
    }
}

#[derive(Debug, Clone, Copy)]
enum Categorical {
    HouseDistrict,
    SenateDistrict,
    City,
    State,
    ListName,
}

#[derive(Debug, Clone, Copy)]
enum Platform {
    LinkedIn,
    Website,
    Twitter,
}

fn run_copy_command(command: &CommandExec, value: &str) -> Result<()> {
    let mut child = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn `{}`", command.program))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(value.as_bytes())?;
    }

    let status = child.wait()?;
    if !status.success() {
        bail!("`{}` exited with {}", command.program, status);
    }

    Ok(())
}

/// Check if the key event matches a single binding string
fn key_matches_single(event: &KeyEvent, binding: &str) -> bool {
    let trimmed = binding.trim();
    if trimmed.is_empty() {
        return false;
    }

    // Disallow Ctrl/Alt/Super modifiers (we don't support them)
    let disallowed = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER;
    if event.modifiers.intersects(disallowed) {
        return false;
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "enter" => matches!(event.code, KeyCode::Enter),
        "tab" => matches!(event.code, KeyCode::Tab),
        "backtab" | "shift+tab" => matches!(event.code, KeyCode::BackTab),
        "backspace" => matches!(event.code, KeyCode::Backspace),
        "esc" | "escape" => matches!(event.code, KeyCode::Esc),
        "space" => matches!(event.code, KeyCode::Char(' ')),
        "up" => matches!(event.code, KeyCode::Up),
        "down" => matches!(event.code, KeyCode::Down),
        "left" => matches!(event.code, KeyCode::Left),
        "right" => matches!(event.code, KeyCode::Right),
        "pageup" | "page_up" => matches!(event.code, KeyCode::PageUp),
        "pagedown" | "page_down" => matches!(event.code, KeyCode::PageDown),
        "home" => matches!(event.code, KeyCode::Home),
        "end" => matches!(event.code, KeyCode::End),
        name if name.len() > 1 && name.starts_with('f') => match name[1..].parse::<u8>() {
            Ok(n) if (1..=12).contains(&n) => matches!(event.code, KeyCode::F(k) if k == n),
            _ => false,
        },
        // Single character - case-sensitive (m != M, since M requires Shift)
        _ => {
            let mut chars = trimmed.chars();
            if let (Some(first), None) = (chars.next(), chars.next()) {
                matches!(event.code, KeyCode::Char(c) if c == first)
            } else {
                false
            }
        }
    }
}
