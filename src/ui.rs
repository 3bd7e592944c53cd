use crate::models::{Session, Species};
use crate::views;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::io;

/// Represents a catalogue entry in the UI with its session count
#[derive(Clone, Debug)]
pub struct SpeciesItem {
    pub species: Species,
    pub count: i64,
}

impl SpeciesItem {
    /// Get display text for the species
    pub fn display_text(&self) -> String {
        let family = self.species.family.as_deref().unwrap_or("-");
        format!(
            "[{}] {} | {}",
            self.species.abbreviation, self.species.name, family
        )
    }
}

#[derive(Clone, Copy, PartialEq)]
pub enum FilterMode {
    All,
    SeenOnly,
    UnseenOnly,
}

/// UI state for picking the species of the next sighting
pub struct SpeciesSelector {
    catalogue: Vec<Species>,
    session: Session,
    pub items: Vec<SpeciesItem>,
    pub search: String,
    pub list_state: ListState,
    pub filter_mode: FilterMode,
}

impl SpeciesSelector {
    pub fn new(catalogue: Vec<Species>, session: Session) -> Self {
        let mut selector = Self {
            catalogue,
            session,
            items: Vec::new(),
            search: String::new(),
            list_state: ListState::default(),
            filter_mode: FilterMode::All,
        };
        selector.refresh();
        selector
    }

    /// Rebuilds the visible list from current search and filter state.
    /// Ordering comes from the derived view, never from cached state.
    pub fn refresh(&mut self) {
        let totals = views::species_totals(&self.session);
        self.items = views::sorted_catalogue(&self.catalogue, &self.session, &self.search)
            .into_iter()
            .map(|species| SpeciesItem {
                count: totals.get(&species.id).copied().unwrap_or(0),
                species: species.clone(),
            })
            .filter(|item| match self.filter_mode {
                FilterMode::All => true,
                FilterMode::SeenOnly => item.count > 0,
                FilterMode::UnseenOnly => item.count == 0,
            })
            .collect();

        if self.items.is_empty() {
            self.list_state.select(None);
        } else {
            self.list_state.select(Some(0));
        }
    }

    pub fn toggle_filter(&mut self) {
        self.filter_mode = match self.filter_mode {
            FilterMode::All => FilterMode::SeenOnly,
            FilterMode::SeenOnly => FilterMode::UnseenOnly,
            FilterMode::UnseenOnly => FilterMode::All,
        };
        self.refresh();
    }

    pub fn push_search(&mut self, c: char) {
        self.search.push(c);
        self.refresh();
    }

    pub fn pop_search(&mut self) {
        self.search.pop();
        self.refresh();
    }

    pub fn next(&mut self) {
        if self.items.is_empty() {
            self.list_state.select(None);
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => {
                if i >= self.items.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.items.is_empty() {
            self.list_state.select(None);
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.items.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn selected_species(&self) -> Option<&Species> {
        self.list_state
            .selected()
            .and_then(|i| self.items.get(i))
            .map(|item| &item.species)
    }
}

/// Render the UI
pub fn render_ui(f: &mut Frame, state: &SpeciesSelector) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search box
            Constraint::Min(10),   // Species list
            Constraint::Length(3), // Status/instructions
        ])
        .split(f.area());

    let search = Paragraph::new(format!("Search: {}", state.search))
        .style(
            Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);
    f.render_widget(search, chunks[0]);

    let items: Vec<ListItem> = state
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let count_indicator = if item.count > 0 {
                Span::styled(
                    format!(" [{}]", item.count),
                    Style::default().fg(Color::Cyan),
                )
            } else {
                Span::styled(" [0]", Style::default().fg(Color::Gray))
            };
            let style = if state.list_state.selected() == Some(i) {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else if item.count > 0 {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(item.display_text(), style),
                count_indicator,
            ]))
        })
        .collect();

    let filter_text = match state.filter_mode {
        FilterMode::All => "All",
        FilterMode::SeenOnly => "Seen",
        FilterMode::UnseenOnly => "Unseen",
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(
            "Species ({} shown, Filter: {})",
            state.items.len(),
            filter_text
        )))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

    f.render_stateful_widget(list, chunks[1], &mut state.list_state.clone());

    let instructions =
        "Type: Search | ↑↓: Navigate | Enter: Record | Tab: Filter | Esc: Cancel".to_string();
    let footer = Paragraph::new(instructions)
        .style(Style::default().fg(Color::White))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);
    f.render_widget(footer, chunks[2]);
}

/// Run the species selector UI, returning the chosen species if any
pub async fn run_species_selector(
    catalogue: Vec<Species>,
    session: Session,
) -> Result<Option<Species>, Box<dyn std::error::Error>> {
    // Setup terminal
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = SpeciesSelector::new(catalogue, session);
    let mut chosen: Option<Species> = None;

    loop {
        terminal.draw(|f| render_ui(f, &state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match key.code {
                KeyCode::Esc => {
                    break;
                }
                KeyCode::Up => {
                    state.previous();
                }
                KeyCode::Down => {
                    state.next();
                }
                KeyCode::Tab => {
                    state.toggle_filter();
                }
                KeyCode::Backspace => {
                    state.pop_search();
                }
                KeyCode::Enter => {
                    if let Some(species) = state.selected_species() {
                        chosen = Some(species.clone());
                        break;
                    }
                }
                KeyCode::Char(c) => {
                    state.push_search(c);
                }
                _ => {}
            }
        }
    }

    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen
    )?;
    crossterm::terminal::disable_raw_mode()?;

    Ok(chosen)
}
