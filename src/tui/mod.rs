mod ui;
mod widgets;

use std::io;
use std::time::Duration;

use chrono::Utc;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::warn;

use cadence::models::{CardWithReview, Collection};
use cadence::{CollectionStats, Database, Error, Rating, RatingPreview, Result, Scheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Cards,
    Review,
}

impl View {
    fn next(&self) -> Self {
        match self {
            View::Dashboard => View::Cards,
            View::Cards => View::Review,
            View::Review => View::Dashboard,
        }
    }

    fn prev(&self) -> Self {
        match self {
            View::Dashboard => View::Review,
            View::Cards => View::Dashboard,
            View::Review => View::Cards,
        }
    }
}

pub struct StatefulList<T> {
    pub items: Vec<T>,
    pub selected: Option<usize>,
}

impl<T> StatefulList<T> {
    fn with_items(items: Vec<T>) -> Self {
        let selected = if items.is_empty() { None } else { Some(0) };
        Self { items, selected }
    }

    fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) if i + 1 < self.items.len() => i + 1,
            _ => 0,
        };
        self.selected = Some(i);
    }

    fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.selected = Some(i);
    }
}

// The card currently being answered in the Review view
pub struct ReviewSession {
    pub queue: Vec<CardWithReview>,
    pub revealed: bool,
    pub preview: Option<RatingPreview>,
    pub reviewed: usize,
    pub last_rating: Option<(Rating, u32)>,
}

impl ReviewSession {
    pub fn current(&self) -> Option<&CardWithReview> {
        self.queue.first()
    }
}

pub struct App {
    db: Database,
    scheduler: Scheduler,
    pub learner: String,
    pub collection: Collection,
    pub view: View,
    pub stats: CollectionStats,
    pub cards: StatefulList<CardWithReview>,
    pub session: ReviewSession,
    pub message: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(db: Database, scheduler: Scheduler, learner: String, collection_id: i64) -> Result<Self> {
        let collection = db
            .get_collection(collection_id)?
            .ok_or_else(|| Error::NotFound(format!("Collection {}", collection_id)))?;
        db.start_learning(&learner, collection_id, Utc::now())?;

        let mut app = Self {
            db,
            scheduler,
            learner,
            collection,
            view: View::Dashboard,
            stats: CollectionStats::default(),
            cards: StatefulList::with_items(Vec::new()),
            session: ReviewSession {
                queue: Vec::new(),
                revealed: false,
                preview: None,
                reviewed: 0,
                last_rating: None,
            },
            message: None,
            should_quit: false,
        };
        app.refresh_data()?;
        Ok(app)
    }

    pub fn refresh_data(&mut self) -> Result<()> {
        let now = Utc::now();
        let id = self.collection.id;
        self.stats = self.db.collection_stats(&self.learner, id, now)?;
        self.cards = StatefulList::with_items(self.db.list_reviews(&self.learner, id)?);

        // Cards still due keep their place (so skips stick); newly due cards go last
        let previous: Vec<i64> = self.session.queue.iter().map(|c| c.card.id).collect();
        let mut queue = self.db.list_due(&self.learner, id, now, 0)?;
        queue.sort_by_key(|c| {
            previous
                .iter()
                .position(|&prev| prev == c.card.id)
                .unwrap_or(usize::MAX)
        });
        self.session.queue = queue;
        self.session.revealed = false;
        self.session.preview = None;
        Ok(())
    }

    fn reveal(&mut self) -> Result<()> {
        if let Some(current) = self.session.current() {
            let preview = self.scheduler.preview(&current.review.record, Utc::now())?;
            self.session.preview = Some(preview);
            self.session.revealed = true;
        }
        Ok(())
    }

    fn rate(&mut self, rating: Rating) -> Result<()> {
        let Some(card_id) = self.session.current().map(|c| c.card.id) else {
            return Ok(());
        };
        let review =
            self.db
                .record_review(&self.learner, card_id, rating, &self.scheduler, Utc::now())?;
        self.session.reviewed += 1;
        self.session.last_rating = Some((rating, review.record.interval_minutes));
        self.refresh_data()
    }

    // Move the current card to the back of the queue without rating it
    fn skip(&mut self) {
        if self.session.queue.len() > 1 {
            self.session.queue.rotate_left(1);
        }
        self.session.revealed = false;
        self.session.preview = None;
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> Result<()> {
        self.message = None;

        if self.view == View::Review {
            match key {
                KeyCode::Char(' ') | KeyCode::Enter if !self.session.revealed => {
                    return self.reveal();
                }
                KeyCode::Char(c @ '1'..='4') if self.session.revealed => {
                    let ordinal = i64::from(c as u8 - b'1');
                    return self.rate(Rating::from_i64(ordinal)?);
                }
                KeyCode::Char('s') => {
                    self.skip();
                    return Ok(());
                }
                _ => {}
            }
        }

        match key {
            KeyCode::Char('q') => self.should_quit = true,

            KeyCode::Char('r') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.refresh_data()?;
            }

            KeyCode::Char('h') | KeyCode::Left => self.view = self.view.prev(),
            KeyCode::Char('l') | KeyCode::Right => self.view = self.view.next(),

            KeyCode::Tab => {
                if modifiers.contains(KeyModifiers::SHIFT) {
                    self.view = self.view.prev();
                } else {
                    self.view = self.view.next();
                }
            }
            KeyCode::BackTab => self.view = self.view.prev(),

            KeyCode::Char('j') | KeyCode::Down if self.view == View::Cards => self.cards.next(),
            KeyCode::Char('k') | KeyCode::Up if self.view == View::Cards => {
                self.cards.previous()
            }
            KeyCode::Char('g') if self.view == View::Cards && !self.cards.items.is_empty() => {
                self.cards.selected = Some(0);
            }
            KeyCode::Char('G') if self.view == View::Cards && !self.cards.items.is_empty() => {
                self.cards.selected = Some(self.cards.items.len() - 1);
            }

            _ => {}
        }
        Ok(())
    }
}

pub fn run(db: Database, scheduler: Scheduler, learner: String, collection_id: i64) -> Result<()> {
    // Fail before touching the terminal if the collection is missing
    let mut app = App::new(db, scheduler, learner, collection_id)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = app.handle_key(key.code, key.modifiers) {
                    // Keep the UI alive; show the problem in the help bar
                    warn!(error = %e, "key handler failed");
                    app.message = Some(e.to_string());
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
