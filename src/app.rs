use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::QuizError;
use crate::config::Settings;
use crate::library::{self, Library};
use crate::models::{Question, QuizSummary};
use crate::parser::Parser;
use crate::session::{Countdown, QuizSession, ScoreReport, SessionError, SessionEvent};
use crate::store::QuizStore;
use crate::terminal::{self, QuizTerminal};
use crate::ui;

/// How long a notice stays on screen.
const NOTICE_DURATION: Duration = Duration::from_secs(3);
const POLL_INTERVAL: Duration = Duration::from_millis(100);
const TIME_LIMIT_STEP: u32 = 5;
const NAME_MAX_LENGTH: usize = 60;
const PATH_MAX_LENGTH: usize = 4096;
/// Questions skipped by PageUp/PageDown.
const QUESTION_PAGE: usize = 10;

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Quiz,
    Result,
}

/// Input mode on the home screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeMode {
    Browse,
    /// Typing a name for the draft before saving it.
    Naming(String),
    /// Waiting for confirmation before deleting a stored quiz.
    ConfirmDelete(Uuid),
    /// Typing the path of a question file to load as the draft.
    OpenFile(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A short-lived message shown at the bottom of the screen.
#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    shown_at: Instant,
}

pub struct App {
    pub screen: Screen,
    pub home_mode: HomeMode,
    pub settings: Settings,
    pub should_quit: bool,
    library: Library,
    parser: Parser,
    session: QuizSession,
    countdown: Countdown,
    /// Questions of the quiz being played, kept for a retake.
    source: Vec<Question>,
    title: String,
    selected_entry: usize,
    selected_option: usize,
    result_scroll: usize,
    notice: Option<Notice>,
}

impl App {
    pub fn new(library: Library, settings: Settings, parser: Parser) -> Self {
        Self {
            screen: Screen::Home,
            home_mode: HomeMode::Browse,
            settings,
            should_quit: false,
            library,
            parser,
            session: QuizSession::new(),
            countdown: Countdown::new(),
            source: Vec::new(),
            title: String::new(),
            selected_entry: 0,
            selected_option: 0,
            result_scroll: 0,
            notice: None,
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn selected_entry(&self) -> usize {
        self.selected_entry
    }

    /// The highlighted stored quiz. None while offline, since the listing
    /// on screen is hidden and may be stale.
    pub fn selected_summary(&self) -> Option<&QuizSummary> {
        if self.library.is_offline() {
            return None;
        }
        self.library.entries().get(self.selected_entry)
    }

    pub fn selected_option(&self) -> usize {
        self.selected_option
    }

    pub fn result_scroll(&self) -> usize {
        self.result_scroll
    }

    pub fn report(&self) -> Option<ScoreReport> {
        self.session.report()
    }

    pub fn countdown_running(&self) -> bool {
        self.countdown.is_running()
    }

    /// The current notice, unless it has expired.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice
            .as_ref()
            .filter(|n| n.shown_at.elapsed() < NOTICE_DURATION)
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.show_notice(message.into(), NoticeKind::Info);
    }

    pub fn notify_error(&mut self, message: impl Into<String>) {
        self.show_notice(message.into(), NoticeKind::Error);
    }

    fn show_notice(&mut self, message: String, kind: NoticeKind) {
        self.notice = Some(Notice {
            message,
            kind,
            shown_at: Instant::now(),
        });
    }

    // ---- library ----

    pub async fn refresh<S: QuizStore>(&mut self, store: &mut S) {
        if self.library.refresh(store).await.is_err() {
            self.notify_error("Cannot reach the quiz collection");
        }
        self.clamp_selection();
    }

    pub fn select_next_entry(&mut self) {
        let len = self.library.entries().len();
        if len > 0 {
            self.selected_entry = (self.selected_entry + 1) % len;
        }
    }

    pub fn select_previous_entry(&mut self) {
        let len = self.library.entries().len();
        if len > 0 {
            self.selected_entry = (self.selected_entry + len - 1) % len;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.library.entries().len();
        self.selected_entry = self.selected_entry.min(len.saturating_sub(1));
    }

    /// Open the selected stored quiz and start it.
    pub async fn play_selected<S: QuizStore>(
        &mut self,
        store: &mut S,
        ticks: &mpsc::UnboundedSender<SessionEvent>,
    ) {
        let Some(id) = self.selected_summary().map(|s| s.id) else {
            return;
        };

        match self.library.open(store, id).await {
            Ok(document) => {
                self.start_quiz(document.questions, document.name, ticks);
            }
            Err(e) => self.notify_error(format!("Failed to load quiz: {}", e)),
        }
    }

    /// Start the unsaved draft without saving it.
    pub fn play_draft(&mut self, ticks: &mpsc::UnboundedSender<SessionEvent>) {
        let draft = self.library.draft().to_vec();
        self.start_quiz(draft, "Draft".to_string(), ticks);
    }

    /// Parse pasted text into the draft.
    pub fn paste_text(&mut self, text: &str) {
        match self.library.paste(text, &self.parser) {
            Ok(count) => self.notify(format!("Parsed {} questions into the draft", count)),
            Err(e) => self.notify_error(format!("Paste failed: {}", e)),
        }
    }

    /// Load a question file into the draft.
    pub fn open_file(&mut self, path: &str) {
        let path = path.trim();
        if path.is_empty() {
            return;
        }
        match self.library.upload(path, &self.parser) {
            Ok(count) => self.notify(format!("Loaded {} questions into the draft", count)),
            Err(e) => self.notify_error(format!("Cannot load {}: {}", path, e)),
        }
    }

    /// Route a terminal paste to the path prompt or the draft.
    pub fn handle_paste(&mut self, text: &str) {
        if self.screen != Screen::Home {
            return;
        }
        if let HomeMode::OpenFile(path) = &mut self.home_mode {
            let room = PATH_MAX_LENGTH.saturating_sub(path.chars().count());
            path.extend(text.chars().filter(|c| !c.is_control()).take(room));
            return;
        }
        if self.home_mode == HomeMode::Browse {
            self.paste_text(text);
        }
    }

    pub fn begin_naming(&mut self) {
        if self.library.draft().is_empty() {
            self.notify_error("No questions to save");
            return;
        }
        self.home_mode = HomeMode::Naming(library::default_quiz_name());
    }

    pub async fn save_draft<S: QuizStore>(&mut self, store: &mut S, name: &str) {
        if name.trim().is_empty() {
            return;
        }
        match self.library.save_draft(store, name).await {
            Ok(document) => {
                self.notify(format!("Saved \"{}\" ({} questions)", document.name, document.count))
            }
            Err(e) => self.notify_error(format!("Save failed: {}", e)),
        }
        self.clamp_selection();
    }

    pub fn begin_delete(&mut self) {
        if let Some(id) = self.selected_summary().map(|s| s.id) {
            self.home_mode = HomeMode::ConfirmDelete(id);
        }
    }

    pub async fn delete<S: QuizStore>(&mut self, store: &mut S, id: Uuid) {
        match self.library.delete(store, id).await {
            Ok(()) => self.notify("Quiz deleted"),
            Err(e) => self.notify_error(format!("Delete failed: {}", e)),
        }
        self.clamp_selection();
    }

    // ---- quiz ----

    /// Start a session over `questions` and its countdown.
    pub fn start_quiz(
        &mut self,
        questions: Vec<Question>,
        title: String,
        ticks: &mpsc::UnboundedSender<SessionEvent>,
    ) {
        let Settings {
            time_limit_minutes,
            shuffle,
        } = self.settings;

        if let Err(e) = self.session.start(&questions, time_limit_minutes, shuffle) {
            self.notify_error(e.to_string());
            return;
        }

        self.countdown.start(ticks.clone());
        self.source = questions;
        self.title = title;
        self.selected_option = 0;
        self.result_scroll = 0;
        self.screen = Screen::Quiz;
        self.notify(format!("Started: {}", self.title));
    }

    /// Start the last played quiz again.
    pub fn retake(&mut self, ticks: &mpsc::UnboundedSender<SessionEvent>) {
        let questions = std::mem::take(&mut self.source);
        let title = std::mem::take(&mut self.title);
        self.start_quiz(questions, title, ticks);
    }

    pub fn select_next_option(&mut self) {
        let len = self.option_count();
        if len > 0 {
            self.selected_option = (self.selected_option + 1) % len;
        }
    }

    pub fn select_previous_option(&mut self) {
        let len = self.option_count();
        if len > 0 {
            self.selected_option = (self.selected_option + len - 1) % len;
        }
    }

    fn option_count(&self) -> usize {
        self.session
            .current_question()
            .map_or(0, |question| question.answers.len())
    }

    pub fn choose_option(&mut self) {
        let result = self.session.select_answer(self.selected_option);
        self.ignore(result);
    }

    pub fn next_question(&mut self) {
        let result = self.session.next();
        self.ignore(result);
        self.sync_option_cursor();
    }

    pub fn previous_question(&mut self) {
        let result = self.session.prev();
        self.ignore(result);
        self.sync_option_cursor();
    }

    pub fn go_to_question(&mut self, index: usize) {
        let result = self.session.go_to(index);
        self.ignore(result);
        self.sync_option_cursor();
    }

    /// Jump forward, stopping at the last question.
    pub fn skip_forward(&mut self, count: usize) {
        let last = self.session.questions().len().saturating_sub(1);
        self.go_to_question(self.session.current_index().saturating_add(count).min(last));
    }

    /// Jump back, stopping at the first question.
    pub fn skip_back(&mut self, count: usize) {
        self.go_to_question(self.session.current_index().saturating_sub(count));
    }

    pub fn submit(&mut self) {
        let result = self.session.submit();
        self.ignore(result);
        self.after_session_change();
    }

    /// Apply a countdown event. Ticks from a cancelled countdown are dropped.
    pub fn handle_session_event(&mut self, event: SessionEvent) {
        if !self.countdown.is_current(event) {
            debug!(?event, "stale countdown event ignored");
            return;
        }

        match self.session.tick() {
            Ok(Some(_)) => self.notify("Time is up"),
            Ok(None) => {}
            Err(e) => debug!(error = %e, "tick ignored"),
        }
        self.after_session_change();
    }

    /// Discard any session and return to the library.
    pub async fn go_home<S: QuizStore>(&mut self, store: &mut S) {
        self.countdown.cancel();
        self.session.reset();
        self.home_mode = HomeMode::Browse;
        self.screen = Screen::Home;
        self.refresh(store).await;
    }

    pub fn scroll_results_down(&mut self) {
        let max_scroll = self.session.questions().len().saturating_sub(1);
        self.result_scroll = (self.result_scroll + 1).min(max_scroll);
    }

    pub fn scroll_results_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(1);
    }

    fn after_session_change(&mut self) {
        if !self.session.is_active() {
            self.countdown.cancel();
            if self.session.report().is_some() {
                self.screen = Screen::Result;
            }
        }
    }

    fn sync_option_cursor(&mut self) {
        self.selected_option = self.session.current_answer().unwrap_or(0);
    }

    fn ignore<T>(&self, result: Result<T, SessionError>) {
        if let Err(e) = result {
            debug!(error = %e, "session operation ignored");
        }
    }

    // ---- input ----

    /// Handle a key press. Returns true if the app should exit.
    pub async fn handle_key<S: QuizStore>(
        &mut self,
        key: KeyCode,
        store: &mut S,
        ticks: &mpsc::UnboundedSender<SessionEvent>,
    ) -> bool {
        match self.screen {
            Screen::Home => self.handle_home_key(key, store, ticks).await,
            Screen::Quiz => self.handle_quiz_key(key, store).await,
            Screen::Result => self.handle_result_key(key, store, ticks).await,
        }
        self.should_quit
    }

    async fn handle_home_key<S: QuizStore>(
        &mut self,
        key: KeyCode,
        store: &mut S,
        ticks: &mpsc::UnboundedSender<SessionEvent>,
    ) {
        match std::mem::replace(&mut self.home_mode, HomeMode::Browse) {
            HomeMode::Naming(mut name) => match key {
                KeyCode::Enter => self.save_draft(store, &name).await,
                KeyCode::Esc => {}
                KeyCode::Backspace => {
                    name.pop();
                    self.home_mode = HomeMode::Naming(name);
                }
                KeyCode::Char(c) => {
                    if name.chars().count() < NAME_MAX_LENGTH {
                        name.push(c);
                    }
                    self.home_mode = HomeMode::Naming(name);
                }
                _ => self.home_mode = HomeMode::Naming(name),
            },
            HomeMode::OpenFile(mut path) => match key {
                KeyCode::Enter => self.open_file(&path),
                KeyCode::Esc => {}
                KeyCode::Backspace => {
                    path.pop();
                    self.home_mode = HomeMode::OpenFile(path);
                }
                KeyCode::Char(c) => {
                    if path.chars().count() < PATH_MAX_LENGTH {
                        path.push(c);
                    }
                    self.home_mode = HomeMode::OpenFile(path);
                }
                _ => self.home_mode = HomeMode::OpenFile(path),
            },
            HomeMode::ConfirmDelete(id) => {
                if matches!(key, KeyCode::Char('y') | KeyCode::Char('Y')) {
                    self.delete(store, id).await;
                }
            }
            HomeMode::Browse => match key {
                KeyCode::Down | KeyCode::Char('j') => self.select_next_entry(),
                KeyCode::Up | KeyCode::Char('k') => self.select_previous_entry(),
                KeyCode::Enter => self.play_selected(store, ticks).await,
                KeyCode::Char('n') => self.play_draft(ticks),
                KeyCode::Char('s') => self.begin_naming(),
                KeyCode::Char('o') => self.home_mode = HomeMode::OpenFile(String::new()),
                KeyCode::Char('d') | KeyCode::Delete => self.begin_delete(),
                KeyCode::Char('r') => self.refresh(store).await,
                KeyCode::Char('+') | KeyCode::Char('=') => {
                    self.settings.increase_time_limit(TIME_LIMIT_STEP)
                }
                KeyCode::Char('-') => self.settings.decrease_time_limit(TIME_LIMIT_STEP),
                KeyCode::Char('x') => self.settings.toggle_shuffle(),
                KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
                _ => {}
            },
        }
    }

    async fn handle_quiz_key<S: QuizStore>(&mut self, key: KeyCode, store: &mut S) {
        match key {
            KeyCode::Up | KeyCode::Char('k') => self.select_previous_option(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next_option(),
            KeyCode::Enter | KeyCode::Char(' ') => self.choose_option(),
            KeyCode::Right | KeyCode::Char('l') => self.next_question(),
            KeyCode::Left | KeyCode::Char('h') => self.previous_question(),
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                self.go_to_question(index);
            }
            KeyCode::PageDown => self.skip_forward(QUESTION_PAGE),
            KeyCode::PageUp => self.skip_back(QUESTION_PAGE),
            KeyCode::Home => self.go_to_question(0),
            KeyCode::End => self.skip_forward(usize::MAX),
            KeyCode::Char('s') => self.submit(),
            KeyCode::Esc => self.go_home(store).await,
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }

    async fn handle_result_key<S: QuizStore>(
        &mut self,
        key: KeyCode,
        store: &mut S,
        ticks: &mpsc::UnboundedSender<SessionEvent>,
    ) {
        match key {
            KeyCode::Down | KeyCode::Char('j') => self.scroll_results_down(),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_results_up(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.retake(ticks),
            KeyCode::Enter | KeyCode::Esc => self.go_home(store).await,
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }
}

/// Take over the terminal and run the quiz UI until the user quits.
pub async fn run<S: QuizStore>(app: &mut App, store: &mut S) -> Result<(), QuizError> {
    let mut terminal = terminal::init()?;
    let result = run_event_loop(&mut terminal, app, store).await;
    terminal::restore()?;
    result
}

async fn run_event_loop<S: QuizStore>(
    terminal: &mut QuizTerminal,
    app: &mut App,
    store: &mut S,
) -> Result<(), QuizError> {
    let (ticks, mut pending) = mpsc::unbounded_channel();
    app.refresh(store).await;
    info!(entries = app.library().entries().len(), "quiz ui started");

    loop {
        while let Ok(tick) = pending.try_recv() {
            app.handle_session_event(tick);
        }

        terminal.draw(|frame| ui::render(frame, app))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let key = match event::read()? {
            Event::Key(key) => key,
            Event::Paste(text) => {
                app.handle_paste(&text);
                continue;
            }
            _ => continue,
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let interrupted =
            key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
        if interrupted || app.handle_key(key.code, store, &ticks).await {
            break;
        }
    }

    Ok(())
}
