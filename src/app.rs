use crate::error::StoreError;
use crate::session::{SessionId, WorkSession};
use crate::store::SessionLog;
use crate::timer::{FocusTimer, TimerState};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use notify_rust::{Notification, Urgency};
use std::time::Instant;
use tracing::{debug, error, warn};

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Focus {
    Timer,
    NameInput,
    DescriptionInput,
    Sessions,
    EditName,
    EditDescription,
    ConfirmingDelete,
}

#[derive(PartialEq, Clone, Debug)]
pub enum Status {
    Ready,
    Running,
    Paused,
    Saved,
    Problem(String),
}

impl Status {
    pub fn text(&self) -> &str {
        match self {
            Self::Ready => "Ready",
            Self::Running => "Focus mode engaged!",
            Self::Paused => "Paused",
            Self::Saved => "Session saved!",
            Self::Problem(msg) => msg.as_str(),
        }
    }
}

/// Everything the screen shows and every key mutates.
pub struct AppState {
    pub timer: FocusTimer,
    pub log: SessionLog,
    pub name_input: String,
    pub description_input: String,
    pub focus: Focus,
    pub selected: Option<SessionId>,
    pub edit_name: String,
    pub edit_description: String,
    pub status: Status,
    pub show_help: bool,
    pub notifications: bool,
    pub animation_frame: u8,
}

impl AppState {
    pub fn new(timer: FocusTimer, log: SessionLog, notifications: bool) -> Self {
        let mut app = Self {
            timer,
            log,
            name_input: String::new(),
            description_input: String::new(),
            focus: Focus::Timer,
            selected: None,
            edit_name: String::new(),
            edit_description: String::new(),
            status: Status::Ready,
            show_help: false,
            notifications,
            animation_frame: 0,
        };
        app.update_running_state();
        app
    }

    // Mirrors which controls are usable in the current timer state.

    pub fn can_start(&self) -> bool {
        !self.timer.is_running()
    }

    pub fn can_pause(&self) -> bool {
        self.timer.is_running()
    }

    pub fn can_save(&self) -> bool {
        self.timer.is_running() || self.timer.has_time()
    }

    pub fn can_reset(&self) -> bool {
        self.can_save()
    }

    fn update_running_state(&mut self) {
        self.status = match self.timer.state() {
            TimerState::Running => Status::Running,
            TimerState::Paused => Status::Paused,
            TimerState::Idle => Status::Ready,
        };
    }

    pub fn on_start(&mut self, now: Instant) {
        if !self.can_start() {
            return;
        }
        self.timer.start_at(now);
        self.update_running_state();
    }

    pub fn on_stop(&mut self, now: Instant) {
        if !self.can_pause() {
            return;
        }
        self.timer.stop_at(now);
        self.update_running_state();
    }

    pub fn on_reset(&mut self, now: Instant) {
        self.timer.reset_at(now);
        self.update_running_state();
    }

    pub fn on_save(&mut self, now: Instant) {
        let session = self.timer.save_at(now, &self.name_input, &self.description_input);
        if session.name.is_empty() {
            warn!("saving a session without a name; it will not survive a reload");
        }
        let minutes = session.duration_minutes;
        let name = session.name.clone();

        match self.log.append(session) {
            Ok(_) => {
                self.name_input.clear();
                self.description_input.clear();
                self.status = Status::Saved;
                if self.notifications {
                    notify("Session saved!", &format!("{name}: {minutes:.1} min"));
                }
            }
            Err(err) => self.report(err),
        }
    }

    fn report(&mut self, err: StoreError) {
        error!(error = %err, "work log write failed");
        self.status = Status::Problem("Could not write work log".into());
    }

    pub fn on_tick(&mut self, now: Instant) {
        if let Some(shown) = self.timer.poll_tick_at(now) {
            debug!(display = %shown, "tick");
        }
        self.animation_frame = self.animation_frame.wrapping_add(1) % 20;
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected.and_then(|id| self.log.position(id))
    }

    pub fn selected_session(&self) -> Option<&WorkSession> {
        self.selected.and_then(|id| self.log.get(id))
    }

    pub fn edit_duration_label(&self) -> String {
        match self.selected_session() {
            Some(s) => format!("Duration: {:.1} minutes", s.duration_in_minutes()),
            None => "Duration: -".into(),
        }
    }

    /// Copies the selected session into the edit buffers. `false` when
    /// nothing is selected.
    fn load_edit_buffers(&mut self) -> bool {
        let Some((name, description)) = self
            .selected_session()
            .map(|s| (s.name.clone(), s.description.clone()))
        else {
            return false;
        };
        self.edit_name = name;
        self.edit_description = description;
        true
    }

    fn select_index(&mut self, index: usize) {
        self.selected = self.log.id_at(index);
        self.load_edit_buffers();
    }

    fn select_next(&mut self) {
        if self.log.is_empty() {
            return;
        }
        let index = match self.selected_index() {
            Some(idx) => (idx + 1).min(self.log.len() - 1),
            None => 0,
        };
        self.select_index(index);
    }

    fn select_prev(&mut self) {
        if self.log.is_empty() {
            return;
        }
        let index = match self.selected_index() {
            Some(idx) => idx.saturating_sub(1),
            None => self.log.len() - 1,
        };
        self.select_index(index);
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.edit_name.clear();
        self.edit_description.clear();
    }

    fn begin_edit(&mut self) {
        if self.load_edit_buffers() {
            self.focus = Focus::EditName;
        }
    }

    pub fn apply_edit(&mut self) {
        let Some(id) = self.selected else {
            return;
        };
        match self.log.update(id, &self.edit_name, &self.edit_description) {
            Ok(true) => {}
            Ok(false) => self.clear_selection(),
            Err(err) => self.report(err),
        }
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected else {
            return;
        };
        if let Err(err) = self.log.delete(id) {
            self.report(err);
        }
        self.clear_selection();
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> bool {
        self.handle_input_at(key, Instant::now())
    }

    /// Returns `true` when the program should exit.
    pub fn handle_input_at(&mut self, key: KeyEvent, now: Instant) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        if self.show_help {
            self.show_help = false;
            return false;
        }

        match self.focus {
            Focus::NameInput | Focus::DescriptionInput | Focus::EditName | Focus::EditDescription => {
                self.handle_text_input(key);
                false
            }
            Focus::ConfirmingDelete => {
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => {
                        self.delete_selected();
                        self.focus = Focus::Sessions;
                    }
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                        self.focus = Focus::Sessions;
                    }
                    _ => {}
                }
                false
            }
            Focus::Sessions => {
                self.handle_sessions_view(key);
                false
            }
            Focus::Timer => self.handle_timer_view(key, now),
        }
    }

    fn input_buffer(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::NameInput => Some(&mut self.name_input),
            Focus::DescriptionInput => Some(&mut self.description_input),
            Focus::EditName => Some(&mut self.edit_name),
            Focus::EditDescription => Some(&mut self.edit_description),
            _ => None,
        }
    }

    fn handle_text_input(&mut self, key: KeyEvent) {
        let editing_session = matches!(self.focus, Focus::EditName | Focus::EditDescription);
        match key.code {
            KeyCode::Char(_) if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {}
            KeyCode::Char(c) => {
                if let Some(buf) = self.input_buffer() {
                    buf.push(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(buf) = self.input_buffer() {
                    buf.pop();
                }
            }
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::NameInput => Focus::DescriptionInput,
                    Focus::DescriptionInput => Focus::NameInput,
                    Focus::EditName => Focus::EditDescription,
                    _ => Focus::EditName,
                };
            }
            KeyCode::Enter if editing_session => {
                self.apply_edit();
                self.focus = Focus::Sessions;
            }
            KeyCode::Esc if editing_session => {
                self.load_edit_buffers();
                self.focus = Focus::Sessions;
            }
            KeyCode::Enter | KeyCode::Esc => self.focus = Focus::Timer,
            _ => {}
        }
    }

    fn handle_sessions_view(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Tab | KeyCode::Char('q') => self.focus = Focus::Timer,
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.select_prev(),
            KeyCode::Enter | KeyCode::Char('e') => self.begin_edit(),
            KeyCode::Delete | KeyCode::Char('x') => {
                if self.selected_session().is_some() {
                    self.focus = Focus::ConfirmingDelete;
                }
            }
            _ => {}
        }
    }

    fn handle_timer_view(&mut self, key: KeyEvent, now: Instant) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('s') => self.on_start(now),
            KeyCode::Char('p') => self.on_stop(now),
            KeyCode::Char('v') if self.can_save() => self.on_save(now),
            KeyCode::Char('r') if self.can_reset() => self.on_reset(now),
            KeyCode::Char('n') => self.focus = Focus::NameInput,
            KeyCode::Char('d') => self.focus = Focus::DescriptionInput,
            KeyCode::Tab => {
                self.focus = Focus::Sessions;
                if self.selected_index().is_none() {
                    self.select_next();
                }
            }
            KeyCode::Char('h') | KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
        false
    }
}

fn notify(title: &str, body: &str) {
    let shown = Notification::new()
        .summary(title)
        .body(body)
        .appname("nodistractions")
        .icon("alarm-clock")
        .urgency(Urgency::Normal)
        .show();
    if let Err(err) = shown {
        debug!(error = %err, "desktop notification failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::tempdir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_in(dir: &Path) -> AppState {
        let log = SessionLog::open(dir.join("work_log.txt")).expect("open");
        AppState::new(FocusTimer::default(), log, false)
    }

    fn type_text(app: &mut AppState, text: &str, now: Instant) {
        for c in text.chars() {
            app.handle_input_at(key(KeyCode::Char(c)), now);
        }
    }

    fn save_session(app: &mut AppState, name: &str, secs: u64) {
        let t0 = Instant::now();
        app.handle_input_at(key(KeyCode::Char('n')), t0);
        type_text(app, name, t0);
        app.handle_input_at(key(KeyCode::Enter), t0);
        app.handle_input_at(key(KeyCode::Char('s')), t0);
        app.handle_input_at(key(KeyCode::Char('v')), t0 + Duration::from_secs(secs));
    }

    #[test]
    fn start_pause_save_records_session() {
        let dir = tempdir().expect("tempdir");
        let mut app = app_in(dir.path());
        let t0 = Instant::now();

        app.handle_input_at(key(KeyCode::Char('n')), t0);
        type_text(&mut app, "Deep work", t0);
        app.handle_input_at(key(KeyCode::Tab), t0);
        type_text(&mut app, "parser", t0);
        app.handle_input_at(key(KeyCode::Esc), t0);
        assert_eq!(app.focus, Focus::Timer);

        app.handle_input_at(key(KeyCode::Char('s')), t0);
        assert_eq!(app.status, Status::Running);
        app.handle_input_at(key(KeyCode::Char('p')), t0 + Duration::from_secs(90));
        assert_eq!(app.status, Status::Paused);
        app.handle_input_at(key(KeyCode::Char('v')), t0 + Duration::from_secs(95));

        assert_eq!(app.status, Status::Saved);
        assert_eq!(app.status.text(), "Session saved!");
        assert!(app.name_input.is_empty());
        assert!(app.description_input.is_empty());
        assert_eq!(app.timer.current_display_string(), "00:00:00");

        let reloaded = SessionLog::open(dir.path().join("work_log.txt")).expect("open");
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.sessions()[0].name, "Deep work");
        assert_eq!(reloaded.sessions()[0].description, "parser");
        assert_eq!(reloaded.sessions()[0].duration_minutes, 1.5);
    }

    #[test]
    fn insensitive_actions_are_ignored() {
        let dir = tempdir().expect("tempdir");
        let mut app = app_in(dir.path());
        let t0 = Instant::now();

        assert!(!app.can_save());
        app.handle_input_at(key(KeyCode::Char('v')), t0);
        app.handle_input_at(key(KeyCode::Char('p')), t0);
        app.handle_input_at(key(KeyCode::Char('r')), t0);
        assert!(app.log.is_empty());
        assert_eq!(app.status, Status::Ready);

        app.handle_input_at(key(KeyCode::Char('s')), t0);
        assert!(!app.can_start());
        assert!(app.can_pause() && app.can_save() && app.can_reset());
    }

    #[test]
    fn reset_returns_to_ready() {
        let dir = tempdir().expect("tempdir");
        let mut app = app_in(dir.path());
        let t0 = Instant::now();
        app.handle_input_at(key(KeyCode::Char('s')), t0);
        app.handle_input_at(key(KeyCode::Char('r')), t0 + Duration::from_secs(30));
        assert_eq!(app.status, Status::Ready);
        assert!(!app.timer.has_time());
        assert!(app.log.is_empty());
    }

    #[test]
    fn edits_selected_session_and_keeps_selection() {
        let dir = tempdir().expect("tempdir");
        let mut app = app_in(dir.path());
        save_session(&mut app, "one", 60);
        save_session(&mut app, "two", 120);
        let now = Instant::now();

        app.handle_input_at(key(KeyCode::Tab), now);
        assert_eq!(app.selected_index(), Some(0));
        app.handle_input_at(key(KeyCode::Char('j')), now);
        assert_eq!(app.edit_duration_label(), "Duration: 2.0 minutes");

        app.handle_input_at(key(KeyCode::Char('e')), now);
        assert_eq!(app.focus, Focus::EditName);
        for _ in 0.."two".len() {
            app.handle_input_at(key(KeyCode::Backspace), now);
        }
        type_text(&mut app, "X", now);
        app.handle_input_at(key(KeyCode::Tab), now);
        type_text(&mut app, "Y", now);
        app.handle_input_at(key(KeyCode::Enter), now);

        assert_eq!(app.focus, Focus::Sessions);
        assert_eq!(app.selected_index(), Some(1));
        let reloaded = SessionLog::open(dir.path().join("work_log.txt")).expect("open");
        assert_eq!(reloaded.sessions()[0].name, "one");
        assert_eq!(reloaded.sessions()[1].name, "X");
        assert_eq!(reloaded.sessions()[1].description, "Y");
        assert_eq!(reloaded.sessions()[1].duration_minutes, 2.0);
    }

    #[test]
    fn escape_discards_edit() {
        let dir = tempdir().expect("tempdir");
        let mut app = app_in(dir.path());
        save_session(&mut app, "keep", 60);
        let now = Instant::now();

        app.handle_input_at(key(KeyCode::Tab), now);
        app.handle_input_at(key(KeyCode::Enter), now);
        type_text(&mut app, "junk", now);
        app.handle_input_at(key(KeyCode::Esc), now);

        assert_eq!(app.edit_name, "keep");
        assert_eq!(app.log.sessions()[0].name, "keep");
    }

    #[test]
    fn delete_needs_confirmation() {
        let dir = tempdir().expect("tempdir");
        let mut app = app_in(dir.path());
        save_session(&mut app, "a", 60);
        save_session(&mut app, "b", 60);
        let now = Instant::now();

        app.handle_input_at(key(KeyCode::Tab), now);
        app.handle_input_at(key(KeyCode::Char('x')), now);
        assert_eq!(app.focus, Focus::ConfirmingDelete);
        app.handle_input_at(key(KeyCode::Char('n')), now);
        assert_eq!(app.log.len(), 2);

        app.handle_input_at(key(KeyCode::Char('x')), now);
        app.handle_input_at(key(KeyCode::Char('y')), now);
        assert_eq!(app.log.len(), 1);
        assert_eq!(app.log.sessions()[0].name, "b");
        assert_eq!(app.selected, None);
        assert_eq!(app.edit_duration_label(), "Duration: -");
    }

    #[test]
    fn quit_keys() {
        let dir = tempdir().expect("tempdir");
        let mut app = app_in(dir.path());
        let now = Instant::now();

        app.handle_input_at(key(KeyCode::Char('n')), now);
        assert!(!app.handle_input_at(key(KeyCode::Char('q')), now));
        assert_eq!(app.name_input, "q");
        assert!(app.handle_input_at(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), now));

        app.focus = Focus::Timer;
        assert!(app.handle_input_at(key(KeyCode::Char('q')), now));
    }

    #[test]
    fn modified_chars_are_not_typed() {
        let dir = tempdir().expect("tempdir");
        let mut app = app_in(dir.path());
        let now = Instant::now();

        app.handle_input_at(key(KeyCode::Char('n')), now);
        app.handle_input_at(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL), now);
        app.handle_input_at(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT), now);
        app.handle_input_at(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT), now);
        assert_eq!(app.name_input, "A");
    }

    #[test]
    fn failed_save_keeps_inputs_and_reports() {
        let dir = tempdir().expect("tempdir");
        let target = dir.path().join("occupied");
        std::fs::create_dir(&target).expect("mkdir");
        let mut app = AppState::new(FocusTimer::default(), SessionLog::new(&target), false);
        let t0 = Instant::now();

        app.handle_input_at(key(KeyCode::Char('n')), t0);
        type_text(&mut app, "draft", t0);
        app.handle_input_at(key(KeyCode::Enter), t0);
        app.handle_input_at(key(KeyCode::Char('s')), t0);
        app.handle_input_at(key(KeyCode::Char('v')), t0 + Duration::from_secs(60));

        assert_eq!(app.status.text(), "Could not write work log");
        assert_eq!(app.log.len(), 1);
        assert_eq!(app.log.sessions()[0].name, "draft");
        assert_eq!(app.name_input, "draft");
    }

    #[test]
    fn help_overlay_swallows_next_key() {
        let dir = tempdir().expect("tempdir");
        let mut app = app_in(dir.path());
        let now = Instant::now();
        app.handle_input_at(key(KeyCode::Char('?')), now);
        assert!(app.show_help);
        assert!(!app.handle_input_at(key(KeyCode::Char('q')), now));
        assert!(!app.show_help);
    }

    #[test]
    fn tick_refreshes_display_while_running() {
        let dir = tempdir().expect("tempdir");
        let mut app = app_in(dir.path());
        let t0 = Instant::now();
        app.on_start(t0);
        app.on_tick(t0 + Duration::from_secs(65));
        assert_eq!(app.timer.current_display_string(), "00:01:05");
    }
}
