use crate::session::{self, WorkSession};
use chrono::Local;
use std::time::{Duration, Instant};

pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// Stopwatch that accumulates whole seconds across start/stop cycles.
///
/// While running it keeps exactly one pending tick deadline; the tick only
/// refreshes the cached display string and never touches the accumulator.
pub struct FocusTimer {
    accumulated: Duration,
    started_at: Option<Instant>,
    next_tick: Option<Instant>,
    tick: Duration,
    display: String,
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::new(DEFAULT_TICK)
    }
}

impl FocusTimer {
    pub fn new(tick: Duration) -> Self {
        Self {
            accumulated: Duration::ZERO,
            started_at: None,
            next_tick: None,
            tick,
            display: format_hms(0),
        }
    }

    pub fn state(&self) -> TimerState {
        if self.started_at.is_some() {
            TimerState::Running
        } else if self.accumulated > Duration::ZERO {
            TimerState::Paused
        } else {
            TimerState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    pub fn has_time(&self) -> bool {
        self.accumulated > Duration::ZERO
    }

    pub fn tick_armed(&self) -> bool {
        self.next_tick.is_some()
    }

    pub fn elapsed_at(&self, now: Instant) -> Duration {
        match self.started_at {
            Some(start) => self.accumulated + whole_secs(now.saturating_duration_since(start)),
            None => self.accumulated,
        }
    }

    pub fn display_at(&self, now: Instant) -> String {
        format_hms(self.elapsed_at(now).as_secs())
    }

    /// Last display value computed by a tick or a transition.
    pub fn current_display_string(&self) -> &str {
        &self.display
    }

    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    pub fn start_at(&mut self, now: Instant) {
        if self.is_running() {
            return;
        }
        self.started_at = Some(now);
        self.next_tick = Some(deadline(now, self.tick));
        self.display = self.display_at(now);
    }

    pub fn stop(&mut self) {
        self.stop_at(Instant::now());
    }

    pub fn stop_at(&mut self, now: Instant) {
        let Some(start) = self.started_at.take() else {
            return;
        };
        self.next_tick = None;
        self.accumulated += whole_secs(now.saturating_duration_since(start));
        self.display = format_hms(self.accumulated.as_secs());
    }

    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    pub fn reset_at(&mut self, now: Instant) {
        self.stop_at(now);
        self.accumulated = Duration::ZERO;
        self.display = format_hms(0);
    }

    pub fn save(&mut self, name: &str, description: &str) -> WorkSession {
        self.save_at(Instant::now(), name, description)
    }

    /// Stops if needed and turns the accumulated time into a session.
    pub fn save_at(&mut self, now: Instant, name: &str, description: &str) -> WorkSession {
        self.stop_at(now);
        let accumulated = self.accumulated;
        self.accumulated = Duration::ZERO;
        self.display = format_hms(0);

        let end = Local::now();
        let span = chrono::Duration::from_std(accumulated).unwrap_or(chrono::Duration::zero());
        WorkSession {
            name: name.to_string(),
            description: description.to_string(),
            date_string: end.format(session::DATE_FMT).to_string(),
            start_time: Some(end - span),
            end_time: Some(end),
            duration_minutes: accumulated.as_secs() as f64 / 60.0,
            ..WorkSession::default()
        }
    }

    pub fn poll_tick(&mut self) -> Option<&str> {
        self.poll_tick_at(Instant::now())
    }

    /// Refreshes the display once the pending deadline has passed.
    pub fn poll_tick_at(&mut self, now: Instant) -> Option<&str> {
        let due = self.next_tick?;
        if now < due {
            return None;
        }
        let mut next = deadline(due, self.tick);
        if next <= now {
            next = deadline(now, self.tick);
        }
        self.next_tick = Some(next);
        self.display = self.display_at(now);
        Some(&self.display)
    }
}

/// `from + tick`, or one second later when the instant cannot hold that.
fn deadline(from: Instant, tick: Duration) -> Instant {
    from.checked_add(tick)
        .or_else(|| from.checked_add(Duration::from_secs(1)))
        .unwrap_or(from)
}

fn whole_secs(d: Duration) -> Duration {
    Duration::from_secs(d.as_secs())
}

pub fn format_hms(total_secs: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn start_stop_accumulates_whole_seconds() {
        let t0 = Instant::now();
        let mut timer = FocusTimer::default();
        assert_eq!(timer.state(), TimerState::Idle);

        timer.start_at(t0);
        assert_eq!(timer.state(), TimerState::Running);
        timer.stop_at(t0 + Duration::from_millis(90_900));
        assert_eq!(timer.accumulated(), secs(90));
        assert_eq!(timer.state(), TimerState::Paused);
        assert_eq!(timer.current_display_string(), "00:01:30");
    }

    #[test]
    fn accumulates_across_cycles() {
        let t0 = Instant::now();
        let mut timer = FocusTimer::default();
        timer.start_at(t0);
        timer.stop_at(t0 + secs(30));
        timer.start_at(t0 + secs(100));
        timer.stop_at(t0 + secs(160));
        assert_eq!(timer.accumulated(), secs(90));
    }

    #[test]
    fn save_converts_to_minutes_and_goes_idle() {
        let t0 = Instant::now();
        let mut timer = FocusTimer::default();
        timer.start_at(t0);
        timer.stop_at(t0 + secs(90));

        let session = timer.save_at(t0 + secs(200), "Focus", "notes");
        assert_eq!(session.duration_minutes, 1.5);
        assert_eq!(session.name, "Focus");
        assert_eq!(session.description, "notes");
        assert!(!session.date_string.is_empty());
        assert_eq!(session.end_time.zip(session.start_time).map(|(e, s)| (e - s).num_seconds()), Some(90));
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.accumulated(), Duration::ZERO);

        timer.reset_at(t0 + secs(300));
        assert_eq!(timer.accumulated(), Duration::ZERO);
    }

    #[test]
    fn save_while_running_stops_first() {
        let t0 = Instant::now();
        let mut timer = FocusTimer::default();
        timer.start_at(t0);
        let session = timer.save_at(t0 + secs(120), "", "");
        assert_eq!(session.duration_minutes, 2.0);
        assert!(!timer.is_running());
        assert!(!timer.tick_armed());
    }

    #[test]
    fn reset_stops_and_clears() {
        let t0 = Instant::now();
        let mut timer = FocusTimer::default();
        timer.start_at(t0);
        timer.reset_at(t0 + secs(45));
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.current_display_string(), "00:00:00");
        assert!(!timer.tick_armed());
    }

    #[test]
    fn idle_save_yields_zero_minutes() {
        let mut timer = FocusTimer::default();
        timer.stop_at(Instant::now());
        let session = timer.save("x", "");
        assert_eq!(session.duration_minutes, 0.0);
        assert_eq!(timer.state(), TimerState::Idle);
    }

    #[test]
    fn start_while_running_keeps_original_interval() {
        let t0 = Instant::now();
        let mut timer = FocusTimer::default();
        timer.start_at(t0);
        timer.start_at(t0 + secs(10));
        timer.stop_at(t0 + secs(20));
        assert_eq!(timer.accumulated(), secs(20));
    }

    #[test]
    fn tick_only_armed_while_running() {
        let t0 = Instant::now();
        let mut timer = FocusTimer::default();
        assert!(timer.poll_tick_at(t0 + secs(5)).is_none());

        timer.start_at(t0);
        assert!(timer.tick_armed());
        assert!(timer.poll_tick_at(t0 + Duration::from_millis(500)).is_none());
        assert_eq!(timer.poll_tick_at(t0 + secs(1)), Some("00:00:01"));
        assert!(timer.poll_tick_at(t0 + Duration::from_millis(1500)).is_none());
        assert_eq!(timer.poll_tick_at(t0 + secs(3725)), Some("01:02:05"));

        timer.stop_at(t0 + secs(3726));
        assert!(!timer.tick_armed());
        assert!(timer.poll_tick_at(t0 + secs(4000)).is_none());
        assert_eq!(timer.accumulated(), secs(3726));
    }

    #[test]
    fn ticks_do_not_double_count() {
        let t0 = Instant::now();
        let mut timer = FocusTimer::default();
        timer.start_at(t0);
        for n in 1..=10 {
            timer.poll_tick_at(t0 + secs(n));
        }
        assert_eq!(timer.accumulated(), Duration::ZERO);
        timer.stop_at(t0 + secs(10));
        assert_eq!(timer.accumulated(), secs(10));
    }

    #[test]
    fn oversized_tick_does_not_overflow() {
        let t0 = Instant::now();
        let mut timer = FocusTimer::new(Duration::MAX);
        timer.start_at(t0);
        assert!(timer.tick_armed());
        timer.stop_at(t0 + secs(5));
        assert_eq!(timer.accumulated(), secs(5));
    }

    #[test]
    fn formats_hours_past_a_day() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(59), "00:00:59");
        assert_eq!(format_hms(90_000), "25:00:00");
    }
}
