// 🔍 List filtering - status filter, name search, debounced search input

use crate::types::{Application, ApplicationStatus};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// Quiet period before typed search text is applied
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

// ============================================================================
// STATUS FILTER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ApplicationStatus),
}

impl StatusFilter {
    pub fn matches(&self, app: &Application) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => app.status == *status,
        }
    }

    /// All → New → Approved → Rejected → All
    pub fn next(&self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Only(ApplicationStatus::New),
            StatusFilter::Only(ApplicationStatus::Rejected) => StatusFilter::All,
            StatusFilter::Only(status) => StatusFilter::Only(status.next()),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Only(status) => status.as_str(),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse::<ApplicationStatus>().map(StatusFilter::Only)
    }
}

// ============================================================================
// NAME SEARCH
// ============================================================================

/// Case-insensitive substring match on the applicant's name.
/// A blank term matches everything.
pub fn matches_search(app: &Application, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }
    app.name.to_lowercase().contains(&term.to_lowercase())
}

/// Status filter first, then name search
pub fn filter_applications(
    apps: &[Application],
    filter: StatusFilter,
    term: &str,
) -> Vec<Application> {
    apps.iter()
        .filter(|app| filter.matches(app))
        .filter(|app| matches_search(app, term))
        .cloned()
        .collect()
}

// ============================================================================
// DEBOUNCED SEARCH
// ============================================================================

/// Search box whose text is applied only after typing pauses
///
/// The clock is passed in so the event loop (and tests) control time.
#[derive(Debug, Clone)]
pub struct DebouncedSearch {
    input: String,
    applied: String,
    last_edit: Option<Instant>,
    delay: Duration,
}

impl DebouncedSearch {
    pub fn new(delay: Duration) -> Self {
        DebouncedSearch {
            input: String::new(),
            applied: String::new(),
            last_edit: None,
            delay,
        }
    }

    /// Text as typed
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Text currently used for filtering
    pub fn term(&self) -> &str {
        &self.applied
    }

    pub fn is_pending(&self) -> bool {
        self.last_edit.is_some()
    }

    pub fn set_input(&mut self, value: &str, now: Instant) {
        self.input = value.to_string();
        self.last_edit = Some(now);
    }

    pub fn push(&mut self, ch: char, now: Instant) {
        self.input.push(ch);
        self.last_edit = Some(now);
    }

    pub fn pop(&mut self, now: Instant) {
        if self.input.pop().is_some() {
            self.last_edit = Some(now);
        }
    }

    /// Apply pending input once the delay has elapsed. Returns true when the
    /// applied term changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.last_edit {
            Some(edited) if now.duration_since(edited) >= self.delay => {
                self.last_edit = None;
                if self.applied != self.input {
                    self.applied = self.input.clone();
                    return true;
                }
                false
            }
            _ => false,
        }
    }
}

impl Default for DebouncedSearch {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(id: &str, name: &str, status: ApplicationStatus) -> Application {
        Application {
            id: id.to_string(),
            name: name.to_string(),
            account: "40817810500000001234".to_string(),
            current_limit: 10_000,
            requested_limit: 20_000,
            currency: "RUB".to_string(),
            status,
        }
    }

    fn sample() -> Vec<Application> {
        vec![
            app("1", "Ivan Ivanov", ApplicationStatus::New),
            app("2", "Anna Sidorova", ApplicationStatus::Rejected),
            app("3", "Maria Kozlova", ApplicationStatus::New),
            app("4", "Dmitry Petrov", ApplicationStatus::Approved),
        ]
    }

    fn ids(apps: &[Application]) -> Vec<&str> {
        apps.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_all_is_pass_through() {
        let apps = sample();
        assert_eq!(filter_applications(&apps, StatusFilter::All, ""), apps);
    }

    #[test]
    fn test_status_filter_exact_match() {
        let apps = sample();
        let filtered =
            filter_applications(&apps, StatusFilter::Only(ApplicationStatus::New), "");
        assert_eq!(ids(&filtered), vec!["1", "3"]);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let apps = sample();
        let filtered = filter_applications(&apps, StatusFilter::All, "OVA");
        assert_eq!(ids(&filtered), vec!["2", "3"]);
    }

    #[test]
    fn test_search_handles_non_ascii_names() {
        let apps = vec![app("1", "Иванов Иван", ApplicationStatus::New)];
        assert_eq!(filter_applications(&apps, StatusFilter::All, "иван").len(), 1);
    }

    #[test]
    fn test_blank_search_is_pass_through() {
        let apps = sample();
        assert_eq!(filter_applications(&apps, StatusFilter::All, "   ").len(), 4);
    }

    #[test]
    fn test_status_then_search() {
        let apps = sample();
        let filtered =
            filter_applications(&apps, StatusFilter::Only(ApplicationStatus::New), "ova");
        assert_eq!(ids(&filtered), vec!["3"]);
    }

    #[test]
    fn test_filter_cycle_and_parse() {
        let mut filter = StatusFilter::All;
        let mut seen = Vec::new();
        for _ in 0..4 {
            filter = filter.next();
            seen.push(filter.label());
        }
        assert_eq!(seen, vec!["New", "Approved", "Rejected", "All"]);

        assert_eq!("all".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!(
            "approved".parse::<StatusFilter>(),
            Ok(StatusFilter::Only(ApplicationStatus::Approved))
        );
        assert!("maybe".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_debounce_applies_after_quiet_period() {
        let start = Instant::now();
        let mut search = DebouncedSearch::new(Duration::from_millis(300));

        search.push('i', start);
        search.push('v', start + Duration::from_millis(100));
        assert_eq!(search.input(), "iv");
        assert_eq!(search.term(), "");

        // Only 200ms since the last keystroke
        assert!(!search.tick(start + Duration::from_millis(300)));
        assert_eq!(search.term(), "");

        assert!(search.tick(start + Duration::from_millis(400)));
        assert_eq!(search.term(), "iv");
        assert!(!search.is_pending());
    }

    #[test]
    fn test_debounce_no_change_after_retyping_same_text() {
        let start = Instant::now();
        let mut search = DebouncedSearch::new(Duration::from_millis(300));

        search.set_input("anna", start);
        assert!(search.tick(start + Duration::from_millis(300)));

        search.pop(start + Duration::from_millis(400));
        search.push('a', start + Duration::from_millis(450));
        assert!(!search.tick(start + Duration::from_millis(800)));
        assert_eq!(search.term(), "anna");
    }
}
