// Edit form state for a single application
//
// Holds what the operator has typed so far. Validation is recomputed from
// scratch on every call; nothing is cached.

use crate::types::{Application, ApplicationStatus, ApplicationUpdate, ChangeReason};
use crate::validation::{validate, ValidationResult};

/// Field that currently receives keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Limit,
    Reason,
    Status,
}

impl FormField {
    pub fn next(&self) -> Self {
        match self {
            FormField::Limit => FormField::Reason,
            FormField::Reason => FormField::Status,
            FormField::Status => FormField::Limit,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            FormField::Limit => FormField::Status,
            FormField::Reason => FormField::Limit,
            FormField::Status => FormField::Reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditForm {
    /// Snapshot of the record the form was opened for
    pub original: Application,
    limit_text: String,
    limit: Option<i64>,
    pub reason: Option<ChangeReason>,
    pub status: ApplicationStatus,
    /// Set on the first submit attempt; errors are shown only afterwards
    pub touched: bool,
    pub focus: FormField,
}

impl EditForm {
    pub fn new(application: &Application) -> Self {
        let limit = i64::try_from(application.current_limit).ok();
        EditForm {
            original: application.clone(),
            limit_text: application.current_limit.to_string(),
            limit,
            reason: None,
            status: application.status,
            touched: false,
            focus: FormField::Limit,
        }
    }

    pub fn limit(&self) -> Option<i64> {
        self.limit
    }

    pub fn limit_text(&self) -> &str {
        &self.limit_text
    }

    /// Update the limit from raw input. Empty clears the value; text that is
    /// not an integer is ignored and the previous value kept.
    pub fn set_limit_text(&mut self, raw: &str) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            self.limit_text.clear();
            self.limit = None;
            return;
        }
        if let Ok(value) = trimmed.parse::<i64>() {
            self.limit_text = trimmed.to_string();
            self.limit = Some(value);
        }
    }

    pub fn push_limit_char(&mut self, ch: char) {
        let mut next = self.limit_text.clone();
        next.push(ch);
        self.set_limit_text(&next);
    }

    pub fn pop_limit_char(&mut self) {
        let mut next = self.limit_text.clone();
        next.pop();
        if next == "-" {
            next.clear();
        }
        self.set_limit_text(&next);
    }

    pub fn select_reason(&mut self, reason: Option<ChangeReason>) {
        self.reason = reason;
    }

    /// Step through "no reason" followed by the currently offered reasons
    pub fn cycle_reason(&mut self, forward: bool) {
        let offered = self.validation().available_reasons;
        let mut options: Vec<Option<ChangeReason>> = vec![None];
        options.extend(offered.iter().copied().map(Some));

        let position = options.iter().position(|r| *r == self.reason);
        let len = options.len();
        let next = match (position, forward) {
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
            // Chosen reason is no longer offered
            (None, _) => 0,
        };
        self.reason = options[next];
    }

    pub fn cycle_status(&mut self, forward: bool) {
        self.status = if forward {
            self.status.next()
        } else {
            self.status.previous()
        };
    }

    pub fn validation(&self) -> ValidationResult {
        validate(self.limit, self.reason)
    }

    /// Update to commit, if the limit is set and representable as a stored limit
    pub fn update(&self) -> Option<ApplicationUpdate> {
        let new_limit = u64::try_from(self.limit?).ok()?;
        Some(ApplicationUpdate {
            new_limit,
            reason: self.reason,
            new_status: self.status,
        })
    }
}
