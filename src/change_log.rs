// 📝 Change Recorder - audit descriptions for committed edits
//
// One commit produces at most one description, covering every field that
// changed. A save that changes nothing produces nothing.

use crate::format::format_limit;
use crate::types::{Application, ApplicationStatus, NewLogEntry};

/// Describe what an edit changes, or `None` when it changes nothing
///
/// Only the limit and status are compared. The reason is validated elsewhere
/// and is not part of the description.
pub fn describe_changes(
    original: &Application,
    new_limit: u64,
    new_status: ApplicationStatus,
) -> Option<String> {
    let mut clauses = Vec::new();

    if new_limit != original.current_limit {
        clauses.push(format!(
            "limit changed from {} to {}",
            format_limit(original.current_limit),
            format_limit(new_limit)
        ));
    }

    if new_status != original.status {
        clauses.push(format!("status changed to {}", new_status));
    }

    if clauses.is_empty() {
        return None;
    }

    Some(format!("For client {}: {}", original.name, clauses.join("; ")))
}

/// Build the log entry for an edit, snapshotting the client's id and name
pub fn record_change(
    original: &Application,
    new_limit: u64,
    new_status: ApplicationStatus,
) -> Option<NewLogEntry> {
    describe_changes(original, new_limit, new_status).map(|description| NewLogEntry {
        client_id: original.id.clone(),
        client_name: original.name.clone(),
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn application(limit: u64, status: ApplicationStatus) -> Application {
        Application {
            id: "7b2f-4a12".to_string(),
            name: "Ivan Ivanov".to_string(),
            account: "40817810500000001234".to_string(),
            current_limit: limit,
            requested_limit: 150_000,
            currency: "RUB".to_string(),
            status,
        }
    }

    #[test]
    fn test_no_change_records_nothing() {
        let app = application(50_000, ApplicationStatus::New);

        assert_eq!(describe_changes(&app, 50_000, ApplicationStatus::New), None);
        // Repeating the no-op save still records nothing
        assert_eq!(record_change(&app, 50_000, ApplicationStatus::New), None);
    }

    #[test]
    fn test_huge_limit_is_printed_exactly() {
        let app = application(50_000, ApplicationStatus::New);
        let description = describe_changes(&app, u64::MAX, ApplicationStatus::New).unwrap();

        assert!(description.ends_with("to 18,446,744,073,709,551,615"));
    }

    #[test]
    fn test_limit_only() {
        let app = application(50_000, ApplicationStatus::New);
        let description = describe_changes(&app, 75_000, ApplicationStatus::New).unwrap();

        assert_eq!(
            description,
            "For client Ivan Ivanov: limit changed from 50,000 to 75,000"
        );
        assert!(!description.contains("status"));
    }

    #[test]
    fn test_status_only() {
        let app = application(50_000, ApplicationStatus::New);
        let description = describe_changes(&app, 50_000, ApplicationStatus::Rejected).unwrap();

        assert_eq!(description, "For client Ivan Ivanov: status changed to Rejected");
    }

    #[test]
    fn test_limit_and_status_in_one_description() {
        let app = application(50_000, ApplicationStatus::New);
        let description = describe_changes(&app, 150_000, ApplicationStatus::Approved).unwrap();

        assert_eq!(
            description,
            "For client Ivan Ivanov: limit changed from 50,000 to 150,000; status changed to Approved"
        );
    }

    #[test]
    fn test_record_change_snapshots_client() {
        let mut app = application(50_000, ApplicationStatus::New);
        let entry = record_change(&app, 60_000, ApplicationStatus::New).unwrap();

        app.name = "Renamed Client".to_string();

        assert_eq!(entry.client_id, "7b2f-4a12");
        assert_eq!(entry.client_name, "Ivan Ivanov");
        assert!(entry.description.starts_with("For client Ivan Ivanov:"));
    }
}
