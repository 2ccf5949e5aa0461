// ✅ Limit Validation - admissibility of an edit
//
// Pure function of (proposed limit, proposed reason). Errors are data for the
// caller to render, never panics or Err returns.

use crate::format::format_number;
use crate::types::{
    ChangeReason, EXTENDED_REASONS, HIGH_LIMIT_THRESHOLD, MAX_LIMIT, MIN_LIMIT, STANDARD_REASONS,
};

// ============================================================================
// ERRORS
// ============================================================================

/// Problem with the limit field. At most one is reported, checked in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitError {
    /// No value entered
    Required,
    BelowMinimum { min: i64 },
    AboveMaximum { max: i64 },
}

impl std::fmt::Display for LimitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LimitError::Required => write!(f, "Enter a limit value"),
            LimitError::BelowMinimum { min } => {
                write!(f, "Limit cannot be less than {}", format_number(*min))
            }
            LimitError::AboveMaximum { max } => {
                write!(f, "Limit cannot exceed {}", format_number(*max))
            }
        }
    }
}

impl std::error::Error for LimitError {}

/// Problem with the reason field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonError {
    /// Limit is above the threshold and no reason was chosen
    Required { threshold: i64 },
}

impl std::fmt::Display for ReasonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReasonError::Required { threshold } => write!(
                f,
                "Specify a reason for limits above {}",
                format_number(*threshold)
            ),
        }
    }
}

impl std::error::Error for ReasonError {}

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub limit_error: Option<LimitError>,
    pub reason_error: Option<ReasonError>,
    pub is_reason_required: bool,
    /// Reasons the form should offer; advisory, not a constraint on the chosen one
    pub available_reasons: &'static [ChangeReason],
}

impl ValidationResult {
    /// All error messages, limit first
    pub fn messages(&self) -> Vec<String> {
        let mut messages = Vec::new();
        if let Some(err) = &self.limit_error {
            messages.push(err.to_string());
        }
        if let Some(err) = &self.reason_error {
            messages.push(err.to_string());
        }
        messages
    }
}

/// Validate a proposed limit (`None` = field left empty) and reason
///
/// `is_reason_required` looks at the limit even when that limit is itself out
/// of range, so an over-maximum limit without a reason reports both errors.
pub fn validate(limit: Option<i64>, reason: Option<ChangeReason>) -> ValidationResult {
    let effective = limit.unwrap_or(0);
    let is_reason_required = effective > HIGH_LIMIT_THRESHOLD;

    let limit_error = match limit {
        None => Some(LimitError::Required),
        Some(value) if value < MIN_LIMIT => Some(LimitError::BelowMinimum { min: MIN_LIMIT }),
        Some(value) if value > MAX_LIMIT => Some(LimitError::AboveMaximum { max: MAX_LIMIT }),
        Some(_) => None,
    };

    let reason_error = if is_reason_required && reason.is_none() {
        Some(ReasonError::Required {
            threshold: HIGH_LIMIT_THRESHOLD,
        })
    } else {
        None
    };

    let available_reasons = if is_reason_required {
        EXTENDED_REASONS
    } else {
        STANDARD_REASONS
    };

    ValidationResult {
        is_valid: limit_error.is_none() && reason_error.is_none(),
        limit_error,
        reason_error,
        is_reason_required,
        available_reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_limit_is_valid() {
        let result = validate(Some(150_000), None);

        assert!(result.is_valid);
        assert_eq!(result.limit_error, None);
        assert_eq!(result.reason_error, None);
        assert!(!result.is_reason_required);
        assert_eq!(result.available_reasons, STANDARD_REASONS);
    }

    #[test]
    fn test_empty_limit_is_required_not_below_minimum() {
        let result = validate(None, None);

        assert!(!result.is_valid);
        assert_eq!(result.limit_error, Some(LimitError::Required));
        assert!(!result.is_reason_required);
        assert_eq!(result.reason_error, None);
    }

    #[test]
    fn test_negative_limit() {
        let result = validate(Some(-5), None);

        assert!(!result.is_valid);
        assert_eq!(result.limit_error, Some(LimitError::BelowMinimum { min: 0 }));
        assert_eq!(result.reason_error, None);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(validate(Some(MIN_LIMIT), None).is_valid);
        assert_eq!(
            validate(Some(MAX_LIMIT), Some(ChangeReason::SpecialRisk)).limit_error,
            None
        );
        assert_eq!(
            validate(Some(MAX_LIMIT + 1), Some(ChangeReason::SpecialRisk)).limit_error,
            Some(LimitError::AboveMaximum { max: MAX_LIMIT })
        );
    }

    #[test]
    fn test_threshold_is_strict() {
        let at = validate(Some(HIGH_LIMIT_THRESHOLD), None);
        assert!(at.is_valid);
        assert!(!at.is_reason_required);
        assert!(!at.available_reasons.contains(&ChangeReason::SpecialRisk));

        let above = validate(Some(HIGH_LIMIT_THRESHOLD + 1), None);
        assert!(!above.is_valid);
        assert!(above.is_reason_required);
        assert!(above.available_reasons.contains(&ChangeReason::SpecialRisk));
    }

    #[test]
    fn test_high_limit_without_reason() {
        let result = validate(Some(2_000_000), None);

        assert!(!result.is_valid);
        assert!(result.is_reason_required);
        assert_eq!(result.limit_error, None);
        assert_eq!(
            result.reason_error,
            Some(ReasonError::Required { threshold: 1_000_000 })
        );
    }

    #[test]
    fn test_high_limit_with_reason() {
        let result = validate(Some(2_000_000), Some(ChangeReason::IncomeIncrease));
        assert!(result.is_valid);
        assert_eq!(result.available_reasons, EXTENDED_REASONS);
    }

    #[test]
    fn test_above_maximum_reports_both_errors() {
        let result = validate(Some(20_000_000), None);

        assert!(!result.is_valid);
        assert_eq!(result.limit_error, Some(LimitError::AboveMaximum { max: MAX_LIMIT }));
        assert!(result.reason_error.is_some());
        assert_eq!(result.messages().len(), 2);
    }

    #[test]
    fn test_reason_outside_offered_set_is_not_rejected() {
        // "Special risk" picked earlier, then the limit was lowered
        let result = validate(Some(10_000), Some(ChangeReason::SpecialRisk));
        assert!(result.is_valid);
        assert!(!result.available_reasons.contains(&ChangeReason::SpecialRisk));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(LimitError::Required.to_string(), "Enter a limit value");
        assert_eq!(
            LimitError::BelowMinimum { min: 0 }.to_string(),
            "Limit cannot be less than 0"
        );
        assert_eq!(
            LimitError::AboveMaximum { max: 10_000_000 }.to_string(),
            "Limit cannot exceed 10,000,000"
        );
        assert_eq!(
            ReasonError::Required { threshold: 1_000_000 }.to_string(),
            "Specify a reason for limits above 1,000,000"
        );
    }
}
