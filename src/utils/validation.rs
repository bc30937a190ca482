//! Validation utilities

use bigdecimal::BigDecimal;

use crate::traits::Scope;
use crate::types::*;

/// Validate that a drift tolerance is non-negative
pub fn validate_tolerance(tolerance: &BigDecimal) -> ReconciliationResult<()> {
    if *tolerance < BigDecimal::from(0) {
        Err(ReconciliationError::Validation(
            "Tolerance cannot be negative".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate that a scope's date range is not inverted
pub fn validate_scope(scope: &Scope) -> ReconciliationResult<()> {
    if let (Some(from), Some(to)) = (scope.from, scope.to) {
        if from > to {
            return Err(ReconciliationError::Validation(format!(
                "Scope range is inverted: {} > {}",
                from, to
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    #[test]
    fn zero_tolerance_is_valid() {
        assert!(validate_tolerance(&BigDecimal::from(0)).is_ok());
        assert!(validate_tolerance(&BigDecimal::from_str("0.01").unwrap()).is_ok());
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        let err = validate_tolerance(&BigDecimal::from(-1)).unwrap_err();
        assert!(matches!(err, ReconciliationError::Validation(_)));
    }

    #[test]
    fn open_ended_scopes_are_valid() {
        assert!(validate_scope(&Scope::all()).is_ok());
        assert!(validate_scope(&Scope::for_centre("centre-1")).is_ok());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let scope = Scope::all().between(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        );
        assert!(validate_scope(&scope).is_err());
    }
}
