// Requests for proposals: creation, listing, status changes.

pub mod handlers;

/// Statuses an RFP may be moved to.
pub const RFP_STATUSES: [&str; 4] = ["draft", "active", "closed", "awarded"];

/// Sign-off tier for a budget. Thresholds are inclusive upper bounds.
pub fn approval_level(budget: f64) -> &'static str {
    if budget <= 100_000.0 {
        "procurement_officer"
    } else if budget <= 500_000.0 {
        "manager"
    } else if budget <= 1_000_000.0 {
        "cfo"
    } else {
        "ceo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_levels_by_budget() {
        assert_eq!(approval_level(0.0), "procurement_officer");
        assert_eq!(approval_level(50_000.0), "procurement_officer");
        assert_eq!(approval_level(250_000.0), "manager");
        assert_eq!(approval_level(750_000.0), "cfo");
        assert_eq!(approval_level(5_000_000.0), "ceo");
    }

    #[test]
    fn test_approval_thresholds_are_inclusive() {
        assert_eq!(approval_level(100_000.0), "procurement_officer");
        assert_eq!(approval_level(100_000.01), "manager");
        assert_eq!(approval_level(500_000.0), "manager");
        assert_eq!(approval_level(1_000_000.0), "cfo");
        assert_eq!(approval_level(1_000_000.01), "ceo");
    }
}
