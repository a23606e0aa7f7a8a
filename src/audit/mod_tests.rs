use super::*;

#[test]
fn merge_is_a_logical_or() {
    let outcome = AuditOutcome::default()
        .merge(true, false)
        .merge(false, false)
        .merge(false, true);

    assert_eq!(
        outcome,
        AuditOutcome {
            warning: true,
            error: true
        }
    );
}

#[test]
fn merge_order_does_not_matter() {
    let a = AuditOutcome::default().merge(false, true).merge(true, false);
    let b = AuditOutcome::default().merge(true, false).merge(false, true);

    assert_eq!(a, b);
}

#[test]
fn severity_reflects_worst_flag() {
    assert_eq!(AuditOutcome::default().severity(), None);
    assert_eq!(
        AuditOutcome::default().merge(true, false).severity(),
        Some(Severity::Warning)
    );
    assert_eq!(
        AuditOutcome::default().merge(true, true).severity(),
        Some(Severity::Error)
    );
}
