// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn report_lists_every_counter() {
    let stats = RunStatistics {
        processed: 4,
        successful: 3,
        failed: 1,
        errors: 0,
        total_tasks: 4,
        started_at_ms: Some(SystemClock.epoch_ms()),
    };

    let report = report(stats);

    assert!(report.contains("Processed:     4"), "{report}");
    assert!(report.contains("Success:       3"), "{report}");
    assert!(report.contains("Failures:      1"), "{report}");
    assert!(report.contains("Errors:        0"), "{report}");
}

#[test]
fn fatal_errors_exit_with_two() {
    let err = fatal(PoolError::Shutdown);
    let exit = err.downcast_ref::<ExitError>().unwrap();
    assert_eq!(exit.code, 2);
    assert_eq!(exit.message, "pool is shut down");
}
