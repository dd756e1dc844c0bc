// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::NaiveDate;
use yare::parameterized;

#[parameterized(
    pending = { None, "pending" },
    ok = { Some(Severity::Ok), "ok" },
    warning = { Some(Severity::Warning), "warning" },
    critical = { Some(Severity::Critical), "critical" },
    raised = { Some(Severity::Raised), "raised" },
)]
fn labels(severity: Option<Severity>, expected: &str) {
    assert_eq!(severity_label(severity), expected);
}

#[test]
fn table_aligns_columns_and_keeps_first_detail_line() {
    let jobs = vec![
        JobSummary {
            name: "homepage".to_string(),
            severity: Some(Severity::Warning),
            detail: "Response time was 3.20 seconds\nsecond line".to_string(),
            last_run_at: NaiveDate::from_ymd_opt(2026, 3, 2).and_then(|d| d.and_hms_opt(9, 30, 5)),
        },
        JobSummary {
            name: "disk".to_string(),
            severity: None,
            detail: String::new(),
            last_run_at: None,
        },
    ];

    let table = status_table(&jobs);
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(
        lines,
        vec![
            "JOB       STATUS    LAST RUN             DETAIL",
            "homepage  warning   2026-03-02 09:30:05  Response time was 3.20 seconds",
            "disk      pending   -",
        ]
    );
}

#[test]
fn empty_table_has_only_header() {
    assert_eq!(
        status_table(&[]),
        "JOB  STATUS    LAST RUN             DETAIL\n"
    );
}
