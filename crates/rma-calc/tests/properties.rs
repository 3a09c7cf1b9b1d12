use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rma_calc::overdue::elapsed_days;
use rma_calc::{Breakdown, OverdueClassifier, OverdueQuery, PartAnalyzer, Severity};
use rma_core::{CaseStatus, DaysFilter, Priority, PriorityWeights, RmaCase};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 30, 12, 0, 0).unwrap()
}

fn status_strategy() -> impl Strategy<Value = Option<CaseStatus>> {
    prop_oneof![
        1 => Just(None),
        9 => proptest::sample::select(CaseStatus::ALL.to_vec()).prop_map(Some),
    ]
}

fn priority_strategy() -> impl Strategy<Value = Option<Priority>> {
    prop_oneof![
        1 => Just(None),
        4 => proptest::sample::select(Priority::ALL.to_vec()).prop_map(Some),
    ]
}

fn case_strategy() -> impl Strategy<Value = RmaCase> {
    (
        0u32..10_000,
        proptest::sample::select(vec!["", "Site A", "Site B", "Site C"]),
        proptest::sample::select(vec!["Lamp", "Lens", "Board"]),
        status_strategy(),
        priority_strategy(),
        proptest::option::of(-30i64..400),
    )
        .prop_map(|(id, site, part, status, priority, days_ago)| {
            let mut rma = RmaCase::new(format!("RMA-{}", id), site.to_string())
                .with_defective_part(part, &format!("{}-PN", part));
            rma.case_status = status;
            rma.priority = priority;
            if let Some(days) = days_ago {
                rma = rma.with_raised_date(now() - Duration::days(days));
            }
            rma
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn breakdown_totals_reconcile(cases in proptest::collection::vec(case_strategy(), 0..64)) {
        let breakdown = Breakdown::from_cases(&cases);
        let (status, priority, site) = breakdown.totals();
        prop_assert_eq!(status, cases.len());
        prop_assert_eq!(priority, cases.len());
        prop_assert_eq!(site, cases.len());

        let with_status = cases.iter().filter(|c| c.case_status.is_some()).count();
        let unknown = breakdown.by_status.get("Unknown").copied().unwrap_or(0);
        prop_assert_eq!(status - unknown, with_status);
    }

    #[test]
    fn part_aggregation_is_idempotent(cases in proptest::collection::vec(case_strategy(), 0..64)) {
        let analyzer = PartAnalyzer::new(PriorityWeights::default());
        let first = analyzer.aggregate(&cases, &[], now());
        let second = analyzer.aggregate(&cases, &[], now());
        prop_assert_eq!(&first, &second);

        let total: usize = first.iter().map(|p| p.total_count).sum();
        prop_assert_eq!(total, cases.len());
        for part in &first {
            prop_assert!(part.priority >= 0.0 && part.priority <= 10.0);
            prop_assert!(part.pending_count + part.completed_count <= part.total_count);
            prop_assert!(part.completion_rate <= 100);
        }
    }

    #[test]
    fn days_overdue_never_negative(cases in proptest::collection::vec(case_strategy(), 0..64)) {
        let classifier = OverdueClassifier::new(OverdueQuery::default());
        for rma in &cases {
            if let Some(days) = classifier.days_overdue(rma, now()) {
                prop_assert!(days >= 0);
            }
        }
    }

    #[test]
    fn classification_respects_threshold(
        cases in proptest::collection::vec(case_strategy(), 0..64),
        days in proptest::sample::select(DaysFilter::ALLOWED.to_vec()),
    ) {
        let query = OverdueQuery {
            days_filter: DaysFilter::new(days).unwrap(),
            ..OverdueQuery::default()
        };
        let result = OverdueClassifier::new(query).classify(&cases, now());
        for window in result.overdue.windows(2) {
            prop_assert!(window[0].days_overdue >= window[1].days_overdue);
        }
        for overdue in &result.overdue {
            prop_assert!(overdue.days_overdue >= i64::from(days));
            prop_assert!(!overdue.rma.case_status.map(|s| s.is_terminal()).unwrap_or(false));
            prop_assert_eq!(overdue.severity, Severity::from_days(overdue.days_overdue));
        }
    }

    #[test]
    fn boundary_is_inclusive(
        days in proptest::sample::select(DaysFilter::ALLOWED.to_vec()),
        seconds in 0i64..86_400,
    ) {
        let raised = now() - Duration::days(i64::from(days)) - Duration::seconds(seconds);
        prop_assert_eq!(elapsed_days(raised, now(), false), i64::from(days));

        let rma = RmaCase::new("RMA-B".to_string(), "Site".to_string()).with_raised_date(raised);
        let query = OverdueQuery {
            days_filter: DaysFilter::new(days).unwrap(),
            ..OverdueQuery::default()
        };
        let result = OverdueClassifier::new(query).classify(&[rma], now());
        prop_assert_eq!(result.overdue.len(), 1);
    }
}
