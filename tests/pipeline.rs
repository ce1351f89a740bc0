mod common;

use common::{byn, posting, rates};
use salary_bench::{
    api::types::{BenchmarkResponse, OutcomeStatus},
    benchmark::{run, BenchmarkOutcome, NormalizedSalary, PipelineConfig, PipelineError},
    data::posting::SalaryKind,
};

fn approx(a: Option<f64>, b: f64) -> bool {
    a.is_some_and(|a| (a - b).abs() < 1e-6)
}

#[test]
fn postings_without_salary_count_but_do_not_aggregate() {
    let postings = vec![
        posting("1", None, None, "BYN", SalaryKind::Gross),
        byn("2", 1000.0, 2000.0),
    ];
    let outcome = run(postings, &rates(&[]), &PipelineConfig::default()).unwrap();

    assert_eq!(outcome.total_postings(), 2);
    let BenchmarkOutcome::Partial(report) = &outcome else {
        panic!("expected partial outcome, got {outcome:?}");
    };
    assert_eq!(report.gross.count, 1);
    assert!(approx(report.gross.mean, 1500.0));
    assert_eq!(report.filter.without_value, 1);
    assert_eq!(report.unconvertible, 0);
    assert_eq!(report.kept().len(), 2);
}

#[test]
fn gross_postings_get_net_figures() {
    let outcome = run(
        vec![byn("1", 1000.0, 2000.0)],
        &rates(&[]),
        &PipelineConfig::default(),
    )
    .unwrap();
    let BenchmarkOutcome::Full(report) = &outcome else {
        panic!("expected full outcome, got {outcome:?}");
    };
    let salary = report.kept()[0].salary;
    assert!(approx(salary.net_from, 860.0));
    assert!(approx(salary.net_to, 1720.0));
    assert!(approx(report.net.median, 1290.0));
}

#[test]
fn net_postings_get_gross_figures() {
    let postings = vec![posting("1", Some(860.0), None, "BYN", SalaryKind::Net)];
    let outcome = run(postings, &rates(&[]), &PipelineConfig::default()).unwrap();
    let report = outcome.report().expect("report");
    assert!(approx(report.gross.max, 1000.0));
    assert!(approx(report.net.max, 860.0));
}

#[test]
fn foreign_currencies_are_converted_and_unknown_ones_dropped() {
    let postings = vec![
        posting("usd", Some(1000.0), None, "USD", SalaryKind::Gross),
        posting("xyz", Some(1000.0), None, "XYZ", SalaryKind::Gross),
        byn("byn", 3000.0, 3000.0),
    ];
    let outcome = run(postings, &rates(&[("USD", 3.0)]), &PipelineConfig::default()).unwrap();

    assert_eq!(outcome.total_postings(), 3);
    let report = outcome.report().expect("report");
    assert!(matches!(outcome, BenchmarkOutcome::Partial(_)));
    assert_eq!(report.unconvertible, 1);
    assert_eq!(report.gross.count, 2);
    assert!(approx(report.gross.min, 3000.0));
    let xyz = report
        .kept()
        .iter()
        .find(|n| n.posting.id == "xyz")
        .expect("unconvertible posting is kept");
    assert!(xyz.salary.is_empty());
}

#[test]
fn missing_rates_fail_the_run_only_when_needed() {
    let foreign = vec![posting("1", Some(1000.0), None, "EUR", SalaryKind::Gross)];
    let err = run(foreign, &rates(&[]), &PipelineConfig::default()).unwrap_err();
    assert!(matches!(err, PipelineError::RatesUnavailable { pending: 1 }));

    let local = vec![byn("1", 900.0, 1100.0)];
    assert!(run(local, &rates(&[]), &PipelineConfig::default()).is_ok());
}

#[test]
fn empty_input_is_not_an_error() {
    let outcome = run(Vec::new(), &rates(&[]), &PipelineConfig::default()).unwrap();
    let BenchmarkOutcome::NoData {
        filter,
        unconvertible,
    } = &outcome
    else {
        panic!("expected no data, got {outcome:?}");
    };
    assert_eq!(filter.total_in, 0);
    assert_eq!(*unconvertible, 0);
    assert!(outcome.kept().is_empty());

    let response = BenchmarkResponse::from(&outcome);
    assert_eq!(response.status, OutcomeStatus::NoData);
    assert_eq!(response.gross.count, 0);
    assert!(response.gross.mean.is_none());
    assert!(response.gross_histogram.is_empty());
    assert!(response.table.is_empty());
}

#[test]
fn no_data_still_reports_filter_counts() {
    let postings = vec![
        byn("low-1", 100.0, 200.0),
        posting("none", None, None, "BYN", SalaryKind::Gross),
        byn("low-2", 300.0, 400.0),
    ];
    let outcome = run(postings, &rates(&[]), &PipelineConfig::default()).unwrap();
    assert!(matches!(outcome, BenchmarkOutcome::NoData { .. }));
    assert_eq!(outcome.total_postings(), 3);
    assert_eq!(outcome.filter().below_floor, 2);
    assert_eq!(outcome.filter().without_value, 1);

    let response = BenchmarkResponse::from(&outcome);
    assert_eq!(response.status, OutcomeStatus::NoData);
    assert_eq!(response.total_postings, 3);
    assert_eq!(response.filtered_count, 1);
    assert_eq!(response.counts.below_floor, 2);
    assert_eq!(response.counts.without_salary, 1);
    assert_eq!(response.table.len(), 1);
    assert_eq!(response.table[0].name, "Vacancy none");
    assert!(response.rates_as_of.is_none());
}

#[test]
fn outliers_are_removed_and_order_is_kept() {
    let mut postings: Vec<_> = (0..10)
        .map(|i| byn(&format!("p{i}"), 1000.0 + 50.0 * i as f64, 1400.0 + 50.0 * i as f64))
        .collect();
    postings.insert(4, byn("huge", 90_000.0, 110_000.0));
    postings.insert(7, byn("tiny", 100.0, 200.0));

    let outcome = run(postings, &rates(&[]), &PipelineConfig::default()).unwrap();
    let report = outcome.report().expect("report");
    assert_eq!(report.filter.below_floor, 1);
    assert_eq!(report.filter.outside_fence, 1);

    let ids: Vec<&str> = report.kept().iter().map(|n| n.posting.id.as_str()).collect();
    let expected: Vec<String> = (0..10).map(|i| format!("p{i}")).collect();
    assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
    assert_eq!(report.gross_histogram.total(), 10);
    assert_eq!(report.gross_histogram.bins.len(), 8);
}

#[test]
fn net_basis_filters_on_net_values() {
    // 560 gross is 481.6 net: kept on the gross basis, below the floor on the net basis.
    let postings = vec![byn("low", 560.0, 560.0), byn("ok", 1500.0, 1500.0)];
    let gross = run(postings.clone(), &rates(&[]), &PipelineConfig::default()).unwrap();
    assert_eq!(gross.kept().len(), 2);

    let config = PipelineConfig {
        basis: SalaryKind::Net,
        ..PipelineConfig::default()
    };
    let net = run(postings, &rates(&[]), &config).unwrap();
    assert_eq!(net.kept().len(), 1);
    assert_eq!(net.kept()[0].posting.id, "ok");
}

#[test]
fn extreme_bounds_never_produce_infinities() {
    let config = PipelineConfig::default();
    let table = rates(&[]);

    let gross = NormalizedSalary::normalize(&byn("big", f64::MAX, f64::MAX), &table, &config);
    assert_eq!(gross.average(SalaryKind::Gross), Some(f64::MAX));
    assert!(gross.average(SalaryKind::Net).is_some_and(f64::is_finite));

    let net_posting = posting("big-net", Some(f64::MAX), None, "BYN", SalaryKind::Net);
    let net = NormalizedSalary::normalize(&net_posting, &table, &config);
    assert!(net.is_empty());
    assert_eq!(net.average(SalaryKind::Net), None);

    let outcome = run(vec![net_posting], &table, &config).unwrap();
    assert!(matches!(outcome, BenchmarkOutcome::NoData { unconvertible: 1, .. }));
}

#[test]
fn invalid_configuration_is_rejected() {
    let config = PipelineConfig {
        ndfl_rate: 1.0,
        ..PipelineConfig::default()
    };
    let err = run(Vec::new(), &rates(&[]), &config).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidConfig(_)));
}
