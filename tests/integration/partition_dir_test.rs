use crate::utils::{VacancyCsv, random_csv};
use vacancy_stats::{
    CurrencyTable, PartitionedAggregator, PipelineConfig, VacancyError, run_on_reader,
    run_partition_dir, run_partition_files, split_by_year,
};

#[test]
fn test_split_then_aggregate_matches_single_pass() {
    let csv = random_csv(2024, 3_000).build();
    let table = CurrencyTable::default();
    let config = PipelineConfig {
        role: "аналитик".to_string(),
        ..Default::default()
    };
    let expected = run_on_reader(csv.as_bytes(), &config, &table).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let (paths, split_stats) = split_by_year(csv.as_bytes(), dir.path()).unwrap();
    assert_eq!(paths.len(), expected.projections.count_by_year.len());
    assert_eq!(split_stats.rows_read, 3_000);

    for workers in [1, 2, 4] {
        let (projections, stats) = PartitionedAggregator::new("аналитик")
            .with_workers(workers)
            .aggregate_partition_dir(dir.path(), &table)
            .unwrap();
        assert_eq!(projections, expected.projections, "workers = {workers}");
        assert_eq!(stats.rows_accepted(), expected.stats.rows_accepted());
    }
}

#[test]
fn test_mixed_year_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    VacancyCsv::new()
        .row("Программист", 100, 200, "RUR", "Москва", 2020)
        .write_to(dir.path(), "2020_year.csv");
    let mixed = VacancyCsv::new()
        .row("Программист", 100, 200, "RUR", "Москва", 2021)
        .row("Программист", 100, 200, "RUR", "Москва", 2022)
        .write_to(dir.path(), "2021_year.csv");

    let result = PartitionedAggregator::new("")
        .with_workers(2)
        .aggregate_partition_dir(dir.path(), &CurrencyTable::default());

    match result {
        Err(VacancyError::PartitionMismatch { path, expected, found }) => {
            assert_eq!(path, mixed);
            assert_eq!(expected, 2021);
            assert_eq!(found, 2022);
        }
        other => panic!("expected PartitionMismatch, got {other:?}"),
    }
}

#[test]
fn test_two_files_for_one_year_overlap() {
    let dir = tempfile::tempdir().unwrap();
    VacancyCsv::new()
        .row("Программист", 100, 200, "RUR", "Москва", 2020)
        .write_to(dir.path(), "a.csv");
    VacancyCsv::new()
        .row("Программист", 300, 400, "RUR", "Пермь", 2020)
        .write_to(dir.path(), "b.csv");

    let result = PartitionedAggregator::new("")
        .aggregate_partition_dir(dir.path(), &CurrencyTable::default());
    assert!(matches!(result, Err(VacancyError::PartitionOverlap(2020))));
}

#[test]
fn test_unknown_currency_in_one_partition_fails_run() {
    let dir = tempfile::tempdir().unwrap();
    VacancyCsv::new()
        .row("Программист", 100, 200, "RUR", "Москва", 2020)
        .write_to(dir.path(), "2020_year.csv");
    VacancyCsv::new()
        .row("Программист", 100, 200, "XYZ", "Москва", 2021)
        .write_to(dir.path(), "2021_year.csv");

    let result = PartitionedAggregator::new("")
        .with_workers(2)
        .aggregate_partition_dir(dir.path(), &CurrencyTable::default());
    assert!(matches!(result, Err(VacancyError::UnknownCurrency(_))));
}

#[test]
fn test_missing_column_fails_run() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("2020_year.csv"),
        "name,salary_from,salary_to,area_name,published_at\nA,1,2,Москва,2020-01-01\n",
    )
    .unwrap();

    let result = PartitionedAggregator::new("")
        .aggregate_partition_dir(dir.path(), &CurrencyTable::default());
    assert!(matches!(result, Err(VacancyError::MissingColumn { .. })));
}

#[test]
fn test_empty_directory_yields_empty_projections() {
    let dir = tempfile::tempdir().unwrap();
    let (projections, stats) = PartitionedAggregator::new("")
        .aggregate_partition_dir(dir.path(), &CurrencyTable::default())
        .unwrap();

    assert!(projections.is_empty());
    assert_eq!(stats.rows_read, 0);
}

#[test]
fn test_resplit_into_same_dir_reads_only_new_files() -> vacancy_stats::Result<()> {
    let dir = tempfile::tempdir()?;
    let table = CurrencyTable::default();
    let config = PipelineConfig::default();

    let first = VacancyCsv::new()
        .row("Программист", 100, 100, "RUR", "Москва", 2019)
        .build();
    split_by_year(first.as_bytes(), dir.path())?;

    let second = VacancyCsv::new()
        .row("Программист", 300, 300, "RUR", "Пермь", 2021)
        .build();
    let (paths, _) = split_by_year(second.as_bytes(), dir.path())?;
    assert_eq!(paths.len(), 1);

    let expected = run_on_reader(second.as_bytes(), &config, &table)?;
    let output = run_partition_files(&paths, &config, &table)?;
    assert_eq!(output.projections, expected.projections);
    assert_eq!(
        output.projections.count_by_year.into_iter().collect::<Vec<_>>(),
        vec![(2021, 1)]
    );
    assert_eq!(output.projections.share_by_city.get("Пермь"), Some(&1.0));
    assert!(output.projections.share_by_city.get("Москва").is_none());

    // The stale 2019 file is still picked up by a directory scan
    let scanned = run_partition_dir(dir.path(), &config, &table)?;
    assert_eq!(scanned.projections.count_by_year.len(), 2);
    Ok(())
}
