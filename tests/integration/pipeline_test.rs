use std::io::Write;

use crate::utils::{VacancyCsv, random_csv};
use vacancy_stats::{
    CurrencyTable, PipelineConfig, RateHistory, VacancyError, run_on_reader, run_partition_dir,
    run_pipeline, split_by_year,
};

#[test]
fn test_run_pipeline_from_file() -> vacancy_stats::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = VacancyCsv::new()
        .row("Аналитик", 100, 200, "RUR", "Москва", 2021)
        .row("Программист", 1000, 1000, "KZT", "Пермь", 2020)
        .raw("Аналитик,abc,200,RUR,Москва,2021-01-01T00:00:00+0300,x")
        .raw("Аналитик,100,200,RUR,Москва,20-01-01,x")
        .write_to(dir.path(), "vacancies.csv");

    let config = PipelineConfig {
        role: "Аналитик".to_string(),
        ..Default::default()
    };
    let output = run_pipeline(&input, &config, &CurrencyTable::default())?;

    assert_eq!(output.stats.rows_read, 4);
    assert_eq!(output.stats.rows_rejected, 2);
    assert_eq!(output.stats.rows_accepted(), 2);
    // 1000 * 0.13 = 130
    assert_eq!(output.projections.salary_by_year[&2020], 130);
    assert_eq!(output.projections.salary_by_year_for_role[&2021], 150);
    assert_eq!(output.projections.count_by_year_for_role[&2020], 0);

    let years: Vec<i32> = output.projections.salary_by_year.keys().copied().collect();
    assert_eq!(years, vec![2020, 2021]);
    Ok(())
}

#[test]
fn test_missing_input_file_is_an_error() {
    let result = run_pipeline(
        std::path::Path::new("/no/such/vacancies.csv"),
        &PipelineConfig::default(),
        &CurrencyTable::default(),
    );
    assert!(matches!(result, Err(VacancyError::Io(_))));
}

#[test]
fn test_parallel_config_matches_single_pass() {
    let csv = random_csv(99, 2_000).build();
    let table = CurrencyTable::default();

    let single = run_on_reader(csv.as_bytes(), &PipelineConfig::default(), &table).unwrap();
    for workers in [1, 2, 4] {
        let config = PipelineConfig {
            parallel: true,
            workers,
            ..Default::default()
        };
        let parallel = run_on_reader(csv.as_bytes(), &config, &table).unwrap();
        assert_eq!(parallel, single, "workers = {workers}");
    }
}

#[test]
fn test_top_cities_from_config() {
    let csv = ["A", "B", "C", "D"]
        .iter()
        .fold(VacancyCsv::new(), |csv, city| csv.repeat(5, "X", 100, city, 2020))
        .build();
    let config = PipelineConfig {
        top_cities: 2,
        ..Default::default()
    };
    let output = run_on_reader(csv.as_bytes(), &config, &CurrencyTable::default()).unwrap();

    assert_eq!(output.projections.share_by_city.len(), 2);
    assert_eq!(output.projections.salary_by_city.len(), 2);
}

#[test]
fn test_config_file_with_currency_table() -> vacancy_stats::Result<()> {
    let dir = tempfile::tempdir()?;
    let rates = dir.path().join("rates.csv");
    std::fs::write(&rates, "currency,rate\nRUR,1\nUSD,100\n")?;

    let config_path = dir.path().join("config.json");
    let mut file = std::fs::File::create(&config_path)?;
    write!(
        file,
        r#"{{"role": "Программист", "top_cities": 5, "currency_table": {}}}"#,
        serde_json::to_string(&rates).unwrap_or_default()
    )?;
    drop(file);

    let config = PipelineConfig::from_json_path(&config_path)?;
    let table = config.currency_table()?;
    assert_eq!(table.len(), 2);

    let csv = VacancyCsv::new().row("Программист", 10, 20, "USD", "Москва", 2022);
    let output = run_on_reader(csv.build().as_bytes(), &config, &table)?;
    assert_eq!(output.projections.salary_by_year_for_role[&2022], 1500);

    // EUR is in the built-in rates but not in the configured table
    let csv = VacancyCsv::new().row("Программист", 10, 20, "EUR", "Москва", 2022);
    let result = run_on_reader(csv.build().as_bytes(), &config, &table);
    assert!(matches!(result, Err(VacancyError::UnknownCurrency(_))));
    Ok(())
}

#[test]
fn test_rate_history_converts_by_publication_month() -> vacancy_stats::Result<()> {
    let sheet = "date,USD,EUR,KZT\n2022-01,74.3,84.1,\n2022-03,77.1,,0.18\n";
    let history = RateHistory::from_csv_reader(sheet.as_bytes())?;

    let csv = VacancyCsv::new()
        // published in March, converted at 77.1
        .row("Программист", 10, 20, "USD", "Москва", 2022)
        .row("Программист", 1000, 1000, "KZT", "Пермь", 2022)
        .raw("Программист,10,20,USD,Москва,2022-01-20T12:00:00+0300,x")
        // no EUR quote for March: dropped, not fatal
        .row("Программист", 10, 20, "EUR", "Москва", 2022);
    let output = run_on_reader(csv.build().as_bytes(), &PipelineConfig::default(), &history)?;

    assert_eq!(output.stats.rows_read, 4);
    assert_eq!(output.stats.rows_rejected, 1);
    // (1156 + 180 + 1114) / 3 = 816
    assert_eq!(output.projections.salary_by_year[&2022], 816);
    assert_eq!(output.projections.count_by_year[&2022], 3);

    // A code with no column in the sheet still ends the run
    let csv = VacancyCsv::new().row("Программист", 10, 20, "BYR", "Москва", 2022);
    let result = run_on_reader(csv.build().as_bytes(), &PipelineConfig::default(), &history);
    assert!(matches!(result, Err(VacancyError::UnknownCurrency(_))));
    Ok(())
}

#[test]
fn test_config_file_with_rate_history() -> vacancy_stats::Result<()> {
    let dir = tempfile::tempdir()?;
    let sheet = dir.path().join("history.csv");
    std::fs::write(&sheet, "date,USD\n2020-03,70\n2021-03,80\n")?;

    let config_path = dir.path().join("config.json");
    std::fs::write(
        &config_path,
        format!(
            r#"{{"role": "Аналитик", "rate_history": {}}}"#,
            serde_json::to_string(&sheet).unwrap_or_default()
        ),
    )?;

    let config = PipelineConfig::from_json_path(&config_path)?;
    let rates = config.exchange_rates()?;
    let input = VacancyCsv::new()
        .row("Аналитик", 10, 10, "USD", "Москва", 2020)
        .row("Аналитик", 10, 10, "USD", "Москва", 2021)
        .write_to(dir.path(), "vacancies.csv");
    let output = run_pipeline(&input, &config, rates.as_ref())?;

    assert_eq!(output.projections.salary_by_year_for_role[&2020], 700);
    assert_eq!(output.projections.salary_by_year_for_role[&2021], 800);
    Ok(())
}

#[test]
fn test_run_partition_dir() -> vacancy_stats::Result<()> {
    let csv = random_csv(5, 800).build();
    let dir = tempfile::tempdir()?;
    split_by_year(csv.as_bytes(), dir.path())?;

    let config = PipelineConfig {
        role: "Тестировщик".to_string(),
        workers: 3,
        ..Default::default()
    };
    let table = CurrencyTable::default();
    let expected = run_on_reader(csv.as_bytes(), &config, &table)?;
    let output = run_partition_dir(dir.path(), &config, &table)?;

    assert_eq!(output.projections, expected.projections);
    assert_eq!(output.projections.to_json()?, expected.projections.to_json()?);
    Ok(())
}
