use std::path::{Path, PathBuf};

use rand::prelude::*;
use vacancy_stats::VacancyRecord;
use vacancy_stats::algorithm::partition_by_year;

/// Header with the six required columns plus one extra column
pub const HEADER: &str =
    "name,salary_from,salary_to,salary_currency,area_name,published_at,key_skills";

const TITLES: [&str; 6] = [
    "Аналитик данных",
    "Программист Rust",
    "Системный аналитик",
    "Тестировщик",
    "Дизайнер",
    "Менеджер проектов",
];

const CITIES: [&str; 8] = [
    "Москва",
    "Санкт-Петербург",
    "Казань",
    "Пермь",
    "Новосибирск",
    "Екатеринбург",
    "Самара",
    "Томск",
];

const CURRENCIES: [&str; 4] = ["RUR", "USD", "EUR", "KZT"];

/// Builder for vacancy CSV test data
#[derive(Debug, Clone, Default)]
pub struct VacancyCsv {
    rows: Vec<String>,
}

impl VacancyCsv {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row; the year becomes a full `published_at` timestamp
    #[must_use]
    pub fn row(self, name: &str, from: u64, to: u64, currency: &str, area: &str, year: i32) -> Self {
        self.raw(&format!(
            "{name},{from},{to},{currency},{area},{year}-03-15T12:00:00+0300,skills"
        ))
    }

    /// Append `n` identical RUR rows
    #[must_use]
    pub fn repeat(mut self, n: usize, name: &str, salary: u64, area: &str, year: i32) -> Self {
        for _ in 0..n {
            self = self.row(name, salary, salary, "RUR", area, year);
        }
        self
    }

    /// Append a row verbatim
    #[must_use]
    pub fn raw(mut self, line: &str) -> Self {
        self.rows.push(line.to_string());
        self
    }

    #[must_use]
    pub fn build(&self) -> String {
        let mut csv = String::from(HEADER);
        for row in &self.rows {
            csv.push('\n');
            csv.push_str(row);
        }
        csv.push('\n');
        csv
    }

    /// Write the CSV to `dir/name` and return the path
    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.build()).expect("failed to write test CSV");
        path
    }
}

/// Random vacancy CSV over the years 2015 to 2022, ordered by year
///
/// About one row in ten is invalid (empty area or broken date).
#[must_use]
pub fn random_csv(seed: u64, rows: usize) -> VacancyCsv {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut lines: Vec<(i32, String)> = Vec::with_capacity(rows);

    for _ in 0..rows {
        let year: i32 = rng.random_range(2015..=2022);
        let title = TITLES.choose(&mut rng).copied().unwrap_or("Аналитик");
        let city = CITIES.choose(&mut rng).copied().unwrap_or("Москва");
        let currency = CURRENCIES.choose(&mut rng).copied().unwrap_or("RUR");
        let from: u64 = rng.random_range(10_000..150_000);
        let to = from + rng.random_range(0..50_000_u64);

        let line = match rng.random_range(0..20) {
            0 => format!("{title},{from},{to},{currency},,{year}-01-01T10:00:00+0300,x"),
            1 => format!("{title},{from},{to},{currency},{city},n/a,x"),
            _ => format!("{title},{from},{to},{currency},{city},{year}-06-01T10:00:00+0300,x"),
        };
        lines.push((year, line));
    }

    lines.sort_by_key(|(year, _)| *year);
    lines
        .into_iter()
        .fold(VacancyCsv::new(), |csv, (_, line)| csv.raw(&line))
}

/// Random canonical records in arbitrary year order
#[must_use]
pub fn random_records(seed: u64, count: usize) -> Vec<VacancyRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let title = TITLES.choose(&mut rng).copied().unwrap_or("Аналитик");
            let salary: u64 = rng.random_range(5_000..300_000);
            let city = CITIES.choose(&mut rng).copied().unwrap_or("Москва");
            let year: i32 = rng.random_range(2010..=2024);
            VacancyRecord::new(title, salary, city, year)
        })
        .collect()
}

/// Group whole years into at most `chunks` partitions, round-robin
#[must_use]
pub fn chunk_by_years(records: &[VacancyRecord], chunks: usize) -> Vec<Vec<&VacancyRecord>> {
    let mut grouped: Vec<Vec<&VacancyRecord>> = vec![Vec::new(); chunks];
    for (i, (_, year_records)) in partition_by_year(records).into_iter().enumerate() {
        grouped[i % chunks].extend(year_records);
    }
    grouped.retain(|chunk| !chunk.is_empty());
    grouped
}
