//! Canonical vacancy record

/// A normalized vacancy with its salary converted to the base currency
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VacancyRecord {
    /// Vacancy title, matched against the target role by substring
    pub title: String,
    /// Average salary in the base currency
    pub salary: u64,
    /// City or region, used verbatim as a grouping key
    pub area: String,
    /// Publication year
    pub year: i32,
}

impl VacancyRecord {
    /// Create a new vacancy record
    #[must_use]
    pub fn new(title: impl Into<String>, salary: u64, area: impl Into<String>, year: i32) -> Self {
        Self {
            title: title.into(),
            salary,
            area: area.into(),
            year,
        }
    }

    /// Whether the title contains `role` (case-sensitive)
    #[must_use]
    pub fn matches_role(&self, role: &str) -> bool {
        self.title.contains(role)
    }
}
