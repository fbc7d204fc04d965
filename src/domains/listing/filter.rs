use crate::types::RecordStatus;
use serde::{Deserialize, Serialize};

/// Spellings the various selectors use for "no constraint".
const SENTINELS: &[&str] = &[
    "all",
    "todos",
    "todas",
    "todas as categorias",
    "todas as causas",
    "todos os estados",
    "todos os status",
];

/// Read access to the fields the listing filters look at.
///
/// Every accessor is optional: a record missing a field simply fails the
/// predicate that needs it.
pub trait Listable {
    fn title(&self) -> Option<&str>;
    fn description(&self) -> Option<&str>;
    /// Campaign category or project cause
    fn category(&self) -> Option<&str>;
    fn status(&self) -> Option<&RecordStatus>;
    fn city(&self) -> Option<&str>;
    fn state(&self) -> Option<&str>;
}

/// Filter values exactly as typed or selected in a listing screen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterInput {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// Normalised filter criteria. `None` means "no constraint" for that field
/// regardless of which sentinel the screen used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub search: String,
    pub category: Option<String>,
    pub status: Option<RecordStatus>,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// Outcome of each individual predicate for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredicateOutcome {
    pub search: bool,
    pub category: bool,
    pub status: bool,
    pub city: bool,
    pub state: bool,
}

impl PredicateOutcome {
    pub fn all(&self) -> bool {
        self.search && self.category && self.status && self.city && self.state
    }
}

fn constraint(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() || SENTINELS.contains(&trimmed.to_lowercase().as_str()) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn contains_ci(haystack: Option<&str>, needle_lower: &str) -> bool {
    haystack.map_or(false, |h| h.to_lowercase().contains(needle_lower))
}

impl FilterCriteria {
    /// Criteria that match every record ("clear filters").
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn from_input(input: &FilterInput) -> Self {
        Self {
            search: input.search.clone().unwrap_or_default(),
            category: constraint(input.category.as_deref()),
            status: constraint(input.status.as_deref()).map(|s| RecordStatus::from_code(&s)),
            city: constraint(input.city.as_deref()),
            state: constraint(input.state.as_deref()).map(|s| s.to_uppercase()),
        }
    }

    pub fn with_search(mut self, search: &str) -> Self {
        self.search = search.to_string();
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = constraint(Some(category));
        self
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = constraint(Some(status)).map(|s| RecordStatus::from_code(&s));
        self
    }

    pub fn with_city(mut self, city: &str) -> Self {
        self.city = constraint(Some(city));
        self
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.state = constraint(Some(state)).map(|s| s.to_uppercase());
        self
    }

    pub fn is_match_all(&self) -> bool {
        self.search.is_empty()
            && self.category.is_none()
            && self.status.is_none()
            && self.city.is_none()
            && self.state.is_none()
    }

    /// Evaluates every predicate independently against one record.
    pub fn evaluate<R: Listable + ?Sized>(&self, record: &R) -> PredicateOutcome {
        let search = if self.search.is_empty() {
            true
        } else {
            let needle = self.search.to_lowercase();
            contains_ci(record.title(), &needle) || contains_ci(record.description(), &needle)
        };

        let category = match &self.category {
            None => true,
            Some(wanted) => record.category().map_or(false, |c| c.trim() == wanted),
        };

        let status = match &self.status {
            None => true,
            Some(wanted) => record.status().map_or(false, |s| s == wanted),
        };

        // City is matched against the city field only, never the full location
        // text, so "sp" does not match every record in the state of SP.
        let city = match &self.city {
            None => true,
            Some(wanted) => contains_ci(record.city(), &wanted.to_lowercase()),
        };

        let state = match &self.state {
            None => true,
            Some(wanted) => record.state().map_or(false, |s| s.trim().eq_ignore_ascii_case(wanted)),
        };

        PredicateOutcome { search, category, status, city, state }
    }

    pub fn matches<R: Listable + ?Sized>(&self, record: &R) -> bool {
        self.evaluate(record).all()
    }
}

/// Returns the records matching `criteria`, in their original order.
pub fn filter_records<R: Listable + Clone>(records: &[R], criteria: &FilterCriteria) -> Vec<R> {
    records
        .iter()
        .filter(|record| criteria.matches(*record))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Row {
        title: Option<String>,
        description: Option<String>,
        category: Option<String>,
        status: Option<RecordStatus>,
        city: Option<String>,
        state: Option<String>,
    }

    impl Row {
        fn new(title: &str, description: &str, category: &str, status: &str, city: &str, state: &str) -> Self {
            Self {
                title: Some(title.to_string()),
                description: Some(description.to_string()),
                category: Some(category.to_string()),
                status: Some(RecordStatus::from_code(status)),
                city: Some(city.to_string()),
                state: Some(state.to_string()),
            }
        }
    }

    impl Listable for Row {
        fn title(&self) -> Option<&str> { self.title.as_deref() }
        fn description(&self) -> Option<&str> { self.description.as_deref() }
        fn category(&self) -> Option<&str> { self.category.as_deref() }
        fn status(&self) -> Option<&RecordStatus> { self.status.as_ref() }
        fn city(&self) -> Option<&str> { self.city.as_deref() }
        fn state(&self) -> Option<&str> { self.state.as_deref() }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row::new("Educação para Todos", "Alfabetização de adultos", "Educação", "open", "São Paulo", "SP"),
            Row::new("Alimentação Solidária", "Refeições para pessoas em situação de rua", "Assistência Social", "open", "Rio de Janeiro", "RJ"),
            Row::new("Biblioteca Comunitária", "Organização de biblioteca", "Educação", "completed", "Salvador", "BA"),
            Row::new("Mutirão de Leitura", "Leitura para crianças", "Educação", "open", "Campinas", "SP"),
        ]
    }

    fn titles(records: &[Row]) -> Vec<&str> {
        records.iter().map(|r| r.title.as_deref().unwrap_or("")).collect()
    }

    #[test]
    fn test_sentinels_mean_no_constraint() {
        for sentinel in ["", "  ", "all", "ALL", "Todas as categorias", "Todas as causas", "Todos os estados", "Todos os status", "Todas", "Todos"] {
            let input = FilterInput {
                category: Some(sentinel.to_string()),
                status: Some(sentinel.to_string()),
                city: Some(sentinel.to_string()),
                state: Some(sentinel.to_string()),
                ..Default::default()
            };
            let criteria = FilterCriteria::from_input(&input);
            assert!(criteria.is_match_all(), "sentinel {:?} was treated as a constraint", sentinel);
            assert_eq!(filter_records(&rows(), &criteria), rows());
        }
    }

    #[test]
    fn test_search_matches_title_or_description() {
        let criteria = FilterCriteria::match_all().with_search("BIBLIOTECA");
        assert_eq!(titles(&filter_records(&rows(), &criteria)), vec!["Biblioteca Comunitária"]);

        let criteria = FilterCriteria::match_all().with_search("situação de rua");
        assert_eq!(titles(&filter_records(&rows(), &criteria)), vec!["Alimentação Solidária"]);
    }

    #[test]
    fn test_category_and_status_are_exact() {
        let criteria = FilterCriteria::match_all().with_category("Educação").with_status("open");
        assert_eq!(
            titles(&filter_records(&rows(), &criteria)),
            vec!["Educação para Todos", "Mutirão de Leitura"]
        );

        let criteria = FilterCriteria::match_all().with_category("Educ");
        assert!(filter_records(&rows(), &criteria).is_empty());
    }

    #[test]
    fn test_city_does_not_match_state_abbreviation() {
        // "sp" appears in "Campinas, SP" as a location string but not in the city
        let criteria = FilterCriteria::match_all().with_city("sp");
        assert!(filter_records(&rows(), &criteria).is_empty());

        let criteria = FilterCriteria::match_all().with_city("paulo");
        assert_eq!(titles(&filter_records(&rows(), &criteria)), vec!["Educação para Todos"]);
    }

    #[test]
    fn test_state_is_equality_on_state_field() {
        let criteria = FilterCriteria::match_all().with_state("sp");
        assert_eq!(
            titles(&filter_records(&rows(), &criteria)),
            vec!["Educação para Todos", "Mutirão de Leitura"]
        );

        let criteria = FilterCriteria::match_all().with_state("S");
        assert!(filter_records(&rows(), &criteria).is_empty());
    }

    #[test]
    fn test_missing_fields_fail_only_affected_predicate() {
        let record = Row {
            title: Some("Sem descrição".to_string()),
            ..Default::default()
        };

        let outcome = FilterCriteria::match_all().with_search("descrição").evaluate(&record);
        assert!(outcome.search);

        let criteria = FilterCriteria::match_all()
            .with_search("nada")
            .with_category("Saúde")
            .with_status("open")
            .with_city("Recife")
            .with_state("PE");
        let outcome = criteria.evaluate(&record);
        assert_eq!(outcome, PredicateOutcome { search: false, category: false, status: false, city: false, state: false });

        // No constraint set: a record full of holes still matches
        assert!(FilterCriteria::match_all().matches(&record));
    }

    #[test]
    fn test_single_record_included_iff_every_predicate_holds() {
        let criteria_set = vec![
            FilterCriteria::match_all(),
            FilterCriteria::match_all().with_search("leitura"),
            FilterCriteria::match_all().with_category("Educação").with_state("BA"),
            FilterCriteria::match_all().with_status("completed").with_city("salvador"),
            FilterCriteria::match_all().with_status("open").with_city("salvador"),
        ];

        for record in rows() {
            for criteria in &criteria_set {
                let filtered = filter_records(std::slice::from_ref(&record), criteria);
                if criteria.evaluate(&record).all() {
                    assert_eq!(filtered, vec![record.clone()]);
                } else {
                    assert!(filtered.is_empty());
                }
            }
        }
    }

    #[test]
    fn test_filter_is_stable_and_idempotent() {
        let criteria = FilterCriteria::match_all().with_category("Educação");
        let first = filter_records(&rows(), &criteria);
        let second = filter_records(&rows(), &criteria);
        assert_eq!(first, second);
        assert_eq!(
            titles(&first),
            vec!["Educação para Todos", "Biblioteca Comunitária", "Mutirão de Leitura"]
        );
        assert_eq!(filter_records(&first, &criteria), first);
    }

    #[test]
    fn test_fully_funded_completed_campaign() {
        use crate::domains::campaign::CampaignRecord;
        use crate::domains::listing::metrics::funding_percentage;

        let completed: CampaignRecord = serde_json::from_str(
            r#"{"id": 4, "titulo": "Cesta Básica para Famílias", "meta": 20000, "arrecadado": 20000,
                "doadores": 203, "cidade": "Porto Alegre", "estado": "RS", "status": "Concluída"}"#,
        )
        .unwrap();
        assert_eq!(funding_percentage(completed.current_amount, completed.goal_amount), 100.0);

        let status = |value: &str| {
            FilterCriteria::from_input(&FilterInput {
                status: Some(value.to_string()),
                ..Default::default()
            })
        };
        assert!(status("all").matches(&completed));
        assert!(status("Completed").matches(&completed));
        assert!(status("completed").matches(&completed));
        assert!(!status("Active").matches(&completed));
    }

    #[test]
    fn test_status_label_matches_status_code() {
        use crate::domains::campaign::CampaignRecord;

        let active: CampaignRecord = serde_json::from_str(
            r#"{"id": "7a1c", "title": "Reforma da Escola", "goalAmount": 50000, "currentAmount": 32500,
                "status": "active"}"#,
        )
        .unwrap();
        assert!(FilterCriteria::match_all().with_status("Ativa").matches(&active));
        assert!(!FilterCriteria::match_all().with_status("Concluída").matches(&active));
    }
}
