use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

pub const DEFAULT_SORT_BY: &str = "default";
pub const DEFAULT_SORT_ORDER: &str = "desc";
pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_ROWS: u32 = 10;
pub const INITIAL_STATUS: &str = "Active";
/// Query parameter carrying the page a pager control asks for.
pub const PAGE_TARGET_PARAM: &str = "goto";

/// Unordered set of filter labels. Kept sorted so the query string is stable.
pub type LabelSet = BTreeSet<String>;

/// The record sent as the JSON body of every search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub input_query: String,
    pub sort_by: String,
    pub status: LabelSet,
    pub exact_match: bool,
    pub page: u32,
    pub rows: u32,
    pub classes: LabelSet,
    pub counties: LabelSet,
    pub states: LabelSet,
    pub sort_order: String,
    #[serde(default)]
    pub law_firm: String,
    #[serde(default)]
    pub attorney: String,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            input_query: String::new(),
            sort_by: DEFAULT_SORT_BY.to_string(),
            status: LabelSet::new(),
            exact_match: false,
            page: DEFAULT_PAGE,
            rows: DEFAULT_ROWS,
            classes: LabelSet::new(),
            counties: LabelSet::new(),
            states: LabelSet::new(),
            sort_order: DEFAULT_SORT_ORDER.to_string(),
            law_firm: String::new(),
            attorney: String::new(),
        }
    }
}

impl SearchFilters {
    /// Same filters, different page. Pages below 1 are clamped.
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(DEFAULT_PAGE),
            ..self.clone()
        }
    }

    /// Serializes every field as address-bar query parameters.
    ///
    /// Sets are comma-joined and an empty set is written as an empty value,
    /// so a parse of the result keeps "no status filter" distinct from
    /// "status not given".
    pub fn to_query_string(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("input_query", &self.input_query)
            .append_pair("sort_by", &self.sort_by)
            .append_pair("status", &join_labels(&self.status))
            .append_pair("exact_match", if self.exact_match { "true" } else { "false" })
            .append_pair("page", &self.page.to_string())
            .append_pair("rows", &self.rows.to_string())
            .append_pair("classes", &join_labels(&self.classes))
            .append_pair("counties", &join_labels(&self.counties))
            .append_pair("states", &join_labels(&self.states))
            .append_pair("sort_order", &self.sort_order)
            .append_pair("law_firm", &self.law_firm)
            .append_pair("attorney", &self.attorney);
        query.finish()
    }
}

fn join_labels(labels: &LabelSet) -> String {
    labels
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

fn split_labels(raw: &str) -> LabelSet {
    raw.split(',')
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

/// What an absent `status` parameter means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingStatus {
    /// Server-rendered first load: show active attorneys.
    Active,
    /// Anything else: no status filter.
    Unfiltered,
}

/// Raw, untrusted page parameters. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    pub input_query: Option<String>,
    pub sort_by: Option<String>,
    pub status: Option<String>,
    pub exact_match: Option<String>,
    pub page: Option<String>,
    pub rows: Option<String>,
    pub classes: Option<String>,
    pub counties: Option<String>,
    pub states: Option<String>,
    pub sort_order: Option<String>,
    pub law_firm: Option<String>,
    pub attorney: Option<String>,
}

impl FilterParams {
    /// Reads filter parameters from a raw query string. Unknown keys are
    /// ignored and a repeated key keeps its last value, so no query string
    /// is ever rejected.
    pub fn from_query_str(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            let value = Some(value.into_owned());
            match key.as_ref() {
                "input_query" => params.input_query = value,
                "sort_by" => params.sort_by = value,
                "status" => params.status = value,
                "exact_match" => params.exact_match = value,
                "page" => params.page = value,
                "rows" => params.rows = value,
                "classes" => params.classes = value,
                "counties" => params.counties = value,
                "states" => params.states = value,
                "sort_order" => params.sort_order = value,
                "law_firm" => params.law_firm = value,
                "attorney" => params.attorney = value,
                _ => {}
            }
        }
        params
    }

    /// Normalizes the parameters, replacing anything absent or unparseable
    /// with its default.
    pub fn into_filters(self, missing_status: MissingStatus) -> SearchFilters {
        let status = match (self.status, missing_status) {
            (Some(raw), _) => split_labels(&raw),
            (None, MissingStatus::Active) => LabelSet::from([INITIAL_STATUS.to_string()]),
            (None, MissingStatus::Unfiltered) => LabelSet::new(),
        };

        SearchFilters {
            input_query: self.input_query.unwrap_or_default(),
            sort_by: non_empty_or(self.sort_by, DEFAULT_SORT_BY),
            status,
            exact_match: self.exact_match.as_deref() == Some("true"),
            page: parse_positive(self.page.as_deref()).unwrap_or(DEFAULT_PAGE),
            rows: parse_positive(self.rows.as_deref()).unwrap_or(DEFAULT_ROWS),
            classes: self.classes.as_deref().map(split_labels).unwrap_or_default(),
            counties: self.counties.as_deref().map(split_labels).unwrap_or_default(),
            states: self.states.as_deref().map(split_labels).unwrap_or_default(),
            sort_order: non_empty_or(self.sort_order, DEFAULT_SORT_ORDER),
            law_firm: self.law_firm.unwrap_or_default(),
            attorney: self.attorney.unwrap_or_default(),
        }
    }
}

/// The page requested through [`PAGE_TARGET_PARAM`], if present and valid.
pub fn page_target(query: &str) -> Option<u32> {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .filter(|(key, _)| key == PAGE_TARGET_PARAM)
        .last()
        .and_then(|(_, value)| parse_positive(Some(&*value)))
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|v| *v > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> LabelSet {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn initial_load_defaults_status_to_active() {
        let filters = FilterParams::from_query_str("input_query=nike")
            .into_filters(MissingStatus::Active);

        assert_eq!(filters.status, labels(&["Active"]));
        assert_eq!(filters.input_query, "nike");
        assert_eq!(filters.page, 1);
        assert_eq!(filters.rows, 10);
        assert_eq!(filters.sort_by, "default");
        assert_eq!(filters.sort_order, "desc");
        assert!(!filters.exact_match);
    }

    #[test]
    fn missing_status_outside_initial_load_is_unfiltered() {
        let filters = FilterParams::from_query_str("").into_filters(MissingStatus::Unfiltered);
        assert!(filters.status.is_empty());
    }

    #[test]
    fn present_but_empty_status_means_no_filter() {
        let filters =
            FilterParams::from_query_str("status=").into_filters(MissingStatus::Active);
        assert!(filters.status.is_empty());
    }

    #[test]
    fn unparseable_numbers_fall_back() {
        let filters = FilterParams::from_query_str("page=abc&rows=-4")
            .into_filters(MissingStatus::Active);
        assert_eq!(filters.page, 1);
        assert_eq!(filters.rows, 10);

        let filters =
            FilterParams::from_query_str("page=0&rows=0").into_filters(MissingStatus::Active);
        assert_eq!(filters.page, 1);
        assert_eq!(filters.rows, 10);

        let filters =
            FilterParams::from_query_str("page=7&rows=25").into_filters(MissingStatus::Active);
        assert_eq!(filters.page, 7);
        assert_eq!(filters.rows, 25);
    }

    #[test]
    fn exact_match_requires_literal_true() {
        let on = FilterParams::from_query_str("exact_match=true")
            .into_filters(MissingStatus::Active);
        let off = FilterParams::from_query_str("exact_match=yes")
            .into_filters(MissingStatus::Active);
        assert!(on.exact_match);
        assert!(!off.exact_match);
    }

    #[test]
    fn repeated_keys_keep_the_last_value() {
        let filters = FilterParams::from_query_str("status=Active&status=Pending&page=2&page=x")
            .into_filters(MissingStatus::Active);
        assert_eq!(filters.status, labels(&["Pending"]));
        assert_eq!(filters.page, 1);
    }

    #[test]
    fn page_target_reads_goto() {
        assert_eq!(page_target("input_query=a&goto=3"), Some(3));
        assert_eq!(page_target("goto=2&goto=5"), Some(5));
        assert_eq!(page_target("goto=0"), None);
        assert_eq!(page_target("goto=next"), None);
        assert_eq!(page_target("page=4"), None);
    }

    #[test]
    fn sets_are_deduplicated() {
        let filters = FilterParams::from_query_str("states=CA,NY,CA&classes=9,,25")
            .into_filters(MissingStatus::Active);
        assert_eq!(filters.states, labels(&["CA", "NY"]));
        assert_eq!(filters.classes, labels(&["25", "9"]));
    }

    #[test]
    fn query_string_round_trip() {
        let before = SearchFilters {
            input_query: "acme & sons".to_string(),
            status: labels(&["Pending"]),
            page: 4,
            law_firm: "Smith, Jones & Co".to_string(),
            attorney: "Jane Doe".to_string(),
            ..SearchFilters::default()
        };

        let query = before.to_query_string();
        let parsed = FilterParams::from_query_str(&query).into_filters(MissingStatus::Active);

        assert_eq!(parsed.input_query, before.input_query);
        assert_eq!(parsed.law_firm, before.law_firm);
        assert_eq!(parsed.attorney, before.attorney);
        assert_eq!(parsed.status, before.status);
        assert_eq!(parsed.page, before.page);
        assert_eq!(parsed, before);
    }

    #[test]
    fn round_trip_keeps_empty_status_empty() {
        let before = SearchFilters::default();
        let parsed = FilterParams::from_query_str(&before.to_query_string())
            .into_filters(MissingStatus::Active);
        assert!(parsed.status.is_empty());
    }

    #[test]
    fn query_string_lists_every_field() {
        let query = SearchFilters::default().to_query_string();

        assert_eq!(
            query,
            "input_query=&sort_by=default&status=&exact_match=false&page=1&rows=10\
             &classes=&counties=&states=&sort_order=desc&law_firm=&attorney="
        );
    }

    #[test]
    fn with_page_changes_only_the_page() {
        let filters = SearchFilters {
            input_query: "owner".to_string(),
            status: labels(&["Active"]),
            law_firm: "firm".to_string(),
            ..SearchFilters::default()
        };

        let next = filters.with_page(3);
        assert_eq!(next.page, 3);
        assert_eq!(SearchFilters { page: 1, ..next.clone() }, filters);
        assert_eq!(filters.with_page(0).page, 1);
    }

    #[test]
    fn json_body_uses_api_field_names() {
        let filters = SearchFilters {
            status: labels(&["Active"]),
            law_firm: "firm".to_string(),
            ..SearchFilters::default()
        };
        let body = serde_json::to_value(&filters).expect("serialize");

        assert_eq!(body["status"], serde_json::json!(["Active"]));
        assert_eq!(body["classes"], serde_json::json!([]));
        assert_eq!(body["sort_order"], "desc");
        assert_eq!(body["law_firm"], "firm");
        assert_eq!(body["attorney"], "");
    }

    #[test]
    fn missing_text_filters_are_sent_as_empty_strings() {
        let filters = FilterParams::from_query_str("input_query=nike")
            .into_filters(MissingStatus::Active);
        let body = serde_json::to_value(&filters).expect("serialize");

        assert_eq!(body["law_firm"], "");
        assert_eq!(body["attorney"], "");
    }
}
