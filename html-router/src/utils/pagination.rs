use common::{
    search::{filters::PAGE_TARGET_PARAM, SearchFilters},
    utils::config::NextPagePolicy,
};
use serde::Serialize;

/// Pager controls rendered under a non-empty result table.
///
/// The API reports no total, so "Next" is bounded only by the configured
/// [`NextPagePolicy`].
#[derive(Debug, Clone, Serialize)]
pub struct Pager {
    pub current_page: u32,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page: Option<u32>,
    pub next_page: Option<u32>,
    /// Query strings for the page-change endpoint, current filters included.
    pub previous_query: Option<String>,
    pub next_query: Option<String>,
}

impl Pager {
    pub fn new(filters: &SearchFilters, page_len: usize, policy: NextPagePolicy) -> Self {
        let current_page = filters.page.max(1);
        let has_next = match policy {
            NextPagePolicy::Unbounded => true,
            NextPagePolicy::ShortPage => {
                usize::try_from(filters.rows).map_or(true, |rows| page_len >= rows)
            }
        };

        let previous_page = current_page.checked_sub(1).filter(|page| *page >= 1);
        let next_page = if has_next {
            current_page.checked_add(1)
        } else {
            None
        };
        let base = filters.to_query_string();
        let link = |page: u32| format!("{base}&{PAGE_TARGET_PARAM}={page}");

        Self {
            current_page,
            has_previous: previous_page.is_some(),
            has_next: next_page.is_some(),
            previous_page,
            next_page,
            previous_query: previous_page.map(link),
            next_query: next_page.map(link),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters_on(page: u32) -> SearchFilters {
        SearchFilters {
            input_query: "acme".to_string(),
            page,
            ..SearchFilters::default()
        }
    }

    #[test]
    fn previous_disabled_only_on_first_page() {
        let first = Pager::new(&filters_on(1), 10, NextPagePolicy::Unbounded);
        assert!(!first.has_previous);
        assert_eq!(first.previous_page, None);
        assert_eq!(first.previous_query, None);

        let third = Pager::new(&filters_on(3), 10, NextPagePolicy::Unbounded);
        assert!(third.has_previous);
        assert_eq!(third.previous_page, Some(2));
        assert_eq!(third.next_page, Some(4));
    }

    #[test]
    fn unbounded_policy_always_offers_next() {
        let pager = Pager::new(&filters_on(1), 2, NextPagePolicy::Unbounded);
        assert!(pager.has_next);
        assert_eq!(pager.next_page, Some(2));
    }

    #[test]
    fn short_page_policy_stops_on_partial_page() {
        let partial = Pager::new(&filters_on(2), 3, NextPagePolicy::ShortPage);
        assert!(!partial.has_next);
        assert_eq!(partial.next_query, None);

        let full = Pager::new(&filters_on(2), 10, NextPagePolicy::ShortPage);
        assert!(full.has_next);
    }

    #[test]
    fn links_carry_filters_and_target_page() {
        let pager = Pager::new(&filters_on(2), 10, NextPagePolicy::Unbounded);
        let next = pager.next_query.expect("next link");

        assert!(next.starts_with("input_query=acme&"));
        assert!(next.contains("&page=2&"));
        assert!(next.ends_with("&goto=3"));
    }
}
