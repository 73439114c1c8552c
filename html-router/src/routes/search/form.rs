use std::{fmt, str::FromStr};

use common::{
    error::AppError,
    search::{filters::LabelSet, SearchFilters},
};
use serde::{Deserialize, Serialize};

/// Status values the form offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusChoice {
    Active,
    Inactive,
    Pending,
}

impl StatusChoice {
    pub const ALL: [Self; 3] = [Self::Active, Self::Inactive, Self::Pending];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Pending => "Pending",
        }
    }
}

impl fmt::Display for StatusChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusChoice {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|choice| choice.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("unknown status '{s}'")))
    }
}

/// Raw submission of the search form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub law_firm: String,
    #[serde(default)]
    pub attorney: String,
    #[serde(default)]
    pub status: String,
}

impl SearchForm {
    /// Packages the submission into a fresh filter record. Everything the
    /// form does not expose takes its fixed default.
    pub fn into_filters(self) -> Result<SearchFilters, AppError> {
        let status = match self.status.as_str() {
            "" => LabelSet::new(),
            raw => LabelSet::from([raw.parse::<StatusChoice>()?.to_string()]),
        };

        Ok(SearchFilters {
            input_query: self.owner,
            status,
            law_firm: self.law_firm,
            attorney: self.attorney,
            ..SearchFilters::default()
        })
    }
}

/// Values used to pre-fill the form from the current filters.
#[derive(Debug, Clone, Serialize)]
pub struct FormValues {
    pub owner: String,
    pub law_firm: String,
    pub attorney: String,
    pub status: String,
    pub status_options: [&'static str; 3],
}

impl From<&SearchFilters> for FormValues {
    fn from(filters: &SearchFilters) -> Self {
        // The select holds one value; a multi-status URL shows as unselected
        let status = match filters.status.len() {
            1 => filters.status.iter().next().cloned().unwrap_or_default(),
            _ => String::new(),
        };
        Self {
            owner: filters.input_query.clone(),
            law_firm: filters.law_firm.clone(),
            attorney: filters.attorney.clone(),
            status,
            status_options: StatusChoice::ALL.map(StatusChoice::as_str),
        }
    }
}
