use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_PAGE_SIZE;

/// Field the server may sort a patient listing by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    FirstName,
    LastName,
    Email,
}

impl SortField {
    /// Client-shape key, as sent through the codec (`firstName` etc.).
    pub fn client_key(&self) -> &'static str {
        match self {
            SortField::FirstName => "firstName",
            SortField::LastName => "lastName",
            SortField::Email => "email",
        }
    }
}

/// Parameters for one patient-list request.
///
/// Optional members set to `None` (or an empty search string) are omitted
/// from the outgoing request entirely rather than sent as empty values.
#[derive(Debug, Clone, PartialEq)]
pub struct ListParams {
    pub page: u32,
    pub page_size: u32,
    pub search: Option<String>,
    pub sort_by: Option<SortField>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search: None,
            sort_by: None,
            created_from: None,
            created_to: None,
        }
    }
}

impl ListParams {
    /// Query pairs in the server shape (snake_case names, snake_cased sort
    /// value). Empty/absent optionals produce no pair.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
        ];
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(sort_by) = self.sort_by {
            pairs.push(("sort_by", crate::codec::camel_to_snake(sort_by.client_key())));
        }
        if let Some(from) = self.created_from {
            pairs.push(("created_from", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.created_to {
            pairs.push(("created_to", to.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}
