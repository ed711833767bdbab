use serde::{Deserialize, Serialize};

/// One server response unit of a paginated listing.
///
/// Invariants (server-enforced, asserted nowhere): `meta.current_page <=
/// meta.last_page` and `data.len() <= meta.per_page`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<PageLinks>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl PageMeta {
    /// Whether a page after this one exists.
    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::models::Patient;
    use serde_json::json;

    #[test]
    fn decodes_codec_translated_body() {
        let wire = json!({
            "data": [{
                "first_name": "Alice",
                "last_name": "Smith",
                "email": "alice@gmail.com",
                "phone_number": "5551234567",
                "country_iso": "US",
                "document_image_path": "documents/a.jpg",
                "id": 1,
            }],
            "meta": { "current_page": 1, "last_page": 3, "per_page": 10, "total": 25 },
            "links": { "next": "/patients?page=2" },
        });
        let page: Page<Patient> =
            serde_json::from_value(codec::to_client_keys(wire)).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].first_name, "Alice");
        assert_eq!(page.meta.total, 25);
        assert_eq!(page.links.unwrap().next.as_deref(), Some("/patients?page=2"));
    }

    #[test]
    fn missing_links_tolerated() {
        let wire = json!({
            "data": [],
            "meta": { "current_page": 1, "last_page": 1, "per_page": 10, "total": 0 },
        });
        let page: Page<Patient> =
            serde_json::from_value(codec::to_client_keys(wire)).unwrap();
        assert!(page.links.is_none());
        assert!(page.data.is_empty());
    }

    #[test]
    fn has_next_only_before_last_page() {
        let mut meta = PageMeta { current_page: 1, last_page: 3, per_page: 10, total: 25 };
        assert!(meta.has_next());
        meta.current_page = 3;
        assert!(!meta.has_next());
    }
}
