//! Paginated query cache — one accumulated page sequence per query key.
//!
//! Pure state machine, no I/O. The controller asks for the next request via
//! [`PageCache::next_request`], performs it through the transport, and feeds
//! the outcome back with the issued token. Tokens make staleness explicit:
//! re-keying or invalidating while a fetch is outstanding drops interest in
//! its result, and the late answer is ignored when it arrives
//! (last-key-wins). At most one request is outstanding at a time
//! (single-flight), which also keeps page fetches causally ordered — page
//! N+1 is only handed out after page N was applied.

use crate::models::{ListParams, Page, PageLinks, PageMeta, Patient, SortField};

/// The (search text, sort field) pair identifying one independent
/// pagination sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub search: String,
    pub sort_by: SortField,
}

impl QueryKey {
    pub fn new(search: &str, sort_by: SortField) -> Self {
        Self { search: search.to_string(), sort_by }
    }
}

/// Ticket for one in-flight fetch. Only the most recently issued token is
/// accepted back; anything else is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchToken(u64);

/// Where the sequence for the current key stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    /// Nothing fetched yet for this key.
    Idle,
    /// First page outstanding.
    Loading,
    /// At least one page applied, nothing outstanding.
    Ready,
    /// A follow-up page outstanding on top of applied ones.
    LoadingMore,
    /// Last fetch failed; accumulated records remain readable.
    Errored,
}

/// A fetch the controller should perform.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub token: FetchToken,
    pub params: ListParams,
}

/// Accumulates pages for the active [`QueryKey`].
#[derive(Debug)]
pub struct PageCache {
    key: QueryKey,
    page_size: u32,
    phase: FetchPhase,
    records: Vec<Patient>,
    meta: Option<PageMeta>,
    links: Option<PageLinks>,
    in_flight: Option<FetchToken>,
    token_counter: u64,
}

impl PageCache {
    pub fn new(key: QueryKey, page_size: u32) -> Self {
        Self {
            key,
            page_size,
            phase: FetchPhase::Idle,
            records: Vec::new(),
            meta: None,
            links: None,
            in_flight: None,
            token_counter: 0,
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn phase(&self) -> FetchPhase {
        self.phase
    }

    /// The accumulated, in-order concatenation of every applied page.
    pub fn records(&self) -> &[Patient] {
        &self.records
    }

    pub fn meta(&self) -> Option<&PageMeta> {
        self.meta.as_ref()
    }

    pub fn links(&self) -> Option<&PageLinks> {
        self.links.as_ref()
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// True until the last received page says `current_page == last_page`.
    /// Before any page arrives there is trivially more to fetch.
    pub fn has_more(&self) -> bool {
        self.meta.map_or(true, |m| m.has_next())
    }

    /// Switch to a different query key, discarding the accumulated sequence
    /// and restarting at page 1. Outstanding fetches for the old key become
    /// stale. Setting the same key is a no-op.
    pub fn set_key(&mut self, key: QueryKey) {
        if key == self.key {
            return;
        }
        self.key = key;
        self.reset();
    }

    /// Drop the accumulated sequence for the current key so the next fetch
    /// starts from page 1. Called after any successful mutation.
    pub fn invalidate(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.records.clear();
        self.meta = None;
        self.links = None;
        self.phase = FetchPhase::Idle;
        self.in_flight = None;
    }

    /// Hand out the next fetch, if one is due.
    ///
    /// Returns `None` while a fetch is outstanding (single-flight) and once
    /// the last page has been received. After a failure the same page is
    /// offered again — retrying is the caller's decision, made simply by
    /// calling this again.
    pub fn next_request(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() {
            return None;
        }
        let page = match self.meta {
            None => 1,
            Some(m) if m.has_next() => m.current_page + 1,
            Some(_) => return None,
        };

        self.token_counter += 1;
        let token = FetchToken(self.token_counter);
        self.in_flight = Some(token);
        self.phase = if self.meta.is_none() {
            FetchPhase::Loading
        } else {
            FetchPhase::LoadingMore
        };

        Some(PageRequest {
            token,
            params: ListParams {
                page,
                page_size: self.page_size,
                search: Some(self.key.search.clone()).filter(|s| !s.is_empty()),
                sort_by: Some(self.key.sort_by),
                ..Default::default()
            },
        })
    }

    /// Apply a fetched page. Returns false (and changes nothing) when the
    /// token is stale — superseded by a re-key or an invalidation.
    pub fn apply_page(&mut self, token: FetchToken, page: Page<Patient>) -> bool {
        if self.in_flight != Some(token) {
            tracing::debug!(token = token.0, "Discarding stale page result");
            return false;
        }
        self.in_flight = None;
        self.records.extend(page.data);
        self.meta = Some(page.meta);
        self.links = page.links;
        self.phase = FetchPhase::Ready;
        true
    }

    /// Record a fetch failure. The sequence accumulated before the failure
    /// stays readable. Returns false for a stale token.
    pub fn apply_error(&mut self, token: FetchToken) -> bool {
        if self.in_flight != Some(token) {
            tracing::debug!(token = token.0, "Discarding stale fetch error");
            return false;
        }
        self.in_flight = None;
        self.phase = FetchPhase::Errored;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(id: u64) -> Patient {
        Patient {
            id,
            first_name: format!("First{id}"),
            last_name: format!("Last{id}"),
            email: format!("p{id}@gmail.com"),
            phone_number: "5551234567".into(),
            country_iso: "US".into(),
            document_image_path: String::new(),
        }
    }

    fn page(current: u32, last: u32, per_page: u32, ids: std::ops::Range<u64>) -> Page<Patient> {
        Page {
            data: ids.map(patient).collect(),
            meta: PageMeta {
                current_page: current,
                last_page: last,
                per_page,
                total: 25,
            },
            links: None,
        }
    }

    fn cache() -> PageCache {
        PageCache::new(QueryKey::new("", SortField::FirstName), 10)
    }

    #[test]
    fn starts_idle_with_more_to_fetch() {
        let cache = cache();
        assert_eq!(cache.phase(), FetchPhase::Idle);
        assert!(cache.has_more());
        assert!(cache.records().is_empty());
    }

    #[test]
    fn first_request_is_page_one_with_key_params() {
        let mut cache = PageCache::new(QueryKey::new("smith", SortField::LastName), 10);
        let request = cache.next_request().unwrap();
        assert_eq!(request.params.page, 1);
        assert_eq!(request.params.search.as_deref(), Some("smith"));
        assert_eq!(request.params.sort_by, Some(SortField::LastName));
        assert_eq!(cache.phase(), FetchPhase::Loading);
    }

    #[test]
    fn empty_search_not_sent() {
        let mut cache = cache();
        let request = cache.next_request().unwrap();
        assert_eq!(request.params.search, None);
    }

    #[test]
    fn single_flight_per_key() {
        let mut cache = cache();
        let first = cache.next_request();
        assert!(first.is_some());
        // second call while the first is outstanding issues nothing
        assert!(cache.next_request().is_none());
        assert!(cache.next_request().is_none());
    }

    #[test]
    fn pages_accumulate_in_order() {
        let mut cache = cache();

        let r1 = cache.next_request().unwrap();
        assert!(cache.apply_page(r1.token, page(1, 3, 10, 0..10)));
        assert_eq!(cache.records().len(), 10);
        assert_eq!(cache.phase(), FetchPhase::Ready);
        assert!(cache.has_more());

        let r2 = cache.next_request().unwrap();
        assert_eq!(r2.params.page, 2);
        assert_eq!(cache.phase(), FetchPhase::LoadingMore);
        assert!(cache.apply_page(r2.token, page(2, 3, 10, 10..20)));
        assert_eq!(cache.records().len(), 20);

        let ids: Vec<u64> = cache.records().iter().map(|p| p.id).collect();
        assert_eq!(ids, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn twenty_five_records_over_three_pages_then_noop() {
        let mut cache = cache();

        let r1 = cache.next_request().unwrap();
        cache.apply_page(r1.token, page(1, 3, 10, 0..10));
        let r2 = cache.next_request().unwrap();
        cache.apply_page(r2.token, page(2, 3, 10, 10..20));
        let r3 = cache.next_request().unwrap();
        cache.apply_page(r3.token, page(3, 3, 10, 20..25));

        assert_eq!(cache.records().len(), 25);
        assert!(!cache.has_more());
        assert!(cache.next_request().is_none(), "fourth fetch is a no-op");
        assert_eq!(cache.records().len(), 25);
    }

    #[test]
    fn has_more_false_exactly_at_last_page() {
        let mut cache = cache();
        let r1 = cache.next_request().unwrap();
        cache.apply_page(r1.token, page(1, 2, 10, 0..10));
        assert!(cache.has_more());

        let r2 = cache.next_request().unwrap();
        cache.apply_page(r2.token, page(2, 2, 10, 10..15));
        assert!(!cache.has_more());
    }

    #[test]
    fn rekey_discards_stale_result() {
        let mut cache = cache();
        let stale = cache.next_request().unwrap();

        cache.set_key(QueryKey::new("smith", SortField::FirstName));
        let fresh = cache.next_request().unwrap();
        assert_eq!(fresh.params.page, 1);

        // the old key's fetch resolves late: ignored
        assert!(!cache.apply_page(stale.token, page(1, 3, 10, 0..10)));
        assert!(cache.records().is_empty());

        // the new key's fetch applies normally
        assert!(cache.apply_page(fresh.token, page(1, 1, 10, 40..45)));
        assert_eq!(cache.records().len(), 5);
    }

    #[test]
    fn rekey_to_same_key_keeps_sequence() {
        let mut cache = cache();
        let r1 = cache.next_request().unwrap();
        cache.apply_page(r1.token, page(1, 3, 10, 0..10));

        cache.set_key(QueryKey::new("", SortField::FirstName));
        assert_eq!(cache.records().len(), 10, "same key is a no-op");
    }

    #[test]
    fn invalidate_restarts_from_page_one() {
        let mut cache = cache();
        let r1 = cache.next_request().unwrap();
        cache.apply_page(r1.token, page(1, 3, 10, 0..10));
        let r2 = cache.next_request().unwrap();
        cache.apply_page(r2.token, page(2, 3, 10, 10..20));

        cache.invalidate();
        assert_eq!(cache.phase(), FetchPhase::Idle);
        assert!(cache.records().is_empty());
        let fresh = cache.next_request().unwrap();
        assert_eq!(fresh.params.page, 1);
    }

    #[test]
    fn invalidate_makes_outstanding_token_stale() {
        let mut cache = cache();
        let stale = cache.next_request().unwrap();
        cache.invalidate();
        assert!(!cache.apply_page(stale.token, page(1, 3, 10, 0..10)));
        assert!(cache.records().is_empty());
    }

    #[test]
    fn error_keeps_accumulated_records_and_allows_retry() {
        let mut cache = cache();
        let r1 = cache.next_request().unwrap();
        cache.apply_page(r1.token, page(1, 3, 10, 0..10));

        let r2 = cache.next_request().unwrap();
        assert!(cache.apply_error(r2.token));
        assert_eq!(cache.phase(), FetchPhase::Errored);
        assert_eq!(cache.records().len(), 10, "prior pages still displayable");

        // retry re-requests the same page
        let retry = cache.next_request().unwrap();
        assert_eq!(retry.params.page, 2);
        assert!(cache.apply_page(retry.token, page(2, 3, 10, 10..20)));
        assert_eq!(cache.records().len(), 20);
    }

    #[test]
    fn stale_error_ignored() {
        let mut cache = cache();
        let stale = cache.next_request().unwrap();
        cache.set_key(QueryKey::new("x", SortField::FirstName));
        assert!(!cache.apply_error(stale.token));
        assert_eq!(cache.phase(), FetchPhase::Idle);
    }
}
