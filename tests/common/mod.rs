#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use trackport::{
    destination::{
        playlist::{BuildError, PlaylistWriter},
        search::{SearchError, TrackSearch},
    },
    management::TokenRefresher,
    source::playlist::{FetchError, PlaylistSource},
    types::{
        Credential, PlaylistTrack, PlaylistTrackItem, PlaylistTracksPage, Provider, TokenResponse,
        Track, TrackArtist,
    },
};

// Helper constructors for test fixtures

pub fn valid_credential(provider: Provider) -> Credential {
    Credential {
        provider,
        access_token: Some("access".to_string()),
        refresh_token: Some("refresh".to_string()),
        expires_at: Some(Utc::now().timestamp() + 3600),
    }
}

pub fn expiring_credential(provider: Provider) -> Credential {
    Credential {
        provider,
        access_token: Some("stale".to_string()),
        refresh_token: Some("refresh".to_string()),
        expires_at: Some(Utc::now().timestamp() + 30),
    }
}

pub fn token_response(access_token: &str, refresh_token: Option<&str>) -> TokenResponse {
    TokenResponse {
        access_token: access_token.to_string(),
        expires_in: 3600,
        refresh_token: refresh_token.map(|t| t.to_string()),
    }
}

pub fn test_track(name: &str, artist: &str) -> Track {
    Track {
        name: name.to_string(),
        artist: artist.to_string(),
        duration_ms: Some(200_000),
    }
}

pub fn page_item(name: &str, artist: &str) -> PlaylistTrackItem {
    PlaylistTrackItem {
        track: Some(PlaylistTrack {
            name: name.to_string(),
            artists: vec![TrackArtist {
                name: artist.to_string(),
            }],
            duration_ms: Some(200_000),
        }),
    }
}

pub fn unresolvable_item() -> PlaylistTrackItem {
    PlaylistTrackItem { track: None }
}

pub fn artistless_item(name: &str) -> PlaylistTrackItem {
    PlaylistTrackItem {
        track: Some(PlaylistTrack {
            name: name.to_string(),
            artists: Vec::new(),
            duration_ms: None,
        }),
    }
}

/// Builds numbered items "Track 1".."Track N" by "Artist".
pub fn numbered_items(count: usize) -> Vec<PlaylistTrackItem> {
    (1..=count)
        .map(|i| page_item(&format!("Track {}", i), "Artist"))
        .collect()
}

pub fn single_page(items: Vec<PlaylistTrackItem>) -> Vec<PlaylistTracksPage> {
    vec![PlaylistTracksPage { items, next: None }]
}

/// Chains pages with numeric cursors; only the last page has no next.
pub fn pages_of(items_per_page: Vec<Vec<PlaylistTrackItem>>) -> Vec<PlaylistTracksPage> {
    let last = items_per_page.len().saturating_sub(1);
    items_per_page
        .into_iter()
        .enumerate()
        .map(|(i, items)| PlaylistTracksPage {
            items,
            next: if i == last {
                None
            } else {
                Some((i + 1).to_string())
            },
        })
        .collect()
}

// Fakes for the provider seams

pub struct FakeRefresher {
    calls: AtomicUsize,
    delay: Duration,
    response: Mutex<Result<TokenResponse, String>>,
}

impl FakeRefresher {
    pub fn new(response: Result<TokenResponse, String>) -> Self {
        FakeRefresher {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            response: Mutex::new(response),
        }
    }

    /// Makes each refresh call take a while, so bursts overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRefresher for FakeRefresher {
    async fn refresh(
        &self,
        _provider: Provider,
        _refresh_token: &str,
    ) -> Result<TokenResponse, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.response.lock().unwrap().clone()
    }
}

pub struct FakePlaylistSource {
    pages: HashMap<String, Vec<PlaylistTracksPage>>,
    failing: Vec<String>,
    calls: AtomicUsize,
}

impl FakePlaylistSource {
    pub fn new() -> Self {
        FakePlaylistSource {
            pages: HashMap::new(),
            failing: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_playlist(mut self, id: &str, pages: Vec<PlaylistTracksPage>) -> Self {
        self.pages.insert(id.to_string(), pages);
        self
    }

    pub fn with_failing(mut self, id: &str) -> Self {
        self.failing.push(id.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaylistSource for FakePlaylistSource {
    async fn fetch_page(
        &self,
        _credential: &Credential,
        playlist_id: &str,
        cursor: Option<&str>,
    ) -> Result<PlaylistTracksPage, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.iter().any(|id| id == playlist_id) {
            return Err(FetchError::Request("simulated failure".to_string()));
        }

        let pages = self
            .pages
            .get(playlist_id)
            .ok_or_else(|| FetchError::Request(format!("unknown playlist {}", playlist_id)))?;
        let index: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
        Ok(pages[index].clone())
    }
}

/// One scripted reply of the fake search, consumed in call order.
pub enum SearchScript {
    Found(&'static str),
    NotFound,
    Quota,
    Fail,
}

pub struct FakeTrackSearch {
    script: Mutex<VecDeque<SearchScript>>,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl FakeTrackSearch {
    /// With an empty script every search matches, with ids "item-1",
    /// "item-2", ... in call order.
    pub fn new() -> Self {
        FakeTrackSearch {
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn scripted(script: Vec<SearchScript>) -> Self {
        FakeTrackSearch {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrackSearch for FakeTrackSearch {
    async fn search(
        &self,
        _credential: &Credential,
        query: &str,
    ) -> Result<Option<String>, SearchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.queries.lock().unwrap().push(query.to_string());

        match self.script.lock().unwrap().pop_front() {
            Some(SearchScript::Found(id)) => Ok(Some(id.to_string())),
            Some(SearchScript::NotFound) => Ok(None),
            Some(SearchScript::Quota) => Err(SearchError::QuotaExceeded),
            Some(SearchScript::Fail) => Err(SearchError::Request("simulated failure".to_string())),
            None => Ok(Some(format!("item-{}", call))),
        }
    }
}

pub struct FakePlaylistWriter {
    created: Mutex<Vec<String>>,
    appended: Mutex<Vec<(String, String)>>,
    fail_create: bool,
    fail_append_at: Option<usize>,
}

impl FakePlaylistWriter {
    pub fn new() -> Self {
        FakePlaylistWriter {
            created: Mutex::new(Vec::new()),
            appended: Mutex::new(Vec::new()),
            fail_create: false,
            fail_append_at: None,
        }
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Fails the append once `n` items have already been appended.
    pub fn failing_append_at(mut self, n: usize) -> Self {
        self.fail_append_at = Some(n);
        self
    }

    pub fn created_titles(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }

    pub fn appended_items(&self) -> Vec<(String, String)> {
        self.appended.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaylistWriter for FakePlaylistWriter {
    async fn create_playlist(
        &self,
        _credential: &Credential,
        title: &str,
    ) -> Result<String, BuildError> {
        if self.fail_create {
            return Err(BuildError::Create("simulated failure".to_string()));
        }
        self.created.lock().unwrap().push(title.to_string());
        Ok("playlist-1".to_string())
    }

    async fn append_item(
        &self,
        _credential: &Credential,
        playlist_id: &str,
        item_id: &str,
    ) -> Result<(), BuildError> {
        let mut appended = self.appended.lock().unwrap();
        if self.fail_append_at == Some(appended.len()) {
            return Err(BuildError::Append("simulated failure".to_string()));
        }
        appended.push((playlist_id.to_string(), item_id.to_string()));
        Ok(())
    }
}
