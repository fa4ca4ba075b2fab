//! The viewer session: one owner for all state, driven by [`Command`]s, answering with
//! [`Effect`]s.
//!
//! Nothing in here performs I/O. Requests leave as [`Effect::Fetch`] and come back as
//! [`Command::Completed`] carrying the [`Ticket`] they were issued with; a ticket that no longer
//! matches the viewer is dropped.

mod command;

pub use command::{
    Command, Effect, FetchRequest, GridStatus, Method, PointerInput, Ticket, Timer, ToastKind,
    TouchInput,
};

use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use crate::api::{
    FetchResult, RatingRequest, SearchHit, Subdirectory, parse_listing, parse_metadata,
    parse_rating, parse_search,
};
use crate::cache::ImageCache;
use crate::catalog::{Catalog, MAX_RATING, Photo, SortMode, normalize_path, sort_photos};
use crate::codec::decode_image;
use crate::config::ViewerConfig;
use crate::pipeline::{BatchLoader, PreloadQueue};
use crate::resolve::ImageSourceResolver;
use crate::stats::StatsCollector;
use crate::types::{ImageKey, RequestToken, Variant, Vec2};
use crate::viewer::{
    BackdropZones, DisplaySlot, GestureConfig, GestureIntent, GesturePhase, GestureRecognizer,
    ImageHandle, Key, LoadRequest, LoadTicket, NavAction, NavigationController, SwipeConfig,
    SwipePager, TapZone, ViewerState, key_action,
};

fn system_clock_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

#[derive(Debug)]
pub struct Session {
    config: ViewerConfig,
    state: ViewerState,
    resolver: ImageSourceResolver,
    navigation: NavigationController,
    gestures: GestureRecognizer,
    swipe: SwipePager,
    zones: BackdropZones,
    cache: ImageCache<ImageHandle>,
    preload: PreloadQueue,
    grid: BatchLoader<usize>,
    directory: Option<String>,
    subdirectories: Vec<Subdirectory>,
    sort: SortMode,
    listing_generation: u64,
    grid_generation: u64,
    search_generation: u64,
    search_results: Vec<SearchHit>,
    image_requested_at: Option<Instant>,
    stats: Arc<StatsCollector>,
    clock: fn() -> u64,
}

impl Session {
    pub fn new(config: ViewerConfig) -> Self {
        Self::with_stats(config, Arc::new(StatsCollector::new()))
    }

    pub fn with_stats(config: ViewerConfig, stats: Arc<StatsCollector>) -> Self {
        let stats_capacity = config.cache_max_entries;
        let session = Self {
            state: ViewerState::new(&config),
            resolver: ImageSourceResolver::new(config.api_base.clone()),
            navigation: NavigationController::new(),
            gestures: GestureRecognizer::new(GestureConfig::from(&config)),
            swipe: SwipePager::new(SwipeConfig::from(&config)),
            zones: BackdropZones::from(&config),
            cache: ImageCache::new(config.cache_max_entries),
            preload: PreloadQueue::new(),
            grid: BatchLoader::from_config(&config),
            directory: None,
            subdirectories: Vec::new(),
            sort: SortMode::default(),
            listing_generation: 0,
            grid_generation: 0,
            search_generation: 0,
            search_results: Vec::new(),
            image_requested_at: None,
            stats,
            clock: system_clock_ms,
            config,
        };
        session.stats.update_cache_usage(0, stats_capacity);
        session
    }

    /// Replace the millisecond wall clock used for cache-busting tokens.
    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }

    /// Effects to run once when the session starts (the periodic cache cleanup).
    pub fn start(&self) -> Vec<Effect> {
        vec![self.cleanup_timer()]
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn directory(&self) -> Option<&str> {
        self.directory.as_deref()
    }

    pub fn subdirectories(&self) -> &[Subdirectory] {
        &self.subdirectories
    }

    pub fn sort(&self) -> SortMode {
        self.sort
    }

    pub fn search_results(&self) -> &[SearchHit] {
        &self.search_results
    }

    pub fn gesture_phase(&self) -> GesturePhase {
        self.gestures.phase()
    }

    /// Strip offset of the touch pager, for rendering the swipe.
    pub fn swipe_translate(&self) -> f64 {
        self.swipe.translate()
    }

    pub fn stats(&self) -> Arc<StatsCollector> {
        Arc::clone(&self.stats)
    }

    pub fn cache(&self) -> &ImageCache<ImageHandle> {
        &self.cache
    }

    /// Cached decode of `key`, refreshing its recency.
    pub fn cached_image(&mut self, key: &ImageKey) -> Option<ImageHandle> {
        let hit = self.cache.get(key);
        self.stats.record_cache_lookup(hit.is_some());
        hit
    }

    pub fn thumbnail_url(&self, path: &str) -> String {
        self.resolver.thumbnail_url(path)
    }

    pub fn load_directory(&mut self, directory: impl Into<String>) -> Vec<Effect> {
        self.update(Command::LoadDirectory { directory: directory.into() })
    }

    pub fn open(&mut self, index: usize) -> Vec<Effect> {
        self.update(Command::Open(index))
    }

    pub fn close(&mut self) -> Vec<Effect> {
        self.update(Command::Close)
    }

    pub fn next(&mut self) -> Vec<Effect> {
        self.update(Command::Next)
    }

    pub fn previous(&mut self) -> Vec<Effect> {
        self.update(Command::Previous)
    }

    pub fn toggle_original(&mut self) -> Vec<Effect> {
        self.update(Command::ToggleOriginal)
    }

    pub fn set_rating(&mut self, rating: u8) -> Vec<Effect> {
        self.update(Command::SetRating(rating))
    }

    pub fn search(&mut self, query: impl Into<String>) -> Vec<Effect> {
        self.update(Command::Search(query.into()))
    }

    pub fn update(&mut self, command: Command) -> Vec<Effect> {
        match command {
            Command::LoadDirectory { directory } => self.request_listing(directory),
            Command::SetSort(mode) => self.resort(mode),
            Command::Open(index) => self.open_at(index),
            Command::OpenPath(path) => self.open_path(&path),
            Command::Close => {
                self.close_viewer();
                Vec::new()
            }
            Command::Next => self.step(NavAction::Next),
            Command::Previous => self.step(NavAction::Previous),
            Command::ToggleOriginal => {
                let now = (self.clock)();
                match self.navigation.toggle_original(&mut self.state, &mut self.resolver, now) {
                    Some(request) => self.request_photo(request),
                    None => Vec::new(),
                }
            }
            Command::Key(key) => self.on_key(key),
            Command::Pointer(input) => self.on_pointer(input),
            Command::Touch(input) => self.on_touch(input),
            Command::BackdropClick { x, container_width } => {
                self.on_backdrop_click(x, container_width)
            }
            Command::Layout(layout) => {
                self.state.set_layout(layout);
                Vec::new()
            }
            Command::SetRating(rating) => self.request_rating(rating),
            Command::Search(query) => self.request_search(&query),
            Command::Download => self.download(),
            Command::Completed { ticket, result } => self.on_completed(ticket, result),
            Command::TimerFired(timer) => self.on_timer(timer),
        }
    }

    fn request_listing(&mut self, directory: String) -> Vec<Effect> {
        self.listing_generation = self.listing_generation.wrapping_add(1);
        info!(target: "session", directory = %directory, "loading directory");
        let url = self.resolver.listing_url(&directory);
        self.directory = Some(directory);
        vec![Effect::get(Ticket::Listing { generation: self.listing_generation }, url)]
    }

    fn on_listing(&mut self, generation: u64, result: FetchResult) -> Vec<Effect> {
        if generation != self.listing_generation {
            self.discard_stale("listing");
            return Vec::new();
        }

        let directory = self.directory.clone().unwrap_or_default();
        let mut effects = Vec::new();
        let catalog = match result {
            Ok(body) => Catalog::ingest(directory, parse_listing(&body), self.sort),
            Err(err) => {
                warn!(target: "session", "photo listing failed: {err}");
                effects.push(Effect::toast(ToastKind::Error, format!("Failed to load photos: {err}")));
                Catalog { directory, ..Catalog::default() }
            }
        };
        if let Some(error) = &catalog.error {
            warn!(target: "session", "server rejected listing: {error}");
            effects.push(Effect::toast(ToastKind::Error, error.clone()));
        }

        info!(
            target: "session",
            directory = %catalog.directory,
            photos = catalog.photos.len(),
            subdirectories = catalog.subdirectories.len(),
            "directory loaded"
        );
        self.subdirectories = catalog.subdirectories;
        effects.extend(self.replace_photos(catalog.photos));
        effects
    }

    fn resort(&mut self, mode: SortMode) -> Vec<Effect> {
        self.sort = mode;
        let mut photos = self.state.photos().to_vec();
        sort_photos(&mut photos, mode);
        self.replace_photos(photos)
    }

    /// Install a new photo sequence. Closes the lightbox, orphans every pending viewer request
    /// and restarts grid loading.
    fn replace_photos(&mut self, photos: Vec<Photo>) -> Vec<Effect> {
        self.state.set_photos(photos);
        self.navigation.invalidate();
        self.resolver.reset();
        self.gestures.cancel();
        self.swipe.cancel();
        self.preload.clear();
        self.image_requested_at = None;
        self.stats.update_prefetch_pending(0);

        self.grid_generation = self.grid_generation.wrapping_add(1);
        self.grid.clear();
        self.grid.enqueue(0..self.state.len());
        self.issue_grid_batch()
    }

    fn issue_grid_batch(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        for index in self.grid.next_batch() {
            let Some(key) = self.thumbnail_key(index) else {
                self.settle_grid_item(&mut effects);
                continue;
            };
            if self.cache.has(&key) {
                effects.push(Effect::GridThumbnail { index, status: GridStatus::Ready });
                self.settle_grid_item(&mut effects);
                continue;
            }
            let ticket = Ticket::GridThumbnail { generation: self.grid_generation, index };
            effects.push(Effect::get(ticket, self.resolver.url(&key)));
        }
        effects
    }

    fn thumbnail_key(&self, index: usize) -> Option<ImageKey> {
        let photo = self.state.photos().get(index)?;
        Some(ImageKey::new(photo.path.clone(), Variant::Thumbnail))
    }

    fn settle_grid_item(&mut self, effects: &mut Vec<Effect>) {
        if self.grid.settle() {
            effects.push(Effect::Schedule {
                timer: Timer::NextGridBatch { generation: self.grid_generation },
                after_ms: self.grid.delay_ms(),
            });
        }
    }

    fn on_grid_thumbnail(&mut self, generation: u64, index: usize, result: FetchResult) -> Vec<Effect> {
        if generation != self.grid_generation {
            self.discard_stale("grid thumbnail");
            return Vec::new();
        }

        let mut effects = Vec::new();
        let image = self
            .thumbnail_key(index)
            .and_then(|key| self.decode_result(&key, result).map(|image| (key, image)));
        let status = match image {
            Some((key, image)) => {
                self.store(key, image);
                GridStatus::Ready
            }
            None => GridStatus::Failed,
        };
        effects.push(Effect::GridThumbnail { index, status });
        self.settle_grid_item(&mut effects);
        effects
    }

    fn open_at(&mut self, index: usize) -> Vec<Effect> {
        self.gestures.cancel();
        self.swipe.cancel();
        let now = (self.clock)();
        match self.navigation.open(&mut self.state, &mut self.resolver, index, now) {
            Some(request) => self.request_photo(request),
            None => {
                debug!(target: "session", index, len = self.state.len(), "ignoring open out of range");
                Vec::new()
            }
        }
    }

    fn open_path(&mut self, path: &str) -> Vec<Effect> {
        let needle = normalize_path(path);
        match self.state.photos().iter().position(|photo| photo.path == needle) {
            Some(index) => self.open_at(index),
            None => {
                debug!(target: "session", path = %needle, "photo not in the current listing");
                Vec::new()
            }
        }
    }

    fn close_viewer(&mut self) {
        self.navigation.close(&mut self.state, &mut self.resolver);
        self.gestures.cancel();
        self.swipe.cancel();
        self.image_requested_at = None;
    }

    fn step(&mut self, action: NavAction) -> Vec<Effect> {
        let now = (self.clock)();
        let request = match action {
            NavAction::Close => {
                self.close_viewer();
                return Vec::new();
            }
            NavAction::Next => self.navigation.next(&mut self.state, &mut self.resolver, now),
            NavAction::Previous => self.navigation.previous(&mut self.state, &mut self.resolver, now),
        };
        match request {
            Some(request) => {
                self.gestures.cancel();
                self.request_photo(request)
            }
            None => Vec::new(),
        }
    }

    fn go_to(&mut self, index: usize) -> Vec<Effect> {
        let now = (self.clock)();
        match self.navigation.go_to(&mut self.state, &mut self.resolver, index, now) {
            Some(request) => self.request_photo(request),
            None => Vec::new(),
        }
    }

    /// Issue the image and metadata requests of a navigation step. A cached preview is shown
    /// straight away instead of being fetched again.
    fn request_photo(&mut self, request: LoadRequest) -> Vec<Effect> {
        let LoadRequest { ticket, key, image_url, metadata_url } = request;
        let mut effects = Vec::new();

        let cached = if key.variant == Variant::Original { None } else { self.cached_image(&key) };
        match cached {
            Some(image) => {
                debug!(target: "session", key = %key, "showing cached image");
                self.image_requested_at = None;
                self.state.set_display(DisplaySlot::Ready { variant: key.variant, image });
            }
            None => {
                self.image_requested_at = Some(Instant::now());
                effects.push(Effect::get(Ticket::Image(ticket), image_url));
            }
        }

        if let Some(url) = metadata_url {
            effects.push(Effect::get(Ticket::Metadata(ticket), url));
        }

        if self.state.display().is_ready() {
            effects.extend(self.plan_preload());
        }
        effects
    }

    fn on_image(&mut self, ticket: LoadTicket, result: FetchResult) -> Vec<Effect> {
        if !self.navigation.is_image_current(&self.state, &ticket) {
            self.discard_stale("image");
            return Vec::new();
        }
        if let Some(requested_at) = self.image_requested_at.take() {
            self.stats.record_load(requested_at.elapsed());
        }

        let Some(photo) = self.state.photos().get(ticket.index) else {
            return Vec::new();
        };
        let key = ImageKey::new(photo.path.clone(), ticket.variant);
        let name = photo.name.clone();

        match self.decode_result(&key, result) {
            Some(image) => {
                if ticket.variant != Variant::Original {
                    self.store(key, Arc::clone(&image));
                }
                self.state.set_display(DisplaySlot::Ready { variant: ticket.variant, image });
                self.plan_preload()
            }
            None => {
                self.state.set_display(DisplaySlot::Failed {
                    variant: ticket.variant,
                    reason: format!("could not load {name}"),
                });
                vec![Effect::toast(ToastKind::Error, format!("Failed to load image {name}"))]
            }
        }
    }

    fn on_metadata(&mut self, ticket: LoadTicket, result: FetchResult) -> Vec<Effect> {
        if !self.navigation.is_metadata_current(&self.state, &ticket) {
            self.discard_stale("metadata");
            return Vec::new();
        }
        match result {
            Ok(body) => self.state.set_metadata(Some(parse_metadata(&body))),
            Err(err) => {
                warn!(target: "session", index = ticket.index, "metadata request failed: {err}");
                self.state.set_metadata(None);
            }
        }
        Vec::new()
    }

    fn plan_preload(&mut self) -> Vec<Effect> {
        let Some(center) = self.state.current_index() else {
            return Vec::new();
        };

        let cache = &self.cache;
        self.preload.plan_window(
            self.state.photos(),
            center,
            self.config.preload_count,
            self.navigation.direction(),
            |key| cache.has(key),
        );

        let effects: Vec<Effect> = self
            .preload
            .drain()
            .into_iter()
            .map(|(token, task)| Effect::get(Ticket::Prefetch(token), self.resolver.url(&task.key)))
            .collect();
        self.stats.update_prefetch_pending(self.preload.in_flight());
        if !effects.is_empty() {
            debug!(target: "session", center, count = effects.len(), "prefetching neighbours");
        }
        effects
    }

    fn on_prefetch(&mut self, token: RequestToken, result: FetchResult) -> Vec<Effect> {
        let Some(key) = self.preload.complete(&token) else {
            self.discard_stale("prefetch");
            return Vec::new();
        };
        if let Some(image) = self.decode_result(&key, result) {
            self.store(key, image);
        }
        self.stats.update_prefetch_pending(self.preload.in_flight());
        Vec::new()
    }

    fn decode_result(&self, key: &ImageKey, result: FetchResult) -> Option<ImageHandle> {
        let bytes = match result {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(target: "session", key = %key, "image request failed: {err}");
                self.stats.record_failed_load();
                return None;
            }
        };

        let started = Instant::now();
        match decode_image(key, &bytes) {
            Ok(image) => {
                self.stats.record_decode(started.elapsed());
                Some(Arc::new(image))
            }
            Err(err) => {
                warn!(target: "session", key = %key, "decode failed: {err:#}");
                self.stats.record_failed_load();
                None
            }
        }
    }

    fn store(&mut self, key: ImageKey, image: ImageHandle) {
        self.cache.add(key, image);
        self.stats.update_cache_usage(self.cache.len(), self.cache.max_entries());
    }

    fn on_key(&mut self, key: Key) -> Vec<Effect> {
        if !self.state.is_open() {
            return Vec::new();
        }
        self.step(key_action(key))
    }

    fn on_backdrop_click(&mut self, x: f64, container_width: f64) -> Vec<Effect> {
        if !self.state.is_open() || !self.gestures.accepts_click(&self.state) {
            return Vec::new();
        }
        match self.zones.action(x, container_width) {
            Some(action) => self.step(action),
            None => Vec::new(),
        }
    }

    fn on_pointer(&mut self, input: PointerInput) -> Vec<Effect> {
        if !self.state.is_open() {
            return Vec::new();
        }
        match input {
            PointerInput::Down { position } => {
                let intents = self.gestures.pointer_down(&self.state, position);
                self.apply_intents(intents)
            }
            PointerInput::Move { position } => {
                let intents = self.gestures.pointer_move(&self.state, position);
                self.apply_intents(intents)
            }
            PointerInput::Up { position, image_bounds } => {
                let intents = self.gestures.pointer_up(&self.state, position, image_bounds);
                self.apply_intents(intents)
            }
            PointerInput::Leave => {
                let intents = self.gestures.pointer_leave();
                self.apply_intents(intents)
            }
        }
    }

    fn on_touch(&mut self, input: TouchInput) -> Vec<Effect> {
        if !self.state.is_open() {
            return Vec::new();
        }
        match input {
            TouchInput::Start { touches, timestamp_ms, page_width } => match touches.as_slice() {
                [a, b, ..] => {
                    self.swipe.cancel();
                    let intents = self.gestures.pinch_start(&self.state, *a, *b);
                    self.apply_intents(intents)
                }
                [touch] if self.state.is_dragging_enabled() => {
                    let intents = self.gestures.pointer_down(&self.state, *touch);
                    self.apply_intents(intents)
                }
                [touch] => {
                    let index = self.state.current_index().unwrap_or(0);
                    self.swipe.begin(touch.x, timestamp_ms, index, self.state.len(), page_width);
                    Vec::new()
                }
                [] => Vec::new(),
            },
            TouchInput::Move { touches } => match touches.as_slice() {
                [a, b, ..] => {
                    let intents = self.gestures.pinch_move(*a, *b);
                    self.apply_intents(intents)
                }
                [touch] if self.swipe.is_active() => {
                    self.swipe.move_to(touch.x);
                    Vec::new()
                }
                [touch] => {
                    let intents = self.gestures.pointer_move(&self.state, *touch);
                    self.apply_intents(intents)
                }
                [] => Vec::new(),
            },
            TouchInput::End { timestamp_ms } => {
                if self.gestures.phase() == GesturePhase::Pinching {
                    let intents = self.gestures.pinch_end();
                    return self.apply_intents(intents);
                }
                if let Some(outcome) = self.swipe.release(timestamp_ms) {
                    if Some(outcome.target) != self.state.current_index() {
                        return self.go_to(outcome.target);
                    }
                    return Vec::new();
                }
                // No bounds: a lifted finger never counts as a centre tap.
                let intents = self.gestures.pointer_up(&self.state, Vec2::ZERO, None);
                self.apply_intents(intents)
            }
        }
    }

    /// Apply recognizer output in order. Taps never navigate; only [`Command::BackdropClick`]
    /// hit-tests the navigation zones.
    fn apply_intents(&mut self, intents: Vec<GestureIntent>) -> Vec<Effect> {
        let mut effects = Vec::new();
        for intent in intents {
            match intent {
                GestureIntent::BeginDrag => {
                    self.state.begin_drag();
                }
                GestureIntent::Pan(offset) => self.state.drag_to(offset),
                GestureIntent::EndDrag => self.state.end_drag(),
                GestureIntent::Tap(TapZone::Center) => {
                    self.state.toggle_zoom();
                    debug!(target: "session", scale = self.state.scale(), "centre tap");
                }
                GestureIntent::Tap(TapZone::Edge) | GestureIntent::Drag => {}
                GestureIntent::Pinch(scale) => self.state.pinch_zoom(scale),
                GestureIntent::ScheduleReset { seq, after_ms } => {
                    effects.push(Effect::Schedule { timer: Timer::GestureReset { seq }, after_ms });
                }
            }
        }
        effects
    }

    fn request_rating(&mut self, rating: u8) -> Vec<Effect> {
        let Some(photo) = self.state.current_photo() else {
            return Vec::new();
        };
        if rating > MAX_RATING {
            return vec![Effect::toast(
                ToastKind::Error,
                format!("Rating must be between 0 and {MAX_RATING}"),
            )];
        }

        let path = photo.path.clone();
        let body = RatingRequest { file_path: path.clone(), rating };
        match serde_json::to_vec(&body) {
            Ok(body) => vec![Effect::Fetch(FetchRequest {
                ticket: Ticket::Rating { path, rating },
                method: Method::PostJson(body),
                url: self.resolver.rating_url(),
            })],
            Err(err) => {
                warn!(target: "session", "encoding rating request failed: {err}");
                vec![Effect::toast(ToastKind::Error, "Failed to update rating")]
            }
        }
    }

    fn on_rating(&mut self, path: String, rating: u8, result: FetchResult) -> Vec<Effect> {
        let response = match result {
            Ok(body) => parse_rating(&body),
            Err(err) => {
                warn!(target: "session", path = %path, "rating request failed: {err}");
                return vec![Effect::toast(ToastKind::Error, format!("Failed to update rating: {err}"))];
            }
        };
        if !response.success {
            let message = response.error.unwrap_or_else(|| "Failed to update rating".to_string());
            return vec![Effect::toast(ToastKind::Error, message)];
        }

        if let Some(index) = self.state.photos().iter().position(|photo| photo.path == path) {
            let updated = self.state.photos()[index].with_rating(rating);
            self.state.replace_photo(index, updated);
            if self.state.current_index() == Some(index) {
                if let Some(mut metadata) = self.state.metadata().cloned() {
                    metadata.rating = rating.min(MAX_RATING);
                    self.state.set_metadata(Some(metadata));
                }
            }
        }
        debug!(target: "session", path = %path, rating, "rating saved");
        vec![Effect::toast(ToastKind::Success, format!("Rated {rating} stars"))]
    }

    fn request_search(&mut self, query: &str) -> Vec<Effect> {
        let query = query.trim();
        if query.is_empty() {
            return vec![Effect::toast(ToastKind::Info, "Please enter a search keyword")];
        }
        self.search_generation = self.search_generation.wrapping_add(1);
        let ticket = Ticket::Search { generation: self.search_generation };
        vec![Effect::get(ticket, self.resolver.search_url(query))]
    }

    fn on_search(&mut self, generation: u64, result: FetchResult) -> Vec<Effect> {
        if generation != self.search_generation {
            self.discard_stale("search");
            return Vec::new();
        }

        let mut effects = Vec::new();
        let hits = match result {
            Ok(body) => {
                let response = parse_search(&body);
                match response.error {
                    Some(error) => {
                        effects.push(Effect::toast(ToastKind::Error, error));
                        Vec::new()
                    }
                    None => response.results,
                }
            }
            Err(err) => {
                warn!(target: "session", "search failed: {err}");
                effects.push(Effect::toast(ToastKind::Error, "Search failed, please retry"));
                Vec::new()
            }
        };

        self.search_results = hits
            .into_iter()
            .map(|hit| SearchHit { path: normalize_path(&hit.path), name: hit.name })
            .filter(|hit| !hit.path.is_empty())
            .collect();
        effects.push(Effect::SearchResults(self.search_results.clone()));
        effects
    }

    fn download(&self) -> Vec<Effect> {
        match self.state.current_photo() {
            Some(photo) => vec![Effect::Download {
                url: self.resolver.download_url(&photo.path),
                file_name: photo.name.clone(),
            }],
            None => Vec::new(),
        }
    }

    fn on_completed(&mut self, ticket: Ticket, result: FetchResult) -> Vec<Effect> {
        match ticket {
            Ticket::Listing { generation } => self.on_listing(generation, result),
            Ticket::Image(load) => self.on_image(load, result),
            Ticket::Metadata(load) => self.on_metadata(load, result),
            Ticket::Prefetch(token) => self.on_prefetch(token, result),
            Ticket::GridThumbnail { generation, index } => {
                self.on_grid_thumbnail(generation, index, result)
            }
            Ticket::Rating { path, rating } => self.on_rating(path, rating, result),
            Ticket::Search { generation } => self.on_search(generation, result),
        }
    }

    fn on_timer(&mut self, timer: Timer) -> Vec<Effect> {
        match timer {
            Timer::GestureReset { seq } => {
                self.gestures.deferred_reset(seq);
                Vec::new()
            }
            Timer::NextGridBatch { generation } if generation == self.grid_generation => {
                self.issue_grid_batch()
            }
            Timer::NextGridBatch { .. } => Vec::new(),
            Timer::CacheCleanup => {
                let removed = self.cache.cleanup(self.config.cache_expiry());
                if removed > 0 {
                    debug!(target: "session", removed, remaining = self.cache.len(), "expired cached images");
                }
                self.stats.update_cache_usage(self.cache.len(), self.cache.max_entries());
                vec![self.cleanup_timer()]
            }
        }
    }

    fn cleanup_timer(&self) -> Effect {
        Effect::Schedule {
            timer: Timer::CacheCleanup,
            after_ms: self.config.cache_cleanup_interval_secs.saturating_mul(1_000),
        }
    }

    fn discard_stale(&self, what: &str) {
        self.stats.record_stale_completion();
        debug!(target: "session", what, "discarding stale completion");
    }
}
