//! Inputs to and outputs of [`Session::update`](super::Session::update).

use serde::Serialize;

use crate::api::{FetchResult, SearchHit};
use crate::catalog::SortMode;
use crate::types::{Rect, RequestToken, Vec2};
use crate::viewer::{Key, LoadTicket, ViewportLayout};

/// Identity of an issued request, handed back with its completion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Ticket {
    Listing { generation: u64 },
    Image(LoadTicket),
    Metadata(LoadTicket),
    Prefetch(RequestToken),
    GridThumbnail { generation: u64, index: usize },
    Rating { path: String, rating: u8 },
    Search { generation: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    PostJson(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: Ticket,
    pub method: Method,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Timer {
    /// Deferred click-candidate reset after a drag or pinch release.
    GestureReset { seq: u64 },
    NextGridBatch { generation: u64 },
    CacheCleanup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GridStatus {
    Ready,
    Failed,
}

/// Work for the embedder to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Fetch(FetchRequest),
    Schedule { timer: Timer, after_ms: u64 },
    Toast { kind: ToastKind, message: String },
    /// A grid cell finished loading; the thumbnail is in the cache when `Ready`.
    GridThumbnail { index: usize, status: GridStatus },
    SearchResults(Vec<SearchHit>),
    Download { url: String, file_name: String },
}

impl Effect {
    pub(crate) fn toast(kind: ToastKind, message: impl Into<String>) -> Self {
        Effect::Toast { kind, message: message.into() }
    }

    pub(crate) fn get(ticket: Ticket, url: String) -> Self {
        Effect::Fetch(FetchRequest { ticket, method: Method::Get, url })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Down { position: Vec2 },
    Move { position: Vec2 },
    /// `image_bounds` is the on-screen box of the image when released over it.
    Up { position: Vec2, image_bounds: Option<Rect> },
    Leave,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TouchInput {
    Start { touches: Vec<Vec2>, timestamp_ms: u64, page_width: f64 },
    Move { touches: Vec<Vec2> },
    End { timestamp_ms: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadDirectory { directory: String },
    SetSort(SortMode),
    Open(usize),
    OpenPath(String),
    Close,
    Next,
    Previous,
    ToggleOriginal,
    Key(Key),
    Pointer(PointerInput),
    Touch(TouchInput),
    /// Click on the lightbox backdrop, outside the image.
    BackdropClick { x: f64, container_width: f64 },
    Layout(Option<ViewportLayout>),
    SetRating(u8),
    Search(String),
    Download,
    Completed { ticket: Ticket, result: FetchResult },
    TimerFired(Timer),
}

