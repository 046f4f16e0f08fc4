use serde::{Deserialize, Serialize};

/// A movie as the catalog reports it. Read-only on our side; the catalog
/// stays authoritative for every field.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub release_date: String,
    // The single-movie endpoint omits this field, so it must default.
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}

#[derive(Debug, Deserialize)]
pub struct MovieListResponse {
    pub results: Vec<Movie>,
}

/// Row the popular grid renders: catalog data joined with the local
/// favorited predicate and a resolved poster URL.
#[derive(Clone, Debug)]
pub struct MovieCard {
    pub id: i32,
    pub title: String,
    pub poster_url: Option<String>,
    pub vote_average: f64,
    pub favorited: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NoticeKind {
    Success,
    Error,
}

impl NoticeKind {
    pub fn as_code(self) -> &'static str {
        match self {
            NoticeKind::Success => "ok",
            NoticeKind::Error => "err",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ok" => Some(NoticeKind::Success),
            "err" => Some(NoticeKind::Error),
            _ => None,
        }
    }
}

/// Transient user-facing message describing the outcome of the most recent
/// action. Carried across one redirect, then gone.
#[derive(Clone, Debug)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, message: message.into() }
    }
}
