use std::sync::Arc;

use axum::{
    Router,
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{
    AppState, auth,
    auth::CurrentUser,
    models::{MovieCard, Notice, NoticeKind},
    templates,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/movie/{id}", get(movie_detail))
        .route("/favorites", get(favorites))
        .route("/favorites/toggle", post(toggle_favorite))
        .route("/favorites/remove", post(remove_favorite))
        .route("/session", post(create_session))
        .route("/signout", post(signout))
        .with_state(state)
}

/// Notice carried across a redirect, rendered as a toast on the next page.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    notice: Option<String>,
    kind: Option<String>,
}

pub async fn index(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(q): Query<PageQuery>,
) -> Html<String> {
    let sync_notice = state.favorites.activate(user.as_deref()).await;
    let movies = state.catalog.fetch_popular().await;

    let mut cards = Vec::with_capacity(movies.len());
    for movie in &movies {
        cards.push(MovieCard {
            id: movie.id,
            title: movie.title.clone(),
            poster_url: poster_url(&state, movie.poster_path.as_deref()),
            vote_average: movie.vote_average,
            favorited: state.favorites.is_favorited(movie.id).await,
        });
    }

    let notice = query_notice(&q).or(sync_notice);
    Html(templates::index_page(user.as_deref(), &cards, notice.as_ref()))
}

pub async fn movie_detail(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
    Query(q): Query<PageQuery>,
) -> Response {
    let sync_notice = state.favorites.activate(user.as_deref()).await;

    let Some(movie) = state.catalog.fetch_by_id(id).await else {
        return (StatusCode::NOT_FOUND, Html(templates::not_found_page(user.as_deref())))
            .into_response();
    };

    let favorited = state.favorites.is_favorited(movie.id).await;
    let poster = poster_url(&state, movie.poster_path.as_deref());
    let notice = query_notice(&q).or(sync_notice);

    Html(templates::movie_page(
        user.as_deref(),
        &movie,
        poster.as_deref(),
        favorited,
        notice.as_ref(),
    ))
    .into_response()
}

pub async fn favorites(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(q): Query<PageQuery>,
) -> Html<String> {
    let sync_notice = state.favorites.activate(user.as_deref()).await;
    let rows = state.favorites.snapshot().await;
    let loading = state.favorites.is_loading().await;

    let notice = query_notice(&q).or(sync_notice);
    Html(templates::favorites_page(user.as_deref(), &rows, loading, notice.as_ref()))
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    movie_id: i32,
    title: String,
    #[serde(default)]
    poster_url: Option<String>,
    #[serde(default)]
    back: Option<String>,
}

/// Flips the favorite state of a movie for the current identity: a compound
/// write-then-refresh against the store, reported back as a toast.
pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Form(req): Form<ToggleRequest>,
) -> Redirect {
    let back = safe_back(req.back.as_deref());
    state.favorites.activate(user.as_deref()).await;

    let notice = if state.favorites.is_favorited(req.movie_id).await {
        state.favorites.remove(user.as_deref(), req.movie_id).await
    } else {
        state
            .favorites
            .add(user.as_deref(), req.movie_id, &req.title, req.poster_url.as_deref().unwrap_or(""))
            .await
    };

    redirect_with_notice(back, notice)
}

#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    movie_id: i32,
    #[serde(default)]
    back: Option<String>,
}

pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Form(req): Form<RemoveRequest>,
) -> Redirect {
    let back = safe_back(req.back.as_deref());
    state.favorites.activate(user.as_deref()).await;

    let notice = state.favorites.remove(user.as_deref(), req.movie_id).await;
    redirect_with_notice(back, notice)
}

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    user_id: String,
}

/// Callback seam for the external identity provider: records the asserted
/// user id in the session cookie. No credential handling happens here.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(req): Form<SessionRequest>,
) -> Response {
    let user_id = req.user_id.trim().to_string();
    if user_id.is_empty() {
        return redirect_with_notice("/", Some(Notice::error("A user id is required to sign in")))
            .into_response();
    }

    state.favorites.activate(Some(&user_id)).await;
    (jar.add(auth::session_cookie(&user_id)), Redirect::to("/")).into_response()
}

pub async fn signout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    state.favorites.activate(None).await;
    (jar.remove(auth::clear_session_cookie()), Redirect::to("/")).into_response()
}

fn poster_url(state: &AppState, path: Option<&str>) -> Option<String> {
    path.filter(|p| !p.is_empty()).map(|p| state.catalog.image_url(p))
}

fn query_notice(q: &PageQuery) -> Option<Notice> {
    let kind = NoticeKind::from_code(q.kind.as_deref()?)?;
    Some(Notice { kind, message: q.notice.clone()? })
}

fn redirect_with_notice(back: &str, notice: Option<Notice>) -> Redirect {
    match notice {
        Some(notice) => {
            let sep = if back.contains('?') { '&' } else { '?' };
            Redirect::to(&format!(
                "{back}{sep}kind={}&notice={}",
                notice.kind.as_code(),
                urlencoding::encode(&notice.message)
            ))
        },
        None => Redirect::to(back),
    }
}

// Only same-site paths are allowed as redirect targets
fn safe_back(back: Option<&str>) -> &str {
    match back {
        Some(b) if b.starts_with('/') && !b.starts_with("//") => b,
        _ => "/",
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, header},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{catalog::CatalogClient, db, favorites::FavoritesStore};

    // Offline-mode app: empty API key, so the catalog serves fallback data.
    async fn test_app() -> Router {
        let db = db::connect_and_migrate("sqlite::memory:").await.unwrap();
        let catalog = CatalogClient::new(
            reqwest::Client::new(),
            "".to_string(),
            "http://127.0.0.1:1".to_string(),
            "https://image.test/w500".to_string(),
        );
        let state = Arc::new(AppState {
            catalog: Arc::new(catalog),
            favorites: Arc::new(FavoritesStore::new(db)),
        });
        router(state)
    }

    async fn body_text(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn form_post(uri: &str, user: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(user) = user {
            builder = builder.header(header::COOKIE, format!("reelmarks_user={user}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn page_get(uri: &str, user: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::COOKIE, format!("reelmarks_user={user}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn index_renders_the_fallback_catalog() {
        let app = test_app().await;

        let resp = app.oneshot(page_get("/", None)).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_text(resp).await;
        assert!(body.contains("The Shawshank Redemption"));
        assert!(body.contains("The Godfather"));
        assert!(body.contains("The Dark Knight"));
    }

    #[tokio::test]
    async fn toggle_adds_then_removes_a_favorite() {
        let app = test_app().await;
        let form = "movie_id=1&title=The%20Shawshank%20Redemption&poster_url=&back=%2F";

        let resp = app
            .clone()
            .oneshot(form_post("/favorites/toggle", Some("alice"), form))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let location = resp.headers()[header::LOCATION].to_str().unwrap().to_string();
        assert!(location.starts_with("/?kind=ok"), "unexpected redirect: {location}");

        let resp = app.clone().oneshot(page_get("/favorites", Some("alice"))).await.unwrap();
        assert!(body_text(resp).await.contains("The Shawshank Redemption"));

        // Second toggle flips it back off
        let resp = app
            .clone()
            .oneshot(form_post("/favorites/toggle", Some("alice"), form))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);

        let resp = app.oneshot(page_get("/favorites", Some("alice"))).await.unwrap();
        let body = body_text(resp).await;
        assert!(body.contains("You haven't added any movies to your favorites yet."));
    }

    #[tokio::test]
    async fn unauthenticated_toggle_changes_nothing() {
        let app = test_app().await;

        let resp = app
            .clone()
            .oneshot(form_post(
                "/favorites/toggle",
                None,
                "movie_id=1&title=The%20Shawshank%20Redemption",
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[header::LOCATION], "/");

        let resp = app.oneshot(page_get("/favorites", Some("alice"))).await.unwrap();
        let body = body_text(resp).await;
        assert!(body.contains("You haven't added any movies to your favorites yet."));
    }

    #[tokio::test]
    async fn remove_from_favorites_list_view() {
        let app = test_app().await;

        app.clone()
            .oneshot(form_post(
                "/favorites/toggle",
                Some("alice"),
                "movie_id=2&title=The%20Godfather",
            ))
            .await
            .unwrap();

        let resp = app
            .clone()
            .oneshot(form_post(
                "/favorites/remove",
                Some("alice"),
                "movie_id=2&back=%2Ffavorites",
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let location = resp.headers()[header::LOCATION].to_str().unwrap().to_string();
        assert!(location.starts_with("/favorites?kind=ok"), "unexpected redirect: {location}");

        let resp = app.oneshot(page_get("/favorites", Some("alice"))).await.unwrap();
        let body = body_text(resp).await;
        assert!(!body.contains("The Godfather"));
    }

    #[tokio::test]
    async fn unknown_movie_renders_not_found() {
        let app = test_app().await;

        let resp = app.oneshot(page_get("/movie/999", None)).await.unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(body_text(resp).await.contains("Movie not found"));
    }

    #[tokio::test]
    async fn session_roundtrip_sets_and_clears_the_cookie() {
        let app = test_app().await;

        let resp =
            app.clone().oneshot(form_post("/session", None, "user_id=alice")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let set_cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.contains("reelmarks_user=alice"));

        let resp = app.oneshot(form_post("/signout", Some("alice"), "")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let set_cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.contains("reelmarks_user="));
    }

    #[tokio::test]
    async fn blank_session_user_is_rejected_with_a_notice() {
        let app = test_app().await;

        let resp = app.oneshot(form_post("/session", None, "user_id=++")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let location = resp.headers()[header::LOCATION].to_str().unwrap().to_string();
        assert!(location.contains("kind=err"), "unexpected redirect: {location}");
    }
}
