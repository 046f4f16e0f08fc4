use tracing::warn;

use crate::{
    error::AppResult,
    models::{Movie, MovieListResponse},
};

/// Client for the remote movie catalog. Read failures never reach callers:
/// the popular listing degrades to [`fallback_movies`] and single lookups
/// degrade to `None`, so the UI always has something to render.
pub struct CatalogClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    image_base_url: String,
}

impl CatalogClient {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        base_url: String,
        image_base_url: String,
    ) -> Self {
        // Warn once on app load if running against the sample catalog
        if api_key.trim().is_empty() {
            warn!("Using sample catalog data - no TMDB_API_KEY provided");
        }

        Self { client, api_key, base_url, image_base_url }
    }

    pub async fn fetch_popular(&self) -> Vec<Movie> {
        // Serve sample data if no API key is configured
        if self.api_key.trim().is_empty() {
            return fallback_movies();
        }

        match self.try_fetch_popular().await {
            Ok(movies) => movies,
            Err(err) => {
                warn!(error = %err, "failed to fetch popular movies, serving fallback catalog");
                fallback_movies()
            },
        }
    }

    async fn try_fetch_popular(&self) -> AppResult<Vec<Movie>> {
        let url = format!("{}/movie/popular", self.base_url.trim_end_matches('/'));

        let resp: MovieListResponse = self
            .client
            .get(url)
            .query(&[("api_key", &self.api_key)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp.results)
    }

    pub async fn fetch_by_id(&self, id: i32) -> Option<Movie> {
        if self.api_key.trim().is_empty() {
            return fallback_movies().into_iter().find(|m| m.id == id);
        }

        match self.try_fetch_by_id(id).await {
            Ok(movie) => Some(movie),
            Err(err) => {
                warn!(movie_id = id, error = %err, "failed to fetch movie");
                None
            },
        }
    }

    async fn try_fetch_by_id(&self, id: i32) -> AppResult<Movie> {
        let url = format!("{}/movie/{}", self.base_url.trim_end_matches('/'), id);

        let movie: Movie = self
            .client
            .get(url)
            .query(&[("api_key", &self.api_key)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(movie)
    }

    /// Maps a catalog-relative image path onto the image host. Pure string
    /// templating; an empty path yields the bare base URL, which callers
    /// treat as "no image" and substitute a placeholder.
    pub fn image_url(&self, path: &str) -> String {
        format!("{}{}", self.image_base_url, path)
    }
}

/// Sample catalog served whenever the real one cannot be reached.
pub fn fallback_movies() -> Vec<Movie> {
    vec![
        Movie {
            id: 1,
            title: "The Shawshank Redemption".to_string(),
            overview: "Two imprisoned men bond over a number of years, finding solace and \
                       eventual redemption through acts of common decency."
                .to_string(),
            poster_path: Some("/q6y0Go1tsGEsmtFryDOJo3dEmqu.jpg".to_string()),
            backdrop_path: Some("/iNh3BivHyg5sQRPP1KOkzguEX0H.jpg".to_string()),
            vote_average: 9.3,
            release_date: "1994-09-23".to_string(),
            genre_ids: vec![18, 80],
        },
        Movie {
            id: 2,
            title: "The Godfather".to_string(),
            overview: "The aging patriarch of an organized crime dynasty transfers control of \
                       his clandestine empire to his reluctant son."
                .to_string(),
            poster_path: Some("/3bhkrj58Vtu7enYsRolD1fZdja1.jpg".to_string()),
            backdrop_path: Some("/tmU7GeKVybMWFButWEGl2M4GeiP.jpg".to_string()),
            vote_average: 9.2,
            release_date: "1972-03-14".to_string(),
            genre_ids: vec![18, 80],
        },
        Movie {
            id: 3,
            title: "The Dark Knight".to_string(),
            overview: "When the menace known as the Joker wreaks havoc and chaos on the people \
                       of Gotham, Batman must accept one of the greatest psychological and \
                       physical tests."
                .to_string(),
            poster_path: Some("/qJ2tW6WMUDux911r6m7haRef0WH.jpg".to_string()),
            backdrop_path: Some("/hkufdvl1g9YTfF1VzCOJe1THKj.jpg".to_string()),
            vote_average: 9.0,
            release_date: "2008-07-16".to_string(),
            genre_ids: vec![28, 80, 18],
        },
    ]
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router, http::StatusCode, routing::get};

    use super::*;

    fn catalog_for(base_url: &str, api_key: &str) -> CatalogClient {
        CatalogClient::new(
            reqwest::Client::new(),
            api_key.to_string(),
            base_url.to_string(),
            "https://image.test/w500".to_string(),
        )
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn unreachable_base() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn fetch_popular_parses_catalog_response() {
        let body = serde_json::json!({
            "results": [
                {
                    "id": 603,
                    "title": "The Matrix",
                    "overview": "A computer hacker learns the truth.",
                    "poster_path": "/matrix.jpg",
                    "backdrop_path": null,
                    "vote_average": 8.2,
                    "release_date": "1999-03-30",
                    "genre_ids": [28, 878]
                }
            ],
            "total_pages": 1,
            "total_results": 1
        });
        let app = Router::new().route("/movie/popular", get(move || async move { Json(body) }));
        let base = serve(app).await;

        let movies = catalog_for(&base, "test-key").fetch_popular().await;

        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].id, 603);
        assert_eq!(movies[0].title, "The Matrix");
        assert_eq!(movies[0].backdrop_path, None);
        assert_eq!(movies[0].genre_ids, vec![28, 878]);
    }

    #[tokio::test]
    async fn fetch_popular_falls_back_when_unreachable() {
        let base = unreachable_base().await;

        let movies = catalog_for(&base, "test-key").fetch_popular().await;

        assert!(movies.len() >= 3);
        assert!(movies.iter().any(|m| m.title == "The Shawshank Redemption"));
    }

    #[tokio::test]
    async fn fetch_popular_falls_back_on_server_error() {
        let app = Router::new()
            .route("/movie/popular", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
        let base = serve(app).await;

        let movies = catalog_for(&base, "test-key").fetch_popular().await;

        assert!(movies.len() >= 3);
    }

    #[tokio::test]
    async fn fetch_popular_skips_network_without_api_key() {
        let base = unreachable_base().await;

        let movies = catalog_for(&base, "").fetch_popular().await;

        assert_eq!(movies.len(), 3);
    }

    #[tokio::test]
    async fn fetch_by_id_parses_detail_without_genre_ids() {
        // The detail endpoint reports full genre objects, not genre_ids.
        let body = serde_json::json!({
            "id": 278,
            "title": "The Shawshank Redemption",
            "overview": "Framed in the 1940s.",
            "poster_path": "/shawshank.jpg",
            "backdrop_path": "/shawshank-backdrop.jpg",
            "vote_average": 8.7,
            "release_date": "1994-09-23"
        });
        let app = Router::new().route("/movie/{id}", get(move || async move { Json(body) }));
        let base = serve(app).await;

        let movie = catalog_for(&base, "test-key").fetch_by_id(278).await.unwrap();

        assert_eq!(movie.id, 278);
        assert!(movie.genre_ids.is_empty());
    }

    #[tokio::test]
    async fn fetch_by_id_absent_on_not_found() {
        let app = Router::new().route("/movie/{id}", get(|| async { StatusCode::NOT_FOUND }));
        let base = serve(app).await;

        assert!(catalog_for(&base, "test-key").fetch_by_id(999).await.is_none());
    }

    #[tokio::test]
    async fn fetch_by_id_absent_when_unreachable() {
        let base = unreachable_base().await;

        assert!(catalog_for(&base, "test-key").fetch_by_id(1).await.is_none());
    }

    #[tokio::test]
    async fn fetch_by_id_resolves_fallback_without_api_key() {
        let base = unreachable_base().await;
        let catalog = catalog_for(&base, "");

        let movie = catalog.fetch_by_id(1).await.unwrap();
        assert_eq!(movie.title, "The Shawshank Redemption");
        assert!(catalog.fetch_by_id(42).await.is_none());
    }

    #[test]
    fn image_url_joins_path() {
        let catalog = catalog_for("http://unused", "k");
        assert_eq!(catalog.image_url("/poster.jpg"), "https://image.test/w500/poster.jpg");
    }

    #[test]
    fn image_url_empty_path_yields_base() {
        let catalog = catalog_for("http://unused", "k");
        assert_eq!(catalog.image_url(""), "https://image.test/w500");
    }
}
