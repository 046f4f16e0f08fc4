use maud::{DOCTYPE, Markup, html};

use crate::{
    entities::favorite,
    models::{Movie, MovieCard, Notice, NoticeKind},
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

pub fn index_page(user: Option<&str>, cards: &[MovieCard], notice: Option<&Notice>) -> String {
    page(
        "Reelmarks",
        user,
        notice,
        html! {
            div class="max-w-6xl mx-auto px-6 py-10" {
                h1 class="text-3xl font-bold text-gray-900" { "Popular movies" }
                p class="mt-2 text-gray-600" { "Browse the catalog and mark the ones worth keeping." }

                div class="mt-8 grid gap-6 sm:grid-cols-2 md:grid-cols-3 lg:grid-cols-4" {
                    @for card in cards {
                        (movie_card(card, user.is_some()))
                    }
                }
            }
        },
    )
}

pub fn movie_page(
    user: Option<&str>,
    movie: &Movie,
    poster_url: Option<&str>,
    favorited: bool,
    notice: Option<&Notice>,
) -> String {
    page(
        &movie.title,
        user,
        notice,
        html! {
            div class="max-w-5xl mx-auto px-6 py-10" {
                a class="text-sm text-blue-600 hover:text-blue-800" href="/" { "← Back to Movies" }

                div class="mt-6 grid gap-8 md:grid-cols-3" {
                    div class="md:col-span-1" {
                        div class="aspect-[2/3] overflow-hidden rounded-lg bg-gray-200 shadow" {
                            (poster(poster_url, &movie.title))
                        }
                    }

                    div class="md:col-span-2" {
                        div class="flex items-start justify-between gap-4" {
                            div {
                                h1 class="text-4xl font-bold text-gray-900" { (movie.title) }
                                div class="mt-2 flex items-center gap-4 text-gray-500" {
                                    span { "⭐ " (format!("{:.1}", movie.vote_average)) "/10" }
                                    @if let Some(year) = movie.release_date.get(..4) {
                                        span { (year) }
                                    }
                                }
                            }
                            @if user.is_some() {
                                form method="post" action="/favorites/toggle" {
                                    input type="hidden" name="movie_id" value=(movie.id);
                                    input type="hidden" name="title" value=(movie.title);
                                    @if let Some(url) = poster_url {
                                        input type="hidden" name="poster_url" value=(url);
                                    }
                                    input type="hidden" name="back" value=(format!("/movie/{}", movie.id));
                                    button type="submit" class="rounded-md border border-gray-300 px-4 py-2 font-medium text-gray-700 hover:border-red-400 hover:text-red-600" {
                                        @if favorited { "♥ Remove from Favorites" } @else { "♡ Add to Favorites" }
                                    }
                                }
                            }
                        }

                        div class="mt-8" {
                            h2 class="text-2xl font-semibold text-gray-900" { "Overview" }
                            p class="mt-3 text-lg leading-relaxed text-gray-600" { (movie.overview) }
                        }

                        @if !movie.release_date.is_empty() {
                            div class="mt-8" {
                                h3 class="text-xl font-semibold text-gray-900" { "Release date" }
                                p class="mt-2 text-gray-600" { (movie.release_date) }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn favorites_page(
    user: Option<&str>,
    rows: &[favorite::Model],
    loading: bool,
    notice: Option<&Notice>,
) -> String {
    page(
        "My Favorites",
        user,
        notice,
        html! {
            div class="max-w-6xl mx-auto px-6 py-10" {
                h1 class="text-3xl font-bold text-gray-900" { "My favorite movies" }

                @if user.is_none() {
                    div class="mt-10 bg-white shadow rounded-lg p-8 text-center" {
                        p class="text-gray-600" { "Sign in to keep a list of favorites." }
                    }
                } @else if loading {
                    div class="mt-10 flex justify-center py-12" {
                        div class="h-12 w-12 animate-spin rounded-full border-4 border-blue-200 border-t-blue-600" {}
                    }
                } @else if rows.is_empty() {
                    div class="mt-10 bg-white shadow rounded-lg p-8 text-center" {
                        p class="text-xl text-gray-600" { "You haven't added any movies to your favorites yet." }
                        a class="mt-4 inline-block rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" href="/" { "Discover Movies" }
                    }
                } @else {
                    div class="mt-8 grid gap-6 sm:grid-cols-2 md:grid-cols-3 lg:grid-cols-4 xl:grid-cols-5" {
                        @for row in rows {
                            (favorite_card(row))
                        }
                    }
                }
            }
        },
    )
}

pub fn not_found_page(user: Option<&str>) -> String {
    page(
        "Movie not found",
        user,
        None,
        html! {
            div class="max-w-2xl mx-auto px-6 py-16 text-center" {
                h1 class="text-2xl font-bold text-gray-900" { "Movie not found" }
                p class="mt-4 text-gray-600" { "The catalog has nothing for that title right now." }
                a class="mt-6 inline-block rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" href="/" { "Back to Movies" }
            }
        },
    )
}

pub fn error_page(message: String) -> String {
    page(
        "Error",
        None,
        None,
        html! {
            div class="max-w-xl mx-auto px-6 py-16" {
                div class="bg-white shadow rounded-lg p-8" {
                    h1 class="text-2xl font-bold text-gray-900" { "Error" }
                    p class="mt-4 text-gray-700" { (message) }
                    a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
                }
            }
        },
    )
}

fn page(title: &str, user: Option<&str>, notice: Option<&Notice>, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body class="min-h-screen bg-gray-50" {
                (navbar(user))
                @if let Some(notice) = notice {
                    (toast(notice))
                }
                (body)
            }
        }
    }
    .into_string()
}

fn navbar(user: Option<&str>) -> Markup {
    html! {
        nav class="border-b bg-white" {
            div class="max-w-6xl mx-auto flex items-center justify-between px-6 py-3" {
                a class="text-xl font-bold text-gray-900" href="/" { "Reelmarks" }
                div class="flex items-center gap-4" {
                    a class="text-sm font-medium text-gray-700 hover:text-gray-900" href="/" { "Home" }
                    @if let Some(user) = user {
                        a class="text-sm font-medium text-gray-700 hover:text-gray-900" href="/favorites" { "♥ My Favorites" }
                        span class="text-sm text-gray-500" { (user) }
                        form method="post" action="/signout" {
                            button type="submit" class="text-sm font-medium text-gray-700 hover:text-gray-900" { "Sign Out" }
                        }
                    } @else {
                        form class="flex items-center gap-2" method="post" action="/session" {
                            input class="w-36 rounded-md border border-gray-300 px-2 py-1 text-sm" name="user_id" placeholder="user id" required;
                            button type="submit" class="rounded-md bg-blue-600 px-3 py-1 text-sm font-semibold text-white hover:bg-blue-700" { "Sign In" }
                        }
                    }
                }
            }
        }
    }
}

fn toast(notice: &Notice) -> Markup {
    let style = match notice.kind {
        NoticeKind::Success => "border-green-300 bg-green-50 text-green-800",
        NoticeKind::Error => "border-red-300 bg-red-50 text-red-800",
    };

    html! {
        div class="max-w-6xl mx-auto px-6 pt-4" {
            div class=(format!("rounded-md border px-4 py-2 text-sm {style}")) { (notice.message) }
        }
    }
}

fn movie_card(card: &MovieCard, signed_in: bool) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg overflow-hidden" {
            div class="relative aspect-[2/3] bg-gray-200" {
                (poster(card.poster_url.as_deref(), &card.title))
                @if signed_in {
                    form method="post" action="/favorites/toggle" class="absolute top-2 right-2" {
                        input type="hidden" name="movie_id" value=(card.id);
                        input type="hidden" name="title" value=(card.title);
                        @if let Some(url) = &card.poster_url {
                            input type="hidden" name="poster_url" value=(url);
                        }
                        input type="hidden" name="back" value="/";
                        button type="submit" class=(heart_class(card.favorited)) {
                            @if card.favorited { "♥" } @else { "♡" }
                        }
                    }
                }
            }
            div class="p-4" {
                h3 class="font-semibold text-lg text-gray-900 truncate" { (card.title) }
                div class="mt-2 flex items-center justify-between" {
                    span class="text-sm text-gray-500" { "⭐ " (format!("{:.1}", card.vote_average)) }
                    a class="text-sm font-medium text-blue-600 hover:text-blue-800" href=(format!("/movie/{}", card.id)) { "View details" }
                }
            }
        }
    }
}

fn favorite_card(row: &favorite::Model) -> Markup {
    let poster_url = (!row.movie_poster_url.is_empty()).then_some(row.movie_poster_url.as_str());

    html! {
        div class="bg-white shadow rounded-lg overflow-hidden" {
            div class="relative aspect-[2/3] bg-gray-200" {
                (poster(poster_url, &row.movie_title))
                form method="post" action="/favorites/remove" class="absolute top-2 right-2" {
                    input type="hidden" name="movie_id" value=(row.movie_id);
                    input type="hidden" name="back" value="/favorites";
                    button type="submit" class="rounded-md bg-red-600 px-2 py-1 text-sm font-medium text-white hover:bg-red-700" { "Remove" }
                }
            }
            div class="p-4" {
                h3 class="font-semibold text-lg text-gray-900 truncate" { (row.movie_title) }
                div class="mt-2 flex items-center justify-between" {
                    span class="text-xs text-gray-400" { "Added " (added_on(row.created_at)) }
                    a class="text-sm font-medium text-blue-600 hover:text-blue-800" href=(format!("/movie/{}", row.movie_id)) { "View details" }
                }
            }
        }
    }
}

fn poster(url: Option<&str>, title: &str) -> Markup {
    html! {
        @if let Some(url) = url {
            img class="h-full w-full object-cover" src=(url) alt=(title);
        } @else {
            div class="flex h-full w-full items-center justify-center text-gray-400" { "No poster" }
        }
    }
}

fn heart_class(favorited: bool) -> &'static str {
    if favorited {
        "rounded-full bg-white/90 px-2 py-1 text-lg text-red-600 shadow"
    } else {
        "rounded-full bg-white/90 px-2 py-1 text-lg text-gray-600 shadow hover:text-red-600"
    }
}

fn added_on(created_at: i64) -> String {
    jiff::Timestamp::from_microsecond(created_at)
        .map(|t| t.strftime("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
