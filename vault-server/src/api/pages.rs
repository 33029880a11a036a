//! Page shells behind the auth gate
//!
//! The front end mounts into these; the server only decides who may see
//! which page (see `auth::gate`).

use axum::{Router, middleware, response::Html, routing::get};

use crate::auth::gate::page_gate;
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { shell("T-Shirt Vault", "landing") }))
        .route("/collection", get(|| async { shell("My Collection", "collection") }))
        .route("/profile", get(|| async { shell("Profile", "profile") }))
        .route("/login", get(|| async { shell("Log in", "login") }))
        .route("/signup", get(|| async { shell("Sign up", "signup") }))
        .route(
            "/setup-username",
            get(|| async { shell("Choose a username", "setup-username") }),
        )
        .route("/forums", get(|| async { coming_soon("Forums") }))
        .route("/marketplace", get(|| async { coming_soon("Marketplace") }))
        .route("/vault", get(|| async { coming_soon("Vault") }))
        .layer(middleware::from_fn_with_state(state, page_gate))
}

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title} | T-Shirt Vault</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    ))
}

fn shell(title: &str, view: &str) -> Html<String> {
    page(title, &format!("<div id=\"app\" data-view=\"{view}\"></div>"))
}

fn coming_soon(title: &str) -> Html<String> {
    page(
        title,
        &format!(
            "<main class=\"coming-soon\">\n<h1>{title}</h1>\n<p>Coming soon.</p>\n\
             <a href=\"/collection\">Back to my collection</a>\n</main>"
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coming_soon_names_the_section() {
        let Html(html) = coming_soon("Forums");
        assert!(html.contains("<h1>Forums</h1>"));
        assert!(html.contains("Coming soon."));
    }

    #[test]
    fn shell_carries_view_name() {
        let Html(html) = shell("Profile", "profile");
        assert!(html.contains("data-view=\"profile\""));
        assert!(html.contains("<title>Profile | T-Shirt Vault</title>"));
    }
}
