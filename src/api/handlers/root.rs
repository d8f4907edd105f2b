use axum::response::Html;

const LANDING_PAGE: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>passvault</title>
  </head>
  <body>
    <h1>passvault</h1>
    <p>SRP-authenticated credential vault API.</p>
  </body>
</html>
"#;

// Undocumented landing page; the API surface lives under /v1.
pub async fn root() -> Html<&'static str> {
    Html(LANDING_PAGE)
}
