//! Home page
//!
//! Explains how to build a playlist URL and lists the accepted parameter values.

use axum::response::Html;

use crate::sources::Service;
use crate::web::AppState;

pub fn home_page(state: &AppState) -> Html<String> {
    let services: String = Service::known()
        .iter()
        .map(|service| format!("          <li><code>{service}</code></li>\n"))
        .collect();

    let regions: String = state
        .config
        .regions
        .default
        .iter()
        .map(|(code, name)| format!("          <li><code>{code}</code> ({name})</li>\n"))
        .collect();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>M3U Lineup</title>
    <style>
      body {{ font-family: sans-serif; margin: 0 auto; max-width: 800px; padding: 20px; color: #333; }}
      pre {{ background: #eaeaea; padding: 10px; border-radius: 5px; overflow: auto; }}
      code {{ color: #c0392b; }}
    </style>
  </head>
  <body>
    <h1>M3U Lineup</h1>
    <h2>Playlist URL</h2>
    <pre><code>/?service=SERVICE&amp;region=REGION</code></pre>
    <p>Optional parameters: <code>sort</code> (<code>name</code> or <code>chno</code>),
      <code>start_chno</code>, <code>include</code> and <code>exclude</code>
      (comma-separated <code>service-channel</code> identifiers).</p>
    <h2>Services</h2>
    <ul>
{services}    </ul>
    <h2>Regions</h2>
    <ul>
          <li><code>all</code> (every region)</li>
{regions}    </ul>
    <p>Guide URLs are embedded in each playlist header.</p>
  </body>
</html>
"#
    ))
}
