//! End-to-end playlist requests against a mocked upstream

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use flate2::{Compression, write::GzEncoder};
use serde_json::{Value, json};
use std::io::Write;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use m3u_lineup::config::Config;
use m3u_lineup::web::{AppState, router};

fn mock_config(server: &MockServer) -> Config {
    let uri = server.uri();
    let mut config = Config::default();
    config.upstream.catalog_base_url = uri.clone();
    config.upstream.guide_base_url = format!("{uri}/guide");
    config.upstream.stream_base_url = format!("{uri}/stream");
    config.upstream.max_redirects = 2;
    config.services.plex.genre_feed_url = format!("{uri}/plex/genres.json");
    config.services.tubi.playlist_url = format!("{uri}/tubi/playlist.m3u");
    config.services.tubi.guide_url = format!("{uri}/tubi/epg.xml");
    config.services.pluto.boot_url = format!("{uri}/pluto/boot");
    config.services.pluto.stitcher_base_url = format!("{uri}/stitcher");
    config
}

fn app(config: Config) -> Router {
    router(AppState::from_config(config).unwrap())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&body).into_owned())
}

async fn mount_json(server: &MockServer, at: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn flat_catalog() -> Value {
    json!({
        "channels": {
            "weather": {"name": "Weather Now", "logo": "https://l/w.png", "url": "https://s/weather.m3u8", "group": "News", "chno": 7},
            "cooking": {"name": "Cooking", "url": "https://s/cooking.m3u8", "group": "Food"},
            "broken": {"name": "No Stream"}
        }
    })
}

fn regional_catalog() -> Value {
    json!({
        "regions": {
            "us": {"name": "USA", "channels": {
                "x": {"name": "X", "url": "https://s/x-us.m3u8", "group": "News"}
            }},
            "ca": {"channels": {
                "x": {"name": "X", "url": "https://s/x-ca.m3u8", "group": "News"},
                "y": {"name": "Y", "url": "https://s/y-ca.m3u8", "group": "Sports"}
            }}
        }
    })
}

#[tokio::test]
async fn test_flat_catalog_playlist() {
    let server = MockServer::start().await;
    mount_json(&server, "/Stirr/.app.json", flat_catalog()).await;
    let app = app(mock_config(&server));

    let (status, body) = get(&app, "/?service=Stirr").await;
    assert_eq!(status, StatusCode::OK);

    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(
        lines[0],
        format!("#EXTM3U url-tvg=\"{}/guide/Stirr/us.xml.gz\"", server.uri())
    );
    assert_eq!(
        lines[1],
        "#EXTINF:-1 channel-id=\"stirr-cooking\" tvg-name=\"Cooking\" tvg-id=\"cooking\" tvg-logo=\"\" group-title=\"Food\",Cooking"
    );
    assert_eq!(lines[2], "https://s/cooking.m3u8");
    assert_eq!(
        lines[3],
        "#EXTINF:-1 channel-id=\"stirr-weather\" tvg-name=\"Weather Now\" tvg-id=\"weather\" tvg-logo=\"https://l/w.png\" group-title=\"News\" tvg-chno=\"7\",Weather Now"
    );
    assert_eq!(lines.len(), 5);
    assert!(!body.contains("No Stream"));
}

#[tokio::test]
async fn test_sorting_numbering_and_filters() {
    let server = MockServer::start().await;
    mount_json(&server, "/Stirr/.app.json", flat_catalog()).await;
    let app = app(mock_config(&server));

    let (status, body) = get(&app, "/playlist.m3u8?service=stirr&sort=chno&start_chno=100").await;
    assert_eq!(status, StatusCode::OK);
    let infos: Vec<&str> = body.lines().filter(|l| l.starts_with("#EXTINF")).collect();
    // Missing numbers sort as 0
    assert!(infos[0].contains("tvg-chno=\"100\",Cooking"));
    assert!(infos[1].contains("tvg-chno=\"101\",Weather Now"));

    let (_, body) = get(&app, "/playlist.m3u8?service=stirr&exclude=stirr-cooking").await;
    assert!(!body.contains("Cooking"));
    assert!(body.contains("Weather Now"));

    let (_, body) = get(&app, "/playlist.m3u8?service=stirr&include=stirr-cooking").await;
    assert!(body.contains("Cooking"));
    assert!(!body.contains("Weather Now"));

    // Identifiers may carry the service name as typed on the home page
    let (_, body) = get(&app, "/playlist.m3u8?service=Stirr&include=Stirr-cooking").await;
    assert!(body.contains("channel-id=\"stirr-cooking\""));
    assert!(!body.contains("Weather Now"));
}

#[tokio::test]
async fn test_all_regions_are_suffixed_and_grouped_by_region() {
    let server = MockServer::start().await;
    mount_json(&server, "/SamsungTVPlus/.app.json", regional_catalog()).await;
    let app = app(mock_config(&server));

    let (status, body) = get(&app, "/?service=SamsungTVPlus&region=all").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with(&format!(
        "#EXTM3U url-tvg=\"{}/guide/SamsungTVPlus/all.xml.gz\"",
        server.uri()
    )));

    let infos: Vec<&str> = body.lines().filter(|l| l.starts_with("#EXTINF")).collect();
    assert_eq!(infos.len(), 3);
    assert!(infos[0].starts_with(
        "#EXTINF:-1 channel-id=\"samsungtvplus-x-us\" tvg-name=\"X\" tvg-id=\"x\" tvg-logo=\"\" group-title=\"USA\""
    ));
    // No upstream label for ca, so the shared name table applies
    assert!(infos[1].contains("channel-id=\"samsungtvplus-x-ca\""));
    assert!(infos[1].contains("group-title=\"Canada\""));
    assert!(infos[2].contains("channel-id=\"samsungtvplus-y-ca\""));
}

#[tokio::test]
async fn test_single_region_and_unknown_region() {
    let server = MockServer::start().await;
    mount_json(&server, "/Stirr/.app.json", regional_catalog()).await;
    let app = app(mock_config(&server));

    let (status, body) = get(&app, "/?service=Stirr&region=CA").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("channel-id=\"stirr-x\""));
    assert!(body.contains("https://s/x-ca.m3u8"));
    assert!(!body.contains("https://s/x-us.m3u8"));

    let (status, body) = get(&app, "/?service=Stirr&region=zz").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Error: Invalid region zz");
}

#[tokio::test]
async fn test_gzip_catalog_is_inflated() {
    let server = MockServer::start().await;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(flat_catalog().to_string().as_bytes())
        .unwrap();
    let compressed = encoder.finish().unwrap();

    Mock::given(method("GET"))
        .and(path("/Roku/.app.json"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(compressed))
        .mount(&server)
        .await;
    let app = app(mock_config(&server));

    let (status, body) = get(&app, "/?service=Roku").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("channel-id=\"roku-weather\""));
    // Roku guides are never per region, groups are blanked
    assert!(body.contains("/guide/Roku/all.xml.gz"));
    assert!(body.contains("group-title=\"\""));
}

#[tokio::test]
async fn test_upstream_failures_are_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Loop/.app.json"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/Loop/.app.json", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Gone/.app.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_json(&server, "/Odd/.app.json", json!({"something": "else"})).await;
    let app = app(mock_config(&server));

    let (status, body) = get(&app, "/?service=Loop").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("Too many redirects"));

    let (status, body) = get(&app, "/?service=Gone").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("Failed to fetch data for Gone"));
    assert!(body.contains("404"));

    let (status, body) = get(&app, "/?service=Odd").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("invalid data format"));
}

#[tokio::test]
async fn test_tubi_pass_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tubi/playlist.m3u"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "#EXTM3U x-tvg-url=\"https://old/epg.xml\"\n#EXTINF:-1 tvg-id=\"m\",Movie\nhttps://s/movie.m3u8\n",
        ))
        .mount(&server)
        .await;
    let app = app(mock_config(&server));

    let (status, body) = get(&app, "/?service=tubi&region=gb&sort=chno").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        format!(
            "#EXTM3U url-tvg=\"{}/tubi/epg.xml\"\n#EXTINF:-1 tvg-id=\"m\",Movie\nhttps://s/movie.m3u8\n",
            server.uri()
        )
    );
}

#[tokio::test]
async fn test_tubi_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tubi/playlist.m3u"))
        .respond_with(ResponseTemplate::new(200).set_body_string("  \n"))
        .mount(&server)
        .await;
    let app = app(mock_config(&server));

    let (status, body) = get(&app, "/?service=Tubi").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Error: Upstream payload for Tubi is empty");
}

fn plex_catalog() -> Value {
    json!({
        "channels": {
            "c1": {"name": "Cooking", "regions": ["us", "ca"]},
            "c2": {"name": "Retro Movies", "regions": ["us"]}
        },
        "regions": {"us": {"name": "USA"}, "ca": {"name": "Canada"}}
    })
}

#[tokio::test]
async fn test_plex_genres_for_single_region() {
    let server = MockServer::start().await;
    mount_json(&server, "/Plex/.channels.json", plex_catalog()).await;
    mount_json(
        &server,
        "/plex/genres.json",
        json!([{"Title": "Cooking", "Genre": "Food"}]),
    )
    .await;
    let app = app(mock_config(&server));

    let (status, body) = get(&app, "/?service=Plex&region=us").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("tvg-name=\"Cooking\" tvg-id=\"c1\" tvg-logo=\"\" group-title=\"Food\""));
    assert!(body.contains("group-title=\"Uncategorized\",Retro Movies"));
    assert!(body.contains(&format!("{}/stream/plex-c1.m3u8", server.uri())));
}

#[tokio::test]
async fn test_plex_genre_feed_failure_is_not_fatal() {
    let server = MockServer::start().await;
    mount_json(&server, "/Plex/.channels.json", plex_catalog()).await;
    Mock::given(method("GET"))
        .and(path("/plex/genres.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let app = app(mock_config(&server));

    let (status, body) = get(&app, "/?service=Plex&region=ca").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("group-title=\"Uncategorized\",Cooking"));
    assert!(!body.contains("Retro Movies"));

    // The aggregate view groups by region name and never consults the feed
    let (status, body) = get(&app, "/?service=Plex&region=all").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("channel-id=\"plex-c1-ca\""));
    assert!(body.contains("group-title=\"Canada\",Cooking"));
}

#[tokio::test]
async fn test_pbs_renders_license_lines() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/PBS/.app.json",
        json!({
            "channels": {
                "wgbh": {"name": "WGBH", "logo": "https://l/wgbh.png", "url": "https://s/wgbh.mpd",
                         "license": "https://lic/wgbh", "group": "Boston"},
                "open": {"name": "Open", "logo": "https://l/open.png", "url": "https://s/open.mpd"}
            }
        }),
    )
    .await;
    let app = app(mock_config(&server));

    let (status, body) = get(&app, "/?service=PBS").await;
    assert_eq!(status, StatusCode::OK);

    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(
        lines[0],
        format!("#EXTM3U x-tvg-url=\"{}/guide/PBS/all.xml.gz\"", server.uri())
    );
    assert_eq!(
        lines[1],
        "#EXTINF:-1 channel-id=\"pbs-wgbh\" tvg-name=\"WGBH\" tvg-id=\"wgbh\" tvg-logo=\"https://l/wgbh.png\",WGBH"
    );
    assert_eq!(lines[2], "#KODIPROP:inputstream.adaptive.manifest_type=mpd");
    assert_eq!(lines[3], "#KODIPROP:inputstream.adaptive.license_type=com.widevine.alpha");
    assert!(lines[4].starts_with("#KODIPROP:inputstream.adaptive.license_key=https://lic/wgbh|"));
    assert_eq!(lines[5], "https://s/wgbh.mpd|user-agent=okhttp%2F4.9.0");
    assert_eq!(lines.len(), 6);
}

fn pluto_catalog() -> Value {
    json!({
        "regions": {
            "us": {"name": "United States", "channels": {
                "5ab1": {"name": "Pluto Movies", "group": "Movies"}
            }}
        }
    })
}

#[tokio::test]
async fn test_pluto_token_failure_keeps_proxy_urls() {
    let server = MockServer::start().await;
    mount_json(&server, "/PlutoTV/.channels.json", pluto_catalog()).await;
    Mock::given(method("GET"))
        .and(path("/pluto/boot"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let mut config = mock_config(&server);
    config.services.pluto.token_bootstrap = true;
    let app = app(config);

    let (status, body) = get(&app, "/?service=PlutoTV&region=us").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(&format!("{}/stream/plu-5ab1.m3u8", server.uri())));
    assert!(body.contains("group-title=\"Movies\""));
}

#[tokio::test]
async fn test_pluto_token_rewrites_stream_urls() {
    let server = MockServer::start().await;
    mount_json(&server, "/PlutoTV/.channels.json", pluto_catalog()).await;
    Mock::given(method("GET"))
        .and(path("/pluto/boot"))
        .and(query_param("appName", "web"))
        .and(query_param("deviceType", "web"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sessionToken": "tok.en",
            "servers": {"stitcher": "https://stitcher.example"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let mut config = mock_config(&server);
    config.services.pluto.token_bootstrap = true;
    let app = app(config);

    let (status, body) = get(&app, "/?service=plutotv&region=all").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("channel-id=\"plutotv-5ab1-us\" tvg-name=\"Pluto Movies\" tvg-id=\"5ab1\""));
    assert!(body.contains("group-title=\"United States\""));

    let url = body
        .lines()
        .find(|l| l.starts_with("https://stitcher.example"))
        .unwrap();
    assert!(url.starts_with("https://stitcher.example/v2/stitch/hls/channel/5ab1/master.m3u8?"));
    assert!(url.ends_with("jwt=tok.en"));
}
