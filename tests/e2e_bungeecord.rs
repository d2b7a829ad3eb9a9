//! BungeeCord end-to-end tests against a mock Jenkins feed

mod helper;

use mockito::Server;

use helper::config_with_base_url;
use mcrelease::service::ReleaseService;
use mcrelease::version::error::ResolveError;

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>BungeeCord all builds</title>
  <entry><title>BungeeCord #1764 (back to normal)</title><id>1764</id></entry>
  <entry><title>BungeeCord #1765 (stable)</title><id>1765</id></entry>
  <entry><title>BungeeCord #1763 (broken since #1762)</title><id>1763</id></entry>
</feed>"#;

async fn service_for(server: &mut Server) -> (String, ReleaseService) {
    server
        .mock("GET", "/job/BungeeCord/rssAll")
        .with_status(200)
        .with_header("content-type", "application/atom+xml")
        .with_body(FEED)
        .create_async()
        .await;
    let base = format!("{}/job/BungeeCord", server.url());
    let service = ReleaseService::from_config(&config_with_base_url("bungeecord", &base));
    (base, service)
}

#[tokio::test]
async fn lists_builds_highest_first() {
    let mut server = Server::new_async().await;
    let (_, service) = service_for(&mut server).await;

    assert_eq!(
        service.list_versions("bungeecord").await.unwrap(),
        vec!["#1765", "#1764", "#1763"]
    );
}

#[tokio::test]
async fn download_defaults_to_most_recent_build() {
    let mut server = Server::new_async().await;
    let (base, service) = service_for(&mut server).await;

    let url = service
        .resolve_download_url("bungeecord", None, None)
        .await
        .unwrap();

    assert_eq!(url, format!("{base}/1765/artifact/bootstrap/target/BungeeCord.jar"));
}

#[tokio::test]
async fn download_accepts_number_without_hash() {
    let mut server = Server::new_async().await;
    let (base, service) = service_for(&mut server).await;

    let url = service
        .resolve_download_url("bungeecord", Some("1764"), None)
        .await
        .unwrap();

    assert_eq!(url, format!("{base}/1764/artifact/bootstrap/target/BungeeCord.jar"));
}

#[tokio::test]
async fn unknown_build_number_is_version_not_found() {
    let mut server = Server::new_async().await;
    let (_, service) = service_for(&mut server).await;

    let err = service
        .resolve_download_url("bungeecord", Some("#1"), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ResolveError::VersionNotFound { ref version, .. } if version == "#1"
    ));
}
