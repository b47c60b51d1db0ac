//! Site adapter tests against a mock archive server

use chrono::NaiveDate;
use retrocrawl::config::SiteConfig;
use retrocrawl::crawler::{NewsSite, SiteAdapter};
use retrocrawl::models::SiteKind;
use retrocrawl::utils::error::FetchError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 2).unwrap()
}

fn site(kind: SiteKind, server: &MockServer) -> NewsSite {
    NewsSite::new(SiteConfig::for_site(kind).with_base_url(server.uri())).unwrap()
}

async fn serve(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

fn peru21_teaser(id: u32, href: &str, title: &str) -> String {
    format!(
        r#"<article data-history-node-id="{id}">
            <a href="{href}">Ver</a>
            <h2>{title}</h2>
            <div class="field--name-field-seccion"><a href="/seccion">Economía</a></div>
        </article>"#
    )
}

#[tokio::test]
async fn test_peru21_lists_every_page() {
    let server = MockServer::start().await;

    let page1 = format!(
        "<html><body>{}{}<a rel=\"next\" href=\"/archivo/todas/2025-11-02/2/\">»</a></body></html>",
        peru21_teaser(1, "/economia/dolar", "Dólar cierra a la baja"),
        peru21_teaser(2, "/economia/bcr", "BCR mantiene tasa"),
    );
    let page2 = format!(
        "<html><body>{}{}</body></html>",
        peru21_teaser(3, "/economia/mype", "Mypes reciben créditos"),
        // repeated teaser across pages is kept once
        peru21_teaser(2, "/economia/bcr", "BCR mantiene tasa"),
    );

    serve(&server, "/archivo/todas/2025-11-02/", 200, &page1).await;
    serve(&server, "/archivo/todas/2025-11-02/2/", 200, &page2).await;

    let items = site(SiteKind::Peru21, &server).list_day(day()).await.unwrap();

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].title, "Dólar cierra a la baja");
    assert_eq!(items[0].section, "Economía");
    assert_eq!(items[0].url, format!("{}/economia/dolar", server.uri()));
    assert_eq!(items[2].title, "Mypes reciben créditos");
    assert!(items.iter().all(|item| item.date == day()));
}

#[tokio::test]
async fn test_peru21_failure_on_later_page_fails_the_day() {
    let server = MockServer::start().await;

    let page1 = format!(
        "<html><body>{}<a rel=\"next\" href=\"/archivo/todas/2025-11-02/2/\">»</a></body></html>",
        peru21_teaser(1, "/politica/congreso", "Congreso sesiona"),
    );
    serve(&server, "/archivo/todas/2025-11-02/", 200, &page1).await;
    serve(&server, "/archivo/todas/2025-11-02/2/", 503, "").await;

    let result = site(SiteKind::Peru21, &server).list_day(day()).await;

    assert!(matches!(
        result,
        Err(FetchError::Status { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_missing_archive_day_is_empty() {
    let server = MockServer::start().await;
    serve(&server, "/archivo/todas/2025-11-02/", 404, "").await;

    let items = site(SiteKind::DiarioCorreo, &server).list_day(day()).await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_archive_without_entries_is_empty() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/archivo/todas/2025-11-02/",
        200,
        "<html><body><p>No hay notas</p></body></html>",
    )
    .await;

    let items = site(SiteKind::Peru21, &server).list_day(day()).await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_correo_lists_and_fetches_body() {
    let server = MockServer::start().await;

    let archive = r#"<html><body>
        <div class="story-item">
            <a class="story-item__section" href="/deportes/">Deportes</a>
            <h2 class="story-item__content-title"><a href="/deportes/clasico-123/">Clásico   en Matute ⚽</a></h2>
        </div>
    </body></html>"#;
    let article = r#"<html><body>
        <div class="story-contents__content">
            <p>El partido terminó&nbsp;empatado.</p>
            <script>dataLayer.push({});</script>
            <p>Habrá revancha.</p>
        </div>
    </body></html>"#;

    serve(&server, "/archivo/todas/2025-11-02/", 200, archive).await;
    serve(&server, "/deportes/clasico-123/", 200, article).await;

    let adapter = site(SiteKind::DiarioCorreo, &server);
    let items = adapter.list_day(day()).await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Clásico en Matute");
    assert_eq!(items[0].section, "Deportes");

    let body = adapter.fetch_body(&items[0].url).await.unwrap();
    assert_eq!(body, "El partido terminó empatado. Habrá revancha.");
}

#[tokio::test]
async fn test_archive_with_stray_byte_still_lists_items() {
    let server = MockServer::start().await;

    let mut archive = br#"<html><body>
        <div class="story-item">
            <a class="story-item__section" href="/peru/">Per"#
        .to_vec();
    // lone Latin-1 byte in a page declared as UTF-8
    archive.push(0xfa);
    archive.extend_from_slice(
        br#"</a>
            <h2 class="story-item__content-title"><a href="/peru/lluvias-456/">Lluvias en la sierra</a></h2>
        </div>
    </body></html>"#,
    );

    Mock::given(method("GET"))
        .and(path("/archivo/todas/2025-11-02/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(archive)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let items = site(SiteKind::DiarioCorreo, &server).list_day(day()).await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Lluvias en la sierra");
    assert!(items[0].section.starts_with("Per"));
}

#[tokio::test]
async fn test_body_without_container_is_empty() {
    let server = MockServer::start().await;
    serve(&server, "/nota/", 200, "<html><body><p>Galería</p></body></html>").await;

    let adapter = site(SiteKind::Peru21, &server);
    let body = adapter
        .fetch_body(&format!("{}/nota/", server.uri()))
        .await
        .unwrap();

    assert!(body.is_empty());
}

#[tokio::test]
async fn test_body_transport_failure_is_error() {
    let server = MockServer::start().await;
    serve(&server, "/nota/", 500, "").await;

    let adapter = site(SiteKind::Peru21, &server);
    let result = adapter.fetch_body(&format!("{}/nota/", server.uri())).await;

    assert!(result.is_err());
}

#[test]
fn test_invalid_base_url_is_rejected() {
    let config = SiteConfig::for_site(SiteKind::Peru21).with_base_url("not a url");
    assert!(matches!(
        NewsSite::new(config),
        Err(FetchError::InvalidUrl(_))
    ));
}
