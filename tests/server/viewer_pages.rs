use reqwest::StatusCode;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{assert_full_page, browser, get_page, spawn_app, submit};

const GUIA: &str = "335-17-20-CC-3589";

/// How askama writes a URL into an attribute.
fn escaped(url: &str) -> String {
    url.replace('&', "&#38;")
}

#[tokio::test]
async fn empty_viewer_shows_only_search_form() {
    let app = spawn_app().await;
    let client = browser();

    let body = get_page(&client, &app.page_url("/")).await;

    assert_full_page(&body);
    assert!(body.contains(r#"action="/search""#));
    assert!(body.contains("Ej: 3394535 335-17-20-CC-3589"));
    assert!(!body.contains(r#"id="pdf-card""#));
    assert!(!body.contains(r#"id="bulk-nav""#));
}

#[tokio::test]
async fn viewing_the_page_does_not_issue_a_session() {
    let app = spawn_app().await;

    let response = reqwest::get(app.page_url("/"))
        .await
        .expect("Failed to execute request");

    assert!(response.headers().get("set-cookie").is_none());
}

#[tokio::test]
async fn single_search_shows_pdf_and_first_image_candidate() {
    let app = spawn_app().await;
    let client = browser();

    let body = submit(
        &client,
        &app.page_url("/search"),
        &[("input", "3394535 3351720CC3589")],
    )
    .await;

    assert!(body.contains(r#"id="pdf-card""#));
    assert!(body.contains(&escaped(&app.pdf_url("3394535"))));
    assert!(body.contains("Abrir Documento"));
    assert!(body.contains(GUIA));
    assert!(body.contains(&app.bucket_url(GUIA, "jpeg")));
    assert!(body.contains(r#"id="image-failed""#));
    assert!(body.contains("Probando formato 1 de 23"));
    assert!(
        !body.contains(r#"id="bulk-nav""#),
        "single mode has no bulk navigation"
    );
}

#[tokio::test]
async fn search_issues_http_only_session_cookie() {
    let app = spawn_app().await;
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let response = client
        .post(app.page_url("/search"))
        .form(&[("input", "1 G")])
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/");

    let cookie = response.headers()["set-cookie"].to_str().unwrap();
    assert!(cookie.starts_with("visor_session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(!cookie.contains("Secure"), "test app uses insecure cookies");
}

#[tokio::test]
async fn malformed_input_shows_error_without_results() {
    let app = spawn_app().await;
    let client = browser();

    let body = submit(&client, &app.page_url("/search"), &[("input", "3351720CC3589")]).await;

    assert!(body.contains(r#"role="alert""#));
    assert!(body.contains("SSC GUIA (separados por espacio). Ejemplo"));
    assert!(!body.contains(r#"id="pdf-card""#));
}

#[tokio::test]
async fn search_error_replaces_previous_result() {
    let app = spawn_app().await;
    let client = browser();

    submit(&client, &app.page_url("/search"), &[("input", "1 G")]).await;
    let body = submit(&client, &app.page_url("/search"), &[("input", "a b c")]).await;

    assert!(body.contains("exactamente dos valores"));
    assert!(!body.contains(r#"id="pdf-card""#));
}

#[tokio::test]
async fn image_failure_advances_to_next_extension() {
    let app = spawn_app().await;
    let client = browser();

    submit(&client, &app.page_url("/search"), &[("input", "1 G")]).await;
    let body = submit(
        &client,
        &app.page_url("/image/failed"),
        &[("record", "0"), ("attempt", "0")],
    )
    .await;

    assert!(body.contains(&app.bucket_url("G", "jpg")));
    assert!(body.contains("Probando formato 2 de 23"));
    assert!(body.contains(r#"name="attempt" value="1""#));
}

#[tokio::test]
async fn stale_image_failure_is_ignored() {
    let app = spawn_app().await;
    let client = browser();

    submit(&client, &app.page_url("/search"), &[("input", "1 G")]).await;
    let failed = app.page_url("/image/failed");
    submit(&client, &failed, &[("record", "0"), ("attempt", "0")]).await;
    let body = submit(&client, &failed, &[("record", "0"), ("attempt", "0")]).await;

    assert!(body.contains(&app.bucket_url("G", "jpg")));
    assert!(body.contains(r#"name="attempt" value="1""#));
}

#[tokio::test]
async fn exhausting_every_extension_shows_placeholder() {
    let app = spawn_app().await;
    let client = browser();

    submit(&client, &app.page_url("/search"), &[("input", "1 G")]).await;

    let failed = app.page_url("/image/failed");
    let mut body = String::new();
    for attempt in 0..23 {
        let attempt = attempt.to_string();
        body = submit(&client, &failed, &[("record", "0"), ("attempt", &attempt)]).await;
    }

    assert!(body.contains(r#"id="image-unavailable""#));
    assert!(body.contains("Imagen no disponible"));
    assert!(!body.contains(r#"class="guia-image""#));
    assert!(
        body.contains(r#"id="pdf-card""#),
        "the PDF stays visible when the image is missing"
    );
}

#[tokio::test]
async fn image_loaded_settles_probe_without_redirect() {
    let app = spawn_app().await;
    let client = browser();

    submit(&client, &app.page_url("/search"), &[("input", "1 G")]).await;

    let response = client
        .post(app.page_url("/image/loaded"))
        .form(&[("record", "0"), ("attempt", "0")])
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = get_page(&client, &app.page_url("/")).await;
    assert!(body.contains("Imagen encontrada"));
    assert!(body.contains(&app.bucket_url("G", "jpeg")));
    assert!(
        !body.contains(r#"id="image-failed""#),
        "a resolved image no longer reports load events"
    );
}

#[tokio::test]
async fn bulk_search_navigates_and_marks_records() {
    let app = spawn_app().await;
    let client = browser();

    let body = submit(
        &client,
        &app.page_url("/search"),
        &[("input", "A\t1A\nB\t2B\n\nC\t3C")],
    )
    .await;
    assert!(body.contains(r#"id="bulk-nav""#));
    assert!(body.contains("1 / 3"));
    assert!(body.contains("1. A · 1A"));
    assert!(body.contains("3. C · 3C"));

    let body = submit(&client, &app.page_url("/next"), &[]).await;
    assert!(body.contains("2 / 3"));
    assert!(body.contains(&app.bucket_url("2B", "jpeg")));

    let body = submit(&client, &app.page_url("/records/2"), &[]).await;
    assert!(body.contains("3 / 3"));

    let body = submit(&client, &app.page_url("/next"), &[]).await;
    assert!(body.contains("3 / 3"), "next at the end stays put");

    let body = submit(&client, &app.page_url("/records/0/mark"), &[]).await;
    assert!(body.contains("Marcados: 1"));
    assert!(body.contains("3 / 3"), "marking does not move the cursor");

    let body = submit(&client, &app.page_url("/previous"), &[]).await;
    assert!(body.contains("2 / 3"));
}

#[tokio::test]
async fn switching_records_restarts_image_probe() {
    let app = spawn_app().await;
    let client = browser();

    submit(&client, &app.page_url("/search"), &[("input", "A\t1A\nB\t2B")]).await;
    submit(
        &client,
        &app.page_url("/image/failed"),
        &[("record", "0"), ("attempt", "0")],
    )
    .await;

    let body = submit(&client, &app.page_url("/next"), &[]).await;
    assert!(body.contains(&app.bucket_url("2B", "jpeg")));
    assert!(body.contains("Probando formato 1 de 23"));

    let body = submit(
        &client,
        &app.page_url("/image/failed"),
        &[("record", "0"), ("attempt", "1")],
    )
    .await;
    assert!(
        body.contains(&app.bucket_url("2B", "jpeg")),
        "a failure from the previous record is ignored"
    );
}

#[tokio::test]
async fn jump_out_of_range_is_ignored() {
    let app = spawn_app().await;
    let client = browser();

    submit(&client, &app.page_url("/search"), &[("input", "A\t1A\nB\t2B")]).await;
    let body = submit(&client, &app.page_url("/records/9"), &[]).await;

    assert!(body.contains("1 / 2"));
}

#[tokio::test]
async fn clear_returns_to_empty_viewer() {
    let app = spawn_app().await;
    let client = browser();

    submit(&client, &app.page_url("/search"), &[("input", "A\t1A\nB\t2B")]).await;
    let body = submit(&client, &app.page_url("/clear"), &[]).await;

    assert!(!body.contains(r#"id="bulk-nav""#));
    assert!(!body.contains(r#"id="pdf-card""#));
    assert!(!body.contains(r#"role="alert""#));
}

#[tokio::test]
async fn sessions_are_isolated_between_browsers() {
    let app = spawn_app().await;
    let first = browser();
    let second = browser();

    submit(&first, &app.page_url("/search"), &[("input", "1 G")]).await;

    let body = get_page(&second, &app.page_url("/")).await;
    assert!(!body.contains(r#"id="pdf-card""#));

    let body = get_page(&first, &app.page_url("/")).await;
    assert!(body.contains(r#"id="pdf-card""#));
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let app = spawn_app().await;

    let response = reqwest::get(app.page_url("/"))
        .await
        .expect("Failed to execute request");

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");

    let csp = headers["content-security-policy"].to_str().unwrap();
    let backend = app.backend.uri();
    assert!(csp.contains(&format!("img-src 'self' data: {backend}")));
    assert!(csp.contains(&format!("frame-src {backend}")));
}

#[tokio::test]
async fn health_and_stylesheet_are_served() {
    let app = spawn_app().await;

    let health: serde_json::Value = reqwest::get(app.page_url("/health"))
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(health["status"], "ok");

    let css = reqwest::get(app.page_url("/static/css/styles.css"))
        .await
        .expect("Failed to execute request");
    assert_eq!(css.status(), 200);
    assert!(
        css.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/css")
    );
}

#[tokio::test]
async fn page_never_contacts_backends() {
    let app = spawn_app().await;
    Mock::given(method("GET"))
        .and(path("/bucket/G/DC_G.jpeg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8]))
        .expect(0)
        .mount(&app.backend)
        .await;

    let client = browser();
    submit(&client, &app.page_url("/search"), &[("input", "1 G")]).await;
}
