use std::time::Duration;

use reqwest::Client;
use tokio::net::TcpListener;
use tokio::task::AbortHandle;
use visor::application::routes::app_router;
use visor::application::state::{AppState, AppStateConfig};
use visor::domain::locator::ResourceLocator;
use wiremock::MockServer;

pub struct TestApp {
    pub address: String,
    /// Stands in for both the image bucket and the PDF backend.
    pub backend: MockServer,
    server_handle: AbortHandle,
}

impl TestApp {
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.address, path)
    }

    pub fn page_url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn bucket_url(&self, guia: &str, extension: &str) -> String {
        format!("{}/bucket/{guia}/DC_{guia}.{extension}", self.backend.uri())
    }

    pub fn pdf_url(&self, ssc: &str) -> String {
        format!(
            "{}/pdf.php?todos=1&id_formula={ssc}&id_punto=14",
            self.backend.uri()
        )
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Spawn the app after `configure` has adjusted the default test settings.
pub async fn spawn_app_with(configure: impl FnOnce(&mut AppStateConfig)) -> TestApp {
    let backend = MockServer::start().await;

    let locator = ResourceLocator::new(
        &format!("{}/bucket/", backend.uri()),
        &format!("{}/pdf.php", backend.uri()),
    )
    .expect("valid backend URLs");

    let mut config = AppStateConfig {
        locator,
        insecure_cookies: true,
        probe_timeout: Duration::from_secs(2),
        max_sessions: 100,
        lookups_per_minute: 60,
    };
    configure(&mut config);

    let state = AppState::new(config);

    let app = app_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");

    let local_addr = listener.local_addr().expect("Failed to get local address");
    let address = format!("http://{}", local_addr);

    let server_handle = tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .await
        .expect("Server failed to start");
    })
    .abort_handle();

    TestApp {
        address,
        backend,
        server_handle,
    }
}

/// A browser-like client: keeps cookies and follows the post/redirect/get flow.
pub fn browser() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to build client")
}

/// POST a form and return the body of the page it redirects to.
pub async fn submit(client: &Client, url: &str, form: &[(&str, &str)]) -> String {
    let response = client
        .post(url)
        .form(form)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200, "form post to {url} should land on a page");
    response.text().await.expect("Failed to read body")
}

pub async fn get_page(client: &Client, url: &str) -> String {
    let response = client
        .get(url)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    response.text().await.expect("Failed to read body")
}

pub fn assert_full_page(body: &str) {
    assert!(body.contains("<!DOCTYPE html>"), "Should be a full HTML page");
    assert!(body.contains("</html>"), "Should close the HTML document");
}
