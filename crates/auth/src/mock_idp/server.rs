//! Mock IdP server for development and testing.
//!
//! This server simulates the hosted sign-in page and the logout endpoint of
//! the identity provider, allowing the full login flow to run locally.

use axum::{
    extract::Query,
    response::{Html, Redirect},
    routing::{get, post},
    Form, Router,
};
use base64::Engine;
use serde::Deserialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use url::Url;

use super::templates;

#[derive(Deserialize)]
struct AuthorizeQuery {
    state: String,
    redirect_uri: String,
}

#[derive(Deserialize)]
struct LoginForm {
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    state: String,
    redirect_uri: String,
}

/// Mock IdP server that simulates the provider's hosted endpoints.
pub struct MockIdpServer {
    port: u16,
}

impl MockIdpServer {
    /// Create a new Mock IdP server.
    ///
    /// # Arguments
    /// * `port` - The port to listen on (typically 3001)
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    /// Router serving the mock endpoints.
    ///
    /// - `GET /user_management/authorize` - Sign-in page
    /// - `POST /authorize/submit` - Form submission handler
    /// - `GET /user_management/sessions/logout` - Signed-out page
    pub fn router() -> Router {
        Router::new()
            .route("/user_management/authorize", get(authorize))
            .route("/authorize/submit", post(authorize_submit))
            .route("/user_management/sessions/logout", get(logout))
    }

    /// Run the Mock IdP server.
    pub async fn run(self) -> Result<(), std::io::Error> {
        let addr = SocketAddr::from(([127, 0, 0, 1], self.port));
        tracing::info!("Mock IdP server listening on http://{}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, Self::router()).await
    }
}

async fn authorize(Query(params): Query<AuthorizeQuery>) -> Html<String> {
    Html(templates::login_page(&params.state, &params.redirect_uri))
}

async fn authorize_submit(Form(form): Form<LoginForm>) -> Redirect {
    // Generate a mock authorization code that encodes the user info
    let mock_code = base64::engine::general_purpose::STANDARD.encode(
        serde_json::json!({
            "email": form.email,
            "first_name": form.first_name.filter(|n| !n.is_empty()),
            "last_name": form.last_name.filter(|n| !n.is_empty()),
        })
        .to_string(),
    );

    let callback_url = match Url::parse(&form.redirect_uri) {
        Ok(mut url) => {
            url.query_pairs_mut()
                .append_pair("code", &mock_code)
                .append_pair("state", &form.state);
            url.to_string()
        }
        Err(e) => {
            tracing::warn!(error = %e, "mock sign-in with invalid redirect_uri");
            "/".to_string()
        }
    };

    Redirect::to(&callback_url)
}

async fn logout() -> Html<String> {
    Html(templates::signed_out_page())
}
