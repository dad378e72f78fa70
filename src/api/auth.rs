//! Authentication endpoints: login, refresh, logout, me.

use tracing::info;

use crate::client::ApiClient;
use crate::error::{ApiError, Result};
use crate::models::{Credentials, TokenResponse, User};
use crate::session::TokenSet;

/// Authentication operations.
#[derive(Debug)]
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Log in and store the resulting tokens in the session.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenSet> {
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: TokenResponse = self.client.post("/auth/login", &credentials).await?;

        let tokens = TokenSet::new(
            response.access_token,
            response.refresh_token,
            response.expires_in,
        );
        self.client.session().store(tokens.clone()).await?;
        info!(email, "logged in");
        Ok(tokens)
    }

    /// Invalidate the session server-side and clear it locally.
    ///
    /// The local session is cleared even when the server call fails; a
    /// dangling refresh token expires on its own.
    pub async fn logout(&self) -> Result<()> {
        let result = self
            .client
            .post_unit("/auth/logout", &serde_json::json!({}))
            .await;
        self.client.session().clear().await?;
        info!("logged out");
        result
    }

    /// Force a token refresh now instead of waiting for a 401.
    ///
    /// Shares the single-flight guarantee of the implicit refresh: if a
    /// concurrent request already refreshed, its result is reused.
    pub async fn refresh(&self) -> Result<TokenSet> {
        let epoch = self.client.session().epoch();
        self.client
            .session()
            .refresh_once(epoch, |refresh_token| {
                self.client.refresh_call(refresh_token)
            })
            .await?;
        self.client
            .session()
            .tokens()
            .await
            .ok_or(ApiError::NotAuthenticated)
    }

    /// Fetch the currently authenticated user.
    pub async fn me(&self) -> Result<User> {
        self.client.get("/auth/me").await
    }
}
