//! Authentication middleware for injecting a Bearer API key.

use async_trait::async_trait;
use http::{Extensions, HeaderValue};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};

/// Middleware that injects the Bearer key into requests.
pub struct AuthMiddleware {
    header: Option<HeaderValue>,
}

impl AuthMiddleware {
    /// Create a new authentication middleware. A blank key sends no header.
    #[must_use]
    pub fn new(api_key: Option<&str>) -> Self {
        let header = api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .and_then(|key| HeaderValue::from_str(&format!("Bearer {key}")).ok())
            .map(|mut value| {
                value.set_sensitive(true);
                value
            });
        Self { header }
    }
}

#[async_trait]
impl Middleware for AuthMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        if let Some(value) = &self.header {
            req.headers_mut()
                .insert(http::header::AUTHORIZATION, value.clone());
        }

        next.run(req, extensions).await
    }
}
