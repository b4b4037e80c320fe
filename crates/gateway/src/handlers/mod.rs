//! API handlers module
//!
//! Every handler calls the core and wraps the result in `ApiResponse`;
//! failures render through `AppError`.

pub mod content;
pub mod health;
pub mod ideas;
pub mod instagram;
pub mod posts;
pub mod speculation;

use axum::extract::{FromRequest, FromRequestParts};
use trendcaster_common::errors::{AppError, Result};
use validator::Validate;

/// JSON body whose rejection renders as the error envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path parameters whose rejection renders as the error envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Query string whose rejection renders as the error envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Run `validator` rules, reporting the first failing field
pub(crate) fn validate<T: Validate>(request: &T) -> Result<()> {
    request.validate().map_err(|errors| {
        let field = errors
            .field_errors()
            .keys()
            .min()
            .map(|name| name.to_string());
        AppError::InvalidParameter {
            message: errors.to_string(),
            field,
        }
    })
}

#[cfg(test)]
pub(crate) mod testing {
    //! Router harness over the in-memory store and offline adapters

    use crate::{create_router, AppState};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;
    use trendcaster_common::{
        config::AppConfig,
        db::{ContentStore, MemoryStore},
        sources::{
            ContentGenerator, DisabledSocialPlatform, SocialPlatform, StaticNewsSource,
            TemplateGenerator,
        },
    };

    pub struct Harness {
        pub store: Arc<MemoryStore>,
        pub router: Router,
    }

    pub fn harness() -> Harness {
        harness_with(Arc::new(TemplateGenerator::new()), Arc::new(DisabledSocialPlatform))
    }

    pub fn harness_with(
        generator: Arc<dyn ContentGenerator>,
        social: Arc<dyn SocialPlatform>,
    ) -> Harness {
        harness_with_config(AppConfig::default(), generator, social)
    }

    pub fn harness_with_config(
        config: AppConfig,
        generator: Arc<dyn ContentGenerator>,
        social: Arc<dyn SocialPlatform>,
    ) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(
            Arc::new(config),
            store.clone() as Arc<dyn ContentStore>,
            Arc::new(StaticNewsSource::new()),
            generator,
            social,
        );
        Harness {
            store,
            router: create_router(state),
        }
    }

    impl Harness {
        pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
            self.send(Request::get(uri).body(Body::empty()).unwrap()).await
        }

        pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
            let request = Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            self.send(request).await
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };
            (status, body)
        }
    }
}
