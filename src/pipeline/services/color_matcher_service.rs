use futures::future::{ready, Ready};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;
use tracing::debug;

use super::color_matcher::ColorMatcher;
use crate::error::MatcherError;
use crate::pipeline::types::Entity;

/// `tower` adapter producing one result document per entity.
///
/// The matcher is shared read-only, so clones of the service can handle
/// different entities concurrently.
#[derive(Clone)]
pub struct ColorMatcherService {
    matcher: Arc<ColorMatcher>,
}

impl ColorMatcherService {
    pub fn new(matcher: Arc<ColorMatcher>) -> Self {
        Self { matcher }
    }
}

impl Service<Entity> for ColorMatcherService {
    type Response = Value;
    type Error = MatcherError;
    type Future = Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), MatcherError>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, entity: Entity) -> Self::Future {
        let mut document = Value::Object(Map::new());

        let outcome = match self.matcher.classify(&entity) {
            Ok(color_match) => self.matcher.write_result(&color_match, &mut document),
            Err(reason) => {
                debug!("No color result for entity {}: {}", entity.id, reason);
                Ok(())
            }
        };

        ready(outcome.map(|_| document))
    }
}
