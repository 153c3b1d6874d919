use axum::{Router, routing::post};

use super::controller::{facebook_login, google_login, twitter_login, twitter_request_token};
use crate::state::AppState;

pub fn init_social_router() -> Router<AppState> {
    Router::new()
        .route("/google", post(google_login))
        .route("/facebook", post(facebook_login))
        .route("/twitter", post(twitter_login))
        .route("/twitter/oauth/request_token", post(twitter_request_token))
}
