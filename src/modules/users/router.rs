use axum::{
    Router,
    routing::{get, patch, post},
};

use super::controller::{
    change_password, check_reset_link, complete_password_reset, get_current_user, obtain_token,
    refresh_token, register, request_reset_email, update_current_user, verify_email,
};
use crate::state::AppState;

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/token", post(obtain_token))
        .route("/token/refresh", post(refresh_token))
        .route("/password-change", post(change_password))
        .route("/email-verify", get(verify_email))
        .route("/request-reset-email", post(request_reset_email))
        .route("/password-reset/{uidb64}/{token}", get(check_reset_link))
        .route("/password-reset-complete", patch(complete_password_reset))
        .route(
            "/current",
            get(get_current_user)
                .put(update_current_user)
                .patch(update_current_user),
        )
}
