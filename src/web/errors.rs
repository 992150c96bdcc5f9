use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::views::{components::ErrorPanel, render_page, LayoutContext};

/// HTML error page: bad filter input, unknown alert, failed upstream call.
#[derive(Debug)]
pub struct PageError {
    pub status: StatusCode,
    pub ctx: LayoutContext,
    pub message: String,
}

impl PageError {
    pub fn bad_request(ctx: LayoutContext, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            ctx,
            message: message.into(),
        }
    }

    pub fn not_found(ctx: LayoutContext, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            ctx,
            message: message.into(),
        }
    }

    pub fn upstream(ctx: LayoutContext, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            ctx,
            message: message.into(),
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let body = render_page(&self.ctx, ErrorPanel { message: &self.message });
        (self.status, Html(body)).into_response()
    }
}
