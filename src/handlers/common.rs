use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    Json,
};
use serde::Serialize;

use crate::{
    auth::AuthUser, db::Page, middleware_helpers::ClientInfo, services::Actor, ApiResponse,
    PaginatedResponse,
};

/// 200 with the standard envelope
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

/// 201 with the standard envelope
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

pub fn paginated<T: Serialize>(page: Page<T>) -> Json<ApiResponse<PaginatedResponse<T>>> {
    Json(ApiResponse::success(page.into()))
}

/// The caller as seen by the audit trail. Anonymous on public routes.
#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let client = ClientInfo::from_headers(&parts.headers);
        Ok(Actor {
            user_id: parts.extensions.get::<AuthUser>().map(|user| user.user_id),
            ip_address: Some(client.ip_address),
            user_agent: client.user_agent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use uuid::Uuid;

    #[tokio::test]
    async fn actor_picks_up_user_and_forwarded_ip() {
        let user_id = Uuid::new_v4();
        let mut request = Request::builder()
            .header("x-forwarded-for", "10.1.2.3, 172.16.0.1")
            .header("user-agent", "curl/8.0")
            .body(())
            .unwrap();
        request.extensions_mut().insert(AuthUser {
            user_id,
            username: Some("sara".into()),
            email: None,
            roles: vec![],
            permissions: vec![],
            token_id: "jti".into(),
            expires_at: 0,
        });
        let (mut parts, _) = request.into_parts();

        let actor = Actor::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(actor.user_id, Some(user_id));
        assert_eq!(actor.ip_address.as_deref(), Some("10.1.2.3"));
        assert_eq!(actor.user_agent, "curl/8.0");
    }

    #[tokio::test]
    async fn anonymous_actor_has_no_user() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let actor = Actor::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(actor.user_id, None);
        assert_eq!(actor.ip_address.as_deref(), Some("0.0.0.0"));
    }
}
