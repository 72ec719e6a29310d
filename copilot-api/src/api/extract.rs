//! JSON body extractor with the API's error envelope

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Like [`axum::Json`], but a rejected body gets the `{"error": "..."}` envelope
///
/// Malformed or mistyped JSON is a 400. Other rejections keep their status,
/// such as 413 for an oversized body and 415 for a missing content type.
pub struct ValidJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => {
                let message = rejection.body_text();
                Err(match rejection {
                    JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                        ApiError::BadRequest(message)
                    }
                    other => ApiError::Rejected {
                        status: other.status(),
                        message,
                    },
                })
            }
        }
    }
}
