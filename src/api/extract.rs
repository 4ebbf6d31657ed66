//! Request body extraction

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{validation_message, AppError};

/// JSON body that has been deserialized and validated.
///
/// Every rejection, whether a malformed body or a failed field rule, is
/// reported as a 400 with an `{error}` body.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        value
            .validate()
            .map_err(|e| AppError::Validation(validation_message(&e)))?;

        Ok(ValidatedJson(value))
    }
}
