//! Uniform JSON response envelope.
//!
//! Every response body has the shape `{"Status": <int>, "Data": ..., "Error": ...}`
//! with whichever of `Data`/`Error` applies. When a payload cannot be
//! serialised the client receives [`FALLBACK_BODY`] with status 500 instead.

use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, HttpResponseBuilder};
use serde::Serialize;
use tracing::error;

/// Body sent when the real payload cannot be serialised.
pub const FALLBACK_BODY: &str = r#"{"Status": 500, "Error": "Unable to prepare server response"}"#;

/// Wire shape shared by success and failure responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Envelope<D, E> {
    /// HTTP status repeated in the body.
    pub status: u16,
    /// Success payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<D>,
    /// Failure payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<E>,
}

fn fallback() -> HttpResponse {
    HttpResponse::InternalServerError()
        .content_type(ContentType::json())
        .body(FALLBACK_BODY)
}

/// Serialise `envelope` into `builder`, falling back on encoder failure.
pub(crate) fn finish<D, E>(mut builder: HttpResponseBuilder, envelope: &Envelope<D, E>) -> HttpResponse
where
    D: Serialize,
    E: Serialize,
{
    match serde_json::to_vec(envelope) {
        Ok(body) => builder.content_type(ContentType::json()).body(body),
        Err(err) => {
            error!(error = %err, "failed to serialise response envelope");
            fallback()
        }
    }
}

/// Successful response wrapping `data`.
///
/// # Examples
/// ```
/// use actix_web::http::StatusCode;
/// use backend::inbound::http::envelope::data;
///
/// let response = data(StatusCode::CREATED, &"created");
/// assert_eq!(response.status(), StatusCode::CREATED);
/// ```
pub fn data<D: Serialize>(status: StatusCode, payload: &D) -> HttpResponse {
    finish(
        HttpResponse::build(status),
        &Envelope::<&D, ()> {
            status: status.as_u16(),
            data: Some(payload),
            error: None,
        },
    )
}

/// `200 OK` wrapping `payload`.
pub fn ok<D: Serialize>(payload: &D) -> HttpResponse {
    data(StatusCode::OK, payload)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use actix_web::body::to_bytes;
    use serde::Serializer;
    use serde_json::{Value, json};

    struct Unserialisable;

    impl Serialize for Unserialisable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refused"))
        }
    }

    async fn body_of(response: HttpResponse) -> Value {
        let bytes = to_bytes(response.into_body()).await.expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[actix_web::test]
    async fn wraps_payload_with_status() {
        let response = data(StatusCode::CREATED, &json!({"userName": "alice"}));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_of(response).await,
            json!({"Status": 201, "Data": {"userName": "alice"}})
        );
    }

    #[actix_web::test]
    async fn falls_back_when_payload_cannot_be_serialised() {
        let response = ok(&Unserialisable);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_of(response).await,
            json!({"Status": 500, "Error": "Unable to prepare server response"})
        );
    }
}
