use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::handler::Reply;
use crate::invoke::{Payload, RequestEnvelope};

use super::errors::DispatchError;
use super::{RuntimeState, stream};

/// `POST /invocations`.
///
/// The handler run is counted as in-flight work. For streamed replies the
/// count is held until the last event is written.
pub(super) async fn invoke(
    State(state): State<RuntimeState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, DispatchError> {
    let payload = decode_payload(&headers, body)?;
    let task = state.tasks.track();
    let reply = state
        .invoker
        .invoke(RequestEnvelope::new(payload, headers))
        .await?;

    match reply {
        Reply::Text(text) => Ok(text.into_response()),
        Reply::Json(value) => Ok(Json(value).into_response()),
        Reply::Stream(elements) => stream::respond(elements, task, state.stream_buffer).await,
    }
}

fn decode_payload(headers: &HeaderMap, body: Bytes) -> Result<Payload, DispatchError> {
    match BodyFormat::from_headers(headers)? {
        BodyFormat::Text => String::from_utf8(body.to_vec())
            .map(Payload::Text)
            .map_err(|source| DispatchError::InvalidUtf8 { source }),
        BodyFormat::Json if body.is_empty() => Ok(Payload::Json(Value::Null)),
        BodyFormat::Json => serde_json::from_slice(&body)
            .map(Payload::Json)
            .map_err(|source| DispatchError::MalformedJson { source }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyFormat {
    Text,
    Json,
}

impl BodyFormat {
    /// JSON unless the client says otherwise; a missing content type is
    /// treated as JSON.
    fn from_headers(headers: &HeaderMap) -> Result<Self, DispatchError> {
        let Some(value) = headers.get(CONTENT_TYPE) else {
            return Ok(Self::Json);
        };
        let Ok(raw) = value.to_str() else {
            return Err(DispatchError::UnsupportedMediaType {
                content_type: String::from_utf8_lossy(value.as_bytes()).into_owned(),
            });
        };
        let essence = raw
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "text/plain" => Ok(Self::Text),
            "" | "application/json" => Ok(Self::Json),
            other if other.ends_with("+json") => Ok(Self::Json),
            _ => Err(DispatchError::UnsupportedMediaType {
                content_type: raw.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Bytes;
    use axum::http::header::CONTENT_TYPE;
    use axum::http::{HeaderMap, HeaderValue, StatusCode};
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::decode_payload;
    use crate::invoke::Payload;

    fn with_content_type(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(value));
        headers
    }

    #[rstest]
    #[case(HeaderMap::new(), r#"{"a":1}"#, Payload::Json(json!({ "a": 1 })))]
    #[case(with_content_type("application/json"), "[1,2]", Payload::Json(json!([1, 2])))]
    #[case(
        with_content_type("application/vnd.agent+json; charset=utf-8"),
        "\"hi\"",
        Payload::Json(json!("hi"))
    )]
    #[case(
        with_content_type("text/plain; charset=utf-8"),
        "{not json}",
        Payload::Text("{not json}".to_owned())
    )]
    #[case(with_content_type("application/json"), "", Payload::Json(Value::Null))]
    fn decodes_by_content_type(
        #[case] headers: HeaderMap,
        #[case] body: &'static str,
        #[case] expected: Payload,
    ) {
        let payload = decode_payload(&headers, Bytes::from_static(body.as_bytes()))
            .expect("body decodes");
        assert_eq!(payload, expected);
    }

    #[rstest]
    fn non_ascii_content_type_is_unsupported() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_bytes("application/jsön".as_bytes()).expect("opaque header value"),
        );
        let error = decode_payload(&headers, Bytes::from_static(b"{}")).expect_err("must fail");
        assert_eq!(error.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[rstest]
    #[case(with_content_type("application/json"), b"{broken".as_slice(), StatusCode::BAD_REQUEST)]
    #[case(with_content_type("text/plain"), [0xff, 0xfe].as_slice(), StatusCode::BAD_REQUEST)]
    #[case(
        with_content_type("application/octet-stream"),
        b"\x00".as_slice(),
        StatusCode::UNSUPPORTED_MEDIA_TYPE
    )]
    fn rejects_undecodable_bodies(
        #[case] headers: HeaderMap,
        #[case] body: &'static [u8],
        #[case] status: StatusCode,
    ) {
        let error = decode_payload(&headers, Bytes::from_static(body)).expect_err("must fail");
        assert_eq!(error.status(), status);
    }
}
