use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Method, StatusCode,
};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    constants::{ALREADY_REGISTERED_ERROR, SEC_CH_UA, USER_AGENT},
    errors::ExecError,
    proxy::{self, ProxyHandle},
};

// Rejections the API will repeat forever, no matter how often the request is retried
const TERMINAL_ERRORS: &[&str] = &[ALREADY_REGISTERED_ERROR];

#[derive(Clone, Debug)]
pub struct RequestParams {
    pub url: String,
    pub method: Method,
    pub body: Option<Value>,
    pub query_args: Option<Vec<(String, String)>>,
    pub headers: HeaderMap,
}

impl RequestParams {
    pub fn get(url: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            url: url.into(),
            method: Method::GET,
            body: None,
            query_args: None,
            headers,
        }
    }

    pub fn post(url: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            method: Method::POST,
            ..Self::get(url, headers)
        }
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, query_args: Vec<(String, String)>) -> Self {
        self.query_args = Some(query_args);
        self
    }
}

/// Issues exactly one HTTP call through a proxy and classifies the result.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(
        &self,
        request: &RequestParams,
        proxy: &ProxyHandle,
    ) -> Result<Value, ExecError>;

    /// `false` on any failure; never an error.
    async fn verify_proxy(&self, proxy: &ProxyHandle) -> bool;
}

#[derive(Clone, Debug)]
pub struct HttpExecutor {
    ip_check_url: String,
}

impl HttpExecutor {
    pub fn new(ip_check_url: impl Into<String>) -> Self {
        Self {
            ip_check_url: ip_check_url.into(),
        }
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(
        &self,
        request_params: &RequestParams,
        proxy: &ProxyHandle,
    ) -> Result<Value, ExecError> {
        let mut request = proxy
            .client
            .request(request_params.method.clone(), &request_params.url)
            .headers(request_params.headers.clone());

        if let Some(params) = &request_params.query_args {
            request = request.query(params);
        }

        if let Some(body) = &request_params.body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .inspect_err(|e| tracing::error!("Request failed: {e}"))
            .map_err(|e| ExecError::Retryable(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .inspect_err(|e| tracing::error!("Failed to retrieve response text: {e}"))
            .map_err(|e| ExecError::Retryable(e.to_string()))?;

        classify_response(status, &text)
    }

    async fn verify_proxy(&self, handle: &ProxyHandle) -> bool {
        proxy::verify(handle, &self.ip_check_url).await
    }
}

#[derive(Deserialize)]
struct ApiRejection {
    success: bool,
    error: String,
}

/// Terminal markers win over the status code: the API reports them on error statuses too.
pub fn classify_response(status: StatusCode, body: &str) -> Result<Value, ExecError> {
    let parsed = serde_json::from_str::<Value>(body);

    if let Ok(value) = &parsed {
        if let Ok(ApiRejection {
            success: false,
            error,
        }) = ApiRejection::deserialize(value)
        {
            if TERMINAL_ERRORS.contains(&error.as_str()) {
                return Err(ExecError::Terminal(error));
            }
        }
    }

    if !status.is_success() {
        tracing::error!("Non-successful status code: {status}");
        return Err(ExecError::Retryable(format!("status {status}: {body}")));
    }

    parsed.map_err(|e| ExecError::Retryable(format!("response is not valid JSON: {e}")))
}

fn insert_static(headers: &mut HeaderMap, name: &'static str, value: &'static str) {
    headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
}

pub fn faucet_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();

    insert_static(&mut headers, "accept", "application/json, text/plain, */*");
    insert_static(&mut headers, "content-type", "application/x-www-form-urlencoded");

    headers
}

fn browser_headers(claims_url: &str) -> eyre::Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    insert_static(&mut headers, "accept", "*/*");
    insert_static(&mut headers, "accept-language", "en-US;q=0.8,en;q=0.7");
    insert_static(&mut headers, "dnt", "1");
    insert_static(&mut headers, "priority", "u=1, i");
    headers.insert(
        HeaderName::from_static("referer"),
        HeaderValue::from_str(&format!("{claims_url}/okx"))?,
    );
    insert_static(&mut headers, "sec-ch-ua", SEC_CH_UA);
    insert_static(&mut headers, "sec-ch-ua-mobile", "?0");
    insert_static(&mut headers, "sec-ch-ua-platform", "\"Windows\"");
    insert_static(&mut headers, "sec-fetch-dest", "empty");
    insert_static(&mut headers, "sec-fetch-mode", "cors");
    insert_static(&mut headers, "sec-fetch-site", "same-origin");
    insert_static(&mut headers, "user-agent", USER_AGENT);

    Ok(headers)
}

/// Header sets for the two claims endpoints, built once per run.
#[derive(Clone, Debug)]
pub struct ClaimsHeaders {
    pub nonce: HeaderMap,
    pub submit: HeaderMap,
}

impl ClaimsHeaders {
    pub fn new(claims_url: &str) -> eyre::Result<Self> {
        let nonce = browser_headers(claims_url)?;

        let mut submit = nonce.clone();
        insert_static(&mut submit, "content-type", "application/json");
        submit.insert(
            HeaderName::from_static("origin"),
            HeaderValue::from_str(claims_url)?,
        );

        Ok(Self { nonce, submit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_body_is_returned() {
        let value = classify_response(StatusCode::OK, r#"{"nonce":"abc"}"#).unwrap();
        assert_eq!(value, json!({ "nonce": "abc" }));
    }

    #[test]
    fn non_success_status_is_retryable() {
        let err = classify_response(StatusCode::BAD_GATEWAY, "upstream down").unwrap_err();
        assert!(matches!(err, ExecError::Retryable(_)));

        let err = classify_response(StatusCode::TOO_MANY_REQUESTS, r#"{"error":"slow down"}"#)
            .unwrap_err();
        assert!(matches!(err, ExecError::Retryable(_)));
    }

    #[test]
    fn non_json_success_body_is_retryable() {
        let err = classify_response(StatusCode::OK, "<html>captcha</html>").unwrap_err();
        assert!(matches!(err, ExecError::Retryable(_)));
    }

    #[test]
    fn already_registered_is_terminal_on_any_status() {
        let body = r#"{"success":false,"error":"Aptos account registered already"}"#;

        for status in [StatusCode::OK, StatusCode::BAD_REQUEST] {
            assert_eq!(
                classify_response(status, body).unwrap_err(),
                ExecError::Terminal(ALREADY_REGISTERED_ERROR.to_string())
            );
        }
    }

    #[test]
    fn other_rejections_are_not_terminal() {
        let body = r#"{"success":false,"error":"Invalid signature"}"#;

        assert!(classify_response(StatusCode::OK, body).is_ok());
        assert!(matches!(
            classify_response(StatusCode::BAD_REQUEST, body),
            Err(ExecError::Retryable(_))
        ));
    }

    #[test]
    fn claims_headers_carry_origin_and_referer() {
        let headers = ClaimsHeaders::new("https://claims.example").unwrap();

        assert_eq!(headers.nonce["referer"], "https://claims.example/okx");
        assert!(headers.nonce.get("origin").is_none());
        assert_eq!(headers.submit["origin"], "https://claims.example");
        assert_eq!(headers.submit["content-type"], "application/json");
        assert_eq!(headers.submit["user-agent"], USER_AGENT);
    }

    #[test]
    fn request_builders_set_method_and_payload() {
        let request = RequestParams::post("https://faucet.example/mint", faucet_headers())
            .with_query(vec![("amount".into(), "1".into())])
            .with_json(json!({ "a": 1 }));

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.query_args.unwrap().len(), 1);
        assert!(request.body.is_some());
        assert_eq!(
            RequestParams::get("https://x", HeaderMap::new()).method,
            Method::GET
        );
    }
}
