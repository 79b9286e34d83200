use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::dto::{
    DocumentLinkResponse, ListNotasParams, NotasPageResponse, ReprocessParams, ReprocessResponse,
};
use super::error::ApiErrorCode;

/// Typed REST client for the notas processing service.
#[derive(Clone, Debug)]
pub struct NotasApiClient {
    inner: Client,
    base: Url,
    auth_token: Option<String>,
}

impl NotasApiClient {
    /// Builds a new client from a string endpoint.
    pub fn from_endpoint(
        endpoint: &str,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, NotasApiError> {
        let base = Url::parse(endpoint)
            .map_err(|err| NotasApiError::InvalidEndpoint(err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(NotasApiError::InvalidEndpoint(format!(
                "{endpoint} is not an absolute HTTP endpoint"
            )));
        }
        let inner = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            inner,
            base,
            auth_token,
        })
    }

    /// Returns the base endpoint used by the client.
    pub fn endpoint(&self) -> &Url {
        &self.base
    }

    /// Fetches one page of notas matching the provided filters.
    pub async fn list_notas(
        &self,
        params: &ListNotasParams,
    ) -> Result<NotasPageResponse, NotasApiError> {
        self.get(&["notas"], &params.query()).await
    }

    /// Submits a reprocess request for a single nota.
    pub async fn reprocess_nota(
        &self,
        nota_id: &str,
        params: &ReprocessParams,
    ) -> Result<ReprocessResponse, NotasApiError> {
        self.post(&["notas", nota_id, "reprocess"], params).await
    }

    /// Resolves the external document (PDF) link for a nota.
    pub async fn document_link(
        &self,
        nota_id: &str,
    ) -> Result<DocumentLinkResponse, NotasApiError> {
        self.get(&["notas", nota_id, "document"], &[]).await
    }

    fn url(&self, segments: &[&str]) -> Result<Url, NotasApiError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| NotasApiError::InvalidEndpoint(self.base.to_string()))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn get<R>(
        &self,
        segments: &[&str],
        query: &[(&'static str, String)],
    ) -> Result<R, NotasApiError>
    where
        R: DeserializeOwned,
    {
        let mut request = self.inner.get(self.url(segments)?);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }
        decode(request.send().await?).await
    }

    async fn post<B, R>(&self, segments: &[&str], body: &B) -> Result<R, NotasApiError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let mut request = self.inner.post(self.url(segments)?).json(body);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }
        decode(request.send().await?).await
    }
}

async fn decode<R>(response: Response) -> Result<R, NotasApiError>
where
    R: DeserializeOwned,
{
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    match response.json::<ApiErrorBody>().await {
        Ok(body) => Err(NotasApiError::Api {
            code: body.error.code,
            message: body.error.message,
            details: body.error.details,
        }),
        Err(_) => Err(NotasApiError::HttpStatus(status)),
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorPayload,
}

#[derive(Debug, Deserialize)]
struct ApiErrorPayload {
    code: ApiErrorCode,
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Option<Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotasApiError {
    #[error("invalid API endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("notas API transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("notas API transport error: HTTP status {0}")]
    HttpStatus(StatusCode),
    #[error("notas API error [{code}]: {message}")]
    Api {
        code: ApiErrorCode,
        message: String,
        details: Option<Value>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::dto::{NotaStatus, SortDirection, SortField};
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, token: Option<&str>) -> NotasApiClient {
        NotasApiClient::from_endpoint(
            &server.uri(),
            token.map(str::to_string),
            Duration::from_secs(5),
        )
        .expect("client")
    }

    #[tokio::test]
    async fn list_notas_sends_filters_and_decodes_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/notas"))
            .and(query_param("page", "2"))
            .and(query_param("limit", "7"))
            .and(query_param("status", "ERROR"))
            .and(query_param("fornecedor", "191"))
            .and(query_param("sort", "emission_date"))
            .and(query_param("order", "desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{
                    "id": "n-1",
                    "numero": 42,
                    "status": "ERROR",
                    "counterparty_cnpj": "19131243000197",
                    "total_value": 150.0,
                    "attempts": 3
                }],
                "total": 15,
                "page": 2,
                "limit": 7,
                "totalPages": 3,
                "counters": {"error": 15, "total": 40}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let params = ListNotasParams {
            page: 2,
            limit: 7,
            status: Some(NotaStatus::Error),
            fornecedor: Some("191".to_string()),
            sort: Some(SortField::EmissionDate),
            order: SortDirection::Descending,
        };
        let page = client.list_notas(&params).await.expect("page");
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].numero, 42);
        assert_eq!(page.data[0].status, Some(NotaStatus::Error));
        assert_eq!(page.counters.as_ref().map(|c| c.error), Some(15));
    }

    #[tokio::test]
    async fn reprocess_error_body_maps_to_api_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/notas/n-1/reprocess"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "error": {
                    "code": "REPROCESS_IN_PROGRESS",
                    "message": "already queued"
                }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let params = ReprocessParams {
            reason: "retry".to_string(),
            process: None,
            notes: None,
        };
        let error = client
            .reprocess_nota("n-1", &params)
            .await
            .expect_err("error response");
        match error {
            NotasApiError::Api { code, message, .. } => {
                assert_eq!(code, ApiErrorCode::ReprocessInProgress);
                assert_eq!(message, "already queued");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn bearer_token_is_attached_when_configured() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/notas/n-9/document"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"url": "https://docs.example/n-9.pdf"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Some("secret"));
        let link = client.document_link("n-9").await.expect("link");
        assert_eq!(link.url, "https://docs.example/n-9.pdf");
    }

    #[tokio::test]
    async fn non_json_error_surfaces_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/notas"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let params = ListNotasParams {
            page: 1,
            limit: 7,
            status: None,
            fornecedor: None,
            sort: None,
            order: SortDirection::Ascending,
        };
        let error = client.list_notas(&params).await.expect_err("error");
        assert!(matches!(
            error,
            NotasApiError::HttpStatus(StatusCode::BAD_GATEWAY)
        ));
    }
}
