//! SOQL queries

use reqwest::Method;
use tracing::{debug, instrument};
use url::form_urlencoded;

use crate::client::{SalesforceClient, decode};
use crate::error::Result;
use crate::models::QueryResponse;

impl SalesforceClient {
    /// Run a SOQL query and return the first result page.
    #[instrument(skip_all)]
    pub async fn query(&self, soql: &str) -> Result<QueryResponse> {
        let escaped: String = form_urlencoded::byte_serialize(soql.as_bytes()).collect();
        let body = self
            .request_checked(
                Method::GET,
                &self.data_path(&format!("query/?q={escaped}")),
                None::<&()>,
                &[],
            )
            .await
            .map_err(|e| e.context("execute query"))?;

        let page: QueryResponse =
            decode(&body, "query response").map_err(|e| e.context("execute query"))?;
        debug!(total_size = page.total_size, done = page.done, "query completed");
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{Recorder, TokenEndpoint, serve, test_client};
    use axum::http::StatusCode;
    use url::form_urlencoded;

    #[tokio::test]
    async fn query_escapes_soql_and_decodes_page() {
        let tokens = TokenEndpoint::new();
        let api = Recorder::new();
        let base = serve({
            let (tokens, api) = (tokens.clone(), api.clone());
            move |base| {
                tokens.router(base).route(
                    "/services/data/v64.0/query/",
                    api.reply(
                        StatusCode::OK,
                        serde_json::json!({
                            "totalSize": 2,
                            "done": true,
                            "records": [
                                {"attributes": {"type": "Case"}, "Id": "500A", "Subject": "a & b"},
                                {"attributes": {"type": "Case"}, "Id": "500B", "Subject": "c"}
                            ]
                        }),
                    ),
                )
            }
        })
        .await;

        let soql = "SELECT Id, Subject FROM Case WHERE Subject LIKE '%a & b%'";
        let client = test_client(&base);
        let page = client.query(soql).await.unwrap();

        assert_eq!(page.total_size, 2);
        assert!(page.done);
        assert_eq!(page.records[1]["Id"], "500B");

        let query = api.requests()[0].query.clone().unwrap();
        let q = form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "q")
            .map(|(_, value)| value.into_owned());
        assert_eq!(q.as_deref(), Some(soql));
    }

    #[tokio::test]
    async fn malformed_query_is_reported_with_code() {
        let tokens = TokenEndpoint::new();
        let api = Recorder::new();
        let base = serve({
            let (tokens, api) = (tokens.clone(), api.clone());
            move |base| {
                tokens.router(base).route(
                    "/services/data/v64.0/query/",
                    api.reply(
                        StatusCode::BAD_REQUEST,
                        serde_json::json!([{
                            "message": "unexpected token: FORM",
                            "errorCode": "MALFORMED_QUERY"
                        }]),
                    ),
                )
            }
        })
        .await;

        let client = test_client(&base);
        let err = client.query("SELECT Id FORM Case").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to execute query: API error: unexpected token: FORM (code: MALFORMED_QUERY)"
        );
    }
}
