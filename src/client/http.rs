use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use uuid::Uuid;

use super::{ClientError, ResourceApi};
use crate::db::models::record::Record;
use crate::db::schema::ResourceSchema;
use crate::utils::api_response::ApiResponse;

/// Talks to one `/api/<resource>` endpoint over HTTP.
#[derive(Clone)]
pub struct HttpResourceClient {
    http: Client,
    url: String,
}

impl HttpResourceClient {
    /// `base_url` is the API root, e.g. `http://localhost:5000/api`.
    pub fn new(http: Client, base_url: &str, schema: &ResourceSchema) -> Self {
        Self {
            http,
            url: format!("{}/{}", base_url.trim_end_matches('/'), schema.route),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn item_url(&self, id: Uuid) -> String {
        format!("{}/{id}", self.url)
    }
}

async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ApiResponse<Value>>().await {
        Ok(body) => body.describe(),
        Err(_) => status.to_string(),
    };
    tracing::warn!(status = status.as_u16(), %message, "api call failed");

    Err(match status {
        StatusCode::BAD_REQUEST => ClientError::Validation(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        _ => ClientError::Unavailable(message),
    })
}

#[async_trait]
impl ResourceApi for HttpResourceClient {
    async fn list(&self) -> Result<Vec<Record>, ClientError> {
        let response = check(self.http.get(&self.url).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn create(&self, fields: &Value) -> Result<Record, ClientError> {
        let response = check(self.http.post(&self.url).json(fields).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn update(&self, id: Uuid, fields: &Value) -> Result<Record, ClientError> {
        let response = check(self.http.put(self.item_url(id)).json(fields).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        check(self.http.delete(self.item_url(id)).send().await?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::SIZE_CHART_REQUESTS;

    #[test]
    fn builds_resource_urls() {
        let client = HttpResourceClient::new(Client::new(), "http://localhost:5000/api/", &SIZE_CHART_REQUESTS);
        assert_eq!(client.url(), "http://localhost:5000/api/sizeChartRequests");

        let id = Uuid::nil();
        assert_eq!(
            client.item_url(id),
            "http://localhost:5000/api/sizeChartRequests/00000000-0000-0000-0000-000000000000"
        );
    }
}
