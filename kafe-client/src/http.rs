//! HTTP client for network-based API calls
//!
//! Every endpoint answers with the [`ApiResponse`] envelope. A non-zero code
//! turns back into the server's [`AppError`](shared::error::AppError) and then
//! into [`ClientError`].

use reqwest::{Client, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::ApiResponse;
use shared::models::{
    Product, ProductCreate, ProductUpdate, RotateTables, Store, StoreCreate, StoreUpdate,
    TableEntry,
};

use crate::{ClientConfig, ClientError, ClientResult};

/// Append path segments (percent-encoded) to a base URL
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> ClientResult<Url> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(base.to_string()))?;
        path.pop_if_empty().extend(segments);
    }
    Ok(url)
}

/// Parse a configured base URL
pub(crate) fn parse_base(base_url: &str) -> ClientResult<Url> {
    Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))
}

#[derive(Serialize)]
struct TableQuery<'a> {
    table_no: &'a str,
}

/// HTTP client for making network requests to kafe-server
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: parse_base(&config.base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> ClientResult<T> {
        let url = endpoint(&self.base_url, segments)?;
        self.send(self.client.get(url)).await
    }

    /// Make a GET request with a query string
    pub async fn get_query<T, Q>(&self, segments: &[&str], query: &Q) -> ClientResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = endpoint(&self.base_url, segments)?;
        self.send(self.client.get(url).query(query)).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T, B>(&self, segments: &[&str], body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = endpoint(&self.base_url, segments)?;
        self.send(self.client.post(url).json(body)).await
    }

    /// Make a POST request without body
    pub async fn post_empty<T: DeserializeOwned>(&self, segments: &[&str]) -> ClientResult<T> {
        let url = endpoint(&self.base_url, segments)?;
        self.send(self.client.post(url)).await
    }

    /// Make a PUT request with JSON body
    pub async fn put<T, B>(&self, segments: &[&str], body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = endpoint(&self.base_url, segments)?;
        self.send(self.client.put(url).json(body)).await
    }

    /// Make a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, segments: &[&str]) -> ClientResult<T> {
        let url = endpoint(&self.base_url, segments)?;
        self.send(self.client.delete(url)).await
    }

    /// GET with an optional `table_no` scope
    pub(crate) async fn get_scoped<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        table_no: Option<&str>,
    ) -> ClientResult<T> {
        match table_no {
            Some(table_no) => self.get_query(segments, &TableQuery { table_no }).await,
            None => self.get(segments).await,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let text = response.text().await?;

        let envelope: ApiResponse<T> = serde_json::from_str(&text).map_err(|e| {
            ClientError::InvalidResponse(format!("{status}: {e}"))
        })?;

        envelope
            .into_result()?
            .ok_or_else(|| ClientError::InvalidResponse(format!("{status}: missing data")))
    }

    // ========== Admin API ==========

    pub async fn create_store(&self, payload: &StoreCreate) -> ClientResult<Store> {
        self.post(&["api", "admin", "stores"], payload).await
    }

    pub async fn update_store(&self, store_id: i64, payload: &StoreUpdate) -> ClientResult<Store> {
        let id = store_id.to_string();
        self.put(&["api", "admin", "stores", &id], payload).await
    }

    pub async fn products(&self, store_id: i64) -> ClientResult<Vec<Product>> {
        let id = store_id.to_string();
        self.get(&["api", "admin", "stores", &id, "products"]).await
    }

    pub async fn create_product(
        &self,
        store_id: i64,
        payload: &ProductCreate,
    ) -> ClientResult<Product> {
        let id = store_id.to_string();
        self.post(&["api", "admin", "stores", &id, "products"], payload)
            .await
    }

    pub async fn update_product(
        &self,
        store_id: i64,
        product_id: i64,
        payload: &ProductUpdate,
    ) -> ClientResult<Product> {
        let id = store_id.to_string();
        let pid = product_id.to_string();
        self.put(&["api", "admin", "stores", &id, "products", &pid], payload)
            .await
    }

    /// Tables with their QR entry URLs
    pub async fn tables(&self, store_id: i64) -> ClientResult<Vec<TableEntry>> {
        let id = store_id.to_string();
        self.get(&["api", "admin", "stores", &id, "tables"]).await
    }

    /// Regenerate tokens for tables `1..=count`
    pub async fn rotate_tables(&self, store_id: i64, count: u32) -> ClientResult<Vec<TableEntry>> {
        let id = store_id.to_string();
        self.post(
            &["api", "admin", "stores", &id, "tables", "rotate"],
            &RotateTables { count },
        )
        .await
    }

    /// Regenerate the token of one table
    pub async fn rotate_table(&self, store_id: i64, table_no: &str) -> ClientResult<TableEntry> {
        let id = store_id.to_string();
        self.post_empty(&["api", "admin", "stores", &id, "tables", table_no, "rotate"])
            .await
    }
}
