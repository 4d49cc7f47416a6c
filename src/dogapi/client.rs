use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::dogapi::error::ApiError;
use crate::dogapi::types::{Breed, Favourite, ImageRecord, MutationAck, Vote};

/// HTTP client for the breed catalog API.
///
/// Issues requests and decodes JSON; it has no caching policy of its own.
/// Caching is the job of the query cache layered above it.
#[derive(Clone)]
pub struct DogApiClient {
  http: reqwest::Client,
  base: Url,
}

impl DogApiClient {
  pub fn new(config: &Config) -> color_eyre::Result<Self> {
    let mut headers = HeaderMap::new();
    if let Some(key) = Config::get_api_key() {
      let mut value = HeaderValue::from_str(&key)
        .map_err(|e| color_eyre::eyre::eyre!("Invalid API key: {}", e))?;
      value.set_sensitive(true);
      headers.insert("x-api-key", value);
    }

    let http = reqwest::Client::builder()
      .default_headers(headers)
      .build()
      .map_err(|e| color_eyre::eyre::eyre!("Failed to build HTTP client: {}", e))?;

    let base = Url::parse(&config.api.url)
      .map_err(|e| color_eyre::eyre::eyre!("Invalid API url {}: {}", config.api.url, e))?;

    Ok(Self { http, base })
  }

  /// One page of the breed catalog, ordered, at most `limit` entries.
  pub async fn get_breeds(&self, limit: u32, page: u32) -> Result<Vec<Breed>, ApiError> {
    let url = self.endpoint(
      "breeds",
      &[("limit", limit.to_string()), ("page", page.to_string())],
    )?;
    self.get_json(url).await
  }

  /// Breeds whose name contains `q` (case-insensitive, upstream semantics).
  pub async fn search_breeds(&self, q: &str) -> Result<Vec<Breed>, ApiError> {
    let url = self.endpoint("breeds/search", &[("q", q.to_string())])?;
    self.get_json(url).await
  }

  /// A single breed by id.
  pub async fn get_breed(&self, id: u64) -> Result<Breed, ApiError> {
    let url = self.endpoint(&format!("breeds/{}", id), &[])?;
    self.get_json(url).await
  }

  /// Images for a breed, paginated.
  pub async fn get_breed_images(
    &self,
    breed_id: u64,
    limit: u32,
    page: u32,
  ) -> Result<Vec<ImageRecord>, ApiError> {
    let url = self.endpoint(
      "images/search",
      &[
        ("breed_ids", breed_id.to_string()),
        ("limit", limit.to_string()),
        ("page", page.to_string()),
      ],
    )?;
    self.get_json(url).await
  }

  pub async fn get_votes(&self) -> Result<Vec<Vote>, ApiError> {
    let url = self.endpoint("votes", &[])?;
    self.get_json(url).await
  }

  pub async fn create_vote(&self, image_id: &str, value: i32) -> Result<MutationAck, ApiError> {
    let url = self.endpoint("votes", &[])?;
    let body = serde_json::json!({ "image_id": image_id, "value": value });
    self.post_json(url, body).await
  }

  pub async fn delete_vote(&self, vote_id: u64) -> Result<(), ApiError> {
    let url = self.endpoint(&format!("votes/{}", vote_id), &[])?;
    self.delete(url).await
  }

  pub async fn get_favourites(&self) -> Result<Vec<Favourite>, ApiError> {
    let url = self.endpoint("favourites", &[])?;
    self.get_json(url).await
  }

  pub async fn create_favourite(&self, image_id: &str) -> Result<MutationAck, ApiError> {
    let url = self.endpoint("favourites", &[])?;
    let body = serde_json::json!({ "image_id": image_id });
    self.post_json(url, body).await
  }

  pub async fn delete_favourite(&self, favourite_id: u64) -> Result<(), ApiError> {
    let url = self.endpoint(&format!("favourites/{}", favourite_id), &[])?;
    self.delete(url).await
  }

  fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url, ApiError> {
    let mut url = self
      .base
      .join(path)
      .map_err(|e| ApiError::InvalidArgument(format!("bad endpoint path {}: {}", path, e)))?;
    if !params.is_empty() {
      url
        .query_pairs_mut()
        .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
    }
    Ok(url)
  }

  async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
    let endpoint = url.path().to_string();
    debug!(%url, "GET");

    let response = self
      .http
      .get(url)
      .send()
      .await
      .map_err(ApiError::Network)?;

    let status = response.status();
    if !status.is_success() {
      return Err(ApiError::Status { endpoint, status });
    }

    response
      .json()
      .await
      .map_err(|source| ApiError::Decode { endpoint, source })
  }

  async fn post_json<T: DeserializeOwned>(
    &self,
    url: Url,
    body: serde_json::Value,
  ) -> Result<T, ApiError> {
    let endpoint = url.path().to_string();
    debug!(%url, "POST");

    let response = self
      .http
      .post(url)
      .json(&body)
      .send()
      .await
      .map_err(ApiError::Network)?;

    let status = response.status();
    if !status.is_success() {
      return Err(ApiError::Status { endpoint, status });
    }

    response
      .json()
      .await
      .map_err(|source| ApiError::Decode { endpoint, source })
  }

  async fn delete(&self, url: Url) -> Result<(), ApiError> {
    let endpoint = url.path().to_string();
    debug!(%url, "DELETE");

    let response = self
      .http
      .delete(url)
      .send()
      .await
      .map_err(ApiError::Network)?;

    let status = response.status();
    if !status.is_success() {
      return Err(ApiError::Status { endpoint, status });
    }

    Ok(())
  }
}
