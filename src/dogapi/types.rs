use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A dog breed as returned by the catalog API.
///
/// Breeds are immutable once fetched and identified by `id`. Most fields are
/// optional in practice even when the API docs suggest otherwise.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Breed {
  pub id: u64,
  pub name: String,
  #[serde(default)]
  pub temperament: Option<String>,
  #[serde(default)]
  pub life_span: Option<String>,
  #[serde(default)]
  pub weight: Option<Measurement>,
  #[serde(default)]
  pub height: Option<Measurement>,
  #[serde(default)]
  pub bred_for: Option<String>,
  #[serde(default)]
  pub breed_group: Option<String>,
  #[serde(default)]
  pub origin: Option<String>,
  #[serde(default)]
  pub image: Option<BreedImage>,
}

/// Imperial/metric measurement pair (weight in lbs/kg, height in in/cm).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Measurement {
  #[serde(default)]
  pub imperial: Option<String>,
  #[serde(default)]
  pub metric: Option<String>,
}

/// Reference image attached to a breed record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BreedImage {
  #[serde(default)]
  pub id: Option<String>,
  #[serde(default)]
  pub url: Option<String>,
}

/// An image from the image search endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageRecord {
  pub id: String,
  pub url: String,
}

/// A vote on an image (value 1 = up, -1 = down).
#[derive(Debug, Clone, Deserialize)]
pub struct Vote {
  pub id: u64,
  pub image_id: String,
  #[serde(default)]
  pub sub_id: Option<String>,
  pub value: i32,
  pub created_at: DateTime<Utc>,
  #[serde(default)]
  pub country_code: Option<String>,
}

/// Acknowledgement for vote/favourite creation.
///
/// The write endpoints answer with `{"message":"SUCCESS","id":N}` rather than
/// echoing the created record.
#[derive(Debug, Clone, Deserialize)]
pub struct MutationAck {
  pub id: u64,
  #[serde(default)]
  pub message: Option<String>,
}

/// A favourited image.
#[derive(Debug, Clone, Deserialize)]
pub struct Favourite {
  pub id: u64,
  #[serde(default)]
  pub user_id: Option<String>,
  pub image_id: String,
  #[serde(default)]
  pub sub_id: Option<String>,
  pub created_at: DateTime<Utc>,
  #[serde(default)]
  pub image: Option<ImageRecord>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_breed_deserializes_full_record() {
    let json = r#"{
      "id": 5,
      "name": "Akbash Dog",
      "temperament": "Loyal, Independent, Intelligent, Brave",
      "life_span": "10 - 12 years",
      "weight": { "imperial": "90 - 120", "metric": "41 - 54" },
      "height": { "imperial": "28 - 34", "metric": "71 - 86" },
      "bred_for": "Sheep guarding",
      "breed_group": "Working",
      "origin": "",
      "image": { "id": "26pHT3Qk7", "url": "https://cdn2.thedogapi.com/images/26pHT3Qk7.jpg" }
    }"#;

    let breed: Breed = serde_json::from_str(json).unwrap();
    assert_eq!(breed.id, 5);
    assert_eq!(breed.name, "Akbash Dog");
    assert_eq!(breed.breed_group.as_deref(), Some("Working"));
    assert_eq!(
      breed.weight.as_ref().unwrap().metric.as_deref(),
      Some("41 - 54")
    );
  }

  #[test]
  fn test_breed_deserializes_sparse_record() {
    // Search results frequently omit image and measurement fields
    let json = r#"{ "id": 264, "name": "Bulldog" }"#;
    let breed: Breed = serde_json::from_str(json).unwrap();
    assert_eq!(breed.id, 264);
    assert!(breed.image.is_none());
    assert!(breed.temperament.is_none());
  }

  #[test]
  fn test_vote_deserializes() {
    let json = r#"{
      "id": 1234,
      "image_id": "26pHT3Qk7",
      "value": 1,
      "created_at": "2024-03-01T12:00:00.000Z",
      "country_code": "US"
    }"#;
    let vote: Vote = serde_json::from_str(json).unwrap();
    assert_eq!(vote.value, 1);
    assert_eq!(vote.image_id, "26pHT3Qk7");
  }
}
