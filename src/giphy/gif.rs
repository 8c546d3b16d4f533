use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A field the api may leave out or send as `null`.
///
/// `None` means the key was absent, `Some(None)` means it was `null`. Both
/// serialize back the way they came in.
pub type Field<T> = Option<Option<T>>;

/// A gif as returned by the giphy api.
///
/// Only the fields the rest of the service reads are named. Everything else the
/// api sends is kept in `extra` so that serializing a `Gif` gives back the
/// upstream object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gif {
  #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
  pub id: Field<String>,
  #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
  pub title: Field<String>,
  #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
  pub images: Field<Images>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Images {
  #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
  pub fixed_height: Field<Rendition>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rendition {
  #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
  pub url: Field<String>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// Only called when the key is in the input, so `null` becomes `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Field<T>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

impl Gif {
  /// Builds a gif with just a title and a fixed height url.
  #[cfg(test)]
  pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
    Self {
      title: Some(Some(title.into())),
      images: Some(Some(Images {
        fixed_height: Some(Some(Rendition {
          url: Some(Some(url.into())),
          ..Default::default()
        })),
        ..Default::default()
      })),
      ..Default::default()
    }
  }

  pub fn title(&self) -> &str {
    self.title.as_ref().and_then(|title| title.as_deref()).unwrap_or_default()
  }

  /// The fixed height rendition url, used wherever the gif is displayed.
  pub fn display_url(&self) -> Option<&str> {
    self
      .images
      .as_ref()?
      .as_ref()?
      .fixed_height
      .as_ref()?
      .as_ref()?
      .url
      .as_ref()?
      .as_deref()
  }
}
