use anyhow::{Context, Result};

pub fn env_key(key: &str) -> Result<String> {
  std::env::var(key)
    .ok()
    .context(format!("missing env variable: {}", key))
}

/// Like `env_key` but falls back to `default` when the variable isn't set.
pub fn env_key_or(key: &str, default: &str) -> String {
  std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Escapes text for use inside html content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len());

  for character in text.chars() {
    match character {
      '&' => escaped.push_str("&amp;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      '"' => escaped.push_str("&quot;"),
      '\'' => escaped.push_str("&#039;"),
      _ => escaped.push(character),
    }
  }

  escaped
}

/// Escapes a url for an `src`/`href` attribute. Only http(s) urls are allowed,
/// anything else becomes an empty string.
pub fn escape_url(url: &str) -> String {
  let url = url.trim();

  let lowercase = url.to_ascii_lowercase();
  if !lowercase.starts_with("http://") && !lowercase.starts_with("https://") {
    return String::new();
  }

  escape_html(url)
}

/// Cleans up text typed by a user: strips html tags, turns line breaks and
/// tabs into spaces, collapses runs of whitespace and trims the result.
pub fn sanitize_text_field(text: &str) -> String {
  let mut without_tags = String::with_capacity(text.len());
  let mut inside_tag = false;

  for character in text.chars() {
    match character {
      '<' => inside_tag = true,
      '>' if inside_tag => inside_tag = false,
      _ if inside_tag => {}
      _ => without_tags.push(character),
    }
  }

  without_tags.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Url friendly version of a title, e.g. "Funny Cat!" becomes "funny-cat".
pub fn slugify(title: &str) -> String {
  let mut slug = String::with_capacity(title.len());

  for character in title.chars() {
    if character.is_alphanumeric() {
      slug.extend(character.to_lowercase());
    } else if !slug.is_empty() && !slug.ends_with('-') {
      slug.push('-');
    }
  }

  while slug.ends_with('-') {
    slug.pop();
  }

  slug
}
