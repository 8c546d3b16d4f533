//! Html fragments for gif pages.

use std::fmt::Write;

use crate::{
  giphy::Gif,
  utils::{escape_html, escape_url},
};

/// Name of the query parameter the search form submits.
pub const SEARCH_PARAM: &str = "giphy_search";

pub fn search_form() -> String {
  format!(
    concat!(
      r#"<form method="get" id="giphy-search-form">"#,
      r#"<input type="text" name="{}" placeholder="Search GIFs">"#,
      r#"<button type="submit">Search</button>"#,
      "</form>"
    ),
    SEARCH_PARAM
  )
}

/// Grid of gif images. Gifs without a display url are left out.
pub fn gifs_grid(class: &str, gifs: &[Gif]) -> String {
  let mut html = format!(r#"<div class="giphy-gifs-grid {}">"#, escape_html(class));

  for gif in gifs.iter() {
    let url = match gif.display_url() {
      Some(url) => url,
      None => continue,
    };

    // Writing to a String can't fail.
    let _ = write!(
      html,
      r#"<div class="gif-item"><img src="{}" alt="{}"></div>"#,
      escape_url(url),
      escape_html(gif.title())
    );
  }

  html.push_str("</div>");
  html
}

/// The search form, followed by the results when a search was made.
pub fn search_page(results: Option<&[Gif]>) -> String {
  let mut html = search_form();

  if let Some(gifs) = results {
    html.push_str(&gifs_grid("search-results", gifs));
  }

  html
}

pub fn trending_page(gifs: &[Gif]) -> String {
  gifs_grid("trending-gifs", gifs)
}

/// Wraps a fragment in a minimal html document that loads the stylesheet.
pub fn document(title: &str, body: &str) -> String {
  format!(
    concat!(
      "<!DOCTYPE html><html><head><meta charset=\"utf-8\">",
      "<title>{}</title>",
      r#"<link rel="stylesheet" href="/static/giphy-integration.css">"#,
      "</head><body>{}</body></html>"
    ),
    escape_html(title),
    body
  )
}
