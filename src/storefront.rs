//! Html for catalog products. Products created from a gif show the gif
//! instead of a local image.

use std::fmt::Write;

use crate::{
  contracts::catalog::Product,
  utils::{escape_html, escape_url},
};

/// Where a product image is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSurface {
  /// The main image on the product page.
  Single,
  /// A thumbnail in the product page gallery.
  Gallery,
  /// The thumbnail in product listings.
  Archive,
}

/// Returns an `<img>` pointing at the product's external gif, or `fallback`
/// when the product doesn't have one.
pub fn product_image_html(product: &Product, surface: ImageSurface, fallback: &str) -> String {
  let url = match product.external_image_url() {
    Some(url) if !url.is_empty() => url,
    _ => return fallback.to_owned(),
  };

  let closing = match surface {
    ImageSurface::Single | ImageSurface::Gallery => ">",
    ImageSurface::Archive => " />",
  };

  format!(
    r#"<img src="{}" alt="{}" class="wp-post-image"{}"#,
    escape_url(url),
    escape_html(product.name()),
    closing
  )
}

/// Served from the assets directory under /static.
pub const PLACEHOLDER_IMAGE_PATH: &str = "/static/placeholder.svg";

/// Placeholder used when a product has no image of its own.
pub fn placeholder_image_html(product: &Product) -> String {
  format!(
    r#"<img src="{}" alt="{}" class="wp-post-image">"#,
    PLACEHOLDER_IMAGE_PATH,
    escape_html(product.name())
  )
}

pub fn product_listing_html(products: &[Product]) -> String {
  let mut html = String::from(r#"<ul class="products">"#);

  for product in products.iter() {
    let image = product_image_html(
      product,
      ImageSurface::Archive,
      &placeholder_image_html(product),
    );

    // Writing to a String can't fail.
    let _ = write!(
      html,
      r#"<li class="product"><a href="/products/{}">{}<h2>{}</h2><span class="price">{}</span></a></li>"#,
      product.id,
      image,
      escape_html(product.name()),
      product.formatted_price()
    );
  }

  html.push_str("</ul>");
  html
}

pub fn product_page_html(product: &Product) -> String {
  let placeholder = placeholder_image_html(product);

  format!(
    concat!(
      r#"<div class="product">"#,
      r#"<div class="product-image">{}</div>"#,
      r#"<div class="product-gallery">{}</div>"#,
      r#"<h1>{}</h1><p class="price">{}</p>"#,
      r#"<div class="short-description">{}</div>"#,
      r#"<div class="description">{}</div>"#,
      "</div>"
    ),
    product_image_html(product, ImageSurface::Single, &placeholder),
    product_image_html(product, ImageSurface::Gallery, &placeholder),
    escape_html(product.name()),
    product.formatted_price(),
    escape_html(&product.details.short_description),
    escape_html(&product.details.description),
  )
}
