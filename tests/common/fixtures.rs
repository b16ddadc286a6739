//! Image fixtures and mock image servers

use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Encode a solid-colour RGB image of the given size
pub fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([200, 40, 90])))
        .write_to(&mut Cursor::new(&mut buf), format)
        .expect("Failed to encode fixture image");
    buf
}

/// Path of one page in the mock sequence
pub fn page_path(index: u32) -> String {
    format!("/book/page_{:04}.jpg", index)
}

/// Absolute URL of one page on `server`
pub fn page_url(server: &MockServer, index: u32) -> String {
    format!("{}{}", server.uri(), page_path(index))
}

/// Serve pages `range` as JPEGs, each `width` pixels wide plus its index
///
/// Distinct widths let tests check page order in the produced document.
pub async fn mount_pages(server: &MockServer, range: std::ops::RangeInclusive<u32>, width: u32) {
    for index in range {
        Mock::given(method("GET"))
            .and(path(page_path(index)))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/jpeg")
                    .set_body_bytes(encoded_image(width + index, 20, ImageFormat::Jpeg)),
            )
            .mount(server)
            .await;
    }
}

/// Answer `status` for one page
pub async fn mount_page_status(server: &MockServer, index: u32, status: u16) {
    Mock::given(method("GET"))
        .and(path(page_path(index)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Answer 503 once for one page, then serve it normally
pub async fn mount_flaky_page(server: &MockServer, index: u32, width: u32) {
    Mock::given(method("GET"))
        .and(path(page_path(index)))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(server)
        .await;
    mount_pages(server, index..=index, width).await;
}
