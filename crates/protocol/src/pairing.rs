//! Pairing-payload rendering.
//!
//! Clients emit a raw pairing code string; the status document stores a
//! rendered, scannable image as a data URL so the dashboard can display it
//! directly in an `<img>` tag.

use {
    anyhow::{Context, Result},
    base64::{Engine as _, engine::general_purpose::STANDARD},
    qrcode::{QrCode, render::svg},
};

/// Render a raw pairing code into a `data:image/svg+xml;base64,…` URL.
pub fn render_pairing_payload(code: &str) -> Result<String> {
    let qr = QrCode::new(code.as_bytes()).context("pairing code does not fit a QR code")?;
    let image = qr
        .render::<svg::Color>()
        .min_dimensions(256, 256)
        .quiet_zone(true)
        .build();
    Ok(format!(
        "data:image/svg+xml;base64,{}",
        STANDARD.encode(image)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_data_url() {
        let url = render_pairing_payload("2@AAABBBCCC,keys,more-keys").unwrap();
        assert!(url.starts_with("data:image/svg+xml;base64,"));
    }

    #[test]
    fn distinct_codes_render_distinct_payloads() {
        let a = render_pairing_payload("code-a").unwrap();
        let b = render_pairing_payload("code-b").unwrap();
        assert_ne!(a, b);
    }
}
