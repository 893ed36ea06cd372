use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use reading_map_shared::colors::user_color;

/// Flat color of the sprite shown when an avatar cannot be loaded.
pub const FALLBACK_RGB: (u8, u8, u8) = (0xD1, 0xD5, 0xDB);

/// Decode an avatar and rasterize it into a `size`×`size` circle. The image is
/// scaled to cover the square from its constraining side and the overflow is
/// cropped evenly on both sides.
pub fn avatar_sprite(bytes: &[u8], size: u32) -> Result<RgbaImage, String> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| format!("failed to decode image: {e}"))?;
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err("image has no pixels".to_string());
    }
    let mut sprite = decoded
        .resize_to_fill(size, size, FilterType::Triangle)
        .to_rgba8();
    apply_circle_mask(&mut sprite, size as f32 / 2.0);
    Ok(sprite)
}

/// Gray disc, inset two pixels from the sprite edge.
pub fn fallback_sprite(size: u32) -> RgbaImage {
    filled_circle(size, FALLBACK_RGB, (size as f32 / 2.0 - 2.0).max(1.0))
}

/// Marker shown while a user's avatar is still loading.
pub fn placeholder_sprite(size: u32, handle: &str) -> RgbaImage {
    filled_circle(size, user_color(handle), (size as f32 / 2.0 - 2.0).max(1.0))
}

fn filled_circle(size: u32, (r, g, b): (u8, u8, u8), radius: f32) -> RgbaImage {
    let mut sprite = RgbaImage::from_pixel(size, size, Rgba([r, g, b, 255]));
    apply_circle_mask(&mut sprite, radius);
    sprite
}

/// Scale alpha by pixel coverage of a centered circle, with a one pixel
/// antialiased edge.
fn apply_circle_mask(sprite: &mut RgbaImage, radius: f32) {
    let cx = sprite.width() as f32 / 2.0;
    let cy = sprite.height() as f32 / 2.0;
    for (x, y, pixel) in sprite.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - cx;
        let dy = y as f32 + 0.5 - cy;
        let coverage = (radius + 0.5 - dx.hypot(dy)).clamp(0.0, 1.0);
        pixel[3] = (f32::from(pixel[3]) * coverage).round() as u8;
    }
}

#[cfg(test)]
pub(crate) fn encode_png(image: &RgbaImage) -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut buf, image::ImageFormat::Png)
        .expect("png encoding");
    buf.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avatar_is_cover_fitted_and_masked() {
        // Wide source: left half red, right half blue.
        let source = RgbaImage::from_fn(80, 40, |x, _| {
            if x < 40 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let sprite = avatar_sprite(&encode_png(&source), 48).expect("png decodes");

        assert_eq!(sprite.dimensions(), (48, 48));
        assert_eq!(sprite.get_pixel(0, 0)[3], 0);
        assert_eq!(sprite.get_pixel(47, 47)[3], 0);

        let left = sprite.get_pixel(8, 24);
        let right = sprite.get_pixel(40, 24);
        assert_eq!(left[3], 255);
        assert!(left[0] > 200 && left[2] < 50, "left should be red: {left:?}");
        assert!(right[2] > 200 && right[0] < 50, "right should be blue: {right:?}");
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let err = avatar_sprite(b"definitely not an image", 48).expect_err("should not decode");
        assert!(err.starts_with("failed to decode image"));
    }

    #[test]
    fn fallback_is_a_gray_disc() {
        let sprite = fallback_sprite(48);
        assert_eq!(sprite.dimensions(), (48, 48));
        assert_eq!(*sprite.get_pixel(24, 24), Rgba([0xD1, 0xD5, 0xDB, 255]));
        assert_eq!(sprite.get_pixel(0, 0)[3], 0);
        // radius 22: the outermost column is fully transparent
        assert_eq!(sprite.get_pixel(0, 24)[3], 0);
        assert_eq!(sprite.get_pixel(3, 24)[3], 255);
    }

    #[test]
    fn placeholders_are_stable_per_user() {
        let a = placeholder_sprite(48, "ana");
        let b = placeholder_sprite(48, "ana");
        let c = placeholder_sprite(48, "bruno");
        assert_eq!(a, b);
        assert_ne!(a.get_pixel(24, 24), c.get_pixel(24, 24));
    }
}
