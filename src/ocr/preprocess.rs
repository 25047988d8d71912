use image::{DynamicImage, GrayImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};

/// Converts to grayscale and binarizes with an Otsu threshold.
///
/// Pixels brighter than the threshold become white, the rest black.
pub fn preprocess(img: &DynamicImage) -> GrayImage {
    let gray = img.to_luma8();
    let level = otsu_level(&gray);
    threshold(&gray, level, ThresholdType::Binary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    fn two_tone(dark: u8, bright: u8) -> GrayImage {
        GrayImage::from_fn(10, 4, |x, _| if x < 5 { Luma([dark]) } else { Luma([bright]) })
    }

    #[test]
    fn test_two_tones_split_black_and_white() {
        let img = DynamicImage::ImageLuma8(two_tone(10, 200));
        let out = preprocess(&img);
        assert_eq!(out.get_pixel(0, 0)[0], 0, "Dark pixel should become black");
        assert_eq!(out.get_pixel(9, 3)[0], 255, "Bright pixel should become white");
    }

    #[test]
    fn test_output_is_strictly_binary() {
        let img = GrayImage::from_fn(16, 16, |x, y| Luma([(x * 16 + y) as u8]));
        let out = preprocess(&DynamicImage::ImageLuma8(img));
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn test_uniform_image_keeps_dimensions() {
        let img = GrayImage::from_pixel(4, 3, Luma([128]));
        let out = preprocess(&DynamicImage::ImageLuma8(img));
        assert_eq!(out.dimensions(), (4, 3));
    }

    #[test]
    fn test_preprocess_color_image() {
        let rgb = RgbImage::from_fn(8, 2, |x, _| {
            if x < 4 { Rgb([20, 20, 20]) } else { Rgb([240, 240, 240]) }
        });
        let out = preprocess(&DynamicImage::ImageRgb8(rgb));

        assert_eq!(out.dimensions(), (8, 2));
        assert_eq!(out.get_pixel(0, 0)[0], 0);
        assert_eq!(out.get_pixel(7, 1)[0], 255);
    }
}
