//! Image conversion through the `image` crate.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageFormat, ImageReader, Rgb, RgbImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use super::error::ConverterError;
use super::progress::{milestones, ProgressReporter};
use crate::media::{MediaCategory, IMAGE_EXTENSIONS};

/// JPEG quality used when the config does not override it.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Resolves an image target (`jpg`, `png`, ...) to an encoder format.
pub fn image_format_for(target: &str) -> Option<ImageFormat> {
    let target = target.to_lowercase();
    if !IMAGE_EXTENSIONS.contains(&target.as_str()) {
        return None;
    }
    ImageFormat::from_extension(&target)
}

/// Drops alpha by compositing onto opaque white; other modes go to RGB8.
///
/// Transparent pixels come out white, never black.
pub fn flatten_onto_white(img: DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

fn encode(
    rgb: &RgbImage,
    format: ImageFormat,
    output_path: &Path,
    jpeg_quality: u8,
) -> Result<(), ConverterError> {
    let file = File::create(output_path).map_err(ConverterError::image)?;
    let mut writer = BufWriter::new(file);

    match format {
        ImageFormat::Jpeg => rgb
            .write_with_encoder(JpegEncoder::new_with_quality(&mut writer, jpeg_quality))
            .map_err(ConverterError::image)?,
        ImageFormat::Png => rgb
            .write_with_encoder(PngEncoder::new_with_quality(
                &mut writer,
                CompressionType::Best,
                FilterType::Adaptive,
            ))
            .map_err(ConverterError::image)?,
        other => rgb
            .write_to(&mut writer, other)
            .map_err(ConverterError::image)?,
    }

    writer.flush().map_err(ConverterError::image)?;
    Ok(())
}

/// Converts `source_path` to `target` at `output_path`.
///
/// Blocking; callers on the async runtime should run it through
/// `spawn_blocking`. Reports 30 after decoding, 60 after flattening and 100
/// once the file is written.
pub fn convert_image(
    source_path: &Path,
    output_path: &Path,
    target: &str,
    jpeg_quality: u8,
    progress: &mut ProgressReporter,
) -> Result<(), ConverterError> {
    let format = image_format_for(target)
        .ok_or_else(|| ConverterError::unsupported_format(MediaCategory::Image, target))?;

    let img = ImageReader::open(source_path)
        .map_err(ConverterError::image)?
        .with_guessed_format()
        .map_err(ConverterError::image)?
        .decode()
        .map_err(ConverterError::image)?;
    debug!(
        width = img.width(),
        height = img.height(),
        color = ?img.color(),
        "Decoded image"
    );
    progress.report(milestones::IMAGE_LOADED);

    let rgb = flatten_onto_white(img);
    progress.report(milestones::IMAGE_NORMALIZED);

    encode(&rgb, format, output_path, jpeg_quality)?;
    progress.report(milestones::COMPLETE);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    fn write_rgba_png(path: &Path) {
        let img = RgbaImage::from_fn(16, 16, |x, y| {
            if x < 8 {
                Rgba([0, 0, 0, 0])
            } else if y < 8 {
                Rgba([255, 0, 0, 128])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        img.save(path).unwrap();
    }

    fn assert_opaque(img: &DynamicImage) {
        if img.color().has_alpha() {
            assert!(img.pixels().all(|(_, _, p)| p.0[3] == 255));
        }
    }

    #[test]
    fn test_image_format_for() {
        assert_eq!(image_format_for("JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(image_format_for("jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(image_format_for("webp"), Some(ImageFormat::WebP));
        assert_eq!(image_format_for("tiff"), None);
        assert_eq!(image_format_for("mp4"), None);
    }

    #[test]
    fn test_flatten_transparent_becomes_white() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([255, 0, 0, 128])
            }
        }));
        let rgb = flatten_onto_white(img);
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 255, 255]);
        let [r, g, b] = rgb.get_pixel(1, 0).0;
        assert_eq!(r, 255);
        assert!((126..=128).contains(&g));
        assert_eq!(g, b);
    }

    #[test]
    fn test_flatten_opaque_is_unchanged() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 3, Rgb([10, 20, 30])));
        let rgb = flatten_onto_white(img);
        assert!(rgb.pixels().all(|p| p.0 == [10, 20, 30]));
    }

    #[test]
    fn test_png_with_alpha_to_jpg() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("logo.png");
        let output = dir.path().join("logo_converted.jpg");
        write_rgba_png(&source);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut progress = ProgressReporter::new(tx);
        convert_image(&source, &output, "jpg", DEFAULT_JPEG_QUALITY, &mut progress).unwrap();

        let mut seen = Vec::new();
        while let Ok(p) = rx.try_recv() {
            seen.push(p.percent);
        }
        assert_eq!(seen, vec![30, 60, 100]);

        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert!(!decoded.color().has_alpha());
        // Fully transparent corner is white after flattening.
        let [r, g, b, _] = decoded.get_pixel(1, 1).0;
        assert!(r > 240 && g > 240 && b > 240);
    }

    #[test]
    fn test_every_image_target_pair() {
        let dir = TempDir::new().unwrap();
        let seed = dir.path().join("seed.png");
        write_rgba_png(&seed);

        let mut sources = Vec::new();
        for ext in IMAGE_EXTENSIONS {
            let source = dir.path().join(format!("source.{}", ext));
            convert_image(&seed, &source, ext, 95, &mut ProgressReporter::disabled()).unwrap();
            sources.push((*ext, source));
        }

        for (source_ext, source) in &sources {
            for target in IMAGE_EXTENSIONS.iter().filter(|t| *t != source_ext) {
                let output = dir.path().join(format!("{}_to.{}", source_ext, target));
                convert_image(source, &output, target, 95, &mut ProgressReporter::disabled())
                    .unwrap_or_else(|e| panic!("{} -> {}: {}", source_ext, target, e));

                let bytes = std::fs::read(&output).unwrap();
                assert_eq!(
                    image::guess_format(&bytes).unwrap(),
                    image_format_for(target).unwrap(),
                    "{} -> {}",
                    source_ext,
                    target
                );
                let decoded = image::load_from_memory(&bytes).unwrap();
                if matches!(*target, "jpg" | "jpeg" | "png" | "bmp") {
                    assert!(!decoded.color().has_alpha(), "{} -> {}", source_ext, target);
                }
                assert_opaque(&decoded);
            }
        }
    }

    #[test]
    fn test_corrupt_source_is_image_error() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("broken.png");
        std::fs::write(&source, b"definitely not a png").unwrap();
        let err = convert_image(
            &source,
            &dir.path().join("out.jpg"),
            "jpg",
            95,
            &mut ProgressReporter::disabled(),
        )
        .unwrap_err();
        assert!(matches!(err, ConverterError::Image { .. }));
    }

    #[test]
    fn test_unsupported_image_target() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.png");
        write_rgba_png(&source);
        let err = convert_image(
            &source,
            &dir.path().join("a.tiff"),
            "tiff",
            95,
            &mut ProgressReporter::disabled(),
        )
        .unwrap_err();
        assert!(matches!(err, ConverterError::UnsupportedFormat { .. }));
    }
}
