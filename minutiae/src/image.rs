use crate::error::TemplateError;
use crate::minutia::{DetectedMinutia, Minutia};
use crate::template::Template;

/// Minimum reliability (percent) for a detected minutia to be kept.
pub const MIN_RELIABILITY: u32 = 45;

/// A raw grayscale image.
#[derive(Debug, Clone, Copy)]
pub struct RawImage<'a> {
    pub pixels: &'a [u8],
    pub width: u32,
    pub height: u32,
    /// Bits per pixel.
    pub pixel_depth: u32,
    /// Scan resolution in pixels per inch.
    pub ppi: u32,
}

impl RawImage<'_> {
    fn validate(&self) -> Result<(), TemplateError> {
        if self.width == 0 || self.height == 0 || self.pixel_depth == 0 || self.ppi == 0 {
            return Err(TemplateError::InvalidParameter(format!(
                "image dimensions must be positive: {}x{}, depth {}, {} ppi",
                self.width, self.height, self.pixel_depth, self.ppi
            )));
        }
        let bits = self.width as u64 * self.height as u64 * self.pixel_depth as u64;
        let need = bits.div_ceil(8);
        if (self.pixels.len() as u64) < need {
            return Err(TemplateError::InvalidParameter(format!(
                "image buffer too short: need {need} bytes, got {}",
                self.pixels.len()
            )));
        }
        Ok(())
    }

    /// Resolution in pixels per millimetre.
    pub fn pixels_per_mm(&self) -> f64 {
        self.ppi as f64 / 25.4
    }
}

/// Converts a grayscale image into minutiae.
///
/// Implementations wrap an external detector. `pixels_per_mm` is the scan
/// resolution derived from the image's ppi. Coordinates and angles must
/// follow the same convention as `.xyt` text; angles are reduced modulo 360
/// by the caller.
pub trait MinutiaeExtractor {
    fn extract(&self, image: &RawImage<'_>, pixels_per_mm: f64) -> Result<Vec<DetectedMinutia>, TemplateError>;
}

impl Template {
    /// Builds a template from an image through `extractor`.
    ///
    /// Detections below [`MIN_RELIABILITY`] are dropped, the
    /// `max_minutiae` most reliable ones are kept, and those are ordered by
    /// `(x, y)` before ids are assigned.
    pub fn from_raw_image(
        extractor: &dyn MinutiaeExtractor,
        image: &RawImage<'_>,
        max_minutiae: usize,
        num_neighbors: usize,
    ) -> Result<Self, TemplateError> {
        if max_minutiae == 0 || num_neighbors == 0 {
            return Err(TemplateError::InvalidParameter(
                "max_minutiae and num_neighbors must be positive".into(),
            ));
        }
        image.validate()?;

        let detected = extractor.extract(image, image.pixels_per_mm())?;
        if detected.is_empty() {
            return Err(TemplateError::MinutiaeExtractor("no minutiae detected".into()));
        }
        let total = detected.len();
        let minutiae = select_minutiae(detected, max_minutiae);
        tracing::debug!(
            detected = total,
            kept = minutiae.len(),
            width = image.width,
            height = image.height,
            "minutiae extracted from image"
        );

        Self::build(minutiae, num_neighbors)
    }
}

fn select_minutiae(mut detected: Vec<DetectedMinutia>, max_minutiae: usize) -> Vec<Minutia> {
    detected.retain(|m| m.quality >= MIN_RELIABILITY);
    // Stable: equal qualities keep detector order.
    detected.sort_by(|a, b| b.quality.cmp(&a.quality));
    detected.truncate(max_minutiae);
    detected.sort_by_key(|m| (m.x, m.y));

    detected
        .into_iter()
        .enumerate()
        .map(|(i, m)| Minutia::new(i as u32, m.x, m.y, m.angle % 360))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedExtractor(Vec<DetectedMinutia>);

    impl MinutiaeExtractor for FixedExtractor {
        fn extract(&self, _image: &RawImage<'_>, _pixels_per_mm: f64) -> Result<Vec<DetectedMinutia>, TemplateError> {
            Ok(self.0.clone())
        }
    }

    struct FailingExtractor;

    impl MinutiaeExtractor for FailingExtractor {
        fn extract(&self, _image: &RawImage<'_>, _pixels_per_mm: f64) -> Result<Vec<DetectedMinutia>, TemplateError> {
            Err(TemplateError::MinutiaeExtractor("detector crashed".into()))
        }
    }

    fn detected(x: u32, y: u32, angle: u32, quality: u32) -> DetectedMinutia {
        DetectedMinutia { x, y, angle, quality }
    }

    const PIXELS: [u8; 16] = [0u8; 16];

    fn image() -> RawImage<'static> {
        RawImage {
            pixels: &PIXELS,
            width: 4,
            height: 4,
            pixel_depth: 8,
            ppi: 500,
        }
    }

    #[test]
    fn filters_caps_and_sorts() {
        let extractor = FixedExtractor(vec![
            detected(50, 5, 10, 90),
            detected(10, 9, 20, 30), // below reliability
            detected(10, 1, 30, 80),
            detected(30, 3, 370, 60),
            detected(70, 7, 40, 50), // dropped by the cap
        ]);
        let tpl = Template::from_raw_image(&extractor, &image(), 3, 1).unwrap();
        let ms = tpl.minutiae().unwrap();

        let points: Vec<(u32, u32, u32, u32)> = ms.iter().map(|m| (m.id, m.x, m.y, m.angle)).collect();
        assert_eq!(points, vec![(0, 10, 1, 30), (1, 30, 3, 10), (2, 50, 5, 10)]);
    }

    #[test]
    fn empty_extraction_is_error() {
        let extractor = FixedExtractor(Vec::new());
        let err = Template::from_raw_image(&extractor, &image(), 10, 1).unwrap_err();
        assert!(matches!(err, TemplateError::MinutiaeExtractor(_)));
    }

    #[test]
    fn extractor_error_propagates() {
        let err = Template::from_raw_image(&FailingExtractor, &image(), 10, 1).unwrap_err();
        assert_eq!(err, TemplateError::MinutiaeExtractor("detector crashed".into()));
    }

    #[test]
    fn all_unreliable_is_too_few() {
        let extractor = FixedExtractor(vec![detected(1, 1, 0, 10), detected(2, 2, 0, 20)]);
        let err = Template::from_raw_image(&extractor, &image(), 10, 1).unwrap_err();
        assert_eq!(err, TemplateError::TooFewMinutiae { got: 0, need: 2 });
    }

    #[test]
    fn invalid_image() {
        let extractor = FixedExtractor(vec![detected(1, 1, 0, 90)]);
        let mut img = image();
        img.width = 0;
        assert!(matches!(
            Template::from_raw_image(&extractor, &img, 10, 1),
            Err(TemplateError::InvalidParameter(_))
        ));

        let short = [0u8; 3];
        let img = RawImage { pixels: &short, ..image() };
        assert!(matches!(
            Template::from_raw_image(&extractor, &img, 10, 1),
            Err(TemplateError::InvalidParameter(_))
        ));
    }

    /// Reports the resolution it was handed as the x of a single minutia.
    struct ResolutionExtractor;

    impl MinutiaeExtractor for ResolutionExtractor {
        fn extract(&self, _image: &RawImage<'_>, pixels_per_mm: f64) -> Result<Vec<DetectedMinutia>, TemplateError> {
            Ok(vec![
                detected((pixels_per_mm * 100.0).round() as u32, 0, 0, 90),
                detected(0, 0, 0, 90),
            ])
        }
    }

    #[test]
    fn extractor_receives_resolution() {
        let img = RawImage { ppi: 254, ..image() };
        let tpl = Template::from_raw_image(&ResolutionExtractor, &img, 10, 1).unwrap();
        let xs: Vec<u32> = tpl.minutiae().unwrap().iter().map(|m| m.x).collect();
        assert_eq!(xs, vec![0, 1000]);
    }
}
