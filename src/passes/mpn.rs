use std::sync::LazyLock;

use regex::Regex;

use crate::model::CatalogEntry;
use crate::report::MpnRow;

use super::{configuration, product_line};

static MPN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ARVA-[A-Z]+-[A-Z0-9]+-[A-Z0-9]+$").unwrap());
static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W").unwrap());

const DEFAULT_COLOR: &str = "TAUPE";

/// Color with punctuation and spaces removed, uppercased.
pub fn color_slug(color: &str) -> String {
    let s = NON_WORD_RE.replace_all(color, "");
    if s.is_empty() {
        DEFAULT_COLOR.to_string()
    } else {
        s.to_uppercase()
    }
}

/// Set `mpn` to `ARVA-{LINE}-{CONFIG}-{COLOR}` unless it is already well formed.
/// Every entry is logged with its final MPN.
pub fn run(entries: &mut [CatalogEntry]) -> Vec<MpnRow> {
    entries
        .iter_mut()
        .map(|entry| {
            if !MPN_RE.is_match(entry.get("mpn")) {
                let mpn = format!(
                    "ARVA-{}-{}-{}",
                    product_line(entry).as_str(),
                    configuration(entry).as_str(),
                    color_slug(entry.get("color")),
                );
                entry.set("mpn", mpn);
            }
            MpnRow {
                id: entry.id().to_string(),
                mpn: entry.get("mpn").to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entry;

    #[test]
    fn slugs() {
        assert_eq!(color_slug("Light Gray"), "LIGHTGRAY");
        assert_eq!(color_slug("Moss-Green!"), "MOSSGREEN");
        assert_eq!(color_slug(""), "TAUPE");
        assert_eq!(color_slug("  "), "TAUPE");
    }

    #[test]
    fn builds_and_keeps_mpns() {
        let mut entries = vec![
            entry(&[("id", "a"), ("title", "Alto 3 Seat Sofa"), ("color", "Light Gray")]),
            entry(&[("id", "b"), ("title", "Atlas Sectional"), ("mpn", "ARVA-ATLAS-SECTIONAL-SLATE")]),
            entry(&[("id", "c"), ("title", "Oris Loveseat"), ("mpn", "arva-oris")]),
            entry(&[("id", "d")]),
        ];
        let rows = run(&mut entries);

        assert_eq!(rows[0].mpn, "ARVA-ALTO-3SEAT-LIGHTGRAY");
        assert_eq!(rows[1].mpn, "ARVA-ATLAS-SECTIONAL-SLATE");
        assert_eq!(rows[2].mpn, "ARVA-ORIS-LOVESEAT-TAUPE");
        assert_eq!(rows[3].mpn, "ARVA-ATLAS-SOFA-TAUPE");
        assert_eq!(entries[0].get("mpn"), "ARVA-ALTO-3SEAT-LIGHTGRAY");
    }
}
