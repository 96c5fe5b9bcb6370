pub mod audit;
pub mod images;
pub mod labels;
pub mod material;
pub mod mpn;

use crate::model::CatalogEntry;

/// Product line, derived from the title or the item group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductLine {
    Atlas,
    Alto,
    Oris,
}

impl ProductLine {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Atlas => "ATLAS",
            Self::Alto => "ALTO",
            Self::Oris => "ORIS",
        }
    }
}

/// Seating configuration, derived from the title or the item group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Configuration {
    Sectional,
    ThreeSeat,
    Loveseat,
    Sofa,
}

impl Configuration {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sectional => "SECTIONAL",
            Self::ThreeSeat => "3SEAT",
            Self::Loveseat => "LOVESEAT",
            Self::Sofa => "SOFA",
        }
    }
}

pub fn product_line(entry: &CatalogEntry) -> ProductLine {
    let title = entry.get("title");
    let group = entry.get("item_group_id");
    for (name, line) in [
        ("Atlas", ProductLine::Atlas),
        ("Alto", ProductLine::Alto),
        ("Oris", ProductLine::Oris),
    ] {
        if title.contains(name) || group.starts_with(&name.to_lowercase()) {
            return line;
        }
    }
    ProductLine::Atlas
}

pub fn configuration(entry: &CatalogEntry) -> Configuration {
    let title = entry.get("title").to_lowercase();
    let group = entry.get("item_group_id").to_lowercase();
    if title.contains("sectional") || group.contains("sectional") {
        Configuration::Sectional
    } else if title.contains("3 seat") || group.contains("3-seat") || group.contains("3seater") {
        Configuration::ThreeSeat
    } else if title.contains("loveseat") || group.contains("loveseat") {
        Configuration::Loveseat
    } else {
        Configuration::Sofa
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entry;

    #[test]
    fn line_from_title_or_group() {
        assert_eq!(product_line(&entry(&[("title", "Oris Loveseat")])), ProductLine::Oris);
        assert_eq!(product_line(&entry(&[("item_group_id", "alto-3seat")])), ProductLine::Alto);
        assert_eq!(product_line(&entry(&[("title", "Mystery Sofa")])), ProductLine::Atlas);
        // Title match is case-sensitive; group match is on the lowercase prefix
        assert_eq!(product_line(&entry(&[("title", "oris chair")])), ProductLine::Atlas);
    }

    #[test]
    fn configuration_precedence() {
        assert_eq!(
            configuration(&entry(&[("title", "Atlas Sectional Loveseat")])),
            Configuration::Sectional
        );
        assert_eq!(
            configuration(&entry(&[("title", "Alto 3 Seat Sofa")])),
            Configuration::ThreeSeat
        );
        assert_eq!(
            configuration(&entry(&[("item_group_id", "alto-3seater")])),
            Configuration::ThreeSeat
        );
        assert_eq!(configuration(&entry(&[("title", "Oris Loveseat")])), Configuration::Loveseat);
        assert_eq!(configuration(&entry(&[("title", "Atlas Sofa")])), Configuration::Sofa);
    }
}
