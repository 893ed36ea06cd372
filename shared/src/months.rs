use std::collections::HashSet;
use std::sync::LazyLock;

use crate::colors::{NEUTRAL_COLOR, TIER_COUNT, parse_hex_color, tier_ramp};

/// One month of the challenge: a set of countries sharing a color ramp.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthConfig {
    pub name: String,
    pub countries: HashSet<String>,
    /// Palest first; index 4 is the month's full color.
    pub tier_colors: [String; TIER_COUNT],
}

impl MonthConfig {
    pub fn new<I, S>(name: &str, countries: I, tier_colors: [String; TIER_COUNT]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            countries: countries.into_iter().map(Into::into).collect(),
            tier_colors,
        }
    }

    /// Build a month whose tiers are derived from a single base color.
    pub fn from_base_color<I, S>(name: &str, base_hex: &str, countries: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let base = parse_hex_color(base_hex)?;
        Some(Self::new(name, countries, tier_ramp(base)))
    }

    pub fn contains(&self, iso3: &str) -> bool {
        self.countries.contains(iso3)
    }

    /// Color for a tier in `1..=5`; out-of-range tiers are clamped.
    pub fn tier_color(&self, tier: u8) -> &str {
        let index = usize::from(tier.clamp(1, TIER_COUNT as u8)) - 1;
        &self.tier_colors[index]
    }

    pub fn full_color(&self) -> &str {
        &self.tier_colors[TIER_COUNT - 1]
    }
}

const MONTH_TABLE: &[(&str, &str, &[&str])] = &[
    (
        "Janeiro",
        "#FF1744",
        &[
            "BRA", "GUF", "SUR", "GUY", "VEN", "COL", "ECU", "PER", "BOL", "CHL", "PRY", "ARG",
            "URY",
        ],
    ),
    (
        "Fevereiro",
        "#00E5FF",
        &[
            "CHN", "JPN", "KOR", "PRK", "PHL", "IDN", "BTN", "MNG", "LAO", "NPL", "VNM", "BRN",
            "MYS", "TLS", "KAZ", "KHM", "THA", "MMR", "SGP", "TWN",
        ],
    ),
    (
        "Março",
        "#FFD600",
        &["PRT", "ESP", "FRA", "AND", "MCO", "ITA", "MLT", "VAT", "SMR"],
    ),
    (
        "Abril",
        "#00E676",
        &[
            "GNQ", "GAB", "COG", "COD", "UGA", "KEN", "RWA", "BDI", "TZA", "AGO", "ZMB", "MWI",
            "MOZ", "ZWE", "BWA", "NAM", "ZAF", "LSO", "SWZ", "MDG", "STP", "MUS", "SYC", "COM",
        ],
    ),
    (
        "Maio",
        "#FF6F00",
        &[
            "GTM", "BLZ", "SLV", "HND", "NIC", "CRI", "PAN", "BHS", "CUB", "JAM", "HTI", "DOM",
            "PRI", "KNA", "ATG", "MSR", "DMA", "LCA", "BRB", "GRD", "TTO", "VCT",
        ],
    ),
    (
        "Junho",
        "#D500F9",
        &["GBR", "IRL", "ISL", "NOR", "SWE", "FIN"],
    ),
    ("Julho", "#2979FF", &["USA", "CAN", "MEX", "GRL"]),
    (
        "Agosto",
        "#FF4081",
        &[
            "AUS", "PNG", "NZL", "FJI", "SLB", "VUT", "WSM", "KIR", "TON", "FSM", "PLW", "MHL",
            "NRU", "TUV",
        ],
    ),
    (
        "Setembro",
        "#1DE9B6",
        &[
            "CHE", "BEL", "LUX", "NLD", "DEU", "DNK", "POL", "CZE", "AUT", "LIE",
        ],
    ),
    (
        "Outubro",
        "#FF9100",
        &[
            "SVK", "HUN", "SVN", "HRV", "BIH", "MNE", "SRB", "ALB", "GRC", "MKD", "BGR", "ROU",
            "MDA", "UKR", "BLR", "LTU", "LVA", "EST", "RUS",
        ],
    ),
    (
        "Novembro",
        "#651FFF",
        &[
            "MAR", "DZA", "TUN", "ESH", "MRT", "SEN", "GMB", "GNB", "GIN", "SLE", "LBR", "CIV",
            "MLI", "BFA", "GHA", "TGO", "BEN", "NER", "NGA", "LBY", "TCD", "CMR", "CAF", "EGY",
            "SDN", "SSD", "ETH", "SOM", "ERI", "DJI", "CPV",
        ],
    ),
    (
        "Dezembro",
        "#F50057",
        &[
            "TUR", "CYP", "LBN", "ISR", "PSE", "JOR", "SYR", "IRQ", "IRN", "GEO", "ARM", "AZE",
            "TKM", "UZB", "AFG", "TJK", "KGZ", "PAK", "SAU", "KWT", "BHR", "QAT", "ARE", "OMN",
            "YEM", "IND", "LKA", "MDV", "BGD",
        ],
    ),
];

/// The challenge calendar, built once on first use.
pub static MONTHS: LazyLock<Vec<MonthConfig>> = LazyLock::new(|| {
    MONTH_TABLE
        .iter()
        .map(|(name, base, countries)| {
            MonthConfig::from_base_color(name, base, countries.iter().copied()).unwrap_or_else(
                || MonthConfig::new(name, countries.iter().copied(), neutral_ramp()),
            )
        })
        .collect()
});

fn neutral_ramp() -> [String; TIER_COUNT] {
    std::array::from_fn(|_| NEUTRAL_COLOR.to_string())
}

pub fn month_of(iso3: &str) -> Option<&'static MonthConfig> {
    MONTHS.iter().find(|month| month.contains(iso3))
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub name: String,
    pub swatch: String,
    pub country_count: usize,
}

impl LegendEntry {
    pub fn count_label(&self) -> String {
        if self.country_count == 1 {
            "1 país".to_string()
        } else {
            format!("{} países", self.country_count)
        }
    }
}

/// Legend rows in calendar order, each with the month's full color.
pub fn legend(palette: &[MonthConfig]) -> Vec<LegendEntry> {
    palette
        .iter()
        .map(|month| LegendEntry {
            name: month.name.clone(),
            swatch: month.full_color().to_string(),
            country_count: month.countries.len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twelve_months_in_calendar_order() {
        let names: Vec<&str> = MONTHS.iter().map(|month| month.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Janeiro",
                "Fevereiro",
                "Março",
                "Abril",
                "Maio",
                "Junho",
                "Julho",
                "Agosto",
                "Setembro",
                "Outubro",
                "Novembro",
                "Dezembro"
            ]
        );
    }

    #[test]
    fn months_partition_countries() {
        let mut seen = HashSet::new();
        for (name, _, countries) in MONTH_TABLE {
            assert!(!countries.is_empty(), "{name} has no countries");
            for iso in *countries {
                assert_eq!(iso.len(), 3, "{iso} in {name}");
                assert!(iso.chars().all(|c| c.is_ascii_uppercase()), "{iso} in {name}");
                assert!(seen.insert(*iso), "{iso} appears in more than one month");
            }
        }
    }

    #[test]
    fn base_colors_are_valid_and_become_tier_five() {
        for (month, (_, base, _)) in MONTHS.iter().zip(MONTH_TABLE) {
            assert!(parse_hex_color(base).is_some(), "{base}");
            assert_eq!(month.full_color(), *base);
        }
    }

    #[test]
    fn month_lookup_by_country() {
        assert_eq!(month_of("BRA").map(|m| m.name.as_str()), Some("Janeiro"));
        assert_eq!(month_of("USA").map(|m| m.name.as_str()), Some("Julho"));
        assert_eq!(month_of("JPN").map(|m| m.name.as_str()), Some("Fevereiro"));
        assert!(month_of("XXX").is_none());
        assert!(month_of("").is_none());
    }

    #[test]
    fn tier_color_clamps_out_of_range_tiers() {
        let janeiro = &MONTHS[0];
        assert_eq!(janeiro.tier_color(0), janeiro.tier_colors[0]);
        assert_eq!(janeiro.tier_color(9), janeiro.full_color());
    }

    #[test]
    fn legend_lists_every_month_with_counts() {
        let rows = legend(&MONTHS);
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].name, "Janeiro");
        assert_eq!(rows[0].swatch, "#FF1744");
        assert_eq!(rows[0].country_count, 13);
        assert_eq!(rows[0].count_label(), "13 países");
        assert_eq!(rows[6].country_count, 4);
    }
}
