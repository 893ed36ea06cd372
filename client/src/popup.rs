use reading_map_shared::{CountryReading, MonthConfig, ReadingsResponse, display_name, tier_label};

use crate::fetch::FetchError;
use crate::renderer::ScreenPoint;

pub const LOADING_TEXT: &str = "Carregando leituras...";
pub const EMPTY_TEXT: &str = "Nenhuma leitura registrada ainda.";
pub const ERROR_TEXT: &str = "Não foi possível carregar as leituras.";

/// The country detail popup. Opened loading, then filled once by the
/// readings request for its country.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupState {
    pub iso3: String,
    pub display_name: String,
    pub anchor: ScreenPoint,
    pub readers: Vec<CountryReading>,
    pub loading: bool,
    pub error: Option<String>,
}

impl PopupState {
    pub fn open(iso3: &str, anchor: ScreenPoint) -> Self {
        Self {
            iso3: iso3.to_string(),
            display_name: display_name(iso3).to_string(),
            anchor,
            readers: Vec::new(),
            loading: true,
            error: None,
        }
    }

    pub fn resolve(&mut self, result: Result<ReadingsResponse, FetchError>) {
        self.loading = false;
        match result {
            Ok(response) => {
                self.readers = response.readings;
                self.error = None;
            }
            Err(e) => {
                self.readers.clear();
                self.error = Some(e.to_string());
            }
        }
    }

    /// Status line shown instead of the reader list, if any.
    pub fn status_text(&self) -> Option<&'static str> {
        if self.loading {
            Some(LOADING_TEXT)
        } else if self.error.is_some() {
            Some(ERROR_TEXT)
        } else if self.readers.is_empty() {
            Some(EMPTY_TEXT)
        } else {
            None
        }
    }
}

/// Tooltip content for a hovered country with known progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverInfo {
    pub iso3: String,
    pub name: String,
    pub month: Option<String>,
    pub progress: i32,
    pub tier_label: &'static str,
}

impl HoverInfo {
    pub fn new(iso3: &str, progress: i32, palette: &[MonthConfig]) -> Self {
        Self {
            iso3: iso3.to_string(),
            name: display_name(iso3).to_string(),
            month: palette
                .iter()
                .find(|month| month.contains(iso3))
                .map(|month| month.name.clone()),
            progress,
            tier_label: tier_label(progress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(user: &str) -> CountryReading {
        CountryReading {
            user: user.to_string(),
            avatar_url: None,
            cover_url: None,
            book: "Ensaio sobre a Cegueira".to_string(),
            progress: 55,
        }
    }

    #[test]
    fn opens_loading_with_display_name() {
        let popup = PopupState::open("PRT", ScreenPoint::new(10.0, 20.0));
        assert_eq!(popup.display_name, "Portugal");
        assert!(popup.loading);
        assert_eq!(popup.status_text(), Some(LOADING_TEXT));
    }

    #[test]
    fn resolves_with_readers_or_error() {
        let mut popup = PopupState::open("PRT", ScreenPoint::new(0.0, 0.0));
        popup.resolve(Ok(ReadingsResponse {
            readings: vec![reading("ana"), reading("rui")],
        }));
        assert!(!popup.loading);
        assert_eq!(popup.readers.len(), 2);
        assert_eq!(popup.status_text(), None);

        popup.resolve(Err(FetchError::Timeout {
            url: "http://api.test/readings/PRT".to_string(),
            after: std::time::Duration::from_secs(10),
        }));
        assert!(popup.readers.is_empty());
        assert_eq!(popup.status_text(), Some(ERROR_TEXT));
    }

    #[test]
    fn empty_readings_show_empty_text() {
        let mut popup = PopupState::open("ZZZ", ScreenPoint::new(0.0, 0.0));
        assert_eq!(popup.display_name, "ZZZ");
        popup.resolve(Ok(ReadingsResponse::default()));
        assert_eq!(popup.status_text(), Some(EMPTY_TEXT));
    }

    #[test]
    fn hover_info_carries_month_and_tier() {
        let hover = HoverInfo::new("BRA", 25, &reading_map_shared::MONTHS);
        assert_eq!(hover.name, "Brasil");
        assert_eq!(hover.month.as_deref(), Some("Janeiro"));
        assert_eq!(hover.tier_label, "Em Progresso (21-40%)");
    }
}
