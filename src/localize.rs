use i18n_embed::LanguageLoader;
use i18n_embed::fluent::FluentLanguageLoader;
use i18n_embed::unic_langid::LanguageIdentifier;
use rust_embed::RustEmbed;

use crate::core::settings::Language;

#[derive(RustEmbed)]
#[folder = "i18n/"]
struct Localizations;

const DOMAIN: &str = "picklist";

/// Fluent strings for one of the supported languages.
pub struct Localizer {
    loader: FluentLanguageLoader,
}

impl Localizer {
    pub fn new(language: Language) -> Self {
        let fallback: LanguageIdentifier = Language::En.code().parse().unwrap_or_default();
        let loader = FluentLanguageLoader::new(DOMAIN, fallback);
        if let Err(e) = loader.load_fallback_language(&Localizations) {
            log::error!("Failed to load fallback strings: {}", e);
        }

        let requested: Vec<LanguageIdentifier> = language.code().parse().into_iter().collect();
        if let Err(e) = i18n_embed::select(&loader, &Localizations, &requested) {
            log::error!("Failed to load {} strings: {}", language.code(), e);
        }

        Self { loader }
    }

    pub fn text(&self, id: &str) -> String {
        self.loader.get(id)
    }

    /// Long month name, `month` in 1..=12.
    pub fn month_name(&self, month: u32) -> String {
        self.text(&format!("month-{}", month))
    }

    /// Short weekday name, 0 = Sunday.
    pub fn weekday_short(&self, days_from_sunday: u32) -> String {
        self.text(&format!("weekday-{}", days_from_sunday % 7))
    }

    pub fn month_title(&self, year: i32, month: u32) -> String {
        format!("{} {}", self.month_name(month), year)
    }
}
