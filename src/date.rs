//! Localized date labels for the shop header and the caption.
//!
//! The configured language tag picks a chrono [`Locale`]; the label is the
//! day without zero padding, the localized month name and the year
//! (`18 October 2026`, `18 Oktober 2026`, …). Unsupported tags fall back to
//! English with a warning.

use chrono::{Local, Locale, NaiveDate, NaiveTime};

const LABEL_FORMAT: &str = "%-d %B %Y";

/// Language tags the catalog API accepts, and the locale used to label dates.
const LOCALES: &[(&str, Locale)] = &[
    ("en", Locale::en_US),
    ("ar", Locale::ar_SA),
    ("de", Locale::de_DE),
    ("es", Locale::es_ES),
    ("es-419", Locale::es_MX),
    ("fr", Locale::fr_FR),
    ("it", Locale::it_IT),
    ("ja", Locale::ja_JP),
    ("ko", Locale::ko_KR),
    ("pl", Locale::pl_PL),
    ("pt-br", Locale::pt_BR),
    ("ru", Locale::ru_RU),
    ("tr", Locale::tr_TR),
    ("zh-cn", Locale::zh_CN),
    ("zh-hant", Locale::zh_TW),
];

/// Locale for a language tag. Case and `_`/`-` are ignored; a tag with an
/// unknown region falls back to its primary language (`en-GB` → `en`).
pub fn locale_for(tag: &str) -> Option<Locale> {
    let normalized = tag.trim().to_ascii_lowercase().replace('_', "-");
    let find = |key: &str| {
        LOCALES
            .iter()
            .find(|(known, _)| *known == key)
            .map(|(_, locale)| *locale)
    };
    find(&normalized).or_else(|| {
        let (primary, _) = normalized.split_once('-')?;
        find(primary)
    })
}

#[derive(Debug, Clone, Copy)]
pub struct DateLabeler {
    locale: Locale,
}

impl DateLabeler {
    pub fn new(language: &str) -> Self {
        let locale = locale_for(language).unwrap_or_else(|| {
            tracing::warn!(language, "unsupported language for dates, using English");
            Locale::en_US
        });
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn label(&self, date: NaiveDate) -> String {
        date.and_time(NaiveTime::MIN)
            .and_utc()
            .format_localized(LABEL_FORMAT, self.locale)
            .to_string()
    }

    /// Label for the local calendar date.
    pub fn today(&self) -> String {
        self.label(Local::now().date_naive())
    }
}
