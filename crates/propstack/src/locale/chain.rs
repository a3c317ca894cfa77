//! Locale folder fallback chains.

use std::env;

use bon::bon;
use icu_locale_core::LanguageIdentifier;

use super::error::LocaleError;

/// Locale folders consulted when no list is configured, grouped by language
/// with each language's preferred region first.
pub const DEFAULT_AVAILABLE_LOCALES: &[&str] = &[
    "ar_EG", "ar_SA", "cs_CZ", "da_DK", "de_DE", "de_AT", "de_CH", "el_GR", "en_US", "en_GB",
    "en_AU", "en_CA", "es_ES", "es_MX", "es_AR", "fi_FI", "fr_FR", "fr_BE", "fr_CA", "fr_CH",
    "he_IL", "hu_HU", "it_IT", "it_CH", "ja_JP", "ko_KR", "nb_NO", "nl_NL", "nl_BE", "pl_PL",
    "pt_BR", "pt_PT", "ro_RO", "ru_RU", "sv_SE", "tr_TR", "uk_UA", "zh_CN", "zh_TW",
];

/// Variables consulted by [`LocaleFolderChain::from_env`], in order.
const LOCALE_VARIABLES: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Folder {
    name: String,
    language: String,
}

impl Folder {
    fn parse(locale: &str) -> Result<Self, LocaleError> {
        let id = locale
            .replace('_', "-")
            .parse::<LanguageIdentifier>()
            .map_err(|err| LocaleError::Invalid {
                locale: locale.to_string(),
                message: err.to_string(),
            })?;
        let language = id.language.as_str().to_string();
        let name = match id.region {
            Some(region) => format!("{language}_{}", region.as_str()),
            None => language.clone(),
        };
        Ok(Self { name, language })
    }
}

/// Ordered folder names tried when locating a locale-specific file.
///
/// For an active locale `fr_CA` with default `en_US` the chain is `fr_CA`,
/// then every other available `fr_*` folder, then `en_US`. When the active
/// locale shares the default's language only the exact and default folders
/// are tried.
///
/// # Example
///
/// ```
/// use propstack::LocaleFolderChain;
///
/// let chain = LocaleFolderChain::builder()
///     .locale("fr-CA")
///     .available_locales(vec!["fr_FR".to_string(), "de_DE".to_string()])
///     .build()
///     .unwrap();
/// assert_eq!(chain.folders(), ["fr_CA", "fr_FR", "en_US"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleFolderChain {
    folders: Vec<String>,
}

#[bon]
impl LocaleFolderChain {
    /// Build the chain for `locale`.
    ///
    /// Identifiers may use `_` or `-` separators. `available_locales`
    /// defaults to [`DEFAULT_AVAILABLE_LOCALES`].
    #[builder]
    pub fn new(
        #[builder(into)] locale: String,
        #[builder(into, default = "en_US".to_string())] default_locale: String,
        available_locales: Option<Vec<String>>,
    ) -> Result<Self, LocaleError> {
        let exact = Folder::parse(&locale)?;
        let default = Folder::parse(&default_locale)?;

        let mut folders = vec![exact.name.clone()];
        if exact.language != default.language {
            let available = match available_locales {
                Some(locales) => locales,
                None => DEFAULT_AVAILABLE_LOCALES
                    .iter()
                    .map(|locale| (*locale).to_string())
                    .collect(),
            };
            for candidate in available {
                let candidate = Folder::parse(&candidate)?;
                if candidate.language == exact.language
                    && candidate.name != default.name
                    && !folders.contains(&candidate.name)
                {
                    folders.push(candidate.name);
                }
            }
        }
        if !folders.contains(&default.name) {
            folders.push(default.name);
        }
        Ok(Self { folders })
    }

    /// Build the chain for the process locale.
    ///
    /// Uses the first non-empty of `LC_ALL`, `LC_MESSAGES` and `LANG`, with
    /// any encoding or modifier suffix removed. `C`, `POSIX` or no setting at
    /// all select the default locale.
    pub fn from_env() -> Result<Self, LocaleError> {
        match locale_from(|name| env::var(name).ok()) {
            Some(locale) => Self::builder().locale(locale).build(),
            None => Self::builder().locale("en_US").build(),
        }
    }

    /// All folders, most specific first.
    pub fn folders(&self) -> &[String] {
        &self.folders
    }

    /// The active locale's folder.
    pub fn current(&self) -> &str {
        &self.folders[0]
    }

    /// The last resort folder.
    pub fn default_folder(&self) -> &str {
        self.folders.last().map_or("", String::as_str)
    }
}

/// Extract a locale identifier from POSIX locale variables.
fn locale_from(var: impl Fn(&str) -> Option<String>) -> Option<String> {
    let value = LOCALE_VARIABLES
        .iter()
        .filter_map(|&name| var(name))
        .find(|value| !value.is_empty())?;
    let locale = value
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .trim();
    match locale {
        "" | "C" | "POSIX" => None,
        locale => Some(locale.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn chain(locale: &str, available: &[&str]) -> Vec<String> {
        LocaleFolderChain::builder()
            .locale(locale)
            .available_locales(available.iter().map(|s| (*s).to_string()).collect())
            .build()
            .unwrap()
            .folders
    }

    #[test]
    fn same_language_regions_come_between() {
        assert_eq!(
            chain("fr_CA", &["fr_FR", "en_US", "fr_CA", "fr_BE"]),
            vec!["fr_CA", "fr_FR", "fr_BE", "en_US"]
        );
    }

    #[test]
    fn default_language_skips_middle_step() {
        assert_eq!(chain("en_GB", &["en_AU", "en_CA"]), vec!["en_GB", "en_US"]);
    }

    #[test]
    fn default_locale_is_not_repeated() {
        assert_eq!(chain("en_US", &[]), vec!["en_US"]);
    }

    #[test]
    fn region_is_optional() {
        assert_eq!(chain("de", &["de_DE"]), vec!["de", "de_DE", "en_US"]);
    }

    #[test]
    fn builtin_table_is_used_by_default() {
        let chain = LocaleFolderChain::builder().locale("pt-PT").build().unwrap();
        assert_eq!(chain.folders(), ["pt_PT", "pt_BR", "en_US"]);
        assert_eq!(chain.current(), "pt_PT");
        assert_eq!(chain.default_folder(), "en_US");
    }

    #[test]
    fn custom_default_locale() {
        let chain = LocaleFolderChain::builder()
            .locale("es_MX")
            .default_locale("fr_FR")
            .available_locales(vec!["es_ES".to_string()])
            .build()
            .unwrap();
        assert_eq!(chain.folders(), ["es_MX", "es_ES", "fr_FR"]);
    }

    #[test]
    fn invalid_locale_is_an_error() {
        let err = LocaleFolderChain::builder().locale("not a locale").build();
        assert!(matches!(err, Err(LocaleError::Invalid { .. })));
    }

    #[test]
    fn env_variables_in_order() {
        let vars = HashMap::from([("LC_MESSAGES", "fr_CA.UTF-8"), ("LANG", "de_DE")]);
        let lookup = |name: &str| vars.get(name).map(|v| (*v).to_string());
        assert_eq!(locale_from(lookup).as_deref(), Some("fr_CA"));
    }

    #[test]
    fn env_modifiers_and_posix() {
        let with = |value: &'static str| {
            move |name: &str| (name == "LANG").then(|| value.to_string())
        };
        assert_eq!(locale_from(with("ca_ES@valencia")).as_deref(), Some("ca_ES"));
        assert_eq!(locale_from(with("C.UTF-8")), None);
        assert_eq!(locale_from(with("POSIX")), None);
        assert_eq!(locale_from(|_: &str| None), None);
    }
}
