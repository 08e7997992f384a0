//! Localized bot messages backed by Fluent.
//!
//! Message catalogs live in `locales/<lang>/main.ftl` and are compiled into
//! the binary. Lookups fall back to the default language, then to a
//! `Missing translation` marker.

use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource};
use tracing::warn;
use unic_langid::LanguageIdentifier;

const CATALOGS: &[(&str, &str)] = &[
    ("en", include_str!("../locales/en/main.ftl")),
    ("fr", include_str!("../locales/fr/main.ftl")),
];

/// Localization manager for the order bot
pub struct Localizer {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
    default_language: String,
}

impl Localizer {
    /// Load every bundled catalog. `default_language` must be one of them.
    pub fn new(default_language: &str) -> Result<Self> {
        Self::with_catalogs(default_language, CATALOGS)
    }

    fn with_catalogs(default_language: &str, catalogs: &[(&str, &str)]) -> Result<Self> {
        let mut bundles = HashMap::new();
        for (code, source) in catalogs {
            bundles.insert(code.to_string(), Self::create_bundle(code, source)?);
        }

        if !bundles.contains_key(default_language) {
            return Err(anyhow!("Unsupported default language: {default_language}"));
        }

        Ok(Self {
            bundles,
            default_language: default_language.to_string(),
        })
    }

    fn create_bundle(code: &str, source: &str) -> Result<FluentBundle<FluentResource>> {
        let locale: LanguageIdentifier = code
            .parse()
            .with_context(|| format!("Invalid locale identifier: {code}"))?;
        let mut bundle = FluentBundle::new_concurrent(vec![locale]);
        // Placeholders are substituted verbatim, without bidi isolation marks.
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow!("Failed to parse {code} catalog: {errors:?}"))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow!("Failed to load {code} catalog: {errors:?}"))?;

        Ok(bundle)
    }

    /// Languages with a catalog
    pub fn languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = self.bundles.keys().map(String::as_str).collect();
        languages.sort_unstable();
        languages
    }

    /// Bundles to search for a Telegram `language_code` such as `fr` or
    /// `en-US`, the default language last
    fn bundles_for(&self, language: Option<&str>) -> impl Iterator<Item = &FluentBundle<FluentResource>> {
        let requested = language
            .and_then(|code| code.parse::<LanguageIdentifier>().ok())
            .and_then(|locale| self.bundles.get(locale.language.as_str()));
        requested
            .into_iter()
            .chain(self.bundles.get(&self.default_language))
    }

    /// Get a localized message
    pub fn message(&self, key: &str, language: Option<&str>) -> String {
        self.format(key, language, None)
    }

    /// Get a localized message with simple string arguments
    pub fn message_with_args(&self, key: &str, language: Option<&str>, args: &[(&str, &str)]) -> String {
        let mut fluent_args = FluentArgs::new();
        for (name, value) in args {
            fluent_args.set(*name, *value);
        }
        self.format(key, language, Some(&fluent_args))
    }

    fn format(&self, key: &str, language: Option<&str>, args: Option<&FluentArgs>) -> String {
        let Some(pattern_and_bundle) = self
            .bundles_for(language)
            .find_map(|bundle| Some((bundle.get_message(key)?.value()?, bundle)))
        else {
            warn!(key, language = ?language, "Missing translation");
            return format!("Missing translation: {key}");
        };

        let (pattern, bundle) = pattern_and_bundle;
        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, args, &mut errors);
        if !errors.is_empty() {
            warn!(key, errors = ?errors, "Errors while formatting message");
        }
        value.into_owned()
    }
}
