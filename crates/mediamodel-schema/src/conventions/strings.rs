//! Text column width defaults.

use std::sync::{OnceLock, RwLock};

use regex::Regex;

use mediamodel_core::{Error, PropertyDescriptor, PropertyType, Result};

use crate::convention::TypeConvention;

/// Thread-safe cache of compiled name patterns.
///
/// One convention instance exists per build, but hosts may rebuild models
/// repeatedly; compiling the pattern once per process is enough.
struct RegexCache {
    cache: RwLock<std::collections::HashMap<String, Regex>>,
}

impl RegexCache {
    fn new() -> Self {
        Self {
            cache: RwLock::new(std::collections::HashMap::new()),
        }
    }

    fn get_or_compile(&self, pattern: &str) -> Result<Regex> {
        {
            let cache = self.cache.read().unwrap();
            if let Some(regex) = cache.get(pattern) {
                return Ok(regex.clone());
            }
        }

        let regex = Regex::new(pattern)
            .map_err(|e| Error::configuration(format!("invalid name pattern '{pattern}': {e}")))?;
        {
            let mut cache = self.cache.write().unwrap();
            cache.insert(pattern.to_string(), regex.clone());
        }
        Ok(regex)
    }
}

fn regex_cache() -> &'static RegexCache {
    static CACHE: OnceLock<RegexCache> = OnceLock::new();
    CACHE.get_or_init(RegexCache::new)
}

/// Default Unicode-name pattern: columns holding native-script titles.
pub const DEFAULT_UNICODE_NAME_PATTERN: &str = "(?i)(native|original|japanese)";

/// Maps every text property as non-Unicode (varchar) unless its name
/// matches the Unicode-name pattern, in which case it stays Unicode
/// (nvarchar) to hold native-script strings.
#[derive(Debug)]
pub struct StringColumnConvention {
    pattern: String,
}

impl StringColumnConvention {
    /// Convention with the default native-script name pattern.
    #[must_use]
    pub fn new() -> Self {
        Self::with_pattern(DEFAULT_UNICODE_NAME_PATTERN)
    }

    /// Convention with a caller-supplied name pattern.
    #[must_use]
    pub fn with_pattern(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }
}

impl Default for StringColumnConvention {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeConvention for StringColumnConvention {
    fn name(&self) -> &'static str {
        "string_column"
    }

    fn configure_property(
        &self,
        _entity_name: &str,
        property: &mut PropertyDescriptor,
    ) -> Result<()> {
        if property.declared_type != PropertyType::Text {
            return Ok(());
        }
        let regex = regex_cache().get_or_compile(&self.pattern)?;
        property.unicode = regex.is_match(&property.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_property(name: &str) -> PropertyDescriptor {
        PropertyDescriptor::new(name, PropertyType::Text)
    }

    #[test]
    fn test_plain_text_columns_become_non_unicode() {
        let convention = StringColumnConvention::new();
        let mut property = text_property("romaji_title");
        convention
            .configure_property("anime_title", &mut property)
            .unwrap();
        assert!(!property.unicode);
    }

    #[test]
    fn test_native_script_columns_stay_unicode() {
        let convention = StringColumnConvention::new();
        for name in ["native_name", "original_title", "Japanese_title"] {
            let mut property = text_property(name);
            convention
                .configure_property("anime_title", &mut property)
                .unwrap();
            assert!(property.unicode, "{name} should stay Unicode");
        }
    }

    #[test]
    fn test_non_text_columns_are_untouched() {
        let convention = StringColumnConvention::new();
        let mut property = PropertyDescriptor::new("native_count", PropertyType::Int);
        convention
            .configure_property("anime", &mut property)
            .unwrap();
        assert!(property.unicode);
    }

    #[test]
    fn test_invalid_pattern_is_a_configuration_error() {
        let convention = StringColumnConvention::with_pattern("(unclosed");
        let mut property = text_property("title");
        let err = convention
            .configure_property("anime", &mut property)
            .unwrap_err();
        assert!(err.is_configuration());
    }
}
