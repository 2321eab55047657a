use super::*;

/// Regular expression that pulls an identifying label out of element text,
/// e.g. `^(.+?),\s*\d+ seasons$` on `"Dark, 3 seasons"` yields `"Dark"`.
#[derive(Debug, Clone)]
pub struct LabelPattern {
    source: String,
    backend: fancy_regex::Regex,
}

impl LabelPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let backend =
            fancy_regex::Regex::new(pattern).map_err(|err| Error::Pattern(err.to_string()))?;
        Ok(Self {
            source: pattern.to_string(),
            backend,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// First capture group if the pattern has one, else the whole match.
    pub fn extract(&self, text: &str) -> Result<Option<String>> {
        let captures = self
            .backend
            .captures(text)
            .map_err(|err| Error::Pattern(err.to_string()))?;
        Ok(captures.and_then(|captures| {
            captures
                .get(1)
                .or_else(|| captures.get(0))
                .map(|matched| matched.as_str().to_string())
        }))
    }

    pub fn is_match(&self, text: &str) -> Result<bool> {
        self.backend
            .is_match(text)
            .map_err(|err| Error::Pattern(err.to_string()))
    }
}

impl PartialEq for LabelPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for LabelPattern {}
