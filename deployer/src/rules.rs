//! Per-path artifact property rules.
//!
//! A rule attaches extra properties to every artifact whose repository path
//! matches one of its include globs and none of its exclude globs. Globs use
//! Ant-style `**` to span directories. Rules are applied in order, so a
//! later rule overrides an earlier rule's value for the same key.
//!
//! The compact text form holds one rule per line:
//!
//! ```text
//! <include>,<include>:<exclude>,<exclude>:<key>=<value>,<key>=<value>
//! ```

use crate::artifact::ArtifactProperties;
use glob::{MatchOptions, Pattern, PatternError};
use thiserror::Error;

/// Errors raised while building property rules.
#[derive(Debug, Error)]
pub enum PropertyRuleError {
    /// A line did not have exactly three `:`-separated components.
    #[error(
        "Artifact properties must be configured in the form <includes>:<excludes>:<properties> (got '{line}')"
    )]
    MalformedLine {
        /// The offending line.
        line: String,
    },

    /// A property entry had no `=`.
    #[error("artifact property '{entry}' must be in the form <key>=<value>")]
    MalformedProperty {
        /// The offending entry.
        entry: String,
    },

    /// An include or exclude glob could not be compiled.
    #[error("invalid artifact properties pattern '{pattern}': {source}")]
    Pattern {
        /// The pattern text.
        pattern: String,
        /// The underlying parse error.
        #[source]
        source: PatternError,
    },
}

/// Result type for property rule construction.
pub type Result<T> = std::result::Result<T, PropertyRuleError>;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Include/exclude glob filter over repository paths.
///
/// # Examples
///
/// ```
/// use artifactory_deployer::rules::PathFilter;
///
/// let filter = PathFilter::new(&["/**/*.jar".to_owned()], &["/**/*-sources.jar".to_owned()])
///     .expect("valid patterns");
/// assert!(filter.is_match("/com/example/foo/1.0/foo-1.0.jar"));
/// assert!(!filter.is_match("/com/example/foo/1.0/foo-1.0-sources.jar"));
/// assert!(!filter.is_match("/com/example/foo/1.0/foo-1.0.pom"));
/// ```
#[derive(Debug, Clone)]
pub struct PathFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl PathFilter {
    /// Compile include and exclude globs.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyRuleError::Pattern`] if any glob is invalid.
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Returns true if `path` passes the filter.
    ///
    /// An empty include list admits every path.
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        let included = self.include.is_empty()
            || self
                .include
                .iter()
                .any(|pattern| pattern.matches_with(path, MATCH_OPTIONS));
        included
            && !self
                .exclude
                .iter()
                .any(|pattern| pattern.matches_with(path, MATCH_OPTIONS))
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|source| PropertyRuleError::Pattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

/// A filter plus the properties it contributes.
#[derive(Debug, Clone)]
pub struct PropertyRule {
    include: Vec<String>,
    exclude: Vec<String>,
    properties: ArtifactProperties,
    filter: PathFilter,
}

impl PropertyRule {
    /// Create a rule.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyRuleError::Pattern`] if any glob is invalid.
    pub fn new(
        include: Vec<String>,
        exclude: Vec<String>,
        properties: ArtifactProperties,
    ) -> Result<Self> {
        let filter = PathFilter::new(&include, &exclude)?;
        Ok(Self {
            include,
            exclude,
            properties,
            filter,
        })
    }

    /// Parse rules from the compact line form, skipping blank lines.
    ///
    /// # Errors
    ///
    /// Returns an error for a line without three components, a property
    /// without `=`, or an invalid glob.
    ///
    /// # Examples
    ///
    /// ```
    /// use artifactory_deployer::rules::PropertyRule;
    ///
    /// let rules = PropertyRule::parse_lines("one,two:three:a=alpha,b=bravo\n\n:x:c=charlie")
    ///     .expect("valid rules");
    /// assert_eq!(rules.len(), 2);
    /// assert_eq!(rules[0].include(), ["one", "two"]);
    /// assert_eq!(rules[1].properties().get("c"), Some("charlie"));
    /// ```
    pub fn parse_lines(text: &str) -> Result<Vec<Self>> {
        text.lines()
            .filter(|line| !line.is_empty())
            .map(Self::parse_line)
            .collect()
    }

    fn parse_line(line: &str) -> Result<Self> {
        let [include, exclude, properties] = line.split(':').collect::<Vec<_>>()[..] else {
            return Err(PropertyRuleError::MalformedLine {
                line: line.to_owned(),
            });
        };
        Self::new(
            comma_separated(include),
            comma_separated(exclude),
            key_values(properties)?,
        )
    }

    /// Include globs.
    #[must_use]
    pub fn include(&self) -> &[String] {
        &self.include
    }

    /// Exclude globs.
    #[must_use]
    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Properties contributed to matching paths.
    #[must_use]
    pub const fn properties(&self) -> &ArtifactProperties {
        &self.properties
    }

    /// Returns true if the rule applies to `path`.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.filter.is_match(path)
    }
}

fn comma_separated(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    text.split(',').map(str::to_owned).collect()
}

fn key_values(text: &str) -> Result<ArtifactProperties> {
    text.split(',')
        .map(|entry| {
            entry
                .split_once('=')
                .ok_or_else(|| PropertyRuleError::MalformedProperty {
                    entry: entry.to_owned(),
                })
        })
        .collect()
}
