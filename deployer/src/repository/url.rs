//! Request URL construction for deploy and build-info endpoints.

use crate::artifact::ArtifactProperties;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters escaped inside a path segment. `;` is escaped so that it can
/// only introduce a matrix parameter.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b';')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}')
    .add(b'/');

/// Characters escaped inside a matrix parameter key or value.
const MATRIX: &AsciiSet = &SEGMENT.add(b'=').add(b'&').add(b'+');

/// Characters escaped inside a query parameter value.
const QUERY: &AsciiSet = &MATRIX.add(b'\'');

/// Normalise a server base URI so that paths can be appended directly.
#[must_use]
pub fn base_uri(uri: &str) -> String {
    if uri.ends_with('/') {
        uri.to_owned()
    } else {
        format!("{uri}/")
    }
}

/// URL of an artifact in a repository, including matrix parameters.
///
/// `base` must end with `/` and `path` must start with `/`.
///
/// # Examples
///
/// ```
/// use artifactory_deployer::artifact::ArtifactProperties;
/// use artifactory_deployer::repository::url::artifact_url;
///
/// let properties: ArtifactProperties =
///     [("buildNumber", "1"), ("revision", "123")].into_iter().collect();
/// assert_eq!(
///     artifact_url("https://repo.example.com/", "libs-snapshot-local", "/foo/bar.jar", &properties),
///     "https://repo.example.com/libs-snapshot-local/foo/bar.jar;buildNumber=1;revision=123",
/// );
/// ```
#[must_use]
pub fn artifact_url(
    base: &str,
    repository: &str,
    path: &str,
    properties: &ArtifactProperties,
) -> String {
    let mut url = String::from(base);
    url.extend(utf8_percent_encode(repository, SEGMENT));
    for segment in path.split('/').skip(1) {
        url.push('/');
        url.extend(utf8_percent_encode(segment, SEGMENT));
    }
    for (key, value) in properties.iter() {
        url.push(';');
        url.extend(utf8_percent_encode(key, MATRIX));
        url.push('=');
        url.extend(utf8_percent_encode(value, MATRIX));
    }
    url
}

/// URL of the build-info endpoint, optionally scoped to a project.
///
/// # Examples
///
/// ```
/// use artifactory_deployer::repository::url::build_url;
///
/// assert_eq!(build_url("https://repo.example.com/", None), "https://repo.example.com/api/build");
/// assert_eq!(
///     build_url("https://repo.example.com/", Some("my-project")),
///     "https://repo.example.com/api/build?project=my-project",
/// );
/// ```
#[must_use]
pub fn build_url(base: &str, project: Option<&str>) -> String {
    let mut url = format!("{base}api/build");
    if let Some(project) = project.filter(|project| !project.trim().is_empty()) {
        url.push_str("?project=");
        url.extend(utf8_percent_encode(project, QUERY));
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://repo.example.com", "https://repo.example.com/")]
    #[case("https://repo.example.com/", "https://repo.example.com/")]
    #[case("https://example.com/artifactory", "https://example.com/artifactory/")]
    fn base_uri_always_ends_with_slash(#[case] uri: &str, #[case] expected: &str) {
        assert_eq!(base_uri(uri), expected);
    }

    #[test]
    fn artifact_url_without_properties() {
        assert_eq!(
            artifact_url(
                "https://repo.example.com/",
                "libs-snapshot-local",
                "/foo/bar.jar",
                &ArtifactProperties::new()
            ),
            "https://repo.example.com/libs-snapshot-local/foo/bar.jar"
        );
    }

    #[test]
    fn artifact_url_escapes_reserved_characters() {
        let properties: ArtifactProperties =
            [("build.name", "my build"), ("vcs", "a=b;c")].into_iter().collect();
        assert_eq!(
            artifact_url("https://r/", "libs", "/a b/c;d.jar", &properties),
            "https://r/libs/a%20b/c%3Bd.jar;build.name=my%20build;vcs=a%3Db%3Bc"
        );
    }

    #[test]
    fn matrix_values_keep_commas_for_multi_value_properties() {
        let properties: ArtifactProperties = [("tags", "x,y")].into_iter().collect();
        assert_eq!(
            artifact_url("https://r/", "libs", "/a.jar", &properties),
            "https://r/libs/a.jar;tags=x,y"
        );
    }

    #[rstest]
    #[case(Some(""), "https://r/api/build")]
    #[case(Some("  "), "https://r/api/build")]
    #[case(Some("team a"), "https://r/api/build?project=team%20a")]
    fn build_url_ignores_blank_projects(#[case] project: Option<&str>, #[case] expected: &str) {
        assert_eq!(build_url("https://r/", project), expected);
    }
}
