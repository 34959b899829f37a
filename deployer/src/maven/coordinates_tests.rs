//! Unit tests for Maven coordinate parsing.

use super::*;
use rstest::rstest;

#[test]
fn parses_release_jar() {
    let coordinates =
        Coordinates::from_path("/com/example/foo/1.0.0/foo-1.0.0.jar").expect("maven layout");

    assert_eq!(coordinates.group_id(), "com.example");
    assert_eq!(coordinates.artifact_id(), "foo");
    assert_eq!(coordinates.version(), "1.0.0");
    assert_eq!(coordinates.classifier(), None);
    assert_eq!(coordinates.extension(), "jar");
    assert_eq!(coordinates.version_kind(), VersionKind::Release);
    assert_eq!(coordinates.snapshot_version(), None);
    assert_eq!(coordinates.module_id(), "com.example:foo:1.0.0");
}

#[test]
fn parsing_is_idempotent() {
    let path = "/com/example/foo/1.0.0/foo-1.0.0-javadoc.jar";
    assert_eq!(Coordinates::from_path(path), Coordinates::from_path(path));
}

#[test]
fn parses_literal_snapshot() {
    let coordinates =
        Coordinates::from_path("/com/example/foo/1.0.0-SNAPSHOT/foo-1.0.0-SNAPSHOT.pom")
            .expect("maven layout");

    assert_eq!(coordinates.version(), "1.0.0-SNAPSHOT");
    assert_eq!(coordinates.version_kind(), VersionKind::Snapshot);
    assert_eq!(coordinates.extension(), "pom");
    assert_eq!(coordinates.snapshot_version(), None);
}

#[test]
fn parses_timestamped_snapshot() {
    let coordinates =
        Coordinates::from_path("/com/example/foo/1.0.0-SNAPSHOT/foo-1.0.0-20240305.110926-12.jar")
            .expect("maven layout");

    assert_eq!(coordinates.version(), "1.0.0-SNAPSHOT");
    assert_eq!(coordinates.version_kind(), VersionKind::TimestampedSnapshot);
    assert_eq!(
        coordinates.snapshot_version(),
        Some("1.0.0-20240305.110926-12")
    );
    assert_eq!(coordinates.classifier(), None);
    assert_eq!(coordinates.extension(), "jar");
}

#[rstest]
#[case::sources("/com/example/foo/1.0.0/foo-1.0.0-sources.jar", Some("sources"), "jar")]
#[case::signature("/com/example/foo/1.0.0/foo-1.0.0.jar.asc", None, "asc")]
#[case::classified_signature(
    "/com/example/foo/1.0.0/foo-1.0.0-javadoc.jar.asc",
    Some("javadoc"),
    "asc"
)]
#[case::pom_checksum("/com/example/foo/1.0.0/foo-1.0.0.pom.sha1", None, "sha1")]
#[case::no_leading_slash("org/acme/bar/2.1/bar-2.1-tests.zip", Some("tests"), "zip")]
fn extracts_classifier_and_final_extension(
    #[case] path: &str,
    #[case] classifier: Option<&str>,
    #[case] extension: &str,
) {
    let coordinates = Coordinates::from_path(path).expect("maven layout");
    assert_eq!(coordinates.classifier(), classifier);
    assert_eq!(coordinates.extension(), extension);
}

#[test]
fn deep_group_segments_are_joined_with_dots() {
    let coordinates = Coordinates::from_path(
        "/org/springframework/boot/spring-boot/3.2.0/spring-boot-3.2.0.jar",
    )
    .expect("maven layout");
    assert_eq!(coordinates.group_id(), "org.springframework.boot");
    assert_eq!(coordinates.artifact_id(), "spring-boot");
}

#[rstest]
#[case::flat_file("/foo-1.0.0.zip")]
#[case::missing_group("/foo/1.0.0/foo-1.0.0.jar")]
#[case::wrong_artifact_prefix("/com/example/foo/1.0.0/bar-1.0.0.jar")]
#[case::wrong_version("/com/example/foo/1.0.0/foo-2.0.0.jar")]
#[case::no_extension("/com/example/foo/1.0.0/foo-1.0.0")]
#[case::trailing_dot("/com/example/foo/1.0.0/foo-1.0.0.")]
#[case::junk_after_version("/com/example/foo/1.0.0/foo-1.0.0x.jar")]
#[case::empty_classifier("/com/example/foo/1.0.0/foo-1.0.0-.jar")]
#[case::non_numeric_build("/com/example/foo/1.0.0-SNAPSHOT/foo-1.0.0-20240305.110926-x.jar")]
#[case::short_timestamp("/com/example/foo/1.0.0-SNAPSHOT/foo-1.0.0-2024035.110926-1.jar")]
#[case::compound_trailing_dot("/com/example/foo/1.0.0/foo-1.0.0.jar.bak.")]
#[case::empty("")]
fn unrecognised_layouts_have_no_coordinates(#[case] path: &str) {
    assert_eq!(Coordinates::from_path(path), None, "path: {path}");
}

#[test]
fn timestamp_on_release_folder_is_treated_as_classifier() {
    let coordinates =
        Coordinates::from_path("/com/example/foo/1.0.0/foo-1.0.0-20240305.110926-1.jar")
            .expect("maven layout");
    assert_eq!(coordinates.version_kind(), VersionKind::Release);
    assert_eq!(coordinates.classifier(), Some("20240305"));
}

#[test]
fn display_includes_classifier_and_extension() {
    let coordinates = Coordinates::from_path("/com/example/foo/1.0.0/foo-1.0.0-sources.jar")
        .expect("maven layout");
    assert_eq!(coordinates.to_string(), "com.example:foo:1.0.0:sources@jar");
}
