// tests/endpoint_tests.rs
mod common;

use std::path::{Path, PathBuf};

use syncbuddy::endpoint::{has_ciphertext_marker, split_token};
use syncbuddy::{resolve_endpoint, SyncError};

#[test]
fn tokens_split_at_first_colon() {
    assert_eq!(split_token("laptop"), ("laptop", None));
    assert_eq!(split_token("laptop:"), ("laptop", None));
    assert_eq!(split_token("laptop:a/b:c"), ("laptop", Some("a/b:c")));
}

#[test]
fn plain_location_token_resolves_without_pick() {
    let config = common::fixture_config(Path::new("/srv/sync"));
    let endpoint = resolve_endpoint("usb", &config).unwrap();

    assert_eq!(endpoint.location.name, "usb");
    assert!(!endpoint.is_pick());
    assert!(!endpoint.already_encrypted);
}

#[test]
fn picked_path_is_normalized_and_flagged() {
    let config = common::fixture_config(Path::new("/srv/sync"));
    let endpoint = resolve_endpoint("usb:./docs//Report.PDF.CRYPT", &config).unwrap();

    assert_eq!(
        endpoint.relative_path.as_deref(),
        Some(Path::new("docs/Report.PDF.CRYPT"))
    );
    assert!(endpoint.already_encrypted);
}

#[test]
fn escaping_paths_are_rejected() {
    let config = common::fixture_config(Path::new("/srv/sync"));
    for token in ["usb:../etc/passwd", "usb:docs/../../x", "usb:/etc"] {
        match resolve_endpoint(token, &config) {
            Err(SyncError::PathEscape { location, .. }) => assert_eq!(location, "usb"),
            other => panic!("{token}: unexpected {other:?}"),
        }
    }
}

#[test]
fn unknown_location_is_reported() {
    let config = common::fixture_config(Path::new("/srv/sync"));
    let err = resolve_endpoint("phone:pics", &config).unwrap_err();
    assert!(matches!(err, SyncError::UnknownLocation { .. }));
}

#[test]
fn ciphertext_marker_only_checks_the_file_name() {
    assert!(has_ciphertext_marker(Path::new("a/b.crypt")));
    assert!(has_ciphertext_marker(&PathBuf::from("x.synchive.crypt")));
    assert!(!has_ciphertext_marker(Path::new("a.crypt/b.txt")));
    assert!(!has_ciphertext_marker(Path::new("crypt")));
}
