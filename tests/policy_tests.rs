// tests/policy_tests.rs
mod common;

use syncbuddy::policy::{action_for, check_pair_sensitivity, decide, select_mode, PolicyInput};
use syncbuddy::{Action, Decision, EncryptionMode, SyncError};

fn input(src: bool, dst: bool) -> PolicyInput {
    PolicyInput {
        source_trusted: src,
        destination_trusted: dst,
        ..Default::default()
    }
}

#[test]
fn ciphertext_is_decrypted_only_on_trusted_destinations() {
    let hint = |dst| PolicyInput {
        already_encrypted: true,
        ..input(false, dst)
    };
    assert_eq!(decide(&hint(true)), Decision::Decrypt);
    assert_eq!(decide(&hint(false)), Decision::Plain);

    // Never double-encrypt, even when asked to
    let forced = PolicyInput {
        entry_sensitive: true,
        force_encrypt: true,
        ..hint(false)
    };
    assert_eq!(decide(&forced), Decision::Plain);
    assert_eq!(
        action_for(decide(&forced), true),
        Some(Action::TransferOnlyAlreadyEncrypted)
    );
}

#[test]
fn sensitive_data_is_encrypted_for_untrusted_destinations() {
    for (entry, sub) in [(true, false), (false, true)] {
        let unit = PolicyInput {
            entry_sensitive: entry,
            subfolder_sensitive: sub,
            ..input(true, false)
        };
        assert_eq!(decide(&unit), Decision::Encrypt);
    }
}

#[test]
fn trusted_to_trusted_stays_plain_unless_forced() {
    let unit = PolicyInput {
        entry_sensitive: true,
        ..input(true, true)
    };
    assert_eq!(decide(&unit), Decision::Plain);

    let forced = PolicyInput {
        force_encrypt: true,
        ..unit
    };
    assert_eq!(decide(&forced), Decision::Encrypt);

    // Forcing has no effect on non-sensitive data
    let plain = PolicyInput {
        force_encrypt: true,
        ..input(true, true)
    };
    assert_eq!(decide(&plain), Decision::Plain);
}

#[test]
fn partly_sensitive_unit_cannot_cross_trust_levels() {
    let unit = PolicyInput {
        contains_sensitive: true,
        ..input(true, false)
    };
    assert_eq!(decide(&unit), Decision::Forbidden);
    assert_eq!(action_for(Decision::Forbidden, false), None);

    let same_level = PolicyInput {
        contains_sensitive: true,
        ..input(false, false)
    };
    assert_eq!(decide(&same_level), Decision::Plain);
}

#[test]
fn every_input_combination_has_a_decision() {
    for bits in 0u8..128 {
        let bit = |n: u8| bits & (1 << n) != 0;
        let unit = PolicyInput {
            source_trusted: bit(0),
            destination_trusted: bit(1),
            entry_sensitive: bit(2),
            subfolder_sensitive: bit(3),
            contains_sensitive: bit(4),
            already_encrypted: bit(5),
            force_encrypt: bit(6),
        };
        let decision = decide(&unit);
        // A sensitive plaintext unit never reaches an untrusted destination as plaintext
        if unit.is_sensitive() && !unit.already_encrypted && !unit.destination_trusted {
            assert_eq!(decision, Decision::Encrypt, "{unit:?}");
        }
        if decision == Decision::Decrypt {
            assert!(unit.destination_trusted, "{unit:?}");
        }
    }
}

#[test]
fn mode_override_beats_directory_setting() {
    assert_eq!(select_mode(None, None), EncryptionMode::PerFile);
    assert_eq!(
        select_mode(Some(EncryptionMode::Archive), None),
        EncryptionMode::Archive
    );
    assert_eq!(
        select_mode(Some(EncryptionMode::Archive), Some(EncryptionMode::PerFile)),
        EncryptionMode::PerFile
    );
}

#[test]
fn paired_directories_must_agree_on_sensitivity() {
    let secret = common::entry("docs", true);
    let open = common::entry("docs", false);
    assert!(check_pair_sensitivity(&secret, &secret).is_ok());
    assert!(matches!(
        check_pair_sensitivity(&secret, &open),
        Err(SyncError::MixedSensitivity(_))
    ));
}
