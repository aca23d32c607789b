use uuid::{Uuid, Variant};

/// Returns true iff `candidate` is exactly the lower-case hyphenated form of a
/// version 4 UUID.
///
/// `Uuid::parse_str` also accepts braced, `urn:uuid:` and simple forms; the
/// round-trip comparison rejects those along with upper-case input.
pub fn is_valid_submission_id(candidate: &str) -> bool {
    let Ok(parsed) = Uuid::parse_str(candidate) else {
        return false;
    };

    parsed.get_version_num() == 4
        && parsed.get_variant() == Variant::RFC4122
        && parsed.hyphenated().to_string() == candidate
}

/// Same as [`is_valid_submission_id`], treating a missing value as invalid.
pub fn is_valid_submission_id_opt(candidate: Option<&str>) -> bool {
    candidate.is_some_and(is_valid_submission_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "0b7e3c2a-5d1f-4e8a-9c3b-2f6d7a8e9b10";

    #[test]
    fn test_accepts_canonical_v4() {
        assert!(is_valid_submission_id(VALID));
        let generated = Uuid::from_u128(0x936da01f_9abd_4d9d_80c7_02af85c822a8).to_string();
        assert!(is_valid_submission_id(&generated));
    }

    #[test]
    fn test_rejects_non_canonical_spellings() {
        assert!(!is_valid_submission_id(&VALID.to_uppercase()));
        assert!(!is_valid_submission_id(&VALID.replace('-', "")));
        assert!(!is_valid_submission_id(&format!("{{{}}}", VALID)));
        assert!(!is_valid_submission_id(&format!("urn:uuid:{}", VALID)));
        assert!(!is_valid_submission_id(&format!(" {}", VALID)));
    }

    #[test]
    fn test_rejects_wrong_version_and_variant() {
        // version 1
        assert!(!is_valid_submission_id("0b7e3c2a-5d1f-1e8a-9c3b-2f6d7a8e9b10"));
        // version 7
        assert!(!is_valid_submission_id("0b7e3c2a-5d1f-7e8a-9c3b-2f6d7a8e9b10"));
        // NCS variant bits
        assert!(!is_valid_submission_id("0b7e3c2a-5d1f-4e8a-1c3b-2f6d7a8e9b10"));
        assert!(!is_valid_submission_id("00000000-0000-0000-0000-000000000000"));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(!is_valid_submission_id(""));
        assert!(!is_valid_submission_id("not-a-uuid"));
        assert!(!is_valid_submission_id("12345"));
        assert!(!is_valid_submission_id("zb7e3c2a-5d1f-4e8a-9c3b-2f6d7a8e9b10"));
        assert!(!is_valid_submission_id("0b7e3c2a-5d1f-4e8a-9c3b-2f6d7a8e9b1"));
        assert!(!is_valid_submission_id_opt(None));
        assert!(is_valid_submission_id_opt(Some(VALID)));
    }
}
