//! Canonical file names.
//!
//! A document is stored as `{id}_{O|C}_{title}.md` where the title has
//! spaces turned into underscores and characters that are not allowed in
//! file names either replaced or dropped.

use backlog_common_core::{Entity, Error, Result, Status};

const EXTENSION: &str = ".md";

/// Identity fields recovered from a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameParts {
    pub id: u32,
    pub status: Status,
    pub title: String,
}

/// Make a title safe to embed in a file name.
///
/// Spaces become `_`, path separators and `:` become `-`, and
/// `* ? " < > |` are removed.
pub fn sanitize(title: &str) -> String {
    title
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            '/' | '\\' | ':' => Some('-'),
            '*' | '?' | '"' | '<' | '>' | '|' => None,
            c => Some(c),
        })
        .collect()
}

/// Canonical file name for the given identity.
pub fn encode(id: u32, status: Status, title: &str) -> String {
    format!("{id}_{}_{}{EXTENSION}", status.code(), sanitize(title))
}

/// Like [`encode`] for a status that is still free text. Anything equal to
/// `close` ignoring case is closed.
pub fn encode_status_text(id: u32, status: &str, title: &str) -> String {
    encode(id, Status::from_text_lossy(status), title)
}

/// Canonical file name for an entity in its current state.
pub fn canonical_name<E: Entity>(entity: &E) -> String {
    encode(entity.id(), entity.status(), entity.title())
}

/// Recover `(id, status, title)` from a file name.
///
/// The name is split on its first two underscores. A status segment of `C`
/// is closed and anything else open. Underscores in the title come back as
/// spaces.
pub fn decode(filename: &str) -> Result<FilenameParts> {
    let invalid = || Error::InvalidFilenameFormat {
        name: filename.to_string(),
    };

    let stem = filename.strip_suffix(EXTENSION).unwrap_or(filename);
    let mut parts = stem.splitn(3, '_');
    let (Some(id), Some(code), Some(title)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };

    let id = id.parse::<u32>().map_err(|_| invalid())?;

    Ok(FilenameParts {
        id,
        status: Status::from_code(code),
        title: title.replace('_', " "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case(1, Status::Open, "Fix bug", "1_O_Fix_bug.md")]
    #[test_case(12, Status::Close, "Add feature", "12_C_Add_feature.md")]
    #[test_case(3, Status::Open, "a/b\\c:d", "3_O_a-b-c-d.md" ; "separators become hyphens")]
    #[test_case(4, Status::Open, "Why? \"Now\" <or> never|*", "4_O_Why_Now_or_never.md" ; "illegal characters dropped")]
    fn test_encode(id: u32, status: Status, title: &str, expected: &str) {
        assert_eq!(encode(id, status, title), expected);
    }

    #[test_case("Close", "C")]
    #[test_case("close", "C")]
    #[test_case("CLOSE", "C")]
    #[test_case("Open", "O")]
    #[test_case("Closed", "O" ; "only an exact close is closed")]
    #[test_case("", "O")]
    fn test_encode_status_text(status: &str, code: &str) {
        assert_eq!(encode_status_text(7, status, "T"), format!("7_{code}_T.md"));
    }

    #[test]
    fn test_decode() {
        let parts = decode("12_C_Add_new_feature.md").unwrap();
        assert_eq!(
            parts,
            FilenameParts {
                id: 12,
                status: Status::Close,
                title: "Add new feature".into(),
            }
        );
    }

    #[test]
    fn test_decode_unknown_code_is_open() {
        assert_eq!(decode("5_X_Thing.md").unwrap().status, Status::Open);
    }

    #[test_case("README.md" ; "no separators")]
    #[test_case("1_O.md" ; "two parts")]
    #[test_case("abc_O_Title.md" ; "non numeric id")]
    #[test_case("-1_O_Title.md" ; "negative id")]
    fn test_decode_invalid(name: &str) {
        match decode(name) {
            Err(Error::InvalidFilenameFormat { name: n }) => assert_eq!(n, name),
            other => panic!("Expected InvalidFilenameFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_encode_is_deterministic() {
        assert_eq!(
            encode(9, Status::Close, "Same title"),
            encode(9, Status::Close, "Same title")
        );
    }

    fn status() -> impl Strategy<Value = Status> {
        prop_oneof![Just(Status::Open), Just(Status::Close)]
    }

    proptest! {
        #[test]
        fn test_roundtrip(id in 1u32.., status in status(), title in "[A-Za-z0-9 .,'()-]{1,40}") {
            let parts = decode(&encode(id, status, &title)).unwrap();
            prop_assert_eq!(parts.id, id);
            prop_assert_eq!(parts.status, status);
            prop_assert_eq!(parts.title, title);
        }

        #[test]
        fn test_sanitized_names_have_no_illegal_characters(title in "\\PC{0,60}") {
            let name = sanitize(&title);
            prop_assert!(!name.contains(['/', '\\', ':', '*', '?', '"', '<', '>', '|', ' ']));
        }
    }
}
