//! One identity per line:
//!
//! ```text
//! admin                      legacy name, no leading space
//!  1 AQI= svc@EXAMPLE.ORG    extended: space, kind, base64 exported name, display name
//! ```
//!
//! Constraints are enforced when encoding only; decoding accepts whatever is
//! already on disk and lets the caller decide what a bad line means.

use base64::Engine;

use super::principal::Identity;
use crate::error::{FormatError, ParseError};

/// Historical line buffer size. Includes room for a truncation check
/// character and the terminator, so content is limited to `size - 2` bytes.
pub const USERLIST_MAXLINESIZE: usize = 2048;

pub fn decode_line(line: &str) -> Result<Identity, ParseError> {
    let line = match line.find('\n') {
        Some(i) => &line[..i],
        None => line,
    };

    let Some(rest) = line.strip_prefix(' ') else {
        return Ok(Identity::legacy(line));
    };

    let (kind_field, rest) = match rest.split_once(' ') {
        Some((k, r)) => (k, Some(r)),
        None => (rest, None),
    };
    let kind: i32 = kind_field.parse().map_err(|_| ParseError::InvalidKind)?;

    let rest = rest.ok_or(ParseError::Truncated)?;
    let (ename, display_name) = rest.split_once(' ').ok_or(ParseError::Truncated)?;
    if ename.is_empty() || display_name.is_empty() {
        return Err(ParseError::Truncated);
    }

    let exported_name = base64::engine::general_purpose::STANDARD
        .decode(ename)
        .map_err(|_| ParseError::BadEncoding)?;

    Ok(Identity::extended(kind, exported_name, display_name))
}

/// Render `identity` as a newline-terminated line no longer than `max_line_size - 2`
/// bytes of content.
pub fn encode_line(identity: &Identity, max_line_size: usize) -> Result<String, FormatError> {
    let max = max_line_size.saturating_sub(2);
    let body = match identity {
        Identity::LegacyV4 { name } => {
            if name.is_empty() {
                return Err(FormatError::Empty);
            }
            if name.starts_with(' ') {
                return Err(FormatError::LeadingSpace);
            }
            name.clone()
        }
        Identity::Extended { kind, exported_name, display_name } => {
            if exported_name.is_empty() || display_name.is_empty() {
                return Err(FormatError::Empty);
            }
            let ename = base64::engine::general_purpose::STANDARD.encode(exported_name);
            format!(" {} {} {}", kind, ename, display_name)
        }
        Identity::SuperuserSentinel { .. } => return Err(FormatError::Unencodable),
    };

    if body.len() > max {
        return Err(FormatError::TooLong { len: body.len(), max });
    }
    if body.contains(|c: char| c == '\r' || c == '\n') {
        return Err(FormatError::EmbeddedNewline);
    }
    Ok(body + "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_line_is_bare_name() {
        let line = encode_line(&Identity::legacy("admin"), USERLIST_MAXLINESIZE).unwrap();
        assert_eq!(line, "admin\n");
        assert_eq!(decode_line(&line).unwrap(), Identity::legacy("admin"));
    }

    #[test]
    fn extended_line_layout() {
        let id = Identity::extended(5, vec![0x01, 0x02], "svc");
        let line = encode_line(&id, USERLIST_MAXLINESIZE).unwrap();
        assert_eq!(line, " 5 AQI= svc\n");
        assert_eq!(decode_line(&line).unwrap(), id);
    }

    #[test]
    fn display_name_runs_to_end_of_line() {
        let id = decode_line(" 1 AQI= Some Service Account\n").unwrap();
        assert_eq!(id.display_name(), "Some Service Account");
        assert_eq!(id.exported_name(), &[0x01, 0x02]);
        let again = encode_line(&id, USERLIST_MAXLINESIZE).unwrap();
        assert_eq!(decode_line(&again).unwrap(), id);
    }

    #[test]
    fn encodable_edge_identities_survive_a_round_trip() {
        // 1530 bytes encode to 2040 base64 characters, the most that fits
        // beside " 1 " and a one-byte display name.
        let widest = vec![0xffu8; 1530];
        let cases = vec![
            Identity::legacy("a"),
            Identity::legacy("odd name with spaces"),
            Identity::legacy("user.admin@EXAMPLE.ORG"),
            Identity::legacy("trailing "),
            Identity::legacy("j\u{f6}rg"),
            Identity::extended(0, b"admin".to_vec(), "Administrator"),
            Identity::extended(-7, vec![0x00], "negative kind"),
            Identity::extended(i32::MIN, vec![1, 2, 3], "min"),
            Identity::extended(i32::MAX, vec![1, 2, 3], "max"),
            Identity::extended(1, vec![0x42], " leading space"),
            Identity::extended(1, vec![0x42], "interior  spaces here"),
            Identity::extended(1, vec![0x42], "trailing "),
            Identity::extended(1, vec![0x0a, 0x0d, 0x20], "binary name"),
            Identity::extended(1, widest, "x"),
        ];
        for id in cases {
            let line = encode_line(&id, USERLIST_MAXLINESIZE).unwrap_or_else(|e| panic!("{id:?}: {e}"));
            assert!(line.len() - 1 <= USERLIST_MAXLINESIZE - 2, "{id:?}");
            assert_eq!(decode_line(&line).unwrap(), id);
        }
    }

    #[test]
    fn decode_errors() {
        assert_eq!(decode_line(" bogus kind  "), Err(ParseError::InvalidKind));
        assert_eq!(decode_line(" "), Err(ParseError::InvalidKind));
        assert_eq!(decode_line(" 5"), Err(ParseError::Truncated));
        assert_eq!(decode_line(" 5 AQI="), Err(ParseError::Truncated));
        assert_eq!(decode_line(" 5 AQI= "), Err(ParseError::Truncated));
        assert_eq!(decode_line(" 5 !!!! svc"), Err(ParseError::BadEncoding));
    }

    #[test]
    fn empty_line_decodes_to_empty_legacy_name() {
        assert_eq!(decode_line("\n").unwrap(), Identity::legacy(""));
        assert_eq!(decode_line("").unwrap(), Identity::legacy(""));
    }

    #[test]
    fn legacy_names_keep_interior_spaces() {
        assert_eq!(decode_line("odd name\n").unwrap(), Identity::legacy("odd name"));
    }

    #[test]
    fn encode_rejects_bad_legacy_names() {
        let max = USERLIST_MAXLINESIZE;
        assert_eq!(encode_line(&Identity::legacy(""), max), Err(FormatError::Empty));
        assert_eq!(encode_line(&Identity::legacy(" admin"), max), Err(FormatError::LeadingSpace));
        assert_eq!(encode_line(&Identity::legacy("ad\nmin"), max), Err(FormatError::EmbeddedNewline));
        assert_eq!(encode_line(&Identity::legacy("ad\rmin"), max), Err(FormatError::EmbeddedNewline));
        assert_eq!(encode_line(&Identity::local_auth(), max), Err(FormatError::Unencodable));
    }

    #[test]
    fn encode_enforces_line_limit() {
        let fits = "a".repeat(USERLIST_MAXLINESIZE - 2);
        assert!(encode_line(&Identity::legacy(fits), USERLIST_MAXLINESIZE).is_ok());
        let too_long = "a".repeat(USERLIST_MAXLINESIZE - 1);
        assert!(matches!(
            encode_line(&Identity::legacy(too_long), USERLIST_MAXLINESIZE),
            Err(FormatError::TooLong { .. })
        ));
        let big = Identity::extended(1, vec![7u8; 2000], "svc");
        assert!(matches!(encode_line(&big, USERLIST_MAXLINESIZE), Err(FormatError::TooLong { .. })));
    }

    #[test]
    fn extended_display_name_may_not_break_lines() {
        let id = Identity::extended(1, vec![9], "bad\nname");
        assert_eq!(encode_line(&id, USERLIST_MAXLINESIZE), Err(FormatError::EmbeddedNewline));
        let id = Identity::extended(1, vec![9], "");
        assert_eq!(encode_line(&id, USERLIST_MAXLINESIZE), Err(FormatError::Empty));
    }
}
