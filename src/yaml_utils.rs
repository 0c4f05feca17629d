//! YAML utilities for the session-info block
//!
//! The block iRacing writes into an IBT file is not quite YAML:
//! - It is Windows-1252 encoded and NUL padded to a fixed length
//! - It may contain control characters that break YAML parsers
//! - Free-text values (driver and team names, setup names) are written unquoted and can contain
//!   quotes, colons and leading commas
//!
//! This module turns the raw bytes into a string `serde_yaml_ng` accepts, without parsing it.

/// Keys whose values are free text and must be quoted before parsing.
const FREE_TEXT_KEYS: &[&str] = &[
    "AbbrevName:",
    "TeamName:",
    "UserName:",
    "Initials:",
    "DriverSetupName:",
    "CarDesignStr:", // livery color codes, can start with a comma
    "CarNumber:",
];

/// Windows-1252 code points for bytes 0x80..=0x9F. Undefined slots map to U+FFFD.
const CP1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{FFFD}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{FFFD}', '\u{017D}', '\u{FFFD}',
    '\u{FFFD}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{FFFD}', '\u{017E}', '\u{0178}',
];

/// Decode Windows-1252 bytes. Every byte maps to exactly one char.
pub fn decode_windows_1252(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => CP1252_HIGH[(b - 0x80) as usize],
            _ => char::from(b),
        })
        .collect()
}

/// Decode a raw session-info block.
///
/// The block ends at the first NUL; returns `None` when nothing but whitespace remains.
pub fn decode_session_block(block: &[u8]) -> Option<String> {
    let len = block.iter().position(|&b| b == 0).unwrap_or(block.len());
    let text = decode_windows_1252(&block[..len]);
    if text.trim().is_empty() { None } else { Some(text) }
}

/// Preprocess iRacing YAML to fix known issues.
///
/// Removes control characters except `\n`, `\r` and `\t`, then single-quotes unquoted values of
/// [`FREE_TEXT_KEYS`], doubling embedded single quotes.
pub fn preprocess_iracing_yaml(yaml: &str) -> String {
    let cleaned: String =
        yaml.chars().filter(|&ch| !ch.is_control() || matches!(ch, '\n' | '\r' | '\t')).collect();

    cleaned.lines().map(quote_free_text).collect::<Vec<_>>().join("\n")
}

fn quote_free_text(line: &str) -> String {
    for &key in FREE_TEXT_KEYS {
        let Some(key_pos) = line.find(key) else {
            continue;
        };
        // Key must be the first token on the line, so "TeamName:" does not match inside a value.
        if !line[..key_pos].trim_start_matches([' ', '-']).is_empty() {
            continue;
        }
        let after_key = key_pos + key.len();
        let Some(value_start) = line[after_key..].find(|c: char| !c.is_whitespace()) else {
            return line.to_string();
        };
        let value_start = after_key + value_start;
        let value = line[value_start..].trim_end();
        if is_quoted(value) {
            return line.to_string();
        }
        return format!("{}'{}'", &line[..value_start], value.replace('\'', "''"));
    }
    line.to_string()
}

fn is_quoted(value: &str) -> bool {
    value.len() >= 2
        && ((value.starts_with('\'') && value.ends_with('\''))
            || (value.starts_with('"') && value.ends_with('"')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_control_characters() {
        let input = "WeekendInfo:\n\x01\x02  TrackName: test\x03";
        let result = preprocess_iracing_yaml(input);
        assert!(!result.contains('\x01'));
        assert!(!result.contains('\x03'));
        assert!(result.contains("WeekendInfo"));
        assert!(result.contains("TrackName: test"));
    }

    #[test]
    fn keeps_valid_whitespace() {
        let result = preprocess_iracing_yaml("Key:\n\t  Value");
        assert!(result.contains('\n'));
        assert!(result.contains('\t'));
    }

    #[test]
    fn quotes_free_text_values() {
        let input = "Drivers:\n - CarIdx: 0\n   UserName: O'Connor, Mike\n   TeamName: \"Fast\" Racing\n   CarDesignStr: ,ff0000,000000";
        let result = preprocess_iracing_yaml(input);
        assert!(result.contains("   UserName: 'O''Connor, Mike'"));
        assert!(result.contains("   TeamName: '\"Fast\" Racing'"));
        assert!(result.contains("   CarDesignStr: ',ff0000,000000'"));
        assert!(result.contains(" - CarIdx: 0"));

        let parsed: serde_yaml_ng::Value = serde_yaml_ng::from_str(&result).unwrap();
        let name = &parsed["Drivers"][0]["UserName"];
        assert_eq!(name.as_str(), Some("O'Connor, Mike"));
    }

    #[test]
    fn leaves_quoted_and_empty_values_alone() {
        assert_eq!(preprocess_iracing_yaml(" UserName: 'Already'"), " UserName: 'Already'");
        assert_eq!(preprocess_iracing_yaml(" UserName:"), " UserName:");
    }

    #[test]
    fn list_item_keys_are_quoted() {
        assert_eq!(preprocess_iracing_yaml(" - UserName: Bob: The Driver"), " - UserName: 'Bob: The Driver'");
    }

    #[test]
    fn decodes_windows_1252() {
        let bytes = [b'J', 0xE9, b'r', 0xF4, b'm', 0x92, b's', 0x80];
        assert_eq!(decode_windows_1252(&bytes), "Jérôm\u{2019}s€");
    }

    #[test]
    fn session_block_stops_at_nul() {
        let block = b"WeekendInfo:\n TrackName: test\n\0\0\0\0";
        assert_eq!(decode_session_block(block).as_deref(), Some("WeekendInfo:\n TrackName: test\n"));
        assert_eq!(decode_session_block(b"\0\0\0"), None);
        assert_eq!(decode_session_block(b"  \n\0"), None);
    }
}
