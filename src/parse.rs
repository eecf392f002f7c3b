//! Header-row parsing of character-separated text.
//!
//! The parser is total: malformed rows degrade instead of failing. Source
//! data is inherently messy, and whatever is usable must never be blocked
//! from display by a bad row.

use tracing::debug;

/// One raw source row: ordered (raw header, raw value) pairs, in source
/// column order. Produced once per load and discarded after normalization.
pub type RawRow = Vec<(String, String)>;

/// Parses delimited text with a header row into ordered raw rows.
///
/// The first non-blank line supplies raw header names positionally; each
/// subsequent non-blank line yields one [`RawRow`] pairing each header with
/// the corresponding trimmed field. Rows shorter than the header pad with
/// empty strings; extra trailing fields are dropped. Blank lines are
/// skipped. Never fails.
#[must_use]
pub fn parse_rows(text: &str, delimiter: char) -> Vec<RawRow> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers = split_fields(header_line, delimiter);

    let rows: Vec<RawRow> = lines
        .map(|line| {
            let fields = split_fields(line, delimiter);
            headers
                .iter()
                .enumerate()
                .map(|(index, header)| {
                    let value = fields.get(index).cloned().unwrap_or_default();
                    (header.clone(), value)
                })
                .collect()
        })
        .collect();

    debug!(headers = headers.len(), rows = rows.len(), "parsed tabular payload");
    rows
}

/// Splits one line into trimmed fields, honoring double-quoted fields.
///
/// Inside quotes the delimiter is literal and `""` unescapes to `"`.
/// Malformed quoting degrades: an unterminated quote runs to end of line,
/// and a quote opening mid-field is kept as a literal character.
fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(ch);
            }
        } else if ch == '"' && current.trim().is_empty() {
            current.clear();
            in_quotes = true;
        } else if ch == delimiter {
            fields.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(ch);
        }
    }
    fields.push(current.trim().to_string());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rows_maps_headers_positionally() {
        let rows = parse_rows("Brand Name,Region,Phone\nAcme,EU,555\nBeta,US,556\n", ',');
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            vec![
                ("Brand Name".to_string(), "Acme".to_string()),
                ("Region".to_string(), "EU".to_string()),
                ("Phone".to_string(), "555".to_string()),
            ]
        );
        assert_eq!(rows[1][0].1, "Beta");
    }

    #[test]
    fn test_parse_rows_short_row_pads_with_empty() {
        let rows = parse_rows("a,b,c\n1,2\n", ',');
        assert_eq!(
            rows[0],
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
                ("c".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_parse_rows_extra_fields_dropped() {
        let rows = parse_rows("a,b\n1,2,3,4\n", ',');
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[0][1].1, "2");
    }

    #[test]
    fn test_parse_rows_skips_blank_lines() {
        let rows = parse_rows("a,b\n\n1,2\n   \n3,4\n", ',');
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_parse_rows_empty_input() {
        assert!(parse_rows("", ',').is_empty());
        assert!(parse_rows("\n  \n", ',').is_empty());
    }

    #[test]
    fn test_parse_rows_header_only_yields_no_rows() {
        assert!(parse_rows("a,b,c\n", ',').is_empty());
    }

    #[test]
    fn test_parse_rows_trims_field_values() {
        let rows = parse_rows("a,b\n  spaced  ,\tvalue \n", ',');
        assert_eq!(rows[0][0].1, "spaced");
        assert_eq!(rows[0][1].1, "value");
    }

    #[test]
    fn test_parse_rows_handles_crlf() {
        let rows = parse_rows("a,b\r\n1,2\r\n", ',');
        assert_eq!(rows[0][1].1, "2");
    }

    #[test]
    fn test_parse_rows_alternate_delimiter() {
        let rows = parse_rows("a\tb\n1\t2\n", '\t');
        assert_eq!(rows[0][0].1, "1");
        assert_eq!(rows[0][1].1, "2");
    }

    #[test]
    fn test_split_fields_quoted_delimiter_is_literal() {
        assert_eq!(
            split_fields("\"Bistro, The\",Paris", ','),
            vec!["Bistro, The".to_string(), "Paris".to_string()]
        );
    }

    #[test]
    fn test_split_fields_doubled_quote_unescapes() {
        assert_eq!(
            split_fields("\"say \"\"hi\"\"\",x", ','),
            vec!["say \"hi\"".to_string(), "x".to_string()]
        );
    }

    #[test]
    fn test_split_fields_unterminated_quote_runs_to_end() {
        assert_eq!(
            split_fields("\"open, never closed", ','),
            vec!["open, never closed".to_string()]
        );
    }

    #[test]
    fn test_split_fields_mid_field_quote_is_literal() {
        assert_eq!(
            split_fields("ab\"cd,e", ','),
            vec!["ab\"cd".to_string(), "e".to_string()]
        );
    }

    #[test]
    fn test_split_fields_empty_fields_preserved() {
        assert_eq!(
            split_fields(",,x,", ','),
            vec![String::new(), String::new(), "x".to_string(), String::new()]
        );
    }
}
