//! Splits raw catalog text into per-object element sets

use crate::error::FormatError;

/// One catalog entry: a name line followed by its two element lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TleEntry {
    pub name: String,
    pub line1: String,
    pub line2: String,
}

/// Result of a lenient parse: usable entries plus everything that was skipped
#[derive(Debug, Default)]
pub struct ParseReport {
    pub entries: Vec<TleEntry>,
    pub skipped: Vec<FormatError>,
}

#[derive(Debug)]
struct PartialEntry {
    name: String,
    line1: Option<String>,
    line2: Option<String>,
}

impl PartialEntry {
    fn finish(self) -> Result<TleEntry, FormatError> {
        match (self.line1, self.line2) {
            (Some(line1), Some(line2)) => Ok(TleEntry {
                name: self.name,
                line1,
                line2,
            }),
            (None, Some(_)) => Err(FormatError::MissingLines {
                name: self.name,
                missing: "line 1",
            }),
            (Some(_), None) => Err(FormatError::MissingLines {
                name: self.name,
                missing: "line 2",
            }),
            (None, None) => Err(FormatError::MissingLines {
                name: self.name,
                missing: "both element lines",
            }),
        }
    }
}

/// Parse catalog text, failing on the first malformed record.
pub fn parse(raw: &str) -> Result<Vec<TleEntry>, FormatError> {
    let mut entries = Vec::new();
    for item in scan(raw) {
        entries.push(item?);
    }
    Ok(entries)
}

/// Parse catalog text, skipping malformed records.
pub fn parse_lenient(raw: &str) -> ParseReport {
    let mut report = ParseReport::default();
    for item in scan(raw) {
        match item {
            Ok(entry) => report.entries.push(entry),
            Err(err) => {
                log::warn!("Skipping catalog record: {}", err);
                report.skipped.push(err);
            }
        }
    }
    report
}

fn scan(raw: &str) -> Vec<Result<TleEntry, FormatError>> {
    let mut out = Vec::new();
    let mut current: Option<PartialEntry> = None;

    for (idx, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.as_bytes()[0] {
            kind @ (b'1' | b'2') => match current.as_mut() {
                Some(entry) if kind == b'1' => entry.line1 = Some(line.to_string()),
                Some(entry) => entry.line2 = Some(line.to_string()),
                None => out.push(Err(FormatError::OrphanLine {
                    line_number: idx + 1,
                    kind: kind as char,
                })),
            },
            _ => {
                if let Some(entry) = current.take() {
                    out.push(entry.finish());
                }
                current = Some(PartialEntry {
                    name: display_name(line),
                    line1: None,
                    line2: None,
                });
            }
        }
    }

    if let Some(entry) = current.take() {
        out.push(entry.finish());
    }
    out
}

/// Space-Track 3LE output prefixes name lines with "0 ".
fn display_name(line: &str) -> String {
    line.strip_prefix("0 ").unwrap_or(line).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ISS_L1: &str = "1 25544U 98067A   24101.03904484  .00012558  00000-0  22725-3 0  9992";
    const ISS_L2: &str = "2 25544  51.6391 293.2963 0004827  53.6203  54.5347 15.50046419447975";

    #[test]
    fn test_parse_single_record() {
        let raw = format!("ISS (ZARYA)\n{}\n{}\n", ISS_L1, ISS_L2);
        let entries = parse(&raw).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "ISS (ZARYA)");
        assert_eq!(entries[0].line1, ISS_L1);
        assert_eq!(entries[0].line2, ISS_L2);
    }

    #[test]
    fn test_parse_trims_and_skips_blank_lines() {
        let raw = format!("\n   ISS   \r\n\n  {}  \r\n{}\n\n\n", ISS_L1, ISS_L2);
        let entries = parse(&raw).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "ISS");
        assert_eq!(entries[0].line1, ISS_L1);
    }

    #[test]
    fn test_parse_strips_3le_name_prefix() {
        let raw = format!("0 INTELSAT 902\n{}\n{}", ISS_L1, ISS_L2);
        let entries = parse(&raw).unwrap();
        assert_eq!(entries[0].name, "INTELSAT 902");
    }

    #[test]
    fn test_orphan_line_is_an_error_not_a_panic() {
        let raw = format!("{}\nISS\n{}\n{}", ISS_L2, ISS_L1, ISS_L2);
        let err = parse(&raw).unwrap_err();
        assert_eq!(
            err,
            FormatError::OrphanLine {
                line_number: 1,
                kind: '2'
            }
        );
    }

    #[test]
    fn test_missing_line_fails_strict_parse() {
        let raw = format!("ISS\n{}\nHUBBLE\n{}\n{}", ISS_L1, ISS_L1, ISS_L2);
        let err = parse(&raw).unwrap_err();
        assert!(matches!(
            err,
            FormatError::MissingLines { ref name, missing: "line 2" } if name == "ISS"
        ));
    }

    #[test]
    fn test_lenient_parse_skips_bad_records() {
        let raw = format!(
            "{}\nLONELY NAME\nISS\n{}\n{}\nHALF\n{}",
            ISS_L1, ISS_L1, ISS_L2, ISS_L2
        );
        let report = parse_lenient(&raw);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].name, "ISS");
        assert_eq!(report.skipped.len(), 3);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("\n \n\t\n").unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn test_parse_preserves_count_and_order(names in prop::collection::vec("[A-Z][A-Z0-9 ()-]{0,20}", 0..40)) {
            let mut raw = String::new();
            for name in &names {
                raw.push_str(name);
                raw.push('\n');
                raw.push_str(ISS_L1);
                raw.push('\n');
                raw.push_str(ISS_L2);
                raw.push('\n');
            }

            let entries = parse(&raw).unwrap();
            prop_assert_eq!(entries.len(), names.len());
            for (entry, name) in entries.iter().zip(&names) {
                prop_assert_eq!(&entry.name, name.trim());
            }
        }
    }
}
