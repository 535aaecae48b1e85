//! CSV export functionality.
//!
//! One row per visit under a fixed header. Quoting follows the `csv` crate's
//! writer defaults; an absent location is written as an empty field.

use anyhow::{Context, Result};
use csv::{Terminator, WriterBuilder};

use crate::models::Visit;

pub const CSV_HEADER: [&str; 4] = ["ID", "IP Address", "Location", "Timestamp"];

/// Encode `visits` as CSV, in the order given
///
/// # Returns
///
/// The encoded bytes, or an error if the writer fails.
pub fn encode_visits(visits: &[Visit]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(CSV_HEADER)
        .context("Failed to write CSV header")?;

    for visit in visits {
        let id = visit.id.to_string();
        let timestamp = visit.formatted_timestamp();
        writer
            .write_record([
                id.as_str(),
                visit.ip_address.as_str(),
                visit.location.as_deref().unwrap_or(""),
                timestamp.as_str(),
            ])
            .with_context(|| format!("Failed to write CSV row for visit {}", visit.id))?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e.error()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visit(id: i64, ip: &str, location: Option<&str>, timestamp: i64) -> Visit {
        Visit {
            id,
            ip_address: ip.to_string(),
            location: location.map(str::to_string),
            timestamp,
        }
    }

    #[test]
    fn test_empty_export_is_header_only() {
        let bytes = encode_visits(&[]).unwrap();
        assert_eq!(bytes, b"ID,IP Address,Location,Timestamp\n");
    }

    #[test]
    fn test_rows_quote_delimiters() {
        let visits = vec![
            visit(1, "203.0.113.5", Some("Taipei, Taipei City"), 1_704_164_645),
            visit(2, "198.51.100.1", None, 0),
            visit(3, "10.0.0.1", Some("Say \"hi\""), 60),
        ];

        let text = String::from_utf8(encode_visits(&visits).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "ID,IP Address,Location,Timestamp");
        assert_eq!(lines[1], "1,203.0.113.5,\"Taipei, Taipei City\",2024-01-02 03:04:05");
        assert_eq!(lines[2], "2,198.51.100.1,,1970-01-01 00:00:00");
        assert_eq!(lines[3], "3,10.0.0.1,\"Say \"\"hi\"\"\",1970-01-01 00:01:00");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let visits = vec![visit(1, "a", Some("x,y"), 5), visit(2, "b", None, 6)];
        assert_eq!(encode_visits(&visits).unwrap(), encode_visits(&visits).unwrap());
    }

    #[test]
    fn test_output_parses_back_to_rows() {
        let visits = vec![
            visit(1, "203.0.113.5", Some("Taipei, Taipei City"), 1_704_164_645),
            visit(2, "2001:db8::1", Some("Line\nbreak"), 86_400),
            visit(3, "198.51.100.1", None, 0),
        ];

        let bytes = encode_visits(&visits).unwrap();
        let mut reader = csv::Reader::from_reader(bytes.as_slice());

        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), CSV_HEADER.to_vec());

        let rows: Vec<(String, String, String, String)> = reader
            .records()
            .map(|r| {
                let r = r.unwrap();
                (r[0].to_string(), r[1].to_string(), r[2].to_string(), r[3].to_string())
            })
            .collect();

        let expected: Vec<(String, String, String, String)> = visits
            .iter()
            .map(|v| {
                (
                    v.id.to_string(),
                    v.ip_address.clone(),
                    v.location.clone().unwrap_or_default(),
                    v.formatted_timestamp(),
                )
            })
            .collect();

        assert_eq!(rows, expected);
    }
}
