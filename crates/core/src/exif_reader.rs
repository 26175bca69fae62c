use crate::metadata::CaptureTimestamp;
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const DATE_TAGS: [Tag; 3] = [Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime];

/// Reads the capture date of a JPG.
///
/// Failing to open the file or to decode its EXIF container is an error. A
/// container without any usable date tag yields [`CaptureTimestamp::ZERO`].
pub fn read_capture_timestamp(path: &Path) -> Result<CaptureTimestamp> {
    let file = File::open(path)
        .with_context(|| format!("EXIF読み込み対象を開けませんでした: {}", path.display()))?;
    let mut buf = BufReader::new(file);
    let exif = Reader::new()
        .read_from_container(&mut buf)
        .with_context(|| format!("EXIFを解析できませんでした: {}", path.display()))?;

    Ok(find_capture_date(&exif)
        .map(CaptureTimestamp::new)
        .unwrap_or(CaptureTimestamp::ZERO))
}

fn find_capture_date(exif: &exif::Exif) -> Option<NaiveDateTime> {
    DATE_TAGS.iter().find_map(|tag| {
        let field = exif.get_field(*tag, In::PRIMARY)?;
        match field.value {
            Value::Ascii(ref values) => values.first().and_then(|raw| parse_ascii_date(raw)),
            _ => None,
        }
    })
}

fn parse_ascii_date(raw: &[u8]) -> Option<NaiveDateTime> {
    if let Ok(dt) = exif::DateTime::from_ascii(raw) {
        return NaiveDate::from_ymd_opt(dt.year.into(), dt.month.into(), dt.day.into())?
            .and_hms_opt(dt.hour.into(), dt.minute.into(), dt.second.into());
    }
    parse_date(&String::from_utf8_lossy(raw))
}

// Some writers ignore the EXIF date layout.
fn parse_date(input: &str) -> Option<NaiveDateTime> {
    let normalized = input.trim_matches(|c: char| c.is_whitespace() || c == '\0');

    let candidates = [
        "%Y:%m:%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    candidates
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(normalized, fmt).ok())
}
