//! Minimal JPEG files carrying an EXIF block, for tests.

use exif::experimental::Writer;
use exif::{Field, In, Tag, Value};
use std::io::Cursor;

/// JPEG whose EXIF holds `DateTimeOriginal = date`
/// (EXIF layout, e.g. `2020:01:02 03:04:05`).
pub fn jpeg_with_capture_date(date: &str) -> Vec<u8> {
    let field = Field {
        tag: Tag::DateTimeOriginal,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![date.as_bytes().to_vec()]),
    };
    wrap_jpeg(&encode_exif(&[field]))
}

/// JPEG with a valid EXIF block but no date tag at all.
pub fn jpeg_without_capture_date() -> Vec<u8> {
    let field = Field {
        tag: Tag::Orientation,
        ifd_num: In::PRIMARY,
        value: Value::Short(vec![1]),
    };
    wrap_jpeg(&encode_exif(&[field]))
}

fn encode_exif(fields: &[Field]) -> Vec<u8> {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut buf = Cursor::new(Vec::new());
    writer
        .write(&mut buf, true)
        .expect("EXIF fixture should encode");
    buf.into_inner()
}

fn wrap_jpeg(tiff: &[u8]) -> Vec<u8> {
    let payload_len = u16::try_from(2 + 6 + tiff.len()).expect("APP1 segment fits in u16");
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&payload_len.to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(tiff);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

#[cfg(test)]
mod tests {
    use super::{jpeg_with_capture_date, jpeg_without_capture_date};
    use exif::{In, Reader, Tag};
    use std::io::Cursor;

    #[test]
    fn fixtures_decode_with_the_exif_reader() {
        let dated = Reader::new()
            .read_from_container(&mut Cursor::new(jpeg_with_capture_date("2020:01:02 03:04:05")))
            .expect("dated fixture decodes");
        assert!(dated.get_field(Tag::DateTimeOriginal, In::PRIMARY).is_some());

        let undated = Reader::new()
            .read_from_container(&mut Cursor::new(jpeg_without_capture_date()))
            .expect("undated fixture decodes");
        assert!(undated.get_field(Tag::DateTimeOriginal, In::PRIMARY).is_none());
        assert!(undated.get_field(Tag::Orientation, In::PRIMARY).is_some());
    }
}
