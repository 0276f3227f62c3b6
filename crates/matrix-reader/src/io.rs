//! Opening matrix files with transparent gzip decompression.

use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::MatrixResult;

/// First two bytes of every gzip member
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

const READ_BUFFER_SIZE: usize = 256 * 1024;

/// Open a matrix file for line-oriented reading.
///
/// Gzip input is detected from its magic bytes rather than the file
/// extension, so `matrix.gz` and `matrix.tab` are handled the same way
/// whatever their content is. Concatenated gzip members are read as one
/// stream.
pub fn open_matrix<P: AsRef<Path>>(path: P) -> MatrixResult<Box<dyn BufRead + Send>> {
    let file = File::open(path.as_ref())?;
    let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);

    let is_gzip = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
    if is_gzip {
        let decoder = MultiGzDecoder::new(reader);
        Ok(Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, decoder)))
    } else {
        Ok(Box::new(reader))
    }
}

/// Count the lines of a matrix file, header line included.
///
/// A final line without a trailing newline still counts. Lines are not
/// decoded, so the count works on any byte content.
pub fn count_lines<P: AsRef<Path>>(path: P) -> MatrixResult<u64> {
    let reader = open_matrix(path)?;
    let mut count = 0u64;
    for line in reader.split(b'\n') {
        line?;
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::{Read, Write};

    #[test]
    fn test_open_plain_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"a\tb\nc\td\n").unwrap();

        let mut content = String::new();
        open_matrix(file.path())
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "a\tb\nc\td\n");
    }

    #[test]
    fn test_open_concatenated_gzip_members() {
        let mut bytes = Vec::new();
        for part in ["first\n", "second\n"] {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
            encoder.write_all(part.as_bytes()).unwrap();
            bytes.extend(encoder.finish().unwrap());
        }
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&bytes).unwrap();

        assert_eq!(count_lines(file.path()).unwrap(), 2);
    }

    #[test]
    fn test_count_lines_without_trailing_newline() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"one\ntwo\nthree").unwrap();
        assert_eq!(count_lines(file.path()).unwrap(), 3);
    }

    #[test]
    fn test_count_lines_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(count_lines(file.path()).unwrap(), 0);
    }

    #[test]
    fn test_truncated_gzip_is_an_error() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(&[b'x'; 4096]).unwrap();
        let bytes = encoder.finish().unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&bytes[..bytes.len() / 2]).unwrap();

        assert!(count_lines(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = count_lines("/nonexistent/matrix.gz").unwrap_err();
        assert!(matches!(err, crate::MatrixError::IoError(_)));
    }
}
