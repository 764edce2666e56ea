use memchr::memchr;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

const MMAP_THRESHOLD: u64 = 1024 * 1024; // 1 MiB

/// Bytes inspected when deciding whether undecodable content is binary
const BINARY_SNIFF_BYTES: usize = 8192;

/// Per-file read failures; the composer substitutes a marker and moves on
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("binary content cannot be decoded as text")]
    Binary,
}

/// Read a whole file and decode it as text.
///
/// Valid UTF-8 (with or without BOM) is returned as-is. Otherwise, content with
/// NUL bytes near the start is rejected as binary and anything else is decoded
/// lossily so a stray legacy-encoded byte never drops the whole file.
pub fn read_text<P: AsRef<Path>>(path: P) -> Result<String, ReadError> {
    let path = path.as_ref();
    let len = std::fs::metadata(path)?.len();

    if len > MMAP_THRESHOLD {
        let file = File::open(path)?;
        // Safety: read-only map of an existing regular file
        let mmap = unsafe { Mmap::map(&file)? };
        decode(&mmap)
    } else {
        let bytes = std::fs::read(path)?;
        decode(&bytes)
    }
}

fn decode(bytes: &[u8]) -> Result<String, ReadError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(s.to_string()),
        Err(_) => {
            let head = &bytes[..bytes.len().min(BINARY_SNIFF_BYTES)];
            if memchr(0, head).is_some() {
                return Err(ReadError::Binary);
            }
            Ok(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Read at most `n` leading bytes; short files return what they have.
pub fn read_prefix(path: &Path, n: usize) -> std::io::Result<Vec<u8>> {
    use std::io::Read;

    let mut buf = Vec::with_capacity(n);
    File::open(path)?.take(n as u64).read_to_end(&mut buf)?;
    Ok(buf)
}
