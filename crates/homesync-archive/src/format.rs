use std::io::{self, Read, Seek};

use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveFormat {
    Tar(TarCompress),
}

/// Compression codec for tar archives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TarCompress {
    None,
    Gzip,
}

impl TarCompress {
    /// Create a decoder for this compression codec.
    pub fn decoder<R: Read>(self, reader: R) -> Decoder<R> {
        match self {
            Self::None => Decoder::Passthrough(reader),
            Self::Gzip => Decoder::Gzip(Box::new(flate2::read::GzDecoder::new(reader))),
        }
    }
}

/// Decoder wrapper for tar decompression.
#[derive(Debug)]
pub enum Decoder<R> {
    Passthrough(R),
    Gzip(Box<flate2::read::GzDecoder<R>>),
}

impl<R: Read> Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Self::Passthrough(r) => r.read(buf),
            Self::Gzip(d) => d.read(buf),
        }
    }
}

pub fn detect_format(data: &[u8]) -> Option<ArchiveFormat> {
    match data {
        [0x1F, 0x8B, ..] => Some(ArchiveFormat::Tar(TarCompress::Gzip)),
        _ if is_tar_header(data) => Some(ArchiveFormat::Tar(TarCompress::None)),
        _ => None,
    }
}

fn is_tar_header(data: &[u8]) -> bool {
    // "ustar\0" for POSIX archives, "ustar " for old GNU ones. Pre-POSIX
    // headers carry no magic, only the checksum.
    data.len() >= 512 && (&data[257..262] == b"ustar" || has_valid_checksum(&data[..512]))
}

const CHECKSUM_FIELD: std::ops::Range<usize> = 148..156;

/// Whether the octal checksum recorded in a header block matches its bytes,
/// counting the checksum field itself as spaces.
fn has_valid_checksum(block: &[u8]) -> bool {
    let mut digits = block[CHECKSUM_FIELD]
        .iter()
        .skip_while(|b| **b == b' ')
        .take_while(|b| (b'0'..=b'7').contains(*b))
        .peekable();
    if digits.peek().is_none() {
        return false;
    }
    let recorded = digits.fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));

    let actual: u32 = block
        .iter()
        .enumerate()
        .map(|(i, b)| {
            if CHECKSUM_FIELD.contains(&i) {
                u32::from(b' ')
            } else {
                u32::from(*b)
            }
        })
        .sum();
    recorded == actual
}

/// Sniff the format from the first block of `reader`, then rewind it.
pub fn detect_from_reader<R: Read + Seek>(reader: &mut R) -> Result<ArchiveFormat, Error> {
    let mut header = Vec::with_capacity(512);
    reader.by_ref().take(512).read_to_end(&mut header)?;
    reader.rewind()?;
    detect_format(&header).ok_or(Error::UnsupportedFormat)
}
