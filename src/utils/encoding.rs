use std::io::{self, Read, Write};

/// Largest number of bytes pulled from a reader in one step when the
/// element count comes from untrusted input.
const READ_CHUNK: usize = 1 << 16;

/// Write a u32 in little-endian format
pub fn write_u32_le<W: Write>(writer: &mut W, value: u32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Read a u32 in little-endian format
pub fn read_u32_le<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Write a 64-bit word in little-endian format
pub fn write_word<W: Write>(writer: &mut W, value: u64) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Read a 64-bit word in little-endian format
pub fn read_word<R: Read>(reader: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Write a run of 64-bit words, batching them into one buffer
pub fn write_words<W: Write>(writer: &mut W, values: &[u64]) -> io::Result<()> {
    let mut buffer = Vec::with_capacity(values.len().min(READ_CHUNK / 8) * 8);
    for &value in values {
        buffer.extend_from_slice(&value.to_le_bytes());
        if buffer.len() >= READ_CHUNK {
            writer.write_all(&buffer)?;
            buffer.clear();
        }
    }
    if !buffer.is_empty() {
        writer.write_all(&buffer)?;
    }
    Ok(())
}

/// Read exactly `len` bytes.
///
/// The buffer grows chunk by chunk, so a bogus length taken from a corrupt
/// header fails with `UnexpectedEof` instead of allocating up front.
pub fn read_bytes<R: Read>(reader: &mut R, len: usize) -> io::Result<Vec<u8>> {
    let mut data = Vec::with_capacity(len.min(READ_CHUNK));
    let mut remaining = len;
    let mut chunk = [0u8; 4096];

    while remaining > 0 {
        let step = remaining.min(chunk.len());
        reader.read_exact(&mut chunk[..step])?;
        data.extend_from_slice(&chunk[..step]);
        remaining -= step;
    }

    Ok(data)
}

/// Read exactly `count` little-endian 64-bit words
pub fn read_words<R: Read>(reader: &mut R, count: usize) -> io::Result<Vec<u64>> {
    let len = count.checked_mul(8).ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidData, "word count overflows")
    })?;
    let bytes = read_bytes(reader, len)?;
    Ok(bytes
        .chunks_exact(8)
        .map(|chunk| {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            u64::from_le_bytes(word)
        })
        .collect())
}
