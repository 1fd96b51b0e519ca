//! C-header emission of a serialized scene.

use std::io::Write;

/// Number of array entries per emitted line.
const ENTRIES_PER_LINE: usize = 12;

/// Write the word buffer as a C array: `static const int bin[] = {...};`
/// with twelve zero-padded hex entries per line.
pub fn write_c_header(out: &mut impl Write, words: &[u32]) -> std::io::Result<()> {
    writeln!(out, "static const int bin[] = {{")?;
    for chunk in words.chunks(ENTRIES_PER_LINE) {
        for w in chunk {
            write!(out, "0x{w:08X}, ")?;
        }
        writeln!(out)?;
    }
    writeln!(out, "}};")?;
    Ok(())
}
