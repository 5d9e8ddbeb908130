//! Text dumps of transferred data.

use std::fmt;

const BYTES_PER_LINE: usize = 16;
const WORDS_PER_LINE: usize = 16;

/// Canonical hex + ASCII dump
///
/// ```text
/// 00000000  48 65 6c 6c 6f 00 00 00  00 00 00 00 00 00 00 00  Hello...........
/// ```
#[derive(Debug, Clone, Copy)]
pub struct HexDump<'a>(pub &'a [u8]);

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0;
        for (line, chunk) in bytes.chunks(BYTES_PER_LINE).enumerate() {
            write!(f, "{:08x}", line * BYTES_PER_LINE)?;

            for i in 0..BYTES_PER_LINE {
                if i % (BYTES_PER_LINE / 2) == 0 {
                    f.write_str(" ")?;
                }
                match chunk.get(i) {
                    Some(b) => write!(f, " {b:02x}")?,
                    None => f.write_str("   ")?,
                }
            }

            f.write_str("  ")?;
            for &b in chunk {
                let c = if (b' '..=b'~').contains(&b) { b as char } else { '.' };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// 32-bit word dump, 16 words per line, each line prefixed by the index of
/// its first word
///
/// ```text
///
/// [00000000] 00000000 00000001 ...
/// [00000010] ...
/// ```
#[derive(Debug, Clone, Copy)]
pub struct WordDump<'a>(pub &'a [u32]);

impl fmt::Display for WordDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, word) in self.0.iter().enumerate() {
            if i % WORDS_PER_LINE == 0 {
                write!(f, "\n[{i:08x}] ")?;
            }
            write!(f, "{word:08x} ")?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_dump_is_empty() {
        assert_eq!(HexDump(&[]).to_string(), "");
    }

    #[test]
    fn full_line() {
        let data: Vec<u8> = (0x41..0x51).collect();
        assert_eq!(
            HexDump(&data).to_string(),
            "00000000  41 42 43 44 45 46 47 48  49 4a 4b 4c 4d 4e 4f 50  ABCDEFGHIJKLMNOP\n"
        );
    }

    #[test]
    fn partial_line_is_padded() {
        let data = [b'h', b'i', 0x00, 0x7f, 0xff];
        let line = HexDump(&data).to_string();
        assert_eq!(
            line,
            format!("00000000  68 69 00 7f ff{}  hi...\n", " ".repeat(3 * 3 + 1 + 3 * 8))
        );
    }

    #[test]
    fn second_line_offset() {
        let data = [0u8; 17];
        let text = HexDump(&data).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("00000010  00 "));
    }

    #[test]
    fn word_dump_layout() {
        let words: Vec<u32> = (0..17).collect();
        let text = WordDump(&words).to_string();
        assert!(text.starts_with("\n[00000000] 00000000 00000001 "));
        assert!(text.ends_with("\n[00000010] 00000010 \n"));
    }
}
