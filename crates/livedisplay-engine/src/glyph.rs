//! Bitmap font and text rasteriser.
//!
//! Glyphs are stored one byte per column, top row in bit 6, so every glyph
//! is a whole number of 7-pixel columns. Rendering flattens the columns into
//! the column-major pixel stream the pixel grids consume.

/// Height of every glyph and of every display row, in pixels
pub const ROWS: usize = 7;

/// Width of the block drawn for characters missing from the table
pub const MISSING_GLYPH_WIDTH: usize = 3;

/// Column-major pixel bits; index `column * ROWS + row`
pub type PixelStream = Vec<bool>;

const FULL_COLUMN: u8 = 0b1111111;
const MISSING_GLYPH: [u8; MISSING_GLYPH_WIDTH] = [FULL_COLUMN; MISSING_GLYPH_WIDTH];

static GLYPHS: &[(char, &[u8])] = &[
    ('0', &[0b1111111, 0b1000001, 0b1000001, 0b1111111]),
    ('1', &[0b1000000, 0b1111111]),
    ('2', &[0b1001111, 0b1001001, 0b1001001, 0b1111001]),
    ('3', &[0b1001001, 0b1001001, 0b1001001, 0b1111111]),
    ('4', &[0b1111000, 0b0001000, 0b0001000, 0b1111111]),
    ('5', &[0b1111001, 0b1001001, 0b1001001, 0b1001111]),
    ('6', &[0b1111111, 0b1001001, 0b1001001, 0b1001111]),
    ('7', &[0b1000000, 0b1000000, 0b1000000, 0b1111111]),
    ('8', &[0b1111111, 0b1001001, 0b1001001, 0b1111111]),
    ('9', &[0b1111001, 0b1001001, 0b1001001, 0b1111111]),
    ('a', &[0b0010111, 0b0010101, 0b0011111]),
    ('b', &[0b1111111, 0b0001001, 0b0001111]),
    ('c', &[0b0011111, 0b0010001, 0b0010001]),
    ('d', &[0b0001111, 0b0001001, 0b1111111]),
    ('e', &[0b0011111, 0b0010101, 0b0011101]),
    ('f', &[0b0001000, 0b1111111, 0b1001000]),
    ('g', &[0b0011101, 0b0010101, 0b0011111]),
    ('h', &[0b1111111, 0b0001000, 0b0001111]),
    ('i', &[0b1011111]),
    ('j', &[0b0000001, 0b0101111]),
    ('k', &[0b1111111, 0b0000100, 0b0011011]),
    ('l', &[0b1111111, 0b0000001]),
    ('m', &[0b0011111, 0b0010000, 0b0011110, 0b0010000, 0b0011111]),
    ('n', &[0b0011111, 0b0010000, 0b0011111]),
    ('o', &[0b0011111, 0b0010001, 0b0011111]),
    ('p', &[0b0011111, 0b0010100, 0b0011100]),
    ('q', &[0b0011100, 0b0010100, 0b0011111]),
    ('r', &[0b0011111, 0b0010000, 0b0010000]),
    ('s', &[0b0011101, 0b0010101, 0b0010111]),
    ('t', &[0b1111111, 0b0001001, 0b0001001]),
    ('u', &[0b0011111, 0b0000001, 0b0011111]),
    ('v', &[0b0011110, 0b0000001, 0b0011110]),
    ('w', &[0b0011110, 0b0000001, 0b0000110, 0b0000001, 0b0011110]),
    ('x', &[0b0011011, 0b0000100, 0b0011011]),
    ('y', &[0b0011101, 0b0000101, 0b0011111]),
    ('z', &[0b0010011, 0b0010101, 0b0011001]),
    ('A', &[0b1111111, 0b1001000, 0b1001000, 0b1111111]),
    ('B', &[0b1000001, 0b1111111, 0b1001001, 0b1111111]),
    ('C', &[0b1111111, 0b1000001, 0b1000001, 0b1000001]),
    ('D', &[0b1000001, 0b1111111, 0b1000001, 0b1111111]),
    ('E', &[0b1111111, 0b1001001, 0b1001001, 0b1000001]),
    ('F', &[0b1111111, 0b1001000, 0b1001000, 0b1001000]),
    ('G', &[0b1111111, 0b1000001, 0b1001001, 0b1001111]),
    ('H', &[0b1111111, 0b0001000, 0b0001000, 0b1111111]),
    ('I', &[0b1000001, 0b1111111, 0b1000001]),
    ('J', &[0b0000001, 0b1000001, 0b1111111]),
    ('K', &[0b1111111, 0b0001000, 0b0010100, 0b1100011]),
    ('L', &[0b1111111, 0b0000001, 0b0000001, 0b0000001]),
    ('M', &[0b1111111, 0b0100000, 0b0010000, 0b0100000, 0b1111111]),
    ('N', &[0b1111111, 0b0010000, 0b0001000, 0b0000100, 0b1111111]),
    ('O', &[0b1111111, 0b1000001, 0b1000001, 0b1111111]),
    ('P', &[0b1111111, 0b1001000, 0b1001000, 0b1111000]),
    ('Q', &[0b1111111, 0b1000001, 0b1000010, 0b1111101]),
    ('R', &[0b1111111, 0b1001000, 0b1001100, 0b1111011]),
    ('S', &[0b1111001, 0b1001001, 0b1001001, 0b1001111]),
    ('T', &[0b1000000, 0b1000000, 0b1111111, 0b1000000, 0b1000000]),
    ('U', &[0b1111111, 0b0000001, 0b0000001, 0b1111111]),
    ('V', &[0b1111100, 0b0000010, 0b0000001, 0b0000010, 0b1111100]),
    ('W', &[0b1111111, 0b0000010, 0b0000100, 0b0000010, 0b1111111]),
    ('X', &[0b1100011, 0b0010100, 0b0001000, 0b0010100, 0b1100011]),
    ('Y', &[0b1100000, 0b0010000, 0b0001111, 0b0010000, 0b1100000]),
    ('Z', &[0b1000111, 0b1001001, 0b1010001, 0b1100001]),
    ('.', &[0b0000001]),
    ('!', &[0b1111101]),
    ('?', &[0b1100000, 0b1001101, 0b1111000]),
    (':', &[0b0001010]),
    (';', &[0b0001011]),
    ('-', &[0b0000100, 0b0000100, 0b0000100]),
    ('+', &[0b0000100, 0b0001110, 0b0000100]),
    ('=', &[0b0001010, 0b0001010, 0b0001010]),
    (',', &[0b0000011]),
    (' ', &[0b0000000]),
    ('$', &[0b0111010, 0b0101010, 0b1111111, 0b0101010, 0b0101110]),
    ('£', &[0b0001001, 0b1111111, 0b1001001, 0b1001001, 0b1100001]),
    ('%', &[0b1100011, 0b1100100, 0b0001000, 0b0010011, 0b1100011]),
    ('(', &[0b1111111, 0b1000001]),
    ('[', &[0b1111111, 0b1000001]),
    ('{', &[0b0001000, 0b1111111, 0b1000001]),
    (')', &[0b1000001, 0b1111111]),
    (']', &[0b1000001, 0b1111111]),
    ('}', &[0b1000001, 0b1111111, 0b0001000]),
    ('/', &[0b0000011, 0b0011100, 0b1100000]),
    ('#', &[0b0010100, 0b1111111, 0b0010100, 0b1111111, 0b0010100]),
    ('°', &[0b1110000, 0b1010000, 0b1110000]),
];

/// Stored columns for `ch`, or `None` if the font has no glyph for it
pub fn glyph(ch: char) -> Option<&'static [u8]> {
    GLYPHS
        .iter()
        .find(|(c, _)| *c == ch)
        .map(|(_, columns)| *columns)
}

/// Every character the font can draw, in table order
pub fn supported_chars() -> impl Iterator<Item = char> {
    GLYPHS.iter().map(|(c, _)| *c)
}

/// Width in columns `ch` occupies, excluding the separating blank column
pub fn glyph_width(ch: char) -> usize {
    glyph(ch).map_or(MISSING_GLYPH_WIDTH, <[u8]>::len)
}

/// Rasterise `text` into a column-major pixel stream.
///
/// Each character is followed by one blank column. Characters outside the
/// font are drawn as a solid 3-column block.
pub fn render(text: &str) -> PixelStream {
    let mut stream = PixelStream::with_capacity(text.chars().count() * 5 * ROWS);
    for ch in text.chars() {
        let columns = glyph(ch).unwrap_or(&MISSING_GLYPH);
        for &column in columns {
            push_column(&mut stream, column);
        }
        push_column(&mut stream, 0);
    }
    stream
}

fn push_column(stream: &mut PixelStream, column: u8) {
    for row in 0..ROWS {
        stream.push((column >> (ROWS - 1 - row)) & 1 == 1);
    }
}

/// Draw a pixel stream as `ROWS` lines of text, one character per pixel.
pub fn to_ascii(stream: &[bool], lit: char, unlit: char) -> String {
    let columns = stream.len().div_ceil(ROWS);
    let mut out = String::with_capacity((columns + 1) * ROWS);
    for row in 0..ROWS {
        for column in 0..columns {
            let on = stream.get(column * ROWS + row).copied().unwrap_or(false);
            out.push(if on { lit } else { unlit });
        }
        if row + 1 < ROWS {
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_columns_fit_in_seven_rows() {
        for (ch, columns) in GLYPHS {
            assert!(!columns.is_empty(), "glyph {:?} has no columns", ch);
            for column in columns.iter() {
                assert!(*column <= FULL_COLUMN, "glyph {:?} overflows 7 rows", ch);
            }
        }
    }

    #[test]
    fn test_no_duplicate_glyphs() {
        let mut seen = std::collections::HashSet::new();
        for ch in supported_chars() {
            assert!(seen.insert(ch), "duplicate glyph {:?}", ch);
        }
    }

    #[test]
    fn test_render_length_includes_blank_column_per_char() {
        let text = "Hello, World! 12:30 £5 °C";
        let expected: usize = text.chars().map(|c| (glyph_width(c) + 1) * ROWS).sum();
        let stream = render(text);
        assert_eq!(stream.len(), expected);
        assert_eq!(stream.len() % ROWS, 0);
    }

    #[test]
    fn test_render_digit_one() {
        let stream = render("1");
        let expected: Vec<bool> = [
            1, 0, 0, 0, 0, 0, 0, //
            1, 1, 1, 1, 1, 1, 1, //
            0, 0, 0, 0, 0, 0, 0,
        ]
        .iter()
        .map(|b| *b == 1)
        .collect();
        assert_eq!(stream, expected);
    }

    #[test]
    fn test_unknown_char_renders_solid_block() {
        let stream = render("¿");
        assert_eq!(stream.len(), 7 * 4);
        assert!(stream[..21].iter().all(|on| *on));
        assert!(stream[21..].iter().all(|on| !*on));
    }

    #[test]
    fn test_empty_text_renders_nothing() {
        assert!(render("").is_empty());
    }

    #[test]
    fn test_to_ascii_pads_partial_columns() {
        let art = to_ascii(&[true, false, true], '#', '.');
        assert_eq!(art, "#\n.\n#\n.\n.\n.\n.");
    }
}
