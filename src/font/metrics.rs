//! Advance widths for the standard Type1 fonts, in 1/1000 em, taken from
//! the Adobe core font AFM files. Only the printable ASCII range plus the
//! Latin-1 letters a German business document actually uses are tabulated;
//! everything else measures as the font's average glyph.
//!
//! Times bold and italic reuse the roman table. The difference is a few
//! percent and only affects where long lines wrap.

/// Widths for code points 32..=126.
type AsciiWidths = [u16; 95];

#[derive(Debug, Clone, Copy)]
pub struct StandardFontMetrics {
    ascii: &'static AsciiWidths,
    /// Used for characters outside the table.
    fallback: u16,
    /// Width of the German umlauts and sharp s: (ä ö ü, Ä, Ö, Ü, ß).
    latin: [u16; 5],
}

const HELVETICA_WIDTHS: AsciiWidths = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a..m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n..z
    334, 260, 334, 584, // '{'..'~'
];

const HELVETICA_BOLD_WIDTHS: AsciiWidths = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

const TIMES_ROMAN_WIDTHS: AsciiWidths = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    278, 278, 564, 564, 564, 444, 921,
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
    722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
    333, 278, 333, 469, 500, 333,
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
    500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
    480, 200, 480, 541,
];

const COURIER_WIDTHS: AsciiWidths = [600; 95];

impl StandardFontMetrics {
    pub const HELVETICA: StandardFontMetrics = StandardFontMetrics {
        ascii: &HELVETICA_WIDTHS,
        fallback: 556,
        latin: [556, 667, 778, 722, 611],
    };
    pub const HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics {
        ascii: &HELVETICA_BOLD_WIDTHS,
        fallback: 611,
        latin: [611, 722, 778, 722, 611],
    };
    pub const TIMES_ROMAN: StandardFontMetrics = StandardFontMetrics {
        ascii: &TIMES_ROMAN_WIDTHS,
        fallback: 500,
        latin: [500, 722, 722, 722, 500],
    };
    pub const COURIER: StandardFontMetrics = StandardFontMetrics {
        ascii: &COURIER_WIDTHS,
        fallback: 600,
        latin: [600, 600, 600, 600, 600],
    };

    /// Advance width of one character in 1/1000 em.
    pub fn char_units(&self, ch: char) -> u16 {
        let cp = ch as u32;
        if (32..=126).contains(&cp) {
            return self.ascii[(cp - 32) as usize];
        }
        match ch {
            'ä' | 'ö' | 'ü' => self.latin[0],
            'Ä' => self.latin[1],
            'Ö' => self.latin[2],
            'Ü' => self.latin[3],
            'ß' => self.latin[4],
            '\u{00A0}' => self.ascii[0],
            '•' => 350,
            _ => self.fallback,
        }
    }

    /// Width of one character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.char_units(ch) as f64 / 1000.0 * font_size
    }

    /// Width of a string in points.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|c| self.char_width(c, font_size)).sum()
    }
}
