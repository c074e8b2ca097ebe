// src/fonts/default.rs - Default glyph table
//
// Each glyph is drawn as one continuous stroke: markers are visited in
// lexicographic order and the stroke returns to where it started. `x`
// cells are ink with no ordering role.
use crate::fonts::GlyphDef;

/// Look up the glyph for a character, if the table defines one.
pub fn glyph(c: char) -> Option<&'static GlyphDef> {
    GLYPHS.iter().find(|(g, _)| *g == c).map(|(_, def)| def)
}

static GLYPHS: &[(char, GlyphDef)] = &[
    (
        'A',
        GlyphDef {
            art: "
1xx2
x  x
5xx4
x  x
0  3
",
            revisits: &[],
        },
    ),
    (
        'B',
        GlyphDef {
            art: "
1x2
x  3
x54
x  7
0x8
",
            revisits: &[('4', "6")],
        },
    ),
    (
        'C',
        GlyphDef {
            art: "
1xx2
x
x
x
0xx5
",
            revisits: &[('1', "3"), ('0', "4")],
        },
    ),
    (
        'D',
        GlyphDef {
            art: "
456
3  7
2  8
1  9
0BA
",
            revisits: &[],
        },
    ),
    (
        'E',
        GlyphDef {
            art: "
1xx2
x
4x5
x
0xx8
",
            revisits: &[('1', "3"), ('4', "6"), ('0', "7")],
        },
    ),
    (
        'F',
        GlyphDef {
            art: "
1xx2
x
4xx5
x
0
",
            revisits: &[('1', "3"), ('4', "6")],
        },
    ),
    (
        'H',
        GlyphDef {
            art: "
1  4
x  x
2xx3
x  x
0  5
",
            revisits: &[('3', "6"), ('2', "7")],
        },
    ),
    (
        'I',
        GlyphDef {
            art: "
4x3x5
  x
  x
  x
0x2x1
",
            revisits: &[('3', "6"), ('2', "7")],
        },
    ),
    (
        'K',
        GlyphDef {
            art: "
1  4
x x
23
x x
0  6
",
            revisits: &[('3', "57"), ('2', "8")],
        },
    ),
    (
        'L',
        GlyphDef {
            art: "
1
x
x
x
0xx3
",
            revisits: &[('0', "2")],
        },
    ),
    (
        'O',
        GlyphDef {
            art: "
 3xx4
2    5
x    x
1    6
 0xx7
",
            revisits: &[],
        },
    ),
    (
        'R',
        GlyphDef {
            art: "
1xxx2
x    3
x    4
9x6x5
x  x
x   x
0    7
",
            revisits: &[('6', "8")],
        },
    ),
    (
        'S',
        GlyphDef {
            art: "
 AxxB
9    C
8
 7xx6
     5
1    4
 0xx3
",
            revisits: &[
                ('0', "2"),
                ('B', "D"),
                ('A', "E"),
                ('9', "F"),
                ('8', "G"),
                ('7', "H"),
                ('6', "I"),
                ('5', "J"),
                ('4', "K"),
                ('3', "L"),
            ],
        },
    ),
    (
        'T',
        GlyphDef {
            art: "
2x1x3
  x
  x
  x
  0
",
            revisits: &[('1', "4")],
        },
    ),
    (
        'Y',
        GlyphDef {
            art: "
3   1
 x x
  2
 x
0
",
            revisits: &[('2', "4")],
        },
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert!(glyph('A').is_some());
        assert!(glyph('a').is_none());
        assert!(glyph('?').is_none());
    }
}
