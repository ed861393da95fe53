use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells. Tabs count as 4 cells.
pub fn display_width(s: &str) -> usize {
    s.split('\t')
        .enumerate()
        .map(|(i, part)| {
            let w = UnicodeWidthStr::width(part);
            if i > 0 { w + 4 } else { w }
        })
        .sum()
}

fn grapheme_display_width(g: &str) -> usize {
    if g == "\t" {
        4
    } else {
        UnicodeWidthStr::width(g)
    }
}

/// A run of either visible text or one ANSI escape sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Escape(&'a str),
}

/// Split a string into text runs and whole escape sequences.
///
/// Recognizes CSI (`ESC [ … final`), OSC (`ESC ] … BEL` or `ESC ] … ESC \`)
/// and two-byte escapes. An unterminated sequence runs to the end of input.
fn segments(s: &str) -> Vec<Segment<'_>> {
    let bytes = s.as_bytes();
    let mut out = Vec::new();
    let mut text_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == 0x1b {
            if text_start < i {
                out.push(Segment::Text(&s[text_start..i]));
            }
            let end = escape_end(bytes, i);
            out.push(Segment::Escape(&s[i..end]));
            i = end;
            text_start = end;
        } else {
            i += 1;
        }
    }
    if text_start < bytes.len() {
        out.push(Segment::Text(&s[text_start..]));
    }
    out
}

fn escape_end(bytes: &[u8], start: usize) -> usize {
    let len = bytes.len();
    let mut i = start + 1;
    match bytes.get(i) {
        Some(b'[') => {
            i += 1;
            while i < len {
                let b = bytes[i];
                i += 1;
                if (0x40..=0x7e).contains(&b) {
                    return i;
                }
            }
            len
        }
        Some(b']') => {
            i += 1;
            while i < len {
                if bytes[i] == 0x07 {
                    return i + 1;
                }
                if bytes[i] == 0x1b && bytes.get(i + 1) == Some(&b'\\') {
                    return i + 2;
                }
                i += 1;
            }
            len
        }
        Some(b) if b.is_ascii() => i + 1,
        _ => i,
    }
}

/// Remove every ANSI escape sequence from `s`.
pub fn strip_ansi(s: &str) -> String {
    if !s.contains('\x1b') {
        return s.to_string();
    }
    segments(s)
        .into_iter()
        .filter_map(|seg| match seg {
            Segment::Text(t) => Some(t),
            Segment::Escape(_) => None,
        })
        .collect()
}

/// Visible width of `s` in cells, not counting escape sequences.
pub fn visual_len(s: &str) -> usize {
    segments(s)
        .into_iter()
        .map(|seg| match seg {
            Segment::Text(t) => display_width(t),
            Segment::Escape(_) => 0,
        })
        .sum()
}

/// Longest prefix of plain text `s` that fits in `max_cells`.
pub fn take_width(s: &str, max_cells: usize) -> &str {
    let mut width = 0;
    for (i, g) in s.grapheme_indices(true) {
        let gw = grapheme_display_width(g);
        if width + gw > max_cells {
            return &s[..i];
        }
        width += gw;
    }
    s
}

/// Truncate `s` to `width` visible cells, ending in `ellipsis` when cut.
///
/// Escape sequences are copied whole and never split. When `width` cannot
/// even hold the ellipsis the visible prefix is empty and the ellipsis
/// itself is clipped to `width`.
pub fn truncate(s: &str, width: usize, ellipsis: &str) -> String {
    if visual_len(s) <= width {
        return s.to_string();
    }
    let ellipsis_width = display_width(ellipsis);
    if width < ellipsis_width {
        return take_width(ellipsis, width).to_string();
    }
    let budget = width - ellipsis_width;

    let mut out = String::new();
    let mut used = 0;
    'outer: for seg in segments(s) {
        match seg {
            Segment::Escape(e) => out.push_str(e),
            Segment::Text(t) => {
                for g in t.graphemes(true) {
                    let gw = grapheme_display_width(g);
                    if used + gw > budget {
                        break 'outer;
                    }
                    used += gw;
                    out.push_str(g);
                }
            }
        }
    }
    out.push_str(ellipsis);
    out
}

/// Pad `s` on both sides to `width` visible cells; the left side gets the
/// smaller half. Strings already at least `width` wide are returned as is.
pub fn center(s: &str, width: usize) -> String {
    let len = visual_len(s);
    if len >= width {
        return s.to_string();
    }
    let pad = width - len;
    let left = pad / 2;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(pad - left))
}

/// Previous grapheme boundary before `byte_offset`. Returns None if at start.
pub fn prev_grapheme_boundary(s: &str, byte_offset: usize) -> Option<usize> {
    if byte_offset == 0 {
        return None;
    }
    let prefix = &s[..byte_offset.min(s.len())];
    let mut last_start = 0;
    for (i, _) in prefix.grapheme_indices(true) {
        last_start = i;
    }
    Some(last_start)
}
