//! Splits a single source line into data cells and an optional trailing comment.
//!
//! Cells are separated by a tab or by two or more spaces. A backslash escapes the
//! next character, so `\#` and `\ ` never start a comment or end a cell.

use super::Cell;

pub fn tokenize(text: &str) -> (Vec<Cell>, Option<Cell>) {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut cells = Vec::new();
    let mut comment = None;
    let mut i = 0;

    while i < len {
        while i < len && is_blank(chars[i]) {
            i += 1;
        }
        if i >= len {
            break;
        }
        let start = i;
        if chars[start] == '#' {
            let raw: String = chars[start..].iter().collect();
            comment = Some(Cell::new(raw.trim_end(), start + 1));
            break;
        }
        let mut end = start;
        while end < len {
            let c = chars[end];
            if c == '\t' {
                break;
            }
            if c == ' ' && (end + 1 >= len || is_blank(chars[end + 1])) {
                break;
            }
            if c == '\\' && end + 1 < len {
                end += 2;
                continue;
            }
            end += 1;
        }
        let value: String = chars[start..end].iter().collect();
        cells.push(Cell::new(value, start + 1));
        i = end;
    }
    (cells, comment)
}

pub fn leading_whitespace(text: &str) -> usize {
    text.chars().take_while(|c| is_blank(*c)).count()
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}
