//! The `@9#W,H_a,b,c,d` nine-slice directive.

use crate::types::{BorderOrder, NineSlice};

/// Marker that opens a nine-slice directive.
pub const DIRECTIVE_MARKER: &str = "@9#";

/// Find the first well-formed directive in `name`.
///
/// Returns the name with the directive removed plus the parsed slice. A
/// directive that does not have exactly six numbers is not recognised and
/// the name is left untouched.
pub fn extract_nine_slice(name: &str, order: BorderOrder) -> Option<(String, NineSlice)> {
    let mut search_from = 0;
    while let Some(offset) = name[search_from..].find(DIRECTIVE_MARKER) {
        let start = search_from + offset;
        let body = &name[start + DIRECTIVE_MARKER.len()..];

        if let Some((values, consumed)) = parse_numbers(body) {
            let end = start + DIRECTIVE_MARKER.len() + consumed;
            let stripped = format!("{}{}", &name[..start], &name[end..]).trim().to_string();
            let slice = NineSlice {
                width: values[0],
                height: values[1],
                border: order.to_border([values[2], values[3], values[4], values[5]]),
            };
            return Some((stripped, slice));
        }

        search_from = start + DIRECTIVE_MARKER.len();
    }
    None
}

/// Whether the name contains the directive marker at all.
pub fn has_directive_marker(name: &str) -> bool {
    name.contains(DIRECTIVE_MARKER)
}

/// Parse `W,H_a,b,c,d`. Returns the values and the number of bytes consumed.
fn parse_numbers(body: &str) -> Option<([u32; 6], usize)> {
    let bytes = body.as_bytes();
    let mut values = [0u32; 6];
    let mut pos = 0;

    for (index, value) in values.iter_mut().enumerate() {
        if index > 0 {
            let expected = if index == 2 { b'_' } else { b',' };
            if bytes.get(pos) != Some(&expected) {
                return None;
            }
            pos += 1;
        }

        let digits_start = pos;
        while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
            pos += 1;
        }
        if pos == digits_start {
            return None;
        }
        *value = body[digits_start..pos].parse().ok()?;
    }

    // A seventh number means the directive is malformed, not shorter.
    if bytes.get(pos) == Some(&b',') && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit) {
        return None;
    }

    Some((values, pos))
}
