//! Set-Cookie splitting.
//!
//! # Responsibilities
//! - Turn the raw `Set-Cookie` values exposed by the transport into one
//!   string per cookie-setting instruction
//! - Accept both the multi-value form (one value per instruction) and the
//!   folded form (all instructions joined by `,`)
//!
//! # Design Decisions
//! - A comma inside an `Expires` date (`Expires=Wed, 21 Oct 2015 ...`) is never
//!   a delimiter: a comma only separates cookies when the attribute it
//!   terminates is not `Expires=<weekday>`
//! - Best effort on ambiguous input; fragments that are not valid
//!   instructions are rejected later by the parser

const WEEKDAYS: [&str; 14] = [
    "mon", "tue", "wed", "thu", "fri", "sat", "sun",
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

/// Split raw `Set-Cookie` header values into individual instructions.
///
/// Several values means the transport kept the header repetition intact and
/// each value is already one instruction. A single value may be folded and is
/// scanned for delimiters.
pub fn split_set_cookie<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    match values {
        [] => Vec::new(),
        [single] => split_folded(single.as_ref()),
        many => many
            .iter()
            .map(|v| v.as_ref().trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

/// Split a single, possibly folded, `Set-Cookie` value.
pub fn split_folded(header: &str) -> Vec<String> {
    let mut instructions = Vec::new();
    let mut start = 0;

    for (idx, ch) in header.char_indices() {
        if ch != ',' {
            continue;
        }
        let current = &header[start..idx];
        if ends_in_expires_weekday(current) {
            continue;
        }
        push_trimmed(&mut instructions, current);
        start = idx + 1;
    }
    push_trimmed(&mut instructions, &header[start..]);

    instructions
}

/// True when the last attribute of `instruction` reads `Expires=<weekday>`,
/// i.e. the following comma belongs to the date.
fn ends_in_expires_weekday(instruction: &str) -> bool {
    // A bare `name=value` segment can't be an attribute.
    let Some((_, attribute)) = instruction.rsplit_once(';') else {
        return false;
    };
    let Some((key, value)) = attribute.split_once('=') else {
        return false;
    };
    key.trim().eq_ignore_ascii_case("expires") && is_weekday(value.trim())
}

fn is_weekday(token: &str) -> bool {
    WEEKDAYS.iter().any(|day| token.eq_ignore_ascii_case(day))
}

fn push_trimmed(out: &mut Vec<String>, fragment: &str) {
    let fragment = fragment.trim();
    if !fragment.is_empty() {
        out.push(fragment.to_string());
    }
}
