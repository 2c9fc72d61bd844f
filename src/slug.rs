//! Title normalization.
//!
//! Turns a free-form entry title into a slug that works both as a lookup
//! key and as a file name inside the content root. Normalization is a
//! pure, total function: the worst it can do is return an empty string,
//! which the service layer rejects before anything is written.

/// Characters replaced with a hyphen during normalization.
const REPLACED: [char; 5] = [' ', ',', '\'', '?', '!'];

/// Normalize a raw title into a slug.
///
/// The input may arrive already URL-encoded, so it is percent-decoded
/// first. Then every space, comma, apostrophe, question mark, and
/// exclamation mark becomes a hyphen, runs of hyphens collapse to one,
/// and a single trailing hyphen is stripped.
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(raw_title: &str) -> String {
    let decoded = percent_decode(raw_title);

    let mut slug = String::with_capacity(decoded.len());
    let mut prev_hyphen = false;
    for ch in decoded.chars() {
        let ch = if REPLACED.contains(&ch) { '-' } else { ch };
        if ch == '-' {
            if !prev_hyphen {
                slug.push('-');
            }
            prev_hyphen = true;
        } else {
            slug.push(ch);
            prev_hyphen = false;
        }
    }

    if slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Decode `%XX` escapes. Malformed escapes pass through as literal
/// text; invalid UTF-8 after decoding is replaced lossily.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hi = (bytes[i + 1] as char).to_digit(16);
            let lo = (bytes[i + 2] as char).to_digit(16);
            if let (Some(hi), Some(lo)) = (hi, lo) {
                out.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_punctuation_with_hyphens() {
        assert_eq!(normalize("Hello, World?"), "Hello-World");
        assert_eq!(normalize("Don't Panic!"), "Don-t-Panic");
    }

    #[test]
    fn collapses_hyphen_runs() {
        assert_eq!(normalize("a  b"), "a-b");
        assert_eq!(normalize("a ,'?! b"), "a-b");
        assert_eq!(normalize("a---b"), "a-b");
    }

    #[test]
    fn strips_trailing_hyphen() {
        assert_eq!(normalize("trailing-"), "trailing");
        assert_eq!(normalize("trailing "), "trailing");
    }

    #[test]
    fn decodes_percent_escapes() {
        assert_eq!(normalize("Hello%2C%20World"), "Hello-World");
        assert_eq!(normalize("caf%C3%A9"), "café");
    }

    #[test]
    fn malformed_escape_passes_through() {
        assert_eq!(normalize("100%"), "100%");
        assert_eq!(normalize("a%zzb"), "a%zzb");
    }

    #[test]
    fn empty_and_all_punctuation_yield_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("?!, '"), "");
    }

    #[test]
    fn idempotent() {
        for raw in [
            "Hello, World?",
            "a  b",
            "trailing-",
            "already-a-slug",
            "What's up, doc?!",
            "Hello%2C%20World",
            "",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", raw);
        }
    }
}
