//! Wire format of the generated quiz field.
//!
//! Each distractor pair is encoded as `[term][meaning]` and pairs are joined
//! with `|`, so a three-pair field reads `[犬][dog]|[猫][cat]|[鳥][bird]`.
//! The format is kept as-is for compatibility with quiz notes generated by
//! earlier versions; it cannot represent terms or meanings that themselves
//! contain `[`, `]` or `|` (known limitation).

pub const PAIR_SEPARATOR: char = '|';

pub fn encode_pairs<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(term, meaning)| format!("[{}][{}]", term, meaning))
        .collect::<Vec<_>>()
        .join("|")
}

/// Decodes an encoded quiz field back into `(term, meaning)` pairs.
///
/// Tolerant by design: a malformed pair is skipped rather than failing the
/// whole decode, so a partially written field never breaks a scan.
pub fn decode_pairs(encoded: &str) -> Vec<(String, String)> {
    encoded.split(PAIR_SEPARATOR).filter_map(decode_pair).collect()
}

/// The terms of every well-formed pair, in encoded order.
pub fn decode_terms(encoded: &str) -> Vec<String> {
    decode_pairs(encoded).into_iter().map(|(term, _)| term).collect()
}

fn decode_pair(part: &str) -> Option<(String, String)> {
    let part = part.strip_prefix('[')?.strip_suffix(']')?;
    let (term, meaning) = part.split_once("][")?;
    if term.is_empty() {
        return None;
    }
    Some((term.to_string(), meaning.to_string()))
}
