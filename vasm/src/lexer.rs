//! §4.B: the Line Lexer. The lowering pipeline works line-at-a-time, so this
//! module is just the handful of predicates and splitters every pass needs,
//! not a tokenizer with its own grammar.

/// Drops a trailing `//...` comment. The pipeline only ever sees lines that
/// have already had their original-assembler comments stripped, but passes
/// that synthesize new lines may still want this.
pub fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Splits a line into whitespace-separated words after stripping its
/// trailing comment.
pub fn words(line: &str) -> Vec<&str> {
    strip_comment(line).split_whitespace().collect()
}

/// A block reference: any token beginning with `.` or `!`.
pub fn is_block_ref(word: &str) -> bool {
    word.starts_with('.') || word.starts_with('!')
}

/// A block header: a block-ref token with no interior colon, ending in one.
/// `^(\.|!)[^:]*:`
pub fn is_block_header(word: &str) -> bool {
    if !is_block_ref(word) {
        return false;
    }
    match word.strip_suffix(':') {
        Some(rest) => !rest.contains(':'),
        None => false,
    }
}

/// A whole line that, once trimmed, is nothing but a block header.
pub fn is_block_header_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && is_block_header(trimmed)
}

/// The label name carried by a block header line, colon stripped.
pub fn block_label(line: &str) -> String {
    line.trim().trim_end_matches(':').to_string()
}
