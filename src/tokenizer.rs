/*
 *   Copyright (c) 2024 R3BL LLC
 *   All rights reserved.
 *
 *   Licensed under the Apache License, Version 2.0 (the "License");
 *   you may not use this file except in compliance with the License.
 *   You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 *   Unless required by applicable law or agreed to in writing, software
 *   distributed under the License is distributed on an "AS IS" BASIS,
 *   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *   See the License for the specific language governing permissions and
 *   limitations under the License.
 */

//! Splits a raw command-line string into quoted/unquoted fields (§4.A).

const QUOTE_BYTES: [u8; 2] = [b'"', b'\''];

/// One field produced by [`tokenize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub content: String,
    pub quoted: bool,
}

impl Segment {
    pub fn is_quoted(&self) -> bool {
        self.quoted
    }
}

/// Split `line` into an ordered sequence of segments.
///
/// - `"` and `'` open a quoted run that's closed by the matching byte.
///   `\"`/`\'` are un-escaped to the literal quote character inside the run.
/// - A backslash suppresses the special meaning of the following byte.
/// - Outside quotes, runs are further split on ASCII whitespace.
/// - An empty quoted segment (`""`) emits an empty `content` segment.
/// - An unterminated quote run is flushed as an *unquoted* field with the
///   orphan opening quote byte still in its content, eligible for further
///   whitespace splitting (matches `original_source/completer/utils.go`,
///   which always appends the trailing flush with `quoted=false`).
pub fn tokenize(line: &str) -> Vec<Segment> {
    let mut raw_segments: Vec<(Vec<u8>, bool /* quoted and closed */)> = Vec::new();
    let mut current: Vec<u8> = Vec::new();
    let mut current_quote: Option<u8> = None;
    let mut escaped = false;

    for &byte in line.as_bytes() {
        if escaped {
            current.push(byte);
        } else if let Some(q) = current_quote {
            current.push(byte);
            if byte == q {
                raw_segments.push((std::mem::take(&mut current), true));
                current_quote = None;
            }
        } else if QUOTE_BYTES.contains(&byte) {
            if !current.is_empty() {
                raw_segments.push((std::mem::take(&mut current), false));
            }
            current_quote = Some(byte);
            current.push(byte);
        } else {
            current.push(byte);
        }

        escaped = byte == b'\\' && !escaped;
    }

    if !current.is_empty() {
        raw_segments.push((current, false));
    }

    let mut fields = Vec::new();
    for (bytes, quoted) in raw_segments {
        let text = String::from_utf8_lossy(&bytes).into_owned();
        if quoted {
            fields.push(Segment {
                content: unescape_quotes(strip_both_quote_bytes(&text)),
                quoted: true,
            });
        } else {
            let unescaped = unescape_quotes(&text);
            for word in unescaped.split_ascii_whitespace() {
                fields.push(Segment {
                    content: word.to_string(),
                    quoted: false,
                });
            }
        }
    }
    fields
}

/// Convenience used by the completion engine: just the content strings.
pub fn tokenize_strings(line: &str) -> Vec<String> {
    tokenize(line).into_iter().map(|s| s.content).collect()
}

fn strip_both_quote_bytes(quoted: &str) -> &str {
    if quoted.len() <= 2 {
        return "";
    }
    &quoted[1..quoted.len() - 1]
}

fn unescape_quotes(s: &str) -> String {
    let mut out = s.to_string();
    for q in QUOTE_BYTES {
        out = out.replace(&format!("\\{}", q as char), &(q as char).to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(line: &str) -> Vec<String> {
        tokenize(line).into_iter().map(|s| s.content).collect()
    }

    #[test]
    fn unquoted_round_trip() {
        assert_eq!(strings("show interface up"), vec!["show", "interface", "up"]);
    }

    #[test]
    fn collapses_repeated_whitespace() {
        assert_eq!(strings("show   interface\tup"), vec!["show", "interface", "up"]);
    }

    #[test]
    fn quoted_segment_keeps_inner_whitespace() {
        let segs = tokenize(r#"say "hello world""#);
        assert_eq!(segs[0].content, "say");
        assert!(!segs[0].quoted);
        assert_eq!(segs[1].content, "hello world");
        assert!(segs[1].quoted);
    }

    #[test]
    fn empty_quoted_segment() {
        let segs = tokenize(r#"echo """#);
        assert_eq!(segs[1].content, "");
        assert!(segs[1].quoted);
    }

    #[test]
    fn escaped_quote_inside_quoted_run() {
        let segs = tokenize(r#"say "he said \"hi\"""#);
        assert_eq!(segs[1].content, r#"he said "hi""#);
    }

    #[test]
    fn backslash_suppresses_special_meaning() {
        assert_eq!(strings(r#"a\ b"#), vec!["a b"]);
    }

    #[test]
    fn unterminated_quote_flushes_partial_content() {
        let segs = tokenize(r#"show "interface"#);
        assert_eq!(segs[0].content, "show");
        assert_eq!(segs[1].content, "\"interface");
        assert!(!segs[1].quoted);
    }

    #[test]
    fn single_quotes_behave_like_double_quotes() {
        let segs = tokenize("say 'hello world'");
        assert_eq!(segs[1].content, "hello world");
    }
}
