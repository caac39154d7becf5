//! Glob matching for scan patterns
//!
//! Supports the subset of Redis glob syntax the query layer emits:
//! `*` (any run, including empty), `?` (exactly one char) and `\` to escape
//! the next character. Everything else matches literally, including `[`:
//! character classes are never emitted because names are escaped first.

/// True if `text` matches `pattern`
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0usize, 0usize);
    // Position of the last `*` seen and the text index it was tried at
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < t.len() {
        match p.get(pi) {
            Some('*') => {
                backtrack = Some((pi, ti));
                pi += 1;
                continue;
            }
            Some('?') => {
                pi += 1;
                ti += 1;
                continue;
            }
            Some('\\') if pi + 1 < p.len() && p[pi + 1] == t[ti] => {
                pi += 2;
                ti += 1;
                continue;
            }
            Some(&c) if c != '\\' && c == t[ti] => {
                pi += 1;
                ti += 1;
                continue;
            }
            _ => {}
        }

        match backtrack {
            Some((star, matched)) => {
                pi = star + 1;
                ti = matched + 1;
                backtrack = Some((star, matched + 1));
            }
            None => return false,
        }
    }

    p[pi..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal() {
        assert!(glob_match("abc", "abc"));
        assert!(!glob_match("abc", "abd"));
        assert!(!glob_match("abc", "abcd"));
    }

    #[test]
    fn test_trailing_star() {
        let pattern = "@upstash/query:collection:users:*";
        assert!(glob_match(pattern, "@upstash/query:collection:users:1"));
        assert!(glob_match(pattern, "@upstash/query:collection:users:"));
        assert!(glob_match(pattern, "@upstash/query:collection:users:index:x:hashes:y"));
        assert!(!glob_match(pattern, "@upstash/query:collection:users2:1"));
    }

    #[test]
    fn test_inner_star_backtracks() {
        assert!(glob_match("a*b*c", "axxbyyc"));
        assert!(glob_match("a*c", "abcbc"));
        assert!(!glob_match("a*c", "abcb"));
    }

    #[test]
    fn test_question_mark() {
        assert!(glob_match("a?c", "abc"));
        assert!(!glob_match("a?c", "ac"));
    }

    #[test]
    fn test_escape() {
        assert!(glob_match("a\\*", "a*"));
        assert!(!glob_match("a\\*", "ab"));
    }

    #[test]
    fn test_escaped_name_matches_only_itself() {
        let pattern = "ns:collection:user\\?:*";
        assert!(glob_match(pattern, "ns:collection:user?:1"));
        assert!(!glob_match(pattern, "ns:collection:users:1"));

        assert!(glob_match("a\\[b\\]:*", "a[b]:1"));
        assert!(glob_match("a\\\\b", "a\\b"));
        assert!(!glob_match("a\\\\b", "a\\\\b"));
    }

    #[test]
    fn test_only_star_matches_everything() {
        assert!(glob_match("*", ""));
        assert!(glob_match("*", "anything"));
    }
}
