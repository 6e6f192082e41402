//! Indentation preprocessor for whitespace-significant sources.
//!
//! Turns leading whitespace into explicit block tokens with a single
//! stack-based pass, so later stages never track indentation themselves.
//!
//! ```text
//! if x:            if x:
//!     a      =>    INDENT
//! b                a
//!                  DEDENT
//!                  b
//! ```

/// One token of the preprocessed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    BlockStart,
    BlockEnd,
    /// Content line with its leading whitespace removed.
    Line(&'a str),
    /// Blank or whitespace-only line.
    Blank,
    /// Line inside a multi-line string, passed through untouched.
    Verbatim(&'a str),
}

/// Stack-based indentation tracker.
#[derive(Debug, Clone)]
pub struct Preprocessor<'p> {
    comment_prefix: Option<&'p str>,
    tab_width: usize,
}

impl Default for Preprocessor<'_> {
    fn default() -> Self {
        Self {
            comment_prefix: None,
            tab_width: 8,
        }
    }
}

impl<'p> Preprocessor<'p> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat comment-only lines as content at the current level.
    pub fn skip_comments(mut self, prefix: &'p str) -> Self {
        self.comment_prefix = Some(prefix);
        self
    }

    /// Leading-whitespace width; tabs advance to the next tab stop.
    fn width(&self, line: &str) -> usize {
        let mut width = 0;
        for ch in line.chars() {
            match ch {
                ' ' => width += 1,
                '\t' => width = (width / self.tab_width + 1) * self.tab_width,
                _ => break,
            }
        }
        width
    }

    /// Produce the token stream: exactly one line token per input line,
    /// plus block markers.
    pub fn tokenize<'a>(&self, source: &'a str) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        let mut stack = vec![0usize];
        let mut open_string: Option<&'static str> = None;

        for line in source.lines() {
            if let Some(delim) = open_string {
                tokens.push(Token::Verbatim(line));
                if line.matches(delim).count() % 2 == 1 {
                    open_string = None;
                }
                continue;
            }

            let content = line.trim_start();
            if content.is_empty() {
                tokens.push(Token::Blank);
                continue;
            }
            if self
                .comment_prefix
                .is_some_and(|prefix| content.starts_with(prefix))
            {
                tokens.push(Token::Line(content));
                continue;
            }

            let width = self.width(line);
            let top = stack.last().copied().unwrap_or(0);
            if width > top {
                stack.push(width);
                tokens.push(Token::BlockStart);
            } else if width < top {
                while stack.len() > 1 && stack.last().is_some_and(|&level| level > width) {
                    stack.pop();
                    tokens.push(Token::BlockEnd);
                }
                if stack.last() != Some(&width) {
                    tracing::trace!(width, "inconsistent dedent, using enclosing level");
                }
            }
            tokens.push(Token::Line(content));

            open_string = ["\"\"\"", "'''"]
                .into_iter()
                .find(|delim| content.matches(delim).count() % 2 == 1);
        }

        for _ in 1..stack.len() {
            tokens.push(Token::BlockEnd);
        }
        tokens
    }

    /// Marker form: `INDENT` / `DEDENT` on their own lines.
    pub fn render_markers(&self, source: &str) -> String {
        let lines: Vec<&str> = self
            .tokenize(source)
            .into_iter()
            .map(|token| match token {
                Token::BlockStart => "INDENT",
                Token::BlockEnd => "DEDENT",
                Token::Line(content) => content,
                Token::Blank => "",
                Token::Verbatim(raw) => raw,
            })
            .collect();
        lines.join("\n")
    }

    /// Rewrite indentation as `unit` repeated once per block level.
    ///
    /// Line count is preserved, so rows in the output match the input.
    pub fn reindent(&self, source: &str, unit: &str) -> String {
        let mut out = String::with_capacity(source.len());
        let mut depth = 0usize;
        let mut first = true;

        for token in self.tokenize(source) {
            let line = match token {
                Token::BlockStart => {
                    depth += 1;
                    continue;
                }
                Token::BlockEnd => {
                    depth = depth.saturating_sub(1);
                    continue;
                }
                Token::Line(content) => Some(content),
                Token::Blank => None,
                Token::Verbatim(raw) => {
                    if !first {
                        out.push('\n');
                    }
                    first = false;
                    out.push_str(raw);
                    continue;
                }
            };
            if !first {
                out.push('\n');
            }
            first = false;
            if let Some(content) = line {
                for _ in 0..depth {
                    out.push_str(unit);
                }
                out.push_str(content);
            }
        }

        if source.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}

/// Marker rendering with default settings.
pub fn preprocess(source: &str) -> String {
    Preprocessor::new().render_markers(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_markers() {
        let source = indoc! {"
            def f():
                x = 1

                if x:
                    print(x)
            f()
        "};
        assert_eq!(
            preprocess(source),
            "def f():\nINDENT\nx = 1\n\nif x:\nINDENT\nprint(x)\nDEDENT\nDEDENT\nf()"
        );
    }

    #[test]
    fn test_dedents_at_eof() {
        let tokens = Preprocessor::new().tokenize("a:\n  b:\n    c");
        let ends = tokens.iter().filter(|t| **t == Token::BlockEnd).count();
        assert_eq!(ends, 2);
        assert_eq!(tokens.last(), Some(&Token::BlockEnd));
    }

    #[test]
    fn test_inconsistent_dedent_is_tolerated() {
        let tokens = Preprocessor::new().tokenize("if a:\n        b\n    c");
        assert_eq!(
            tokens,
            vec![
                Token::Line("if a:"),
                Token::BlockStart,
                Token::Line("b"),
                Token::BlockEnd,
                Token::Line("c"),
            ]
        );
    }

    #[test]
    fn test_tabs_advance_to_tab_stop() {
        let pre = Preprocessor::new();
        assert_eq!(pre.width("\tx"), 8);
        assert_eq!(pre.width("  \tx"), 8);
        assert_eq!(pre.width("\t x"), 9);
    }

    #[test]
    fn test_reindent_normalizes_width() {
        let source = "def f():\n  if x:\n\tpass\n  return 1\n";
        assert_eq!(
            Preprocessor::new().reindent(source, "    "),
            "def f():\n    if x:\n        pass\n    return 1\n"
        );
    }

    #[test]
    fn test_multiline_string_is_verbatim() {
        let source = "x = \"\"\"\n  keep\n\"\"\"\ny = 1";
        let tokens = Preprocessor::new().tokenize(source);
        assert_eq!(
            tokens,
            vec![
                Token::Line("x = \"\"\""),
                Token::Verbatim("  keep"),
                Token::Verbatim("\"\"\""),
                Token::Line("y = 1"),
            ]
        );
    }

    #[test]
    fn test_comment_lines_do_not_move_levels() {
        let source = "if a:\n    b\n# note\n    c";
        let tokens = Preprocessor::new().skip_comments("#").tokenize(source);
        assert_eq!(tokens.iter().filter(|t| **t == Token::BlockEnd).count(), 1);
        assert_eq!(
            Preprocessor::new().skip_comments("#").reindent(source, "  "),
            "if a:\n  b\n  # note\n  c"
        );
    }
}
