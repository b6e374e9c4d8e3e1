// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

// Line index over the YAML source. The event parser drops comments, so they
// are recovered here by line number and handed out to nodes as they load.

use saphyr_parser::Marker;

/// Zero-based line and column of a parser marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SourcePos {
    pub line: usize,
    pub col: usize,
}

impl SourcePos {
    pub fn of(mark: &Marker) -> SourcePos {
        SourcePos {
            line: SourceLines::line_of(mark),
            col: mark.col(),
        }
    }
}

pub struct SourceLines<'a> {
    lines: Vec<SourceLine<'a>>,
    // First line not yet searched for whole-line comments.
    next_line: usize,
}

struct SourceLine<'a> {
    text: &'a str,
    indent: usize,
    blank: bool,
    // Inside the body of an already loaded block scalar.
    block_body: bool,
    whole_comment: Option<String>,
    trailing_comment: Option<String>,
}

impl<'a> SourceLines<'a> {
    pub fn new(input: &'a str) -> SourceLines<'a> {
        let lines = input.lines().map(SourceLine::scan).collect();
        SourceLines { lines, next_line: 0 }
    }

    /// Zero-based line of a parser marker.
    pub fn line_of(mark: &Marker) -> usize {
        mark.line().saturating_sub(1)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn next_line(&self) -> usize {
        self.next_line
    }

    pub fn char_at(&self, mark: &Marker) -> Option<char> {
        let line = self.lines.get(Self::line_of(mark))?;
        line.text.chars().nth(mark.col())
    }

    pub fn indent(&self, line: usize) -> usize {
        self.lines.get(line).map_or(0, |line| line.indent)
    }

    /// Whole-line comments between the last consumed line and `line`, for a
    /// node that starts on `line`.
    pub fn take_head(&mut self, line: usize) -> Vec<String> {
        let comments = self.take_until(line);
        self.skip_to(line + 1);
        comments
    }

    /// Whole-line comments from the last consumed line up to, not including, `line`.
    pub fn take_until(&mut self, line: usize) -> Vec<String> {
        let end = line.min(self.lines.len());
        let start = self.next_line.min(end);
        let comments = self.lines[start..end]
            .iter_mut()
            .filter_map(|line| line.whole_comment.take())
            .collect();
        self.skip_to(end);
        comments
    }

    pub fn take_trailing(&mut self, line: usize) -> Option<String> {
        self.lines.get_mut(line)?.trailing_comment.take()
    }

    pub fn skip_to(&mut self, line: usize) {
        self.next_line = self.next_line.max(line);
    }

    /// Line of the `|` or `>` header of a block scalar whose body ends by
    /// `end_line`. The header is on the line of its key or entry, which is the
    /// last consumed line or follows it.
    pub fn find_block_scalar_header(&self, end_line: usize) -> Option<usize> {
        let start = self.next_line.saturating_sub(1);
        (start..=end_line).find(|index| {
            self.lines.get(*index).is_some_and(|line| !line.block_body && line.is_block_scalar_header())
        })
    }

    /// Clears the body lines of a block scalar whose header is on `header_line`
    /// so that their content is never taken for comments. The body runs while
    /// lines are blank or indented past `owner_col`; a root block scalar runs to
    /// the next document marker.
    pub fn skip_block_scalar(&mut self, header_line: usize, owner_col: Option<usize>) {
        let mut body_end = header_line + 1;
        for line in self.lines.iter_mut().skip(header_line + 1) {
            let in_body = line.blank
                || match owner_col {
                    Some(col) => line.indent > col,
                    None => !line.is_document_marker(),
                };
            if !in_body {
                break;
            }
            line.block_body = true;
            line.whole_comment = None;
            line.trailing_comment = None;
            body_end += 1;
        }
        self.skip_to(body_end.min(self.lines.len()));
    }

    /// Name of the first `&anchor` between two markers, outside of comments
    /// and quoted scalars.
    pub fn find_anchor(&self, from: SourcePos, to: SourcePos) -> Option<String> {
        let mut quote: Option<char> = None;
        for line_index in from.line..=to.line {
            let Some(line) = self.lines.get(line_index) else {
                break;
            };
            let chars: Vec<char> = line.text.chars().collect();
            let start = if line_index == from.line { from.col } else { 0 };
            let end = if line_index == to.line { to.col.min(chars.len()) } else { chars.len() };

            let mut index = start;
            while index < end {
                let c = chars[index];
                let prev = index.checked_sub(1).map(|i| chars[i]);
                match quote {
                    Some('"') if c == '\\' => index += 1,
                    Some(q) if c == q => {
                        if q == '\'' && chars.get(index + 1) == Some(&'\'') {
                            index += 1;
                        } else {
                            quote = None;
                        }
                    }
                    Some(_) => {}
                    None => match c {
                        '#' if prev.map_or(true, char::is_whitespace) => break,
                        '\'' | '"' if prev.map_or(true, |p| p.is_whitespace() || matches!(p, '[' | '{' | ',' | ':')) => {
                            quote = Some(c);
                        }
                        '&' if prev.map_or(true, |p| p.is_whitespace() || matches!(p, '[' | '{' | ',')) => {
                            let name: String = chars[index + 1..]
                                .iter()
                                .take_while(|c| !c.is_whitespace() && !matches!(c, ',' | '[' | ']' | '{' | '}'))
                                .collect();
                            if !name.is_empty() {
                                return Some(name);
                            }
                        }
                        _ => {}
                    },
                }
                index += 1;
            }
        }
        None
    }

    /// Whether the marker is preceded on its line by a `- ` sequence entry indicator.
    pub fn follows_entry_indicator(&self, mark: &Marker) -> bool {
        let Some(line) = self.lines.get(Self::line_of(mark)) else {
            return false;
        };
        let before: String = line.text.chars().take(mark.col()).collect();
        let before = before.trim_end();
        before.ends_with('-') && before[..before.len() - 1].chars().last().map_or(true, char::is_whitespace)
    }

    /// Source text of the lines in `start..end`, without the `---` marker that
    /// opens the document and without trailing blank lines.
    pub fn verbatim(&self, start: usize, end: usize) -> String {
        let end = end.min(self.lines.len());
        let start = start.min(end);
        let mut lines: Vec<&str> = self.lines[start..end].iter().map(|line| line.text).collect();

        let first_content = lines.iter().position(|line| {
            let trimmed = line.trim_start();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        });
        if let Some(index) = first_content {
            let line = lines[index];
            if line.trim_end() == "---" {
                lines.remove(index);
            } else if let Some(rest) = line.strip_prefix("--- ") {
                lines[index] = rest;
            }
        }

        while lines.last().is_some_and(|line| line.trim().is_empty()) {
            lines.pop();
        }
        lines.join("\n")
    }
}

impl<'a> SourceLine<'a> {
    fn scan(text: &'a str) -> SourceLine<'a> {
        let trimmed = text.trim_start_matches([' ', '\t']);
        let mut line = SourceLine {
            text,
            indent: text.len() - trimmed.len(),
            blank: trimmed.trim_end().is_empty(),
            block_body: false,
            whole_comment: None,
            trailing_comment: None,
        };

        if trimmed.starts_with('#') {
            line.whole_comment = Some(trimmed.trim_end().to_string());
        } else {
            line.trailing_comment = find_trailing_comment(trimmed).map(str::to_string);
        }
        line
    }

    fn is_block_scalar_header(&self) -> bool {
        let trimmed = self.text.trim_start_matches([' ', '\t']);
        if trimmed.starts_with('#') {
            return false;
        }
        let content = match trailing_comment_start(trimmed) {
            Some(start) => &trimmed[..start],
            None => trimmed,
        };
        let indicator = content.split_whitespace().next_back().unwrap_or_default();
        let mut chars = indicator.chars();
        matches!(chars.next(), Some('|' | '>')) && chars.all(|c| c == '+' || c == '-' || c.is_ascii_digit())
    }

    fn is_document_marker(&self) -> bool {
        self.indent == 0 && (self.text.starts_with("---") || self.text.starts_with("..."))
    }
}

fn find_trailing_comment(text: &str) -> Option<&str> {
    trailing_comment_start(text).map(|start| text[start..].trim_end())
}

// A '#' starts a comment when it follows whitespace outside of quotes.
fn trailing_comment_start(text: &str) -> Option<usize> {
    let mut quote = None;
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();
    while let Some((index, c)) = chars.next() {
        match quote {
            Some('"') => match c {
                '\\' => {
                    chars.next();
                }
                '"' => quote = None,
                _ => {}
            },
            Some(_) => {
                if c == '\'' {
                    // '' is an escaped quote inside a single-quoted scalar.
                    if chars.peek().map(|(_, next)| *next) == Some('\'') {
                        chars.next();
                    } else {
                        quote = None;
                    }
                }
            }
            None => match c {
                '#' if prev.map_or(true, char::is_whitespace) => return Some(index),
                '\'' | '"' if prev.map_or(true, |p| p.is_whitespace() || matches!(p, '[' | '{' | ',')) => {
                    quote = Some(c);
                }
                _ => {}
            },
        }
        prev = Some(c);
    }
    None
}
