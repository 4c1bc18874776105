//
// Copyright (c) 2026 the red authors
//
// This file is part of the red project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! The substitute command.
//!
//! `s<d>pattern<d>replacement<d>[flags]` where `<d>` is any delimiter
//! except space, newline, `m` or `g`. The closing delimiter is optional;
//! without it the replacement runs to end of line. Delimiters and
//! backreferences are located on a masked copy of the text in which every
//! escape pair is blanked out, so byte offsets into the original stay
//! valid and escaped characters are never mistaken for syntax.

use crate::ed::editor::{Context, Editor};
use crate::ed::error::{EdError, EdResult};
use regex::Regex;
use std::io::{BufRead, Write};

/// Blank out every `\x` escape pair, preserving byte length, so scans
/// over the result never fire inside escaped text.
pub(crate) fn mask_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push(' ');
            if let Some(e) = chars.next() {
                for _ in 0..e.len_utf8() {
                    out.push(' ');
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// A backreference in the replacement text: its byte span and the capture
/// group it names.
struct Backref {
    start: usize,
    end: usize,
    group: usize,
}

/// Locate `\N` backreferences. Only doubled backslashes are masked first,
/// so `\\1` stays literal text while `\1` names group one. `N` is a
/// single digit; `\0` is the whole match.
fn find_backrefs(rep: &str) -> Vec<Backref> {
    let mut masked = String::with_capacity(rep.len());
    let mut chars = rep.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&'\\') {
            chars.next();
            masked.push_str("  ");
        } else {
            masked.push(c);
        }
    }
    let bytes = masked.as_bytes();
    let mut refs = Vec::new();
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'\\' && bytes[i + 1].is_ascii_digit() {
            refs.push(Backref {
                start: i,
                end: i + 2,
                group: (bytes[i + 1] - b'0') as usize,
            });
            i += 2;
        } else {
            i += 1;
        }
    }
    refs
}

/// The parsed pieces of an `s` command suffix.
struct Subst<'a> {
    pattern: &'a str,
    replacement: &'a str,
    /// replace every match on a line
    all: bool,
    /// replace only the count-th match on a line
    count: Option<usize>,
}

fn parse_subst(text: &str) -> EdResult<Subst<'_>> {
    let delim = match text.chars().next() {
        None => return Err(EdError::Syntax("missing pattern delimiter".to_string())),
        Some(d @ (' ' | '\n' | 'm' | 'g')) => {
            return Err(EdError::Syntax(format!("invalid pattern delimiter: {}", d)))
        }
        Some(d) => d,
    };
    let dlen = delim.len_utf8();
    let masked = mask_escapes(text);
    let pat_end = masked[dlen..]
        .find(delim)
        .map(|i| i + dlen)
        .ok_or_else(|| EdError::Syntax("unterminated pattern".to_string()))?;
    let rep_end = masked[pat_end + dlen..]
        .find(delim)
        .map(|i| i + pat_end + dlen)
        .unwrap_or(text.len());
    let flags = if rep_end < text.len() {
        &text[rep_end + dlen..]
    } else {
        ""
    };

    let mut all = false;
    let mut digits = String::new();
    for c in flags.chars() {
        match c {
            'g' => all = true,
            '0'..='9' => digits.push(c),
            c => {
                return Err(EdError::Syntax(format!(
                    "invalid substitution flag: {}",
                    c
                )))
            }
        }
    }
    let count: Option<usize> = if digits.is_empty() {
        None
    } else {
        Some(digits.parse().map_err(|_| {
            EdError::Syntax(format!("invalid substitution count: {}", digits))
        })?)
    };

    Ok(Subst {
        pattern: &text[dlen..pat_end],
        replacement: &text[pat_end + dlen..rep_end],
        // "g" wins over a count; with neither, every match is replaced
        all: all || count.is_none(),
        count: if all { None } else { count },
    })
}

impl<R: BufRead, W: Write> Editor<R, W> {
    pub(crate) fn cmd_substitute(&mut self, ctx: &Context) -> EdResult<()> {
        let r = self.buf.addr_range_or_line(&ctx.addrs)?;
        let sub = parse_subst(ctx.suffix())?;
        let re =
            Regex::new(sub.pattern).map_err(|e| EdError::InvalidRegex(e.to_string()))?;
        let refs = find_backrefs(sub.replacement);

        self.state.last_pattern = sub.pattern.to_string();
        self.state.last_replacement = sub.replacement.to_string();

        let mut last: Option<usize> = None;
        for l in r.0..=r.1 {
            let line = self.buf.line(l).to_string();
            let mut out = String::new();
            let mut tail = 0;
            let mut hits = 0;
            let mut changed = false;
            for caps in re.captures_iter(&line) {
                hits += 1;
                if !(sub.all || sub.count == Some(hits)) {
                    // this occurrence stays; it is copied with the
                    // surrounding literal text
                    continue;
                }
                let whole = caps.get(0).expect("group 0 is the whole match");
                // interleave literal replacement spans with capture text
                let mut rep = String::new();
                let mut rtail = 0;
                for b in &refs {
                    if b.group >= caps.len() {
                        return Err(EdError::InvalidBackref);
                    }
                    rep.push_str(&sub.replacement[rtail..b.start]);
                    if let Some(g) = caps.get(b.group) {
                        rep.push_str(g.as_str());
                    }
                    rtail = b.end;
                }
                rep.push_str(&sub.replacement[rtail..]);

                out.push_str(&line[tail..whole.start()]);
                out.push_str(&rep);
                tail = whole.end();
                changed = true;
            }
            if changed {
                out.push_str(&line[tail..]);
                self.buf.replace((l, l), vec![out])?;
                last = Some(l);
            }
        }

        match last {
            None => Err(EdError::NoMatch),
            Some(l) => {
                // echo the last modified line, which is now current
                writeln!(self.writer, "{}", self.buf.line(l))?;
                Ok(())
            }
        }
    }
}
