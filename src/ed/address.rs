//
// Copyright (c) 2026 the red authors
//
// This file is part of the red project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Address resolution.
//!
//! The address prefix of a command line is resolved left to right into
//! concrete view positions. Resolution carries a candidate address that
//! tokens build on: primaries set it, offsets adjust it, separators push
//! it onto the result list. The `;` separator additionally moves the
//! buffer's current address, so a later search token starts from there.

use crate::ed::buffer::{LineBuffer, BEFORE_FIRST};
use crate::ed::error::{EdError, EdResult};
use regex::Regex;
use std::iter::Peekable;
use std::str::CharIndices;

impl LineBuffer {
    /// Parse the address prefix of `cmd`. Returns the resolved addresses
    /// and the byte offset of the first character that is not part of an
    /// address. Addresses are view positions; `BEFORE_FIRST` stands for
    /// the slot before line one and only some consumers accept it.
    pub fn resolve_addrs(&mut self, cmd: &str) -> EdResult<(Vec<isize>, usize)> {
        let mut addrs: Vec<isize> = Vec::new();
        let mut cur: Option<isize> = None;
        let mut pending_sep = false;
        let mut offset = cmd.len();
        let mut it = cmd.char_indices().peekable();

        while let Some(&(i, c)) = it.peek() {
            match c {
                ' ' | '\t' => {
                    it.next();
                }
                '.' => {
                    it.next();
                    cur = Some(self.addr() as isize);
                }
                '$' => {
                    it.next();
                    cur = Some(self.len() as isize - 1);
                }
                '0'..='9' => {
                    let n = take_number(&mut it)?;
                    // user addresses are 1-based; a literal 0 names the
                    // slot before the first line
                    cur = Some(n - 1);
                }
                '+' | '-' => {
                    it.next();
                    let k = match it.peek() {
                        Some(&(_, d)) if d.is_ascii_digit() => take_number(&mut it)?,
                        _ => 1,
                    };
                    let base = cur.unwrap_or(self.addr() as isize);
                    cur = Some(if c == '+' { base + k } else { base - k });
                }
                '\'' => {
                    it.next();
                    let name = match it.next() {
                        Some((_, m)) => m,
                        None => {
                            return Err(EdError::Syntax(
                                "missing mark character".to_string(),
                            ))
                        }
                    };
                    cur = Some(self.mark_pos(name)? as isize);
                }
                '/' | '?' => {
                    it.next();
                    let pat = take_pattern(&mut it, c);
                    let found = if c == '/' {
                        self.search_forward(&pat)?
                    } else {
                        self.search_backward(&pat)?
                    };
                    cur = Some(found as isize);
                }
                ',' | ';' => {
                    it.next();
                    let a = cur.take().unwrap_or(if c == ';' {
                        self.addr() as isize
                    } else {
                        0
                    });
                    if c == ';' {
                        if self.oob(a) {
                            return Err(EdError::OutOfBounds);
                        }
                        self.set_addr(a as usize)?;
                    }
                    addrs.push(a);
                    pending_sep = true;
                }
                '%' => {
                    it.next();
                    addrs.push(0);
                    addrs.push(self.len() as isize - 1);
                    let end = it.peek().map_or(cmd.len(), |&(j, _)| j);
                    return Ok((addrs, end));
                }
                _ => {
                    offset = i;
                    break;
                }
            }
        }

        if let Some(a) = cur {
            addrs.push(a);
        } else if pending_sep {
            // a trailing separator leaves the right side open: default to
            // the last line, so "," alone covers the whole buffer
            addrs.push(self.len() as isize - 1);
        }
        Ok((addrs, offset))
    }

    /// Forward search for a pattern, starting at the line after the
    /// current address and wrapping past the end.
    pub fn search_forward(&self, pattern: &str) -> EdResult<usize> {
        let re = Regex::new(pattern).map_err(|e| EdError::InvalidRegex(e.to_string()))?;
        let n = self.len();
        if n == 0 {
            return Err(EdError::NoMatch);
        }
        let start = self.addr();
        for i in 1..=n {
            let l = (start + i) % n;
            if re.is_match(self.line(l)) {
                return Ok(l);
            }
        }
        Err(EdError::NoMatch)
    }

    /// Backward search, wrapping past the beginning.
    pub fn search_backward(&self, pattern: &str) -> EdResult<usize> {
        let re = Regex::new(pattern).map_err(|e| EdError::InvalidRegex(e.to_string()))?;
        let n = self.len();
        if n == 0 {
            return Err(EdError::NoMatch);
        }
        let start = self.addr();
        for i in 1..=n {
            let l = (start + n - i) % n;
            if re.is_match(self.line(l)) {
                return Ok(l);
            }
        }
        Err(EdError::NoMatch)
    }

    /// Default address when a command received none: the current line, or
    /// the pre-first slot when the buffer is empty so insertions still
    /// have somewhere to land.
    fn default_addr(&self) -> isize {
        if self.is_empty() {
            BEFORE_FIRST
        } else {
            self.addr() as isize
        }
    }

    /// Single-value consumer: the last address, constrained to an
    /// existing line.
    pub fn addr_value(&self, addrs: &[isize]) -> EdResult<usize> {
        let a = addrs.last().copied().unwrap_or_else(|| self.default_addr());
        if self.oob(a) {
            return Err(EdError::OutOfBounds);
        }
        Ok(a as usize)
    }

    /// Destination consumer: as `addr_value`, but the pre-first sentinel
    /// is accepted. Used by insertion targets and move/copy destinations.
    pub fn addr_dest(&self, addrs: &[isize]) -> EdResult<isize> {
        let a = addrs.last().copied().unwrap_or_else(|| self.default_addr());
        if a != BEFORE_FIRST && self.oob(a) {
            return Err(EdError::OutOfBounds);
        }
        Ok(a)
    }

    /// Range-or-line consumer: zero addresses default to the current
    /// line, one address stands for itself, otherwise the last two form
    /// the range.
    pub fn addr_range_or_line(&self, addrs: &[isize]) -> EdResult<(usize, usize)> {
        let (lo, hi) = match addrs.len() {
            0 => {
                let d = self.default_addr();
                (d, d)
            }
            1 => (addrs[0], addrs[0]),
            n => (addrs[n - 2], addrs[n - 1]),
        };
        if self.oob(lo) || self.oob(hi) {
            return Err(EdError::OutOfBounds);
        }
        if lo > hi {
            return Err(EdError::AddressOrder);
        }
        Ok((lo as usize, hi as usize))
    }

    /// Range consumer: as `addr_range_or_line`, but an address must have
    /// been given.
    pub fn addr_range(&self, addrs: &[isize]) -> EdResult<(usize, usize)> {
        if addrs.is_empty() {
            return Err(EdError::InvalidAddress);
        }
        self.addr_range_or_line(addrs)
    }
}

/// Consume a run of digits.
fn take_number(it: &mut Peekable<CharIndices<'_>>) -> EdResult<isize> {
    let mut digits = String::new();
    while let Some(&(_, d)) = it.peek() {
        if d.is_ascii_digit() {
            digits.push(d);
            it.next();
        } else {
            break;
        }
    }
    digits
        .parse()
        .map_err(|_| EdError::Syntax(format!("invalid line number: {}", digits)))
}

/// Consume a search pattern up to the unescaped closing delimiter or end
/// of line. A backslash before the delimiter makes it literal; all other
/// escape pairs pass through untouched for the regex engine.
fn take_pattern(it: &mut Peekable<CharIndices<'_>>, delim: char) -> String {
    let mut pat = String::new();
    let mut escaped = false;
    for (_, c) in it.by_ref() {
        if escaped {
            if c != delim {
                pat.push('\\');
            }
            pat.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == delim {
            return pat;
        } else {
            pat.push(c);
        }
    }
    if escaped {
        pat.push('\\');
    }
    pat
}
