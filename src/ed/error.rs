//
// Copyright (c) 2026 the red authors
//
// This file is part of the red project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Error types for the editor.

use std::fmt;
use std::io;

/// Errors that can occur while editing.
#[derive(Debug)]
pub enum EdError {
    /// Address outside the buffer
    OutOfBounds,
    /// No address produced where one was required
    InvalidAddress,
    /// Range lower bound greater than upper bound
    AddressOrder,
    /// Unknown command character
    InvalidCommand(char),
    /// Malformed command suffix
    Syntax(String),
    /// Pattern failed to compile
    InvalidRegex(String),
    /// Substitution pattern did not match any line in range
    NoMatch,
    /// Backreference exceeds the pattern's capture count
    InvalidBackref,
    /// Mark name was never set
    UnknownMark(char),
    /// Marked line is no longer in the buffer
    ClearedMark(char),
    /// Destructive command refused while the buffer is dirty
    FileModified,
    /// Move or copy destination falls inside the source range
    RangeOverlap,
    /// Feature deliberately not implemented
    Unsupported(&'static str),
    /// I/O error
    Io(io::Error),
}

impl fmt::Display for EdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdError::OutOfBounds => write!(f, "line is out of bounds"),
            EdError::InvalidAddress => write!(f, "invalid address"),
            EdError::AddressOrder => write!(f, "address out of order"),
            EdError::InvalidCommand(c) => write!(f, "invalid command: {}", c),
            EdError::Syntax(msg) => write!(f, "{}", msg),
            EdError::InvalidRegex(msg) => write!(f, "invalid regexp: {}", msg),
            EdError::NoMatch => write!(f, "no match"),
            EdError::InvalidBackref => write!(f, "invalid backref"),
            EdError::UnknownMark(c) => write!(f, "no such mark: {}", c),
            EdError::ClearedMark(c) => write!(f, "mark was cleared: {}", c),
            EdError::FileModified => write!(f, "warning: file modified"),
            EdError::RangeOverlap => {
                write!(f, "cannot move lines to within their own range")
            }
            EdError::Unsupported(msg) => write!(f, "{}", msg),
            EdError::Io(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for EdError {}

impl From<io::Error> for EdError {
    fn from(e: io::Error) -> Self {
        EdError::Io(e)
    }
}

/// Result type for editor operations.
pub type EdResult<T> = Result<T, EdError>;
