//
// Copyright (c) 2026 the red authors
//
// This file is part of the red project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Line editor core.
//!
//! An ed-style editor built from three pieces: a line buffer backed by an
//! append-only content pool, an address resolver for composite line
//! addresses, and a command dispatcher that applies one atomic mutation
//! per command line.

pub mod address;
pub mod buffer;
pub mod editor;
pub mod error;
pub mod substitute;

pub use editor::Editor;
