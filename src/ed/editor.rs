//
// Copyright (c) 2026 the red authors
//
// This file is part of the red project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Command dispatch and the interactive session.

use crate::ed::buffer::{LineBuffer, BEFORE_FIRST};
use crate::ed::error::{EdError, EdResult};
use crate::ed::substitute::mask_escapes;
use std::fs::OpenOptions;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::atomic::Ordering;

/// Command characters the dispatcher knows. Anything else is rejected
/// before an undo snapshot is taken.
const COMMANDS: &str = "qQdpnlaicwWkeErf=jmtyxsuzPhH!#";

/// Session settings and memory that survive individual commands.
#[derive(Debug)]
pub struct SessionState {
    /// The remembered filename
    pub filename: String,
    /// Message of the last failed command, printed by `h`
    pub last_error: Option<String>,
    /// Print full messages instead of `?` (the `H` toggle)
    pub print_errors: bool,
    /// Whether the prompt is shown
    pub prompt_enabled: bool,
    /// The prompt string
    pub prompt: String,
    /// Lines printed by the scroll command
    pub window_size: usize,
    /// Suppress byte counts and verbose diagnostics (`-s`)
    pub suppress: bool,
    /// Pattern of the most recent substitution
    pub last_pattern: String,
    /// Replacement of the most recent substitution
    pub last_replacement: String,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState {
            filename: String::new(),
            last_error: None,
            print_errors: false,
            prompt_enabled: false,
            prompt: String::from("*"),
            window_size: 22,
            suppress: false,
            last_pattern: String::new(),
            last_replacement: String::new(),
        }
    }
}

/// A resolved command line handed to a handler.
pub(crate) struct Context {
    /// The full command text (with `p` appended when it was implied)
    pub cmd: String,
    /// The command character
    pub name: char,
    /// Addresses produced by the resolver
    pub addrs: Vec<isize>,
    /// Byte offset of the command character within `cmd`
    pub cmd_offset: usize,
}

impl Context {
    /// Everything after the command character.
    pub fn suffix(&self) -> &str {
        &self.cmd[self.cmd_offset + self.name.len_utf8()..]
    }
}

/// The editor: a line buffer plus session state, driven by a command
/// stream.
pub struct Editor<R: BufRead, W: Write> {
    /// The document being edited
    pub buf: LineBuffer,
    /// Settings and memory spanning commands
    pub state: SessionState,
    reader: R,
    pub(crate) writer: W,
    should_quit: bool,
}

impl<R: BufRead, W: Write> Editor<R, W> {
    /// Create an editor reading commands from `reader` and printing to
    /// `writer`.
    pub fn new(reader: R, writer: W) -> Self {
        Editor {
            buf: LineBuffer::new(Vec::new()),
            state: SessionState::default(),
            reader,
            writer,
            should_quit: false,
        }
    }

    /// Consume the editor, returning the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Load a file into a fresh buffer, returning its byte size.
    pub fn load_file(&mut self, path: &str) -> EdResult<usize> {
        self.buf = LineBuffer::from_file(path)?;
        Ok(self.buf.size_bytes())
    }

    /// Read one line from the command stream, stripping the terminator.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        match self.reader.read_line(&mut line)? {
            0 => Ok(None),
            _ => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Ok(Some(line))
            }
        }
    }

    fn print_prompt(&mut self) -> io::Result<()> {
        if self.state.prompt_enabled {
            write!(self.writer, "{}", self.state.prompt)?;
            self.writer.flush()?;
        }
        Ok(())
    }

    /// Run the session loop until quit or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            if crate::SIGINT_RECEIVED.swap(false, Ordering::SeqCst) {
                writeln!(self.writer, "?")?;
                self.state.last_error = Some("interrupted".to_string());
            }
            self.print_prompt()?;
            let line = match self.read_line()? {
                Some(l) => l,
                None => break,
            };
            self.run_command_line(&line)?;
            if self.should_quit {
                break;
            }
            self.writer.flush()?;
        }
        self.writer.flush()
    }

    /// Resolve, dispatch and report one command line. Command failures
    /// are printed and remembered; only I/O trouble on the session
    /// streams escapes.
    pub fn run_command_line(&mut self, line: &str) -> io::Result<()> {
        if let Err(e) = self.run_one(line) {
            let msg = e.to_string();
            if self.state.print_errors && !self.state.suppress {
                writeln!(self.writer, "{}", msg)?;
            } else {
                writeln!(self.writer, "?")?;
            }
            self.state.last_error = Some(msg);
        }
        Ok(())
    }

    fn run_one(&mut self, line: &str) -> EdResult<()> {
        let (addrs, cmd_offset) = self.buf.resolve_addrs(line)?;
        let mut cmd = line.to_string();
        if cmd_offset >= cmd.len() {
            // a bare address list prints
            cmd.push('p');
        }
        let name = cmd[cmd_offset..].chars().next().unwrap_or('p');
        if !COMMANDS.contains(name) {
            return Err(EdError::InvalidCommand(name));
        }
        let ctx = Context {
            cmd,
            name,
            addrs,
            cmd_offset,
        };
        self.buf.begin();
        // on failure the begin snapshot stays behind, so undo reverts
        // whatever the handler managed to do
        self.execute(&ctx)?;
        self.buf.end();
        Ok(())
    }

    /// The command table.
    fn execute(&mut self, ctx: &Context) -> EdResult<()> {
        match ctx.name {
            'q' | 'Q' => self.cmd_quit(ctx),
            'd' => self.cmd_delete(ctx),
            'p' | 'n' | 'l' => self.cmd_print(ctx),
            'a' | 'i' | 'c' => self.cmd_input(ctx),
            'w' | 'W' => self.cmd_write(ctx),
            'k' => self.cmd_mark(ctx),
            'e' | 'E' | 'r' => self.cmd_edit(ctx),
            'f' => self.cmd_file(ctx),
            '=' => self.cmd_line_number(ctx),
            'j' => self.cmd_join(ctx),
            'm' | 't' => self.cmd_move(ctx),
            'y' => self.cmd_yank(ctx),
            'x' => self.cmd_paste(ctx),
            's' => self.cmd_substitute(ctx),
            'u' => self.cmd_undo(ctx),
            'z' => self.cmd_scroll(ctx),
            'P' => self.cmd_prompt(ctx),
            'h' | 'H' => self.cmd_err(ctx),
            '!' => self.cmd_shell(ctx),
            '#' => Ok(()),
            c => Err(EdError::InvalidCommand(c)),
        }
    }

    fn cmd_quit(&mut self, ctx: &Context) -> EdResult<()> {
        if ctx.name == 'q' && self.buf.dirty() {
            return Err(EdError::FileModified);
        }
        self.should_quit = true;
        Ok(())
    }

    fn cmd_delete(&mut self, ctx: &Context) -> EdResult<()> {
        let r = self.buf.addr_range_or_line(&ctx.addrs)?;
        self.buf.delete(r)
    }

    fn cmd_print(&mut self, ctx: &Context) -> EdResult<()> {
        let r = self.buf.addr_range_or_line(&ctx.addrs)?;
        for l in r.0..=r.1 {
            match ctx.name {
                'n' => writeln!(self.writer, "{}\t{}", l + 1, self.buf.line(l))?,
                // TODO: escape non-printing characters and fold long
                // lines the way GNU ed's l does
                'l' => writeln!(self.writer, "{}$", self.buf.line(l))?,
                _ => writeln!(self.writer, "{}", self.buf.line(l))?,
            }
        }
        self.buf.set_addr(r.1)
    }

    /// The input-mode commands: collect lines up to a lone `.` and apply
    /// them in one mutation.
    fn cmd_input(&mut self, ctx: &Context) -> EdResult<()> {
        if ctx.name != 'c' && !ctx.suffix().is_empty() {
            return Err(EdError::Syntax(format!(
                "{} takes a single line address",
                ctx.name
            )));
        }
        let mut lines = Vec::new();
        loop {
            match self.read_line()? {
                None => break,
                Some(l) if l == "." => break,
                Some(l) => lines.push(l),
            }
        }
        if lines.is_empty() {
            // nothing was entered; for c even the deletion is skipped
            return Ok(());
        }
        match ctx.name {
            'i' => {
                let at = self.buf.addr_dest(&ctx.addrs)?;
                // inserting before line zero and before line one land in
                // the same slot
                let at = if at == BEFORE_FIRST { 0 } else { at as usize };
                self.buf.insert(at, lines)
            }
            'a' => {
                let at = self.buf.addr_dest(&ctx.addrs)?;
                self.buf.insert((at + 1) as usize, lines)
            }
            _ => {
                let r = self.buf.addr_range(&ctx.addrs)?;
                self.buf.replace(r, lines)
            }
        }
    }

    fn cmd_write(&mut self, ctx: &Context) -> EdResult<()> {
        let suffix = ctx.suffix();
        let (quit, rest) = match suffix.strip_prefix('q') {
            Some(r) => (true, r),
            None => (false, suffix),
        };
        let rest = rest.trim_start();
        if rest.starts_with('!') {
            return Err(EdError::Unsupported(
                "writing to a command pipeline is not supported",
            ));
        }
        let path = if rest.is_empty() {
            self.state.filename.clone()
        } else {
            rest.to_string()
        };

        let r = if ctx.cmd_offset == 0 {
            if self.buf.is_empty() {
                return Err(EdError::OutOfBounds);
            }
            (0, self.buf.len() - 1)
        } else {
            self.buf.addr_range(&ctx.addrs)?
        };
        let full = r.0 == 0 && r.1 + 1 == self.buf.len();
        let lines = self.buf.get(r)?;

        let mut opts = OpenOptions::new();
        opts.write(true).create(true);
        if ctx.name == 'W' {
            opts.append(true);
        } else {
            opts.truncate(true);
        }
        let mut file = opts.open(&path)?;
        for line in &lines {
            writeln!(file, "{}", line)?;
        }

        if full {
            self.buf.clean();
        }
        if quit {
            self.should_quit = true;
        }
        Ok(())
    }

    fn cmd_mark(&mut self, ctx: &Context) -> EdResult<()> {
        let name = match ctx.suffix().chars().next() {
            Some(c) if c.is_ascii_lowercase() => c,
            Some(c) => {
                return Err(EdError::Syntax(format!("invalid mark character: {}", c)))
            }
            None => return Err(EdError::Syntax("no mark character supplied".to_string())),
        };
        let l = self.buf.addr_value(&ctx.addrs)?;
        self.buf.set_mark(name, l)
    }

    /// `e`/`E` load a file into a fresh buffer; `r` reads one into the
    /// current buffer after the addressed line.
    fn cmd_edit(&mut self, ctx: &Context) -> EdResult<()> {
        if ctx.name == 'e' && self.buf.dirty() {
            return Err(EdError::FileModified);
        }
        let file = ctx.suffix().trim_start();
        if file.starts_with('!') {
            return Err(EdError::Unsupported("command execution is not supported"));
        }
        let path = if file.is_empty() {
            self.state.filename.clone()
        } else {
            file.to_string()
        };
        if !Path::new(&path).exists() {
            return Err(EdError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}: No such file or directory", path),
            )));
        }

        if ctx.name == 'r' {
            let at = self.buf.addr_dest(&ctx.addrs)?;
            self.buf.read_file_at(&path, at)?;
            if self.state.filename.is_empty() {
                self.state.filename = path;
            }
        } else {
            self.buf = LineBuffer::from_file(&path)?;
            self.state.filename = path;
        }
        if !self.state.suppress {
            writeln!(self.writer, "{}", self.buf.size_bytes())?;
        }
        Ok(())
    }

    fn cmd_file(&mut self, ctx: &Context) -> EdResult<()> {
        let file = ctx.suffix().trim_start();
        if !file.is_empty() {
            self.state.filename = file.to_string();
            return Ok(());
        }
        writeln!(self.writer, "{}", self.state.filename)?;
        Ok(())
    }

    fn cmd_line_number(&mut self, ctx: &Context) -> EdResult<()> {
        let l = self.buf.addr_value(&ctx.addrs)?;
        writeln!(self.writer, "{}", l + 1)?;
        Ok(())
    }

    fn cmd_join(&mut self, ctx: &Context) -> EdResult<()> {
        let r = self.buf.addr_range_or_line(&ctx.addrs)?;
        if r.0 == r.1 {
            // a single line joins to itself
            return Ok(());
        }
        let joined: String = (r.0..=r.1).map(|l| self.buf.line(l)).collect();
        self.buf.replace(r, vec![joined])
    }

    /// `m` relocates, `t` copies; both read their destination address
    /// from the command suffix.
    fn cmd_move(&mut self, ctx: &Context) -> EdResult<()> {
        let r = self.buf.addr_range_or_line(&ctx.addrs)?;
        let (dest_addrs, _) = self.buf.resolve_addrs(ctx.suffix())?;
        let dest = self.buf.addr_dest(&dest_addrs)?;
        if ctx.name == 'm' {
            self.buf.move_lines(r, dest)
        } else {
            self.buf.transfer_lines(r, dest)
        }
    }

    fn cmd_yank(&mut self, ctx: &Context) -> EdResult<()> {
        let r = self.buf.addr_range_or_line(&ctx.addrs)?;
        self.buf.yank(r)
    }

    fn cmd_paste(&mut self, ctx: &Context) -> EdResult<()> {
        let at = self.buf.addr_dest(&ctx.addrs)?;
        self.buf.paste((at + 1) as usize)
    }

    fn cmd_undo(&mut self, _ctx: &Context) -> EdResult<()> {
        self.buf.undo();
        Ok(())
    }

    fn cmd_scroll(&mut self, ctx: &Context) -> EdResult<()> {
        let start = self.buf.addr_value(&ctx.addrs)?;
        let suffix = ctx.suffix();
        if !suffix.is_empty() {
            let win: usize = suffix
                .parse()
                .ok()
                .filter(|&w| w > 0)
                .ok_or_else(|| EdError::Syntax(format!("invalid window size: {}", suffix)))?;
            self.state.window_size = win;
        }
        let end = (start + self.state.window_size - 1).min(self.buf.len() - 1);
        for l in start..=end {
            writeln!(self.writer, "{}", self.buf.line(l))?;
        }
        self.buf.set_addr(end)
    }

    fn cmd_prompt(&mut self, _ctx: &Context) -> EdResult<()> {
        if self.state.prompt_enabled {
            self.state.prompt_enabled = false;
        } else if !self.state.prompt.is_empty() {
            self.state.prompt_enabled = true;
        }
        Ok(())
    }

    fn cmd_err(&mut self, ctx: &Context) -> EdResult<()> {
        if ctx.name == 'h' {
            if let Some(msg) = &self.state.last_error {
                writeln!(self.writer, "{}", msg)?;
            }
        } else {
            self.state.print_errors = !self.state.print_errors;
        }
        Ok(())
    }

    /// Run the suffix through the shell with inherited stdio. Unescaped
    /// `%` expands to the current filename.
    fn cmd_shell(&mut self, ctx: &Context) -> EdResult<()> {
        let cmdline = expand_filename(ctx.suffix(), &self.state.filename);
        // the child writes to our stdout directly; drain ours first
        self.writer.flush()?;
        Command::new("/bin/sh")
            .arg("-c")
            .arg(&cmdline)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;
        writeln!(self.writer, "!")?;
        Ok(())
    }
}

/// Replace unescaped `%` with the current filename. The masking pass
/// blanks escape pairs first so their bytes keep their offsets.
fn expand_filename(cmd: &str, filename: &str) -> String {
    let masked = mask_escapes(cmd);
    let mut out = String::with_capacity(cmd.len());
    let mut tail = 0;
    for (i, _) in masked.match_indices('%') {
        out.push_str(&cmd[tail..i]);
        out.push_str(filename);
        tail = i + 1;
    }
    out.push_str(&cmd[tail..]);
    out
}
