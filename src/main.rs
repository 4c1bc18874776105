//
// Copyright (c) 2026 the red authors
//
// This file is part of the red project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! red - edit text
//!
//! A line-oriented text editor in the manner of the classic Unix ed.

mod ed;

use clap::Parser;
use gettextrs::{bind_textdomain_codeset, gettext, setlocale, textdomain, LocaleCategory};
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// Global flag for SIGINT received
pub static SIGINT_RECEIVED: AtomicBool = AtomicBool::new(false);

/// red - edit text
#[derive(Parser, Debug)]
#[command(version, about = gettext("red - edit text"))]
struct Args {
    #[arg(short, long, help = gettext("Use STRING as the prompt when in command mode"))]
    prompt: Option<String>,

    #[arg(short, long, help = gettext("Suppress byte counts and diagnostic messages"))]
    suppress: bool,

    #[arg(short, long, help = gettext("Loose exit mode (accepted, not implemented)"))]
    loose: bool,

    #[arg(short, long, help = gettext("Restricted mode (accepted, not implemented)"))]
    restricted: bool,

    #[arg(help = gettext("File to edit"))]
    file: Option<String>,
}

/// SIGINT handler - sets the SIGINT_RECEIVED flag
extern "C" fn sigint_handler(_signum: libc::c_int) {
    SIGINT_RECEIVED.store(true, Ordering::SeqCst);
}

/// Ignore SIGQUIT and turn SIGINT into a flag the session loop reports.
fn setup_signals() {
    unsafe {
        libc::signal(libc::SIGQUIT, libc::SIG_IGN);
        libc::signal(
            libc::SIGINT,
            sigint_handler as *const () as libc::sighandler_t,
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    setlocale(LocaleCategory::LcAll, "");
    textdomain("red").ok();
    bind_textdomain_codeset("red", "UTF-8").ok();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // usage problems exit 1, unlike clap's default of 2
            e.print().ok();
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    setup_signals();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let reader = BufReader::new(stdin.lock());
    let writer = BufWriter::new(stdout.lock());

    let mut editor = ed::Editor::new(reader, writer);
    editor.state.suppress = args.suppress;
    if let Some(p) = args.prompt {
        editor.state.prompt = p;
        editor.state.prompt_enabled = true;
    }
    // -l and -r are accepted for compatibility and have no effect
    let _ = (args.loose, args.restricted);

    if let Some(ref path) = args.file {
        editor.state.filename = path.clone();
        if Path::new(path).exists() {
            match editor.load_file(path) {
                Ok(bytes) => {
                    if !args.suppress {
                        println!("{}", bytes);
                    }
                }
                Err(e) => {
                    eprintln!("{}: {}", path, e);
                    std::process::exit(1);
                }
            }
        } else if !args.suppress {
            eprintln!("{}: No such file or directory", path);
        }
    }

    if let Err(e) = editor.run() {
        eprintln!("red: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
