//! Integration tests for the red line editor.
//!
//! These tests drive the binary end to end: a command script on stdin,
//! exact stdout/stderr/exit-code expectations.

use crate::common::{run_test, TestPlan};
use std::fs;
use tempfile::NamedTempFile;

// Helper to run a script in silent mode
fn ed_test(stdin: &str, expected_out: &str) {
    run_test(TestPlan {
        args: vec!["-s".to_string()],
        stdin_data: stdin.to_string(),
        expected_out: expected_out.to_string(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });
}

// Helper to run a script against a pre-loaded file, silent mode
fn ed_test_with_file(file_content: &str, stdin: &str, expected_out: &str) {
    let temp = NamedTempFile::new().unwrap();
    fs::write(temp.path(), file_content).unwrap();

    run_test(TestPlan {
        args: vec!["-s".to_string(), temp.path().to_string_lossy().to_string()],
        stdin_data: stdin.to_string(),
        expected_out: expected_out.to_string(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });
}

// ============================================================================
// Basic Operation Tests
// ============================================================================

#[test]
fn test_quit() {
    ed_test("q\n", "");
}

#[test]
fn test_force_quit() {
    ed_test("Q\n", "");
}

#[test]
fn test_quit_refused_after_edit() {
    ed_test("a\nx\n.\nq\nQ\n", "?\n");
}

#[test]
fn test_eof_terminates() {
    ed_test("", "");
}

#[test]
fn test_append_and_print() {
    ed_test(
        "a\nhello world\nline two\n.\n1,$p\nQ\n",
        "hello world\nline two\n",
    );
}

#[test]
fn test_insert_and_print() {
    ed_test(
        "a\nfirst line\n.\n1i\ninserted line\n.\n1,$p\nQ\n",
        "inserted line\nfirst line\n",
    );
}

#[test]
fn test_append_at_zero_prepends() {
    ed_test("a\nbody\n.\n0a\ntop\n.\n,p\nQ\n", "top\nbody\n");
}

#[test]
fn test_number_command() {
    ed_test("a\nline one\nline two\n.\n1,$n\nQ\n", "1\tline one\n2\tline two\n");
}

#[test]
fn test_list_command() {
    ed_test("a\nhello\n.\n1l\nQ\n", "hello$\n");
}

#[test]
fn test_delete() {
    ed_test(
        "a\nline one\nline two\nline three\n.\n2d\n1,$p\nQ\n",
        "line one\nline three\n",
    );
}

#[test]
fn test_delete_moves_current_to_next_line() {
    ed_test("a\na\nb\nc\n.\n2d\n.p\nQ\n", "c\n");
}

#[test]
fn test_change() {
    ed_test(
        "a\nold line\nkeep this\n.\n1c\nnew line\n.\n1,$p\nQ\n",
        "new line\nkeep this\n",
    );
}

#[test]
fn test_empty_buffer_print_fails() {
    ed_test("p\nh\nQ\n", "?\nline is out of bounds\n");
}

#[test]
fn test_invalid_command() {
    ed_test("Z\nQ\n", "?\n");
}

// ============================================================================
// Address Tests
// ============================================================================

#[test]
fn test_goto_line_implies_print() {
    ed_test("a\nline one\nline two\nline three\n.\n2\nQ\n", "line two\n");
}

#[test]
fn test_range_all_comma() {
    ed_test("a\na\nb\nc\nd\n.\n,p\nQ\n", "a\nb\nc\nd\n");
}

#[test]
fn test_range_all_percent() {
    ed_test("a\na\nb\n.\n%p\nQ\n", "a\nb\n");
}

#[test]
fn test_range_explicit() {
    ed_test("a\na\nb\nc\nd\ne\n.\n2,4p\nQ\n", "b\nc\nd\n");
}

#[test]
fn test_current_and_last_address() {
    ed_test("a\nfirst\nsecond\nthird\n.\n2\n.p\n$p\nQ\n", "second\nsecond\nthird\n");
}

#[test]
fn test_offset_addresses() {
    ed_test("a\na\nb\nc\nd\n.\n1\n+2p\n-p\nQ\n", "a\nc\nb\n");
}

#[test]
fn test_address_out_of_order() {
    ed_test("a\na\nb\n.\n2,1p\nh\nQ\n", "?\naddress out of order\n");
}

#[test]
fn test_search_forward() {
    ed_test("a\none\ntwo\nthree\n.\n/two/p\nQ\n", "two\n");
}

#[test]
fn test_search_backward() {
    ed_test("a\none\ntwo\nthree\n.\n1\n?three?p\nQ\n", "one\nthree\n");
}

#[test]
fn test_search_wraps_around() {
    ed_test("a\nneedle\nhay\nhay\n.\n$\n/needle/p\nQ\n", "hay\nneedle\n");
}

#[test]
fn test_search_no_match() {
    ed_test("a\nhay\n.\n/needle/p\nh\nQ\n", "?\nno match\n");
}

// ============================================================================
// Substitute Tests
// ============================================================================

#[test]
fn test_substitute_echoes_result() {
    ed_test("a\nhello world\n.\n1s/world/everyone/\nQ\n", "hello everyone\n");
}

#[test]
fn test_substitute_is_global_by_default() {
    ed_test("a\nhello hello hello\n.\n1s/hello/hi/\nQ\n", "hi hi hi\n");
}

#[test]
fn test_substitute_count_flag() {
    ed_test(
        "a\nfoo foo foo\n.\n1s/foo/bar/2\nQ\n",
        "foo bar foo\n",
    );
}

#[test]
fn test_substitute_range() {
    ed_test(
        "a\nfoo1\nfoo2\nfoo3\n.\n1,3s/foo/bar/\n,p\nQ\n",
        "bar3\nbar1\nbar2\nbar3\n",
    );
}

#[test]
fn test_substitute_backrefs() {
    ed_test("a\nabc\n.\n1s/(a)(b)(c)/\\3\\2\\1/\nQ\n", "cba\n");
}

#[test]
fn test_substitute_invalid_backref() {
    ed_test("a\nabc\n.\n1s/(a)/\\2/\nh\nQ\n", "?\ninvalid backref\n");
}

#[test]
fn test_substitute_no_match() {
    ed_test("a\nabc\n.\n1s/zzz/x/\nh\nQ\n", "?\nno match\n");
}

#[test]
fn test_substitute_alternate_delimiter() {
    ed_test("a\na/b\n.\n1s#a/b#x#\nQ\n", "x\n");
}

// ============================================================================
// Copy, Move and Register Tests
// ============================================================================

#[test]
fn test_copy() {
    ed_test(
        "a\nline one\nline two\n.\n1t2\n1,$p\nQ\n",
        "line one\nline two\nline one\n",
    );
}

#[test]
fn test_move_to_end() {
    ed_test("a\na\nb\nc\n.\n2m$\n,p\nQ\n", "a\nc\nb\n");
}

#[test]
fn test_move_whole_buffer_to_top() {
    ed_test("a\na\nb\nc\n.\n1,3m0\n,p\nQ\n", "a\nb\nc\n");
}

#[test]
fn test_move_into_own_range_fails() {
    ed_test(
        "a\na\nb\nc\n.\n1,2m1\nh\nQ\n",
        "?\ncannot move lines to within their own range\n",
    );
}

#[test]
fn test_yank_and_paste() {
    ed_test("a\na\nb\n.\n1y\n$x\n,p\nQ\n", "a\nb\na\n");
}

#[test]
fn test_paste_at_zero() {
    ed_test("a\na\nb\n.\n2y\n0x\n,p\nQ\n", "b\na\nb\n");
}

// ============================================================================
// Join Tests
// ============================================================================

#[test]
fn test_join() {
    ed_test("a\nline one\nline two\n.\n1,2j\n1p\nQ\n", "line oneline two\n");
}

#[test]
fn test_join_single_line_is_noop() {
    ed_test("a\nx\ny\n.\n1j\n,p\nQ\n", "x\ny\n");
}

// ============================================================================
// Undo Tests
// ============================================================================

#[test]
fn test_undo_substitute() {
    ed_test("a\nhello\n.\n1s/hello/goodbye/\nu\n1p\nQ\n", "goodbye\nhello\n");
}

#[test]
fn test_undo_delete() {
    ed_test("a\nx\ny\n.\n1d\nu\n,p\nQ\n", "x\ny\n");
}

#[test]
fn test_undo_twice_toggles() {
    ed_test("a\na\nb\n.\n2d\nu\nu\n,p\nQ\n", "a\n");
}

// ============================================================================
// Mark Tests
// ============================================================================

#[test]
fn test_mark_addressing() {
    ed_test(
        "a\nline one\nline two\nline three\n.\n2ka\n3\n'ap\nQ\n",
        "line three\nline two\n",
    );
}

#[test]
fn test_mark_survives_other_deletions() {
    ed_test("a\na\nb\nc\n.\n2ka\n1d\n'ap\nQ\n", "b\n");
}

#[test]
fn test_mark_cleared_when_line_deleted() {
    ed_test(
        "a\na\nb\nc\n.\n2ka\n2d\n'ap\nh\nQ\n",
        "?\nmark was cleared: a\n",
    );
}

#[test]
fn test_unknown_mark() {
    ed_test("a\nx\n.\n'qp\nh\nQ\n", "?\nno such mark: q\n");
}

// ============================================================================
// Scroll and Line Number Tests
// ============================================================================

#[test]
fn test_scroll_with_count() {
    ed_test(
        "a\nline 1\nline 2\nline 3\nline 4\nline 5\n.\n1z3\nQ\n",
        "line 1\nline 2\nline 3\n",
    );
}

#[test]
fn test_scroll_remembers_window_size() {
    ed_test("a\n1\n2\n3\n4\n5\n.\n1z2\nz\nQ\n", "1\n2\n2\n3\n");
}

#[test]
fn test_line_number() {
    ed_test("a\nline one\nline two\nline three\n.\n=\n2=\nQ\n", "3\n2\n");
}

// ============================================================================
// File Operation Tests
// ============================================================================

#[test]
fn test_load_file_on_startup() {
    ed_test_with_file("content from file\n", "1,$p\nq\n", "content from file\n");
}

#[test]
fn test_startup_prints_byte_size() {
    let temp = NamedTempFile::new().unwrap();
    fs::write(temp.path(), "abc\ndef\n").unwrap();

    run_test(TestPlan {
        args: vec![temp.path().to_string_lossy().to_string()],
        stdin_data: "q\n".to_string(),
        // the size counts line contents, not the stripped newlines
        expected_out: "6\n".to_string(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });
}

#[test]
fn test_startup_missing_file_warns() {
    run_test(TestPlan {
        args: vec!["/no/such/red-test-file".to_string()],
        stdin_data: "q\n".to_string(),
        expected_out: String::new(),
        expected_err: "/no/such/red-test-file: No such file or directory\n".to_string(),
        expected_exit_code: 0,
    });
}

#[test]
fn test_write_file() {
    let temp = NamedTempFile::new().unwrap();
    let path = temp.path().to_string_lossy().to_string();

    run_test(TestPlan {
        args: vec!["-s".to_string()],
        stdin_data: format!("a\ntest content\n.\nw {}\nq\n", path),
        expected_out: String::new(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });

    let content = fs::read_to_string(temp.path()).unwrap();
    assert_eq!(content, "test content\n");
}

#[test]
fn test_write_range() {
    let temp = NamedTempFile::new().unwrap();
    let path = temp.path().to_string_lossy().to_string();

    run_test(TestPlan {
        args: vec!["-s".to_string()],
        stdin_data: format!("a\na\nb\nc\n.\n2,3w {}\nQ\n", path),
        expected_out: String::new(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });

    assert_eq!(fs::read_to_string(temp.path()).unwrap(), "b\nc\n");
}

#[test]
fn test_write_quit_suffix() {
    let temp = NamedTempFile::new().unwrap();
    let path = temp.path().to_string_lossy().to_string();

    run_test(TestPlan {
        args: vec!["-s".to_string()],
        stdin_data: format!("a\nx\n.\nwq {}\n", path),
        expected_out: String::new(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });

    assert_eq!(fs::read_to_string(temp.path()).unwrap(), "x\n");
}

#[test]
fn test_append_write() {
    let temp = NamedTempFile::new().unwrap();
    let path = temp.path().to_string_lossy().to_string();
    fs::write(temp.path(), "one\n").unwrap();

    run_test(TestPlan {
        args: vec!["-s".to_string()],
        stdin_data: format!("a\ntwo\n.\nW {}\nQ\n", path),
        expected_out: String::new(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });

    assert_eq!(fs::read_to_string(temp.path()).unwrap(), "one\ntwo\n");
}

#[test]
fn test_read_at_zero_prepends() {
    let temp = NamedTempFile::new().unwrap();
    let path = temp.path().to_string_lossy().to_string();
    fs::write(temp.path(), "header\n").unwrap();

    ed_test(
        &format!("a\nbody\n.\n0r {}\n,p\nQ\n", path),
        "header\nbody\n",
    );
}

#[test]
fn test_edit_missing_file_fails() {
    ed_test("e /no/such/red-test-file\nQ\n", "?\n");
}

#[test]
fn test_edit_round_trips_buffer() {
    let temp = NamedTempFile::new().unwrap();
    let path = temp.path().to_string_lossy().to_string();

    ed_test(
        &format!("a\nalpha\nbeta\n.\nw {}\ne {}\n,p\nQ\n", path, path),
        "alpha\nbeta\n",
    );
}

#[test]
fn test_file_command() {
    ed_test("f myfile\nf\nQ\n", "myfile\n");
}

// ============================================================================
// Error Reporting Tests
// ============================================================================

#[test]
fn test_help_after_error() {
    ed_test("9p\nh\nQ\n", "?\nline is out of bounds\n");
}

#[test]
fn test_verbose_errors_without_suppress() {
    run_test(TestPlan {
        args: vec![],
        stdin_data: "H\n9p\nQ\n".to_string(),
        expected_out: "line is out of bounds\n".to_string(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });
}

// ============================================================================
// Prompt Tests
// ============================================================================

#[test]
fn test_prompt_flag() {
    run_test(TestPlan {
        args: vec!["-s".to_string(), "-p".to_string(), "*".to_string()],
        stdin_data: "q\n".to_string(),
        expected_out: "*".to_string(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });
}

// ============================================================================
// Shell Escape Tests
// ============================================================================

#[test]
fn test_shell_escape() {
    ed_test("!echo hi\nQ\n", "hi\n!\n");
}

#[test]
fn test_shell_escape_expands_filename() {
    ed_test("f target.txt\n!echo %\nQ\n", "target.txt\n!\n");
}

#[test]
fn test_shell_escape_escaped_percent() {
    ed_test("f target.txt\n!echo \\%\nQ\n", "%\n!\n");
}

// ============================================================================
// Comment Tests
// ============================================================================

#[test]
fn test_comment_is_ignored() {
    ed_test("# a comment\nQ\n", "");
}
