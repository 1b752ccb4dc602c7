//! Golden tests for terminal emulation
//!
//! Each test feeds a known output stream to a terminal and compares the
//! resulting snapshot text and cursor against the expected state. Streams
//! are also replayed in small chunks to check that streaming input lands in
//! the same state as a single batch.

use hexterm::core::Snapshot;
use hexterm::parser::tokenize;
use hexterm::Terminal;

/// Run a stream as one batch
fn run_golden_test(input: &str, cols: usize, rows: usize) -> Snapshot {
    let mut term = Terminal::new(cols, rows);
    term.apply(&tokenize(input));
    term.snapshot()
}

/// Run a stream through the streaming tokenizer, `chunk_size` chars at a time
fn run_golden_test_chunked(input: &str, cols: usize, rows: usize, chunk_size: usize) -> Snapshot {
    let mut term = Terminal::new(cols, rows);
    let chars: Vec<char> = input.chars().collect();
    for chunk in chars.chunks(chunk_size) {
        term.process(&chunk.iter().collect::<String>());
    }
    term.finish_input();
    term.snapshot()
}

fn assert_golden(input: &str, cols: usize, rows: usize, text: &str, cursor: (usize, usize)) {
    let snapshot = run_golden_test(input, cols, rows);
    assert_eq!(snapshot.to_text(), text, "text for {input:?}");
    assert_eq!(
        (snapshot.cursor.row, snapshot.cursor.col),
        cursor,
        "cursor for {input:?}"
    );

    for chunk_size in [1, 3, 7] {
        assert_eq!(
            run_golden_test_chunked(input, cols, rows, chunk_size),
            snapshot,
            "chunk size {chunk_size} for {input:?}"
        );
    }
}

// ============================================================================
// Basic printing tests
// ============================================================================

#[test]
fn test_simple_text() {
    assert_golden("Hello, World!", 80, 24, "Hello, World!\n", (0, 13));
}

#[test]
fn test_multiline_text() {
    assert_golden("Line 1\r\nLine 2\r\nLine 3", 80, 24, "Line 1\nLine 2\nLine 3\n", (2, 6));
}

#[test]
fn test_linefeed_keeps_column() {
    assert_golden("ab\ncd", 10, 3, "ab\n  cd\n", (1, 4));
}

#[test]
fn test_tabs() {
    assert_golden("a\tb\tc", 20, 2, "a       b       c\n", (0, 17));
    // The last tab stop clamps to the final column
    assert_golden("\t\t\tX", 10, 2, "         X\n", (0, 9));
}

#[test]
fn test_wide_characters() {
    let snapshot = run_golden_test("漢字x", 10, 2);
    assert_eq!(snapshot.to_text(), "漢字x\n");
    assert_eq!(snapshot.cell(0, 0).map(|c| c.width), Some(2));
    assert_eq!(snapshot.cell(1, 0).map(|c| c.width), Some(0));
    assert_eq!(snapshot.cursor.col, 5);
}

#[test]
fn test_wide_character_wraps_early() {
    assert_golden("abcd漢", 5, 2, "abcd\n漢\n", (1, 2));
}

#[test]
fn test_clusters_split_across_chunks() {
    // Chunked replays cut these clusters between their code points
    assert_golden("👨\u{200D}👩x", 10, 2, "👨\u{200D}👩x\n", (0, 3));
    assert_golden("ae\u{301}\u{302}b", 10, 2, "ae\u{301}\u{302}b\n", (0, 3));

    let snapshot = run_golden_test("👨\u{200D}👩x", 10, 2);
    assert_eq!(snapshot.cell(0, 0).map(|c| c.text.as_str()), Some("👨\u{200D}👩"));
    assert_eq!(snapshot.cell(0, 0).map(|c| c.width), Some(2));
}

#[test]
fn test_streamed_cluster_matches_batch() {
    let mut streamed = Terminal::new(10, 2);
    streamed.process("👨");
    streamed.process("\u{200D}👩x");
    streamed.finish_input();
    assert_eq!(streamed.snapshot(), run_golden_test("👨\u{200D}👩x", 10, 2));
}

// ============================================================================
// Wrapping and scrolling
// ============================================================================

#[test]
fn test_exact_fill_bands() {
    assert_golden(
        "AAAAAAAAAA\r\n\rBBBBBBBBBB\r\n\rCCCCCCCCCC\r\n\r",
        10,
        10,
        "AAAAAAAAAA\nBBBBBBBBBB\nCCCCCCCCCC\n",
        (3, 0),
    );
}

#[test]
fn test_autowrap() {
    assert_golden("ABCDEFGH", 5, 3, "ABCDE\nFGH\n", (1, 3));
}

#[test]
fn test_autowrap_disabled() {
    assert_golden("\x1b[?7lABCDEFGH", 5, 3, "ABCDH\n", (0, 4));
}

#[test]
fn test_scroll_at_bottom() {
    assert_golden("1\r\n2\r\n3\r\n4", 5, 3, "2\n3\n4\n", (2, 1));
}

#[test]
fn test_scroll_region() {
    assert_golden(
        "head\x1b[5;1Hfoot\x1b[2;4r\x1b[4;1Ha\r\nb\r\nc",
        10,
        5,
        "head\na\nb\nc\nfoot\n",
        (3, 1),
    );
}

#[test]
fn test_origin_mode() {
    assert_golden("\x1b[3;5r\x1b[?6h\x1b[HX\x1b[9;2HY", 10, 6, "\n\nX\n\n Y\n", (4, 2));
}

// ============================================================================
// Cursor and erase tests
// ============================================================================

#[test]
fn test_cursor_position() {
    assert_golden("\x1b[3;4HX\x1b[HY", 10, 5, "Y\n\n   X\n", (0, 1));
}

#[test]
fn test_erase_display() {
    assert_golden("abc\r\ndef\r\nghi\x1b[2;2H\x1b[J", 5, 3, "abc\nd\n", (1, 1));
    assert_golden("abc\r\ndef\r\nghi\x1b[2;2H\x1b[1J", 5, 3, "\n  f\nghi\n", (1, 1));
    assert_golden("abc\r\ndef\x1b[2J", 5, 3, "\n", (1, 3));
}

#[test]
fn test_erase_line() {
    assert_golden("abcdef\x1b[1;3H\x1b[K", 10, 2, "ab\n", (0, 2));
    assert_golden("abcdef\x1b[1;3H\x1b[1K", 10, 2, "   def\n", (0, 2));
    assert_golden("abcdef\x1b[1;3H\x1b[2K", 10, 2, "\n", (0, 2));
}

#[test]
fn test_save_restore_cursor() {
    assert_golden("ab\x1b7\x1b[3;3Hxy\x1b8cd", 10, 3, "abcd\n\n  xy\n", (0, 4));
    assert_golden("ab\x1b[s\x1b[2;1Hxy\x1b[ucd", 10, 3, "abcd\nxy\n", (0, 4));
}

// ============================================================================
// Attributes and sequences that leave the grid alone
// ============================================================================

#[test]
fn test_sgr_attributes() {
    let snapshot = run_golden_test("\x1b[1;31mR\x1b[0;4mU\x1b[mN", 10, 1);
    assert_eq!(snapshot.to_text(), "RUN\n");
    let bold = snapshot.cell(0, 0).map(|c| c.style.bold);
    assert_eq!(bold, Some(true));
    assert_eq!(snapshot.cell(1, 0).map(|c| c.style.underline), Some(true));
    assert_eq!(snapshot.cell(2, 0).map(|c| c.style.underline), Some(false));
}

#[test]
fn test_unrecognized_leaves_grid() {
    assert_golden("a\x1b[5Ab\x1b(Bc\x07d", 10, 2, "abcd\n", (0, 4));
}

#[test]
fn test_frame_markers_leave_grid() {
    assert_golden(
        "\x1b_HEX1BAPP:FRAME:BEGIN\x1b\\ok\x1b_HEX1BAPP:FRAME:END\x1b\\",
        10,
        2,
        "ok\n",
        (0, 2),
    );
}

#[test]
fn test_title_and_modes() {
    let snapshot = run_golden_test("\x1b]0;golden\x07\x1b[?25l\x1b[?2004h", 10, 2);
    assert_eq!(snapshot.title, "golden");
    assert!(!snapshot.cursor.visible);
    assert_eq!(snapshot.modes, vec![7, 2004]);
}

#[test]
fn test_graphics_in_snapshot() {
    let snapshot = run_golden_test("\x1bPq#0\x1b\\\x1b[1;3H\x1bPq#0\x1b\\", 5, 1);
    assert_eq!(snapshot.tracked_objects, 1);
    assert_eq!(snapshot.cell(0, 0).and_then(|c| c.graphic), snapshot.cell(2, 0).and_then(|c| c.graphic));
    assert!(snapshot.cell(0, 0).and_then(|c| c.graphic).is_some());
}
