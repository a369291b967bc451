// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn empty_table_prints_nothing() {
    let table = Table::plain(vec![Column::left("DIMENSION"), Column::right("MEAN")]);
    assert_eq!(table.render(), "");
}

#[test]
fn dimension_table_layout() {
    let mut table = Table::plain(vec![
        Column::left("DIMENSION"),
        Column::right("MEAN"),
        Column::right("N"),
    ]);
    table.row(vec!["openness".into(), "3.50".into(), "4".into()]);
    table.row(vec!["conscientiousness".into(), "2.00".into(), "12".into()]);
    let out = table.render();
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "DIMENSION          MEAN   N");
    assert_eq!(lines[1], "openness           3.50   4");
    assert_eq!(lines[2], "conscientiousness  2.00  12");
}

#[test]
fn last_left_column_is_not_padded() {
    let mut table = Table::plain(vec![Column::left("KIND"), Column::left("MESSAGE")]);
    table.row(vec!["encoding".into(), "x".into()]);
    table.row(vec!["transient_judge".into(), "connection refused".into()]);
    let out = table.render();
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines[1], "encoding         x");
    assert_eq!(lines[2], "transient_judge  connection refused");
}

#[test]
fn max_width_truncates_on_char_boundaries() {
    let mut table = Table::plain(vec![Column::left("KEY").with_max(4), Column::left("STATUS")]);
    table.row(vec!["问卷答案文件.txt".into(), "succeeded".into()]);
    let out = table.render();
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines[1], "问卷答案  succeeded");
}

#[test]
fn colored_table_styles_cells_after_padding() {
    let mut table = Table::colored(vec![Column::muted("KEY"), Column::left("STATUS")]);
    table.row(vec!["item-1".into(), "failed-permanent".into()]);
    let out = table.render();

    assert!(out.contains("\x1b[38;5;74mKEY   \x1b[0m"), "{out:?}");
    assert!(out.contains("\x1b[38;5;240mitem-1\x1b[0m"), "{out:?}");
    assert!(out.ends_with("failed-permanent\n"), "{out:?}");
}

#[test]
fn plain_table_has_no_ansi() {
    let mut table = Table::plain(vec![Column::muted("KEY"), Column::left("STATUS")]);
    table.row(vec!["item-1".into(), "succeeded".into()]);
    assert!(!table.render().contains("\x1b["));
}

#[test]
fn header_sets_minimum_width() {
    let mut table = Table::plain(vec![Column::right("WEIGHTED"), Column::left("DIMENSION")]);
    table.row(vec!["1.5".into(), "honesty".into()]);
    let out = table.render();

    assert_eq!(out, "WEIGHTED  DIMENSION\n     1.5  honesty\n");
}
