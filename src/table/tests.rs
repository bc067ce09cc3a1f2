use encoding_rs::{EUC_JP, SHIFT_JIS, UTF_8};

use super::*;

#[test]
fn comma_delimited_loads_on_first_attempt() {
    let table = Table::from_bytes("name,odds\nA,2.0\nB,4.0\n").unwrap();
    assert_eq!(Delimiter::Comma, table.delimiter());
    assert_eq!(UTF_8, table.encoding());
    assert_eq!(&["name", "odds"], table.headers());
    assert_eq!(2, table.num_rows());
    assert_eq!(vec!["A", "B"], table.column(0).collect::<Vec<_>>());
    assert_eq!(vec!["2.0", "4.0"], table.column(1).collect::<Vec<_>>());
}

#[test]
fn tab_delimited_loads_on_fallback() {
    let table = Table::from_bytes("name\todds\nA\t2.0\nB\t4.0\n").unwrap();
    assert_eq!(Delimiter::Tab, table.delimiter());
    assert_eq!(&["name", "odds"], table.headers());
    assert_eq!(vec!["2.0", "4.0"], table.column(1).collect::<Vec<_>>());
}

#[test]
fn commas_within_tab_delimited_cells() {
    let table = Table::from_bytes("name\todds\nSmith, Jr\t2.0\nB\t4.0\n").unwrap();
    assert_eq!(Delimiter::Tab, table.delimiter());
    assert_eq!(vec!["Smith, Jr", "B"], table.column(0).collect::<Vec<_>>());
}

#[test]
fn neither_delimiter_is_load_error() {
    let err = Table::from_bytes("just one column\nand another line\n").unwrap_err();
    assert!(matches!(
        err,
        LoadError::Unparseable {
            cause: ParseError::TooFewColumns(1),
            ..
        }
    ));
}

#[test]
fn empty_stream_is_load_error() {
    let err = Table::from_bytes("").unwrap_err();
    assert!(matches!(
        err,
        LoadError::Unparseable {
            cause: ParseError::Empty,
            ..
        }
    ));
}

#[test]
fn ragged_in_both_is_load_error() {
    let err = Table::from_bytes("a,b\tc\n1,2\n1\t2,3,4\n").unwrap_err();
    assert!(matches!(err, LoadError::Unparseable { .. }), "{err:?}");
    assert!(err.to_string().starts_with("unable to parse UTF-8 table"));
}

#[test]
fn shift_jis_decodes() {
    let (bytes, _, _) = SHIFT_JIS.encode("馬名,単勝オッズ\nサクラ,2.5\n");
    let table = Table::from_bytes(bytes).unwrap();
    assert_eq!(SHIFT_JIS, table.encoding());
    assert_eq!(&["馬名", "単勝オッズ"], table.headers());
    assert_eq!(vec!["サクラ"], table.column(0).collect::<Vec<_>>());
}

#[test]
fn euc_jp_kanji_headers_decode() {
    let (bytes, _, _) = EUC_JP.encode("馬名,単勝\nA,2.0\nB,4.0\n");
    let table = Table::from_bytes(bytes).unwrap();
    assert_eq!(EUC_JP, table.encoding());
    assert_eq!(Delimiter::Comma, table.delimiter());
    assert_eq!(&["馬名", "単勝"], table.headers());
    assert_eq!(2, table.num_rows());
}

#[test]
fn bom_is_stripped() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice("name,odds\nA,2.0\n".as_bytes());
    let table = Table::from_bytes(bytes).unwrap();
    assert_eq!(&["name", "odds"], table.headers());
}

#[test]
fn cells_are_trimmed() {
    let table = Table::from_bytes(" name , odds \n A , 2.0 \n").unwrap();
    assert_eq!(&["name", "odds"], table.headers());
    assert_eq!(vec!["A"], table.column(0).collect::<Vec<_>>());
}

#[test]
fn missing_file_is_io_error() {
    let err = Table::open("/nonexistent/race.csv").unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}
