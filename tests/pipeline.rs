use std::fs::File;
use std::path::Path;

use geoipcsv::error::Stage;
use geoipcsv::stream::error_chain;
use geoipcsv::{Config, Error, ErrorMode, MemoryStore, StreamProcessor, Summary};

// Load the fixture store shared by these tests
fn fixture_store() -> MemoryStore {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/locations.json");
    let file = File::open(&path).expect("fixture file must exist");
    MemoryStore::from_json(file).expect("fixture file must parse")
}

fn enrich(config: &Config, input: &str) -> (geoipcsv::Result<Summary>, String) {
    let store = fixture_store();
    let processor = StreamProcessor::new(config, &store);
    let mut out = Vec::new();
    let result = processor.process(&mut input.as_bytes(), &mut out);
    (result, String::from_utf8(out).expect("output is UTF-8"))
}

fn column(column: usize) -> Config {
    Config {
        column,
        ..Config::default()
    }
}

#[test]
fn fixture_loads() {
    assert_eq!(fixture_store().len(), 5);
}

#[test]
fn appends_four_columns_in_order() {
    let input = "1,8.8.8.8\n2,81.2.69.160\n3,2a02:d200::1\n4,67.43.156.1\n";
    let (result, out) = enrich(&column(1), input);
    assert_eq!(
        out,
        "1,8.8.8.8,Mountain View,United States,false,false\n\
         2,81.2.69.160,London,United Kingdom,false,false\n\
         3,2a02:d200::1,,Finland,false,true\n\
         4,67.43.156.1,,Bhutan,true,false\n"
    );
    assert_eq!(result.unwrap().written, 4);
}

#[test]
fn every_output_line_has_four_more_fields() {
    let input = "a,b,8.8.8.8,c\nd,e,81.2.69.160,f\n";
    let (result, out) = enrich(&column(2), input);
    result.unwrap();
    for (line_in, line_out) in input.lines().zip(out.lines()) {
        let fields_in = line_in.split(',').count();
        let fields_out = line_out.split(',').count();
        assert_eq!(fields_out, fields_in + 4);
        assert!(line_out.starts_with(line_in));
        let flags: Vec<&str> = line_out.rsplit(',').take(2).collect();
        assert!(flags.iter().all(|f| *f == "true" || *f == "false"));
    }
}

#[test]
fn quoted_address_with_trim_set() {
    let config = Config {
        trim: Some("\"".to_string()),
        ..column(1)
    };
    let (result, out) = enrich(&config, "2,\"8.8.8.8\"\n3,8.8.8.8\n");
    result.unwrap();
    assert_eq!(
        out,
        "2,\"8.8.8.8\",Mountain View,United States,false,false\n\
         3,8.8.8.8,Mountain View,United States,false,false\n"
    );
}

#[test]
fn quoted_address_without_trim_set_fails() {
    let (result, out) = enrich(&column(1), "2,\"8.8.8.8\"\n");
    assert!(out.is_empty());
    let err = result.unwrap_err();
    assert!(error_chain(&err).contains("couldn't parse IP"));
}

#[test]
fn parse_error_stops_the_stream() {
    let input = "1,8.8.8.8\n3,not-an-ip\n4,81.2.69.160\n";
    let (result, out) = enrich(&column(1), input);
    assert_eq!(out.lines().count(), 1);
    match result.unwrap_err() {
        Error::Line { line, stage, .. } => {
            assert_eq!(line, 2);
            assert_eq!(stage, Stage::Lookup);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn column_error_stops_the_stream() {
    let input = "1,8.8.8.8\n2\n3,81.2.69.160\n";
    let (result, out) = enrich(&column(1), input);
    assert_eq!(out, "1,8.8.8.8,Mountain View,United States,false,false\n");
    let err = result.unwrap_err();
    assert_eq!(
        error_chain(&err),
        "line 2: failed to parse record: configured column index 1 exceeds number of columns 1"
    );
}

#[test]
fn unknown_address_stops_the_stream() {
    let (result, out) = enrich(&column(0), "198.51.100.7\n");
    assert!(out.is_empty());
    assert!(error_chain(&result.unwrap_err()).contains("address not found"));
}

#[test]
fn other_language() {
    let config = Config {
        language: "fr".to_string(),
        verbose: true,
        ..column(1)
    };
    let input = "1,8.8.8.8\n2,81.2.69.160\n5,203.0.113.1\n";
    let (result, out) = enrich(&config, input);
    result.unwrap();
    assert_eq!(
        out,
        "1,8.8.8.8,,États-Unis,false,false\n\
         2,81.2.69.160,Londres,Royaume-Uni,false,false\n\
         5,203.0.113.1,,,false,false\n"
    );
}

#[test]
fn skip_mode_keeps_good_records_in_order() {
    let config = Config {
        on_error: ErrorMode::Skip,
        ..column(1)
    };
    let input = "1,8.8.8.8\n2\n3,nope\n4,198.51.100.7\n5,81.2.69.160\n";
    let (result, out) = enrich(&config, input);
    assert_eq!(
        out,
        "1,8.8.8.8,Mountain View,United States,false,false\n\
         5,81.2.69.160,London,United Kingdom,false,false\n"
    );
    assert_eq!(
        result.unwrap(),
        Summary {
            lines: 5,
            written: 2,
            skipped: 3
        }
    );
}

#[test]
fn identical_runs_give_identical_output() {
    let input = "x,8.8.8.8,y\nx,2a02:d200::1,y\nx,67.43.156.1,y\n";
    let (a, first) = enrich(&column(1), input);
    let (b, second) = enrich(&column(1), input);
    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(first.as_bytes(), second.as_bytes());
}
