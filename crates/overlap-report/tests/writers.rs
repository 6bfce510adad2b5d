use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use overlap_model::{MatchType, OverlapRecord};
use overlap_report::{
    OVERLAP_COLUMNS, OverlapFormat, write_overlap_csv, write_overlap_csv_to, write_overlaps,
    write_synonyms, write_unmatched,
};
use tempfile::TempDir;

fn sample() -> Vec<OverlapRecord> {
    vec![
        OverlapRecord {
            left_id: "L1".to_string(),
            right_id: "R1".to_string(),
            left_name: "Paclitaxel".to_string(),
            right_name: "paclitaxel injection".to_string(),
            left_component: None,
            match_type: MatchType::FuzzyConsensus,
            jaro_winkler: 0.9,
            jaccard: 0.5,
            token_ratio: 100.0,
            edit_ratio: 66.5,
            left_approval_date: NaiveDate::from_ymd_opt(2019, 3, 14),
            right_approval_date: None,
            left_indication: Some("Breast cancer".to_string()),
            right_indication: None,
        },
        OverlapRecord {
            left_id: "L7".to_string(),
            right_id: "R3".to_string(),
            left_name: "Abacavir, Lamivudine".to_string(),
            right_name: "lamivudine".to_string(),
            left_component: Some("lamivudine".to_string()),
            match_type: MatchType::Exact,
            jaro_winkler: 1.0,
            jaccard: 1.0,
            token_ratio: 100.0,
            edit_ratio: 100.0,
            left_approval_date: None,
            right_approval_date: NaiveDate::from_ymd_opt(2004, 7, 1),
            left_indication: None,
            right_indication: Some("HIV-1".to_string()),
        },
    ]
}

#[test]
fn overlap_csv_layout() {
    let mut buffer = Vec::new();
    write_overlap_csv_to(&mut buffer, &sample()).expect("write csv");
    let text = String::from_utf8(buffer).expect("utf8");
    insta::assert_snapshot!(text, @r#"
    left_id,right_id,left_name,right_name,left_component,match_type,jaro_winkler,jaccard,token_ratio,edit_ratio,left_approval_date,right_approval_date,left_indication,right_indication
    L1,R1,Paclitaxel,paclitaxel injection,,FUZZY_CONSENSUS,0.9,0.5,100.0,66.5,2019-03-14,,Breast cancer,
    L7,R3,"Abacavir, Lamivudine",lamivudine,lamivudine,EXACT,1.0,1.0,100.0,100.0,,2004-07-01,,HIV-1
    "#);
}

#[test]
fn empty_overlap_list_still_has_header() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("overlap.csv");
    write_overlap_csv(&path, &[]).expect("write csv");
    let text = fs::read_to_string(&path).expect("read back");
    assert_eq!(text.trim_end(), OVERLAP_COLUMNS.join(","));
}

#[test]
fn json_output_round_trips() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("overlap.json");
    let records = sample();
    write_overlaps(&path, &records, OverlapFormat::from_path(&path)).expect("write json");
    let parsed: Vec<OverlapRecord> =
        serde_json::from_str(&fs::read_to_string(&path).expect("read back")).expect("parse");
    assert_eq!(parsed, records);
}

#[test]
fn format_follows_extension() {
    assert_eq!(OverlapFormat::from_path(Path::new("out.JSON")), OverlapFormat::Json);
    assert_eq!(OverlapFormat::from_path(Path::new("out.csv")), OverlapFormat::Csv);
    assert_eq!(OverlapFormat::from_path(Path::new("out")), OverlapFormat::Csv);
}

#[test]
fn unmatched_names_one_per_line() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("unmatched.txt");
    write_unmatched(&path, &["Docetaxel".to_string(), "Zolpidem".to_string()])
        .expect("write names");
    assert_eq!(
        fs::read_to_string(&path).expect("read back"),
        "Docetaxel\nZolpidem\n"
    );
}

#[test]
fn synonyms_are_written_as_object() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("synonyms.json");
    let mut synonyms = BTreeMap::new();
    synonyms.insert("leucovorin".to_string(), "calcium folinate".to_string());
    write_synonyms(&path, &synonyms).expect("write synonyms");
    let parsed: BTreeMap<String, String> =
        serde_json::from_str(&fs::read_to_string(&path).expect("read back")).expect("parse");
    assert_eq!(parsed, synonyms);
}
