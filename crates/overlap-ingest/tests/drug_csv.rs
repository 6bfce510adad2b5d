use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use overlap_ingest::{CsvColumns, load_synonyms, read_drug_csv, read_name_list};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write file");
    path
}

#[test]
fn reads_default_columns_and_numbers_rows() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        &dir,
        "approvals.csv",
        "\u{feff}Drug Name ,Date of Approval,Indication,Strength\n\
         Paclitaxel,03/14/2019,Breast cancer,100 mg\n\
         ,,,\n\
         Docetaxel,not a date,,20 mg\n",
    );
    let records = read_drug_csv(&path, &CsvColumns::default()).expect("read csv");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].source_id, "1");
    assert_eq!(records[0].raw_name, "Paclitaxel");
    assert_eq!(records[0].approval_date, NaiveDate::from_ymd_opt(2019, 3, 14));
    assert_eq!(records[0].indication.as_deref(), Some("Breast cancer"));
    assert_eq!(records[1].source_id, "3");
    assert_eq!(records[1].approval_date, None);
    assert_eq!(records[1].indication, None);
    assert_eq!(records[1].rxcui, None);
}

#[test]
fn reads_id_and_rxcui_columns() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        &dir,
        "orphan.csv",
        "Source ID,Drug Name,RxCUI,Date of Approval\n\
         FDA-1,Acetaminophen,161,2004-07-01\n\
         FDA-2,Nusinersen,,\n",
    );
    let records = read_drug_csv(&path, &CsvColumns::default()).expect("read csv");
    assert_eq!(records[0].source_id, "FDA-1");
    assert_eq!(records[0].rxcui.as_deref(), Some("161"));
    assert_eq!(records[0].approval_date, NaiveDate::from_ymd_opt(2004, 7, 1));
    assert_eq!(records[1].rxcui, None);
}

#[test]
fn honours_custom_column_names() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(&dir, "custom.csv", "id,generic name\nA7,Imatinib\n");
    let columns = CsvColumns::default()
        .with_name("Generic Name")
        .with_source_id("ID");
    let records = read_drug_csv(&path, &columns).expect("read csv");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source_id, "A7");
    assert_eq!(records[0].raw_name, "Imatinib");
}

#[test]
fn missing_name_column_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(&dir, "bad.csv", "Product,Indication\nX,Y\n");
    let err = read_drug_csv(&path, &CsvColumns::default()).unwrap_err();
    assert!(err.to_string().contains("Drug Name"), "{err}");
}

#[test]
fn missing_synonym_file_degrades_to_none() {
    let dir = TempDir::new().expect("temp dir");
    let loaded = load_synonyms(&dir.path().join("synonyms.json")).expect("load");
    assert!(loaded.is_none());
}

#[test]
fn loads_synonym_object() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        &dir,
        "synonyms.json",
        r#"{"leucovorin": "calcium folinate", "acetaminophen": "paracetamol"}"#,
    );
    let loaded = load_synonyms(&path).expect("load").expect("present");
    assert_eq!(loaded.len(), 2);
    assert_eq!(
        loaded.get("leucovorin").map(String::as_str),
        Some("calcium folinate")
    );
}

#[test]
fn malformed_synonym_file_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(&dir, "synonyms.json", r#"["not", "an", "object"]"#);
    assert!(load_synonyms(&path).is_err());
}

#[test]
fn name_list_skips_blank_lines() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(&dir, "unmatched.txt", "Docetaxel\n\n  Zolpidem  \n");
    let names = read_name_list(&path).expect("read names");
    assert_eq!(names, vec!["Docetaxel".to_string(), "Zolpidem".to_string()]);
}
