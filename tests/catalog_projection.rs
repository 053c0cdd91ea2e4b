use finals_revise::catalog::project_catalog;
use finals_matrix_to_schedule::{CommonExamTable, ExamSlot, MeetingPattern, ScheduleTable};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn schedule_fixture() -> ScheduleTable {
    let mut schedule = ScheduleTable::default();
    schedule.insert(
        MeetingPattern {
            days: "MW".to_string(),
            time: "0200 - 0315".to_string(),
        },
        Some(ExamSlot {
            date: "Apr 28, 2025".to_string(),
            time: "1440 - 1730".to_string(),
        }),
    );
    schedule.insert(
        MeetingPattern {
            days: "TR".to_string(),
            time: "0800 - 0915".to_string(),
        },
        Some(ExamSlot {
            date: "Apr 30, 2025".to_string(),
            time: "0800 - 1050".to_string(),
        }),
    );
    schedule
}

fn common_fixture() -> CommonExamTable {
    let mut common = CommonExamTable::default();
    common.insert(
        "MATH 1551".to_string(),
        ExamSlot {
            date: "Apr 25, 2025".to_string(),
            time: "1800 - 2050".to_string(),
        },
    );
    common
}

fn section(period_idx: u64, days: &str, credits: u64, schedule_type_idx: u64) -> Value {
    json!([
        "12345",
        [[period_idx, days, "Room 101", "", [], "", Value::Null, Value::Null]],
        credits,
        schedule_type_idx
    ])
}

fn catalog_fixture() -> Value {
    json!({
        "caches": {
            "periods": ["0200 - 0315", "0800 - 0915"],
            "scheduleTypes": ["Lecture*", "Supervised Laboratory*"]
        },
        "courses": {
            "CS 2110": ["Computer Organization", { "A": section(0, "MW", 3, 0) }],
            "MATH 1551": ["Differential Calculus", { "B": section(1, "TR", 2, 0) }],
            "VIP 3601": ["Vertically Integrated Project", { "A": section(0, "MW", 3, 0) }],
            "CHEM 1211": ["Chemistry Lab", { "L1": section(0, "MW", 3, 1) }],
            "PSYC 1101": ["Seminar", { "A": section(0, "MW", 1, 0) }]
        }
    })
}

fn meeting<'a>(document: &'a Value, course: &str, section_id: &str) -> &'a Vec<Value> {
    document["courses"][course][1][section_id][1][0]
        .as_array()
        .expect("meeting should be an array")
}

#[test]
fn writes_sorted_caches_and_section_indices() {
    let mut document = catalog_fixture();
    let report = project_catalog(&mut document, &schedule_fixture(), &common_fixture())
        .expect("projection should succeed");

    assert_eq!(
        document["caches"]["finalDates"],
        json!(["Apr 25, 2025", "Apr 28, 2025", "Apr 30, 2025"]),
    );
    assert_eq!(
        document["caches"]["finalTimes"],
        json!(["0800 - 1050", "1440 - 1730", "1800 - 2050"]),
    );

    // Meeting-pattern lookup: (MW, 0200 - 0315) -> Apr 28 / 1440 - 1730.
    let cs = meeting(&document, "CS 2110", "A");
    assert_eq!(cs[6], json!(1));
    assert_eq!(cs[7], json!(1));

    assert_eq!(report.sections_updated, 2);
    assert_eq!(report.distinct_dates, 3);
    assert_eq!(report.distinct_times, 3);
}

#[test]
fn common_exam_lookup_takes_precedence_over_meeting_pattern() {
    let mut document = catalog_fixture();
    project_catalog(&mut document, &schedule_fixture(), &common_fixture())
        .expect("projection should succeed");

    // MATH 1551 meets (TR, 0800 - 0915), which the schedule maps to Apr 30,
    // but the common-exam entry pins it to Apr 25 / 1800 - 2050.
    let math = meeting(&document, "MATH 1551", "B");
    assert_eq!(math[6], json!(0));
    assert_eq!(math[7], json!(2));
}

#[test]
fn ineligible_sections_keep_their_slots_untouched() {
    let mut document = catalog_fixture();
    project_catalog(&mut document, &schedule_fixture(), &common_fixture())
        .expect("projection should succeed");

    for (course, section_id) in [("VIP 3601", "A"), ("CHEM 1211", "L1"), ("PSYC 1101", "A")] {
        let entry = meeting(&document, course, section_id);
        assert_eq!(entry[6], Value::Null, "{course} {section_id}");
        assert_eq!(entry[7], Value::Null, "{course} {section_id}");
    }
}

#[test]
fn sections_without_meeting_info_are_skipped() {
    let mut document = json!({
        "caches": { "periods": [], "scheduleTypes": ["Lecture*"] },
        "courses": {
            "CS 4510": ["Automata", { "A": ["1", [], 3, 0] }]
        }
    });

    let report = project_catalog(&mut document, &schedule_fixture(), &common_fixture())
        .expect("projection should succeed");
    assert_eq!(report.sections_updated, 0);
}

#[test]
fn malformed_documents_are_rejected() {
    let mut document = json!({ "courses": {} });
    let error = project_catalog(&mut document, &schedule_fixture(), &common_fixture())
        .expect_err("missing caches should fail");
    assert!(error.to_string().contains("caches"));
}
