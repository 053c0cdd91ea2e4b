use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use finals_matrix_to_schedule::{CommonExamTable, ExamSlot, ScheduleTable};
use regex::Regex;
use serde_json::Value;

use crate::error::ReviseError;

/// Positions of the final exam date/time index slots inside a section's
/// first meeting entry.
const FINAL_DATE_SLOT: usize = 6;
const FINAL_TIME_SLOT: usize = 7;

/// VIP project courses never appear in the exam matrix.
static VIP_COURSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"VIP\s\d+").expect("hardcoded VIP regex is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionReport {
    pub sections_updated: usize,
    pub distinct_dates: usize,
    pub distinct_times: usize,
}

/// A section's exam-relevant fields, resolved through the document caches.
/// The caches are handed in explicitly; nothing here is process-global.
#[derive(Debug, Clone, PartialEq)]
struct SectionView {
    period: String,
    days: String,
    credits: f64,
    schedule_type: String,
}

impl SectionView {
    fn from_value(section: &Value, periods: &[String], schedule_types: &[String]) -> Option<Self> {
        let meetings = section.get(1)?.as_array()?;
        let meeting = meetings.first()?.as_array()?;
        let period_idx = usize::try_from(meeting.first()?.as_u64()?).ok()?;
        let days = meeting.get(1)?.as_str()?.to_string();
        let credits = section.get(2)?.as_f64()?;
        let schedule_type_idx = usize::try_from(section.get(3)?.as_u64()?).ok()?;

        Some(Self {
            period: periods.get(period_idx)?.clone(),
            days,
            credits,
            schedule_type: schedule_types.get(schedule_type_idx)?.clone(),
        })
    }

    fn takes_matrix_exam(&self) -> bool {
        // Only lecture sections of at least 2 credit hours appear in the
        // exam matrix.
        self.schedule_type == "Lecture*" && self.credits >= 2.0
    }
}

pub fn project_catalog_file(
    path: &Path,
    schedule: &ScheduleTable,
    common: &CommonExamTable,
) -> Result<ProjectionReport, ReviseError> {
    let payload = fs::read(path)?;
    let mut document: Value = serde_json::from_slice(&payload)?;
    let report = project_catalog(&mut document, schedule, common)?;
    fs::write(path, serde_json::to_vec(&document)?)?;
    Ok(report)
}

/// Writes the document-wide sorted date/time lists into the caches, then
/// points each eligible section's index slots at its exam date and time.
/// Common-exam entries take precedence over the meeting-pattern lookup.
pub fn project_catalog(
    document: &mut Value,
    schedule: &ScheduleTable,
    common: &CommonExamTable,
) -> Result<ProjectionReport, ReviseError> {
    let dates = distinct_sorted(schedule.exam_dates().chain(common.dates()));
    let times = distinct_sorted(schedule.exam_times().chain(common.times()));

    let caches = document
        .get_mut("caches")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| ReviseError::Catalog("document has no caches object".to_string()))?;
    caches.insert("finalDates".to_string(), Value::from(dates.clone()));
    caches.insert("finalTimes".to_string(), Value::from(times.clone()));
    let periods = string_cache(caches.get("periods"), "periods")?;
    let schedule_types = string_cache(caches.get("scheduleTypes"), "scheduleTypes")?;

    let courses = document
        .get("courses")
        .and_then(Value::as_object)
        .ok_or_else(|| ReviseError::Catalog("document has no courses object".to_string()))?;

    let mut updates = Vec::new();
    for (course_id, course) in courses {
        if VIP_COURSE.is_match(course_id) {
            continue;
        }
        let Some(sections) = course.get(1).and_then(Value::as_object) else {
            continue;
        };
        for (section_id, section) in sections {
            let Some(view) = SectionView::from_value(section, &periods, &schedule_types) else {
                continue;
            };
            if !view.takes_matrix_exam() {
                continue;
            }

            let slot = common
                .get(course_id)
                .or_else(|| schedule.lookup(&view.days, &view.period));
            let Some(ExamSlot { date, time }) = slot else {
                continue;
            };
            let (Some(date_idx), Some(time_idx)) = (
                dates.iter().position(|value| value == date),
                times.iter().position(|value| value == time),
            ) else {
                continue;
            };
            updates.push((course_id.clone(), section_id.clone(), date_idx, time_idx));
        }
    }

    let mut sections_updated = 0;
    for (course_id, section_id, date_idx, time_idx) in updates {
        let Some(meeting) = document
            .get_mut("courses")
            .and_then(|courses| courses.get_mut(course_id.as_str()))
            .and_then(|course| course.get_mut(1))
            .and_then(|sections| sections.get_mut(section_id.as_str()))
            .and_then(|section| section.get_mut(1))
            .and_then(|meetings| meetings.get_mut(0))
            .and_then(Value::as_array_mut)
        else {
            continue;
        };
        if meeting.len() <= FINAL_TIME_SLOT {
            tracing::warn!(
                course = %course_id,
                section = %section_id,
                "meeting entry too short for final exam index slots"
            );
            continue;
        }
        meeting[FINAL_DATE_SLOT] = Value::from(date_idx);
        meeting[FINAL_TIME_SLOT] = Value::from(time_idx);
        sections_updated += 1;
    }

    Ok(ProjectionReport {
        sections_updated,
        distinct_dates: dates.len(),
        distinct_times: times.len(),
    })
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn string_cache(cache: Option<&Value>, name: &str) -> Result<Vec<String>, ReviseError> {
    cache
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .map(|value| value.as_str().unwrap_or_default().to_string())
                .collect()
        })
        .ok_or_else(|| ReviseError::Catalog(format!("document has no {name} cache")))
}
