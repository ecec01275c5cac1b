use super::domain::{ApplicationId, Interview, InterviewSlot};

pub const CONFLICT_MESSAGE: &str = "Interview time conflicts with existing schedule";

/// Find an existing interview starting at exactly the proposed instant.
///
/// Comparison is exact equality on the combined date and time, not interval overlap: two
/// interviews one minute apart do not conflict. The interview belonging to `application_id`
/// itself is skipped so rescheduling to the same slot is allowed, as are interviews still
/// missing a date or time.
pub fn find_conflict<'a>(
    proposal: &InterviewSlot,
    application_id: ApplicationId,
    interviews: &'a [Interview],
) -> Option<&'a Interview> {
    let candidate = proposal.starts_at();
    interviews
        .iter()
        .filter(|interview| interview.id != application_id)
        .find(|interview| interview.starts_at() == Some(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::directory::{PositionId, StudentId};
    use chrono::{NaiveDate, NaiveTime};

    fn at(day: u32, hour: u32, minute: u32) -> (NaiveDate, NaiveTime) {
        (
            NaiveDate::from_ymd_opt(2024, 5, day).expect("valid date"),
            NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time"),
        )
    }

    fn interview(id: u64, day: u32, hour: u32, minute: u32) -> Interview {
        let (date, time) = at(day, hour, minute);
        Interview {
            id: ApplicationId(id),
            student_id: StudentId(100 + id),
            position_id: PositionId(9),
            interview_date: Some(date),
            interview_time: Some(time),
            interview_location: Some("Room 4".to_string()),
        }
    }

    fn existing() -> Vec<Interview> {
        vec![interview(1, 1, 9, 0), interview(2, 2, 10, 0)]
    }

    fn proposal(day: u32, hour: u32, minute: u32) -> InterviewSlot {
        let (date, time) = at(day, hour, minute);
        InterviewSlot::new(date, time, "Room 7")
    }

    #[test]
    fn same_instant_for_another_application_conflicts() {
        let interviews = existing();
        let hit = find_conflict(&proposal(1, 9, 0), ApplicationId(3), &interviews)
            .expect("conflict detected");
        assert_eq!(hit.id, ApplicationId(1));
    }

    #[test]
    fn one_minute_later_is_free() {
        let interviews = existing();
        assert!(find_conflict(&proposal(1, 9, 1), ApplicationId(3), &interviews).is_none());
    }

    #[test]
    fn rescheduling_into_own_slot_is_allowed() {
        let interviews = existing();
        assert!(find_conflict(&proposal(1, 9, 0), ApplicationId(1), &interviews).is_none());
    }

    #[test]
    fn location_does_not_matter() {
        let interviews = existing();
        let mut slot = proposal(2, 10, 0);
        slot.location = "Somewhere else entirely".to_string();
        assert!(find_conflict(&slot, ApplicationId(3), &interviews).is_some());
    }

    #[test]
    fn incomplete_interviews_are_ignored() {
        let mut partial = interview(5, 1, 9, 0);
        partial.interview_time = None;
        assert!(find_conflict(&proposal(1, 9, 0), ApplicationId(3), &[partial]).is_none());
    }
}
