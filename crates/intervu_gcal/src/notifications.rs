// --- File: crates/intervu_gcal/src/notifications.rs ---
//! Confirmation emails sent after a successful booking.

use chrono::{DateTime, Utc};

pub const INTERVIEW_SUBJECT: &str = "Interview Scheduled";

/// One email to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub to: String,
    pub subject: String,
    pub body: String,
}

fn schedule_lines(start: &DateTime<Utc>, end: &DateTime<Utc>) -> String {
    format!(
        "Date: {}\nTime: {} UTC to {} UTC.",
        start.format("%Y-%m-%d"),
        start.format("%I:%M %p"),
        end.format("%I:%M %p")
    )
}

pub fn candidate_notice(candidate_email: &str, start: &DateTime<Utc>, end: &DateTime<Utc>) -> Notice {
    Notice {
        to: candidate_email.to_string(),
        subject: INTERVIEW_SUBJECT.to_string(),
        body: format!(
            "Dear Candidate,\n\n\
             Your interview has been successfully scheduled for:\n\
             {}\n\n\
             We look forward to meeting you!\n\n\
             Best regards,\n\
             The Hiring Team\n",
            schedule_lines(start, end)
        ),
    }
}

pub fn recruiter_notice(
    recruiter_email: &str,
    candidate_email: &str,
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
) -> Notice {
    Notice {
        to: recruiter_email.to_string(),
        subject: INTERVIEW_SUBJECT.to_string(),
        body: format!(
            "Dear Recruiter,\n\n\
             An interview has been scheduled with {} for:\n\
             {}\n\n\
             The event has been added to the calendar.\n\n\
             Best regards,\n\
             The Interview Scheduling Bot\n",
            candidate_email,
            schedule_lines(start, end)
        ),
    }
}
