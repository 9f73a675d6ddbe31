/// One-shot user-facing messages carried as `?notice=<code>` on redirects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    SignedIn,
    SignedOut,
    SignupCheckEmail,
    ActivityCreated,
    ActivityUpdated,
    ActivityDeleted,
    ActivityCreateFailed,
    ActivityUpdateFailed,
    ActivityDeleteFailed,
    Registered,
    AlreadyRegistered,
    RegisterFailed,
    RegistrationCancelled,
    CancelFailed,
    RegistrationStatusUpdated,
    RegistrationStatusFailed,
    Evaluated,
    AlreadyEvaluated,
    EvaluateFailed,
    GradeSaved,
    GradeFailed,
    ProfileSaved,
    ProfileFailed,
    NotFound,
    Forbidden,
    InvalidInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeTone {
    Success,
    Error,
}

const ALL: &[Notice] = &[
    Notice::SignedIn,
    Notice::SignedOut,
    Notice::SignupCheckEmail,
    Notice::ActivityCreated,
    Notice::ActivityUpdated,
    Notice::ActivityDeleted,
    Notice::ActivityCreateFailed,
    Notice::ActivityUpdateFailed,
    Notice::ActivityDeleteFailed,
    Notice::Registered,
    Notice::AlreadyRegistered,
    Notice::RegisterFailed,
    Notice::RegistrationCancelled,
    Notice::CancelFailed,
    Notice::RegistrationStatusUpdated,
    Notice::RegistrationStatusFailed,
    Notice::Evaluated,
    Notice::AlreadyEvaluated,
    Notice::EvaluateFailed,
    Notice::GradeSaved,
    Notice::GradeFailed,
    Notice::ProfileSaved,
    Notice::ProfileFailed,
    Notice::NotFound,
    Notice::Forbidden,
    Notice::InvalidInput,
];

impl Notice {
    pub fn code(self) -> &'static str {
        match self {
            Self::SignedIn => "signed_in",
            Self::SignedOut => "signed_out",
            Self::SignupCheckEmail => "signup_check_email",
            Self::ActivityCreated => "activity_created",
            Self::ActivityUpdated => "activity_updated",
            Self::ActivityDeleted => "activity_deleted",
            Self::ActivityCreateFailed => "activity_create_failed",
            Self::ActivityUpdateFailed => "activity_update_failed",
            Self::ActivityDeleteFailed => "activity_delete_failed",
            Self::Registered => "registered",
            Self::AlreadyRegistered => "already_registered",
            Self::RegisterFailed => "register_failed",
            Self::RegistrationCancelled => "registration_cancelled",
            Self::CancelFailed => "cancel_failed",
            Self::RegistrationStatusUpdated => "registration_status_updated",
            Self::RegistrationStatusFailed => "registration_status_failed",
            Self::Evaluated => "evaluated",
            Self::AlreadyEvaluated => "already_evaluated",
            Self::EvaluateFailed => "evaluate_failed",
            Self::GradeSaved => "grade_saved",
            Self::GradeFailed => "grade_failed",
            Self::ProfileSaved => "profile_saved",
            Self::ProfileFailed => "profile_failed",
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::InvalidInput => "invalid_input",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        ALL.iter().copied().find(|n| n.code() == code)
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::SignedIn => "Signed in successfully.",
            Self::SignedOut => "You have been signed out.",
            Self::SignupCheckEmail => "Account created. Check your email to confirm it, then sign in.",
            Self::ActivityCreated => "Activity added.",
            Self::ActivityUpdated => "Activity updated.",
            Self::ActivityDeleted => "Activity deleted.",
            Self::ActivityCreateFailed => "Could not add the activity.",
            Self::ActivityUpdateFailed => "Could not update the activity.",
            Self::ActivityDeleteFailed => "Could not delete the activity.",
            Self::Registered => "Registered for the activity.",
            Self::AlreadyRegistered => "You have already registered for this activity.",
            Self::RegisterFailed => "Could not register for the activity.",
            Self::RegistrationCancelled => "Registration cancelled.",
            Self::CancelFailed => "Could not cancel the registration.",
            Self::RegistrationStatusUpdated => "Registration updated.",
            Self::RegistrationStatusFailed => "Could not update the registration.",
            Self::Evaluated => "Thank you, your evaluation was submitted.",
            Self::AlreadyEvaluated => "You have already evaluated this activity.",
            Self::EvaluateFailed => "Could not submit the evaluation.",
            Self::GradeSaved => "Grade saved.",
            Self::GradeFailed => "Could not save the grade.",
            Self::ProfileSaved => "Profile updated.",
            Self::ProfileFailed => "Could not update the profile.",
            Self::NotFound => "That item no longer exists.",
            Self::Forbidden => "You are not allowed to do that.",
            Self::InvalidInput => "Some fields are missing or invalid.",
        }
    }

    pub fn tone(self) -> NoticeTone {
        match self {
            Self::SignedIn
            | Self::SignedOut
            | Self::SignupCheckEmail
            | Self::ActivityCreated
            | Self::ActivityUpdated
            | Self::ActivityDeleted
            | Self::Registered
            | Self::RegistrationCancelled
            | Self::RegistrationStatusUpdated
            | Self::Evaluated
            | Self::GradeSaved
            | Self::ProfileSaved => NoticeTone::Success,
            _ => NoticeTone::Error,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NoticeView {
    pub code: String,
    pub message: String,
    pub is_error: bool,
}

impl From<Notice> for NoticeView {
    fn from(notice: Notice) -> Self {
        Self {
            code: notice.code().to_string(),
            message: notice.message().to_string(),
            is_error: notice.tone() == NoticeTone::Error,
        }
    }
}

/// Resolves a `notice` query value; unknown codes are dropped.
pub fn notice_view(code: Option<&str>) -> Option<NoticeView> {
    code.and_then(Notice::from_code).map(NoticeView::from)
}

/// Appends `notice=<code>` to a local path.
pub fn with_notice(target: &str, notice: Notice) -> String {
    let sep = if target.contains('?') { "&" } else { "?" };
    format!("{}{}notice={}", target, sep, notice.code())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_round_trips() {
        for notice in ALL {
            assert_eq!(Notice::from_code(notice.code()), Some(*notice));
        }
        assert_eq!(Notice::from_code("<script>"), None);
    }

    #[test]
    fn with_notice_respects_existing_query() {
        assert_eq!(
            with_notice("/activities", Notice::Registered),
            "/activities?notice=registered"
        );
        assert_eq!(
            with_notice("/reports?year=2025", Notice::NotFound),
            "/reports?year=2025&notice=not_found"
        );
    }

    #[test]
    fn duplicate_notices_are_errors() {
        let view = notice_view(Some("already_evaluated")).unwrap();
        assert!(view.is_error);
        assert_eq!(view.message, "You have already evaluated this activity.");
        assert!(notice_view(Some("bogus")).is_none());
    }
}
