#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
}

impl RegistrationStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Awaiting approval",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StudentRegistrationsRow {
    pub id: String,
    pub activity_id: String,
    pub student_id: String,
    pub status: String,
    pub registration_date: String,
}

// Registration of the signed-in student joined with its activity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MyRegistrationRow {
    pub id: String,
    pub activity_id: String,
    pub status: String,
    pub registration_date: String,
    pub title: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub participants: Option<i64>,
}

// Registration of an activity joined with the student's profile.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityRegistrationRow {
    pub id: String,
    pub student_id: String,
    pub status: String,
    pub registration_date: String,
    pub full_name: Option<String>,
    pub school: Option<String>,
}
