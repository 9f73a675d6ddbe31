pub mod activities;
pub mod activity_evaluations;
pub mod participation_grades;
pub mod profiles;
pub mod student_registrations;

pub use activities::ActivitiesRow;
pub use activity_evaluations::ActivityEvaluationsRow;
pub use participation_grades::{GradeRosterRow, StudentGradeRow};
pub use profiles::{ProfilesRow, Role};
pub use student_registrations::{
    ActivityRegistrationRow, MyRegistrationRow, RegistrationStatus, StudentRegistrationsRow,
};
