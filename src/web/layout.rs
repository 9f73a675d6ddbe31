use crate::models::Role;
use crate::services::notice::{notice_view, NoticeView};
use crate::web::session::AuthenticatedUser;

/// Navigation chrome shared by every signed-in page.
pub struct Layout {
    pub user_name: String,
    pub role_label: String,
    pub is_teacher: bool,
    pub is_student: bool,
    pub active: &'static str,
    pub notice: Option<NoticeView>,
    pub build_id: &'static str,
}

impl Layout {
    pub fn new(user: &AuthenticatedUser, active: &'static str, notice: Option<&str>) -> Self {
        Self {
            user_name: user.display_name(),
            role_label: user.role.map(|r| r.label()).unwrap_or("No role").to_string(),
            is_teacher: user.has_role(Role::Teacher),
            is_student: user.has_role(Role::Student),
            active,
            notice: notice_view(notice),
            build_id: env!("ACTIVITIES_BUILD_ID"),
        }
    }
}
