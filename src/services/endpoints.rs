//! Backend endpoint paths.

pub mod auth {
    pub const ME: &str = "/auth/me";
    pub const LOGIN: &str = "/auth/login";
    pub const REGISTER: &str = "/auth/register";
    pub const LOGOUT: &str = "/auth/logout";
    pub const REFRESH: &str = "/auth/refresh";
    pub const PROFILE: &str = "/auth/profile";
    pub const VERIFY_EMAIL: &str = "/auth/verify-email";
    pub const RESET_PASSWORD: &str = "/auth/reset-password";
    pub const FORGOT_PASSWORD: &str = "/auth/forgot-password";
}

pub mod users {
    pub const LIST: &str = "/users";
    pub const ROLES: &str = "/users/roles";
    pub const STATISTICS: &str = "/users/statistics";
    pub const SEARCH_ADVANCED: &str = "/users/search/advanced";
    pub const BULK_ACTIVATE: &str = "/users/bulk/activate";
    pub const BULK_DEACTIVATE: &str = "/users/bulk/deactivate";

    pub fn item(id: &str) -> String {
        format!("{LIST}/{id}")
    }

    pub fn profile(id: &str) -> String {
        format!("{LIST}/{id}/profile")
    }

    pub fn permissions(id: &str) -> String {
        format!("{LIST}/{id}/permissions")
    }

    pub fn toggle_active(id: &str) -> String {
        format!("{LIST}/{id}/toggle-active")
    }

    pub fn by_role(role: &str) -> String {
        format!("{LIST}/role/{role}")
    }

    pub fn by_email(email: &str) -> String {
        format!("{LIST}/email/{email}")
    }
}

pub mod dashboard {
    pub const STATS: &str = "/dashboard/stats";
    pub const OVERVIEW: &str = "/dashboard/overview";
    pub const ANALYTICS: &str = "/dashboard/analytics";
    pub const REPORTS: &str = "/dashboard/reports";
    pub const REALTIME: &str = "/dashboard/stats/realtime";
    pub const WIDGETS: &str = "/dashboard/stats/widgets";
    pub const ALERTS: &str = "/dashboard/stats/alerts";
    pub const ALERTS_READ_ALL: &str = "/dashboard/stats/alerts/read-all";
    pub const PERFORMANCE: &str = "/dashboard/stats/performance";

    pub fn alert_read(id: &str) -> String {
        format!("{ALERTS}/{id}/read")
    }
}

pub mod settings {
    pub const USER: &str = "/settings/user";
    pub const SYSTEM: &str = "/settings/system";
    pub const PREFERENCES: &str = "/settings/preferences";
    pub const USER_RESET: &str = "/settings/user/reset";
    pub const USER_EXPORT: &str = "/settings/user/export";
    pub const USER_IMPORT: &str = "/settings/user/import";
    pub const USER_DATA: &str = "/settings/user/data";
    pub const DELETION: &str = "/settings/user/deletion";
    pub const PRESETS: &str = "/settings/user/presets";
    pub const NOTIFICATIONS: &str = "/settings/preferences/notifications";
    pub const NOTIFICATIONS_TEST: &str = "/settings/preferences/notifications/test";
    pub const PRIVACY: &str = "/settings/preferences/privacy";

    pub fn preset(id: &str) -> String {
        format!("{PRESETS}/{id}")
    }

    pub fn apply_preset(id: &str) -> String {
        format!("{PRESETS}/{id}/apply")
    }
}

pub mod groups {
    pub const LIST: &str = "/groups";

    pub fn item(id: &str) -> String {
        format!("{LIST}/{id}")
    }

    pub fn members(id: &str) -> String {
        format!("{LIST}/{id}/members")
    }

    pub fn member(id: &str, user_id: &str) -> String {
        format!("{LIST}/{id}/members/{user_id}")
    }
}
