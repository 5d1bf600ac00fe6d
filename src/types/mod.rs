//! Public types for the godpanel API.

mod dashboard;
mod group;
mod request;
mod response;
mod settings;
mod user;

pub use dashboard::{
    Activity, Alert, AlertLevel, AnalyticsQuery, DashboardOverview, DashboardSnapshot,
    DashboardStats, GroupBy, PerformanceMetrics, QuickStat, RealtimeMetrics, ReportQuery, Trend,
    Widget, WidgetLayout, WidgetPosition,
};
pub use group::{BulkUpdate, Group, GroupUpdate, NewGroup, Page};
pub use request::{Method, NO_CACHE_PARAM, Params, RequestDescriptor, RequestKey};
pub use response::ApiResponse;
pub use settings::{
    DeletionRequest, DeletionStatus, NavColor, NotificationChannel, NotificationChannels,
    Preferences, PresetPreview, PrivacySettings, ProfileVisibility, RateLimits, Settings,
    SystemSettings, ThemeDirection, ThemeLayout, ThemeMode, ThemePreset,
};
pub use user::{
    AuthSession, LoginForm, NewUser, RegisterForm, Role, TokenRefresh, User, UserFilters,
    UserStatistics, UserUpdate,
};
