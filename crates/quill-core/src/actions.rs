//! Action catalog
//!
//! Producers should use these exact labels so events read the same regardless
//! of backend. Storage treats `action` as a free-form string.

// Authentication
pub const USER_LOGIN: &str = "User logged in";
pub const USER_LOGOUT: &str = "User logged out";
pub const USER_PASSWORD_RESET: &str = "User password reset";

// Index lifecycle
pub const INDEX_CREATE: &str = "Index created";
pub const INDEX_DELETE: &str = "Index deleted";
pub const INDEX_UPDATE: &str = "Index updated";

// Organization
pub const ORG_SETTINGS_UPDATE: &str = "Organization settings updated";

// Dashboards
pub const DASHBOARD_CREATE: &str = "Dashboard created";
pub const DASHBOARD_UPDATE: &str = "Dashboard updated";
pub const DASHBOARD_DELETE: &str = "Dashboard deleted";
pub const DASHBOARD_FAVORITE: &str = "Dashboard added to favorites";
pub const DASHBOARD_UNFAVORITE: &str = "Dashboard removed from favorites";

// Saved queries
pub const SAVED_QUERY_CREATE: &str = "Saved query created";
pub const SAVED_QUERY_UPDATE: &str = "Saved query updated";
pub const SAVED_QUERY_DELETE: &str = "Saved query deleted";

// Folders
pub const FOLDER_CREATE: &str = "Folder created";
pub const FOLDER_UPDATE: &str = "Folder updated";
pub const FOLDER_DELETE: &str = "Folder deleted";

// Alerts and contact points
pub const ALERT_CREATE: &str = "Alert created";
pub const ALERT_UPDATE: &str = "Alert updated";
pub const ALERT_DELETE: &str = "Alert deleted";
pub const CONTACT_POINT_CREATE: &str = "Contact point created";
pub const CONTACT_POINT_UPDATE: &str = "Contact point updated";
pub const CONTACT_POINT_DELETE: &str = "Contact point deleted";

// Lookup files
pub const LOOKUP_FILE_CREATE: &str = "Lookup file created";
pub const LOOKUP_FILE_DELETE: &str = "Lookup file deleted";

/// Every catalog label, grouped by domain
pub const ALL: &[&str] = &[
    USER_LOGIN,
    USER_LOGOUT,
    USER_PASSWORD_RESET,
    INDEX_CREATE,
    INDEX_DELETE,
    INDEX_UPDATE,
    ORG_SETTINGS_UPDATE,
    DASHBOARD_CREATE,
    DASHBOARD_UPDATE,
    DASHBOARD_DELETE,
    DASHBOARD_FAVORITE,
    DASHBOARD_UNFAVORITE,
    SAVED_QUERY_CREATE,
    SAVED_QUERY_UPDATE,
    SAVED_QUERY_DELETE,
    FOLDER_CREATE,
    FOLDER_UPDATE,
    FOLDER_DELETE,
    ALERT_CREATE,
    ALERT_UPDATE,
    ALERT_DELETE,
    CONTACT_POINT_CREATE,
    CONTACT_POINT_UPDATE,
    CONTACT_POINT_DELETE,
    LOOKUP_FILE_CREATE,
    LOOKUP_FILE_DELETE,
];

/// Whether `label` is one of the catalog labels
pub fn is_known(label: &str) -> bool {
    ALL.contains(&label)
}
