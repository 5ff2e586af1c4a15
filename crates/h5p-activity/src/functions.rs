//! # Well-Known Names
//!
//! Web service functions, component tag and message keys of the H5P
//! activity module.

use site_ws::MessageCatalog;

/// Lists the H5P activities of one or more courses.
pub const WS_GET_ACTIVITIES_BY_COURSES: &str = "mod_h5pactivity_get_h5pactivities_by_courses";

/// Reports what the current user may do with one activity.
pub const WS_GET_ACCESS_INFORMATION: &str = "mod_h5pactivity_get_h5pactivity_access_information";

/// Stores a "course module viewed" event in the site log.
pub const WS_LOG_VIEW: &str = "mod_h5pactivity_view_h5pactivity";

/// Resolves a package URL into a deployed, trusted H5P file.
pub const WS_GET_TRUSTED_FILE: &str = "core_h5p_get_trusted_h5p_file";

/// Component tag of the activity module, as reported in log events.
pub const COMPONENT: &str = "mod_h5pactivity";

/// Message key: an activity lookup matched nothing.
pub const MSG_ACTIVITY_NOT_FOUND: &str = "mod_h5pactivity:activitynotfound";

/// Message key: the site returned no trusted file for a package.
pub const MSG_FILE_NOT_FOUND: &str = "mod_h5pactivity:filenotfound";

/// Default user-facing strings of this component.
///
/// The embedding application may override any of them through
/// [`MessageCatalog::set`] with translated text.
pub fn default_messages() -> MessageCatalog {
    MessageCatalog::with_defaults(&[
        (MSG_ACTIVITY_NOT_FOUND, "Activity not found."),
        (MSG_FILE_NOT_FOUND, "The H5P package could not be retrieved."),
    ])
}
