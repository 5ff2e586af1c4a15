//! # Wire Models
//!
//! Typed views of the H5P activity web service payloads. Field names
//! follow the wire format; anything a site may legitimately omit is
//! defaulted, so older sites with sparser payloads still decode.

use serde::Deserialize;

/// One H5P activity record as listed by a course query
#[derive(Debug, Clone, Deserialize)]
pub struct H5pActivity {
    /// Activity instance id
    pub id: i64,

    /// Id of the course the activity belongs to
    pub course: i64,

    /// Id of the course-module shell the activity sits in
    ///
    /// This is the id used in course page URLs, distinct from the
    /// activity instance id.
    pub coursemodule: i64,

    pub name: String,

    #[serde(default)]
    pub intro: String,

    /// Bit field of player display options
    #[serde(default)]
    pub displayoptions: u32,

    /// Whether attempt tracking is switched on
    #[serde(default)]
    pub enabletracking: bool,

    /// Grading method applied to tracked attempts
    #[serde(default)]
    pub grademethod: i64,

    /// Uploaded package files, normally exactly one
    #[serde(default)]
    pub package: Vec<H5pFile>,

    /// Deployed file, present once the site has processed the package
    #[serde(default)]
    pub deployedfile: Option<H5pFile>,
}

/// A file descriptor as the site serves it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct H5pFile {
    pub filename: String,

    #[serde(default)]
    pub filepath: String,

    #[serde(default)]
    pub filesize: u64,

    /// Download URL, token-authenticated by the site
    pub fileurl: String,

    #[serde(default)]
    pub timemodified: i64,

    #[serde(default)]
    pub mimetype: Option<String>,
}

/// What the current user may do with one activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct AccessInfo {
    #[serde(default, rename = "canview")]
    pub can_view: bool,

    #[serde(default, rename = "cancreate")]
    pub can_create: bool,

    #[serde(default, rename = "cansubmit")]
    pub can_submit: bool,

    #[serde(default, rename = "canreview")]
    pub can_review: bool,
}

/// Envelope of the by-courses listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseActivitiesResponse {
    /// Activities of the queried courses, in site order
    #[serde(default)]
    pub h5pactivities: Vec<H5pActivity>,

    #[serde(default)]
    pub warnings: Vec<WsWarning>,
}

/// Envelope of the trusted-file deployment call
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrustedFileResponse {
    #[serde(default)]
    pub files: Vec<H5pFile>,

    #[serde(default)]
    pub warnings: Vec<WsWarning>,
}

/// Warning attached to an otherwise successful response
#[derive(Debug, Clone, Deserialize)]
pub struct WsWarning {
    #[serde(default)]
    pub item: Option<String>,

    #[serde(default)]
    pub itemid: Option<i64>,

    pub warningcode: String,

    pub message: String,
}
