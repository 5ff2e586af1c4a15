//! # H5P Activity
//!
//! Data access for H5P activity modules on LMS sites: typed lookups,
//! permission queries, package deployment and view logging, served
//! through the cached web service layer of `site-ws`.
//!
//! ## Features
//!
//! - Course-wide activity listing with typed id selectors
//! - Per-activity access information
//! - Deployed-file resolution through the site's trust chain
//! - View-event logging and capability detection

pub mod error;
pub mod files;
pub mod functions;
pub mod keys;
pub mod models;
pub mod provider;

pub use error::{ActivityError, ActivityResult};
pub use files::{H5pDisplayOptions, TrustedFileResolver, WsFileResolver};
pub use models::{
    AccessInfo, CourseActivitiesResponse, H5pActivity, H5pFile, TrustedFileResponse, WsWarning,
};
pub use provider::{ActivitySelector, FetchOptions, FileOptions, H5pActivityProvider};
