//! # Activity Provider
//!
//! The data-access surface for H5P activities. Every lookup goes
//! through one site session's cached read path; the provider itself
//! holds nothing but its injected collaborators, so a single instance
//! can be shared freely across tasks.

use std::sync::Arc;

use tracing::debug;

use site_ws::{
    CacheKey, EventLogger, LoggedEvent, MessageCatalog, ReadOptions, SessionRegistry,
    UpdateFrequency, WsParams,
};

use crate::error::{ActivityError, ActivityResult};
use crate::files::{H5pDisplayOptions, TrustedFileResolver};
use crate::functions::{
    COMPONENT, MSG_ACTIVITY_NOT_FOUND, WS_GET_ACCESS_INFORMATION, WS_GET_ACTIVITIES_BY_COURSES,
    WS_LOG_VIEW, default_messages,
};
use crate::keys;
use crate::models::{AccessInfo, CourseActivitiesResponse, H5pActivity, H5pFile};

/// Which activity of a course a lookup targets.
///
/// Activities live in two id spaces: the instance id of the activity
/// itself and the id of the course-module shell around it (the one
/// course page URLs carry). The selector makes the caller say which
/// space it means; ids are compared as integers, never as strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivitySelector {
    /// Match on the activity instance id
    ById(i64),
    /// Match on the course-module id
    ByModuleId(i64),
}

impl ActivitySelector {
    fn matches(&self, activity: &H5pActivity) -> bool {
        match *self {
            ActivitySelector::ById(id) => activity.id == id,
            ActivitySelector::ByModuleId(id) => activity.coursemodule == id,
        }
    }
}

/// Per-call options for activity lookups
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Accept cached data regardless of age. A cold cache still goes
    /// to the network.
    pub cache_only: bool,

    /// Site the lookup targets, `None` meaning the current one
    pub site_id: Option<String>,
}

/// Per-call options for deployed-file resolution
#[derive(Debug, Clone, Default)]
pub struct FileOptions {
    /// Display tuning forwarded to the deployment endpoint
    pub display: Option<H5pDisplayOptions>,

    /// Bypass the cached deployment response
    pub ignore_cache: bool,

    /// Site the resolution targets, `None` meaning the current one
    pub site_id: Option<String>,
}

fn read_options(key: CacheKey, frequency: UpdateFrequency, options: &FetchOptions) -> ReadOptions {
    ReadOptions {
        omit_expires: options.cache_only,
        ..ReadOptions::cached(key, frequency)
    }
}

/// Data access for H5P activities across all registered sites.
///
/// Collaborators are injected at construction; the provider never
/// reaches for global state.
pub struct H5pActivityProvider {
    sessions: Arc<SessionRegistry>,
    files: Arc<dyn TrustedFileResolver>,
    events: EventLogger,
    messages: MessageCatalog,
}

impl H5pActivityProvider {
    pub fn new(sessions: Arc<SessionRegistry>, files: Arc<dyn TrustedFileResolver>) -> Self {
        let events = EventLogger::new(Arc::clone(&sessions));
        Self {
            sessions,
            files,
            events,
            messages: default_messages(),
        }
    }

    /// Replace the user-facing strings, e.g. with translated ones.
    pub fn with_messages(mut self, messages: MessageCatalog) -> Self {
        self.messages = messages;
        self
    }

    /// Access information for one activity: what the current user may
    /// view, create, submit or review.
    ///
    /// Cached per activity with a short lifetime, since permissions
    /// change more often than content. The activity id is forwarded
    /// as-is; an unknown id surfaces as the site's own fault response.
    pub async fn access_info(
        &self,
        activity_id: i64,
        options: &FetchOptions,
    ) -> ActivityResult<AccessInfo> {
        let session = self.sessions.resolve(options.site_id.as_deref())?;

        let mut params = WsParams::new();
        params.add("h5pactivityid", activity_id);

        let read = read_options(
            keys::access_info_key(activity_id),
            UpdateFrequency::Usually,
            options,
        );
        let info = session
            .read_as(WS_GET_ACCESS_INFORMATION, params, read)
            .await?;
        Ok(info)
    }

    /// All H5P activities of one course, in the site's order.
    ///
    /// Cached per course with a long lifetime; course content rarely
    /// changes underneath a running app.
    pub async fn activities_in_course(
        &self,
        course_id: i64,
        options: &FetchOptions,
    ) -> ActivityResult<Vec<H5pActivity>> {
        let session = self.sessions.resolve(options.site_id.as_deref())?;

        let mut params = WsParams::new();
        params.add_array("courseids", [course_id]);

        let read = read_options(
            keys::course_activities_key(course_id),
            UpdateFrequency::Rarely,
            options,
        );
        let response: CourseActivitiesResponse = session
            .read_as(WS_GET_ACTIVITIES_BY_COURSES, params, read)
            .await?;
        Ok(response.h5pactivities)
    }

    /// First activity of the course the selector matches.
    ///
    /// The course listing is scanned in the site's order. A course
    /// without activities and a course where nothing matches are
    /// indistinguishable to callers; both report the localized
    /// not-found message.
    pub async fn find(
        &self,
        course_id: i64,
        selector: ActivitySelector,
        options: &FetchOptions,
    ) -> ActivityResult<H5pActivity> {
        let activities = self.activities_in_course(course_id, options).await?;
        activities
            .into_iter()
            .find(|activity| selector.matches(activity))
            .ok_or_else(|| {
                debug!(course = course_id, selector = ?selector, "no activity matched");
                ActivityError::NotFound(self.messages.text(MSG_ACTIVITY_NOT_FOUND))
            })
    }

    /// Activity with the given instance id.
    pub async fn by_id(
        &self,
        course_id: i64,
        activity_id: i64,
        options: &FetchOptions,
    ) -> ActivityResult<H5pActivity> {
        self.find(course_id, ActivitySelector::ById(activity_id), options)
            .await
    }

    /// Activity sitting in the given course module.
    pub async fn by_module_id(
        &self,
        course_id: i64,
        module_id: i64,
        options: &FetchOptions,
    ) -> ActivityResult<H5pActivity> {
        self.find(course_id, ActivitySelector::ByModuleId(module_id), options)
            .await
    }

    /// Servable file for the activity's content.
    ///
    /// A descriptor already present on the record is returned as-is
    /// without consulting the resolver. Otherwise the first package
    /// file is deployed through the trusted-file resolver. A record
    /// with neither is broken and reported as
    /// [`ActivityError::MissingPackage`].
    pub async fn deployed_file(
        &self,
        activity: &H5pActivity,
        options: &FileOptions,
    ) -> ActivityResult<H5pFile> {
        if let Some(file) = &activity.deployedfile {
            return Ok(file.clone());
        }

        let package = activity
            .package
            .first()
            .ok_or(ActivityError::MissingPackage)?;

        debug!(
            activity = activity.id,
            url = %package.fileurl,
            "resolving package through the site"
        );
        self.files
            .trusted_file(
                &package.fileurl,
                options.display.as_ref(),
                options.ignore_cache,
                options.site_id.as_deref(),
            )
            .await
    }

    /// Drop the cached access information of one activity.
    pub async fn invalidate_access_info(
        &self,
        activity_id: i64,
        site_id: Option<&str>,
    ) -> ActivityResult<()> {
        let session = self.sessions.resolve(site_id)?;
        session.invalidate(&keys::access_info_key(activity_id)).await;
        Ok(())
    }

    /// Drop the cached activity listing of one course.
    pub async fn invalidate_activities(
        &self,
        course_id: i64,
        site_id: Option<&str>,
    ) -> ActivityResult<()> {
        let session = self.sessions.resolve(site_id)?;
        session
            .invalidate(&keys::course_activities_key(course_id))
            .await;
        Ok(())
    }

    /// Report a view of the activity to the site log.
    ///
    /// Success is whatever the site reports; the response payload is
    /// not interpreted.
    pub async fn record_view(
        &self,
        activity_id: i64,
        name: Option<&str>,
        site_id: Option<&str>,
    ) -> ActivityResult<()> {
        let mut params = WsParams::new();
        params.add("h5pactivityid", activity_id);

        let event = LoggedEvent {
            function: WS_LOG_VIEW.to_string(),
            params,
            component: COMPONENT.to_string(),
            object_id: activity_id,
            name: name.map(str::to_owned),
        };
        self.events.log(event, site_id).await?;
        Ok(())
    }

    /// Whether the site exposes the H5P activity web services at all.
    ///
    /// Answered from the capability list of the session handshake, so
    /// this never costs a network round trip.
    pub async fn is_available(&self, site_id: Option<&str>) -> ActivityResult<bool> {
        let session = self.sessions.resolve(site_id)?;
        Ok(session.supports(WS_GET_ACTIVITIES_BY_COURSES))
    }
}
