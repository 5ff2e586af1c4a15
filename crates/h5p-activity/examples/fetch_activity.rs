//! Fetch the H5P activities of one course from a live site.
//!
//! ```sh
//! SITE_URL=https://campus.example.edu SITE_TOKEN=... COURSE_ID=10 \
//!     cargo run -p h5p-activity --example fetch_activity
//! ```

use std::sync::Arc;

use h5p_activity::{FetchOptions, FileOptions, H5pActivityProvider, WsFileResolver};
use site_ws::{SessionRegistry, SiteConfig, SiteSession};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let base_url = std::env::var("SITE_URL")?;
    let token = std::env::var("SITE_TOKEN")?;
    let course_id: i64 = std::env::var("COURSE_ID")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(1);

    let registry = Arc::new(SessionRegistry::new());
    let session = SiteSession::connect(SiteConfig::new(base_url, token)).await?;
    println!(
        "connected to {} as user {}",
        session.info().sitename,
        session.info().userid
    );
    registry.register(session);

    let resolver = Arc::new(WsFileResolver::new(Arc::clone(&registry)));
    let provider = H5pActivityProvider::new(registry, resolver);

    if !provider.is_available(None).await? {
        println!("this site does not expose the H5P activity web services");
        return Ok(());
    }

    let activities = provider
        .activities_in_course(course_id, &FetchOptions::default())
        .await?;
    println!("course {course_id} has {} H5P activities", activities.len());

    for activity in &activities {
        println!(
            "- [{}] {} (module {})",
            activity.id, activity.name, activity.coursemodule
        );
        match provider.deployed_file(activity, &FileOptions::default()).await {
            Ok(file) => println!("    deployed: {} ({} bytes)", file.filename, file.filesize),
            Err(err) => println!("    no deployed file: {err}"),
        }
    }

    Ok(())
}
