//! Entrepreneur profile and profile-update requests.

use std::fmt::Write as _;

use remote_resource::{Dependencies, MutationRequest, Resource, ResourceController, Role};
use serde_json::Value;
use tracing::info;

use super::{ids, require_role};
use crate::api::{self, ack_message, EntrepreneurProfile, ProfileChanges};
use crate::errors::{ConsoleError, Result};
use crate::render::section;

fn mount(controller: &ResourceController, user_id: &str) -> Resource<EntrepreneurProfile> {
    let profile = controller.resource::<EntrepreneurProfile>(ids::PROFILE);
    profile.declare(
        api::entrepreneur_profile(user_id),
        Dependencies::new().with(user_id),
    );
    profile
}

fn profile_body(profile: &EntrepreneurProfile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  Name:      {}", profile.name);
    let _ = writeln!(out, "  Email:     {}", profile.email);
    let _ = writeln!(out, "  Contact:   {}", profile.contact_info);
    if let Some(image) = profile.image.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(out, "  Image:     {image}");
    }
    if let Some(documents) = profile.documents.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(out, "  Documents: {documents}");
    }
    if let Some(pending) = profile.pending_update.as_ref().filter(|c| !c.is_empty()) {
        out.push_str("  Pending update awaiting staff approval:\n");
        for (field, value) in pending.describe() {
            let _ = writeln!(out, "    {field}: {value}");
        }
    }
    out
}

pub async fn show(controller: &ResourceController) -> Result<String> {
    let user = require_role(controller, Role::Entrepreneur)?;
    let profile = mount(controller, &user.id);
    Ok(section(
        "My Profile",
        &profile.settled().await,
        |_| false,
        "",
        profile_body,
    ))
}

/// Changes are not applied directly; staff review them first.
pub async fn request_update(
    controller: &ResourceController,
    changes: ProfileChanges,
) -> Result<String> {
    let user = require_role(controller, Role::Entrepreneur)?;
    if changes.is_empty() {
        return Err(ConsoleError::validation("Nothing to update"));
    }

    let profile = mount(controller, &user.id);
    let request = MutationRequest::put(api::entrepreneur_profile(&user.id)).json(&changes)?;
    let ack: Value = controller.mutate(request, &[ids::PROFILE.into()]).await?;
    info!(user_id = %user.id, "profile update requested");

    Ok(format!(
        "{}\nYour profile update request has been submitted for approval.\n{}",
        ack_message(&ack, "Update request submitted"),
        section(
            "My Profile",
            &profile.settled().await,
            |_| false,
            "",
            profile_body,
        )
    ))
}
