//! Endpoint paths of the subtitle service, relative to the base URL.

use subtitler_core::types::DbId;

pub const PROJECTS: &str = "/api/subtitle/projects/";
pub const STYLES: &str = "/api/subtitle/styles/";
pub const EXPORTS: &str = "/api/subtitle/exports/";

pub fn project(id: DbId) -> String {
    format!("{PROJECTS}{id}/")
}

pub fn project_status(id: DbId) -> String {
    format!("{PROJECTS}{id}/status/")
}

pub fn project_subtitles(id: DbId) -> String {
    format!("{PROJECTS}{id}/subtitles/")
}

pub fn project_export(id: DbId) -> String {
    format!("{PROJECTS}{id}/export/")
}

pub fn project_embed(id: DbId) -> String {
    format!("{PROJECTS}{id}/embed_subtitles/")
}

pub fn entry(id: DbId) -> String {
    format!("/api/subtitle/entries/{id}/")
}

pub fn entry_split(id: DbId) -> String {
    format!("/api/subtitle/entries/{id}/split/")
}

pub fn entry_merge(id: DbId) -> String {
    format!("/api/subtitle/entries/{id}/merge/")
}

/// Export listing, optionally filtered to one project.
pub fn exports(project: Option<DbId>) -> String {
    match project {
        Some(id) => format!("{EXPORTS}?project={id}"),
        None => EXPORTS.to_string(),
    }
}
