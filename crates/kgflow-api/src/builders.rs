//! Pure request builders, one per remote operation.
//!
//! Field policies (what is omitted, what is defaulted) live here and nowhere
//! else, so every adapter gets the same wire format.

use kgflow_core::{
    AddEpisodeParams, AddMessagesParams, EntityNodeParams, EpisodeType, GetEpisodesParams,
    GetMemoryParams, Message, Result, SearchParams, SearchType,
};
use serde::Serialize;

use crate::request::{endpoint, HttpRequest};

pub const DEFAULT_MAX_FACTS: u32 = 10;

fn non_blank(s: &str) -> Option<&str> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[derive(Serialize)]
struct AddEpisodeBody<'a> {
    name: &'a str,
    content: &'a str,
    #[serde(rename = "type")]
    episode_type: EpisodeType,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference_time: Option<&'a str>,
}

#[derive(Serialize)]
struct SearchBody<'a> {
    query: &'a str,
    search_type: SearchType,
    #[serde(skip_serializing_if = "Option::is_none")]
    center_node_uuid: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
}

#[derive(Serialize)]
struct GetMemoryBody<'a> {
    group_id: &'a str,
    max_facts: u32,
    // sent as null when absent
    center_node_uuid: Option<&'a str>,
    messages: &'a [Message],
}

/// POST /episodes/
pub fn add_episode(base_url: &str, params: &AddEpisodeParams) -> Result<HttpRequest> {
    let body = AddEpisodeBody {
        name: &params.name,
        content: &params.content,
        episode_type: params.episode_type,
        description: &params.description,
        reference_time: non_blank(&params.reference_time),
    };
    Ok(HttpRequest::post(
        endpoint(base_url, &["episodes", ""])?,
        Some(serde_json::to_value(body)?),
    ))
}

/// POST /search/
pub fn search_episodes(base_url: &str, params: &SearchParams) -> Result<HttpRequest> {
    let body = SearchBody {
        query: &params.query,
        search_type: params.search_type,
        center_node_uuid: non_blank(&params.center_node_uuid),
        limit: match params.search_type {
            SearchType::Node => Some(params.limit),
            SearchType::Edge => None,
        },
    };
    Ok(HttpRequest::post(
        endpoint(base_url, &["search", ""])?,
        Some(serde_json::to_value(body)?),
    ))
}

/// POST /messages
pub fn add_messages(base_url: &str, params: &AddMessagesParams) -> Result<HttpRequest> {
    Ok(HttpRequest::post(
        endpoint(base_url, &["messages"])?,
        Some(serde_json::to_value(params)?),
    ))
}

/// POST /get-memory
pub fn get_memory(base_url: &str, params: &GetMemoryParams) -> Result<HttpRequest> {
    let body = GetMemoryBody {
        group_id: &params.group_id,
        max_facts: params.max_facts.unwrap_or(DEFAULT_MAX_FACTS),
        center_node_uuid: params.center_node_uuid.as_deref().and_then(non_blank),
        messages: &params.messages,
    };
    Ok(HttpRequest::post(
        endpoint(base_url, &["get-memory"])?,
        Some(serde_json::to_value(body)?),
    ))
}

/// GET /episodes/{group_id}?last_n={n}
pub fn get_episodes(base_url: &str, params: &GetEpisodesParams) -> Result<HttpRequest> {
    let mut url = endpoint(base_url, &["episodes", params.group_id.as_str()])?;
    url.query_pairs_mut()
        .append_pair("last_n", &params.last_n.to_string());
    Ok(HttpRequest::get(url))
}

/// POST /entity-node
pub fn add_entity_node(base_url: &str, params: &EntityNodeParams) -> Result<HttpRequest> {
    Ok(HttpRequest::post(
        endpoint(base_url, &["entity-node"])?,
        Some(serde_json::to_value(params)?),
    ))
}

/// GET /entity-edge/{uuid}
pub fn get_entity_edge(base_url: &str, uuid: &str) -> Result<HttpRequest> {
    Ok(HttpRequest::get(endpoint(base_url, &["entity-edge", uuid])?))
}

/// DELETE /entity-edge/{uuid}
pub fn delete_entity_edge(base_url: &str, uuid: &str) -> Result<HttpRequest> {
    Ok(HttpRequest::delete(endpoint(base_url, &["entity-edge", uuid])?))
}

/// DELETE /group/{group_id}
pub fn delete_group(base_url: &str, group_id: &str) -> Result<HttpRequest> {
    Ok(HttpRequest::delete(endpoint(base_url, &["group", group_id])?))
}

/// DELETE /episode/{uuid}
pub fn delete_episode(base_url: &str, uuid: &str) -> Result<HttpRequest> {
    Ok(HttpRequest::delete(endpoint(base_url, &["episode", uuid])?))
}

/// POST /clear, no body.
pub fn clear_data(base_url: &str) -> Result<HttpRequest> {
    Ok(HttpRequest::post(endpoint(base_url, &["clear"])?, None))
}

/// GET /healthcheck
pub fn healthcheck(base_url: &str) -> Result<HttpRequest> {
    Ok(HttpRequest::get(endpoint(base_url, &["healthcheck"])?))
}
