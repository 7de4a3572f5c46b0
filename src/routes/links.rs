use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::types::Json as SqlJson;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{is_unique_violation, AppError, AppJson};
use crate::models::link::{MAX_DESCRIPTION_LEN, MAX_TAG_LEN, MAX_TITLE_LEN};
use crate::models::{normalize_tags, Link, LinkView};
use crate::query::{build_list_query, LinkFilter};
use crate::AppState;

#[derive(Deserialize)]
pub struct ListParams {
    tag: Option<String>,
    search: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateLinkBody {
    url: Option<String>,
    title: Option<String>,
    description: Option<String>,
    tags: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct UpdateLinkBody {
    url: Option<String>,
    title: Option<String>,
    description: Option<String>,
    tags: Option<Vec<String>>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links).post(create_link))
        .route("/links/tags", get(list_tags))
        .route("/links/{id}", patch(update_link).delete(delete_link))
}

fn validate_url(raw: &str) -> Result<(), AppError> {
    let ok = url::Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false);
    if ok {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Please provide a valid URL".to_string(),
        ))
    }
}

fn validate_title(title: &str) -> Result<(), AppError> {
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::Validation(
            "Title must be under 200 characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), AppError> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(AppError::Validation(
            "Description must be under 500 characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_tags(tags: &[String]) -> Result<(), AppError> {
    if tags.iter().any(|tag| tag.chars().count() > MAX_TAG_LEN) {
        return Err(AppError::Validation(
            "Tags must be under 50 characters".to_string(),
        ));
    }
    Ok(())
}

async fn list_links(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = LinkFilter {
        tag: params.tag,
        search: params.search,
    };
    let query = build_list_query(&user.id, &filter);

    let mut fetch = sqlx::query_as::<_, Link>(&query.sql);
    for bind in &query.binds {
        fetch = fetch.bind(bind.as_str());
    }
    let links = fetch.fetch_all(&state.db).await?;

    let links: Vec<LinkView> = links.into_iter().map(LinkView::from).collect();

    Ok(Json(json!({ "success": true, "links": links })))
}

async fn list_tags(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let tags: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT DISTINCT json_each.value
        FROM links, json_each(links.tags)
        WHERE links.user_id = ?
        ORDER BY json_each.value ASC
        "#,
    )
    .bind(&user.id)
    .fetch_all(&state.db)
    .await?;

    let tags: Vec<String> = tags.into_iter().map(|(tag,)| tag).collect();

    Ok(Json(json!({ "success": true, "tags": tags })))
}

async fn create_link(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(body): AppJson<CreateLinkBody>,
) -> Result<impl IntoResponse, AppError> {
    let url = body.url.as_deref().unwrap_or("").trim().to_string();
    let title = body.title.as_deref().unwrap_or("").trim().to_string();

    if url.is_empty() || title.is_empty() {
        return Err(AppError::Validation(
            "URL and title are required".to_string(),
        ));
    }
    validate_url(&url)?;
    validate_title(&title)?;

    let description = body.description.as_deref().unwrap_or("").trim().to_string();
    validate_description(&description)?;

    let tags = normalize_tags(body.tags.unwrap_or_default());
    validate_tags(&tags)?;

    let now = Utc::now().to_rfc3339();
    let id = Uuid::new_v4().to_string();

    let result = sqlx::query(
        r#"
        INSERT INTO links (id, user_id, url, title, description, tags, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&user.id)
    .bind(&url)
    .bind(&title)
    .bind(&description)
    .bind(SqlJson(&tags))
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await;

    if let Err(e) = result {
        if is_unique_violation(&e) {
            return Err(AppError::Conflict(
                "This URL already exists in your bookmarks".to_string(),
            ));
        }
        return Err(e.into());
    }

    let link = LinkView {
        id,
        url,
        title,
        description,
        tags,
        created_at: now,
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Link created successfully",
            "link": link,
        })),
    ))
}

async fn update_link(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    AppJson(body): AppJson<UpdateLinkBody>,
) -> Result<impl IntoResponse, AppError> {
    // Lookup is scoped by id AND owner: a link belonging to someone else is
    // indistinguishable from one that does not exist.
    let link: Option<Link> = sqlx::query_as("SELECT * FROM links WHERE id = ? AND user_id = ?")
        .bind(&id)
        .bind(&user.id)
        .fetch_optional(&state.db)
        .await?;

    let Some(mut link) = link else {
        return Err(AppError::NotFound);
    };

    // Empty url/title values are ignored rather than applied or rejected, so a
    // client cannot clear either field through PATCH. Matches the public API.
    if let Some(url) = body.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        validate_url(url)?;
        link.url = url.to_string();
    }
    if let Some(title) = body
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        validate_title(title)?;
        link.title = title.to_string();
    }
    if let Some(description) = body.description.as_deref() {
        let description = description.trim().to_string();
        validate_description(&description)?;
        link.description = description;
    }
    if let Some(tags) = body.tags {
        let tags = normalize_tags(tags);
        validate_tags(&tags)?;
        link.tags = SqlJson(tags);
    }

    link.updated_at = Utc::now().to_rfc3339();

    let result = sqlx::query(
        r#"
        UPDATE links
        SET url = ?, title = ?, description = ?, tags = ?, updated_at = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(&link.url)
    .bind(&link.title)
    .bind(&link.description)
    .bind(SqlJson(&link.tags.0))
    .bind(&link.updated_at)
    .bind(&id)
    .bind(&user.id)
    .execute(&state.db)
    .await;

    if let Err(e) = result {
        if is_unique_violation(&e) {
            return Err(AppError::Conflict(
                "This URL already exists in your bookmarks".to_string(),
            ));
        }
        return Err(e.into());
    }

    Ok(Json(json!({
        "success": true,
        "message": "Link updated successfully",
        "link": LinkView::from(link),
    })))
}

async fn delete_link(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM links WHERE id = ? AND user_id = ?")
        .bind(&id)
        .bind(&user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(Json(json!({
        "success": true,
        "message": "Link deleted successfully",
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_must_be_absolute_http_or_https() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://example.com/path?q=1").is_ok());
        assert!(validate_url("example.com").is_err());
        assert!(validate_url("/relative/path").is_err());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("not a url").is_err());
    }

    #[test]
    fn title_length_limit() {
        assert!(validate_title(&"a".repeat(200)).is_ok());
        assert!(validate_title(&"a".repeat(201)).is_err());
    }

    #[test]
    fn description_length_limit() {
        assert!(validate_description(&"a".repeat(500)).is_ok());
        assert!(validate_description(&"a".repeat(501)).is_err());
    }

    #[test]
    fn tag_length_limit() {
        assert!(validate_tags(&["a".repeat(50)]).is_ok());
        assert!(validate_tags(&["ok".to_string(), "a".repeat(51)]).is_err());
    }
}
