// チームメンバーハンドラー

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use super::api_error::ApiError;
use super::api_request::ApiRequest;
use super::api_response::ApiResponse;
use super::catalog::{Catalog, CatalogResource};
use super::request_handler::{require_admin, route_not_found, RequestHandler};
use crate::domain::record_id::MEMBER_ID_PREFIX;
use crate::domain::team_member::{
    sort_by_display_order, TeamMember, MEMBER_IMAGE_FOLDER, MEMBER_PATCH_FIELDS,
};
use crate::domain::timestamp::iso_timestamp;
use crate::domain::AdminPolicy;
use crate::infrastructure::{ItemRepository, MediaStore};

pub const TEAM_PATH: &str = "team";

pub const MEMBER_RESOURCE: CatalogResource = CatalogResource {
    label: "Team member",
    id_prefix: MEMBER_ID_PREFIX,
    image_folder: MEMBER_IMAGE_FOLDER,
    patch_fields: MEMBER_PATCH_FIELDS,
};

pub struct TeamHandler<R, M> {
    catalog: Catalog<R, M>,
    policy: AdminPolicy,
}

impl<R: ItemRepository, M: MediaStore> TeamHandler<R, M> {
    pub fn new(members: R, media: M, cdn_domain: impl Into<String>, policy: AdminPolicy) -> Self {
        Self {
            catalog: Catalog::new(MEMBER_RESOURCE, members, media, cdn_domain),
            policy,
        }
    }

    /// 表示順に並べたメンバー一覧
    async fn list(&self) -> Result<ApiResponse, ApiError> {
        let mut members = self.catalog.items().scan().await?;
        sort_by_display_order(&mut members);

        Ok(ApiResponse::ok(json!({ "members": self.catalog.present_all(members) })).cached())
    }

    async fn create(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let body = request.json_object()?;
        let now = Utc::now();
        let member = TeamMember::create(&body, self.catalog.new_id(now), &iso_timestamp(now))?;

        let item = self.catalog.insert(&member).await?;
        Ok(ApiResponse::created(json!({ "member": self.catalog.present(item) })))
    }

    async fn update(&self, id: &str, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let body = request.json_object()?;
        let item = self.catalog.patch(id, &body).await?;

        Ok(ApiResponse::ok(json!({
            "message": "Team member updated",
            "member": self.catalog.present(item),
        })))
    }
}

#[async_trait]
impl<R: ItemRepository, M: MediaStore> RequestHandler for TeamHandler<R, M> {
    async fn route(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let rest = request.route_under(TEAM_PATH).ok_or_else(route_not_found)?;

        if let ("GET", []) = (request.method(), rest.as_slice()) {
            return self.list().await;
        }

        require_admin(&self.policy, request)?;

        match (request.method(), rest.as_slice()) {
            ("POST", []) => self.create(request).await,
            ("POST", ["upload-url"]) => self.catalog.upload_url(request).await,
            ("PUT", [id]) => self.update(id, request).await,
            ("DELETE", [id]) => {
                self.catalog.remove(id).await?;
                Ok(ApiResponse::message("Team member deleted"))
            }
            _ => Err(route_not_found()),
        }
    }
}
