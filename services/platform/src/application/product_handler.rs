// 商品（ショップ）ハンドラー
//
// GET /products, GET /products/{id} は公開。
// 作成・更新・削除・画像アップロードURL発行は管理者のみ。

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use super::api_error::ApiError;
use super::api_request::ApiRequest;
use super::api_response::ApiResponse;
use super::catalog::{Catalog, CatalogResource};
use super::request_handler::{require_admin, route_not_found, RequestHandler};
use crate::domain::product::{
    Product, CATEGORY_INDEX, PRODUCT_IMAGE_FOLDER, PRODUCT_PATCH_FIELDS,
};
use crate::domain::record_id::PRODUCT_ID_PREFIX;
use crate::domain::timestamp::iso_timestamp;
use crate::domain::AdminPolicy;
use crate::infrastructure::{ItemRepository, MediaStore};

/// ルートのリソース名
pub const PRODUCTS_PATH: &str = "products";

pub const PRODUCT_RESOURCE: CatalogResource = CatalogResource {
    label: "Product",
    id_prefix: PRODUCT_ID_PREFIX,
    image_folder: PRODUCT_IMAGE_FOLDER,
    patch_fields: PRODUCT_PATCH_FIELDS,
};

pub struct ProductHandler<R, M> {
    catalog: Catalog<R, M>,
    policy: AdminPolicy,
}

impl<R: ItemRepository, M: MediaStore> ProductHandler<R, M> {
    pub fn new(products: R, media: M, cdn_domain: impl Into<String>, policy: AdminPolicy) -> Self {
        Self {
            catalog: Catalog::new(PRODUCT_RESOURCE, products, media, cdn_domain),
            policy,
        }
    }

    /// 商品一覧（`?category=`指定時はカテゴリGSIで検索）
    async fn list(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let items = match request.query("category") {
            Some(category) => {
                self.catalog
                    .items()
                    .query_index(CATEGORY_INDEX, "category", category)
                    .await?
            }
            None => self.catalog.items().scan().await?,
        };

        Ok(ApiResponse::ok(json!({ "products": self.catalog.present_all(items) })).cached())
    }

    async fn get(&self, id: &str) -> Result<ApiResponse, ApiError> {
        let item = self.catalog.fetch(id).await?;
        Ok(ApiResponse::ok(json!({ "product": self.catalog.present(item) })).cached())
    }

    async fn create(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let body = request.json_object()?;
        let now = Utc::now();
        let product = Product::create(&body, self.catalog.new_id(now), &iso_timestamp(now))?;

        let item = self.catalog.insert(&product).await?;
        Ok(ApiResponse::created(json!({ "product": self.catalog.present(item) })))
    }

    async fn update(&self, id: &str, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let body = request.json_object()?;
        let item = self.catalog.patch(id, &body).await?;

        Ok(ApiResponse::ok(json!({
            "message": "Product updated",
            "product": self.catalog.present(item),
        })))
    }

    async fn delete(&self, id: &str) -> Result<ApiResponse, ApiError> {
        self.catalog.remove(id).await?;
        Ok(ApiResponse::message("Product deleted"))
    }
}

#[async_trait]
impl<R: ItemRepository, M: MediaStore> RequestHandler for ProductHandler<R, M> {
    async fn route(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let rest = request.route_under(PRODUCTS_PATH).ok_or_else(route_not_found)?;

        match (request.method(), rest.as_slice()) {
            ("GET", []) => return self.list(request).await,
            ("GET", [id]) => return self.get(id).await,
            _ => {}
        }

        require_admin(&self.policy, request)?;

        match (request.method(), rest.as_slice()) {
            ("POST", []) => self.create(request).await,
            ("POST", ["upload-url"]) => self.catalog.upload_url(request).await,
            ("PUT", [id]) => self.update(id, request).await,
            ("DELETE", [id]) => self.delete(id).await,
            _ => Err(route_not_found()),
        }
    }
}
