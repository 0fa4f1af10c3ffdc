// アプリケーション層モジュール
pub mod advertisement_handler;
pub mod api_error;
pub mod api_request;
pub mod api_response;
pub mod catalog;
pub mod channel_handler;
pub mod collection_handler;
pub mod crosspost_dispatcher;
pub mod event_handler;
pub mod legal_handler;
pub mod media_upload;
pub mod newsfeed_handler;
pub mod order_handler;
pub mod product_handler;
pub mod request_handler;
pub mod sponsor_handler;
pub mod team_handler;

// 再エクスポート
pub use advertisement_handler::AdvertisementHandler;
pub use api_error::ApiError;
pub use api_request::ApiRequest;
pub use api_response::ApiResponse;
pub use channel_handler::{channel_handler, ChannelHandler};
pub use collection_handler::{CollectionHandler, CollectionResource};
pub use crosspost_dispatcher::{CrosspostDispatcher, DispatchResult, DispatchStatus, DispatchSummary};
pub use event_handler::EventHandler;
pub use legal_handler::{legal_handler, LegalHandler};
pub use newsfeed_handler::NewsfeedHandler;
pub use order_handler::OrderHandler;
pub use product_handler::ProductHandler;
pub use request_handler::RequestHandler;
pub use sponsor_handler::SponsorHandler;
pub use team_handler::TeamHandler;
