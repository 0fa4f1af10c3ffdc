// ドメイン層モジュール
pub mod admin_claims;
pub mod advertisement;
pub mod calendar_event;
pub mod channel;
pub mod crosspost;
pub mod json_value;
pub mod legal_doc;
pub mod media;
pub mod newsfeed_post;
pub mod order;
pub mod product;
pub mod record;
pub mod record_id;
pub mod sponsor;
pub mod team_member;
pub mod timestamp;

// 再エクスポート
pub use admin_claims::{AdminPolicy, Claims};
pub use crosspost::{CrosspostChannel, PostCounter};
pub use json_value::JsonObject;
pub use media::{UploadRequest, UploadRequestError};
pub use order::{Order, OrderError, OrderLine};
pub use record::{FieldKind, PatchField, RecordError};
pub use sponsor::{BookingQuote, SponsorBooking, SponsorError, TrackedInteraction};
