// 配信チャンネル一覧ハンドラー（GET /channels, PUT /channels）

use super::collection_handler::{CollectionHandler, CollectionResource};
use crate::domain::channel::{channel_item, default_channels};
use crate::domain::AdminPolicy;
use crate::infrastructure::ItemRepository;

pub const CHANNEL_RESOURCE: CollectionResource = CollectionResource {
    path: "channels",
    field: "channels",
    updated_message: "Channels updated successfully",
    defaults: default_channels,
    to_item: channel_item,
};

pub type ChannelHandler<R> = CollectionHandler<R>;

pub fn channel_handler<R: ItemRepository>(channels: R, policy: AdminPolicy) -> ChannelHandler<R> {
    CollectionHandler::new(CHANNEL_RESOURCE, channels, policy)
}
