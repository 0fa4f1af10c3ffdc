// 法務ドキュメントハンドラー（GET /legal, PUT /legal）

use super::collection_handler::{CollectionHandler, CollectionResource};
use crate::domain::legal_doc::{default_legal_docs, legal_doc_item};
use crate::domain::AdminPolicy;
use crate::infrastructure::ItemRepository;

pub const LEGAL_RESOURCE: CollectionResource = CollectionResource {
    path: "legal",
    field: "legalDocs",
    updated_message: "Legal documents updated successfully",
    defaults: default_legal_docs,
    to_item: legal_doc_item,
};

pub type LegalHandler<R> = CollectionHandler<R>;

pub fn legal_handler<R: ItemRepository>(legal_docs: R, policy: AdminPolicy) -> LegalHandler<R> {
    CollectionHandler::new(LEGAL_RESOURCE, legal_docs, policy)
}
