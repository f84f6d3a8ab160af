//! # 内容模块
//!
//! 平台暴露三种原始内容形态（页面DOM节点、组件属性、CMS集合条目），
//! 这里负责把它们归一成统一的可翻译记录，并在翻译完成后按各自的
//! 写回形态重组更新负载。
//!
//! - `node` - 按内容类型打标签的原始条目变体
//! - `schema` - 按集合类型配置的字段模式（数据，不是控制流）
//! - `normalizer` - 原始条目 → 可翻译记录
//! - `writer` - 可翻译记录 + 译文 → 平台更新调用

pub mod node;
pub mod normalizer;
pub mod schema;
pub mod writer;

pub use node::{CollectionItem, ComponentProperty, HasTranslatableFields, PageNode, TextEnvelope};
pub use normalizer::{normalize, RecordKind, TranslatableRecord};
pub use schema::{FieldSchema, SchemaTable};
pub use writer::{ContentWriter, NodeWriteError, PlatformWriter, WriteReceipt, WriteTarget};
