// CIDR 规范化与掩码提取
pub mod cidr;
// 按类型的排序策略表
mod sort_policy;

pub use cidr::{extract_cidr_mask, normalize_cidr};
pub use sort_policy::{SortPolicy, SortPolicyTable};
