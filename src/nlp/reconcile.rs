//! 实体合并：本地结果优先
//!
//! 本地实体按原顺序全部保留；远端实体仅在与结果中任一实体都不重叠时追加，
//! 重叠 = 类型相同，或双方区间已知且相交。保留 origin=Remote 标记供下游区分来源。

use super::entity::{Entity, Origin};

/// 合并本地与远端实体，本地在前
pub fn merge(local: &[Entity], remote: &[Entity]) -> Vec<Entity> {
    let mut merged: Vec<Entity> = local.to_vec();
    for candidate in remote {
        if merged.iter().any(|existing| candidate.overlaps(existing)) {
            tracing::debug!(kind = %candidate.kind, value = %candidate.value, "remote entity dropped (overlap)");
            continue;
        }
        merged.push(candidate.clone().with_origin(Origin::Remote));
    }
    merged
}
