use crate::storage::ItemTally;

/// Order tallies by favorite count desc, like count desc, item id asc.
/// The id tiebreak keeps repeated calls on unchanged data identical.
pub fn rank(mut tallies: Vec<ItemTally>) -> Vec<ItemTally> {
    tallies.sort_by(|a, b| {
        b.favorite_count
            .cmp(&a.favorite_count)
            .then_with(|| b.like_count.cmp(&a.like_count))
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    tallies
}

/// Slice out one 0-based page, clamping past-the-end indexes to the last
/// valid page so pagination self-corrects when the item count shrinks.
/// Returns the effective index together with the slice.
pub fn page(ranked: &[ItemTally], page_index: usize, page_size: usize) -> (usize, &[ItemTally]) {
    if page_size == 0 || ranked.is_empty() {
        return (0, &[]);
    }
    let last = (ranked.len() - 1) / page_size;
    let index = page_index.min(last);
    let start = index * page_size;
    let end = (start + page_size).min(ranked.len());
    (index, &ranked[start..end])
}

pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Leaderboard convenience: the first `n` of the ranked order.
pub fn top_n(ranked: &[ItemTally], n: usize) -> &[ItemTally] {
    &ranked[..n.min(ranked.len())]
}
