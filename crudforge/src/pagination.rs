use sea_orm::{
    ConnectionTrait, DbErr, EntityTrait, FromQueryResult, PaginatorTrait, QuerySelect, Select,
};

use crate::models::{Page, PageMeta, PageRequest};

/// Page arithmetic for a known total.
///
/// `total_pages = ceil(total_items / size)`. `item_count` is `size` on every
/// page before the last, and the remainder (or `size` when it divides evenly)
/// from the last page onward. `total_items == 0` yields zero pages and a zero
/// count. `size` must already be normalized to `>= 1` by the caller.
#[must_use]
pub fn page_meta(page: u64, size: u64, total_items: u64) -> PageMeta {
    debug_assert!(size >= 1, "size must be normalized upstream");
    let total_pages = total_items.div_ceil(size);
    let item_count = if total_items == 0 {
        0
    } else if page < total_pages {
        size
    } else {
        let remainder = total_items % size;
        if remainder == 0 { size } else { remainder }
    };
    PageMeta {
        page,
        size,
        total_items,
        total_pages,
        item_count,
    }
}

/// Execute one page of `query` and count the rows matching its predicate.
///
/// The count runs against the same filtered query as the item fetch, so the
/// two reflect the same predicate. They are still two separate statements:
/// under concurrent writes `total_items` and `items` may disagree.
///
/// A page past the end of the result set is not an error: `items` comes back
/// empty and `meta.page` echoes the requested page.
///
/// # Errors
///
/// Returns `DbErr` when either the item fetch or the count fails.
pub async fn paginate<C, E>(
    db: &C,
    query: Select<E>,
    request: PageRequest,
) -> Result<Page<E::Model>, DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync,
{
    let page = request.page.max(1);
    let size = request.size.max(1);
    let items = query
        .clone()
        .offset((page - 1) * size)
        .limit(size)
        .all(db)
        .await?;
    let total_items = PaginatorTrait::count(query, db).await?;
    Ok(Page {
        items,
        meta: page_meta(page, size, total_items),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_three_items_across_three_pages() {
        assert_eq!(page_meta(1, 10, 23).item_count, 10);
        assert_eq!(page_meta(2, 10, 23).item_count, 10);
        let last = page_meta(3, 10, 23);
        assert_eq!(last.item_count, 3);
        assert_eq!(last.total_pages, 3);
    }

    #[test]
    fn even_division_uses_size_not_zero() {
        let last = page_meta(2, 10, 20);
        assert_eq!(last.item_count, 10);
        assert_eq!(last.total_pages, 2);
    }

    #[test]
    fn empty_result_set() {
        let meta = page_meta(1, 10, 0);
        assert_eq!(meta.total_pages, 0);
        assert_eq!(meta.item_count, 0);
    }

    #[test]
    fn overflow_page_is_echoed() {
        let meta = page_meta(8, 10, 23);
        assert_eq!(meta.page, 8);
        assert_eq!(meta.total_pages, 3);
    }

    #[test]
    fn item_counts_sum_to_total() {
        for total in 0..100_u64 {
            for size in 1..12_u64 {
                let pages = total.div_ceil(size);
                let sum: u64 = (1..=pages).map(|p| page_meta(p, size, total).item_count).sum();
                assert_eq!(sum, total, "total={total} size={size}");
            }
        }
    }

    #[test]
    fn total_pages_is_ceiling() {
        for total in 0..200_u64 {
            for size in 1..9_u64 {
                assert_eq!(page_meta(1, size, total).total_pages, total.div_ceil(size));
            }
        }
    }
}
