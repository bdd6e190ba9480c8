use std::num::IntErrorKind;

/// Page size the blog frontend renders by default.
pub const DEFAULT_POSTS_PER_PAGE: usize = 3;

/// One page out of an ordered post set, plus the numbers the frontend needs
/// to render a pager.
pub struct PostPage<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
}

/// Resolve a raw, user-supplied page token against the number of available
/// pages. Malformed tokens are recovered, never rejected:
/// - absent or non-integer -> page 1
/// - below 1 -> page 1
/// - above `total_pages` -> last page
/// Numeric tokens too large for i64 saturate toward the matching bound.
pub fn resolve_page_token(page_token: Option<&str>, total_pages: usize) -> usize {
    let last_page = total_pages.max(1);

    let requested: i64 = match page_token.map(str::trim) {
        None | Some("") => 1,
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) => n,
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => i64::MAX,
                IntErrorKind::NegOverflow => i64::MIN,
                _ => 1,
            },
        },
    };

    requested.clamp(1, last_page as i64) as usize
}

/// Partition an already-filtered, already-ordered post set into fixed-size
/// pages and return the one the token resolves to. An empty set still has one
/// (empty) valid page, so the returned page always satisfies
/// 1 <= current_page <= total_pages.
pub fn paginate<T>(items: Vec<T>, page_token: Option<&str>, page_size: usize) -> PostPage<T> {
    let page_size = page_size.max(1);
    let total_pages = items.len().div_ceil(page_size).max(1);
    let current_page = resolve_page_token(page_token, total_pages);

    let items: Vec<T> = items
        .into_iter()
        .skip((current_page - 1) * page_size)
        .take(page_size)
        .collect();

    PostPage {
        items,
        current_page,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posts(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn first_page_by_default() {
        let page = paginate(posts(7), None, 3);
        assert_eq!(page.items, vec![0, 1, 2]);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn explicit_page_in_range() {
        let page = paginate(posts(7), Some("2"), 3);
        assert_eq!(page.items, vec![3, 4, 5]);
        assert_eq!(page.current_page, 2);
    }

    #[test]
    fn last_page_is_short() {
        let page = paginate(posts(7), Some("3"), 3);
        assert_eq!(page.items, vec![6]);
        assert_eq!(page.current_page, 3);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn overlong_token_clamps_to_last_page() {
        let page = paginate(posts(7), Some("99"), 3);
        assert_eq!(page.current_page, 3);
        assert_eq!(page.items, vec![6]);
    }

    #[test]
    fn non_integer_token_recovers_to_first_page() {
        let page = paginate(posts(7), Some("abc"), 3);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.items, vec![0, 1, 2]);
    }

    #[test]
    fn zero_and_negative_tokens_clamp_to_first_page() {
        assert_eq!(resolve_page_token(Some("0"), 3), 1);
        assert_eq!(resolve_page_token(Some("-5"), 3), 1);
    }

    #[test]
    fn overflowing_tokens_saturate() {
        assert_eq!(resolve_page_token(Some("999999999999999999999999"), 3), 3);
        assert_eq!(resolve_page_token(Some("-999999999999999999999999"), 3), 1);
    }

    #[test]
    fn whitespace_and_empty_tokens_recover() {
        assert_eq!(resolve_page_token(Some("  2  "), 3), 2);
        assert_eq!(resolve_page_token(Some(""), 3), 1);
        assert_eq!(resolve_page_token(Some("   "), 3), 1);
    }

    #[test]
    fn empty_set_has_one_empty_page() {
        let page = paginate(Vec::<usize>::new(), Some("99"), 3);
        assert!(page.items.is_empty());
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn page_size_zero_treated_as_one() {
        let page = paginate(posts(4), None, 0);
        assert_eq!(page.items, vec![0]);
        assert_eq!(page.total_pages, 4);
    }

    #[test]
    fn every_token_lands_in_bounds() {
        for token in [
            None,
            Some("0"),
            Some("1"),
            Some("2"),
            Some("3"),
            Some("4"),
            Some("99"),
            Some("-1"),
            Some("abc"),
            Some("1.5"),
            Some(""),
        ] {
            let page = paginate(posts(7), token, 3);
            assert!(page.current_page >= 1, "token {token:?}");
            assert!(page.current_page <= page.total_pages, "token {token:?}");
        }
    }
}
